//! Conflict analysis, clause learning and backjumping.
use log::{debug, trace};

use crate::clause::resolve;
use crate::db::{ClauseDb, ClauseId};
use crate::trace::{TraceEvent, TraceHook};
use crate::trail::Trail;

/// Clauses whose resolution derives unsatisfiability.
///
/// Learned clauses among the steps stand for their own resolution steps; expanding them down to
/// original clauses yields the unsat core.
pub(crate) type UnsatProof = Vec<ClauseId>;

/// Learn a clause from a conflict and backjump.
///
/// Implements the last-decision-level criterion: starting from the conflict clause, the running
/// clause is resolved with the antecedent of each popped propagation step until a decision tops
/// the trail. Steps whose variable does not occur in the running clause are popped without
/// resolving, they cannot contribute to the conflict. The learned clause records the conflict
/// clause and the used antecedents as its resolution steps and is appended to the database, then
/// the trail is unwound to the highest position where the learned clause is unit.
///
/// Returns the learned clause on success. `Err` means the formula is unsatisfiable and carries
/// the proof, either because resolution reached the empty clause or because backjumping ran off
/// the bottom of the trail.
pub(crate) fn analyze_conflict(
    db: &mut ClauseDb,
    trail: &mut Trail,
    hook: &mut TraceHook,
    conflict: ClauseId,
) -> Result<ClauseId, UnsatProof> {
    debug!("analyzing conflict in {:?}", db.clause(conflict));

    let mut learned: Vec<_> = db.clause(conflict).lits().to_vec();
    let mut proof: UnsatProof = vec![conflict];

    while let Some(step) = trail.last_step() {
        if step.is_decision() {
            break;
        }
        let step = trail.pop();
        let antecedent = step
            .antecedent()
            .expect("propagation step without an antecedent");

        if !learned.iter().any(|lit| lit.var() == step.lit.var()) {
            trace!("skipping {}, not part of the conflict", step.lit);
            continue;
        }

        debug!("resolving with antecedent {:?}", db.clause(antecedent));
        learned = resolve(&learned, db.clause(antecedent).lits());
        proof.push(antecedent);

        if learned.is_empty() {
            debug!("resolved the empty clause");
            return Err(proof);
        }
    }

    let learned_id = db.add_learned(learned, proof);
    debug!("learned {:?}", db.clause(learned_id));
    hook.emit(|| TraceEvent::Learn {
        clause: learned_id,
        lits: db.clause(learned_id).lits().to_vec(),
    });

    backjump(db, trail, hook, learned_id)?;

    Ok(learned_id)
}

/// Unwind the trail to the highest position where the learned clause is unit.
///
/// Stops one step short of unassigning a second literal of the learned clause. Reaching
/// decision level 0 before the clause became unit means the conflict does not depend on any
/// decision, so the formula is unsatisfiable.
fn backjump(
    db: &ClauseDb,
    trail: &mut Trail,
    hook: &mut TraceHook,
    learned_id: ClauseId,
) -> Result<(), UnsatProof> {
    let learned = db.clause(learned_id);
    let from_level = trail.level();
    let mut learned_is_unit = false;

    while !trail.is_empty() {
        if trail.level() == 0 && !learned_is_unit {
            debug!("backjumped to level 0 before {:?} became unit", learned);
            return Err(vec![learned_id]);
        }
        let step = trail.last_step().expect("trail is not empty");
        if learned.contains_var(step.lit.var()) {
            if learned_is_unit {
                break;
            }
            learned_is_unit = true;
        }
        trail.pop();
    }

    if !learned_is_unit {
        debug!("ran off the bottom of the trail, {:?} never became unit", learned);
        return Err(vec![learned_id]);
    }

    debug!("backjumped from level {} to level {}", from_level, trail.level());
    hook.emit(|| TraceEvent::Backjump {
        from_level,
        to_level: trail.level(),
    });

    Ok(())
}
