//! The CDCL search loop.
use log::debug;

use crate::analyze::analyze_conflict;
use crate::db::ClauseDb;
use crate::decision::make_decision;
use crate::proof::extract_core;
use crate::prop::propagate;
use crate::solver::{Model, SolveResult};
use crate::trace::TraceHook;
use crate::trail::Trail;

/// Run the CDCL loop to completion.
///
/// Alternates propagation, conflict analysis and decisions. Every conflict either proves
/// unsatisfiability or shortens the trail below the conflicting assignment, so the loop
/// terminates for any finite clause set.
pub(crate) fn search(db: &mut ClauseDb, trail: &mut Trail, hook: &mut TraceHook) -> SolveResult {
    loop {
        if let Some(conflict) = propagate(db, trail, hook) {
            match analyze_conflict(db, trail, hook, conflict) {
                Ok(learned) => {
                    debug_assert!(
                        db.clause(learned).is_unit(trail),
                        "learned clause {:?} is not unit after backjumping",
                        db.clause(learned)
                    );
                }
                Err(proof) => {
                    debug!("unsatisfiable, reducing the proof to original clauses");
                    return SolveResult::Unsat(extract_core(db, &proof));
                }
            }
            continue;
        }

        if trail.fully_assigned() {
            debug!("all {} variables assigned", trail.var_count());
            return SolveResult::Sat(Model::from_trail(trail));
        }

        let decided = make_decision(trail, hook);
        debug_assert!(decided, "no decision despite unassigned variables");
    }
}
