//! Unit propagation.
use log::{debug, trace};

use crate::clause::ClauseStatus;
use crate::db::{ClauseDb, ClauseId};
use crate::trace::{TraceEvent, TraceHook};
use crate::trail::Trail;

/// Propagate unit clauses until a fixed point or a conflict.
///
/// Each round asserts the unit literal of the first unit clause in insertion order, then
/// rescans the database for a falsified clause. The first falsified clause found is returned as
/// the conflict. Once no clause is unit, `None` is returned; the trail then contains every
/// literal implied at the current level.
pub(crate) fn propagate(
    db: &ClauseDb,
    trail: &mut Trail,
    hook: &mut TraceHook,
) -> Option<ClauseId> {
    loop {
        let unit = db.iter().find_map(|(id, clause)| match clause.status(trail) {
            ClauseStatus::Unit(lit) => Some((id, lit)),
            _ => None,
        });

        let (antecedent, lit) = match unit {
            Some(unit) => unit,
            None => {
                trace!("propagation reached a fixed point");
                return None;
            }
        };

        debug!(
            "clause {:?} is unit, asserting {}",
            db.clause(antecedent),
            lit
        );
        trail.add_unit(lit, antecedent);
        hook.emit(|| TraceEvent::Propagation { lit, antecedent });

        let conflict = db
            .iter()
            .find(|(_, clause)| clause.status(trail) == ClauseStatus::Inconsistent)
            .map(|(id, _)| id);

        if let Some(conflict) = conflict {
            debug!("conflict in clause {:?}", db.clause(conflict));
            hook.emit(|| TraceEvent::Conflict { clause: conflict });
            return Some(conflict);
        }
    }
}
