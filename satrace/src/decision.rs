//! The decision heuristic.
use log::debug;

use satrace_formula::Var;

use crate::trace::{TraceEvent, TraceHook};
use crate::trail::Trail;

/// Decide the first unassigned variable, assigning it `false`.
///
/// Deterministic by construction: variables are tried in index order. Returns `false` without
/// deciding when every variable is assigned.
pub(crate) fn make_decision(trail: &mut Trail, hook: &mut TraceHook) -> bool {
    let unassigned = (0..trail.var_count())
        .map(Var::from_index)
        .find(|&var| !trail.contains(var));

    match unassigned {
        Some(var) => {
            let lit = var.negative();
            trail.add_decision(lit);
            debug!("decision {} opens level {}", lit, trail.level());
            hook.emit(|| TraceEvent::Decision {
                lit,
                level: trail.level(),
            });
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use satrace_formula::lits;

    use crate::db::ClauseId;

    #[test]
    fn decides_first_unassigned_variable_negatively() {
        let mut trail = Trail::default();
        trail.set_var_count(3);
        let mut hook = TraceHook::default();

        trail.add_unit(lits![1][0], ClauseId::from_index(0));

        assert!(make_decision(&mut trail, &mut hook));
        assert_eq!(trail.last_step().unwrap().lit, lits![-2][0]);
        assert_eq!(trail.level(), 1);

        assert!(make_decision(&mut trail, &mut hook));
        assert_eq!(trail.last_step().unwrap().lit, lits![-3][0]);
        assert_eq!(trail.level(), 2);

        assert!(!make_decision(&mut trail, &mut hook));
        assert_eq!(trail.level(), 2);
    }
}
