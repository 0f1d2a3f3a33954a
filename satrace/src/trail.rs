//! The assignment trail, doubling as the implication graph.
use rustc_hash::FxHashMap;

use satrace_formula::{lit::LitIdx, Lit, Var};

use crate::db::ClauseId;

/// Why a literal was appended to the trail.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Reason {
    /// Chosen by the decision heuristic.
    Decision,
    /// Forced by the antecedent clause, which was unit under the preceding assignment.
    Propagated(ClauseId),
}

/// A single assignment on the trail.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Step {
    pub lit: Lit,
    pub level: usize,
    pub reason: Reason,
}

impl Step {
    /// Whether this step is a decision.
    pub fn is_decision(&self) -> bool {
        self.reason == Reason::Decision
    }

    /// The clause that forced this step, for propagation steps.
    pub fn antecedent(&self) -> Option<ClauseId> {
        match self.reason {
            Reason::Decision => None,
            Reason::Propagated(id) => Some(id),
        }
    }
}

/// Ordered log of assignments with their decision levels and antecedents.
///
/// The trail is the solver's only record of the partial assignment: a variable is assigned iff
/// some step on the stack assigns it, and the variable index map is kept in perfect
/// correspondence with the stack. Decision levels are non-decreasing along the stack and the
/// current level always equals the number of decision steps.
///
/// The trail grows through [`add_decision`](Trail::add_decision) and
/// [`add_unit`](Trail::add_unit) and shrinks only through [`pop`](Trail::pop).
#[derive(Default)]
pub struct Trail {
    steps: Vec<Step>,
    /// Maps a variable index to the position of the step assigning it.
    positions: Vec<Option<LitIdx>>,
    level: usize,
}

impl Trail {
    /// Grow the variable index map to the given variable count.
    pub fn set_var_count(&mut self, count: usize) {
        if count > self.positions.len() {
            self.positions.resize(count, None);
        }
    }

    /// Number of variables the trail tracks.
    pub fn var_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of assignments on the trail.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the trail holds no assignments.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether every tracked variable is assigned.
    pub fn fully_assigned(&self) -> bool {
        self.steps.len() == self.positions.len()
    }

    /// The current decision level. Level 0 is the top level, before any decision.
    pub fn level(&self) -> usize {
        self.level
    }

    /// All steps in assignment order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Whether the variable is currently assigned.
    pub fn contains(&self, var: Var) -> bool {
        self.positions[var.index()].is_some()
    }

    /// Value of a variable under the current partial assignment.
    pub fn value(&self, var: Var) -> Option<bool> {
        self.positions[var.index()].map(|pos| self.steps[pos as usize].lit.is_positive())
    }

    /// The step assigning the given variable, if it is assigned.
    pub fn step_for(&self, var: Var) -> Option<&Step> {
        self.positions[var.index()].map(move |pos| &self.steps[pos as usize])
    }

    /// Whether the literal is true under the current partial assignment.
    pub fn lit_is_true(&self, lit: Lit) -> bool {
        self.value(lit.var()) == Some(lit.is_positive())
    }

    /// Whether the literal is false under the current partial assignment.
    pub fn lit_is_false(&self, lit: Lit) -> bool {
        self.value(lit.var()) == Some(lit.is_negative())
    }

    /// Whether the literal's variable is unassigned.
    pub fn lit_is_unassigned(&self, lit: Lit) -> bool {
        self.value(lit.var()).is_none()
    }

    /// Open a new decision level and append a decision step.
    pub fn add_decision(&mut self, lit: Lit) {
        self.level += 1;
        self.push(lit, Reason::Decision);
    }

    /// Append a propagation step at the current decision level.
    pub fn add_unit(&mut self, lit: Lit, antecedent: ClauseId) {
        self.push(lit, Reason::Propagated(antecedent));
    }

    fn push(&mut self, lit: Lit, reason: Reason) {
        debug_assert!(
            !self.contains(lit.var()),
            "variable {} is already assigned",
            lit.var()
        );
        self.positions[lit.index()] = Some(self.steps.len() as LitIdx);
        self.steps.push(Step {
            lit,
            level: self.level,
            reason,
        });
    }

    /// Remove and return the youngest step.
    ///
    /// Closes the current decision level if the step was a decision. Calling this on an empty
    /// trail is a programming error.
    pub fn pop(&mut self) -> Step {
        let step = self.steps.pop().expect("pop on an empty trail");
        self.positions[step.lit.index()] = None;
        if step.is_decision() {
            self.level -= 1;
        }
        step
    }

    /// The youngest step, if any.
    pub fn last_step(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// The youngest decision step, if any.
    pub fn last_decision(&self) -> Option<&Step> {
        self.steps.iter().rev().find(|step| step.is_decision())
    }

    /// The assigned literals in assignment order.
    pub fn model(&self) -> impl Iterator<Item = Lit> + '_ {
        self.steps.iter().map(|step| step.lit)
    }

    /// The current partial assignment as a variable to polarity map.
    pub fn model_map(&self) -> FxHashMap<Var, bool> {
        self.steps
            .iter()
            .map(|step| (step.lit.var(), step.lit.is_positive()))
            .collect()
    }

    /// Remove all assignments and reset the decision level.
    pub fn clear(&mut self) {
        self.steps.clear();
        for position in self.positions.iter_mut() {
            *position = None;
        }
        self.level = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use satrace_formula::{lits, vars};

    fn lit(number: isize) -> Lit {
        Lit::from_dimacs(number)
    }

    #[test]
    fn decisions_raise_the_level() {
        let mut trail = Trail::default();
        trail.set_var_count(4);

        assert_eq!(trail.level(), 0);

        trail.add_unit(lit(1), ClauseId::from_index(0));
        assert_eq!(trail.level(), 0);
        assert_eq!(trail.last_step().unwrap().level, 0);

        trail.add_decision(lit(-2));
        assert_eq!(trail.level(), 1);

        trail.add_unit(lit(3), ClauseId::from_index(1));
        assert_eq!(trail.last_step().unwrap().level, 1);

        trail.add_decision(lit(-4));
        assert_eq!(trail.level(), 2);

        // levels are non-decreasing along the stack and count the decisions
        let levels: Vec<_> = trail.steps().iter().map(|step| step.level).collect();
        assert_eq!(levels, [0, 1, 1, 2]);
        let decisions = trail.steps().iter().filter(|step| step.is_decision()).count();
        assert_eq!(trail.level(), decisions);
    }

    #[test]
    fn pop_restores_the_previous_state() {
        let mut trail = Trail::default();
        trail.set_var_count(2);

        trail.add_decision(lit(1));
        trail.add_unit(lit(2), ClauseId::from_index(7));

        assert!(trail.contains(vars![2][0]));
        assert_eq!(trail.value(vars![2][0]), Some(true));

        let step = trail.pop();
        assert_eq!(step.lit, lit(2));
        assert_eq!(step.antecedent(), Some(ClauseId::from_index(7)));
        assert_eq!(trail.level(), 1);
        assert!(!trail.contains(vars![2][0]));

        let step = trail.pop();
        assert!(step.is_decision());
        assert_eq!(trail.level(), 0);
        assert!(trail.is_empty());
    }

    #[test]
    #[should_panic(expected = "pop on an empty trail")]
    fn pop_on_empty_trail_panics() {
        Trail::default().pop();
    }

    #[test]
    fn model_and_model_map_agree() {
        let mut trail = Trail::default();
        trail.set_var_count(3);

        trail.add_unit(lit(-1), ClauseId::from_index(0));
        trail.add_decision(lit(2));
        trail.add_unit(lit(-3), ClauseId::from_index(1));

        let model: Vec<_> = trail.model().collect();
        assert_eq!(model, lits![-1, 2, -3].to_vec());

        let map = trail.model_map();
        assert_eq!(map.len(), 3);
        for lit in model {
            assert_eq!(map[&lit.var()], lit.is_positive());
        }
    }

    #[test]
    fn last_decision_skips_propagations() {
        let mut trail = Trail::default();
        trail.set_var_count(3);

        assert!(trail.last_decision().is_none());

        trail.add_decision(lit(1));
        trail.add_unit(lit(2), ClauseId::from_index(0));
        trail.add_unit(lit(3), ClauseId::from_index(1));

        assert_eq!(trail.last_decision().unwrap().lit, lit(1));
        assert_eq!(trail.last_step().unwrap().lit, lit(3));
    }

    #[test]
    fn literal_queries() {
        let mut trail = Trail::default();
        trail.set_var_count(2);

        trail.add_decision(lit(-1));

        assert!(trail.lit_is_true(lit(-1)));
        assert!(trail.lit_is_false(lit(1)));
        assert!(trail.lit_is_unassigned(lit(2)));
        assert!(trail.step_for(vars![1][0]).unwrap().is_decision());
        assert!(trail.step_for(vars![2][0]).is_none());
    }

    #[test]
    fn clear_resets_everything() {
        let mut trail = Trail::default();
        trail.set_var_count(2);
        trail.add_decision(lit(1));
        trail.add_unit(lit(2), ClauseId::from_index(0));

        trail.clear();

        assert!(trail.is_empty());
        assert_eq!(trail.level(), 0);
        assert!(!trail.contains(vars![1][0]));
        assert_eq!(trail.var_count(), 2);
    }
}
