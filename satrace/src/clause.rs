//! Clauses and clause status queries.
use std::fmt;

use satrace_formula::{Lit, Var};

use crate::db::ClauseId;
use crate::trail::Trail;

/// Status of a clause relative to a partial assignment.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ClauseStatus {
    /// Some literal of the clause is satisfied.
    True,
    /// No literal is satisfied and exactly one is unassigned.
    Unit(Lit),
    /// Every literal is falsified. Such a clause is a conflict.
    Inconsistent,
    /// No literal is satisfied and at least two are unassigned.
    Consistent,
}

/// A clause of the solver's database.
///
/// Literals are kept sorted and deduplicated, so two clauses are equal iff their literal sets
/// are equal. Learned clauses additionally record the resolution steps that produced them: first
/// the conflict clause, then each antecedent in resolution order.
pub struct Clause {
    lits: Vec<Lit>,
    name: Option<String>,
    learned: bool,
    resolution_steps: Vec<ClauseId>,
}

impl Clause {
    pub(crate) fn new(
        mut lits: Vec<Lit>,
        name: Option<String>,
        learned: bool,
        resolution_steps: Vec<ClauseId>,
    ) -> Clause {
        lits.sort_unstable();
        lits.dedup();
        Clause {
            lits,
            name,
            learned,
            resolution_steps,
        }
    }

    /// The literals of this clause, sorted by code.
    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }

    /// Number of literals.
    pub fn len(&self) -> usize {
        self.lits.len()
    }

    /// Whether this is the empty clause.
    pub fn is_empty(&self) -> bool {
        self.lits.is_empty()
    }

    /// Human readable name, if the clause has one.
    ///
    /// Learned clauses are named `l0`, `l1`, ... in learn order.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether this clause was learned by conflict analysis.
    pub fn is_learned(&self) -> bool {
        self.learned
    }

    /// The clauses this clause was resolved from. Empty for original clauses.
    pub fn resolution_steps(&self) -> &[ClauseId] {
        &self.resolution_steps
    }

    /// Whether some literal of this clause is over the given variable.
    pub fn contains_var(&self, var: Var) -> bool {
        self.lits.iter().any(|lit| lit.var() == var)
    }

    /// Status of this clause under the given partial assignment.
    ///
    /// Single pass: returns [`ClauseStatus::True`] as soon as a satisfied literal is found,
    /// otherwise classifies by the number of unassigned literals.
    pub fn status(&self, trail: &Trail) -> ClauseStatus {
        let mut unassigned = None;
        let mut unassigned_count = 0usize;

        for &lit in &self.lits {
            match trail.value(lit.var()) {
                Some(value) if value == lit.polarity() => return ClauseStatus::True,
                Some(_) => (),
                None => {
                    if unassigned.is_none() {
                        unassigned = Some(lit);
                    }
                    unassigned_count += 1;
                }
            }
        }

        match (unassigned, unassigned_count) {
            (Some(lit), 1) => ClauseStatus::Unit(lit),
            (Some(_), _) => ClauseStatus::Consistent,
            (None, _) => ClauseStatus::Inconsistent,
        }
    }

    /// Whether this clause is unit under the given partial assignment.
    pub fn is_unit(&self, trail: &Trail) -> bool {
        matches!(self.status(trail), ClauseStatus::Unit(_))
    }

    /// Whether this clause is not falsified under the given partial assignment.
    pub fn is_consistent(&self, trail: &Trail) -> bool {
        self.status(trail) != ClauseStatus::Inconsistent
    }

    /// The single unassigned literal of a unit clause.
    ///
    /// Calling this on a clause that is not unit is a programming error.
    pub fn unit_lit(&self, trail: &Trail) -> Lit {
        match self.status(trail) {
            ClauseStatus::Unit(lit) => lit,
            status => panic!("clause {:?} is not unit but {:?}", self, status),
        }
    }
}

impl PartialEq for Clause {
    fn eq(&self, other: &Clause) -> bool {
        self.lits == other.lits
    }
}

impl Eq for Clause {}

impl fmt::Debug for Clause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{}:", name)?;
        }
        f.debug_list().entries(self.lits.iter()).finish()
    }
}

/// Resolvent of two clauses.
///
/// Computes the union of both literal sets with all complementary pairs removed. The clauses of
/// a resolution step share at most one variable in opposite polarities; finding a second pivot
/// is a programming error. Without any pivot the result is the plain union, which is how the
/// solver treats antecedents whose propagated variable no longer occurs in the running clause.
pub fn resolve(lhs: &[Lit], rhs: &[Lit]) -> Vec<Lit> {
    let mut resolvent = Vec::with_capacity(lhs.len() + rhs.len());
    resolvent.extend_from_slice(lhs);
    resolvent.extend_from_slice(rhs);
    resolvent.sort_unstable();
    resolvent.dedup();

    // Sorted by code, the two literals of a pivot variable are adjacent.
    let mut pivot = None;
    for pair in resolvent.windows(2) {
        if pair[0].var() == pair[1].var() {
            if pivot.is_some() {
                panic!(
                    "resolution of {:?} and {:?} has more than one pivot variable",
                    lhs, rhs
                );
            }
            pivot = Some(pair[0].var());
        }
    }

    if let Some(pivot) = pivot {
        resolvent.retain(|lit| lit.var() != pivot);
    }

    resolvent
}

#[cfg(test)]
mod tests {
    use super::*;

    use satrace_formula::lits;

    use crate::db::ClauseDb;

    fn clause(lits: &[Lit]) -> Clause {
        Clause::new(lits.to_vec(), None, false, vec![])
    }

    #[test]
    fn status_classification() {
        let mut db = ClauseDb::default();
        let c1 = db.add_original(None, lits![1, 2].to_vec());
        let c2 = db.add_original(None, lits![-1, 3].to_vec());

        let mut trail = Trail::default();
        trail.set_var_count(3);

        assert_eq!(db.clause(c1).status(&trail), ClauseStatus::Consistent);

        trail.add_decision(lits![-1][0]);
        assert_eq!(db.clause(c1).status(&trail), ClauseStatus::Unit(lits![2][0]));
        assert_eq!(db.clause(c2).status(&trail), ClauseStatus::True);
        assert!(db.clause(c1).is_unit(&trail));
        assert_eq!(db.clause(c1).unit_lit(&trail), lits![2][0]);

        trail.add_decision(lits![-2][0]);
        assert_eq!(db.clause(c1).status(&trail), ClauseStatus::Inconsistent);
        assert!(!db.clause(c1).is_consistent(&trail));
    }

    #[test]
    fn empty_clause_is_inconsistent() {
        let trail = Trail::default();
        assert_eq!(clause(&[]).status(&trail), ClauseStatus::Inconsistent);
    }

    #[test]
    #[should_panic(expected = "not unit")]
    fn unit_lit_of_non_unit_clause() {
        let mut trail = Trail::default();
        trail.set_var_count(2);
        clause(&lits![1, 2]).unit_lit(&trail);
    }

    #[test]
    fn literals_are_deduplicated() {
        let clause = clause(&lits![2, 1, 2, 1]);
        assert_eq!(clause.lits(), &lits![1, 2]);
    }

    #[test]
    fn clause_equality_ignores_literal_order() {
        assert_eq!(clause(&lits![3, -1, 2]), clause(&lits![2, 3, -1]));
        assert_ne!(clause(&lits![1, 2]), clause(&lits![1, -2]));
    }

    #[test]
    fn resolution_removes_the_pivot() {
        let resolvent = resolve(&lits![1, 2], &lits![-2, 3]);
        assert_eq!(resolvent, lits![1, 3].to_vec());
    }

    #[test]
    fn resolution_deduplicates_shared_literals() {
        let resolvent = resolve(&lits![1, 2], &lits![1, -2]);
        assert_eq!(resolvent, lits![1].to_vec());
    }

    #[test]
    fn resolution_of_complementary_units_is_empty() {
        assert_eq!(resolve(&lits![1], &lits![-1]), vec![]);
    }

    #[test]
    fn resolution_without_pivot_is_the_union() {
        let resolvent = resolve(&lits![1, 2], &lits![3]);
        assert_eq!(resolvent, lits![1, 2, 3].to_vec());
    }

    #[test]
    #[should_panic(expected = "more than one pivot")]
    fn resolution_with_two_pivots_panics() {
        resolve(&lits![1, 2], &lits![-1, -2]);
    }
}
