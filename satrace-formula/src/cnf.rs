//! CNF formulas.
use std::cmp::max;
use std::fmt;
use std::ops::Range;

use crate::lit::Lit;

/// A formula in conjunctive normal form.
///
/// This is the interchange type between the DIMACS parser and the solver. It stores all literals
/// in a single buffer with a range per clause, which avoids a separate allocation per clause.
///
/// Two formulas are equal iff they have the same variable count and the same clauses in the same
/// order.
#[derive(Default, Eq)]
pub struct CnfFormula {
    var_count: usize,
    literals: Vec<Lit>,
    clause_ranges: Vec<Range<usize>>,
}

impl CnfFormula {
    /// Create an empty CNF formula.
    pub fn new() -> CnfFormula {
        CnfFormula::default()
    }

    /// Number of variables in the formula.
    ///
    /// Unused variables below the highest used index are counted, so a vector of this length can
    /// be indexed with any variable of the formula.
    pub fn var_count(&self) -> usize {
        self.var_count
    }

    /// Increase the variable count of the formula.
    ///
    /// Does nothing if the formula already has at least `count` variables.
    pub fn set_var_count(&mut self, count: usize) {
        self.var_count = max(self.var_count, count)
    }

    /// Number of clauses in the formula.
    pub fn len(&self) -> usize {
        self.clause_ranges.len()
    }

    /// Whether the formula has no clauses.
    pub fn is_empty(&self) -> bool {
        self.clause_ranges.is_empty()
    }

    /// Append a clause to the formula.
    ///
    /// Extends the variable count to cover the clause's variables.
    pub fn add_clause(&mut self, literals: &[Lit]) {
        let begin = self.literals.len();
        self.literals.extend_from_slice(literals);
        let end = self.literals.len();

        for &lit in literals {
            self.var_count = max(lit.index() + 1, self.var_count);
        }

        self.clause_ranges.push(begin..end);
    }

    /// The clause at the given index.
    pub fn clause(&self, index: usize) -> &[Lit] {
        &self.literals[self.clause_ranges[index].clone()]
    }

    /// Iterator over all clauses.
    pub fn iter(&self) -> impl Iterator<Item = &[Lit]> {
        let literals = &self.literals;
        self.clause_ranges
            .iter()
            .map(move |range| &literals[range.clone()])
    }
}

/// Convert any iterable of [`Lit`] slices or vectors into a [`CnfFormula`].
impl<F, C> From<F> for CnfFormula
where
    F: IntoIterator<Item = C>,
    C: AsRef<[Lit]>,
{
    fn from(formula: F) -> CnfFormula {
        let mut cnf_formula = CnfFormula::new();
        for clause in formula {
            cnf_formula.add_clause(clause.as_ref());
        }
        cnf_formula
    }
}

impl fmt::Debug for CnfFormula {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&self.var_count(), f)?;
        f.debug_list().entries(self.iter()).finish()
    }
}

impl PartialEq for CnfFormula {
    fn eq(&self, other: &CnfFormula) -> bool {
        self.var_count() == other.var_count()
            && self.len() == other.len()
            && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

#[cfg(any(test, feature = "proptest-strategies"))]
#[doc(hidden)]
pub mod strategy {
    use super::*;

    use proptest::{collection::SizeRange, prelude::*, *};

    use crate::lit::strategy::lit;

    /// Generate a single clause without repeated or complementary literals.
    ///
    /// Clauses of the generated formulas never contain a variable twice, matching the clause
    /// well-formedness the solver expects. Repeated variables are dropped, so a clause can come
    /// out shorter than the requested length.
    pub fn clause(
        vars: usize,
        clause_len: impl Into<SizeRange>,
    ) -> impl Strategy<Value = Vec<Lit>> {
        collection::vec(lit(0..vars), clause_len).prop_map(|mut lits| {
            lits.sort_unstable();
            lits.dedup_by_key(|lit| lit.var());
            lits
        })
    }

    /// Generate a list of well-formed clauses over the given number of variables.
    pub fn vec_formula(
        vars: impl Strategy<Value = usize>,
        clauses: impl Into<SizeRange>,
        clause_len: impl Into<SizeRange>,
    ) -> impl Strategy<Value = Vec<Vec<Lit>>> {
        let clauses = clauses.into();
        let clause_len = clause_len.into();

        // Not using ind_flat_map makes shrinking too expensive
        vars.prop_ind_flat_map(move |vars| {
            collection::vec(clause(vars, clause_len.clone()), clauses.clone())
        })
    }

    /// Generate a [`CnfFormula`] of well-formed clauses.
    pub fn cnf_formula(
        vars: impl Strategy<Value = usize>,
        clauses: impl Into<SizeRange>,
        clause_len: impl Into<SizeRange>,
    ) -> impl Strategy<Value = CnfFormula> {
        vec_formula(vars, clauses, clause_len).prop_map(|clauses| CnfFormula::from(clauses))
    }
}

#[cfg(test)]
mod tests {
    use super::{strategy::*, *};

    use proptest::*;

    #[test]
    fn simple_roundtrip() {
        let input = cnf![
            1, 2, 3;
            -1, -2;
            7, 2;
            ;
            4, 5;
        ];

        let formula = CnfFormula::from(input.iter().cloned());

        for (clause, &ref_clause) in formula.iter().zip(input.iter()) {
            assert_eq!(clause, ref_clause);
        }

        assert_eq!(formula.var_count(), 7);
        assert_eq!(formula.len(), 5);
        assert_eq!(formula.clause(3), &[]);
    }

    proptest! {
        #[test]
        fn roundtrip_from_vec(input in vec_formula(1..200usize, 0..100, 0..10)) {
            let formula = CnfFormula::from(&input);

            for (clause, ref_clause) in formula.iter().zip(input.iter()) {
                prop_assert_eq!(clause, &ref_clause[..]);
            }

            let var_count = input
                .iter()
                .flat_map(|clause| clause.iter().map(|lit| lit.index() + 1))
                .max()
                .unwrap_or(0);

            prop_assert_eq!(formula.var_count(), var_count);
        }

        #[test]
        fn generated_clauses_are_well_formed(input in vec_formula(1..50usize, 0..100, 0..10)) {
            for clause in input.iter() {
                let mut vars: Vec<_> = clause.iter().map(|lit| lit.var()).collect();
                vars.sort_unstable();
                vars.dedup();
                prop_assert_eq!(vars.len(), clause.len());
            }
        }
    }
}
