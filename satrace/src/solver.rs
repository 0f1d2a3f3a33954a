//! The solver front-end.
use std::io;

use anyhow::Error;
use log::{debug, info};
use rustc_hash::FxHashMap;

use satrace_dimacs::DimacsParser;
use satrace_formula::{CnfFormula, Lit, Var};

use crate::db::ClauseDb;
use crate::proof::{extract_core, Core};
use crate::search::search;
use crate::trace::{TraceEvent, TraceHook};
use crate::trail::Trail;

/// A satisfying assignment.
#[derive(Clone, Debug)]
pub struct Model {
    lits: Vec<Lit>,
    values: FxHashMap<Var, bool>,
}

impl Model {
    pub(crate) fn from_trail(trail: &Trail) -> Model {
        Model {
            lits: trail.model().collect(),
            values: trail.model_map(),
        }
    }

    /// The satisfied literals in assignment order.
    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }

    /// Value of a variable under the model.
    pub fn value(&self, var: Var) -> Option<bool> {
        self.values.get(&var).copied()
    }

    /// Whether the literal is true under the model.
    pub fn contains(&self, lit: Lit) -> bool {
        self.value(lit.var()) == Some(lit.is_positive())
    }

    /// Whether some literal of the clause is true under the model.
    pub fn satisfies(&self, clause: &[Lit]) -> bool {
        clause.iter().any(|&lit| self.contains(lit))
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Model) -> bool {
        self.lits == other.lits
    }
}

impl Eq for Model {}

/// Outcome of a solve. Both variants are ordinary values, not errors.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SolveResult {
    /// The formula is satisfiable and the model satisfies it.
    Sat(Model),
    /// The formula is unsatisfiable; the core derives the empty clause by resolution.
    Unsat(Core),
}

impl SolveResult {
    /// Whether the formula was found satisfiable.
    pub fn is_sat(&self) -> bool {
        matches!(self, SolveResult::Sat(_))
    }

    /// The model, for a satisfiable outcome.
    pub fn model(&self) -> Option<&Model> {
        match self {
            SolveResult::Sat(model) => Some(model),
            SolveResult::Unsat(_) => None,
        }
    }

    /// The unsat core, for an unsatisfiable outcome.
    pub fn core(&self) -> Option<&Core> {
        match self {
            SolveResult::Sat(_) => None,
            SolveResult::Unsat(core) => Some(core),
        }
    }
}

/// A boolean satisfiability solver.
///
/// Clauses are added up front, then [`solve`](Solver::solve) decides satisfiability. Each solve
/// starts from a clean trail and a database holding only the original clauses, so solving the
/// same clause set twice yields identical outcomes and models.
#[derive(Default)]
pub struct Solver<'a> {
    db: ClauseDb,
    trail: Trail,
    hook: TraceHook<'a>,
}

impl<'a> Solver<'a> {
    /// Create a new solver.
    pub fn new() -> Solver<'a> {
        Solver::default()
    }

    /// Add a clause to the formula.
    ///
    /// Duplicate literals are removed. Tautological clauses (containing a literal and its
    /// negation) are dropped, they cannot take part in any conflict. Adding the empty clause
    /// makes the formula unsatisfiable.
    pub fn add_clause(&mut self, lits: &[Lit]) {
        self.insert_clause(None, lits);
    }

    /// Add a clause under a human readable name.
    ///
    /// The name is surfaced in debug output and in extracted unsat cores.
    pub fn add_clause_named(&mut self, name: impl Into<String>, lits: &[Lit]) {
        self.insert_clause(Some(name.into()), lits);
    }

    fn insert_clause(&mut self, name: Option<String>, lits: &[Lit]) {
        let mut lits = lits.to_vec();
        lits.sort_unstable();
        lits.dedup();

        let tautological = lits
            .windows(2)
            .any(|pair| pair[0].var() == pair[1].var());
        if tautological {
            debug!("dropping tautological clause {:?}", lits);
            return;
        }

        let _ = self.db.add_original(name, lits);
    }

    /// Add all clauses of a formula.
    ///
    /// The solver tracks the formula's variable count even when the highest variables are unused
    /// in clauses.
    pub fn add_formula(&mut self, formula: &CnfFormula) {
        self.db.set_var_count(formula.var_count());
        for clause in formula.iter() {
            self.add_clause(clause);
        }
    }

    /// Read and add a formula in DIMACS CNF format.
    pub fn add_dimacs_cnf(&mut self, input: impl io::Read) -> Result<(), Error> {
        let parser = DimacsParser::parse_detailed(input)?;
        self.add_formula(parser.formula());

        info!(
            "Parsed formula with {} variables and {} clauses",
            parser.var_count(),
            parser.clause_count()
        );

        Ok(())
    }

    /// Register a callback receiving a [`TraceEvent`] for every step of the search.
    ///
    /// Replaces any previously registered callback.
    pub fn set_trace(&mut self, callback: impl FnMut(&TraceEvent) + 'a) {
        self.hook.set(callback);
    }

    /// Number of variables of the loaded formula.
    pub fn var_count(&self) -> usize {
        self.db.var_count()
    }

    /// Decide satisfiability of the current formula.
    pub fn solve(&mut self) -> SolveResult {
        self.db.drop_learned();
        self.trail.clear();
        self.trail.set_var_count(self.db.var_count());

        if let Some(id) = self.db.first_empty_clause() {
            debug!("formula contains the empty clause");
            return SolveResult::Unsat(extract_core(&self.db, &[id]));
        }

        search(&mut self.db, &mut self.trail, &mut self.hook)
    }
}
