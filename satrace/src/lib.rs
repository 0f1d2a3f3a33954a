//! satrace — a CDCL based SAT solver with resolution proof tracking.
//!
//! Given a formula in conjunctive normal form, [`Solver::solve`] either finds a satisfying
//! [`Model`] or proves unsatisfiability, producing a [`Core`]: a subset of the original clauses
//! that derives the empty clause by resolution.
//!
//! The solver is single threaded and deterministic: the same clause set always yields the same
//! outcome, the same model and the same core.
//!
//! ```
//! use satrace::{Lit, SolveResult, Solver};
//!
//! let mut solver = Solver::new();
//! solver.add_dimacs_cnf(&b"p cnf 2 2\n1 2 0\n-1 0\n"[..]).unwrap();
//!
//! match solver.solve() {
//!     SolveResult::Sat(model) => assert!(model.contains(Lit::from_dimacs(2))),
//!     SolveResult::Unsat(_) => unreachable!(),
//! }
//! ```

pub mod clause;
pub mod db;
pub mod proof;
pub mod solver;
pub mod trace;
pub mod trail;

mod analyze;
mod decision;
mod prop;
mod search;

pub use satrace_formula::{CnfFormula, Lit, Var};

pub use clause::{Clause, ClauseStatus};
pub use db::ClauseId;
pub use proof::{Core, CoreClause};
pub use solver::{Model, SolveResult, Solver};
pub use trace::TraceEvent;
pub use trail::{Reason, Step, Trail};
