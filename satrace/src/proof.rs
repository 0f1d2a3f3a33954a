//! Resolution proofs and unsat cores.
use rustc_hash::FxHashSet;

use satrace_formula::Lit;

use crate::db::{ClauseDb, ClauseId};

/// An original clause appearing in an unsat core.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CoreClause {
    name: Option<String>,
    lits: Vec<Lit>,
}

impl CoreClause {
    /// Name the clause was added under, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The literals of the clause, sorted by code.
    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }
}

/// A set of original clauses sufficient to derive the empty clause by resolution.
///
/// Self contained: the clauses are copied out of the solver's database, so the core stays usable
/// after the solver is dropped or solved again. Iteration order follows the clause insertion
/// order of the formula.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Core {
    clauses: Vec<CoreClause>,
}

impl Core {
    /// Number of clauses in the core.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Whether the core is empty. Only the case for a never-failing proof, never for a real
    /// unsat outcome.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Iterator over the core's clauses.
    pub fn iter(&self) -> impl Iterator<Item = &CoreClause> {
        self.clauses.iter()
    }

    /// Whether some clause of the core has exactly the given literal set.
    pub fn contains(&self, lits: &[Lit]) -> bool {
        let mut sorted = lits.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        self.clauses.iter().any(|clause| clause.lits == sorted)
    }
}

/// Reduce proof steps to the original clauses they rest on.
///
/// Learned clauses among the steps are replaced by their own resolution steps until only
/// original clauses remain. The resolution step lists form a DAG, so a visited set suffices to
/// terminate.
pub(crate) fn extract_core(db: &ClauseDb, proof: &[ClauseId]) -> Core {
    let mut pending: Vec<ClauseId> = proof.to_vec();
    let mut seen: FxHashSet<ClauseId> = pending.iter().copied().collect();
    let mut originals: Vec<ClauseId> = vec![];

    while let Some(id) = pending.pop() {
        let clause = db.clause(id);
        if clause.is_learned() {
            for &step in clause.resolution_steps() {
                if seen.insert(step) {
                    pending.push(step);
                }
            }
        } else {
            originals.push(id);
        }
    }

    originals.sort_unstable();

    Core {
        clauses: originals
            .into_iter()
            .map(|id| {
                let clause = db.clause(id);
                CoreClause {
                    name: clause.name().map(String::from),
                    lits: clause.lits().to_vec(),
                }
            })
            .collect(),
    }
}
