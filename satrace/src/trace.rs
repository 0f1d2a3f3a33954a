//! Structured trace events of the search.
//!
//! Tracing is injected per solver through [`Solver::set_trace`](crate::solver::Solver::set_trace)
//! rather than going through any global state. The `log` facade is used separately for human
//! readable debug output.
use satrace_formula::Lit;

use crate::db::ClauseId;

/// A single event of the search, reported to the registered trace callback.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TraceEvent {
    /// A decision opened a new level.
    Decision { lit: Lit, level: usize },
    /// A unit propagation forced a literal.
    Propagation { lit: Lit, antecedent: ClauseId },
    /// A clause became falsified.
    Conflict { clause: ClauseId },
    /// Conflict analysis produced a learned clause.
    Learn { clause: ClauseId, lits: Vec<Lit> },
    /// Backjumping removed all assignments above the target level.
    Backjump { from_level: usize, to_level: usize },
}

/// The registered trace callback, if any.
///
/// Events are constructed lazily so that a solver without a callback pays nothing.
#[derive(Default)]
pub(crate) struct TraceHook<'a> {
    callback: Option<Box<dyn FnMut(&TraceEvent) + 'a>>,
}

impl<'a> TraceHook<'a> {
    pub fn set(&mut self, callback: impl FnMut(&TraceEvent) + 'a) {
        self.callback = Some(Box::new(callback));
    }

    pub fn emit(&mut self, event: impl FnOnce() -> TraceEvent) {
        if let Some(callback) = &mut self.callback {
            callback(&event());
        }
    }
}
