use crate::ast::{Binders, Decl, Ident, Sort, Term};
use std::time::Duration;

/// Outcome of asking whether a formula is provable from the current
/// assumptions. `Unknown` is always a conservative answer: callers must
/// treat it as "no proof", never as a proof of either polarity.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CheckResult {
    Provable,
    Refuted,
    Unknown,
}

/// Heuristic probes run under a bounded timeout; the one authoritative
/// sufficiency assertion per consumption runs unbounded.
#[derive(Copy, Clone, Debug)]
pub enum Timeout {
    Bounded(Duration),
    Unbounded,
}

/// The constraint-solver boundary. One session per verification branch;
/// calls are synchronous and serialized by the caller.
pub trait Decider {
    /// Attempt to prove `term` from the current assumptions.
    fn check(&mut self, term: &Term, timeout: Timeout) -> CheckResult;

    /// Authoritative proof attempt, no timeout.
    fn assert(&mut self, term: &Term) -> bool {
        matches!(self.check(term, Timeout::Unbounded), CheckResult::Provable)
    }

    fn assume(&mut self, term: &Term);

    /// Fresh constant of the given sort.
    fn fresh(&mut self, prefix: &str, sort: &Sort) -> Term;

    /// Fresh function symbol applied to the given terms; a fresh constant
    /// when `args` is empty. Used for values that must vary with the
    /// branch's free variables.
    fn fresh_applied(&mut self, prefix: &str, sort: &Sort, args: &[Term]) -> Term;

    /// Introduce a named pure function (define-fun) abstracting `body`.
    /// Returns the new name and its declaration; the caller applies it.
    fn fresh_macro(&mut self, prefix: &str, params: &Binders<Sort>, body: &Term) -> (Ident, Decl);

    /// True when the branch's assumptions are already contradictory,
    /// so nothing needs to hold on it.
    fn smoke_check(&mut self) -> bool;
}
