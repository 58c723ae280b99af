use crate::chunk::ResourceId;
use crate::config::Config;
use crate::def::PREFIX_SUMMARY_SNAP;
use crate::errors::{insufficient_permission, AccessResult};
use crate::state::State;
use crate::summarize::summarize;
use sym::ast::{Term, Terms};
use sym::ast_util::{mk_eq, mk_ge, mk_le, mk_lt, no_perm, snap_sort};
use sym::decider::Decider;
use sym::messages::Message;

/// How much permission a consumption removes.
#[derive(Clone, Debug)]
pub enum Amount {
    /// a fixed (possibly symbolic) fraction term
    Exact(Term),
    /// an existential unknown, to be constrained by the solver; carries
    /// the variable standing for the amount
    Constrainable(Term),
}

/// Remove permission from the heap, returning the updated state and a
/// snapshot of what was consumed.
///
/// When the branch records side effects (or the configuration forces it),
/// dropping chunks silently would lose fresh-value bookkeeping, so the
/// heap is left unchanged and only sufficiency is asserted. Otherwise the
/// splitting algorithms derive the precise resulting heap.
pub fn consume(
    state: State,
    decider: &mut dyn Decider,
    config: &Config,
    resource: &ResourceId,
    args: &Terms,
    amount: &Amount,
    descriptor: &Message,
) -> AccessResult<(State, Term)> {
    if state.recorder.is_recording() || config.assert_only {
        consume_by_assertion(state, decider, config, resource, args, amount, descriptor)
    } else {
        match amount {
            Amount::Exact(required) => crate::exact::consume_exact(
                state, decider, config, resource, args, required, descriptor,
            ),
            Amount::Constrainable(unknown) => crate::constrain::consume_constrainable(
                state, decider, config, resource, args, unknown, descriptor,
            ),
        }
    }
}

/// Summarize-and-assert path: behaves like lookup, but asserts that the
/// required amount is available. Never removes or splits any chunk.
fn consume_by_assertion(
    state: State,
    decider: &mut dyn Decider,
    config: &Config,
    resource: &ResourceId,
    args: &Terms,
    amount: &Amount,
    descriptor: &Message,
) -> AccessResult<(State, Term)> {
    let candidates = state.heap.by_resource(resource);
    if candidates.is_empty() {
        if decider.smoke_check() {
            let snap = decider.fresh(PREFIX_SUMMARY_SNAP, &snap_sort());
            return Ok((state, snap));
        }
        return match amount {
            Amount::Exact(required) if decider.assert(&mk_eq(required, &no_perm())) => {
                let snap = decider.fresh(PREFIX_SUMMARY_SNAP, &snap_sort());
                Ok((state, snap))
            }
            _ => Err(insufficient_permission(descriptor, resource)),
        };
    }
    let (state, summary) = summarize(state, decider, config, resource, &candidates, args);
    for def in summary.definitions.iter() {
        decider.assume(def);
    }
    match amount {
        Amount::Exact(required) => {
            if decider.assert(&mk_ge(&summary.perm_sum, required)) {
                Ok((state, summary.snapshot.term().clone()))
            } else {
                Err(insufficient_permission(descriptor, resource))
            }
        }
        Amount::Constrainable(unknown) => {
            if decider.assert(&mk_lt(&no_perm(), &summary.perm_sum)) {
                decider.assume(&mk_lt(&no_perm(), unknown));
                decider.assume(&mk_le(unknown, &summary.perm_sum));
                Ok((state, summary.snapshot.term().clone()))
            } else {
                Err(insufficient_permission(descriptor, resource))
            }
        }
    }
}
