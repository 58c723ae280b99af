use crate::chunk::ResourceId;
use crate::config::Config;
use crate::def::PREFIX_SUMMARY_SNAP;
use crate::errors::{insufficient_permission, AccessResult};
use crate::state::State;
use crate::summarize::summarize;
use sym::ast::{Term, Terms};
use sym::ast_util::{mk_lt, no_perm, snap_sort};
use sym::decider::Decider;
use sym::messages::Message;

/// Read-only access: assert that positive permission to the resource at
/// the given arguments exists and return the unified snapshot. The heap
/// is not changed.
pub fn lookup(
    state: State,
    decider: &mut dyn Decider,
    config: &Config,
    resource: &ResourceId,
    args: &Terms,
    descriptor: &Message,
) -> AccessResult<(State, Term)> {
    let candidates = state.heap.by_resource(resource);
    if candidates.is_empty() {
        // nothing to read from; only a dead branch succeeds vacuously
        return if decider.smoke_check() {
            let snap = decider.fresh(PREFIX_SUMMARY_SNAP, &snap_sort());
            Ok((state, snap))
        } else {
            Err(insufficient_permission(descriptor, resource))
        };
    }
    let (state, summary) = summarize(state, decider, config, resource, &candidates, args);
    for def in summary.definitions.iter() {
        decider.assume(def);
    }
    if decider.assert(&mk_lt(&no_perm(), &summary.perm_sum)) {
        Ok((state, summary.snapshot.term().clone()))
    } else {
        Err(insufficient_permission(descriptor, resource))
    }
}
