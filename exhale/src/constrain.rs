use crate::chunk::{Heap, ResourceId};
use crate::config::Config;
use crate::def::{PREFIX_CONSTRAINED_SNAP, PREFIX_CONSTRAINED_TAKE};
use crate::errors::{insufficient_permission, AccessResult, Failure};
use crate::state::State;
use crate::summarize::candidate_guard;
use sym::ast::{Term, Terms};
use sym::ast_util::{
    mk_add, mk_and, mk_eq, mk_implies, mk_ite, mk_le, mk_lt, mk_not, mk_sub, no_perm, perm_sort,
    snap_sort,
};
use sym::decider::Decider;
use sym::messages::Message;

/// Consumption of a solver-determined amount: the required amount is an
/// existential unknown, and every candidate chunk contributes a fresh
/// bounded unknown toward it. Only runs when no side-effect recorder is
/// active.
///
/// Relies on the heap well-formedness precondition, maintained upstream,
/// that at most one candidate chunk genuinely aliases the query; it is
/// not re-derived here.
pub(crate) fn consume_constrainable(
    mut state: State,
    decider: &mut dyn Decider,
    config: &Config,
    resource: &ResourceId,
    args: &Terms,
    unknown: &Term,
    descriptor: &Message,
) -> AccessResult<(State, Term)> {
    let (candidates, others) = state.heap.partition(resource);
    if candidates.is_empty() {
        return if decider.smoke_check() {
            let snap = decider.fresh(PREFIX_CONSTRAINED_SNAP, &snap_sort());
            Ok((state, snap))
        } else {
            Err(insufficient_permission(descriptor, resource))
        };
    }

    let snap = decider.fresh(PREFIX_CONSTRAINED_SNAP, &snap_sort());
    let mut taken_terms: Vec<Term> = Vec::new();
    let mut sum_terms: Vec<Term> = Vec::new();
    let mut updated = others;
    for chunk in &candidates {
        if config.canceled() {
            return Err(Failure::Canceled);
        }
        let guard = candidate_guard(chunk, args);
        let take = decider.fresh(PREFIX_CONSTRAINED_TAKE, &perm_sort());
        decider.assume(&mk_le(&no_perm(), &take));
        decider.assume(&mk_le(&take, &chunk.perm));
        // non-candidates contribute nothing
        decider.assume(&mk_implies(&mk_not(&guard), &mk_eq(&take, &no_perm())));
        // a contributing chunk fixes the result snapshot
        decider.assume(&mk_implies(&mk_lt(&no_perm(), &take), &mk_eq(&snap, &chunk.snap)));
        sum_terms.push(mk_ite(&guard, &chunk.perm, &no_perm()));
        taken_terms.push(take.clone());
        updated.push(chunk.with_perm(&mk_sub(&chunk.perm, &take)));
    }

    let total = mk_add(&taken_terms);
    let available = mk_add(&sum_terms);
    // whenever anything is available, the split is consistent and nontrivial
    decider.assume(&mk_implies(
        &mk_not(&mk_eq(&available, &no_perm())),
        &mk_and(&[mk_lt(&no_perm(), &total), mk_lt(&total, &available)]),
    ));
    if !decider.assert(&mk_lt(&no_perm(), &total)) {
        return Err(insufficient_permission(descriptor, resource));
    }
    decider.assume(&mk_eq(unknown, &total));

    state.heap = Heap::from_chunks(updated);
    Ok((state, snap))
}
