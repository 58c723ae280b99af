use crate::chunk::{Chunk, Heap, ResourceId};
use crate::config::Config;
use crate::def::{PREFIX_SUMMARY_SNAP, PREFIX_TAKEN_MACRO};
use crate::errors::{insufficient_permission, AccessResult, Failure};
use crate::state::State;
use crate::summarize::{candidate_guard, summarize};
use std::sync::Arc;
use sym::ast::{Binders, Sort, Term, Terms};
use sym::ast_util::{
    ident_binder, ident_var, is_no_perm, mk_add, mk_eq, mk_ite, mk_le, mk_min, mk_sub, no_perm,
    snap_sort,
};
use sym::decider::{CheckResult, Decider};
use sym::messages::Message;
use sym::visitor::free_vars;

/// Accumulator threaded through the split fold; no step shares mutable
/// variables with any other.
struct SplitStep {
    need: Term,
    sum_terms: Vec<Term>,
    out: Vec<Chunk>,
    still_needed: bool,
}

/// Greedily remove a concrete permission amount from the candidate chunks.
/// Produces the updated heap and a snapshot of what was consumed, or fails
/// if sufficiency is not provable.
pub(crate) fn consume_exact(
    mut state: State,
    decider: &mut dyn Decider,
    config: &Config,
    resource: &ResourceId,
    args: &Terms,
    required: &Term,
    descriptor: &Message,
) -> AccessResult<(State, Term)> {
    let (candidates, others) = state.heap.partition(resource);
    if candidates.is_empty() {
        // nothing to take from; fine iff nothing is required
        return if decider.assert(&mk_eq(required, &no_perm())) {
            let snap = decider.fresh(PREFIX_SUMMARY_SNAP, &snap_sort());
            Ok((state, snap))
        } else {
            Err(insufficient_permission(descriptor, resource))
        };
    }

    let ordered = order_candidates(decider, config, &candidates, args);

    let mut step = SplitStep {
        need: required.clone(),
        sum_terms: Vec::new(),
        out: Vec::new(),
        still_needed: true,
    };
    for chunk in ordered {
        if !step.still_needed {
            // request already satisfied; remaining chunks pass through
            step.out.push(chunk);
            continue;
        }
        if config.canceled() {
            return Err(Failure::Canceled);
        }
        let guard = candidate_guard(&chunk, args);
        step.sum_terms.push(mk_ite(&guard, &chunk.perm, &no_perm()));
        let ideal = mk_ite(&guard, &mk_min(&chunk.perm, &step.need), &no_perm());
        // abstract the amount taken behind a named pure function, keeping
        // the formulas of later steps linear in the number of chunks
        let taken = abstract_taken(decider, &mut state, &ideal);
        let new_perm = mk_sub(&chunk.perm, &taken);
        step.need = mk_sub(&step.need, &taken);
        // drop the chunk only on proof; unknown conservatively retains it
        let provably_empty = decider.check(&mk_le(&new_perm, &no_perm()), config.step_timeout())
            == CheckResult::Provable;
        if !provably_empty {
            step.out.push(chunk.with_perm(&new_perm));
        }
        if config.canceled() {
            return Err(Failure::Canceled);
        }
        if decider.check(&mk_eq(&step.need, &no_perm()), config.step_timeout())
            == CheckResult::Provable
        {
            step.still_needed = false;
        }
    }

    // re-establish resource well-formedness for the retained chunks
    for chunk in &step.out {
        for prop in chunk.properties() {
            decider.assume(&prop);
        }
    }

    // the caller always receives a coherent read value, computed over the
    // original candidate set even when the fold stopped early
    let (new_state, summary) = summarize(state, decider, config, resource, &candidates, args);
    state = new_state;
    for def in summary.definitions.iter() {
        decider.assume(def);
    }

    if step.still_needed {
        let perm_sum = mk_add(&step.sum_terms);
        if is_no_perm(&perm_sum) {
            // no candidate could possibly apply; skip the solver
            return Err(insufficient_permission(descriptor, resource));
        }
        // the one authoritative, unbounded check of this consumption
        if !decider.assert(&mk_eq(&step.need, &no_perm())) {
            return Err(insufficient_permission(descriptor, resource));
        }
    }

    state.heap = Heap::from_chunks(others.into_iter().chain(step.out.into_iter()).collect());
    Ok((state, summary.snapshot.term().clone()))
}

/// Order candidates to minimize distinct amount-taken abstractions: a
/// proven definite alias first, then chunks whose arguments syntactically
/// match the query, then the rest in their original relative order.
fn order_candidates(
    decider: &mut dyn Decider,
    config: &Config,
    candidates: &[Chunk],
    args: &Terms,
) -> Vec<Chunk> {
    let definite = find_definite_alias(decider, config, candidates, args);
    let mut first: Vec<Chunk> = Vec::new();
    let mut syntactic: Vec<Chunk> = Vec::new();
    let mut rest: Vec<Chunk> = Vec::new();
    for (i, chunk) in candidates.iter().enumerate() {
        if Some(i) == definite {
            first.push(chunk.clone());
        } else if chunk.args == *args {
            syntactic.push(chunk.clone());
        } else {
            rest.push(chunk.clone());
        }
    }
    first.extend(syntactic);
    first.extend(rest);
    first
}

/// Alias oracle: the first candidate whose arguments provably equal the
/// query arguments within the heuristic timeout.
fn find_definite_alias(
    decider: &mut dyn Decider,
    config: &Config,
    candidates: &[Chunk],
    args: &Terms,
) -> Option<usize> {
    for (i, chunk) in candidates.iter().enumerate() {
        // syntactic matches are already prioritized; probing them again
        // would waste a solver query
        if chunk.args == *args {
            continue;
        }
        if decider.check(&candidate_guard(chunk, args), config.heuristic_timeout())
            == CheckResult::Provable
        {
            return Some(i);
        }
    }
    None
}

/// Declare `taken%N(vars) := ideal` and return the application, recording
/// the declaration for later replay.
fn abstract_taken(decider: &mut dyn Decider, state: &mut State, ideal: &Term) -> Term {
    let vars = free_vars(ideal);
    let params: Binders<Sort> =
        Arc::new(vars.iter().map(|(x, sort)| ident_binder(x, sort)).collect());
    let (name, decl) = decider.fresh_macro(PREFIX_TAKEN_MACRO, &params, ideal);
    state.recorder.record_macro(&decl);
    let var_terms: Vec<Term> = vars.iter().map(|(x, sort)| ident_var(x, sort)).collect();
    sym::ast_util::ident_apply(&name, &var_terms, &ideal.sort())
}
