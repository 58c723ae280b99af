use crate::chunk::{Chunk, ChunkX, ResourceId};
use crate::config::Config;
use crate::def::{PREFIX_SUMMARY_SNAP, SUMMARY_PLACEHOLDER};
use crate::state::{SnapshotTag, State, SummaryEntry, SummaryKey};
use std::collections::HashMap;
use std::sync::Arc;
use sym::ast::{BinaryOp, Ident, Term, TermX, Terms};
use sym::ast_util::{
    is_true, mk_add, mk_and, mk_args_eq, mk_eq, mk_implies, mk_ite, mk_lt, no_perm, snap_sort,
    str_ident, str_var,
};
use sym::decider::{CheckResult, Decider};
use sym::visitor::{free_vars_terms, subst_term};

/// Argument-equality guard: does this chunk apply to the query arguments?
pub(crate) fn candidate_guard(chunk: &ChunkX, args: &[Term]) -> Term {
    mk_args_eq(&chunk.args, args)
}

/// Compute (or fetch) the unified snapshot readable across all candidate
/// chunks, its definitional implications, and the guarded permission sum.
/// A cache hit returns verbatim, with no solver interaction and no new
/// assumptions.
pub fn summarize(
    mut state: State,
    decider: &mut dyn Decider,
    config: &Config,
    resource: &ResourceId,
    candidates: &[Chunk],
    args: &Terms,
) -> (State, SummaryEntry) {
    let key =
        SummaryKey { resource: resource.clone(), chunks: candidates.to_vec(), args: args.clone() };
    if config.caching {
        if let Some(entry) = state.cache.get(&key) {
            let entry = entry.clone();
            return (state, entry);
        }
    }

    let entry = if candidates.len() == 1 && !config.counterexamples {
        single_candidate(decider, config, &candidates[0], args)
    } else {
        None
    };
    let entry = match entry {
        Some(entry) => entry,
        None => general_summary(&mut state, decider, resource, candidates, args),
    };

    if config.caching {
        state.cache.insert(key, entry.clone());
    }
    (state, entry)
}

/// One bounded solver decision for the only candidate. A single atomic
/// query keeps any counterexample model consistent with the verdict, so
/// this shortcut is disabled entirely in counterexample mode.
fn single_candidate(
    decider: &mut dyn Decider,
    config: &Config,
    chunk: &Chunk,
    args: &Terms,
) -> Option<SummaryEntry> {
    match decider.check(&candidate_guard(chunk, args), config.heuristic_timeout()) {
        CheckResult::Provable => Some(SummaryEntry {
            snapshot: SnapshotTag::Reused(chunk.snap.clone()),
            definitions: Arc::new(vec![]),
            perm_sum: chunk.perm.clone(),
        }),
        CheckResult::Refuted => Some(SummaryEntry {
            snapshot: SnapshotTag::Reused(chunk.snap.clone()),
            definitions: Arc::new(vec![]),
            perm_sum: no_perm(),
        }),
        CheckResult::Unknown => None,
    }
}

fn general_summary(
    state: &mut State,
    decider: &mut dyn Decider,
    resource: &ResourceId,
    candidates: &[Chunk],
    args: &Terms,
) -> SummaryEntry {
    let placeholder = str_var(SUMMARY_PLACEHOLDER, &snap_sort());
    let mut definitions: Vec<Term> = Vec::new();
    let mut sum_terms: Vec<Term> = Vec::new();
    for chunk in candidates {
        let guard = candidate_guard(chunk, args);
        let applies = mk_and(&[guard.clone(), mk_lt(&no_perm(), &chunk.perm)]);
        definitions.push(mk_implies(&applies, &mk_eq(&placeholder, &chunk.snap)));
        sum_terms.push(mk_ite(&guard, &chunk.perm, &no_perm()));
    }

    // A definition that degenerated to an unconditional equality lets the
    // unified value reuse that chunk's own snapshot; otherwise synthesize
    // a fresh constant over the query's free variables.
    let reusable = definitions.iter().find_map(|def| match &**def {
        TermX::Binary(BinaryOp::Eq, lhs, rhs) if *lhs == placeholder => Some(rhs.clone()),
        _ => None,
    });
    let snapshot = match reusable {
        Some(snap) => SnapshotTag::Reused(snap),
        None => {
            let vars: Vec<Term> = free_vars_terms(args)
                .iter()
                .map(|(x, sort)| sym::ast_util::ident_var(x, sort))
                .collect();
            SnapshotTag::Fresh(decider.fresh_applied(PREFIX_SUMMARY_SNAP, &snap_sort(), &vars))
        }
    };

    let mut substs: HashMap<Ident, Term> = HashMap::new();
    substs.insert(str_ident(SUMMARY_PLACEHOLDER), snapshot.term().clone());
    let definitions: Vec<Term> = definitions
        .iter()
        .map(|def| subst_term(def, &substs))
        .filter(|def| match &**def {
            // the reused chunk's own definition became trivial
            TermX::Binary(BinaryOp::Eq, lhs, rhs) if lhs == rhs => false,
            _ => !is_true(def),
        })
        .collect();
    let definitions = Arc::new(definitions);

    // defining implications are assumed before the snapshot escapes
    for def in definitions.iter() {
        decider.assume(def);
    }
    if let SnapshotTag::Fresh(snap) = &snapshot {
        state.recorder.record_value_definition(resource, snap, &definitions);
    }

    SummaryEntry { snapshot, definitions, perm_sum: mk_add(&sum_terms) }
}
