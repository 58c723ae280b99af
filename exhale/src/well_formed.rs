use crate::chunk::{Chunk, ResourceKind};
use crate::def::WF_RECEIVER;
use crate::state::State;
use indexmap::IndexSet;
use std::collections::HashMap;
use sym::ast::{Ident, Term};
use sym::ast_util::{full_perm, is_true, mk_eq, mk_ite, mk_le, no_perm, ref_sort, str_ident, str_var};
use sym::decider::Decider;
use sym::visitor::subst_term;

/// Maintenance pass run after heap-affecting operations: for every field,
/// the total permission compatible with any single concrete receiver is at
/// most full permission. Quantifier-free: the per-field permission sum is
/// parameterized by a placeholder receiver and instantiated at each
/// concrete chunk's own receiver.
pub fn assume_field_bounds(state: &State, decider: &mut dyn Decider) {
    let mut fields: IndexSet<Ident> = IndexSet::new();
    for chunk in state.heap.iter() {
        if chunk.resource.kind == ResourceKind::Field {
            fields.insert(chunk.resource.name.clone());
        }
    }

    for field in fields {
        let chunks: Vec<Chunk> = state
            .heap
            .iter()
            .filter(|c| c.resource.kind == ResourceKind::Field && c.resource.name == field)
            .cloned()
            .collect();
        let receiver = str_var(WF_RECEIVER, &ref_sort());
        let mut sum_terms: Vec<Term> = Vec::new();
        for chunk in &chunks {
            let recv = match chunk.args.first() {
                Some(recv) => recv.clone(),
                None => continue,
            };
            sum_terms.push(mk_ite(&mk_eq(&recv, &receiver), &chunk.perm, &no_perm()));
        }
        // the guarded sum, not yet instantiated
        let sum = sym::ast_util::mk_add(&sum_terms);

        for chunk in &chunks {
            let recv = match chunk.args.first() {
                Some(recv) => recv.clone(),
                None => continue,
            };
            let mut substs: HashMap<Ident, Term> = HashMap::new();
            substs.insert(str_ident(WF_RECEIVER), recv);
            let bound = mk_le(&subst_term(&sum, &substs), &full_perm());
            if !is_true(&bound) {
                decider.assume(&bound);
            }
        }
    }
}
