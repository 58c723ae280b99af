use crate::ast::{Ident, Sort, Term, TermX};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;

pub fn map_term_visitor<F: FnMut(&Term) -> Term>(term: &Term, f: &mut F) -> Term {
    match &**term {
        TermX::Const(_) => f(term),
        TermX::Var(_, _) => f(term),
        TermX::App(x, ts, sort) => {
            let mut terms: Vec<Term> = Vec::new();
            for t in ts.iter() {
                terms.push(map_term_visitor(t, f));
            }
            let term = Arc::new(TermX::App(x.clone(), Arc::new(terms), sort.clone()));
            f(&term)
        }
        TermX::Unary(op, t1) => {
            let term1 = map_term_visitor(t1, f);
            let term = Arc::new(TermX::Unary(*op, term1));
            f(&term)
        }
        TermX::Binary(op, t1, t2) => {
            let term1 = map_term_visitor(t1, f);
            let term2 = map_term_visitor(t2, f);
            let term = Arc::new(TermX::Binary(*op, term1, term2));
            f(&term)
        }
        TermX::Multi(op, ts) => {
            let mut terms: Vec<Term> = Vec::new();
            for t in ts.iter() {
                terms.push(map_term_visitor(t, f));
            }
            let term = Arc::new(TermX::Multi(*op, Arc::new(terms)));
            f(&term)
        }
        TermX::Ite(t1, t2, t3) => {
            let term1 = map_term_visitor(t1, f);
            let term2 = map_term_visitor(t2, f);
            let term3 = map_term_visitor(t3, f);
            let term = Arc::new(TermX::Ite(term1, term2, term3));
            f(&term)
        }
    }
}

pub fn term_visitor_dfs<F: FnMut(&Term)>(term: &Term, f: &mut F) {
    f(term);
    match &**term {
        TermX::Const(_) | TermX::Var(_, _) => {}
        TermX::App(_, ts, _) | TermX::Multi(_, ts) => {
            for t in ts.iter() {
                term_visitor_dfs(t, f);
            }
        }
        TermX::Unary(_, t1) => term_visitor_dfs(t1, f),
        TermX::Binary(_, t1, t2) => {
            term_visitor_dfs(t1, f);
            term_visitor_dfs(t2, f);
        }
        TermX::Ite(t1, t2, t3) => {
            term_visitor_dfs(t1, f);
            term_visitor_dfs(t2, f);
            term_visitor_dfs(t3, f);
        }
    }
}

// There are no binders in TermX, so substitution cannot capture.
pub fn subst_term(term: &Term, substs: &HashMap<Ident, Term>) -> Term {
    map_term_visitor(term, &mut |t| match &**t {
        TermX::Var(x, _) => match substs.get(x) {
            Some(s) => s.clone(),
            None => t.clone(),
        },
        _ => t.clone(),
    })
}

/// Free variables in first-occurrence order.
pub fn free_vars(term: &Term) -> IndexMap<Ident, Sort> {
    let mut vars: IndexMap<Ident, Sort> = IndexMap::new();
    term_visitor_dfs(term, &mut |t| {
        if let TermX::Var(x, sort) = &**t {
            vars.entry(x.clone()).or_insert_with(|| sort.clone());
        }
    });
    vars
}

pub fn free_vars_terms(terms: &[Term]) -> IndexMap<Ident, Sort> {
    let mut vars: IndexMap<Ident, Sort> = IndexMap::new();
    for term in terms {
        for (x, sort) in free_vars(term) {
            vars.entry(x).or_insert(sort);
        }
    }
    vars
}
