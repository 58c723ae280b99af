use crate::ast::{
    BinaryOp, Binder, BinderX, Constant, Ident, MultiOp, RawSpan, Sort, SortX, Span, Term, TermX,
    UnaryOp,
};
use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use std::cmp::Ordering;
use std::sync::Arc;

pub fn empty_raw_span() -> RawSpan {
    Arc::new(())
}

impl std::fmt::Debug for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.as_string)
    }
}

pub fn mk_span(as_string: &str) -> Span {
    Span { raw_span: empty_raw_span(), as_string: as_string.to_string() }
}

pub fn str_ident(x: &str) -> Ident {
    Arc::new(x.to_string())
}

pub fn ident_binder<A: Clone>(x: &Ident, a: &A) -> Binder<A> {
    Arc::new(BinderX { name: x.clone(), a: a.clone() })
}

pub fn bool_sort() -> Sort {
    Arc::new(SortX::Bool)
}

pub fn int_sort() -> Sort {
    Arc::new(SortX::Int)
}

pub fn perm_sort() -> Sort {
    Arc::new(SortX::Perm)
}

pub fn snap_sort() -> Sort {
    Arc::new(SortX::Snap)
}

pub fn ref_sort() -> Sort {
    Arc::new(SortX::Ref)
}

pub fn ident_var(x: &Ident, sort: &Sort) -> Term {
    Arc::new(TermX::Var(x.clone(), sort.clone()))
}

pub fn str_var(x: &str, sort: &Sort) -> Term {
    Arc::new(TermX::Var(str_ident(x), sort.clone()))
}

pub fn ident_apply(x: &Ident, args: &Vec<Term>, sort: &Sort) -> Term {
    Arc::new(TermX::App(x.clone(), Arc::new(args.clone()), sort.clone()))
}

pub fn mk_true() -> Term {
    Arc::new(TermX::Const(Constant::Bool(true)))
}

pub fn mk_false() -> Term {
    Arc::new(TermX::Const(Constant::Bool(false)))
}

pub fn mk_int(i: i64) -> Term {
    Arc::new(TermX::Const(Constant::Int(Arc::new(BigInt::from(i)))))
}

fn gcd(a: &BigInt, b: &BigInt) -> BigInt {
    let mut a = a.abs();
    let mut b = b.abs();
    while !b.is_zero() {
        let r = &a % &b;
        a = b;
        b = r;
    }
    a
}

/// Fraction constant n/d, normalized to a positive, gcd-reduced denominator.
pub fn mk_frac(n: i64, d: i64) -> Term {
    mk_frac_big(BigInt::from(n), BigInt::from(d))
}

pub fn mk_frac_big(n: BigInt, d: BigInt) -> Term {
    Arc::new(TermX::Const(frac_const(n, d)))
}

fn frac_const(n: BigInt, d: BigInt) -> Constant {
    assert!(!d.is_zero(), "fraction denominator must be nonzero");
    let (mut n, mut d) = if d.is_negative() { (-n, -d) } else { (n, d) };
    let g = gcd(&n, &d);
    if !g.is_zero() && !g.is_one() {
        n = n / &g;
        d = d / &g;
    }
    Constant::Frac(Arc::new(n), Arc::new(d))
}

pub fn no_perm() -> Term {
    mk_frac(0, 1)
}

pub fn full_perm() -> Term {
    mk_frac(1, 1)
}

fn const_as_frac(c: &Constant) -> Option<(BigInt, BigInt)> {
    match c {
        Constant::Int(i) => Some(((**i).clone(), BigInt::one())),
        Constant::Frac(n, d) => Some(((**n).clone(), (**d).clone())),
        Constant::Bool(_) => None,
    }
}

// Compare by cross-multiplication; denominators are positive
pub(crate) fn const_cmp(lhs: &Constant, rhs: &Constant) -> Option<Ordering> {
    let (a, b) = const_as_frac(lhs)?;
    let (c, d) = const_as_frac(rhs)?;
    Some((a * d).cmp(&(c * b)))
}

pub(crate) fn const_add(lhs: &Constant, rhs: &Constant) -> Option<Constant> {
    let (a, b) = const_as_frac(lhs)?;
    let (c, d) = const_as_frac(rhs)?;
    Some(frac_const(a * &d + c * &b, b * d))
}

pub(crate) fn const_sub(lhs: &Constant, rhs: &Constant) -> Option<Constant> {
    let (a, b) = const_as_frac(lhs)?;
    let (c, d) = const_as_frac(rhs)?;
    Some(frac_const(a * &d - c * &b, b * d))
}

pub fn is_true(t: &Term) -> bool {
    matches!(&**t, TermX::Const(Constant::Bool(true)))
}

pub fn is_false(t: &Term) -> bool {
    matches!(&**t, TermX::Const(Constant::Bool(false)))
}

/// Is this syntactically the zero permission amount?
pub fn is_no_perm(t: &Term) -> bool {
    match &**t {
        TermX::Const(c) => const_cmp(c, &Constant::Int(Arc::new(BigInt::zero())))
            .map_or(false, |o| o == Ordering::Equal),
        _ => false,
    }
}

pub fn mk_not(t: &Term) -> Term {
    match &**t {
        TermX::Const(Constant::Bool(b)) => {
            Arc::new(TermX::Const(Constant::Bool(!b)))
        }
        TermX::Unary(UnaryOp::Not, inner) => inner.clone(),
        _ => Arc::new(TermX::Unary(UnaryOp::Not, t.clone())),
    }
}

pub fn mk_and(terms: &[Term]) -> Term {
    let mut conjuncts: Vec<Term> = Vec::new();
    for t in terms {
        if is_false(t) {
            return mk_false();
        } else if is_true(t) {
            continue;
        } else if let TermX::Multi(MultiOp::And, ts) = &**t {
            conjuncts.extend(ts.iter().cloned());
        } else {
            conjuncts.push(t.clone());
        }
    }
    match conjuncts.len() {
        0 => mk_true(),
        1 => conjuncts.swap_remove(0),
        _ => Arc::new(TermX::Multi(MultiOp::And, Arc::new(conjuncts))),
    }
}

pub fn mk_or(terms: &[Term]) -> Term {
    let mut disjuncts: Vec<Term> = Vec::new();
    for t in terms {
        if is_true(t) {
            return mk_true();
        } else if is_false(t) {
            continue;
        } else if let TermX::Multi(MultiOp::Or, ts) = &**t {
            disjuncts.extend(ts.iter().cloned());
        } else {
            disjuncts.push(t.clone());
        }
    }
    match disjuncts.len() {
        0 => mk_false(),
        1 => disjuncts.swap_remove(0),
        _ => Arc::new(TermX::Multi(MultiOp::Or, Arc::new(disjuncts))),
    }
}

pub fn mk_implies(hyp: &Term, conc: &Term) -> Term {
    if is_true(hyp) {
        conc.clone()
    } else if is_false(hyp) || is_true(conc) {
        mk_true()
    } else {
        Arc::new(TermX::Binary(BinaryOp::Implies, hyp.clone(), conc.clone()))
    }
}

pub fn mk_eq(lhs: &Term, rhs: &Term) -> Term {
    if lhs == rhs {
        return mk_true();
    }
    if let (TermX::Const(a), TermX::Const(b)) = (&**lhs, &**rhs) {
        match (a, b) {
            (Constant::Bool(x), Constant::Bool(y)) => {
                return Arc::new(TermX::Const(Constant::Bool(x == y)));
            }
            _ => {
                if let Some(ord) = const_cmp(a, b) {
                    return Arc::new(TermX::Const(Constant::Bool(ord == Ordering::Equal)));
                }
            }
        }
    }
    Arc::new(TermX::Binary(BinaryOp::Eq, lhs.clone(), rhs.clone()))
}

fn mk_cmp(op: BinaryOp, holds: fn(Ordering) -> bool, lhs: &Term, rhs: &Term) -> Term {
    if let (TermX::Const(a), TermX::Const(b)) = (&**lhs, &**rhs) {
        if let Some(ord) = const_cmp(a, b) {
            return Arc::new(TermX::Const(Constant::Bool(holds(ord))));
        }
    }
    if lhs == rhs && matches!(op, BinaryOp::Le | BinaryOp::Ge) {
        return mk_true();
    }
    Arc::new(TermX::Binary(op, lhs.clone(), rhs.clone()))
}

pub fn mk_le(lhs: &Term, rhs: &Term) -> Term {
    mk_cmp(BinaryOp::Le, |o| o != Ordering::Greater, lhs, rhs)
}

pub fn mk_lt(lhs: &Term, rhs: &Term) -> Term {
    mk_cmp(BinaryOp::Lt, |o| o == Ordering::Less, lhs, rhs)
}

pub fn mk_ge(lhs: &Term, rhs: &Term) -> Term {
    mk_cmp(BinaryOp::Ge, |o| o != Ordering::Less, lhs, rhs)
}

pub fn mk_gt(lhs: &Term, rhs: &Term) -> Term {
    mk_cmp(BinaryOp::Gt, |o| o == Ordering::Greater, lhs, rhs)
}

pub fn mk_add(terms: &[Term]) -> Term {
    let mut acc: Option<Constant> = None;
    let mut symbolic: Vec<Term> = Vec::new();
    for t in terms {
        match &**t {
            TermX::Const(c) => {
                acc = match acc {
                    None => Some(c.clone()),
                    Some(prev) => match const_add(&prev, c) {
                        Some(folded) => Some(folded),
                        None => {
                            symbolic.push(t.clone());
                            Some(prev)
                        }
                    },
                };
            }
            TermX::Multi(MultiOp::Add, ts) => symbolic.extend(ts.iter().cloned()),
            _ => symbolic.push(t.clone()),
        }
    }
    if let Some(c) = acc {
        let folded = Arc::new(TermX::Const(c));
        if !is_no_perm(&folded) || symbolic.is_empty() {
            symbolic.insert(0, folded);
        }
    }
    match symbolic.len() {
        0 => no_perm(),
        1 => symbolic.swap_remove(0),
        _ => Arc::new(TermX::Multi(MultiOp::Add, Arc::new(symbolic))),
    }
}

pub fn mk_sub(lhs: &Term, rhs: &Term) -> Term {
    if let (TermX::Const(a), TermX::Const(b)) = (&**lhs, &**rhs) {
        if let Some(folded) = const_sub(a, b) {
            return Arc::new(TermX::Const(folded));
        }
    }
    if is_no_perm(rhs) {
        return lhs.clone();
    }
    Arc::new(TermX::Binary(BinaryOp::Sub, lhs.clone(), rhs.clone()))
}

pub fn mk_ite(cond: &Term, thn: &Term, els: &Term) -> Term {
    if is_true(cond) {
        thn.clone()
    } else if is_false(cond) {
        els.clone()
    } else if thn == els {
        thn.clone()
    } else {
        Arc::new(TermX::Ite(cond.clone(), thn.clone(), els.clone()))
    }
}

/// The lesser of two permission amounts, expressed without a dedicated min operator.
pub fn mk_min(lhs: &Term, rhs: &Term) -> Term {
    if lhs == rhs {
        return lhs.clone();
    }
    if let (TermX::Const(a), TermX::Const(b)) = (&**lhs, &**rhs) {
        if let Some(ord) = const_cmp(a, b) {
            return if ord == Ordering::Greater { rhs.clone() } else { lhs.clone() };
        }
    }
    mk_ite(&mk_le(lhs, rhs), lhs, rhs)
}

/// Pairwise equality of two argument lists, conjoined.
pub fn mk_args_eq(lhs: &[Term], rhs: &[Term]) -> Term {
    assert_eq!(lhs.len(), rhs.len());
    let eqs: Vec<Term> = lhs.iter().zip(rhs.iter()).map(|(a, b)| mk_eq(a, b)).collect();
    mk_and(&eqs)
}
