use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type RawSpan = Arc<dyn std::any::Any + std::marker::Sync + std::marker::Send>;
#[derive(Clone, Serialize, Deserialize)] // for Debug, see ast_util
pub struct Span {
    #[serde(skip)]
    #[serde(default = "crate::ast_util::empty_raw_span")]
    pub raw_span: RawSpan,
    pub as_string: String, // if we can't print raw_span, print as_string instead
}

pub type Ident = Arc<String>;

pub type Sort = Arc<SortX>;
pub type Sorts = Arc<Vec<Sort>>;
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SortX {
    Bool,
    Int,
    /// Fractional permission amounts, logically confined to [0, 1]
    Perm,
    /// Snapshot values read from resource chunks
    Snap,
    /// Heap references
    Ref,
    Named(Ident),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Constant {
    Bool(bool),
    Int(Arc<BigInt>),
    // numerator, denominator; denominator > 0, reduced by gcd (see ast_util::mk_frac)
    Frac(Arc<BigInt>, Arc<BigInt>),
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Implies,
    Eq,
    Le,
    Lt,
    Ge,
    Gt,
    Sub,
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MultiOp {
    And,
    Or,
    Add,
}

pub type Binder<A> = Arc<BinderX<A>>;
pub type Binders<A> = Arc<Vec<Binder<A>>>;
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct BinderX<A: Clone> {
    pub name: Ident,
    pub a: A,
}

pub type Term = Arc<TermX>;
pub type Terms = Arc<Vec<Term>>;
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TermX {
    Const(Constant),
    Var(Ident, Sort),
    // Application of a declared or defined pure function; carries its result sort
    App(Ident, Terms, Sort),
    Unary(UnaryOp, Term),
    Binary(BinaryOp, Term, Term),
    Multi(MultiOp, Terms),
    Ite(Term, Term, Term),
}

impl TermX {
    pub fn sort(&self) -> Sort {
        match self {
            TermX::Const(Constant::Bool(_)) => Arc::new(SortX::Bool),
            TermX::Const(Constant::Int(_)) => Arc::new(SortX::Int),
            TermX::Const(Constant::Frac(_, _)) => Arc::new(SortX::Perm),
            TermX::Var(_, sort) => sort.clone(),
            TermX::App(_, _, sort) => sort.clone(),
            TermX::Unary(UnaryOp::Not, _) => Arc::new(SortX::Bool),
            TermX::Binary(BinaryOp::Sub, lhs, _) => lhs.sort(),
            TermX::Binary(_, _, _) => Arc::new(SortX::Bool),
            TermX::Multi(MultiOp::Add, terms) => match terms.first() {
                Some(t) => t.sort(),
                None => Arc::new(SortX::Perm),
            },
            TermX::Multi(_, _) => Arc::new(SortX::Bool),
            TermX::Ite(_, thn, _) => thn.sort(),
        }
    }
}

pub type Decl = Arc<DeclX>;
pub type Decls = Arc<Vec<Decl>>;
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum DeclX {
    Const(Ident, Sort),
    Fun(Ident, Sorts, Sort),
    // define-fun: a named pure function abstracting a recurring subexpression
    MacroDef(Ident, Binders<Sort>, Term),
    Axiom(Term),
}
