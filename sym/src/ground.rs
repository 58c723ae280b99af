use crate::ast::{
    BinaryOp, Binders, Constant, Decl, DeclX, Ident, MultiOp, Sort, Sorts, Term, TermX, UnaryOp,
};
use crate::ast_util::{
    ident_apply, ident_var, mk_add, mk_and, mk_eq, mk_ge, mk_gt, mk_implies, mk_ite, mk_le, mk_lt,
    mk_not, mk_or, mk_sub,
};
use crate::decider::{CheckResult, Decider, Timeout};
use crate::emitter::Emitter;
use crate::visitor::subst_term;
use indexmap::IndexSet;
use std::collections::HashMap;
use std::sync::Arc;

/// A decider for ground formulas: no quantifiers, decisions by constant
/// folding, macro expansion, and congruence over assumed equalities.
/// Everything it cannot decide is `Unknown`, which every caller must
/// treat conservatively, so there is no completeness obligation here.
pub struct GroundDecider {
    /// assumed atoms, simplified, in assumption order
    atoms: IndexSet<Term>,
    /// union-find parent map over terms equated by assumptions
    classes: HashMap<Term, Term>,
    /// implications whose antecedent is not yet decided
    pending: Vec<Term>,
    macros: HashMap<Ident, (Binders<Sort>, Term)>,
    decls: Vec<Decl>,
    counters: HashMap<String, u64>,
    infeasible: bool,
    log: Emitter,
}

impl GroundDecider {
    pub fn new() -> Self {
        GroundDecider {
            atoms: IndexSet::new(),
            classes: HashMap::new(),
            pending: Vec::new(),
            macros: HashMap::new(),
            decls: Vec::new(),
            counters: HashMap::new(),
            infeasible: false,
            log: Emitter::new(None),
        }
    }

    pub fn set_log(&mut self, writer: Option<Box<dyn std::io::Write>>) {
        self.log.set_log(writer);
    }

    pub fn assumption_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn macro_count(&self) -> usize {
        self.macros.len()
    }

    pub fn decls(&self) -> &Vec<Decl> {
        &self.decls
    }

    pub fn has_assumed(&self, term: &Term) -> bool {
        let s = self.simplify(term);
        self.atoms.contains(&s)
    }

    fn find(&self, t: &Term) -> Term {
        let mut cur = t.clone();
        while let Some(parent) = self.classes.get(&cur) {
            if parent == &cur {
                break;
            }
            cur = parent.clone();
        }
        cur
    }

    fn union(&mut self, a: &Term, b: &Term) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        // constants make the best representatives: they fold further
        let (child, root) = if matches!(&*ra, TermX::Const(_)) { (rb, ra) } else { (ra, rb) };
        self.classes.insert(child, root);
    }

    /// Simplify bottom-up: expand macros, fold constants through the smart
    /// constructors, replace subterms by their class representatives.
    fn simplify(&self, term: &Term) -> Term {
        let s = match &**term {
            TermX::Const(_) | TermX::Var(_, _) => term.clone(),
            TermX::App(x, ts, sort) => {
                let args: Vec<Term> = ts.iter().map(|t| self.simplify(t)).collect();
                if let Some((params, body)) = self.macros.get(x) {
                    let mut substs: HashMap<Ident, Term> = HashMap::new();
                    for (param, arg) in params.iter().zip(args.iter()) {
                        substs.insert(param.name.clone(), arg.clone());
                    }
                    return self.simplify(&subst_term(body, &substs));
                }
                Arc::new(TermX::App(x.clone(), Arc::new(args), sort.clone()))
            }
            TermX::Unary(UnaryOp::Not, t) => mk_not(&self.simplify(t)),
            TermX::Binary(op, lhs, rhs) => {
                let lhs = self.simplify(lhs);
                let rhs = self.simplify(rhs);
                match op {
                    BinaryOp::Implies => mk_implies(&lhs, &rhs),
                    BinaryOp::Eq => mk_eq(&lhs, &rhs),
                    BinaryOp::Le => mk_le(&lhs, &rhs),
                    BinaryOp::Lt => mk_lt(&lhs, &rhs),
                    BinaryOp::Ge => mk_ge(&lhs, &rhs),
                    BinaryOp::Gt => mk_gt(&lhs, &rhs),
                    BinaryOp::Sub => mk_sub(&lhs, &rhs),
                }
            }
            TermX::Multi(op, ts) => {
                let terms: Vec<Term> = ts.iter().map(|t| self.simplify(t)).collect();
                match op {
                    MultiOp::And => mk_and(&terms),
                    MultiOp::Or => mk_or(&terms),
                    MultiOp::Add => mk_add(&terms),
                }
            }
            TermX::Ite(cond, thn, els) => {
                mk_ite(&self.simplify(cond), &self.simplify(thn), &self.simplify(els))
            }
        };
        let rep = self.find(&s);
        if rep == s { s } else { rep }
    }

    fn insert_atom(&mut self, atom: Term) {
        match &*atom {
            // record both orientations of a disequality
            TermX::Unary(UnaryOp::Not, inner) => {
                if let TermX::Binary(BinaryOp::Eq, a, b) = &**inner {
                    let flipped =
                        Arc::new(TermX::Unary(UnaryOp::Not, Arc::new(TermX::Binary(BinaryOp::Eq, b.clone(), a.clone()))));
                    self.atoms.insert(flipped);
                }
                self.atoms.insert(atom);
            }
            _ => {
                self.atoms.insert(atom);
            }
        }
    }

    fn assume_inner(&mut self, term: &Term) {
        let s = self.simplify(term);
        match &*s {
            TermX::Const(Constant::Bool(true)) => {}
            TermX::Const(Constant::Bool(false)) => {
                self.infeasible = true;
            }
            TermX::Multi(MultiOp::And, ts) => {
                let ts = ts.clone();
                for t in ts.iter() {
                    self.assume_inner(t);
                }
            }
            TermX::Binary(BinaryOp::Eq, a, b) => {
                let (a, b) = (a.clone(), b.clone());
                self.union(&a, &b);
                self.insert_atom(s);
            }
            TermX::Binary(BinaryOp::Implies, _, _) => {
                // antecedent undecided; park until it settles
                self.pending.push(s);
            }
            TermX::Binary(BinaryOp::Lt, a, b) => {
                let (a, b) = (a.clone(), b.clone());
                self.insert_atom(s);
                self.insert_atom(mk_not(&mk_eq(&a, &b)));
                self.insert_atom(mk_le(&a, &b));
            }
            TermX::Binary(BinaryOp::Gt, a, b) => {
                let (a, b) = (a.clone(), b.clone());
                self.insert_atom(s);
                self.insert_atom(mk_not(&mk_eq(&a, &b)));
                self.insert_atom(mk_ge(&a, &b));
                self.insert_atom(mk_lt(&b, &a));
            }
            _ => {
                self.insert_atom(s);
            }
        }
    }

    /// Re-examine parked implications until no antecedent decides further.
    fn settle(&mut self) {
        loop {
            let mut progressed = false;
            let pending = std::mem::take(&mut self.pending);
            for imp in pending {
                let s = self.simplify(&imp);
                match &*s {
                    TermX::Binary(BinaryOp::Implies, hyp, conc) => match self.decide(hyp) {
                        CheckResult::Provable => {
                            let conc = conc.clone();
                            progressed = true;
                            self.assume_inner(&conc);
                        }
                        CheckResult::Refuted => {
                            progressed = true;
                        }
                        CheckResult::Unknown => self.pending.push(s.clone()),
                    },
                    _ => {
                        progressed = true;
                        self.assume_inner(&s);
                    }
                }
            }
            if !progressed {
                break;
            }
        }
    }

    fn decide(&self, s: &Term) -> CheckResult {
        match &**s {
            TermX::Const(Constant::Bool(true)) => return CheckResult::Provable,
            TermX::Const(Constant::Bool(false)) => return CheckResult::Refuted,
            _ => {}
        }
        if self.atoms.contains(s) {
            return CheckResult::Provable;
        }
        if self.atoms.contains(&mk_not(s)) {
            return CheckResult::Refuted;
        }
        match &**s {
            TermX::Unary(UnaryOp::Not, inner) => {
                if self.atoms.contains(inner) {
                    return CheckResult::Refuted;
                }
            }
            TermX::Multi(MultiOp::And, ts) => {
                if ts.iter().all(|t| self.decide(t) == CheckResult::Provable) {
                    return CheckResult::Provable;
                }
                if ts.iter().any(|t| self.decide(t) == CheckResult::Refuted) {
                    return CheckResult::Refuted;
                }
            }
            TermX::Multi(MultiOp::Or, ts) => {
                if ts.iter().any(|t| self.decide(t) == CheckResult::Provable) {
                    return CheckResult::Provable;
                }
            }
            TermX::Binary(BinaryOp::Eq, a, b) => {
                // symmetric orientation
                let flipped = Arc::new(TermX::Binary(BinaryOp::Eq, b.clone(), a.clone()));
                if self.atoms.contains(&flipped) {
                    return CheckResult::Provable;
                }
                if self.atoms.contains(&mk_not(&flipped)) {
                    return CheckResult::Refuted;
                }
            }
            TermX::Binary(BinaryOp::Le, a, b) => {
                if self.atoms.contains(&mk_lt(a, b)) {
                    return CheckResult::Provable;
                }
            }
            TermX::Binary(BinaryOp::Ge, a, b) => {
                if self.atoms.contains(&mk_gt(a, b)) || self.atoms.contains(&mk_lt(b, a)) {
                    return CheckResult::Provable;
                }
            }
            _ => {}
        }
        CheckResult::Unknown
    }

    fn fresh_name(&mut self, prefix: &str) -> Ident {
        let counter = self.counters.entry(prefix.to_string()).or_insert(0);
        let name = format!("{}{}", prefix, counter);
        *counter += 1;
        Arc::new(name)
    }
}

impl Decider for GroundDecider {
    fn check(&mut self, term: &Term, _timeout: Timeout) -> CheckResult {
        // a dead branch proves anything
        if self.infeasible {
            self.log.log_check(term, "provable (infeasible branch)");
            return CheckResult::Provable;
        }
        let s = self.simplify(term);
        let result = self.decide(&s);
        let verdict = match result {
            CheckResult::Provable => "provable",
            CheckResult::Refuted => "refuted",
            CheckResult::Unknown => "unknown",
        };
        self.log.log_check(term, verdict);
        result
    }

    fn assume(&mut self, term: &Term) {
        self.log.log_assume(term);
        self.assume_inner(term);
        self.settle();
    }

    fn fresh(&mut self, prefix: &str, sort: &Sort) -> Term {
        let name = self.fresh_name(prefix);
        let decl = Arc::new(DeclX::Const(name.clone(), sort.clone()));
        self.log.log_decl(&decl);
        self.decls.push(decl);
        ident_var(&name, sort)
    }

    fn fresh_applied(&mut self, prefix: &str, sort: &Sort, args: &[Term]) -> Term {
        if args.is_empty() {
            return self.fresh(prefix, sort);
        }
        let name = self.fresh_name(prefix);
        let arg_sorts: Sorts = Arc::new(args.iter().map(|a| a.sort()).collect());
        let decl = Arc::new(DeclX::Fun(name.clone(), arg_sorts, sort.clone()));
        self.log.log_decl(&decl);
        self.decls.push(decl);
        ident_apply(&name, &args.to_vec(), sort)
    }

    fn fresh_macro(&mut self, prefix: &str, params: &Binders<Sort>, body: &Term) -> (Ident, Decl) {
        let name = self.fresh_name(prefix);
        let decl = Arc::new(DeclX::MacroDef(name.clone(), params.clone(), body.clone()));
        self.log.log_decl(&decl);
        self.decls.push(decl.clone());
        self.macros.insert(name.clone(), (params.clone(), body.clone()));
        (name, decl)
    }

    fn smoke_check(&mut self) -> bool {
        self.infeasible
    }
}
