use crate::ast::{
    BinaryOp, Constant, Decl, DeclX, MultiOp, Sort, SortX, Term, TermX, UnaryOp,
};
use sise::Node;

pub fn str_to_node(s: &str) -> Node {
    Node::Atom(s.to_string())
}

pub fn macro_push_node(nodes: &mut Vec<Node>, node: Node) {
    // turn a - b into a-b
    let len = nodes.len();
    if len != 0 {
        if let Node::Atom(cur) = &node {
            if let Node::Atom(prev) = &nodes[len - 1] {
                if node == "-" || prev == ":" || (prev != "-" && prev.ends_with("-")) {
                    nodes[len - 1] = Node::Atom(prev.to_owned() + cur);
                    return;
                }
            }
        }
    }
    nodes.push(node);
}

/*
examples:
  node!(my_atom)
  node!((atom1 atom2 atom-3))
  node!((atom1 (10 20 30) atom-3))
  let x = node!((10 20 30));
  node!((atom1 {x} atom-3))
There's some limited support for atoms containing hyphens, at least for atoms inside a list.
*/
#[macro_export]
macro_rules! node {
    ( - ) => { Node::Atom("-".to_string()) };
    ( { $x:expr } ) => { $x };
    ( [ $x:expr ] ) => { $x.clone() };
    ( $x:literal ) => { Node::Atom($x.to_string()) };
    ( ( $( $x:tt )* ) ) => {
        {
            #[allow(unused_mut)]
            let mut v = Vec::new();
            $($crate::printer::macro_push_node(&mut v, node!($x));)*
            Node::List(v)
        }
    };
    ( $x:tt ) => { Node::Atom(stringify!($x).to_string()) };
}
#[macro_export]
macro_rules! nodes {
   ( $( $x:tt )* ) => {
       {
           let mut v = Vec::new();
           $($crate::printer::macro_push_node(&mut v, node!($x));)*
           Node::List(v)
       }
   };
}

pub fn sort_to_node(sort: &Sort) -> Node {
    match &**sort {
        SortX::Bool => str_to_node("Bool"),
        SortX::Int => str_to_node("Int"),
        SortX::Perm => str_to_node("Perm"),
        SortX::Snap => str_to_node("Snap"),
        SortX::Ref => str_to_node("Ref"),
        SortX::Named(name) => str_to_node(name),
    }
}

fn const_to_node(c: &Constant) -> Node {
    match c {
        Constant::Bool(b) => Node::Atom(b.to_string()),
        Constant::Int(i) => Node::Atom(i.to_string()),
        Constant::Frac(n, d) => {
            Node::List(vec![str_to_node("/"), Node::Atom(n.to_string()), Node::Atom(d.to_string())])
        }
    }
}

pub fn term_to_node(term: &Term) -> Node {
    match &**term {
        TermX::Const(c) => const_to_node(c),
        TermX::Var(x, _) => Node::Atom(x.to_string()),
        TermX::App(x, ts, _) => {
            let mut nodes: Vec<Node> = vec![str_to_node(x)];
            for t in ts.iter() {
                nodes.push(term_to_node(t));
            }
            Node::List(nodes)
        }
        TermX::Unary(UnaryOp::Not, t) => Node::List(vec![str_to_node("not"), term_to_node(t)]),
        TermX::Binary(op, lhs, rhs) => {
            let s = match op {
                BinaryOp::Implies => "=>",
                BinaryOp::Eq => "=",
                BinaryOp::Le => "<=",
                BinaryOp::Lt => "<",
                BinaryOp::Ge => ">=",
                BinaryOp::Gt => ">",
                BinaryOp::Sub => "-",
            };
            Node::List(vec![str_to_node(s), term_to_node(lhs), term_to_node(rhs)])
        }
        TermX::Multi(op, ts) => {
            let s = match op {
                MultiOp::And => "and",
                MultiOp::Or => "or",
                MultiOp::Add => "+",
            };
            let mut nodes: Vec<Node> = vec![str_to_node(s)];
            for t in ts.iter() {
                nodes.push(term_to_node(t));
            }
            Node::List(nodes)
        }
        TermX::Ite(cond, thn, els) => Node::List(vec![
            str_to_node("ite"),
            term_to_node(cond),
            term_to_node(thn),
            term_to_node(els),
        ]),
    }
}

pub fn decl_to_node(decl: &Decl) -> Node {
    match &**decl {
        DeclX::Const(x, sort) => {
            Node::List(vec![str_to_node("declare-const"), str_to_node(x), sort_to_node(sort)])
        }
        DeclX::Fun(x, sorts, sort) => {
            let args = Node::List(sorts.iter().map(sort_to_node).collect());
            Node::List(vec![str_to_node("declare-fun"), str_to_node(x), args, sort_to_node(sort)])
        }
        DeclX::MacroDef(x, params, body) => {
            let params = Node::List(
                params
                    .iter()
                    .map(|b| Node::List(vec![str_to_node(&b.name), sort_to_node(&b.a)]))
                    .collect(),
            );
            Node::List(vec![
                str_to_node("define-fun"),
                str_to_node(x),
                params,
                sort_to_node(&body.sort()),
                term_to_node(body),
            ])
        }
        DeclX::Axiom(t) => Node::List(vec![str_to_node("assert"), term_to_node(t)]),
    }
}

pub struct NodeWriter {}

impl NodeWriter {
    pub fn new() -> Self {
        NodeWriter {}
    }

    fn write_node(
        &mut self,
        writer: &mut sise::SpacedStringWriter,
        node: &Node,
        break_len: usize,
        brk: bool,
    ) {
        use sise::Writer;
        let opts =
            sise::SpacedStringWriterNodeOptions { break_line_len: if brk { 0 } else { break_len } };
        match node {
            Node::Atom(a) => {
                writer.write_atom(a, opts).unwrap();
            }
            Node::List(l) => {
                writer.begin_list(opts).unwrap();
                let mut brk = false;
                for n in l {
                    self.write_node(writer, n, break_len + 1, brk);
                    match n {
                        Node::Atom(a)
                            if a == "=>" || a == "and" || a == "or" || a == "ite" || a == "assert" =>
                        {
                            brk = true;
                        }
                        _ => {}
                    }
                }
                writer.end_list(()).unwrap();
            }
        }
    }

    pub fn node_to_string_indent(&mut self, indent: &String, node: &Node) -> String {
        use sise::Writer;
        let style = sise::SpacedStringWriterStyle {
            line_break: &("\n".to_string() + &indent),
            indentation: " ",
        };
        let mut result = String::new();
        let mut string_writer = sise::SpacedStringWriter::new(style, &mut result);
        self.write_node(&mut string_writer, &node, 80, false);
        string_writer.finish(()).unwrap();
        result
    }
}

pub fn node_to_string(node: &Node) -> String {
    NodeWriter::new().node_to_string_indent(&"".to_string(), node)
}

pub fn node_to_string_indent(indent: &String, node: &Node) -> String {
    NodeWriter::new().node_to_string_indent(indent, node)
}

pub fn term_to_string(term: &Term) -> String {
    node_to_string(&term_to_node(term))
}
