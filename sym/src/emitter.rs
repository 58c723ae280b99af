use crate::ast::{Decl, Term};
use crate::printer::{decl_to_node, node_to_string_indent, term_to_node};
use sise::Node;
use std::io::Write;

/// Writes a transcript of solver traffic to an optional log file.
pub struct Emitter {
    log: Option<Box<dyn std::io::Write>>,
    /// string of space characters representing current indentation level
    current_indent: String,
}

impl Emitter {
    pub fn new(writer: Option<Box<dyn std::io::Write>>) -> Self {
        Emitter { log: writer, current_indent: "".to_string() }
    }

    pub fn set_log(&mut self, writer: Option<Box<dyn std::io::Write>>) {
        self.log = writer;
    }

    pub fn blank_line(&mut self) {
        if let Some(w) = &mut self.log {
            writeln!(w, "").unwrap();
            w.flush().unwrap();
        }
    }

    // Single-line comment, emitted with ";;"
    pub fn comment(&mut self, s: &str) {
        if let Some(w) = &mut self.log {
            writeln!(w, "{};; {}", self.current_indent, s).unwrap();
            w.flush().unwrap();
        }
    }

    pub fn log_node(&mut self, node: &Node) {
        if let Some(w) = &mut self.log {
            let rendered = node_to_string_indent(&self.current_indent, node);
            writeln!(w, "{}{}", self.current_indent, rendered).unwrap();
            w.flush().unwrap();
        }
    }

    pub fn log_decl(&mut self, decl: &Decl) {
        if self.log.is_some() {
            self.log_node(&decl_to_node(decl));
        }
    }

    pub fn log_assume(&mut self, term: &Term) {
        if self.log.is_some() {
            let node = Node::List(vec![Node::Atom("assert".to_string()), term_to_node(term)]);
            self.log_node(&node);
        }
    }

    pub fn log_check(&mut self, term: &Term, verdict: &str) {
        if self.log.is_some() {
            self.comment(&format!("check -> {}", verdict));
            let node = Node::List(vec![Node::Atom("check".to_string()), term_to_node(term)]);
            self.log_node(&node);
        }
    }
}
