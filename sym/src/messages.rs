use crate::ast::Span;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct MessageLabel {
    pub span: Span,
    pub note: String,
}
pub type MessageLabels = Arc<Vec<MessageLabel>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Error,
    Warning,
    Note,
}

/// A reportable diagnostic: a top-level note plus primary spans and
/// labeled secondary spans, in the style of rustc's MultiSpan.
#[derive(Debug, Clone)]
pub struct MessageX {
    pub level: MessageLevel,
    pub note: String,
    pub spans: Vec<Span>,
    pub labels: Vec<MessageLabel>,
}
pub type Message = Arc<MessageX>;

pub trait Diagnostics {
    /// Display the corresponding message
    fn report(&self, msg: &Message) {
        self.report_as(msg, msg.level)
    }

    /// Override the msg's reporting level
    fn report_as(&self, msg: &Message, msg_as: MessageLevel);
}

pub fn message<S: Into<String>>(level: MessageLevel, note: S, span: &Span) -> Message {
    Arc::new(MessageX { level, note: note.into(), spans: vec![span.clone()], labels: Vec::new() })
}

pub fn message_bare<S: Into<String>>(level: MessageLevel, note: S) -> Message {
    Arc::new(MessageX { level, note: note.into(), spans: vec![], labels: Vec::new() })
}

pub fn note<S: Into<String>>(note: S, span: &Span) -> Message {
    message(MessageLevel::Note, note, span)
}

pub fn error_bare<S: Into<String>>(note: S) -> Message {
    message_bare(MessageLevel::Error, note)
}

pub fn error<S: Into<String>>(note: S, span: &Span) -> Message {
    message(MessageLevel::Error, note, span)
}

pub fn error_with_label<S: Into<String>, T: Into<String>>(
    note: S,
    span: &Span,
    label: T,
) -> Message {
    Arc::new(MessageX {
        level: MessageLevel::Error,
        note: note.into(),
        spans: vec![span.clone()],
        labels: vec![MessageLabel { span: span.clone(), note: label.into() }],
    })
}

impl MessageX {
    /// Add a new primary span with a label (rendered with ^^^^^^)
    pub fn primary_label<S: Into<String>>(&self, span: &Span, label: S) -> Message {
        let mut e = self.clone();
        e.spans.push(span.clone());
        e.labels.push(MessageLabel { span: span.clone(), note: label.into() });
        Arc::new(e)
    }

    /// Add a secondary span to be highlighted, with a label (rendered with ------)
    pub fn secondary_label<S: Into<String>>(&self, span: &Span, label: S) -> Message {
        let mut e = self.clone();
        e.labels.push(MessageLabel { span: span.clone(), note: label.into() });
        Arc::new(e)
    }
}

pub fn all_msgs_from_error(error: &Message) -> Vec<String> {
    let mut v = vec![error.note.clone()];
    for l in &error.labels {
        v.push(l.note.clone());
    }
    v
}

/// Writes diagnostics to stderr; the default reporter for embedders
/// that do not thread their own.
pub struct StderrDiagnostics {}

impl Diagnostics for StderrDiagnostics {
    fn report_as(&self, msg: &Message, msg_as: MessageLevel) {
        let prefix = match msg_as {
            MessageLevel::Error => "error",
            MessageLevel::Warning => "warning",
            MessageLevel::Note => "note",
        };
        eprintln!("{}: {}", prefix, msg.note);
        for span in &msg.spans {
            if !span.as_string.is_empty() {
                eprintln!("   --> {}", span.as_string);
            }
        }
        for label in &msg.labels {
            eprintln!("    = {}: {}", label.span.as_string, label.note);
        }
    }
}
