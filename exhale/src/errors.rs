use crate::chunk::ResourceId;
use std::sync::Arc;
use sym::messages::{Message, MessageLevel, MessageX};

#[derive(Clone, Debug)]
pub enum Failure {
    /// A required positivity/sufficiency assertion was refuted or could
    /// not be proven.
    InsufficientPermission(Message),
    /// The verification run was canceled between solver round-trips.
    Canceled,
}

/// Success and failure are threaded explicitly; there is no local recovery
/// from a failed consumption.
pub type AccessResult<A> = Result<A, Failure>;

/// Build the reported failure from the caller's error descriptor and the
/// engine's context.
pub fn insufficient_permission(descriptor: &Message, resource: &ResourceId) -> Failure {
    let note = if descriptor.note.is_empty() {
        format!("insufficient permission for {}", resource)
    } else {
        format!("{}: insufficient permission for {}", descriptor.note, resource)
    };
    Failure::InsufficientPermission(Arc::new(MessageX {
        level: MessageLevel::Error,
        note,
        spans: descriptor.spans.clone(),
        labels: descriptor.labels.clone(),
    }))
}
