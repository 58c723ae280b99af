use crate::chunk::{Chunk, Heap, ResourceId};
use crate::recorder::EffectsRecorder;
use std::sync::Arc;
use sym::ast::{Term, Terms};

/// Cache key for a summarization: everything the computation depends on.
/// Structural and order-sensitive over the candidate sequence; a
/// differently ordered but semantically identical sequence misses the
/// cache and recomputes from scratch.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SummaryKey {
    pub resource: ResourceId,
    pub chunks: Vec<Chunk>,
    pub args: Terms,
}

/// A unified snapshot is either a newly synthesized constant whose meaning
/// comes only from its definitional implications, or provably equal to an
/// existing chunk's snapshot and so needs no new symbol.
#[derive(Clone, Debug)]
pub enum SnapshotTag {
    Fresh(Term),
    Reused(Term),
}

impl SnapshotTag {
    pub fn term(&self) -> &Term {
        match self {
            SnapshotTag::Fresh(t) => t,
            SnapshotTag::Reused(t) => t,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, SnapshotTag::Fresh(_))
    }
}

#[derive(Clone, Debug)]
pub struct SummaryEntry {
    pub snapshot: SnapshotTag,
    pub definitions: Arc<Vec<Term>>,
    /// guarded sum of how much permission across the candidates could
    /// apply to the query arguments
    pub perm_sum: Term,
}

/// Per-branch verification state. Immutable by convention: operations take
/// a state by value and hand back a new one, so branch snapshotting during
/// proof-search backtracking is just a clone.
#[derive(Clone, Debug, Default)]
pub struct State {
    pub heap: Heap,
    pub cache: im::HashMap<SummaryKey, SummaryEntry>,
    pub recorder: EffectsRecorder,
}

impl State {
    pub fn new(heap: Heap) -> State {
        State { heap, cache: im::HashMap::new(), recorder: EffectsRecorder::Disabled }
    }

    pub fn with_recording(heap: Heap) -> State {
        State {
            heap,
            cache: im::HashMap::new(),
            recorder: EffectsRecorder::Recording(Default::default()),
        }
    }
}
