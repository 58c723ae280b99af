use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use sym::ast::{Ident, Term, Terms};
use sym::ast_util::{full_perm, is_true, mk_ge, mk_le, no_perm, str_ident};

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Field,
    Predicate,
    Wand,
}

/// Identifies a resource declared by the verified program; chunks are
/// candidates for a query only if their identifier matches.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ResourceId {
    pub kind: ResourceKind,
    pub name: Ident,
}

impl ResourceId {
    pub fn field(name: &str) -> ResourceId {
        ResourceId { kind: ResourceKind::Field, name: str_ident(name) }
    }

    pub fn predicate(name: &str) -> ResourceId {
        ResourceId { kind: ResourceKind::Predicate, name: str_ident(name) }
    }

    pub fn wand(name: &str) -> ResourceId {
        ResourceId { kind: ResourceKind::Wand, name: str_ident(name) }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self.kind {
            ResourceKind::Field => "field",
            ResourceKind::Predicate => "predicate",
            ResourceKind::Wand => "wand",
        };
        write!(f, "{} {}", kind, self.name)
    }
}

pub type Chunk = Arc<ChunkX>;
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ChunkX {
    pub resource: ResourceId,
    pub args: Terms,
    /// fractional permission amount; confined to [0, 1] by solver
    /// assumptions, not by the representation
    pub perm: Term,
    pub snap: Term,
}

impl ChunkX {
    pub fn new(resource: ResourceId, args: Vec<Term>, perm: Term, snap: Term) -> Chunk {
        Arc::new(ChunkX { resource, args: Arc::new(args), perm, snap })
    }

    /// Functional permission update; the chunk itself is never mutated.
    pub fn with_perm(&self, perm: &Term) -> Chunk {
        Arc::new(ChunkX {
            resource: self.resource.clone(),
            args: self.args.clone(),
            perm: perm.clone(),
            snap: self.snap.clone(),
        })
    }

    /// Well-formedness conditions to assume for a freshly modified chunk.
    pub fn properties(&self) -> Vec<Term> {
        let mut props = vec![mk_ge(&self.perm, &no_perm())];
        if self.resource.kind == ResourceKind::Field {
            props.push(mk_le(&self.perm, &full_perm()));
        }
        props.retain(|p| !is_true(p));
        props
    }
}

/// The symbolic heap: an unordered multiset of chunks, owned by exactly
/// one verification branch and replaced wholesale on every mutation.
#[derive(Clone, Debug, Default)]
pub struct Heap {
    chunks: im::Vector<Chunk>,
}

impl Heap {
    pub fn new() -> Heap {
        Heap { chunks: im::Vector::new() }
    }

    pub fn from_chunks(chunks: Vec<Chunk>) -> Heap {
        Heap { chunks: chunks.into_iter().collect() }
    }

    pub fn add(&self, chunk: Chunk) -> Heap {
        let mut chunks = self.chunks.clone();
        chunks.push_back(chunk);
        Heap { chunks }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }

    /// Candidate chunks for a query: those sharing the resource identifier.
    pub fn by_resource(&self, resource: &ResourceId) -> Vec<Chunk> {
        self.chunks.iter().filter(|c| &c.resource == resource).cloned().collect()
    }

    /// Split into (candidates, unrelated); unrelated chunks pass through
    /// consumption untouched.
    pub fn partition(&self, resource: &ResourceId) -> (Vec<Chunk>, Vec<Chunk>) {
        let mut candidates = Vec::new();
        let mut others = Vec::new();
        for c in self.chunks.iter() {
            if &c.resource == resource {
                candidates.push(c.clone());
            } else {
                others.push(c.clone());
            }
        }
        (candidates, others)
    }
}
