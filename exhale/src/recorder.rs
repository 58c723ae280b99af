use crate::chunk::ResourceId;
use std::sync::Arc;
use sym::ast::{Decl, Term};

#[derive(Clone, Debug)]
pub struct ValueDef {
    pub resource: ResourceId,
    pub snapshot: Term,
    pub definitions: Arc<Vec<Term>>,
}

/// Everything accumulated so far: fresh-snapshot definitions and memoized
/// pure-function declarations, to be replayed when the surrounding proof
/// obligation is finalized.
#[derive(Clone, Debug, Default)]
pub struct Recorded {
    pub value_defs: im::Vector<ValueDef>,
    pub macros: im::Vector<Decl>,
}

/// Side-effect recorder, uniquely owned by the branch state. When disabled
/// the record calls are no-ops, and consumption may take the faster exact
/// path that mutates the heap.
#[derive(Clone, Debug)]
pub enum EffectsRecorder {
    Disabled,
    Recording(Recorded),
}

impl Default for EffectsRecorder {
    fn default() -> Self {
        EffectsRecorder::Disabled
    }
}

impl EffectsRecorder {
    pub fn is_recording(&self) -> bool {
        matches!(self, EffectsRecorder::Recording(_))
    }

    pub fn record_value_definition(
        &mut self,
        resource: &ResourceId,
        snapshot: &Term,
        definitions: &Arc<Vec<Term>>,
    ) {
        if let EffectsRecorder::Recording(recorded) = self {
            recorded.value_defs.push_back(ValueDef {
                resource: resource.clone(),
                snapshot: snapshot.clone(),
                definitions: definitions.clone(),
            });
        }
    }

    pub fn record_macro(&mut self, decl: &Decl) {
        if let EffectsRecorder::Recording(recorded) = self {
            recorded.macros.push_back(decl.clone());
        }
    }

    pub fn recorded(&self) -> Option<&Recorded> {
        match self {
            EffectsRecorder::Disabled => None,
            EffectsRecorder::Recording(recorded) => Some(recorded),
        }
    }
}
