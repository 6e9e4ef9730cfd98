use std::collections::HashMap;

use tracing::{debug, warn};

use crate::transform::{Stage, TransformInfo};

/// Factory invoked with a persisted stage's `(name, metadata_keys)` to build
/// a live stage.
pub type StageFactory = Box<dyn Fn(&str, &[String]) -> Stage + Send + Sync>;

/// Caller-supplied mapping from type tag to stage factory. Persisted data
/// names implementations by string tag, not by a loadable code reference;
/// this registry is the indirection that turns tags back into executable
/// stages. There is no implicit global registration.
#[derive(Default)]
pub struct StageRegistry {
    factories: HashMap<String, StageFactory>,
}

impl StageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for `type_tag`. Registering the same tag twice
    /// replaces the earlier factory.
    pub fn register<F>(&mut self, type_tag: impl Into<String>, factory: F)
    where
        F: Fn(&str, &[String]) -> Stage + Send + Sync + 'static,
    {
        let tag = type_tag.into();
        debug!(tag = %tag, "registering stage factory");
        self.factories.insert(tag, Box::new(factory));
    }

    pub fn contains(&self, type_tag: &str) -> bool {
        self.factories.contains_key(type_tag)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Rebuild executable stages from persisted descriptors, preserving
    /// order. A descriptor whose type tag has no registered factory is
    /// skipped and recorded in [`Reconstruction::missing`]; a miss is never
    /// an error.
    pub fn reconstruct(&self, infos: &[TransformInfo]) -> Reconstruction {
        let mut stages = Vec::with_capacity(infos.len());
        let mut missing = Vec::new();

        for info in infos {
            match self.factories.get(&info.type_tag) {
                Some(factory) => {
                    debug!(stage = %info.name, tag = %info.type_tag, "reconstructing stage");
                    stages.push(factory(&info.name, &info.metadata_keys));
                }
                None => {
                    warn!(
                        stage = %info.name,
                        tag = %info.type_tag,
                        "no factory registered for type tag, skipping stage"
                    );
                    missing.push(info.clone());
                }
            }
        }

        Reconstruction { stages, missing }
    }
}

/// Outcome of a reconstruction pass: the stages that could be rebuilt, in
/// their original order, plus the descriptors whose type tags had no
/// registered factory.
pub struct Reconstruction {
    pub stages: Vec<Stage>,
    pub missing: Vec<TransformInfo>,
}
