use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::error::Result;
use crate::domain::{DataValue, TaggedValue};
use crate::pipeline::Pipeline;
use crate::registry::{Reconstruction, StageRegistry};
use crate::transform::TransformInfo;

/// Decoded persisted form of a pipeline: configuration only. `inputs` and
/// `features` are run-time artifacts and are never persisted.
#[derive(Debug, Clone)]
pub struct PersistedPipeline {
    pub metadata: HashMap<String, DataValue>,
    pub stages: Vec<TransformInfo>,
}

impl PersistedPipeline {
    /// Rebuild an executable pipeline via `registry`, returning it together
    /// with the descriptors that had no registered factory. Persisted
    /// metadata is not replayed into the new pipeline; no value state is
    /// replayed, and the decoded metadata stays available on `self` for
    /// inspection.
    pub fn reconstruct(&self, registry: &StageRegistry) -> (Pipeline, Vec<TransformInfo>) {
        let Reconstruction { stages, missing } = registry.reconstruct(&self.stages);
        (Pipeline::from_stages(stages), missing)
    }
}

/// On-disk document shape: `{metadata: {name: tagged value}, stages: [info]}`.
#[derive(Serialize, Deserialize)]
struct PersistedDocument {
    metadata: HashMap<String, TaggedValue>,
    stages: Vec<TransformInfo>,
}

/// Serialize a pipeline's configuration (metadata + stage descriptors) to
/// JSON. Stage behavior is never serialized, only its descriptor.
pub fn encode(pipeline: &Pipeline) -> Result<String> {
    let metadata = pipeline
        .metadata()
        .iter()
        .map(|(name, value)| Ok((name.clone(), value.to_tagged()?)))
        .collect::<Result<HashMap<_, _>>>()?;

    let doc = PersistedDocument {
        metadata,
        stages: pipeline.stage_infos(),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Pure deserialization: produces metadata and the ordered descriptor list,
/// no executable stages.
pub fn decode(json: &str) -> Result<PersistedPipeline> {
    let doc: PersistedDocument = serde_json::from_str(json)?;
    let metadata = doc
        .metadata
        .into_iter()
        .map(|(name, tagged)| Ok((name, DataValue::from_tagged(tagged)?)))
        .collect::<Result<HashMap<_, _>>>()?;

    Ok(PersistedPipeline {
        metadata,
        stages: doc.stages,
    })
}

pub fn save(pipeline: &Pipeline, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    debug!(path = %path.display(), "saving pipeline configuration");
    fs::write(path, encode(pipeline)?)?;
    Ok(())
}

pub fn load(path: impl AsRef<Path>) -> Result<PersistedPipeline> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading pipeline configuration");
    decode(&fs::read_to_string(path)?)
}
