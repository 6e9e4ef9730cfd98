use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::DataValue;

/// Persistable identity of a stage: its display name, the type tag the
/// registry resolves at reconstruction time, and the metadata keys the stage
/// is configured to read or write. Created once at append time, never
/// mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformInfo {
    pub name: String,
    pub type_tag: String,
    #[serde(default)]
    pub metadata_keys: Vec<String>,
}

impl TransformInfo {
    pub fn new(
        name: impl Into<String>,
        type_tag: impl Into<String>,
        metadata_keys: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            type_tag: type_tag.into(),
            metadata_keys,
        }
    }
}

/// Common surface every stage exposes, regardless of capability.
pub trait Transform: Send + Sync {
    /// Descriptor for this stage; must be derivable without running it.
    fn info(&self) -> TransformInfo;
}

/// A stage capability that appends new values to the working input stack,
/// visible to later stages.
pub trait Mapper: Transform {
    fn transform(&self, view: &PipelineView<'_>, out: &mut OutputCollector) -> anyhow::Result<()>;
}

/// A stage capability that appends values to the final feature collection;
/// never touches the input stack.
pub trait Featurizer: Transform {
    fn transform(&self, view: &PipelineView<'_>, out: &mut FeatureCollector) -> anyhow::Result<()>;
}

/// Marker for stages carrying both capabilities. Blanket-implemented, so any
/// type implementing both `Mapper` and `Featurizer` qualifies automatically.
pub trait MapperFeaturizer: Mapper + Featurizer {}

impl<T: Mapper + Featurizer> MapperFeaturizer for T {}

/// A stage's capability set, resolved once at append time. The engine
/// dispatches on this variant; a stage with neither capability is
/// unrepresentable.
pub enum Stage {
    Mapper(Box<dyn Mapper>),
    Featurizer(Box<dyn Featurizer>),
    Both(Box<dyn MapperFeaturizer>),
}

impl Stage {
    pub fn mapper(stage: impl Mapper + 'static) -> Self {
        Stage::Mapper(Box::new(stage))
    }

    pub fn featurizer(stage: impl Featurizer + 'static) -> Self {
        Stage::Featurizer(Box::new(stage))
    }

    pub fn both(stage: impl MapperFeaturizer + 'static) -> Self {
        Stage::Both(Box::new(stage))
    }

    pub fn info(&self) -> TransformInfo {
        match self {
            Stage::Mapper(s) => s.info(),
            Stage::Featurizer(s) => s.info(),
            Stage::Both(s) => s.info(),
        }
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let role = match self {
            Stage::Mapper(_) => "Mapper",
            Stage::Featurizer(_) => "Featurizer",
            Stage::Both(_) => "Both",
        };
        f.debug_struct("Stage")
            .field("role", &role)
            .field("info", &self.info())
            .finish()
    }
}

/// Read-only view over the pipeline's inputs and metadata as they stand at
/// the moment a stage is invoked. Mutation goes through the collectors, never
/// through the view.
pub struct PipelineView<'a> {
    inputs: &'a [DataValue],
    metadata: &'a HashMap<String, DataValue>,
}

impl<'a> PipelineView<'a> {
    pub(crate) fn new(inputs: &'a [DataValue], metadata: &'a HashMap<String, DataValue>) -> Self {
        Self { inputs, metadata }
    }

    pub fn inputs(&self) -> &[DataValue] {
        self.inputs
    }

    /// The most recent value on the input stack.
    pub fn last_input(&self) -> Option<&DataValue> {
        self.inputs.last()
    }

    pub fn input(&self, index: usize) -> Option<&DataValue> {
        self.inputs.get(index)
    }

    pub fn metadata(&self, name: &str) -> Option<&DataValue> {
        self.metadata.get(name)
    }

    pub fn metadata_names(&self) -> impl Iterator<Item = &str> {
        self.metadata.keys().map(String::as_str)
    }
}

/// Buffer for a mapper invocation's emissions. The engine applies the buffer
/// to the pipeline after the call returns.
#[derive(Debug, Default)]
pub struct OutputCollector {
    pub(crate) outputs: Vec<DataValue>,
    pub(crate) metadata: Vec<(String, DataValue)>,
}

impl OutputCollector {
    /// Append a value to the working input stack.
    pub fn push_output(&mut self, value: impl Into<DataValue>) {
        self.outputs.push(value.into());
    }

    /// Upsert a metadata entry; last write wins.
    pub fn set_metadata(&mut self, name: impl Into<String>, value: impl Into<DataValue>) {
        self.metadata.push((name.into(), value.into()));
    }
}

/// Buffer for a featurizer invocation's emissions.
#[derive(Debug, Default)]
pub struct FeatureCollector {
    pub(crate) features: Vec<DataValue>,
    pub(crate) metadata: Vec<(String, DataValue)>,
}

impl FeatureCollector {
    /// Append a value to the pipeline's feature collection.
    pub fn push_feature(&mut self, value: impl Into<DataValue>) {
        self.features.push(value.into());
    }

    /// Upsert a metadata entry; last write wins.
    pub fn set_metadata(&mut self, name: impl Into<String>, value: impl Into<DataValue>) {
        self.metadata.push((name.into(), value.into()));
    }
}
