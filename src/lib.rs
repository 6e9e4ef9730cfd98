//! Composable data-transformation pipeline for feature engineering.
//!
//! An ordered sequence of stages consumes a growing stack of typed values
//! and a named metadata side-channel, and produces a collection of feature
//! vectors for a downstream learner. Stages carry one or both of two
//! capabilities: a [`transform::Mapper`] appends new values to the input
//! stack, a [`transform::Featurizer`] appends to the feature output.
//! Pipeline configuration (metadata plus stage descriptors) can be
//! persisted and rebuilt through a caller-supplied [`registry::StageRegistry`].

pub mod common;
pub mod domain;
pub mod learner;
pub mod observability;
pub mod persist;
pub mod pipeline;
pub mod registry;
pub mod transform;

// Re-export commonly used types
pub use common::error::{PipelineError, Result};
pub use domain::{DataValue, Dimension, TaggedValue, ValueShape, ValueType};
pub use persist::PersistedPipeline;
pub use pipeline::{Pipeline, RunOptions, RunReport};
pub use registry::{Reconstruction, StageRegistry};
pub use transform::{
    FeatureCollector, Featurizer, Mapper, MapperFeaturizer, OutputCollector, PipelineView, Stage,
    Transform, TransformInfo,
};
