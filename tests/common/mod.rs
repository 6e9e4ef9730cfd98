#![allow(dead_code)]

//! Stage doubles shared by the integration tests.

use anyhow::{bail, Result};
use feature_pipeline::{
    DataValue, FeatureCollector, Featurizer, Mapper, OutputCollector, PipelineView, Transform,
    TransformInfo,
};

/// Appends the last input unchanged.
pub struct EchoMapper {
    pub name: String,
}

impl EchoMapper {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl Transform for EchoMapper {
    fn info(&self) -> TransformInfo {
        TransformInfo::new(self.name.clone(), "EchoMapper", vec![])
    }
}

impl Mapper for EchoMapper {
    fn transform(&self, view: &PipelineView<'_>, out: &mut OutputCollector) -> Result<()> {
        if let Some(last) = view.last_input() {
            out.push_output(last.clone());
        }
        Ok(())
    }
}

/// Appends the last input as a feature.
pub struct EchoFeaturizer {
    pub name: String,
}

impl EchoFeaturizer {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl Transform for EchoFeaturizer {
    fn info(&self) -> TransformInfo {
        TransformInfo::new(self.name.clone(), "EchoFeaturizer", vec![])
    }
}

impl Featurizer for EchoFeaturizer {
    fn transform(&self, view: &PipelineView<'_>, out: &mut FeatureCollector) -> Result<()> {
        if let Some(last) = view.last_input() {
            out.push_feature(last.clone());
        }
        Ok(())
    }
}

/// Appends `"{last}:{name}"`, so stage execution order is visible in the
/// final input value.
pub struct SuffixMapper {
    pub name: String,
}

impl SuffixMapper {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl Transform for SuffixMapper {
    fn info(&self) -> TransformInfo {
        TransformInfo::new(self.name.clone(), "SuffixMapper", vec![])
    }
}

impl Mapper for SuffixMapper {
    fn transform(&self, view: &PipelineView<'_>, out: &mut OutputCollector) -> Result<()> {
        let last = match view.last_input() {
            Some(value) => value.as_string()?.to_string(),
            None => String::new(),
        };
        out.push_output(format!("{last}:{}", self.name));
        Ok(())
    }
}

/// Writes a single metadata entry.
pub struct MetadataWriter {
    pub name: String,
    pub key: String,
    pub value: DataValue,
}

impl Transform for MetadataWriter {
    fn info(&self) -> TransformInfo {
        TransformInfo::new(self.name.clone(), "MetadataWriter", vec![self.key.clone()])
    }
}

impl Mapper for MetadataWriter {
    fn transform(&self, _view: &PipelineView<'_>, out: &mut OutputCollector) -> Result<()> {
        out.set_metadata(self.key.clone(), self.value.clone());
        Ok(())
    }
}

/// Emits the metadata entry under `key` as a feature, if present.
pub struct MetadataReader {
    pub name: String,
    pub key: String,
}

impl Transform for MetadataReader {
    fn info(&self) -> TransformInfo {
        TransformInfo::new(self.name.clone(), "MetadataReader", vec![self.key.clone()])
    }
}

impl Featurizer for MetadataReader {
    fn transform(&self, view: &PipelineView<'_>, out: &mut FeatureCollector) -> Result<()> {
        if let Some(value) = view.metadata(&self.key) {
            out.push_feature(value.clone());
        }
        Ok(())
    }
}

/// Featurizer that writes a single metadata entry and emits no feature.
pub struct MetadataStamp {
    pub name: String,
    pub key: String,
    pub value: DataValue,
}

impl Transform for MetadataStamp {
    fn info(&self) -> TransformInfo {
        TransformInfo::new(self.name.clone(), "MetadataStamp", vec![self.key.clone()])
    }
}

impl Featurizer for MetadataStamp {
    fn transform(&self, _view: &PipelineView<'_>, out: &mut FeatureCollector) -> Result<()> {
        out.set_metadata(self.key.clone(), self.value.clone());
        Ok(())
    }
}

/// Emits the metadata entry under `key` as a feature, or `fallback` when the
/// entry is absent.
pub struct MetadataLookup {
    pub name: String,
    pub key: String,
    pub fallback: DataValue,
}

impl Transform for MetadataLookup {
    fn info(&self) -> TransformInfo {
        TransformInfo::new(self.name.clone(), "MetadataLookup", vec![self.key.clone()])
    }
}

impl Featurizer for MetadataLookup {
    fn transform(&self, view: &PipelineView<'_>, out: &mut FeatureCollector) -> Result<()> {
        match view.metadata(&self.key) {
            Some(value) => out.push_feature(value.clone()),
            None => out.push_feature(self.fallback.clone()),
        }
        Ok(())
    }
}

/// Emits one feature, then fails.
pub struct FailingFeaturizer {
    pub name: String,
}

impl Transform for FailingFeaturizer {
    fn info(&self) -> TransformInfo {
        TransformInfo::new(self.name.clone(), "FailingFeaturizer", vec![])
    }
}

impl Featurizer for FailingFeaturizer {
    fn transform(&self, _view: &PipelineView<'_>, out: &mut FeatureCollector) -> Result<()> {
        out.push_feature("pre-error");
        bail!("deliberate failure")
    }
}

/// Emits one output, then fails.
pub struct FailingMapper {
    pub name: String,
}

impl Transform for FailingMapper {
    fn info(&self) -> TransformInfo {
        TransformInfo::new(self.name.clone(), "FailingMapper", vec![])
    }
}

impl Mapper for FailingMapper {
    fn transform(&self, _view: &PipelineView<'_>, out: &mut OutputCollector) -> Result<()> {
        out.push_output("partial");
        bail!("deliberate failure")
    }
}

/// Both-capability stage: the mapper half pushes a marker, the featurizer
/// half promotes the last input, which proves the featurizer half sees the
/// mapper half's emission.
pub struct MarkThenEmit {
    pub name: String,
}

impl Transform for MarkThenEmit {
    fn info(&self) -> TransformInfo {
        TransformInfo::new(self.name.clone(), "MarkThenEmit", vec![])
    }
}

impl Mapper for MarkThenEmit {
    fn transform(&self, _view: &PipelineView<'_>, out: &mut OutputCollector) -> Result<()> {
        out.push_output("mapped");
        Ok(())
    }
}

impl Featurizer for MarkThenEmit {
    fn transform(&self, view: &PipelineView<'_>, out: &mut FeatureCollector) -> Result<()> {
        if let Some(last) = view.last_input() {
            out.push_feature(last.clone());
        }
        Ok(())
    }
}

/// Reconstructible no-op stage that carries whatever identity the factory
/// hands it.
pub struct ConfiguredStage {
    pub name: String,
    pub type_tag: String,
    pub metadata_keys: Vec<String>,
}

impl ConfiguredStage {
    pub fn new(name: &str, type_tag: &str, metadata_keys: &[String]) -> Self {
        Self {
            name: name.to_string(),
            type_tag: type_tag.to_string(),
            metadata_keys: metadata_keys.to_vec(),
        }
    }
}

impl Transform for ConfiguredStage {
    fn info(&self) -> TransformInfo {
        TransformInfo::new(
            self.name.clone(),
            self.type_tag.clone(),
            self.metadata_keys.clone(),
        )
    }
}

impl Mapper for ConfiguredStage {
    fn transform(&self, _view: &PipelineView<'_>, _out: &mut OutputCollector) -> Result<()> {
        Ok(())
    }
}
