/// Demo: build a small pipeline with echo stages, run it, persist its
/// configuration and rebuild it through a registry.
use anyhow::Result;
use feature_pipeline::{
    observability, persist, DataValue, FeatureCollector, Featurizer, Mapper, OutputCollector,
    Pipeline, PipelineView, Stage, StageRegistry, Transform, TransformInfo,
};
use tracing::{info, warn};

/// Mapper that re-emits the most recent input unchanged and records how many
/// inputs it has seen.
struct EchoMapper {
    name: String,
}

impl Transform for EchoMapper {
    fn info(&self) -> TransformInfo {
        TransformInfo::new(self.name.clone(), "EchoMapper", vec!["echo_count".to_string()])
    }
}

impl Mapper for EchoMapper {
    fn transform(&self, view: &PipelineView<'_>, out: &mut OutputCollector) -> Result<()> {
        if let Some(last) = view.last_input() {
            out.push_output(last.clone());
        }
        out.set_metadata("echo_count", view.inputs().len() as f64);
        Ok(())
    }
}

/// Featurizer that promotes the most recent input to a feature.
struct EchoFeaturizer {
    name: String,
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

fn main() -> Result<()> {
    observability::init_logging();

    let mut pipeline = Pipeline::new();
    pipeline.append(Stage::mapper(EchoMapper {
        name: "m1".to_string(),
    }));
    pipeline.append(Stage::mapper(EchoMapper {
        name: "m2".to_string(),
    }));
    pipeline.append(Stage::featurizer(EchoFeaturizer {
        name: "f1".to_string(),
    }));
    pipeline.append(Stage::featurizer(EchoFeaturizer {
        name: "f2".to_string(),
    }));

    let report = pipeline.run_with_report("Jacopo")?;
    info!(
        run_id = %report.run_id,
        features = report.features_emitted,
        outputs = report.outputs_emitted,
        "run finished"
    );

    for (index, feature) in pipeline.features().iter().enumerate() {
        info!("feature[{index}] = {feature:?}");
    }

    // Persist the configuration, then rebuild the stages from a registry.
    let encoded = persist::encode(&pipeline)?;
    info!("persisted configuration:\n{encoded}");

    let mut registry = StageRegistry::new();
    registry.register("EchoMapper", |name, _keys| {
        Stage::mapper(EchoMapper {
            name: name.to_string(),
        })
    });
    // EchoFeaturizer is deliberately left unregistered to demonstrate how
    // misses are reported rather than raised.

    let persisted = persist::decode(&encoded)?;
    let (mut rebuilt, missing) = persisted.reconstruct(&registry);
    for info in &missing {
        warn!(stage = %info.name, tag = %info.type_tag, "stage could not be reconstructed");
    }

    rebuilt.run(DataValue::from("rebuilt input"))?;
    info!(
        stages = rebuilt.stage_count(),
        inputs = rebuilt.inputs().len(),
        "rebuilt pipeline ran"
    );

    Ok(())
}
