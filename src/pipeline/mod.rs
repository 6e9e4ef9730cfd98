use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::common::error::{PipelineError, Result};
use crate::domain::DataValue;
use crate::transform::{
    FeatureCollector, Featurizer, Mapper, OutputCollector, PipelineView, Stage, TransformInfo,
};

/// Execution options for a single run.
///
/// `parallel_featurizers` opts in to executing consecutive featurizer-only
/// stages concurrently over an immutable snapshot of the input stack and
/// metadata as of group start. Buffered emissions are still applied in
/// stage-declaration order, so inputs and features match sequential
/// execution whenever group members do not communicate through metadata.
/// The one relaxation: a group member's metadata writes are not visible to
/// its siblings, only to stages after the group (sequentially, an earlier
/// featurizer's write is visible to a later one). Mappers always run
/// strictly sequentially because each depends on the state left by the
/// previous stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub parallel_featurizers: bool,
}

/// Summary of one `run` invocation.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub stages_executed: usize,
    pub outputs_emitted: usize,
    pub features_emitted: usize,
    pub metadata_writes: usize,
}

/// The pipeline engine: owns the input stack, metadata map, feature
/// collection and ordered stage list, and drives execution.
///
/// `inputs` and `features` only ever grow; nothing is removed or reordered.
/// State accumulates across runs until the caller discards the pipeline.
#[derive(Default)]
pub struct Pipeline {
    inputs: Vec<DataValue>,
    metadata: HashMap<String, DataValue>,
    features: Vec<DataValue>,
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pipeline from pre-constructed stages, preserving their order.
    pub fn from_stages(stages: Vec<Stage>) -> Self {
        Self {
            stages,
            ..Self::default()
        }
    }

    /// Add a stage to the end of the stage list. Never reorders existing
    /// stages.
    pub fn append(&mut self, stage: Stage) {
        debug!(stage = %stage.info().name, "appending stage");
        self.stages.push(stage);
    }

    pub fn inputs(&self) -> &[DataValue] {
        &self.inputs
    }

    pub fn metadata(&self) -> &HashMap<String, DataValue> {
        &self.metadata
    }

    pub fn features(&self) -> &[DataValue] {
        &self.features
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Descriptors of all appended stages, in order.
    pub fn stage_infos(&self) -> Vec<TransformInfo> {
        self.stages.iter().map(Stage::info).collect()
    }

    /// Push `input` onto the input stack and execute every stage in append
    /// order, returning the full accumulated feature collection.
    pub fn run(&mut self, input: impl Into<DataValue>) -> Result<&[DataValue]> {
        self.run_with_options(input, RunOptions::default())?;
        Ok(&self.features)
    }

    /// Like [`Pipeline::run`], but returns a per-run summary instead of the
    /// feature slice.
    pub fn run_with_report(&mut self, input: impl Into<DataValue>) -> Result<RunReport> {
        self.run_with_options(input, RunOptions::default())
    }

    pub fn run_with_options(
        &mut self,
        input: impl Into<DataValue>,
        options: RunOptions,
    ) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%run_id, stages = self.stages.len(), "starting pipeline run");

        self.inputs.push(input.into());

        let mut report = RunReport {
            run_id,
            started_at,
            completed_at: started_at,
            stages_executed: 0,
            outputs_emitted: 0,
            features_emitted: 0,
            metadata_writes: 0,
        };

        let mut index = 0;
        while index < self.stages.len() {
            if options.parallel_featurizers {
                let group_end = self.featurizer_group_end(index);
                if group_end - index > 1 {
                    self.execute_featurizer_group(index, group_end, &mut report)?;
                    index = group_end;
                    continue;
                }
            }

            self.execute_stage(index, &mut report)?;
            index += 1;
        }

        report.completed_at = Utc::now();
        info!(
            %run_id,
            stages = report.stages_executed,
            features = report.features_emitted,
            "pipeline run completed"
        );
        Ok(report)
    }

    fn execute_stage(&mut self, index: usize, report: &mut RunReport) -> Result<()> {
        let name = self.stages[index].info().name;
        debug!(stage = %name, "executing stage");

        match &self.stages[index] {
            Stage::Mapper(stage) => {
                let mut out = OutputCollector::default();
                let result = {
                    let view = PipelineView::new(&self.inputs, &self.metadata);
                    stage.transform(&view, &mut out)
                };
                // Emissions buffered before a failure are still applied:
                // partial state accumulated so far is retained on abort.
                apply_outputs(&mut self.inputs, &mut self.metadata, out, report);
                result.map_err(|e| stage_failure(&name, e))?;
            }
            Stage::Featurizer(stage) => {
                let mut out = FeatureCollector::default();
                let result = {
                    let view = PipelineView::new(&self.inputs, &self.metadata);
                    stage.transform(&view, &mut out)
                };
                apply_features(&mut self.features, &mut self.metadata, out, report);
                result.map_err(|e| stage_failure(&name, e))?;
            }
            Stage::Both(stage) => {
                // Mapper half first; its emissions are applied before the
                // featurizer half runs, so the featurizer sees them.
                let mut mapped = OutputCollector::default();
                let map_result = {
                    let view = PipelineView::new(&self.inputs, &self.metadata);
                    Mapper::transform(stage.as_ref(), &view, &mut mapped)
                };
                apply_outputs(&mut self.inputs, &mut self.metadata, mapped, report);
                map_result.map_err(|e| stage_failure(&name, e))?;

                let mut featured = FeatureCollector::default();
                let feat_result = {
                    let view = PipelineView::new(&self.inputs, &self.metadata);
                    Featurizer::transform(stage.as_ref(), &view, &mut featured)
                };
                apply_features(&mut self.features, &mut self.metadata, featured, report);
                feat_result.map_err(|e| stage_failure(&name, e))?;
            }
        }

        report.stages_executed += 1;
        Ok(())
    }

    /// End of the maximal run of consecutive featurizer-only stages starting
    /// at `start`.
    fn featurizer_group_end(&self, start: usize) -> usize {
        let mut end = start;
        while end < self.stages.len() && matches!(self.stages[end], Stage::Featurizer(_)) {
            end += 1;
        }
        end
    }

    /// Execute `stages[start..end]` (all featurizer-only) concurrently over
    /// an immutable snapshot of the input stack. Collected emissions are
    /// applied in stage-declaration order, a total order consistent with
    /// sequential execution.
    fn execute_featurizer_group(
        &mut self,
        start: usize,
        end: usize,
        report: &mut RunReport,
    ) -> Result<()> {
        debug!(from = start, to = end, "executing featurizer group in parallel");

        let results: Vec<(String, anyhow::Result<()>, FeatureCollector)> = {
            let group: Vec<&dyn Featurizer> = self.stages[start..end]
                .iter()
                .filter_map(|s| match s {
                    Stage::Featurizer(f) => Some(f.as_ref()),
                    _ => None,
                })
                .collect();

            let inputs = &self.inputs;
            let metadata = &self.metadata;
            group
                .into_par_iter()
                .map(|stage| {
                    let name = stage.info().name;
                    let mut out = FeatureCollector::default();
                    let view = PipelineView::new(inputs, metadata);
                    let result = stage.transform(&view, &mut out);
                    (name, result, out)
                })
                .collect()
        };

        for (name, result, out) in results {
            // Emissions buffered before a failure are applied here too, so
            // the error path retains the same partial state as sequential
            // execution.
            apply_features(&mut self.features, &mut self.metadata, out, report);
            match result {
                Ok(()) => report.stages_executed += 1,
                Err(e) => return Err(stage_failure(&name, e)),
            }
        }
        Ok(())
    }
}

fn apply_outputs(
    inputs: &mut Vec<DataValue>,
    metadata: &mut HashMap<String, DataValue>,
    collected: OutputCollector,
    report: &mut RunReport,
) {
    let OutputCollector {
        outputs,
        metadata: writes,
    } = collected;
    report.outputs_emitted += outputs.len();
    report.metadata_writes += writes.len();
    inputs.extend(outputs);
    for (name, value) in writes {
        metadata.insert(name, value);
    }
}

fn apply_features(
    features: &mut Vec<DataValue>,
    metadata: &mut HashMap<String, DataValue>,
    collected: FeatureCollector,
    report: &mut RunReport,
) {
    let FeatureCollector {
        features: emitted,
        metadata: writes,
    } = collected;
    report.features_emitted += emitted.len();
    report.metadata_writes += writes.len();
    features.extend(emitted);
    for (name, value) in writes {
        metadata.insert(name, value);
    }
}

fn stage_failure(name: &str, source: anyhow::Error) -> PipelineError {
    error!(stage = %name, "stage failed: {source}");
    PipelineError::StageExecution {
        stage: name.to_string(),
        source: source.into(),
    }
}
