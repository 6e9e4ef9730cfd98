//! Interface boundary for the downstream classifier. The pipeline treats the
//! learner as an opaque sink for its feature output; training and prediction
//! internals live outside this crate.

use serde::{Deserialize, Serialize};

/// Identity descriptor of a learner, used for persistence alongside the
/// pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerInfo {
    pub name: String,
    pub type_tag: String,
    pub multi_class: bool,
    pub multi_label: bool,
}

/// Metrics produced by a training pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainResult {
    pub f1: f32,
    pub micro_avg_accuracy: f32,
    pub macro_avg_accuracy: f32,
    pub precision: Vec<f32>,
    pub recall: Vec<f32>,
}

/// Per-row label predictions with confidences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictResult {
    pub labels: Vec<Vec<i64>>,
    pub confidences: Vec<Vec<f32>>,
}

/// Generic classifier contract. Model state crosses the boundary as opaque
/// bytes so the learner's representation never leaks into the pipeline.
pub trait Learner: Send + Sync {
    fn info(&self) -> LearnerInfo;

    fn train(
        &mut self,
        train_features: &[Vec<f32>],
        test_features: &[Vec<f32>],
        train_labels: &[Vec<i64>],
        test_labels: &[Vec<i64>],
    ) -> anyhow::Result<(TrainResult, Vec<u8>)>;

    fn predict(&self, model: &[u8], features: &[Vec<f32>]) -> anyhow::Result<PredictResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Predicts a constant label for every row; the "model" is that label's
    /// byte.
    struct ConstantLearner {
        label: i64,
    }

    impl Learner for ConstantLearner {
        fn info(&self) -> LearnerInfo {
            LearnerInfo {
                name: "constant".to_string(),
                type_tag: "ConstantLearner".to_string(),
                multi_class: false,
                multi_label: false,
            }
        }

        fn train(
            &mut self,
            train_features: &[Vec<f32>],
            _test_features: &[Vec<f32>],
            _train_labels: &[Vec<i64>],
            _test_labels: &[Vec<i64>],
        ) -> anyhow::Result<(TrainResult, Vec<u8>)> {
            let result = TrainResult {
                f1: 1.0,
                micro_avg_accuracy: 1.0,
                macro_avg_accuracy: 1.0,
                precision: vec![1.0; train_features.len()],
                recall: vec![1.0; train_features.len()],
            };
            Ok((result, vec![self.label as u8]))
        }

        fn predict(&self, model: &[u8], features: &[Vec<f32>]) -> anyhow::Result<PredictResult> {
            let label = i64::from(model[0]);
            Ok(PredictResult {
                labels: features.iter().map(|_| vec![label]).collect(),
                confidences: features.iter().map(|_| vec![1.0]).collect(),
            })
        }
    }

    #[test]
    fn learner_info_round_trips_through_json() {
        let info = LearnerInfo {
            name: "lr".to_string(),
            type_tag: "LogisticRegression".to_string(),
            multi_class: true,
            multi_label: false,
        };
        let json = serde_json::to_string(&info).unwrap();
        let back: LearnerInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, info);
    }

    #[test]
    fn result_types_round_trip_and_default_empty() {
        let result = TrainResult {
            f1: 0.5,
            micro_avg_accuracy: 0.75,
            macro_avg_accuracy: 0.25,
            precision: vec![0.1, 0.2],
            recall: vec![0.3],
        };
        let json = serde_json::to_string(&result).unwrap();
        let back: TrainResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.f1, result.f1);
        assert_eq!(back.precision, result.precision);
        assert_eq!(back.recall, result.recall);

        let empty = PredictResult::default();
        assert!(empty.labels.is_empty());
        assert!(empty.confidences.is_empty());
    }

    #[test]
    fn model_bytes_carry_state_from_train_to_predict() {
        let mut learner = ConstantLearner { label: 2 };
        let features = vec![vec![0.0f32, 1.0], vec![1.0, 0.0]];

        let (metrics, model) = learner
            .train(&features, &[], &[vec![2], vec![2]], &[])
            .unwrap();
        assert_eq!(metrics.f1, 1.0);

        let prediction = learner.predict(&model, &features).unwrap();
        assert_eq!(prediction.labels, vec![vec![2], vec![2]]);
        assert_eq!(prediction.confidences.len(), features.len());
    }
}
