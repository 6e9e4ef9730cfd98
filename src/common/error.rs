use thiserror::Error;

use crate::domain::ValueShape;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("type mismatch: requested {requested}, stored {actual}")]
    TypeMismatch {
        requested: ValueShape,
        actual: ValueShape,
    },

    #[error("unknown value tag: type '{value_type}', dimension '{dimension}'")]
    UnknownVariant {
        value_type: String,
        dimension: String,
    },

    #[error("stage '{stage}' failed: {source}")]
    StageExecution {
        stage: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
