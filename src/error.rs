use thiserror::Error;

use crate::session::{PhotoView, Screen};
use crate::validation::{FileRejection, Violation};

/// Failures of the persistence adapter. Never fatal to the in-memory session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PersistenceError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Corrupt snapshot: {0}")]
    Corrupt(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("Missing input for analysis: {0}")]
    MissingInput(&'static str),

    #[error("Analysis backend error: {0}")]
    Backend(String),
}

/// Failure to turn a selected file into an in-memory photo.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhotoReadError {
    #[error("Failed to read '{name}': {reason}")]
    Io { name: String, reason: String },

    #[error("'{name}' is not a readable image: {reason}")]
    Decode { name: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlowError {
    #[error("Cannot {action} from {from}")]
    InvalidTransition { action: &'static str, from: Screen },

    #[error("Photo step {requested} is not the active step ({current})")]
    StepMismatch { requested: usize, current: usize },

    #[error("All photos are already captured; continue to the data form")]
    CaptureComplete,

    #[error("The {0} photo step has not been reached yet")]
    StepNotReached(PhotoView),

    #[error("Photo rejected: {0}")]
    FileRejected(FileRejection),

    #[error(transparent)]
    Read(#[from] PhotoReadError),

    #[error("{} validation error(s): {}", .0.len(), join_messages(.0))]
    Validation(Vec<Violation>),

    #[error("Photos still missing: {0:?}")]
    PhotosIncomplete(Vec<PhotoView>),

    #[error("Analysis was cancelled")]
    Cancelled,

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl FlowError {
    /// User-facing messages, one per problem.
    pub fn messages(&self) -> Vec<String> {
        match self {
            FlowError::FileRejected(rejection) => rejection.messages(),
            FlowError::Validation(violations) => {
                violations.iter().map(|v| v.message.clone()).collect()
            }
            other => vec![other.to_string()],
        }
    }
}

fn join_messages(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error("Store error: {0}")]
    Store(String),

    #[error(transparent)]
    Flow(#[from] FlowError),
}
