pub mod analysis;
pub mod assessment;
pub mod banner;
pub mod config;
pub mod error;
pub mod flow;
pub mod persistence;
pub mod session;
pub mod validation;

pub use assessment::{BodyAssessment, VERSION};
pub use error::{AnalysisError, AssessmentError, FlowError, PersistenceError, PhotoReadError};
pub use flow::{CaptureOutcome, FlowController, PhotoFile, RecoveryReport, WizardEvent};
pub use session::{AssessmentResults, FormInput, Screen, Session};

/// Install the global tracing subscriber, honouring `RUST_LOG` and
/// defaulting to `info`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
