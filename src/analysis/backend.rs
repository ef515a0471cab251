//! Asynchronous boundary in front of the analysis engine.
//!
//! The flow controller only talks to `AnalysisBackend`, so the simulated
//! delay can be swapped for an out-of-process call without touching the
//! controller's control flow.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::AnalysisError;
use crate::session::UserData;

use super::engine;
use super::types::AnalysisResults;

pub trait AnalysisBackend {
    fn analyze(
        &self,
        user_data: UserData,
    ) -> impl Future<Output = Result<AnalysisResults, AnalysisError>>;
}

/// Runs the local engine after a fixed delay, standing in for remote processing.
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    delay: Duration,
}

impl SimulatedBackend {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

impl AnalysisBackend for SimulatedBackend {
    async fn analyze(&self, user_data: UserData) -> Result<AnalysisResults, AnalysisError> {
        debug!("Simulating analysis for {:?}", self.delay);
        tokio::time::sleep(self.delay).await;
        engine::analyze(&user_data)
    }
}
