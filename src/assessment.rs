//! Programmatic entry point for host applications.

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::analysis::{AnalysisResults, SimulatedBackend};
use crate::banner::StatusBanner;
use crate::config::WizardConfig;
use crate::error::{AssessmentError, FlowError};
use crate::flow::{CaptureOutcome, FlowController, PhotoFile, RecoveryReport};
use crate::persistence::{KeyValueStore, PersistenceAdapter, SqliteStore};
use crate::session::{AssessmentResults, FormInput, Session};

pub const VERSION: &str = "1.0.0";

/// The wizard as a host application sees it: the flow controller plus the
/// status banner and the configured analysis backend.
///
/// Operations that can fail also put their messages on the banner.
pub struct BodyAssessment {
    controller: FlowController,
    banner: StatusBanner,
    backend: SimulatedBackend,
}

impl BodyAssessment {
    pub fn new(config: &WizardConfig, store: Box<dyn KeyValueStore + Send>) -> Self {
        let adapter = PersistenceAdapter::new(store, &config.storage.prefix);
        Self {
            controller: FlowController::new(adapter, config.photos.clone()),
            banner: StatusBanner::new(config.banner),
            backend: SimulatedBackend::new(config.analysis.delay()),
        }
    }

    /// Open the durable SQLite store in the platform data directory.
    pub fn open(config: &WizardConfig) -> Result<Self, AssessmentError> {
        let path = config.database_path();
        let store = SqliteStore::open(&path).map_err(AssessmentError::Store)?;
        info!("Body assessment {} using {:?}", VERSION, path);
        Ok(Self::new(config, Box::new(store)))
    }

    pub fn controller(&self) -> &FlowController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut FlowController {
        &mut self.controller
    }

    pub fn banner(&self) -> &StatusBanner {
        &self.banner
    }

    pub fn session(&self) -> &Session {
        self.controller.session()
    }

    pub fn start(&mut self) {
        self.controller.start();
    }

    pub fn get_results(&self) -> AssessmentResults {
        self.controller.session().results()
    }

    /// Register the callback run when an analysis completes.
    pub fn on_complete<F>(&mut self, callback: F)
    where
        F: FnMut(&AssessmentResults) + Send + 'static,
    {
        self.controller.set_on_complete(callback);
    }

    /// Restore the previous session and announce it on the banner.
    pub fn recover(&mut self) -> RecoveryReport {
        let report = self.controller.recover();
        if let RecoveryReport::Restored { message, .. } = &report {
            self.banner.show_success(message.clone());
        }
        report
    }

    pub async fn capture_photo(
        &mut self,
        step_index: usize,
        file: &PhotoFile,
    ) -> Result<CaptureOutcome, AssessmentError> {
        let result = self.controller.capture_photo(step_index, file).await;
        self.report(result).map_err(Into::into)
    }

    /// Submit the data form and, if it validates, run the analysis.
    pub async fn submit_and_analyze(
        &mut self,
        form: &FormInput,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResults, AssessmentError> {
        let submitted = self.controller.submit_user_data(form);
        self.report(submitted)?;

        let analyzed = self.controller.run_analysis(&self.backend, cancel).await;
        let results = self.report(analyzed)?;
        self.banner.show_success("Analysis complete");
        Ok(results)
    }

    pub fn restart(&mut self) {
        self.banner.clear();
        self.controller.restart();
    }

    fn report<T>(&mut self, result: Result<T, FlowError>) -> Result<T, FlowError> {
        if let Err(e) = &result {
            self.banner.show_errors(e.messages());
        }
        result
    }
}
