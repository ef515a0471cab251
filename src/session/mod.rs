//! In-memory model of wizard progress.
//!
//! The `Session` is owned and mutated exclusively by the flow controller;
//! everything else sees it through `&Session` or an `AssessmentResults` copy.

mod form;
pub mod types;

pub use types::*;

use crate::analysis::AnalysisResults;

/// Number of photo-capture steps; also the terminal step index.
pub const STEP_COUNT: usize = PhotoView::ALL.len();

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub current_screen: Screen,
    /// Index into the photo steps; `STEP_COUNT` once every view is captured
    pub current_step_index: usize,
    pub photos: PhotoSlots,
    pub user_data: UserData,
    pub analysis_results: Option<AnalysisResults>,
}

/// Everything a host application gets back from a finished assessment.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentResults {
    pub photos: PhotoSlots,
    pub user_data: UserData,
    pub analysis: Option<AnalysisResults>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the step index has reached the terminal value.
    pub fn capture_finished(&self) -> bool {
        self.current_step_index >= STEP_COUNT
    }

    pub fn results(&self) -> AssessmentResults {
        AssessmentResults {
            photos: self.photos.clone(),
            user_data: self.user_data.clone(),
            analysis: self.analysis_results.clone(),
        }
    }
}
