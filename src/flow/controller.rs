use chrono::{DateTime, TimeZone, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::analysis::{workout_plan_for, AnalysisBackend, AnalysisResults, WorkoutPlan};
use crate::config::PhotoRules;
use crate::error::{FlowError, PersistenceError};
use crate::persistence::{PersistenceAdapter, Snapshot};
use crate::session::{
    AssessmentResults, FormInput, PhotoHandle, PhotoView, Screen, Session, STEP_COUNT,
};
use crate::validation::{check_file, validate_biometrics, validate_user_data};

use super::capture::{read_photo, PhotoFile};
use super::events::{EventBus, SubscriptionId, WizardEvent};
use super::steps::{step_at, PhotoStep, PHOTO_STEPS};

type CompletionCallback = Box<dyn FnMut(&AssessmentResults) + Send>;

/// Where the flow stands after a successful capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The next step is now active
    NextStep(&'static PhotoStep),
    /// The last step is done and the data form is showing
    AllCaptured,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryReport {
    Restored {
        screen: Screen,
        step_index: usize,
        saved_at: DateTime<Utc>,
        message: String,
    },
    NothingToRecover,
}

/// Owns the session and is the only thing that mutates it.
///
/// Every operation either applies a full transition or leaves the session
/// untouched and returns the reason. Persistence failures never fail an
/// operation; they are logged, emitted and kept in `last_persistence_error`.
pub struct FlowController {
    session: Session,
    persistence: PersistenceAdapter,
    rules: PhotoRules,
    events: EventBus,
    on_complete: Option<CompletionCallback>,
    last_persistence_error: Option<PersistenceError>,
}

impl FlowController {
    pub fn new(persistence: PersistenceAdapter, rules: PhotoRules) -> Self {
        Self {
            session: Session::new(),
            persistence,
            rules,
            events: EventBus::new(),
            on_complete: None,
            last_persistence_error: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn screen(&self) -> Screen {
        self.session.current_screen
    }

    /// The active photo step, or `None` once every view is captured.
    pub fn current_step(&self) -> Option<&'static PhotoStep> {
        step_at(self.session.current_step_index)
    }

    pub fn persistence(&self) -> &PersistenceAdapter {
        &self.persistence
    }

    pub fn last_persistence_error(&self) -> Option<&PersistenceError> {
        self.last_persistence_error.as_ref()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&WizardEvent) + Send + 'static,
    {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Register the callback run each time an analysis completes.
    pub fn set_on_complete<F>(&mut self, callback: F)
    where
        F: FnMut(&AssessmentResults) + Send + 'static,
    {
        self.on_complete = Some(Box::new(callback));
    }

    // --- Transitions ---

    /// Begin a fresh capture run. Legal from every screen.
    pub fn start(&mut self) {
        let from = self.session.current_screen;
        self.session = Session {
            current_screen: from,
            ..Session::new()
        };
        self.set_screen(Screen::PhotoCapture);
        self.persist();
    }

    /// Store the photo for the active step and advance.
    ///
    /// Nothing changes unless the file passes the type and size checks and
    /// decodes as an image. Dropping the returned future before it resolves
    /// also leaves the session untouched.
    pub async fn capture_photo(
        &mut self,
        step_index: usize,
        file: &PhotoFile,
    ) -> Result<CaptureOutcome, FlowError> {
        self.require_screen(&[Screen::PhotoCapture], "capture a photo")?;
        if self.session.capture_finished() {
            return Err(FlowError::CaptureComplete);
        }
        if step_index != self.session.current_step_index {
            return Err(FlowError::StepMismatch {
                requested: step_index,
                current: self.session.current_step_index,
            });
        }

        let view = PHOTO_STEPS[step_index].view;
        let photo = self.accept_file(view, file).await?;

        self.session.photos.set(view, photo);
        self.session.current_step_index += 1;
        let step_index = self.session.current_step_index;
        info!("Captured {} photo ({} of {})", view, step_index, STEP_COUNT);
        self.events.emit(&WizardEvent::StepAdvanced { step_index, view });

        let outcome = match self.current_step() {
            Some(next) => CaptureOutcome::NextStep(next),
            None => {
                self.set_screen(Screen::ComplementaryData);
                CaptureOutcome::AllCaptured
            }
        };
        self.persist();
        Ok(outcome)
    }

    /// Replace the photo of a step already reached, keeping the step index.
    ///
    /// Also how views lost across a reload are filled back in.
    pub async fn recapture_photo(
        &mut self,
        view: PhotoView,
        file: &PhotoFile,
    ) -> Result<(), FlowError> {
        self.require_screen(
            &[Screen::PhotoCapture, Screen::ComplementaryData],
            "retake a photo",
        )?;
        let position = PHOTO_STEPS
            .iter()
            .position(|step| step.view == view)
            .unwrap_or(STEP_COUNT);
        if position >= self.session.current_step_index {
            return Err(FlowError::StepNotReached(view));
        }

        let photo = self.accept_file(view, file).await?;
        self.session.photos.set(view, photo);
        info!("Replaced {} photo", view);
        self.events.emit(&WizardEvent::PhotoReplaced { view });
        self.persist();
        Ok(())
    }

    /// Step back from the data form to capture, or from the plan to results.
    ///
    /// Leaving capture is only possible through `restart`, since `start`
    /// clears whatever was captured.
    pub fn go_back(&mut self) -> Result<(), FlowError> {
        let to = match self.session.current_screen {
            Screen::ComplementaryData => Screen::PhotoCapture,
            Screen::WorkoutPlan => Screen::Results,
            from => {
                return Err(FlowError::InvalidTransition {
                    action: "go back",
                    from,
                })
            }
        };
        self.set_screen(to);
        self.persist();
        Ok(())
    }

    /// Leave photo capture for the data form once every view is present.
    pub fn continue_to_data_form(&mut self) -> Result<(), FlowError> {
        self.require_screen(&[Screen::PhotoCapture], "continue to the data form")?;
        let missing = self.session.photos.missing();
        if !missing.is_empty() {
            return Err(FlowError::PhotosIncomplete(missing));
        }
        self.set_screen(Screen::ComplementaryData);
        self.persist();
        Ok(())
    }

    /// Synchronize the form into the session and validate everything.
    ///
    /// On failure every violation is returned at once and the screen stays
    /// on the data form; the synchronized values are kept for the next try.
    pub fn submit_user_data(&mut self, form: &FormInput) -> Result<(), FlowError> {
        self.require_screen(&[Screen::ComplementaryData], "submit user data")?;

        let mut errors = self.session.user_data.apply_form(form);
        let unparsed: Vec<String> = errors.iter().map(|v| v.field.clone()).collect();
        errors.extend(
            validate_biometrics(&self.session.user_data, &self.session.photos)
                .into_iter()
                .filter(|v| !unparsed.contains(&v.field)),
        );

        if !errors.is_empty() {
            warn!("User data rejected with {} violation(s)", errors.len());
            self.events.emit(&WizardEvent::ValidationFailed {
                errors: errors.clone(),
            });
            self.persist();
            return Err(FlowError::Validation(errors));
        }

        self.session.analysis_results = None;
        self.set_screen(Screen::Analyzing);
        self.persist();
        Ok(())
    }

    /// Store analysis results and show them. Only legal while analyzing.
    pub fn complete_analysis(&mut self, results: AnalysisResults) -> Result<(), FlowError> {
        self.require_screen(&[Screen::Analyzing], "complete analysis")?;

        self.session.analysis_results = Some(results);
        self.set_screen(Screen::Results);
        self.persist();
        self.events.emit(&WizardEvent::AnalysisCompleted);

        if let Some(callback) = self.on_complete.as_mut() {
            callback(&self.session.results());
        }
        Ok(())
    }

    /// Await the backend and complete the analysis with its results.
    ///
    /// If `cancel` fires first, or the backend fails, the flow returns to
    /// the data form with the user data intact.
    pub async fn run_analysis<B: AnalysisBackend>(
        &mut self,
        backend: &B,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResults, FlowError> {
        self.require_screen(&[Screen::Analyzing], "run analysis")?;
        let user_data = self.session.user_data.clone();

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = backend.analyze(user_data) => Some(result),
        };

        match outcome {
            Some(Ok(results)) => {
                self.complete_analysis(results.clone())?;
                Ok(results)
            }
            Some(Err(e)) => {
                warn!("Analysis failed: {}", e);
                self.set_screen(Screen::ComplementaryData);
                self.persist();
                Err(e.into())
            }
            None => {
                info!("Analysis cancelled");
                self.set_screen(Screen::ComplementaryData);
                self.events.emit(&WizardEvent::AnalysisCancelled);
                self.persist();
                Err(FlowError::Cancelled)
            }
        }
    }

    pub fn show_workout_plan(&mut self) -> Result<WorkoutPlan, FlowError> {
        let from = self.session.current_screen;
        let plan = match (&self.session.analysis_results, from) {
            (Some(results), Screen::Results) => workout_plan_for(results),
            _ => {
                return Err(FlowError::InvalidTransition {
                    action: "show the workout plan",
                    from,
                })
            }
        };
        self.set_screen(Screen::WorkoutPlan);
        self.persist();
        Ok(plan)
    }

    /// Drop the whole session and the persisted snapshot. Always legal.
    pub fn restart(&mut self) {
        let from = self.session.current_screen;
        self.session = Session {
            current_screen: from,
            ..Session::new()
        };
        self.set_screen(Screen::Welcome);

        match self.persistence.clear() {
            Ok(()) => self.last_persistence_error = None,
            Err(e) => self.persistence_failed(e),
        }
    }

    /// Restore the last persisted snapshot. Call once at startup.
    ///
    /// Photos are never persisted, so restored sessions have empty slots.
    /// A missing, unreadable or inconsistent snapshot reports nothing to
    /// recover and leaves the fresh session as it is.
    pub fn recover(&mut self) -> RecoveryReport {
        let snapshot = match self.persistence.load() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                debug!("No snapshot to recover");
                return RecoveryReport::NothingToRecover;
            }
            Err(e) => {
                warn!("Ignoring saved session: {}", e);
                return RecoveryReport::NothingToRecover;
            }
        };

        if let Err(reason) = check_consistency(&snapshot) {
            warn!("Ignoring saved session: {}", reason);
            return RecoveryReport::NothingToRecover;
        }

        // An interrupted analysis cannot resume; resubmit from the form
        let screen = match snapshot.current_screen {
            Screen::Analyzing => Screen::ComplementaryData,
            other => other,
        };

        self.session = Session {
            current_screen: screen,
            current_step_index: snapshot.current_photo_step,
            photos: Default::default(),
            user_data: snapshot.user_data,
            analysis_results: snapshot.analysis_results,
        };

        let saved_at = self
            .persistence
            .last_saved_millis()
            .ok()
            .flatten()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .unwrap_or(snapshot.timestamp);
        let message = format!(
            "Session restored from {} UTC",
            saved_at.format("%d %B %Y at %H:%M")
        );

        info!("{} ({})", message, screen);
        self.events.emit(&WizardEvent::SessionRestored { screen });

        RecoveryReport::Restored {
            screen,
            step_index: snapshot.current_photo_step,
            saved_at,
            message,
        }
    }

    // --- Internals ---

    fn require_screen(&self, allowed: &[Screen], action: &'static str) -> Result<(), FlowError> {
        let from = self.session.current_screen;
        if allowed.contains(&from) {
            Ok(())
        } else {
            Err(FlowError::InvalidTransition { action, from })
        }
    }

    /// Check and read a file for `view`, emitting `PhotoRejected` on failure.
    async fn accept_file(
        &mut self,
        view: PhotoView,
        file: &PhotoFile,
    ) -> Result<PhotoHandle, FlowError> {
        if let Err(rejection) = check_file(&file.metadata, &self.rules) {
            warn!("Rejected '{}' for {}: {}", file.metadata.name, view, rejection);
            self.events.emit(&WizardEvent::PhotoRejected {
                view,
                reasons: rejection.messages(),
            });
            return Err(FlowError::FileRejected(rejection));
        }

        match read_photo(view, file).await {
            Ok(photo) => Ok(photo),
            Err(e) => {
                warn!("{}", e);
                self.events.emit(&WizardEvent::PhotoRejected {
                    view,
                    reasons: vec![e.to_string()],
                });
                Err(e.into())
            }
        }
    }

    fn set_screen(&mut self, to: Screen) {
        let from = self.session.current_screen;
        if from == to {
            return;
        }
        self.session.current_screen = to;
        info!("Screen {} -> {}", from, to);
        self.events.emit(&WizardEvent::ScreenChanged { from, to });
    }

    fn persist(&mut self) {
        let snapshot = Snapshot::from_session(&self.session, Utc::now());
        match self.persistence.save(&snapshot) {
            Ok(()) => self.last_persistence_error = None,
            Err(e) => self.persistence_failed(e),
        }
    }

    fn persistence_failed(&mut self, error: PersistenceError) {
        warn!("Persistence failed, continuing in memory: {}", error);
        self.events.emit(&WizardEvent::PersistenceFailed {
            message: error.to_string(),
        });
        self.last_persistence_error = Some(error);
    }
}

/// Reject snapshots whose fields contradict each other.
fn check_consistency(snapshot: &Snapshot) -> Result<(), String> {
    if snapshot.current_photo_step > STEP_COUNT {
        return Err(format!(
            "photo step {} is out of range",
            snapshot.current_photo_step
        ));
    }

    let shows_results = matches!(
        snapshot.current_screen,
        Screen::Results | Screen::WorkoutPlan
    );
    if shows_results && snapshot.analysis_results.is_none() {
        return Err(format!("{} without analysis results", snapshot.current_screen));
    }

    if snapshot.analysis_results.is_some() {
        let violations = validate_user_data(&snapshot.user_data);
        if !violations.is_empty() {
            return Err(format!(
                "analysis results with invalid user data ({} violation(s))",
                violations.len()
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analyze, SimulatedBackend};
    use crate::error::AnalysisError;
    use crate::persistence::{KeyValueStore, MemoryStore};
    use crate::session::{Gender, UserData};
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct SharedStore(Arc<MemoryStore>);

    impl KeyValueStore for SharedStore {
        fn get(&self, key: &str) -> Result<Option<String>, String> {
            self.0.get(key)
        }
        fn set(&self, key: &str, value: &str) -> Result<(), String> {
            self.0.set(key, value)
        }
        fn remove(&self, key: &str) -> Result<(), String> {
            self.0.remove(key)
        }
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, String> {
            Err("quota exceeded".to_string())
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), String> {
            Err("quota exceeded".to_string())
        }
        fn remove(&self, _key: &str) -> Result<(), String> {
            Err("quota exceeded".to_string())
        }
    }

    struct FailingBackend;

    impl AnalysisBackend for FailingBackend {
        async fn analyze(&self, _user_data: UserData) -> Result<AnalysisResults, AnalysisError> {
            Err(AnalysisError::Backend("offline".to_string()))
        }
    }

    fn controller_on(store: Arc<MemoryStore>) -> FlowController {
        let adapter = PersistenceAdapter::new(Box::new(SharedStore(store)), "assessment_");
        FlowController::new(adapter, PhotoRules::default())
    }

    fn controller() -> FlowController {
        controller_on(Arc::new(MemoryStore::new()))
    }

    fn record(controller: &mut FlowController) -> Arc<Mutex<Vec<WizardEvent>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        controller.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        seen
    }

    fn png(name: &str) -> PhotoFile {
        let img = image::DynamicImage::new_rgb8(2, 2);
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        PhotoFile::from_bytes(name, "image/png", out.into_inner())
    }

    fn valid_form() -> FormInput {
        FormInput {
            weight: Some("75".to_string()),
            height: Some("175".to_string()),
            age: Some("30".to_string()),
            gender: Some("male".to_string()),
            activity_level: Some("moderate".to_string()),
            goal: Some("gain_muscle".to_string()),
        }
    }

    async fn capture_all(controller: &mut FlowController) {
        for step in 0..STEP_COUNT {
            controller.capture_photo(step, &png("photo.png")).await.unwrap();
        }
    }

    #[test]
    fn test_start_resets_to_first_step() {
        let mut controller = controller();
        controller.start();

        assert_eq!(controller.screen(), Screen::PhotoCapture);
        assert_eq!(controller.session().current_step_index, 0);
        assert_eq!(controller.current_step().map(|s| s.view), Some(PhotoView::Front));
    }

    #[tokio::test]
    async fn test_capture_advances_one_step() {
        let mut controller = controller();
        let events = record(&mut controller);
        controller.start();

        let outcome = controller.capture_photo(0, &png("front.png")).await.unwrap();

        assert_eq!(outcome, CaptureOutcome::NextStep(&PHOTO_STEPS[1]));
        assert_eq!(controller.session().current_step_index, 1);
        assert!(controller.session().photos.is_captured(PhotoView::Front));
        assert!(events.lock().unwrap().contains(&WizardEvent::StepAdvanced {
            step_index: 1,
            view: PhotoView::Front,
        }));
    }

    #[tokio::test]
    async fn test_fourth_capture_opens_data_form() {
        let mut controller = controller();
        controller.start();
        for step in 0..3 {
            controller.capture_photo(step, &png("p.png")).await.unwrap();
        }

        let outcome = controller.capture_photo(3, &png("right.png")).await.unwrap();

        assert_eq!(outcome, CaptureOutcome::AllCaptured);
        assert_eq!(controller.screen(), Screen::ComplementaryData);
        assert!(controller.session().photos.all_captured());
    }

    #[tokio::test]
    async fn test_unsupported_type_leaves_state_unchanged() {
        let mut controller = controller();
        let events = record(&mut controller);
        controller.start();
        let before = controller.session().clone();

        let gif = PhotoFile::from_bytes("anim.gif", "image/gif", vec![0; 1024]);
        let err = controller.capture_photo(0, &gif).await.unwrap_err();

        assert!(matches!(err, FlowError::FileRejected(_)));
        assert!(err.messages()[0].contains("image/gif"));
        assert_eq!(controller.session(), &before);
        assert!(matches!(
            events.lock().unwrap().last(),
            Some(WizardEvent::PhotoRejected { view: PhotoView::Front, .. })
        ));
    }

    #[tokio::test]
    async fn test_unreadable_file_allows_retry() {
        let mut controller = controller();
        controller.start();

        let broken = PhotoFile::from_bytes("front.jpg", "image/jpeg", b"garbage".to_vec());
        let err = controller.capture_photo(0, &broken).await.unwrap_err();
        assert!(matches!(err, FlowError::Read(_)));
        assert_eq!(controller.session().current_step_index, 0);

        controller.capture_photo(0, &png("front.png")).await.unwrap();
        assert_eq!(controller.session().current_step_index, 1);
    }

    #[test]
    fn test_dropped_capture_leaves_session_untouched() {
        // One blocking thread, held busy so the decode stays queued
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .max_blocking_threads(1)
            .build()
            .unwrap();

        runtime.block_on(async {
            let mut controller = controller();
            controller.start();
            let before = controller.session().clone();

            let (release, wait) = std::sync::mpsc::channel::<()>();
            let blocker = tokio::task::spawn_blocking(move || wait.recv().ok());

            let pending = tokio::time::timeout(
                Duration::from_millis(50),
                controller.capture_photo(0, &png("front.png")),
            )
            .await;
            assert!(pending.is_err(), "capture should still be waiting on the decode");

            assert_eq!(controller.session(), &before);
            assert_eq!(controller.session().current_step_index, 0);
            assert_eq!(controller.session().photos.captured_count(), 0);

            release.send(()).unwrap();
            blocker.await.unwrap();

            controller.capture_photo(0, &png("front.png")).await.unwrap();
            assert_eq!(controller.session().current_step_index, 1);
        });
    }

    #[tokio::test]
    async fn test_capture_rejects_wrong_step_and_terminal_index() {
        let mut controller = controller();
        controller.start();

        assert_eq!(
            controller.capture_photo(2, &png("p.png")).await,
            Err(FlowError::StepMismatch {
                requested: 2,
                current: 0
            })
        );

        capture_all(&mut controller).await;
        controller.go_back().unwrap();
        assert_eq!(
            controller.capture_photo(4, &png("p.png")).await,
            Err(FlowError::CaptureComplete)
        );
    }

    #[tokio::test]
    async fn test_capture_outside_photo_screen_is_invalid() {
        let mut controller = controller();
        let err = controller.capture_photo(0, &png("p.png")).await.unwrap_err();
        assert_eq!(
            err,
            FlowError::InvalidTransition {
                action: "capture a photo",
                from: Screen::Welcome
            }
        );
    }

    #[tokio::test]
    async fn test_recapture_replaces_without_advancing() {
        let mut controller = controller();
        let events = record(&mut controller);
        controller.start();
        controller.capture_photo(0, &png("first.png")).await.unwrap();

        assert_eq!(
            controller.recapture_photo(PhotoView::Back, &png("b.png")).await,
            Err(FlowError::StepNotReached(PhotoView::Back))
        );

        controller
            .recapture_photo(PhotoView::Front, &png("second.png"))
            .await
            .unwrap();
        assert_eq!(controller.session().current_step_index, 1);
        assert!(events
            .lock()
            .unwrap()
            .contains(&WizardEvent::PhotoReplaced { view: PhotoView::Front }));
    }

    #[tokio::test]
    async fn test_go_back_preserves_photos() {
        let mut controller = controller();
        controller.start();
        capture_all(&mut controller).await;

        controller.go_back().unwrap();
        assert_eq!(controller.screen(), Screen::PhotoCapture);
        assert_eq!(controller.session().photos.captured_count(), 4);

        controller.continue_to_data_form().unwrap();
        assert_eq!(controller.screen(), Screen::ComplementaryData);
    }

    #[tokio::test]
    async fn test_continue_requires_all_photos() {
        let mut controller = controller();
        controller.start();
        controller.capture_photo(0, &png("p.png")).await.unwrap();

        let err = controller.continue_to_data_form().unwrap_err();
        assert_eq!(
            err,
            FlowError::PhotosIncomplete(vec![
                PhotoView::Back,
                PhotoView::SideLeft,
                PhotoView::SideRight
            ])
        );
    }

    #[test]
    fn test_go_back_from_welcome_is_invalid() {
        let mut controller = controller();
        assert!(matches!(
            controller.go_back(),
            Err(FlowError::InvalidTransition { action: "go back", .. })
        ));
    }

    #[tokio::test]
    async fn test_go_back_from_capture_is_invalid() {
        let mut controller = controller();
        controller.start();
        controller.capture_photo(0, &png("front.png")).await.unwrap();

        assert_eq!(
            controller.go_back(),
            Err(FlowError::InvalidTransition {
                action: "go back",
                from: Screen::PhotoCapture
            })
        );
        assert_eq!(controller.screen(), Screen::PhotoCapture);
        assert_eq!(controller.session().photos.captured_count(), 1);
    }

    #[tokio::test]
    async fn test_submit_reports_every_violation() {
        let mut controller = controller();
        let events = record(&mut controller);
        controller.start();
        capture_all(&mut controller).await;

        let form = FormInput {
            height: Some("50".to_string()),
            weight: Some("heavy".to_string()),
            ..Default::default()
        };
        let err = controller.submit_user_data(&form).unwrap_err();

        let FlowError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        let fields: Vec<&str> = errors.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["weight", "height", "age", "gender"]);
        assert!(errors[1].message.contains("50"));
        assert_eq!(controller.screen(), Screen::ComplementaryData);
        assert!(matches!(
            events.lock().unwrap().last(),
            Some(WizardEvent::ValidationFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_submit_keeps_earlier_fields() {
        let mut controller = controller();
        controller.start();
        capture_all(&mut controller).await;

        let partial = FormInput {
            weight: Some("75".to_string()),
            gender: Some("female".to_string()),
            ..Default::default()
        };
        assert!(controller.submit_user_data(&partial).is_err());

        let rest = FormInput {
            height: Some("168".to_string()),
            age: Some("41".to_string()),
            ..Default::default()
        };
        controller.submit_user_data(&rest).unwrap();

        let data = &controller.session().user_data;
        assert_eq!(data.weight, Some(75.0));
        assert_eq!(data.gender, Some(Gender::Female));
        assert_eq!(controller.screen(), Screen::Analyzing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_analysis_completes_and_calls_back() {
        let mut controller = controller();
        let completed = Arc::new(Mutex::new(None));
        let sink = completed.clone();
        controller.set_on_complete(move |results| {
            *sink.lock().unwrap() = Some(results.clone());
        });
        controller.start();
        capture_all(&mut controller).await;
        controller.submit_user_data(&valid_form()).unwrap();

        let backend = SimulatedBackend::new(Duration::from_secs(2));
        let results = controller
            .run_analysis(&backend, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(controller.screen(), Screen::Results);
        assert_eq!(controller.session().analysis_results.as_ref(), Some(&results));
        let callback = completed.lock().unwrap().clone().unwrap();
        assert_eq!(callback.analysis, Some(results));
        assert_eq!(callback.photos.captured_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_analysis_returns_to_form() {
        let mut controller = controller();
        let events = record(&mut controller);
        controller.start();
        capture_all(&mut controller).await;
        controller.submit_user_data(&valid_form()).unwrap();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            trigger.cancel();
        });

        let backend = SimulatedBackend::new(Duration::from_secs(2));
        let err = controller.run_analysis(&backend, &cancel).await.unwrap_err();

        assert_eq!(err, FlowError::Cancelled);
        assert_eq!(controller.screen(), Screen::ComplementaryData);
        assert!(controller.session().analysis_results.is_none());
        assert_eq!(controller.session().user_data.height, Some(175));
        assert!(events
            .lock()
            .unwrap()
            .contains(&WizardEvent::AnalysisCancelled));
    }

    #[tokio::test]
    async fn test_backend_failure_returns_to_form() {
        let mut controller = controller();
        controller.start();
        capture_all(&mut controller).await;
        controller.submit_user_data(&valid_form()).unwrap();

        let err = controller
            .run_analysis(&FailingBackend, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, FlowError::Analysis(AnalysisError::Backend(_))));
        assert_eq!(controller.screen(), Screen::ComplementaryData);
    }

    #[test]
    fn test_complete_analysis_only_while_analyzing() {
        let mut controller = controller();
        let results = analyze(&UserData {
            weight: Some(70.0),
            height: Some(170),
            age: Some(25),
            gender: Some(Gender::Male),
            ..Default::default()
        })
        .unwrap();

        assert!(matches!(
            controller.complete_analysis(results),
            Err(FlowError::InvalidTransition { .. })
        ));
        assert!(controller.session().analysis_results.is_none());
    }

    #[tokio::test]
    async fn test_workout_plan_and_back() {
        let mut controller = controller();
        controller.start();
        capture_all(&mut controller).await;
        controller.submit_user_data(&valid_form()).unwrap();
        let results = analyze(&controller.session().user_data).unwrap();
        controller.complete_analysis(results).unwrap();

        let plan = controller.show_workout_plan().unwrap();
        assert_eq!(plan.sessions.len(), 2);
        assert_eq!(controller.screen(), Screen::WorkoutPlan);

        controller.go_back().unwrap();
        assert_eq!(controller.screen(), Screen::Results);
    }

    #[tokio::test]
    async fn test_restart_is_idempotent_and_clears_snapshot() {
        let store = Arc::new(MemoryStore::new());
        let mut controller = controller_on(store.clone());
        controller.start();
        capture_all(&mut controller).await;
        assert!(controller.persistence().load().unwrap().is_some());

        controller.restart();
        let once = controller.session().clone();
        controller.restart();

        assert_eq!(controller.session(), &once);
        assert_eq!(once, Session::new());
        assert!(controller.persistence().load().unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_recover_restores_without_photos() {
        let store = Arc::new(MemoryStore::new());
        {
            let mut first = controller_on(store.clone());
            first.start();
            capture_all(&mut first).await;
            first.submit_user_data(&valid_form()).unwrap();
        }

        let mut second = controller_on(store);
        let events = record(&mut second);
        let report = second.recover();

        let RecoveryReport::Restored {
            screen,
            step_index,
            message,
            ..
        } = report
        else {
            panic!("expected a restored session");
        };
        // Saved while analyzing
        assert_eq!(screen, Screen::ComplementaryData);
        assert_eq!(step_index, STEP_COUNT);
        assert!(message.starts_with("Session restored from "));
        assert_eq!(second.session().user_data.height, Some(175));
        assert_eq!(second.session().photos.captured_count(), 0);
        assert!(events
            .lock()
            .unwrap()
            .contains(&WizardEvent::SessionRestored { screen }));

        // Lost photos are filled back in by retaking them
        for view in PhotoView::ALL {
            second.recapture_photo(view, &png("again.png")).await.unwrap();
        }
        second.submit_user_data(&FormInput::default()).unwrap();
        assert_eq!(second.screen(), Screen::Analyzing);
    }

    #[test]
    fn test_recover_with_nothing_saved() {
        let mut controller = controller();
        assert_eq!(controller.recover(), RecoveryReport::NothingToRecover);
        assert_eq!(controller.session(), &Session::new());
    }

    #[test]
    fn test_recover_ignores_corrupt_snapshot() {
        let store = Arc::new(MemoryStore::new());
        store.set("assessment_state", "{\"currentScreen\":").unwrap();

        let mut controller = controller_on(store);
        assert_eq!(controller.recover(), RecoveryReport::NothingToRecover);
        assert_eq!(controller.screen(), Screen::Welcome);
    }

    #[test]
    fn test_recover_ignores_inconsistent_snapshot() {
        let store = Arc::new(MemoryStore::new());
        let adapter = PersistenceAdapter::new(Box::new(SharedStore(store.clone())), "assessment_");
        let mut session = Session::new();
        session.current_screen = Screen::Results;
        adapter
            .save(&Snapshot::from_session(&session, Utc::now()))
            .unwrap();

        let mut controller = controller_on(store.clone());
        assert_eq!(controller.recover(), RecoveryReport::NothingToRecover);

        session.current_screen = Screen::PhotoCapture;
        session.current_step_index = 9;
        adapter
            .save(&Snapshot::from_session(&session, Utc::now()))
            .unwrap();
        assert_eq!(controller.recover(), RecoveryReport::NothingToRecover);
    }

    #[tokio::test]
    async fn test_persistence_failure_is_not_fatal() {
        let adapter = PersistenceAdapter::new(Box::new(FailingStore), "assessment_");
        let mut controller = FlowController::new(adapter, PhotoRules::default());
        let events = record(&mut controller);

        controller.start();
        controller.capture_photo(0, &png("front.png")).await.unwrap();

        assert_eq!(controller.session().current_step_index, 1);
        assert!(matches!(
            controller.last_persistence_error(),
            Some(PersistenceError::Storage(_))
        ));
        assert!(events
            .lock()
            .unwrap()
            .iter()
            .any(|e| matches!(e, WizardEvent::PersistenceFailed { .. })));
        assert_eq!(controller.recover(), RecoveryReport::NothingToRecover);
    }
}
