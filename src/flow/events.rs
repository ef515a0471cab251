//! Transition notifications.
//!
//! The controller never renders; a host subscribes callbacks here and
//! reacts to what changed.

use serde::Serialize;

use crate::session::{PhotoView, Screen};
use crate::validation::Violation;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WizardEvent {
    ScreenChanged {
        from: Screen,
        to: Screen,
    },

    /// A photo was stored and the step index moved to `step_index`
    StepAdvanced {
        step_index: usize,
        view: PhotoView,
    },

    /// An already captured view was overwritten
    PhotoReplaced {
        view: PhotoView,
    },

    PhotoRejected {
        view: PhotoView,
        reasons: Vec<String>,
    },

    ValidationFailed {
        errors: Vec<Violation>,
    },

    AnalysisCompleted,

    AnalysisCancelled,

    /// A snapshot could not be saved or cleared; the session is unaffected
    PersistenceFailed {
        message: String,
    },

    SessionRestored {
        screen: Screen,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&WizardEvent) + Send>;

/// Ordered listener registry. Listeners run synchronously in subscription order.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&WizardEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the id was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: &WizardEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
