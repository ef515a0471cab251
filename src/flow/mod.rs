//! The wizard state machine.
//!
//! `welcome -> photo-capture (4 steps) -> data form -> analyzing -> results
//! -> workout plan`, with `restart` legal everywhere. `FlowController` owns
//! the session; hosts drive it through its operations and observe it
//! through `WizardEvent` listeners.

mod capture;
mod controller;
mod events;
mod steps;

pub use capture::{read_photo, PhotoFile, PhotoSource};
pub use controller::{CaptureOutcome, FlowController, RecoveryReport};
pub use events::{EventBus, SubscriptionId, WizardEvent};
pub use steps::{step_at, PhotoStep, PHOTO_STEPS};
