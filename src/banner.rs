//! Transient status banner with auto-clear.
//!
//! Showing a message replaces the current one and aborts its pending clear
//! timer. Timers are tokio tasks; outside a runtime a message stays until
//! it is replaced or cleared.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::BannerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerMessage {
    pub kind: BannerKind,
    pub lines: Vec<String>,
}

type Slot = Arc<Mutex<Option<(u64, BannerMessage)>>>;

pub struct StatusBanner {
    config: BannerConfig,
    current: Slot,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl StatusBanner {
    pub fn new(config: BannerConfig) -> Self {
        Self {
            config,
            current: Arc::new(Mutex::new(None)),
            generation: 0,
            timer: None,
        }
    }

    pub fn show_success(&mut self, message: impl Into<String>) {
        let duration = Duration::from_millis(self.config.success_ms);
        self.show(
            BannerMessage {
                kind: BannerKind::Success,
                lines: vec![message.into()],
            },
            duration,
        );
    }

    /// A single error stays for the error duration, several for longer.
    /// An empty list is ignored.
    pub fn show_errors(&mut self, errors: Vec<String>) {
        let ms = match errors.len() {
            0 => return,
            1 => self.config.error_ms,
            _ => self.config.multi_error_ms,
        };
        self.show(
            BannerMessage {
                kind: BannerKind::Error,
                lines: errors,
            },
            Duration::from_millis(ms),
        );
    }

    pub fn current(&self) -> Option<BannerMessage> {
        self.current
            .lock()
            .ok()
            .and_then(|slot| slot.as_ref().map(|(_, message)| message.clone()))
    }

    pub fn clear(&mut self) {
        self.abort_timer();
        if let Ok(mut slot) = self.current.lock() {
            *slot = None;
        }
    }

    fn show(&mut self, message: BannerMessage, duration: Duration) {
        self.abort_timer();
        self.generation += 1;
        let generation = self.generation;

        debug!("Banner {:?} for {:?}: {:?}", message.kind, duration, message.lines);
        if let Ok(mut slot) = self.current.lock() {
            *slot = Some((generation, message));
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No runtime, banner will not auto-clear");
            return;
        };
        let current = self.current.clone();
        self.timer = Some(runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            if let Ok(mut slot) = current.lock() {
                // A newer message may have landed after this timer fired
                if matches!(slot.as_ref(), Some((g, _)) if *g == generation) {
                    *slot = None;
                }
            }
        }));
    }

    fn abort_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for StatusBanner {
    fn drop(&mut self) {
        self.abort_timer();
    }
}
