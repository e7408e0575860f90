//! Live validation: a debounced `/validate` call driving the input hint.

use crate::error::Result;
use crate::models::{ValidateRequest, ValidateResult};
use crate::ui::{InputHint, UiSurface};
use std::pin::Pin;
use std::time::Duration;
use tokio::time::{Instant, Sleep, sleep_until};
use tracing::{debug, trace, warn};

/// Quiet period after the last keystroke before validating
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Shortest trimmed input worth validating
pub const DEFAULT_MIN_LENGTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidateSettings {
    pub debounce: Duration,
    pub min_length: usize,
}

impl Default for ValidateSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            min_length: DEFAULT_MIN_LENGTH,
        }
    }
}

/// The single pending check: the value to send and its timer
struct PendingCheck {
    value: String,
    sleep: Pin<Box<Sleep>>,
}

/// Sole writer of the input hint.
///
/// Holds at most one pending check. Each keystroke replaces the value and
/// pushes the deadline back, so a burst of keystrokes ends in one call
/// carrying the last value.
pub struct ValidateFlow {
    settings: ValidateSettings,
    pending: Option<PendingCheck>,
    issued: u64,
    applied: u64,
}

impl ValidateFlow {
    pub fn new(settings: ValidateSettings) -> Self {
        Self {
            settings,
            pending: None,
            issued: 0,
            applied: 0,
        }
    }

    pub fn settings(&self) -> &ValidateSettings {
        &self.settings
    }

    /// Whether a check is waiting for its quiet period to end
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Deadline of the pending check
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.sleep.deadline())
    }

    /// Register an input change.
    ///
    /// Returns the deadline of the (re)scheduled check, or `None` when the
    /// trimmed value is below the length threshold, in which case any
    /// pending check is dropped.
    pub fn on_input(&mut self, raw: &str, now: Instant) -> Option<Instant> {
        let value = raw.trim();
        if value.encode_utf16().count() < self.settings.min_length {
            if self.pending.take().is_some() {
                trace!("Pending validation cancelled, input too short");
            }
            return None;
        }

        let deadline = now + self.settings.debounce;
        match self.pending.as_mut() {
            Some(pending) => {
                pending.value = value.to_string();
                pending.sleep.as_mut().reset(deadline);
            }
            None => {
                self.pending = Some(PendingCheck {
                    value: value.to_string(),
                    sleep: Box::pin(sleep_until(deadline)),
                });
            }
        }
        Some(deadline)
    }

    /// Wait for the pending check's quiet period to end.
    ///
    /// Never completes while nothing is pending.
    pub async fn due(&mut self) {
        match self.pending.as_mut() {
            Some(pending) => pending.sleep.as_mut().await,
            None => std::future::pending().await,
        }
    }

    /// Take the pending check, tagging it with a new generation
    pub fn fire(&mut self) -> Option<(u64, ValidateRequest)> {
        let pending = self.pending.take()?;
        self.issued += 1;
        debug!(generation = self.issued, phone_number = %pending.value, "Validating input");
        Some((self.issued, ValidateRequest::new(&pending.value)))
    }

    /// Apply the outcome of the `/validate` call tagged `generation`.
    ///
    /// Only a response newer than every response applied so far changes the
    /// hint. Failures are logged and leave the hint alone. Returns whether
    /// the hint was updated.
    pub fn resolve(
        &mut self,
        generation: u64,
        outcome: Result<ValidateResult>,
        ui: &mut UiSurface,
    ) -> bool {
        if generation <= self.applied {
            debug!(
                generation,
                applied = self.applied,
                "Dropping out-of-order validate response"
            );
            return false;
        }

        match outcome {
            Ok(result) => {
                self.applied = generation;
                debug!(
                    generation,
                    valid = result.valid,
                    message = result.message.as_deref().unwrap_or(""),
                    "Validation result"
                );
                ui.set_hint(InputHint::from_valid(result.valid));
                true
            }
            Err(err) => {
                warn!(generation, "Validation error: {}", err);
                false
            }
        }
    }
}
