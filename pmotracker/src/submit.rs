//! Submission flow: one `/track` lookup per form submission.

use crate::error::{FlowError, Result};
use crate::models::{TrackInfo, TrackRequest, TrackResult};
use crate::ui::{UiEvent, UiSurface};
use tracing::{debug, info, warn};

/// Shown when the form is submitted blank
pub const EMPTY_INPUT_MESSAGE: &str = "Please enter a phone number";

/// Shown when the backend refuses the number without a reason
pub const TRACK_FAILED_MESSAGE: &str = "Failed to track phone number";

/// Shown for any transport or decoding failure
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";

/// What a submission turned into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStep {
    /// Blank input, error already on screen, nothing to send
    Rejected,
    /// Loading is on screen; `request` must be sent and its outcome fed
    /// back through [`SubmitFlow::resolve`] with the same generation.
    Started { generation: u64, request: TrackRequest },
}

/// Sole writer of the primary UI state.
///
/// Every submission gets a new generation; only the outcome of the most
/// recent one is allowed to reach the screen.
#[derive(Debug, Default)]
pub struct SubmitFlow {
    generation: u64,
    in_flight: bool,
}

impl SubmitFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation of the most recent submission
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the latest submission is still waiting for its answer
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Handle a submission of the raw input value
    pub fn begin(&mut self, raw: &str, ui: &mut UiSurface) -> SubmitStep {
        // A blank submission still supersedes whatever is in flight
        self.generation += 1;

        match TrackRequest::new(raw) {
            Err(err) => {
                self.in_flight = false;
                let flow_err = FlowError::from(&err);
                debug!(generation = self.generation, "Submission rejected: {}", flow_err);
                ui.dispatch(UiEvent::Error(EMPTY_INPUT_MESSAGE.to_string()));
                SubmitStep::Rejected
            }
            Ok(request) => {
                self.in_flight = true;
                ui.dispatch(UiEvent::Reset);
                ui.dispatch(UiEvent::Loading);
                info!(
                    generation = self.generation,
                    phone_number = %request.phone_number,
                    "Tracking phone number"
                );
                SubmitStep::Started {
                    generation: self.generation,
                    request,
                }
            }
        }
    }

    /// Apply the outcome of the `/track` call tagged `generation`.
    ///
    /// Returns false when the outcome belongs to a superseded submission and
    /// was dropped.
    pub fn resolve(
        &mut self,
        generation: u64,
        outcome: Result<TrackResult>,
        ui: &mut UiSurface,
    ) -> bool {
        if generation != self.generation {
            debug!(
                generation,
                latest = self.generation,
                "Dropping stale track response"
            );
            return false;
        }
        self.in_flight = false;

        // Loading is replaced in the same transition, never shown alongside
        match classify(outcome) {
            Ok(info) => {
                info!(generation, country = %info.country, "Track succeeded");
                ui.dispatch(UiEvent::Results(info));
            }
            Err(FlowError::Transport(detail)) => {
                warn!(generation, "Track request failed: {}", detail);
                ui.dispatch(UiEvent::Error(NETWORK_ERROR_MESSAGE.to_string()));
            }
            Err(FlowError::Application(message)) | Err(FlowError::UserInput(message)) => {
                info!(generation, "Track refused: {}", message);
                ui.dispatch(UiEvent::Error(message));
            }
        }
        true
    }
}

fn classify(outcome: Result<TrackResult>) -> std::result::Result<TrackInfo, FlowError> {
    match outcome {
        Ok(TrackResult::Success(info)) => Ok(info),
        Ok(TrackResult::Failure { error }) => Err(FlowError::Application(
            error
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| TRACK_FAILED_MESSAGE.to_string()),
        )),
        Err(err) => Err(FlowError::Transport(err.to_string())),
    }
}
