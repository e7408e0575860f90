//! Event loop of the lookup form.
//!
//! One task owns the displayed surface and both flows. Keystrokes and
//! submissions come in on a command channel; backend calls run as separate
//! tasks and post their outcome back on the same channel, so input keeps
//! being processed while a call is in flight. Each change of the surface is
//! published as a [`Frame`].

use crate::client::LookupService;
use crate::error::{Error, Result};
use crate::models::{TrackRequest, TrackResult, ValidateRequest, ValidateResult};
use crate::submit::{SubmitFlow, SubmitStep};
use crate::ui::UiSurface;
use crate::validate::{ValidateFlow, ValidateSettings};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// Snapshot of what the form shows
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    /// Current raw value of the input field
    pub input: String,
    pub surface: UiSurface,
}

/// Commands accepted by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormCommand {
    /// The input field now holds this value
    Input(String),
    /// The form was submitted
    Submit,
    Shutdown,
}

#[derive(Debug)]
enum ControllerMessage {
    Command(FormCommand),
    TrackResolved {
        generation: u64,
        outcome: Result<TrackResult>,
    },
    ValidateResolved {
        generation: u64,
        outcome: Result<ValidateResult>,
    },
}

/// Spawns the form's event loop
pub struct FormController;

impl FormController {
    /// Start the controller on the current tokio runtime
    pub fn spawn(service: Arc<dyn LookupService>, settings: ValidateSettings) -> FormHandle {
        let (tx, mut rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (frames_tx, frames_rx) = watch::channel(Frame::default());
        let loop_tx = tx.downgrade();

        let join_handle = tokio::spawn(async move {
            info!(
                debounce_ms = settings.debounce.as_millis() as u64,
                min_length = settings.min_length,
                "Starting form controller"
            );

            let mut state = ControllerState {
                service,
                tx: loop_tx,
                frames: frames_tx,
                input: String::new(),
                surface: UiSurface::new(),
                submit: SubmitFlow::new(),
                validate: ValidateFlow::new(settings),
            };

            loop {
                let mut pending_message: Option<Option<ControllerMessage>> = None;
                let mut validation_due = false;

                tokio::select! {
                    msg = rx.recv() => {
                        pending_message = Some(msg);
                    }
                    _ = state.validate.due() => {
                        validation_due = true;
                    }
                }

                if validation_due {
                    state.fire_validation();
                }

                match pending_message {
                    Some(Some(msg)) => {
                        if !state.handle_message(msg) {
                            break;
                        }
                    }
                    // Every handle is gone and no call is in flight
                    Some(None) => break,
                    None => {}
                }

                state.publish();
            }

            info!("Form controller stopped");
        });

        FormHandle {
            tx,
            frames: frames_rx,
            join_handle,
        }
    }
}

struct ControllerState {
    service: Arc<dyn LookupService>,
    tx: mpsc::WeakSender<ControllerMessage>,
    frames: watch::Sender<Frame>,
    input: String,
    surface: UiSurface,
    submit: SubmitFlow,
    validate: ValidateFlow,
}

impl ControllerState {
    /// Returns false once the loop must stop
    fn handle_message(&mut self, msg: ControllerMessage) -> bool {
        match msg {
            ControllerMessage::Command(FormCommand::Input(value)) => {
                self.validate.on_input(&value, Instant::now());
                self.input = value;
            }
            ControllerMessage::Command(FormCommand::Submit) => {
                let input = self.input.clone();
                if let SubmitStep::Started {
                    generation,
                    request,
                } = self.submit.begin(&input, &mut self.surface)
                {
                    self.spawn_track(generation, request);
                }
            }
            ControllerMessage::Command(FormCommand::Shutdown) => {
                debug!("Shutdown requested");
                return false;
            }
            ControllerMessage::TrackResolved {
                generation,
                outcome,
            } => {
                self.submit.resolve(generation, outcome, &mut self.surface);
            }
            ControllerMessage::ValidateResolved {
                generation,
                outcome,
            } => {
                self.validate
                    .resolve(generation, outcome, &mut self.surface);
            }
        }
        true
    }

    fn fire_validation(&mut self) {
        if let Some((generation, request)) = self.validate.fire() {
            self.spawn_validate(generation, request);
        }
    }

    fn spawn_track(&self, generation: u64, request: TrackRequest) {
        let Some(tx) = self.tx.upgrade() else {
            return;
        };
        let service = Arc::clone(&self.service);
        tokio::spawn(async move {
            let outcome = service.track(&request).await;
            if tx
                .send(ControllerMessage::TrackResolved {
                    generation,
                    outcome,
                })
                .await
                .is_err()
            {
                debug!(generation, "Controller gone, track response discarded");
            }
        });
    }

    fn spawn_validate(&self, generation: u64, request: ValidateRequest) {
        let Some(tx) = self.tx.upgrade() else {
            return;
        };
        let service = Arc::clone(&self.service);
        tokio::spawn(async move {
            let outcome = service.validate(&request).await;
            if tx
                .send(ControllerMessage::ValidateResolved {
                    generation,
                    outcome,
                })
                .await
                .is_err()
            {
                debug!(generation, "Controller gone, validate response discarded");
            }
        });
    }

    fn publish(&self) {
        let input = &self.input;
        let surface = &self.surface;
        self.frames.send_if_modified(|frame| {
            if frame.input == *input && frame.surface == *surface {
                return false;
            }
            frame.input.clone_from(input);
            frame.surface = surface.clone();
            true
        });
    }
}

/// Handle to a running form controller
pub struct FormHandle {
    tx: mpsc::Sender<ControllerMessage>,
    frames: watch::Receiver<Frame>,
    join_handle: JoinHandle<()>,
}

impl FormHandle {
    /// Replace the input field's value (one input event)
    pub async fn input(&self, value: impl Into<String>) -> Result<()> {
        self.send(FormCommand::Input(value.into())).await
    }

    /// Submit the form with the current input value
    pub async fn submit(&self) -> Result<()> {
        self.send(FormCommand::Submit).await
    }

    pub async fn send(&self, command: FormCommand) -> Result<()> {
        self.tx
            .send(ControllerMessage::Command(command))
            .await
            .map_err(|_| Error::ControllerClosed)
    }

    /// Receiver notified on every new frame
    pub fn frames(&self) -> watch::Receiver<Frame> {
        self.frames.clone()
    }

    /// Latest published frame
    pub fn current(&self) -> Frame {
        self.frames.borrow().clone()
    }

    /// Stop the loop and wait for it to finish
    pub async fn shutdown(self) -> Result<()> {
        if self.send(FormCommand::Shutdown).await.is_err() {
            warn!("Form controller already stopped");
        }
        self.join_handle
            .await
            .map_err(|e| Error::other(format!("Form controller join error: {}", e)))
    }

    /// Release this handle and wait for the loop to end on its own.
    ///
    /// The loop stops once the calls still in flight have reported back.
    pub async fn wait(self) -> Result<()> {
        let FormHandle { tx, join_handle, .. } = self;
        drop(tx);
        if let Err(err) = join_handle.await {
            if err.is_cancelled() {
                warn!("Form controller task cancelled: {err}");
                return Ok(());
            }
            return Err(Error::other(format!("Form controller join error: {}", err)));
        }
        Ok(())
    }
}
