//! # pmotracker - Phone number lookup form
//!
//! `pmotracker` drives a phone lookup form against a backend exposing
//! `POST /track` and `POST /validate`. It coordinates the asynchronous calls
//! with what the form displays: a loading, results or error region, plus a
//! validity hint on the input field.
//!
//! ## Features
//!
//! - **Typed backend model**: `TrackResult` is either a success carrying the
//!   number's metadata or a failure carrying the server's reason
//! - **Submission flow**: blank input never reaches the network; transport
//!   failures are replaced by a fixed message
//! - **Debounced validation**: a burst of keystrokes yields a single
//!   `/validate` call with the last value
//! - **Ordered effects**: responses of superseded calls never reach the screen
//! - **Event loop**: one tokio task owns the state, frames are published on a
//!   watch channel
//!
//! ## Quick Start
//!
//! ```no_run
//! use pmotracker::{FormController, LookupClient, ValidateSettings, render_frame};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = LookupClient::builder()
//!         .api_base("http://localhost:5000")
//!         .build()?;
//!
//!     let form = FormController::spawn(Arc::new(client), ValidateSettings::default());
//!     let mut frames = form.frames();
//!
//!     form.input("+14155552671").await?;
//!     form.submit().await?;
//!
//!     while frames.changed().await.is_ok() {
//!         let frame = frames.borrow_and_update().clone();
//!         print!("{}", render_frame(&frame));
//!         if !frame.surface.state().is_loading() {
//!             break;
//!         }
//!     }
//!
//!     form.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`client`]: HTTP client and the [`LookupService`] trait
//! - [`models`]: request and response types
//! - [`ui`]: displayed state and its transitions
//! - [`submit`]: submission flow
//! - [`validate`]: debounced validation flow
//! - [`controller`]: event loop tying the flows to the backend
//! - [`render`]: text projection of a frame
//! - [`config_ext`]: `pmoconfig` integration
//! - [`error`]: error types and result aliases

pub mod client;
pub mod config_ext;
pub mod controller;
pub mod error;
pub mod models;
pub mod render;
pub mod submit;
pub mod ui;
pub mod validate;

pub use client::{ClientBuilder, LookupClient, LookupService};
pub use config_ext::{TrackerConfigExt, TrackerSettings};
pub use controller::{FormCommand, FormController, FormHandle, Frame};
pub use error::{Error, FlowError, Result};
pub use models::{
    HealthStatus, Location, TrackInfo, TrackRequest, TrackResult, ValidateRequest, ValidateResult,
};
pub use render::render_frame;
pub use submit::{
    EMPTY_INPUT_MESSAGE, NETWORK_ERROR_MESSAGE, SubmitFlow, SubmitStep, TRACK_FAILED_MESSAGE,
};
pub use ui::{InputHint, Region, UiEvent, UiState, UiSurface, Visibility};
pub use validate::{ValidateFlow, ValidateSettings};
