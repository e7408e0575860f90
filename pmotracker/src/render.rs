//! Plain-text projection of a [`Frame`].

use crate::controller::Frame;
use crate::models::TrackInfo;
use crate::ui::{InputHint, UiState};
use std::fmt::Write;

pub const LOADING_TEXT: &str = "Tracking phone number...";

/// Render the visible parts of a frame, one line per field
pub fn render_frame(frame: &Frame) -> String {
    let mut out = String::new();
    let marker = match frame.surface.hint() {
        InputHint::Neutral => "",
        InputHint::Valid => " [valid]",
        InputHint::Invalid => " [invalid]",
    };
    let _ = writeln!(out, "Phone: {}{}", frame.input, marker);

    match frame.surface.state() {
        UiState::Idle => {}
        UiState::Loading => {
            let _ = writeln!(out, "{}", LOADING_TEXT);
        }
        UiState::Results(info) => {
            render_results(&mut out, info);
            if let Some(src) = frame.surface.viewer_src() {
                let _ = writeln!(out, "  Map:          {}", src);
            }
        }
        UiState::ErrorShown(message) => {
            let _ = writeln!(out, "Error: {}", message);
        }
    }
    out
}

fn render_results(out: &mut String, info: &TrackInfo) {
    let _ = writeln!(out, "Results");
    let _ = writeln!(out, "  Phone Number: {}", info.number);
    let _ = writeln!(out, "  Country:      {}", info.country);
    let _ = writeln!(out, "  Carrier:      {}", info.carrier);
    let _ = writeln!(out, "  Timezone:     {}", info.timezone_label());
    let _ = writeln!(out, "  Country Code: {}", info.country_code);
    if let Some(location) = &info.location {
        let _ = writeln!(
            out,
            "  Location:     {:.4}, {:.4}{}",
            location.latitude,
            location.longitude,
            location
                .formatted
                .as_deref()
                .map(|f| format!(" ({})", f))
                .unwrap_or_default()
        );
    }
}
