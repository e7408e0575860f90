//! Displayed state of the lookup form.
//!
//! The form has three exclusive regions (loading, results, error) plus a
//! colour hint on the input field. [`UiSurface`] holds all of it; views are
//! projections of a surface and never mutate it.

use crate::models::TrackInfo;

/// Border colour shown for a number the backend accepted
pub const VALID_HINT_COLOR: &str = "#27ae60";

/// Border colour shown for a number the backend rejected
pub const INVALID_HINT_COLOR: &str = "#e74c3c";

/// Primary state: which region, if any, is on screen
#[derive(Debug, Clone, PartialEq, Default)]
pub enum UiState {
    #[default]
    Idle,
    Loading,
    Results(TrackInfo),
    ErrorShown(String),
}

impl UiState {
    pub fn visibility(&self) -> Visibility {
        Visibility {
            loading: matches!(self, UiState::Loading),
            results: matches!(self, UiState::Results(_)),
            error: matches!(self, UiState::ErrorShown(_)),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, UiState::Loading)
    }
}

/// Visibility flags of the three regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Visibility {
    pub loading: bool,
    pub results: bool,
    pub error: bool,
}

impl Visibility {
    pub fn visible_count(&self) -> usize {
        [self.loading, self.results, self.error]
            .iter()
            .filter(|v| **v)
            .count()
    }
}

/// Visual hint on the input field, owned by validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputHint {
    #[default]
    Neutral,
    Valid,
    Invalid,
}

impl InputHint {
    pub fn from_valid(valid: bool) -> Self {
        if valid {
            InputHint::Valid
        } else {
            InputHint::Invalid
        }
    }

    /// Border colour, `None` for the stylesheet default
    pub fn border_color(&self) -> Option<&'static str> {
        match self {
            InputHint::Neutral => None,
            InputHint::Valid => Some(VALID_HINT_COLOR),
            InputHint::Invalid => Some(INVALID_HINT_COLOR),
        }
    }
}

/// Region brought into view by the last terminal transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Results,
    Error,
}

/// Transitions of the primary state
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Reset,
    Loading,
    Results(TrackInfo),
    Error(String),
}

/// Everything the form displays
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UiSurface {
    state: UiState,
    hint: InputHint,
    viewer_src: Option<String>,
    scrolled_to: Option<Region>,
}

impl UiSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn hint(&self) -> InputHint {
        self.hint
    }

    /// Source of the embedded map viewer
    ///
    /// Survives later transitions until another result with a map replaces it.
    pub fn viewer_src(&self) -> Option<&str> {
        self.viewer_src.as_deref()
    }

    pub fn scrolled_to(&self) -> Option<Region> {
        self.scrolled_to
    }

    pub fn visibility(&self) -> Visibility {
        self.state.visibility()
    }

    /// Apply one primary-state transition
    pub fn dispatch(&mut self, event: UiEvent) -> &UiState {
        match event {
            UiEvent::Reset => self.hide_all(),
            UiEvent::Loading => self.show_loading_only(),
            UiEvent::Results(info) => self.show_results_only(info),
            UiEvent::Error(message) => self.show_error_only(message),
        }
        &self.state
    }

    pub fn hide_all(&mut self) {
        self.state = UiState::Idle;
    }

    pub fn show_loading_only(&mut self) {
        self.state = UiState::Loading;
    }

    /// Reveal the results region, pointing the viewer at the map if the
    /// payload names one.
    pub fn show_results_only(&mut self, info: TrackInfo) {
        if let Some(path) = info.map_path() {
            self.viewer_src = Some(path);
        }
        self.state = UiState::Results(info);
        self.scrolled_to = Some(Region::Results);
    }

    pub fn show_error_only(&mut self, message: impl Into<String>) {
        self.state = UiState::ErrorShown(message.into());
        self.scrolled_to = Some(Region::Error);
    }

    pub fn set_hint(&mut self, hint: InputHint) {
        self.hint = hint;
    }
}
