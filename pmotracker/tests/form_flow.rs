//! Timing and ordering behaviour of the form controller, against an
//! in-memory backend and tokio's paused clock.

use async_trait::async_trait;
use pmotracker::{
    EMPTY_INPUT_MESSAGE, Error, FormController, FormHandle, Frame, InputHint, LookupService,
    NETWORK_ERROR_MESSAGE, Result, TRACK_FAILED_MESSAGE, TrackInfo, TrackRequest, TrackResult,
    UiState, ValidateRequest, ValidateResult, ValidateSettings,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

type TrackScript = Box<dyn Fn(&str) -> (Duration, Result<TrackResult>) + Send + Sync>;
type ValidateScript = Box<dyn Fn(&str) -> (Duration, Result<ValidateResult>) + Send + Sync>;

/// Backend double answering from scripts and recording every call
struct FakeLookup {
    track_calls: Mutex<Vec<String>>,
    validate_calls: Mutex<Vec<String>>,
    track: TrackScript,
    validate: ValidateScript,
}

impl FakeLookup {
    fn new(track: TrackScript, validate: ValidateScript) -> Arc<Self> {
        Arc::new(Self {
            track_calls: Mutex::new(Vec::new()),
            validate_calls: Mutex::new(Vec::new()),
            track,
            validate,
        })
    }

    fn with_track(track: TrackScript) -> Arc<Self> {
        Self::new(
            track,
            Box::new(|_: &str| {
                (
                    Duration::from_millis(10),
                    Ok(ValidateResult {
                        valid: true,
                        message: None,
                    }),
                )
            }),
        )
    }

    fn track_calls(&self) -> Vec<String> {
        self.track_calls.lock().unwrap().clone()
    }

    fn validate_calls(&self) -> Vec<String> {
        self.validate_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LookupService for FakeLookup {
    async fn track(&self, request: &TrackRequest) -> Result<TrackResult> {
        self.track_calls
            .lock()
            .unwrap()
            .push(request.phone_number.clone());
        let (delay, outcome) = (self.track)(&request.phone_number);
        sleep(delay).await;
        outcome
    }

    async fn validate(&self, request: &ValidateRequest) -> Result<ValidateResult> {
        self.validate_calls
            .lock()
            .unwrap()
            .push(request.phone_number.clone());
        let (delay, outcome) = (self.validate)(&request.phone_number);
        sleep(delay).await;
        outcome
    }
}

fn us_info() -> TrackInfo {
    TrackInfo {
        number: "+14155552671".into(),
        country: "United States".into(),
        carrier: "Verizon".into(),
        country_code: "US".into(),
        timezones: vec!["America/New_York".into()],
        map_file: Some("abc.html".into()),
        national_number: None,
        location: None,
        timestamp: None,
    }
}

fn spawn(service: Arc<FakeLookup>) -> FormHandle {
    FormController::spawn(service, ValidateSettings::default())
}

async fn wait_for_state(form: &FormHandle, pred: impl FnMut(&Frame) -> bool) -> Frame {
    let mut frames = form.frames();
    let frame = tokio::time::timeout(Duration::from_secs(30), frames.wait_for(pred))
        .await
        .expect("frame never reached")
        .unwrap()
        .clone();
    frame
}

/// Records every published frame until the form is shut down
fn record_frames(form: &FormHandle) -> tokio::task::JoinHandle<Vec<Frame>> {
    let mut frames = form.frames();
    tokio::spawn(async move {
        let mut seen = vec![frames.borrow_and_update().clone()];
        while frames.changed().await.is_ok() {
            seen.push(frames.borrow_and_update().clone());
        }
        seen
    })
}

#[tokio::test(start_paused = true)]
async fn test_submit_success_renders_results() {
    let service = FakeLookup::with_track(Box::new(|_: &str| {
        (Duration::from_millis(300), Ok(TrackResult::Success(us_info())))
    }));
    let form = spawn(service.clone());

    form.input("+14155552671").await.unwrap();
    form.submit().await.unwrap();

    let loading = wait_for_state(&form, |f| f.surface.state().is_loading()).await;
    assert_eq!(loading.surface.visibility().visible_count(), 1);

    let frame = wait_for_state(&form, |f| matches!(f.surface.state(), UiState::Results(_))).await;
    let UiState::Results(info) = frame.surface.state() else {
        unreachable!()
    };
    assert_eq!(info.number, "+14155552671");
    assert_eq!(info.country, "United States");
    assert_eq!(info.carrier, "Verizon");
    assert_eq!(info.timezone_label(), "America/New_York");
    assert_eq!(info.country_code, "US");
    assert_eq!(frame.surface.viewer_src(), Some("/map/abc.html"));
    assert_eq!(service.track_calls(), vec!["+14155552671".to_string()]);

    form.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_blank_submission_never_calls_backend() {
    for raw in ["", "   "] {
        let service = FakeLookup::with_track(Box::new(|_: &str| {
            (Duration::ZERO, Ok(TrackResult::Success(us_info())))
        }));
        let form = spawn(service.clone());

        form.input(raw).await.unwrap();
        form.submit().await.unwrap();

        let frame = wait_for_state(&form, |f| {
            matches!(f.surface.state(), UiState::ErrorShown(_))
        })
        .await;
        assert_eq!(
            frame.surface.state(),
            &UiState::ErrorShown(EMPTY_INPUT_MESSAGE.to_string())
        );

        sleep(Duration::from_secs(2)).await;
        assert!(service.track_calls().is_empty());
        assert!(service.validate_calls().is_empty());
        form.shutdown().await.unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn test_failure_without_reason_uses_fallback() {
    let service = FakeLookup::with_track(Box::new(|_: &str| {
        (Duration::from_millis(50), Ok(TrackResult::Failure { error: None }))
    }));
    let form = spawn(service);

    form.input("+10000000000").await.unwrap();
    form.submit().await.unwrap();

    let frame = wait_for_state(&form, |f| {
        matches!(f.surface.state(), UiState::ErrorShown(_))
    })
    .await;
    assert_eq!(
        frame.surface.state(),
        &UiState::ErrorShown(TRACK_FAILED_MESSAGE.to_string())
    );
    form.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_transport_failure_shows_generic_message() {
    let service = FakeLookup::with_track(Box::new(|_: &str| {
        let parse_err = serde_json::from_str::<TrackResult>("<html>").unwrap_err();
        (Duration::from_millis(50), Err(Error::Json(parse_err)))
    }));
    let form = spawn(service);

    form.input("+14155552671").await.unwrap();
    form.submit().await.unwrap();

    let frame = wait_for_state(&form, |f| {
        matches!(f.surface.state(), UiState::ErrorShown(_))
    })
    .await;
    let UiState::ErrorShown(message) = frame.surface.state() else {
        unreachable!()
    };
    assert_eq!(message, NETWORK_ERROR_MESSAGE);
    assert!(!message.contains("JSON"));

    // The form stays usable after the failure
    form.submit().await.unwrap();
    wait_for_state(&form, |f| f.surface.state().is_loading()).await;
    form.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_regions_stay_exclusive() {
    let service = FakeLookup::with_track(Box::new(|number: &str| {
        if number.starts_with("+1") {
            (Duration::from_millis(200), Ok(TrackResult::Success(us_info())))
        } else {
            (
                Duration::from_millis(100),
                Ok(TrackResult::Failure {
                    error: Some("Invalid phone number".into()),
                }),
            )
        }
    }));
    let form = spawn(service);
    let recorder = record_frames(&form);

    for number in ["+14155552671", "999", "", "+14155552671"] {
        form.input(number).await.unwrap();
        form.submit().await.unwrap();
        sleep(Duration::from_millis(150)).await;
    }
    sleep(Duration::from_secs(1)).await;
    form.shutdown().await.unwrap();

    let frames = recorder.await.unwrap();
    assert!(frames.len() > 1);
    for frame in &frames {
        assert!(frame.surface.visibility().visible_count() <= 1);
    }
    assert!(matches!(
        frames.last().unwrap().surface.state(),
        UiState::Results(_)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_stale_track_response_is_ignored() {
    let service = FakeLookup::with_track(Box::new(|number: &str| {
        if number == "+14155552671" {
            (Duration::from_secs(2), Ok(TrackResult::Success(us_info())))
        } else {
            (
                Duration::from_millis(100),
                Ok(TrackResult::Failure {
                    error: Some("Invalid phone number".into()),
                }),
            )
        }
    }));
    let form = spawn(service.clone());

    form.input("+14155552671").await.unwrap();
    form.submit().await.unwrap();
    sleep(Duration::from_millis(50)).await;
    form.input("12").await.unwrap();
    form.submit().await.unwrap();

    sleep(Duration::from_secs(3)).await;
    assert_eq!(service.track_calls().len(), 2);
    assert_eq!(
        form.current().surface.state(),
        &UiState::ErrorShown("Invalid phone number".into())
    );
    form.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_keystroke_burst_yields_one_validation() {
    let service = FakeLookup::with_track(Box::new(|_: &str| {
        (Duration::ZERO, Ok(TrackResult::Failure { error: None }))
    }));
    let form = spawn(service.clone());

    let mut value = String::new();
    for digit in "+14155552671".chars() {
        value.push(digit);
        form.input(value.clone()).await.unwrap();
        sleep(Duration::from_millis(450)).await;
    }
    assert!(service.validate_calls().is_empty());

    sleep(Duration::from_millis(600)).await;
    assert_eq!(service.validate_calls(), vec!["+14155552671".to_string()]);

    let frame = wait_for_state(&form, |f| f.surface.hint() == InputHint::Valid).await;
    assert_eq!(frame.surface.visibility().visible_count(), 0);
    form.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_quick_retype_validates_latest_value() {
    let service = FakeLookup::with_track(Box::new(|_: &str| {
        (Duration::ZERO, Ok(TrackResult::Failure { error: None }))
    }));
    let form = spawn(service.clone());

    form.input("12345").await.unwrap();
    sleep(Duration::from_millis(200)).await;
    form.input("123456").await.unwrap();
    sleep(Duration::from_secs(2)).await;

    assert_eq!(service.validate_calls(), vec!["123456".to_string()]);
    form.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_short_input_never_validates() {
    let service = FakeLookup::with_track(Box::new(|_: &str| {
        (Duration::ZERO, Ok(TrackResult::Failure { error: None }))
    }));
    let form = spawn(service.clone());

    for value in ["1", "12", "1234", "  1234  ", "12345", "1234"] {
        form.input(value).await.unwrap();
        sleep(Duration::from_millis(100)).await;
    }
    sleep(Duration::from_secs(5)).await;

    assert!(service.validate_calls().is_empty());
    assert_eq!(form.current().surface.hint(), InputHint::Neutral);
    form.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_slow_validation_does_not_overwrite_newer_hint() {
    let service = FakeLookup::new(
        Box::new(|_: &str| (Duration::ZERO, Ok(TrackResult::Failure { error: None }))),
        Box::new(|number: &str| {
            if number == "12345" {
                (
                    Duration::from_secs(3),
                    Ok(ValidateResult {
                        valid: false,
                        message: None,
                    }),
                )
            } else {
                (
                    Duration::from_millis(10),
                    Ok(ValidateResult {
                        valid: true,
                        message: None,
                    }),
                )
            }
        }),
    );
    let form = spawn(service.clone());

    form.input("12345").await.unwrap();
    sleep(Duration::from_millis(600)).await;
    form.input("+14155552671").await.unwrap();
    sleep(Duration::from_secs(5)).await;

    assert_eq!(service.validate_calls().len(), 2);
    assert_eq!(form.current().surface.hint(), InputHint::Valid);
    form.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_validation_failure_is_silent() {
    let service = FakeLookup::new(
        Box::new(|_: &str| (Duration::ZERO, Ok(TrackResult::Failure { error: None }))),
        Box::new(|_: &str| (Duration::from_millis(10), Err(Error::other("connection reset")))),
    );
    let form = spawn(service.clone());

    form.input("+14155552671").await.unwrap();
    sleep(Duration::from_secs(2)).await;

    assert_eq!(service.validate_calls().len(), 1);
    let frame = form.current();
    assert_eq!(frame.surface.hint(), InputHint::Neutral);
    assert_eq!(frame.surface.state(), &UiState::Idle);
    form.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_input_is_processed_while_track_in_flight() {
    let service = FakeLookup::with_track(Box::new(|_: &str| {
        (Duration::from_secs(60), Ok(TrackResult::Success(us_info())))
    }));
    let form = spawn(service.clone());

    form.input("+14155552671").await.unwrap();
    form.submit().await.unwrap();
    form.input("+442071234567").await.unwrap();

    let frame = wait_for_state(&form, |f| f.input == "+442071234567").await;
    assert!(frame.surface.state().is_loading());

    sleep(Duration::from_secs(1)).await;
    assert_eq!(service.validate_calls(), vec!["+442071234567".to_string()]);
    form.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_wait_returns_once_calls_have_settled() {
    let service = FakeLookup::with_track(Box::new(|_: &str| {
        (Duration::from_secs(1), Ok(TrackResult::Success(us_info())))
    }));
    let form = spawn(service.clone());
    let recorder = record_frames(&form);

    form.input("+14155552671").await.unwrap();
    form.submit().await.unwrap();
    wait_for_state(&form, |f| f.surface.state().is_loading()).await;

    form.wait().await.unwrap();

    let frames = recorder.await.unwrap();
    assert!(matches!(
        frames.last().unwrap().surface.state(),
        UiState::Results(_)
    ));
    assert_eq!(service.track_calls().len(), 1);
}

#[tokio::test]
async fn test_handle_after_shutdown() {
    let service = FakeLookup::with_track(Box::new(|_: &str| {
        (Duration::ZERO, Ok(TrackResult::Failure { error: None }))
    }));
    let form = spawn(service);
    let frames = form.frames();
    form.shutdown().await.unwrap();

    assert!(frames.has_changed().is_err());
}
