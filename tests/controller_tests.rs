use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use styleswap::controller::{GenerateOutcome, TriggerRejection};
use styleswap::credentials::{CredentialError, CredentialSelector};
use styleswap::event::{EventHandler, SessionEvent};
use styleswap::image_generation::{
    ContentPart, ImageGenerationClient, ImageGenerationOptions, ImageGenerationResponse,
    TransportError,
};
use styleswap::intake::UploadedImage;
use styleswap::presets::find_preset;
use styleswap::{AppStatus, BackdropError, BackdropGenerator, StyleSwapConfig, StyleSwapController};
use tokio::sync::Notify;

const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

/// Replies with a fixed result and records the instructions it received.
struct MockClient {
    reply: Result<ImageGenerationResponse, TransportError>,
    prompts: Mutex<Vec<String>>,
}

impl MockClient {
    fn image() -> Arc<Self> {
        Self::with_reply(Ok(ImageGenerationResponse {
            parts: vec![ContentPart::image("image/png", PNG_B64)],
        }))
    }

    fn with_reply(reply: Result<ImageGenerationResponse, TransportError>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ImageGenerationClient for MockClient {
    async fn generate_image(
        &self,
        prompt: &str,
        _reference: Option<&UploadedImage>,
        _options: ImageGenerationOptions,
    ) -> Result<ImageGenerationResponse, TransportError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone()
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

/// Blocks every call until `release` is notified, then answers with `reply`.
struct GatedClient {
    started: Arc<Notify>,
    release: Arc<Notify>,
    reply: Result<ImageGenerationResponse, TransportError>,
}

impl GatedClient {
    fn image(started: Arc<Notify>, release: Arc<Notify>) -> Arc<Self> {
        Self::with_reply(
            started,
            release,
            Ok(ImageGenerationResponse {
                parts: vec![ContentPart::image("image/png", PNG_B64)],
            }),
        )
    }

    fn with_reply(
        started: Arc<Notify>,
        release: Arc<Notify>,
        reply: Result<ImageGenerationResponse, TransportError>,
    ) -> Arc<Self> {
        Arc::new(Self {
            started,
            release,
            reply,
        })
    }
}

#[async_trait]
impl ImageGenerationClient for GatedClient {
    async fn generate_image(
        &self,
        _prompt: &str,
        _reference: Option<&UploadedImage>,
        _options: ImageGenerationOptions,
    ) -> Result<ImageGenerationResponse, TransportError> {
        self.started.notify_one();
        self.release.notified().await;
        self.reply.clone()
    }

    fn model_name(&self) -> &str {
        "gated"
    }
}

struct MockCredentials {
    selected: AtomicBool,
    prompts: Mutex<u32>,
}

impl MockCredentials {
    fn new(selected: bool) -> Arc<Self> {
        Arc::new(Self {
            selected: AtomicBool::new(selected),
            prompts: Mutex::new(0),
        })
    }
}

#[async_trait]
impl CredentialSelector for MockCredentials {
    async fn has_selected_credential(&self) -> bool {
        self.selected.load(Ordering::SeqCst)
    }

    async fn prompt_selection(&self) -> Result<(), CredentialError> {
        *self.prompts.lock().unwrap() += 1;
        self.selected.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn api_key(&self) -> Option<String> {
        Some("test-key".to_string())
    }
}

#[derive(Default)]
struct RecordingHandler {
    events: Mutex<Vec<SessionEvent>>,
}

#[async_trait]
impl EventHandler for RecordingHandler {
    async fn on_session_event(&self, event: &SessionEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

fn controller_with(client: Arc<dyn ImageGenerationClient>) -> StyleSwapController {
    StyleSwapController::new(BackdropGenerator::new(client), MockCredentials::new(true))
}

fn photo(tag: &str) -> UploadedImage {
    UploadedImage::from_bytes(tag.as_bytes(), "image/jpeg").unwrap()
}

#[tokio::test]
async fn test_rustic_kitchen_success_and_download() {
    let dir = tempfile::tempdir().unwrap();
    let dir_path = dir.path().join("renders");
    std::fs::create_dir_all(&dir_path).unwrap();
    let photo_path = dir.path().join("photo.jpg");
    std::fs::write(&photo_path, b"\xff\xd8\xff\xe0 fake jpeg").unwrap();

    let client = MockClient::image();
    let config = StyleSwapConfig::default().with_download_dir(dir_path.clone());
    let controller = StyleSwapController::with_config(
        BackdropGenerator::from_config(client.clone(), &config),
        MockCredentials::new(true),
        &config,
    );

    assert!(controller.select_preset("rustic_kitchen").await);
    controller.load_image(&photo_path).await.unwrap();

    let outcome = controller.generate().await;
    let result = match outcome {
        GenerateOutcome::Completed(result) => result,
        other => panic!("unexpected outcome {:?}", other),
    };
    assert_eq!(result.image_data, format!("data:image/png;base64,{}", PNG_B64));
    assert!(client
        .last_prompt()
        .contains(find_preset("rustic_kitchen").unwrap().description));

    let state = controller.snapshot().await;
    assert_eq!(state.status, AppStatus::Success);
    assert_eq!(state.current_result(), Some(&result));
    assert!(state.error.is_none());

    let saved = controller.download().await.unwrap();
    assert_eq!(saved.parent().unwrap(), dir_path.as_path());
    let name = saved.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("styleswap-"));
    assert!(name.ends_with(".png"));
    let stamp = name.trim_start_matches("styleswap-").trim_end_matches(".png");
    assert!(stamp.parse::<i64>().is_ok());
    assert_eq!(&std::fs::read(&saved).unwrap()[1..4], b"PNG");
}

#[tokio::test]
async fn test_generate_without_image_is_noop() {
    let client = MockClient::image();
    let controller = controller_with(client.clone());
    let before = controller.snapshot().await;

    assert_eq!(
        controller.generate().await,
        GenerateOutcome::Rejected(TriggerRejection::NoImage)
    );
    assert_eq!(controller.snapshot().await, before);
    assert!(client.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_entity_error_requires_credentials() {
    let client = MockClient::with_reply(Err(TransportError::Api {
        status: 404,
        message: "Requested entity was not found.".to_string(),
    }));
    let credentials = MockCredentials::new(true);
    let handler = Arc::new(RecordingHandler::default());
    let controller =
        StyleSwapController::new(BackdropGenerator::new(client), credentials.clone())
            .with_event_handler(handler.clone());

    controller.set_image(photo("mug")).await;
    let outcome = controller.generate().await;
    assert_eq!(
        outcome,
        GenerateOutcome::Failed(BackdropError::CredentialConfiguration)
    );

    let state = controller.snapshot().await;
    assert_eq!(state.status, AppStatus::Error);
    assert_eq!(
        state.error.as_deref(),
        Some("API Key configuration issue. Please re-select your Gemini API key.")
    );
    assert!(state.needs_credential);
    assert!(state.current_result().is_none());
    assert!(handler
        .events
        .lock()
        .unwrap()
        .contains(&SessionEvent::CredentialPromptRequired));

    // Blocked until a key is re-selected
    assert_eq!(
        controller.generate().await,
        GenerateOutcome::Rejected(TriggerRejection::CredentialRequired)
    );
    controller.select_credential().await.unwrap();
    assert_eq!(*credentials.prompts.lock().unwrap(), 1);
    assert!(!controller.snapshot().await.needs_credential);
}

#[tokio::test]
async fn test_custom_text_overrides_selected_preset() {
    let client = MockClient::image();
    let controller = controller_with(client.clone());

    controller.select_preset("botanical_studio").await;
    controller
        .set_custom_prompt("a marble countertop in bright daylight")
        .await;
    controller.set_image(photo("vase")).await;

    assert!(matches!(controller.generate().await, GenerateOutcome::Completed(_)));
    let prompt = client.last_prompt();
    assert!(prompt.contains("Style: a marble countertop in bright daylight."));
    assert!(!prompt.contains(find_preset("botanical_studio").unwrap().description));
}

#[tokio::test]
async fn test_selecting_preset_clears_custom_text() {
    let controller = controller_with(MockClient::image());
    controller.set_custom_prompt("on a beach").await;
    assert!(controller.select_preset("scandi_minimalist").await);

    let state = controller.snapshot().await;
    assert!(state.custom_prompt.is_empty());
    assert_eq!(state.style_text(), find_preset("scandi_minimalist").unwrap().description);
    assert!(!controller.select_preset("no_such_preset").await);
}

#[tokio::test]
async fn test_new_image_clears_result_and_error() {
    let controller = controller_with(MockClient::image());
    controller.set_image(photo("first")).await;
    controller.generate().await;
    assert_eq!(controller.snapshot().await.status, AppStatus::Success);

    controller.set_image(photo("second")).await;
    let state = controller.snapshot().await;
    assert_eq!(state.status, AppStatus::Idle);
    assert!(state.result.is_none());
    assert!(state.error.is_none());
    assert_eq!(state.image, Some(photo("second")));

    let failing = controller_with(MockClient::with_reply(Ok(ImageGenerationResponse {
        parts: vec![ContentPart::text("text only")],
    })));
    failing.set_image(photo("a")).await;
    assert_eq!(
        failing.generate().await,
        GenerateOutcome::Failed(BackdropError::NoImageProduced)
    );
    failing.set_image(photo("b")).await;
    let state = failing.snapshot().await;
    assert_eq!(state.status, AppStatus::Idle);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_reset_clears_session() {
    let controller = controller_with(MockClient::image());
    controller.set_image(photo("x")).await;
    controller.set_custom_prompt("on a beach").await;
    controller.generate().await;

    controller.reset().await;
    let state = controller.snapshot().await;
    assert_eq!(state.status, AppStatus::Idle);
    assert!(state.image.is_none());
    assert!(state.result.is_none());
    assert!(state.error.is_none());
    assert!(state.custom_prompt.is_empty());
    assert!(controller.download().await.is_err());
}

#[tokio::test]
async fn test_second_trigger_rejected_and_stale_result_discarded() {
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let handler = Arc::new(RecordingHandler::default());
    let controller = StyleSwapController::new(
        BackdropGenerator::new(GatedClient::image(started.clone(), release.clone())),
        MockCredentials::new(true),
    )
    .with_event_handler(handler.clone());

    controller.set_image(photo("old")).await;
    let in_flight = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.generate().await })
    };
    started.notified().await;

    let state = controller.snapshot().await;
    assert_eq!(state.status, AppStatus::Generating);
    assert!(state.current_result().is_none());
    assert_eq!(
        controller.generate().await,
        GenerateOutcome::Rejected(TriggerRejection::AlreadyGenerating)
    );

    controller.set_image(photo("new")).await;
    release.notify_one();

    assert_eq!(in_flight.await.unwrap(), GenerateOutcome::Superseded);
    let state = controller.snapshot().await;
    assert_eq!(state.status, AppStatus::Idle);
    assert!(state.result.is_none());
    assert_eq!(state.image, Some(photo("new")));
    assert!(handler
        .events
        .lock()
        .unwrap()
        .iter()
        .any(|e| matches!(e, SessionEvent::StaleResultDiscarded { .. })));
}

#[tokio::test]
async fn test_reset_mid_flight_discards_result() {
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let controller =
        controller_with(GatedClient::image(started.clone(), release.clone()));

    controller.set_image(photo("x")).await;
    let in_flight = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.generate().await })
    };
    started.notified().await;

    controller.reset().await;
    release.notify_one();

    assert_eq!(in_flight.await.unwrap(), GenerateOutcome::Superseded);
    let state = controller.snapshot().await;
    assert_eq!(state.status, AppStatus::Idle);
    assert!(state.result.is_none());
    assert!(state.image.is_none());
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_superseded_credential_failure_still_requires_reselection() {
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let handler = Arc::new(RecordingHandler::default());
    let controller = controller_with(GatedClient::with_reply(
        started.clone(),
        release.clone(),
        Err(TransportError::Api {
            status: 404,
            message: "Requested entity was not found.".to_string(),
        }),
    ))
    .with_event_handler(handler.clone());

    controller.set_image(photo("old")).await;
    let in_flight = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.generate().await })
    };
    started.notified().await;

    controller.set_image(photo("new")).await;
    release.notify_one();

    assert_eq!(in_flight.await.unwrap(), GenerateOutcome::Superseded);
    let state = controller.snapshot().await;
    assert!(state.needs_credential);
    assert_eq!(state.status, AppStatus::Idle);
    assert!(state.error.is_none());
    assert_eq!(state.image, Some(photo("new")));
    assert!(handler
        .events
        .lock()
        .unwrap()
        .iter()
        .any(|e| matches!(e, SessionEvent::CredentialPromptRequired)));
    assert_eq!(
        controller.generate().await,
        GenerateOutcome::Rejected(TriggerRejection::CredentialRequired)
    );
}

#[tokio::test]
async fn test_dropped_generation_returns_to_idle() {
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let controller =
        controller_with(GatedClient::image(started.clone(), release.clone()));
    controller.set_image(photo("x")).await;

    let timed_out =
        tokio::time::timeout(Duration::from_millis(50), controller.generate()).await;
    assert!(timed_out.is_err());
    let state = controller.snapshot().await;
    assert_eq!(state.status, AppStatus::Idle);
    assert!(state.result.is_none());

    release.notify_one();
    assert!(matches!(
        controller.generate().await,
        GenerateOutcome::Completed(_)
    ));
    assert_eq!(controller.snapshot().await.status, AppStatus::Success);
}

#[tokio::test]
async fn test_initialize_flags_missing_credentials() {
    let controller = StyleSwapController::new(
        BackdropGenerator::new(MockClient::image()),
        MockCredentials::new(false),
    );
    controller.initialize().await;
    controller.set_image(photo("x")).await;
    assert!(controller.snapshot().await.needs_credential);
    assert_eq!(
        controller.generate().await,
        GenerateOutcome::Rejected(TriggerRejection::CredentialRequired)
    );

    controller.select_credential().await.unwrap();
    assert!(matches!(controller.generate().await, GenerateOutcome::Completed(_)));
}

#[tokio::test]
async fn test_unreadable_file_leaves_state_untouched() {
    let controller = controller_with(MockClient::image());
    controller.set_image(photo("keep")).await;
    let before = controller.snapshot().await;

    let err = controller
        .load_image("/definitely/not/here/photo.png")
        .await
        .unwrap_err();
    assert!(matches!(err, styleswap::intake::IntakeError::Io(_)));
    assert_eq!(controller.snapshot().await, before);
}
