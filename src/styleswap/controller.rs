//! Session controller.
//!
//! [`StyleSwapController`] owns the single [`ApplicationState`] of a session and is the only
//! thing that mutates it. It wires user actions (pick a preset, type a custom style, load a
//! photo, generate, start over, download) to the intake, adapter and download modules.
//!
//! # State machine
//!
//! ```text
//!            generate()                 adapter Ok
//!   Idle ───────────────▶ Generating ─────────────▶ Success
//!    ▲  ▲                     │
//!    │  │                     │ adapter Err
//!    │  │                     ▼
//!    │  └────────────────── Error   (retry is manual: generate() again)
//!    │
//!    └── reset() / set_image() from any state
//! ```
//!
//! Guards:
//!
//! - `generate()` is a no-op without an image, rejected while a generation is in flight, and
//!   rejected while credentials must be re-selected.
//! - Every image replacement and reset bumps the session epoch. A generation that resolves
//!   under an older epoch is discarded; only a credential failure still raises the
//!   re-selection requirement.
//! - Dropping a `generate()` future mid-flight returns the session from `Generating` to
//!   `Idle`, so the next trigger is accepted.
//!
//! The controller is a cheap-to-clone handle; clones share the same session. The state lock is
//! never held while the adapter call is outstanding, so other actions proceed during
//! `Generating`.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use styleswap::backdrop::BackdropGenerator;
//! use styleswap::clients::gemini::GeminiClient;
//! use styleswap::controller::{GenerateOutcome, StyleSwapController};
//! use styleswap::credentials::EnvCredentialSelector;
//! use styleswap::StyleSwapConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StyleSwapConfig::from_env();
//!     let credentials = Arc::new(EnvCredentialSelector::new());
//!     let client = Arc::new(GeminiClient::from_config(&config, credentials.clone()));
//!     let generator = BackdropGenerator::from_config(client, &config);
//!
//!     let controller = StyleSwapController::with_config(generator, credentials, &config);
//!     controller.initialize().await;
//!     controller.load_image("photo.jpg").await?;
//!     controller.select_preset("rustic_kitchen").await;
//!
//!     if let GenerateOutcome::Completed(_) = controller.generate().await {
//!         let path = controller.download().await?;
//!         println!("Saved {}", path.display());
//!     }
//!     Ok(())
//! }
//! ```

use crate::backdrop::{BackdropError, BackdropGenerator, GenerationRequest, GenerationResult};
use crate::config::StyleSwapConfig;
use crate::credentials::{CredentialError, CredentialSelector};
use crate::download::{save_result, DownloadError};
use crate::event::{EventHandler, SessionEvent};
use crate::intake::{load_image, IntakeError, UploadedImage};
use crate::presets::{default_preset, find_preset, StylePreset};
use crate::view::ViewModel;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

/// Mode of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppStatus {
    Idle,
    Generating,
    Success,
    Error,
}

/// Everything the view needs to render a session.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationState {
    pub status: AppStatus,
    pub image: Option<UploadedImage>,
    pub result: Option<GenerationResult>,
    pub error: Option<String>,
    pub selected_preset: &'static StylePreset,
    pub custom_prompt: String,
    /// Credentials must be (re)selected before generating.
    pub needs_credential: bool,
    /// Bumped whenever the source image is replaced or the session is reset.
    pub epoch: u64,
}

impl Default for ApplicationState {
    fn default() -> Self {
        Self {
            status: AppStatus::Idle,
            image: None,
            result: None,
            error: None,
            selected_preset: default_preset(),
            custom_prompt: String::new(),
            needs_credential: false,
            epoch: 0,
        }
    }
}

impl ApplicationState {
    /// The result to display, only in `Success`.
    pub fn current_result(&self) -> Option<&GenerationResult> {
        match self.status {
            AppStatus::Success => self.result.as_ref(),
            _ => None,
        }
    }

    /// Style text a generation triggered now would use.
    pub fn style_text(&self) -> String {
        crate::backdrop::resolve_style_text(&self.custom_prompt, self.selected_preset)
    }

    pub fn is_generating(&self) -> bool {
        self.status == AppStatus::Generating
    }
}

/// Why a `generate()` call did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerRejection {
    NoImage,
    AlreadyGenerating,
    CredentialRequired,
}

/// What a `generate()` call ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateOutcome {
    /// The result is now current.
    Completed(GenerationResult),
    /// The session is in `Error` with this failure.
    Failed(BackdropError),
    /// The session moved on while the call was outstanding; its outcome was dropped.
    Superseded,
    /// Nothing was sent.
    Rejected(TriggerRejection),
}

/// Returns the session to `Idle` when a `generate()` future is dropped mid-flight.
struct InFlightGuard {
    state: Arc<Mutex<ApplicationState>>,
    epoch: u64,
    armed: bool,
}

impl InFlightGuard {
    fn new(state: Arc<Mutex<ApplicationState>>, epoch: u64) -> Self {
        Self {
            state,
            epoch,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

fn abandon_generation(state: &mut ApplicationState, epoch: u64) {
    if state.epoch == epoch && state.is_generating() {
        log::warn!("Generation for epoch {} was abandoned; returning to idle", epoch);
        state.status = AppStatus::Idle;
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let epoch = self.epoch;
        if let Ok(mut state) = self.state.try_lock() {
            abandon_generation(&mut state, epoch);
            return;
        }
        let state = self.state.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    abandon_generation(&mut *state.lock().await, epoch);
                });
            }
            Err(_) => log::error!(
                "Generation for epoch {} was abandoned outside a runtime; status left as is",
                epoch
            ),
        }
    }
}

#[derive(Clone)]
pub struct StyleSwapController {
    state: Arc<Mutex<ApplicationState>>,
    generator: Arc<BackdropGenerator>,
    credentials: Arc<dyn CredentialSelector>,
    event_handler: Option<Arc<dyn EventHandler>>,
    download_dir: PathBuf,
    download_prefix: String,
}

impl StyleSwapController {
    pub fn new(generator: BackdropGenerator, credentials: Arc<dyn CredentialSelector>) -> Self {
        Self::with_config(generator, credentials, &StyleSwapConfig::default())
    }

    pub fn with_config(
        generator: BackdropGenerator,
        credentials: Arc<dyn CredentialSelector>,
        config: &StyleSwapConfig,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(ApplicationState::default())),
            generator: Arc::new(generator),
            credentials,
            event_handler: None,
            download_dir: config.download_dir.clone(),
            download_prefix: config.download_prefix.clone(),
        }
    }

    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    async fn emit(&self, event: SessionEvent) {
        if let Some(handler) = &self.event_handler {
            handler.on_session_event(&event).await;
        }
    }

    /// Query the credential selector once at startup.
    pub async fn initialize(&self) {
        let has_key = self.credentials.has_selected_credential().await;
        self.state.lock().await.needs_credential = !has_key;
        if !has_key {
            log::info!("No API credential selected; generation is blocked until one is");
            self.emit(SessionEvent::CredentialPromptRequired).await;
        }
    }

    /// Prompt for a credential. On success the requirement is cleared without re-checking.
    pub async fn select_credential(&self) -> Result<(), CredentialError> {
        self.credentials.prompt_selection().await?;
        self.state.lock().await.needs_credential = false;
        self.emit(SessionEvent::CredentialSelected).await;
        Ok(())
    }

    /// A copy of the current state.
    pub async fn snapshot(&self) -> ApplicationState {
        self.state.lock().await.clone()
    }

    pub async fn view(&self) -> ViewModel {
        ViewModel::from_state(&*self.state.lock().await)
    }

    /// Select a preset by id, clearing any custom style text. Unknown ids are ignored.
    pub async fn select_preset(&self, preset_id: &str) -> bool {
        match find_preset(preset_id) {
            Some(preset) => {
                let mut state = self.state.lock().await;
                state.selected_preset = preset;
                state.custom_prompt.clear();
                true
            }
            None => {
                log::warn!("Unknown preset id: {}", preset_id);
                false
            }
        }
    }

    pub async fn set_custom_prompt(&self, text: impl Into<String>) {
        self.state.lock().await.custom_prompt = text.into();
    }

    /// Read a photo from disk and make it the source image.
    ///
    /// A failed read leaves the session untouched and returns the error.
    pub async fn load_image(&self, path: impl AsRef<Path>) -> Result<(), IntakeError> {
        match load_image(path).await {
            Ok(image) => {
                self.set_image(image).await;
                Ok(())
            }
            Err(err) => {
                self.emit(SessionEvent::ImageRejected {
                    reason: err.to_string(),
                })
                .await;
                Err(err)
            }
        }
    }

    /// Replace the source image, clearing result and error and returning to `Idle`.
    pub async fn set_image(&self, image: UploadedImage) {
        let event = {
            let mut state = self.state.lock().await;
            state.epoch += 1;
            state.status = AppStatus::Idle;
            state.result = None;
            state.error = None;
            let event = SessionEvent::ImageLoaded {
                epoch: state.epoch,
                media_type: image.media_type.clone(),
                payload_len: image.data.len(),
            };
            state.image = Some(image);
            event
        };
        log::debug!("Source image replaced");
        self.emit(event).await;
    }

    /// Clear image, result, error and custom style text.
    pub async fn reset(&self) {
        let epoch = {
            let mut state = self.state.lock().await;
            state.epoch += 1;
            state.status = AppStatus::Idle;
            state.image = None;
            state.result = None;
            state.error = None;
            state.custom_prompt.clear();
            state.epoch
        };
        log::info!("Session reset");
        self.emit(SessionEvent::Reset { epoch }).await;
    }

    /// Run one generation with the current image and style text.
    pub async fn generate(&self) -> GenerateOutcome {
        let (request, epoch) = {
            let mut state = self.state.lock().await;
            let image = match &state.image {
                Some(image) => image.clone(),
                None => return GenerateOutcome::Rejected(TriggerRejection::NoImage),
            };
            if state.is_generating() {
                return GenerateOutcome::Rejected(TriggerRejection::AlreadyGenerating);
            }
            if state.needs_credential {
                return GenerateOutcome::Rejected(TriggerRejection::CredentialRequired);
            }
            let request = GenerationRequest::new(image, &state.custom_prompt, state.selected_preset);
            state.status = AppStatus::Generating;
            state.error = None;
            state.result = None;
            (request, state.epoch)
        };

        let mut in_flight = InFlightGuard::new(self.state.clone(), epoch);

        self.emit(SessionEvent::GenerationStarted {
            epoch,
            model: self.generator.model_name().to_string(),
            style_text: request.style_text.clone(),
        })
        .await;

        let started = Instant::now();
        let outcome = self.generator.generate(&request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let mut state = self.state.lock().await;
        in_flight.disarm();
        if state.epoch != epoch {
            let current_epoch = state.epoch;
            // Credential validity outlives the session epoch.
            let credential_failed = matches!(&outcome, Err(err) if err.is_credential_error());
            if credential_failed {
                state.needs_credential = true;
            }
            drop(state);
            log::warn!(
                "Discarding generation from epoch {} (session is at {})",
                epoch,
                current_epoch
            );
            self.emit(SessionEvent::StaleResultDiscarded {
                started_epoch: epoch,
                current_epoch,
            })
            .await;
            if credential_failed {
                self.emit(SessionEvent::CredentialPromptRequired).await;
            }
            return GenerateOutcome::Superseded;
        }

        match outcome {
            Ok(result) => {
                state.status = AppStatus::Success;
                state.result = Some(result.clone());
                drop(state);
                log::info!("Generation succeeded in {} ms", elapsed_ms);
                self.emit(SessionEvent::GenerationSucceeded { epoch, elapsed_ms })
                    .await;
                GenerateOutcome::Completed(result)
            }
            Err(err) => {
                let message = err.to_string();
                state.status = AppStatus::Error;
                state.error = Some(message.clone());
                if err.is_credential_error() {
                    state.needs_credential = true;
                }
                drop(state);
                log::info!("Generation failed: {}", message);
                self.emit(SessionEvent::GenerationFailed {
                    epoch,
                    message,
                    elapsed_ms,
                })
                .await;
                if err.is_credential_error() {
                    self.emit(SessionEvent::CredentialPromptRequired).await;
                }
                GenerateOutcome::Failed(err)
            }
        }
    }

    /// Save the current result as `<prefix>-<millis>.png` in the download directory.
    pub async fn download(&self) -> Result<PathBuf, DownloadError> {
        let result = self
            .state
            .lock()
            .await
            .current_result()
            .cloned()
            .ok_or(DownloadError::NoResult)?;
        let path = save_result(&result, &self.download_dir, &self.download_prefix).await?;
        self.emit(SessionEvent::Downloaded { path: path.clone() })
            .await;
        Ok(path)
    }
}
