//! # StyleSwap
//!
//! StyleSwap re-backgrounds product photos with a hosted multimodal image model. A user picks
//! a photo, chooses a style preset or types a description of the setting they want, and gets
//! back the same product placed in a new lifestyle scene, ready to download.
//!
//! The crate is layered as follows:
//!
//! * **Presets**: [`presets`] holds the fixed catalog of named backdrop styles.
//! * **Intake**: [`intake`] reads a photo into an inline base64 payload with its media type.
//! * **Transport**: [`image_generation::ImageGenerationClient`] is the provider seam, with a
//!   Gemini implementation in [`clients::gemini`].
//! * **Adapter**: [`BackdropGenerator`] builds the instruction, calls the provider once and
//!   classifies the outcome into [`backdrop::BackdropError`] variants.
//! * **Session**: [`StyleSwapController`] drives the `Idle → Generating → Success/Error`
//!   state machine, guards against overlapping and stale generations, and saves results.
//! * **Presentation**: [`view`] derives a view model from the session state.
//!
//! ## Getting Started
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use styleswap::clients::gemini::GeminiClient;
//! use styleswap::controller::GenerateOutcome;
//! use styleswap::credentials::EnvCredentialSelector;
//! use styleswap::{BackdropGenerator, StyleSwapConfig, StyleSwapController};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     styleswap::init_logger();
//!
//!     let config = StyleSwapConfig::from_env();
//!     let credentials = Arc::new(EnvCredentialSelector::new());
//!     let client = Arc::new(GeminiClient::from_config(&config, credentials.clone()));
//!     let controller = StyleSwapController::with_config(
//!         BackdropGenerator::from_config(client, &config),
//!         credentials,
//!         &config,
//!     );
//!
//!     controller.initialize().await;
//!     controller.load_image("photo.jpg").await?;
//!     controller.set_custom_prompt("a marble countertop in bright daylight").await;
//!
//!     match controller.generate().await {
//!         GenerateOutcome::Completed(_) => {
//!             println!("Saved to {}", controller.download().await?.display());
//!         }
//!         other => println!("No image: {:?}", other),
//!     }
//!     Ok(())
//! }
//! ```

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialise the global [`env_logger`] subscriber exactly once.
///
/// Applications embedding StyleSwap can opt in to `RUST_LOG` driven diagnostics without
/// choosing a logging backend upfront.
///
/// ```rust
/// styleswap::init_logger();
/// log::info!("Logger is ready");
/// ```
pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        let _ = env_logger::try_init();
    });
}

// Import the top-level `styleswap` module.
pub mod styleswap;

// Re-exporting key items for easier external access.
pub use styleswap::backdrop;
pub use styleswap::backdrop::{BackdropError, BackdropGenerator, GenerationResult};
pub use styleswap::clients;
pub use styleswap::config;
pub use styleswap::config::StyleSwapConfig;
pub use styleswap::controller;
pub use styleswap::controller::{AppStatus, ApplicationState, StyleSwapController};
pub use styleswap::credentials;
pub use styleswap::download;
pub use styleswap::event;
pub use styleswap::event::{EventHandler, SessionEvent};
pub use styleswap::http_client_pool;
pub use styleswap::image_generation;
pub use styleswap::intake;
pub use styleswap::intake::UploadedImage;
pub use styleswap::presets;
pub use styleswap::presets::StylePreset;
pub use styleswap::view;
