//! Backdrop generation adapter.
//!
//! [`BackdropGenerator`] turns a source photo and a style text into a single call against an
//! [`ImageGenerationClient`]:
//!
//! 1. [`build_instruction`] wraps the style text with fixed product-photography constraints
//!    and the [`STYLE_GUIDELINES`] block.
//! 2. The photo, the instruction and the configured output options are sent in one request.
//!    There is no retry and no caching; identical inputs are always resent.
//! 3. [`extract_first_image`] returns the first image-bearing part of the reply as a PNG data
//!    URI, ignoring text commentary.
//! 4. Transport failures go through [`classify_transport_error`], the only place that inspects
//!    upstream error text.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use styleswap::backdrop::BackdropGenerator;
//! use styleswap::clients::gemini::{GeminiClient, Model};
//! use styleswap::intake::load_image;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let key = std::env::var("GEMINI_API_KEY")?;
//!     let client = Arc::new(GeminiClient::new_with_model_enum(&key, Model::Gemini3ProImagePreview));
//!     let generator = BackdropGenerator::new(client);
//!
//!     let photo = load_image("candle.jpg").await?;
//!     let result = generator
//!         .generate_backdrop(&photo, "a marble countertop in bright daylight")
//!         .await?;
//!     println!("{} bytes of data URI", result.image_data.len());
//!     Ok(())
//! }
//! ```

use crate::config::StyleSwapConfig;
use crate::image_generation::{
    get_image_extension_from_base64, ImageGenerationClient, ImageGenerationOptions,
    ImageGenerationResponse, TransportError,
};
use crate::intake::UploadedImage;
use crate::presets::StylePreset;
use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Upstream text that signals the selected project or key reference does not exist.
pub const CREDENTIAL_ERROR_MARKER: &str = "Requested entity was not found";

/// Media type used for every result data URI.
pub const RESULT_MIME_TYPE: &str = "image/png";

/// Fixed art direction appended to every instruction.
pub const STYLE_GUIDELINES: &str = "\
You are a commercial photographer producing listing photos for independent artisan shops.
Turn a plain product photo into a polished, lifestyle-style product shot.

Guidelines:
1. Tone: professional product photography with warm, organic textures (linen, wood, stone, ceramic).
2. Lighting: soft natural window light or golden-hour warmth. No harsh artificial shadows.
3. Composition: shallow depth of field so the product stands out while the setting stays recognizable.
4. Product integrity: never alter the product. Size, shape, color and labels stay identical.
5. Integration: seat the product realistically on its surface with contact shadows and reflections where appropriate.";

/// Classified failures of a backdrop generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackdropError {
    /// The provider could not find the project/credential reference. The user must re-select
    /// a key before generating again.
    CredentialConfiguration,
    /// The reply carried no content parts.
    NoResponse,
    /// The reply carried only text.
    NoImageProduced,
    /// Any other failure, with the upstream message (possibly empty).
    GenerationFailed(String),
}

impl BackdropError {
    pub fn is_credential_error(&self) -> bool {
        matches!(self, BackdropError::CredentialConfiguration)
    }
}

impl fmt::Display for BackdropError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackdropError::CredentialConfiguration => write!(
                f,
                "API Key configuration issue. Please re-select your Gemini API key."
            ),
            BackdropError::NoResponse => write!(f, "No response from the image model."),
            BackdropError::NoImageProduced => write!(
                f,
                "No image was generated. Please try a more descriptive prompt."
            ),
            BackdropError::GenerationFailed(msg) if msg.trim().is_empty() => {
                write!(f, "Failed to connect to the Gemini API.")
            }
            BackdropError::GenerationFailed(msg) => write!(f, "{}", msg),
        }
    }
}

impl Error for BackdropError {}

/// A re-backgrounded image held for the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    /// `data:image/png;base64,...` URI.
    pub image_data: String,
    pub timestamp: DateTime<Utc>,
}

impl GenerationResult {
    pub fn new(image_data: String) -> Self {
        Self {
            image_data,
            timestamp: Utc::now(),
        }
    }

    /// The base64 payload without its data URI prefix.
    pub fn payload(&self) -> &str {
        self.image_data
            .split_once(',')
            .map(|(_, payload)| payload)
            .unwrap_or(self.image_data.as_str())
    }

    /// File format sniffed from the payload's magic bytes ("png", "jpg", "webp" or "bin").
    pub fn detected_format(&self) -> &str {
        get_image_extension_from_base64(self.payload())
    }
}

/// Inputs of one generation, captured at trigger time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub image: UploadedImage,
    pub style_text: String,
}

impl GenerationRequest {
    pub fn new(image: UploadedImage, custom_text: &str, preset: &StylePreset) -> Self {
        Self {
            image,
            style_text: resolve_style_text(custom_text, preset),
        }
    }
}

/// Free text wins over the preset unless it is blank.
///
/// Blank is judged after trimming, so whitespace-only text falls back to the preset.
pub fn resolve_style_text(custom_text: &str, preset: &StylePreset) -> String {
    if custom_text.trim().is_empty() {
        preset.description.to_string()
    } else {
        custom_text.to_string()
    }
}

/// Build the instruction sent alongside the photo.
pub fn build_instruction(style_text: &str) -> String {
    format!(
        "Replace the background of this product photo with a high-end lifestyle setting.\n\
         Style: {}.\n\n\
         Preserve the product exactly: keep its identity, shape, color and labels unchanged. \
         Match the lighting and shadows to the new setting. Use a shallow depth of field.\n\n\
         Context:\n{}",
        style_text,
        STYLE_GUIDELINES
    )
}

/// Return the first inline image of a reply as a PNG data URI.
pub fn extract_first_image(response: &ImageGenerationResponse) -> Result<String, BackdropError> {
    if response.parts.is_empty() {
        return Err(BackdropError::NoResponse);
    }
    response
        .parts
        .iter()
        .find_map(|part| part.as_image())
        .map(|image| {
            log::debug!(
                "Using inline image part ({} reported, {} base64 chars)",
                if image.mime_type.is_empty() { "no type" } else { image.mime_type.as_str() },
                image.data.len()
            );
            format!("data:{};base64,{}", RESULT_MIME_TYPE, image.data)
        })
        .ok_or(BackdropError::NoImageProduced)
}

/// Map a transport failure to a [`BackdropError`].
pub fn classify_transport_error(err: &TransportError) -> BackdropError {
    if matches!(err, TransportError::MissingCredential)
        || err.message().contains(CREDENTIAL_ERROR_MARKER)
    {
        BackdropError::CredentialConfiguration
    } else {
        BackdropError::GenerationFailed(err.message().to_string())
    }
}

/// Sends photo + style text to an image model and extracts the re-backgrounded result.
pub struct BackdropGenerator {
    client: Arc<dyn ImageGenerationClient>,
    options: ImageGenerationOptions,
}

impl BackdropGenerator {
    /// Uses the default options: one 1:1 image at the 1K tier.
    pub fn new(client: Arc<dyn ImageGenerationClient>) -> Self {
        Self::from_config(client, &StyleSwapConfig::default())
    }

    pub fn from_config(client: Arc<dyn ImageGenerationClient>, config: &StyleSwapConfig) -> Self {
        Self {
            client,
            options: config.generation_options(),
        }
    }

    pub fn with_options(mut self, options: ImageGenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ImageGenerationOptions {
        &self.options
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, BackdropError> {
        self.generate_backdrop(&request.image, &request.style_text).await
    }

    pub async fn generate_backdrop(
        &self,
        image: &UploadedImage,
        style_text: &str,
    ) -> Result<GenerationResult, BackdropError> {
        let instruction = build_instruction(style_text);
        log::info!(
            "Requesting backdrop from {} ({} chars of instruction)",
            self.client.model_name(),
            instruction.len()
        );

        let response = self
            .client
            .generate_image(&instruction, Some(image), self.options.clone())
            .await
            .map_err(|err| {
                log::error!("Backdrop generation error: {}", err);
                classify_transport_error(&err)
            })?;

        let image_data = extract_first_image(&response)?;
        Ok(GenerationResult::new(image_data))
    }
}
