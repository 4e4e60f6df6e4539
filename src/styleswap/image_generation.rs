//! Image generation contract shared by StyleSwap providers.
//!
//! This module defines the [`ImageGenerationClient`] trait used by the
//! [`BackdropGenerator`](crate::backdrop::BackdropGenerator) to talk to a hosted multimodal
//! model. A client receives a text instruction, an optional reference photo and a set of
//! [`ImageGenerationOptions`], and returns the model's reply as an ordered list of
//! [`ContentPart`]s. Interpreting those parts is left to the caller.
//!
//! # Overview
//!
//! - **Request**: one instruction, zero or one inline reference image, output options
//!   (aspect ratio, resolution tier, image count, grounding tool).
//! - **Response**: heterogeneous parts, any mix of text commentary and inline image payloads.
//! - **Errors**: [`TransportError`], which always exposes the upstream message through
//!   [`TransportError::message`] so callers can classify it.
//!
//! # Example
//!
//! ```rust,no_run
//! use styleswap::image_generation::{ContentPart, ImageGenerationClient, ImageGenerationOptions};
//! use styleswap::intake::UploadedImage;
//! use std::sync::Arc;
//!
//! # async fn run(client: Arc<dyn ImageGenerationClient>) -> Result<(), Box<dyn std::error::Error>> {
//! let photo = UploadedImage::from_bytes(&std::fs::read("mug.png")?, "image/png")?;
//! let options = ImageGenerationOptions {
//!     aspect_ratio: Some("1:1".to_string()),
//!     image_size: Some("1K".to_string()),
//!     num_images: Some(1),
//!     google_search: false,
//! };
//!
//! let response = client
//!     .generate_image("Place the mug on a marble counter", Some(&photo), options)
//!     .await?;
//!
//! for part in &response.parts {
//!     match part {
//!         ContentPart::Text(text) => println!("Model says: {}", text),
//!         ContentPart::InlineImage(image) => println!("Got {} image", image.mime_type),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use crate::intake::UploadedImage;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::error::Error;
use std::fmt;

/// Configuration options for image generation.
///
/// `None` fields fall back to the provider's defaults.
///
/// ```
/// use styleswap::image_generation::ImageGenerationOptions;
///
/// let options = ImageGenerationOptions {
///     aspect_ratio: Some("1:1".to_string()),
///     image_size: Some("1K".to_string()),
///     num_images: Some(1),
///     google_search: true,
/// };
/// assert_eq!(options.num_images, Some(1));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImageGenerationOptions {
    /// Aspect ratio of the output, e.g. "1:1" or "16:9".
    pub aspect_ratio: Option<String>,

    /// Resolution tier: "1K", "2K" or "4K".
    pub image_size: Option<String>,

    /// Number of candidates to request.
    pub num_images: Option<u32>,

    /// Let the model consult Google Search for visual context.
    pub google_search: bool,
}

/// An image payload returned inline in a model reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineImage {
    /// Media type reported by the provider (may be empty).
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

/// One element of a model reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    InlineImage(InlineImage),
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text(text.into())
    }

    pub fn image(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        ContentPart::InlineImage(InlineImage {
            mime_type: mime_type.into(),
            data: data.into(),
        })
    }

    /// The inline image carried by this part, if any.
    pub fn as_image(&self) -> Option<&InlineImage> {
        match self {
            ContentPart::InlineImage(image) if !image.data.is_empty() => Some(image),
            _ => None,
        }
    }
}

/// A model reply, flattened to the content parts of its first candidate.
///
/// ```
/// use styleswap::image_generation::{ContentPart, ImageGenerationResponse};
///
/// let response = ImageGenerationResponse {
///     parts: vec![
///         ContentPart::text("Here is your product in a cozy kitchen."),
///         ContentPart::image("image/png", "iVBORw0KGgo="),
///     ],
/// };
/// assert_eq!(response.parts.len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageGenerationResponse {
    pub parts: Vec<ContentPart>,
}

/// Failures raised by a transport before any reply content is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request never produced an HTTP response.
    Http(String),
    /// The provider answered with a non-success status.
    Api { status: u16, message: String },
    /// The reply body could not be decoded.
    Decode(String),
    /// No API key was available when the request was built.
    MissingCredential,
}

impl TransportError {
    /// The upstream message, possibly empty.
    pub fn message(&self) -> &str {
        match self {
            TransportError::Http(msg) | TransportError::Decode(msg) => msg,
            TransportError::Api { message, .. } => message,
            TransportError::MissingCredential => "",
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Http(msg) => write!(f, "HTTP error: {}", msg),
            TransportError::Api { status, message } => {
                write!(f, "API error ({}): {}", status, message)
            }
            TransportError::Decode(msg) => write!(f, "Decode error: {}", msg),
            TransportError::MissingCredential => write!(f, "No API key selected"),
        }
    }
}

impl Error for TransportError {}

/// Determine an image file extension from base64 data by inspecting the magic bytes.
///
/// ```
/// use styleswap::image_generation::get_image_extension_from_base64;
///
/// let b64_png = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";
/// assert_eq!(get_image_extension_from_base64(b64_png), "png");
/// assert_eq!(get_image_extension_from_base64("/9j/4AAQSkZJRgABAQEAYABgAAD/2wBDA=="), "jpg");
/// assert_eq!(get_image_extension_from_base64("aW52YWxpZCBpbWFnZSBkYXRh"), "bin");
/// ```
pub fn get_image_extension_from_base64(b64_data: &str) -> &str {
    if b64_data.starts_with("iVBORw0KG") {
        "png"
    } else if b64_data.starts_with("/9j/") {
        "jpg"
    } else if b64_data.starts_with("UklGRi") {
        "webp"
    } else {
        "bin" // fallback for unknown format
    }
}

/// Decode a base64 string to bytes.
///
/// ```
/// use styleswap::image_generation::decode_base64;
///
/// let decoded = decode_base64("SGVsbG8gV29ybGQ=").expect("Failed to decode");
/// assert_eq!(decoded, b"Hello World");
/// ```
pub fn decode_base64(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    BASE64.decode(input.trim())
}

/// Trait for providers that can restyle a reference photo from a text instruction.
///
/// Implementors handle endpoints, authentication and wire formats. Errors surface as
/// [`TransportError`]; an empty or text-only reply is *not* an error at this layer.
#[async_trait]
pub trait ImageGenerationClient: Send + Sync {
    /// Send one instruction and optional reference image, returning the reply parts.
    async fn generate_image(
        &self,
        prompt: &str,
        reference: Option<&UploadedImage>,
        options: ImageGenerationOptions,
    ) -> Result<ImageGenerationResponse, TransportError>;

    /// Identifier of the model behind this client (e.g. "gemini-3-pro-image-preview").
    fn model_name(&self) -> &str;
}
