//! Image intake: turning a user-selected photo into an embedded payload.
//!
//! An [`UploadedImage`] holds the base64 text of the photo plus the media type declared for it.
//! Images can be built from raw bytes, from a `data:` URI, or read from disk with
//! [`load_image`]. The only filtering performed is the one a file picker would do: the file
//! extension must name an image type. The bytes themselves are not inspected.
//!
//! ```rust,no_run
//! use styleswap::intake::load_image;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let image = load_image("photo.jpg").await?;
//! assert_eq!(image.media_type, "image/jpeg");
//! # Ok(())
//! # }
//! ```

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::error::Error;
use std::fmt;
use std::path::Path;

/// Errors raised while reading a source photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeError {
    /// The file could not be read.
    Io(String),
    /// The file (or decoded payload) contained no bytes.
    EmptyFile,
    /// The extension does not name an image type the picker would offer.
    UnsupportedMediaType(String),
    /// A `data:` URI was missing its media type or base64 marker.
    MalformedDataUri,
}

impl fmt::Display for IntakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntakeError::Io(msg) => write!(f, "Could not read the selected photo: {}", msg),
            IntakeError::EmptyFile => write!(f, "The selected photo is empty."),
            IntakeError::UnsupportedMediaType(ext) => {
                write!(f, "Unsupported image type: {}", ext)
            }
            IntakeError::MalformedDataUri => write!(f, "Malformed image data URI."),
        }
    }
}

impl Error for IntakeError {}

/// A source photo encoded for inline transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// Base64 payload without any `data:` prefix.
    pub data: String,
    /// Declared media type, e.g. `image/jpeg`.
    pub media_type: String,
}

impl UploadedImage {
    /// Encode raw bytes.
    pub fn from_bytes(bytes: &[u8], media_type: impl Into<String>) -> Result<Self, IntakeError> {
        if bytes.is_empty() {
            return Err(IntakeError::EmptyFile);
        }
        Ok(Self {
            data: BASE64.encode(bytes),
            media_type: media_type.into(),
        })
    }

    /// Parse a `data:<media type>;base64,<payload>` URI, keeping only the payload.
    pub fn from_data_uri(uri: &str) -> Result<Self, IntakeError> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or(IntakeError::MalformedDataUri)?;
        let (header, payload) = rest.split_once(',').ok_or(IntakeError::MalformedDataUri)?;
        let media_type = header
            .strip_suffix(";base64")
            .filter(|mt| !mt.is_empty())
            .ok_or(IntakeError::MalformedDataUri)?;
        if payload.is_empty() {
            return Err(IntakeError::EmptyFile);
        }
        Ok(Self {
            data: payload.to_string(),
            media_type: media_type.to_string(),
        })
    }

    /// Render as a `data:` URI.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// Map a file extension to the image media type a picker filtered to `image/*` would report.
pub fn media_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// Read a photo from disk into an [`UploadedImage`].
pub async fn load_image(path: impl AsRef<Path>) -> Result<UploadedImage, IntakeError> {
    let path = path.as_ref();
    let media_type = media_type_for_path(path).ok_or_else(|| {
        IntakeError::UnsupportedMediaType(
            path.extension()
                .and_then(|e| e.to_str())
                .unwrap_or("<none>")
                .to_string(),
        )
    })?;

    let bytes = tokio::fs::read(path).await.map_err(|e| {
        log::error!("styleswap::intake::load_image({}): {}", path.display(), e);
        IntakeError::Io(e.to_string())
    })?;

    let image = UploadedImage::from_bytes(&bytes, media_type)?;
    log::debug!(
        "Loaded {} ({} bytes, {})",
        path.display(),
        bytes.len(),
        image.media_type
    );
    Ok(image)
}
