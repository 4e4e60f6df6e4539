//! Configuration for StyleSwap.
//!
//! [`StyleSwapConfig`] is a plain struct: construct it by hand, start from
//! [`Default`], or layer environment overrides on top with [`StyleSwapConfig::from_env`].
//!
//! # Example
//!
//! ```rust
//! use styleswap::StyleSwapConfig;
//! use std::path::PathBuf;
//!
//! let config = StyleSwapConfig::default()
//!     .with_model("gemini-2.5-flash-image")
//!     .with_download_dir(PathBuf::from("/tmp/renders"));
//! assert_eq!(config.aspect_ratio, "1:1");
//! ```

use crate::image_generation::ImageGenerationOptions;
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "gemini-3-pro-image-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Settings for the generation adapter and the download step.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSwapConfig {
    /// Model id passed to the provider.
    pub model: String,
    /// Provider API root, without a trailing slash.
    pub base_url: String,
    /// Output aspect ratio.
    pub aspect_ratio: String,
    /// Output resolution tier.
    pub image_size: String,
    /// Number of images requested per generation. Always 1 for the adapter.
    pub num_images: u32,
    /// Enable the provider's Google Search grounding tool.
    pub google_search: bool,
    /// Prefix of downloaded file names.
    pub download_prefix: String,
    /// Directory downloads are written to.
    pub download_dir: PathBuf,
}

impl Default for StyleSwapConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            aspect_ratio: "1:1".to_string(),
            image_size: "1K".to_string(),
            num_images: 1,
            google_search: true,
            download_prefix: "styleswap".to_string(),
            download_dir: PathBuf::from("."),
        }
    }
}

impl StyleSwapConfig {
    /// Defaults overridden by `STYLESWAP_MODEL`, `STYLESWAP_BASE_URL` and
    /// `STYLESWAP_DOWNLOAD_DIR` when they are set and non-empty.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(model) = non_empty_env("STYLESWAP_MODEL") {
            config.model = model;
        }
        if let Some(base_url) = non_empty_env("STYLESWAP_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(dir) = non_empty_env("STYLESWAP_DOWNLOAD_DIR") {
            config.download_dir = PathBuf::from(dir);
        }
        config
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_google_search(mut self, enabled: bool) -> Self {
        self.google_search = enabled;
        self
    }

    pub fn with_download_dir(mut self, dir: PathBuf) -> Self {
        self.download_dir = dir;
        self
    }

    pub fn with_download_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.download_prefix = prefix.into();
        self
    }

    /// The generation options the adapter sends with every request.
    pub fn generation_options(&self) -> ImageGenerationOptions {
        ImageGenerationOptions {
            aspect_ratio: Some(self.aspect_ratio.clone()),
            image_size: Some(self.image_size.clone()),
            num_images: Some(self.num_images),
            google_search: self.google_search,
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
