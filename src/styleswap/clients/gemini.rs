use crate::config::{StyleSwapConfig, DEFAULT_BASE_URL};
use crate::credentials::{CredentialSelector, StaticCredentialSelector};
use crate::http_client_pool::get_or_create_client;
use crate::image_generation::{
    ContentPart, ImageGenerationClient, ImageGenerationOptions, ImageGenerationResponse,
    TransportError,
};
use crate::intake::UploadedImage;
use async_trait::async_trait;
use log::error;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Gemini `generateContent` client for image editing models.
///
/// The API key is resolved from the [`CredentialSelector`] right before each request, so a
/// re-selected key takes effect on the next call without rebuilding the client.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    pub model: String,
    credentials: Arc<dyn CredentialSelector>,
}

// Image-capable models
pub enum Model {
    Gemini3ProImagePreview,
    Gemini25FlashImage,
    Gemini25FlashImagePreview,
}

pub fn model_to_string(model: Model) -> String {
    match model {
        Model::Gemini3ProImagePreview => "gemini-3-pro-image-preview".to_string(),
        Model::Gemini25FlashImage => "gemini-2.5-flash-image".to_string(),
        Model::Gemini25FlashImagePreview => "gemini-2.5-flash-image-preview".to_string(),
    }
}

impl GeminiClient {
    pub fn new_with_model_string(secret_key: &str, model_name: &str) -> Self {
        Self::new_with_base_url(secret_key, model_name, DEFAULT_BASE_URL)
    }

    pub fn new_with_model_enum(secret_key: &str, model: Model) -> Self {
        Self::new_with_model_string(secret_key, &model_to_string(model))
    }

    /// This function is used to create a GeminiClient with a custom base URL
    /// The default base URL is "<https://generativelanguage.googleapis.com/v1beta>"
    pub fn new_with_base_url(secret_key: &str, model_name: &str, base_url: &str) -> Self {
        Self::new_with_credentials(
            Arc::new(StaticCredentialSelector::new(secret_key)),
            model_name,
            base_url,
        )
    }

    pub fn new_with_credentials(
        credentials: Arc<dyn CredentialSelector>,
        model_name: &str,
        base_url: &str,
    ) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        GeminiClient {
            http: get_or_create_client(&base_url),
            base_url,
            model: model_name.to_string(),
            credentials,
        }
    }

    pub fn from_config(config: &StyleSwapConfig, credentials: Arc<dyn CredentialSelector>) -> Self {
        Self::new_with_credentials(credentials, &config.model, &config.base_url)
    }

    fn endpoint(&self) -> String {
        let model = self.model.trim();
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        };
        format!("{}/{}:generateContent", self.base_url, model_path)
    }
}

#[async_trait]
impl ImageGenerationClient for GeminiClient {
    async fn generate_image(
        &self,
        prompt: &str,
        reference: Option<&UploadedImage>,
        options: ImageGenerationOptions,
    ) -> Result<ImageGenerationResponse, TransportError> {
        let api_key = self
            .credentials
            .api_key()
            .ok_or(TransportError::MissingCredential)?;

        let body = build_request_body(prompt, reference, &options);
        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("GeminiClient::generate_image request error: {}", e);
                TransportError::Http(e.to_string())
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        if !status.is_success() {
            let message = api_error_message(&text);
            if log::log_enabled!(log::Level::Error) {
                error!(
                    "GeminiClient::generate_image error ({}): {}",
                    status.as_u16(),
                    message
                );
            }
            return Err(TransportError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| TransportError::Decode(e.to_string()))?;
        Ok(parsed.into_response())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// Wire types for `models/{model}:generateContent`.

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, alias = "inline_data", skip_serializing_if = "Option::is_none")]
    inline_data: Option<Blob>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Blob {
    #[serde(default, alias = "mime_type")]
    mime_type: String,
    #[serde(default)]
    data: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    candidate_count: u32,
    response_modalities: Vec<&'static str>,
    image_config: ImageConfig,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    aspect_ratio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_size: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: serde_json::Value,
}

#[derive(Deserialize, Debug, Default)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize, Debug)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

pub(crate) fn build_request_body(
    prompt: &str,
    reference: Option<&UploadedImage>,
    options: &ImageGenerationOptions,
) -> GenerateContentRequest {
    let mut parts = Vec::with_capacity(2);
    if let Some(image) = reference {
        parts.push(Part {
            text: None,
            inline_data: Some(Blob {
                mime_type: image.media_type.clone(),
                data: image.data.clone(),
            }),
        });
    }
    parts.push(Part {
        text: Some(prompt.to_string()),
        inline_data: None,
    });

    let tools = if options.google_search {
        vec![Tool {
            google_search: serde_json::json!({}),
        }]
    } else {
        Vec::new()
    };

    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts,
        }],
        generation_config: GenerationConfig {
            candidate_count: options.num_images.unwrap_or(1).max(1),
            response_modalities: vec!["TEXT", "IMAGE"],
            image_config: ImageConfig {
                aspect_ratio: options.aspect_ratio.clone(),
                image_size: options.image_size.clone(),
            },
        },
        tools,
    }
}

impl GenerateContentResponse {
    /// Flatten the first candidate's parts. Parts carrying neither text nor image are dropped.
    fn into_response(self) -> ImageGenerationResponse {
        let parts = self
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| match (part.inline_data, part.text) {
                (Some(blob), _) => Some(ContentPart::image(blob.mime_type, blob.data)),
                (None, Some(text)) => Some(ContentPart::Text(text)),
                (None, None) => None,
            })
            .collect();
        ImageGenerationResponse { parts }
    }
}

/// Pull `error.message` out of an error body, falling back to the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}
