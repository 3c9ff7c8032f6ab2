use std::time::Duration;

use async_trait::async_trait;
use latexocr_config::Config;
use latexocr_types::{CapturedImage, ImageFormat, OcrError};

use crate::encode::to_data_uri;
use crate::request::{INSTRUCTION, RequestShape};

/// Snapshot of the settings one OCR request needs
#[derive(Clone, PartialEq, Eq)]
pub struct OcrSettings {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub shape: RequestShape,
    pub image_format: ImageFormat,
    pub timeout: Duration,
}

impl std::fmt::Debug for OcrSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrSettings")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("shape", &self.shape)
            .field("image_format", &self.image_format)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl OcrSettings {
    /// Check the request preconditions without touching the network.
    ///
    /// Fails with `MissingSettings` naming every blank field.
    pub fn from_config(config: &Config) -> Result<Self, OcrError> {
        let base_url = config.api_base_url.trim();
        let api_key = config.api_key.trim();
        let model = config.api_model.trim();

        let missing: Vec<&str> = [
            ("api_base_url", base_url),
            ("api_key", api_key),
            ("api_model", model),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect();
        if !missing.is_empty() {
            return Err(OcrError::MissingSettings(missing.join(", ")));
        }

        let shape = RequestShape::resolve(config.api_format, base_url);
        Ok(Self {
            endpoint: shape.endpoint(base_url),
            api_key: api_key.to_string(),
            model: model.to_string(),
            shape,
            image_format: config.image_format,
            timeout: Duration::from_secs(config.request_timeout_secs.max(1)),
        })
    }
}

/// Image to LaTeX provider
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Single attempt, raw model text on success
    async fn transcribe(
        &self,
        image: &CapturedImage,
        settings: &OcrSettings,
    ) -> Result<String, OcrError>;
}

/// OpenAI-compatible vision endpoint over HTTP
#[derive(Clone, Default)]
pub struct VisionClient {
    client: reqwest::Client,
}

impl VisionClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    fn map_send_error(e: reqwest::Error, timeout: Duration) -> OcrError {
        if e.is_timeout() {
            OcrError::Timeout(timeout.as_secs())
        } else {
            OcrError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl Transcriber for VisionClient {
    async fn transcribe(
        &self,
        image: &CapturedImage,
        settings: &OcrSettings,
    ) -> Result<String, OcrError> {
        let data_uri = to_data_uri(image, settings.image_format)?;
        let body = settings.shape.encode(&settings.model, INSTRUCTION, &data_uri);

        tracing::info!(
            "Sending {}x{} image to {} ({:?}, model {})",
            image.width,
            image.height,
            settings.endpoint,
            settings.shape,
            settings.model
        );

        let response = self
            .client
            .post(&settings.endpoint)
            .timeout(settings.timeout)
            .bearer_auth(&settings.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::map_send_error(e, settings.timeout))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Self::map_send_error(e, settings.timeout))?;

        if !status.is_success() {
            tracing::warn!("OCR endpoint returned HTTP {}", status.as_u16());
            return Err(OcrError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let json: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| OcrError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        settings.shape.decode(&json)
    }
}
