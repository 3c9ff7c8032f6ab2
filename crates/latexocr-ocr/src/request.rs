use latexocr_types::{ApiFormat, OcrError};
use serde_json::{Value, json};

/// Prompt sent with every image
pub const INSTRUCTION: &str = "Please transcribe the formula in this image into LaTeX. \
Return only the LaTeX formula without any other text or symbols, \
so it can be pasted into a document directly.";

/// Payload layout expected by the OCR endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestShape {
    ChatCompletions,
    Responses,
}

impl RequestShape {
    /// Resolve `auto` by looking at the configured URL
    pub fn resolve(format: ApiFormat, base_url: &str) -> Self {
        match format {
            ApiFormat::ChatCompletions => RequestShape::ChatCompletions,
            ApiFormat::Responses => RequestShape::Responses,
            ApiFormat::Auto => {
                if base_url.trim().trim_end_matches('/').ends_with("/responses") {
                    RequestShape::Responses
                } else {
                    RequestShape::ChatCompletions
                }
            }
        }
    }

    /// URL the request is POSTed to
    pub fn endpoint(&self, base_url: &str) -> String {
        let base = base_url.trim();
        match self {
            RequestShape::ChatCompletions => base.to_string(),
            RequestShape::Responses => {
                let base = base.trim_end_matches('/');
                let base = base.strip_suffix("/responses").unwrap_or(base);
                format!("{}/responses", base.trim_end_matches('/'))
            }
        }
    }

    pub fn encode(&self, model: &str, instruction: &str, data_uri: &str) -> Value {
        match self {
            RequestShape::ChatCompletions => json!({
                "model": model,
                "messages": [{
                    "role": "user",
                    "content": [
                        { "type": "text", "text": instruction },
                        { "type": "image_url", "image_url": { "url": data_uri } },
                    ],
                }],
            }),
            RequestShape::Responses => json!({
                "model": model,
                "input": [{
                    "role": "user",
                    "content": [
                        { "type": "input_text", "text": instruction },
                        { "type": "input_image", "image_url": data_uri },
                    ],
                }],
            }),
        }
    }

    /// Extract the model text from a successful response body
    pub fn decode(&self, body: &Value) -> Result<String, OcrError> {
        match self {
            RequestShape::ChatCompletions => body["choices"]
                .get(0)
                .and_then(|choice| choice["message"]["content"].as_str())
                .map(str::to_string)
                .ok_or_else(|| {
                    OcrError::InvalidResponse("no choices[0].message.content".to_string())
                }),
            RequestShape::Responses => {
                let output = body["output"].as_array().ok_or_else(|| {
                    OcrError::InvalidResponse("no output array".to_string())
                })?;

                let texts: Vec<&str> = output
                    .iter()
                    .filter_map(|item| item["content"].as_array())
                    .flatten()
                    .filter(|part| part["type"] == "output_text")
                    .filter_map(|part| part["text"].as_str())
                    .collect();

                if texts.is_empty() {
                    return Err(OcrError::InvalidResponse("no output_text content".to_string()));
                }
                Ok(texts.join("\n"))
            }
        }
    }
}
