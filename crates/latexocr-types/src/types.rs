use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CaptureError, OcrError};

/// Messages handled by the controller task
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Hotkey or capture button
    TriggerCapture,
    /// Run OCR on an image file instead of a screen capture
    TranscribeFile(PathBuf),
    /// Overlay closed without a usable rectangle
    SelectionCanceled,
    /// Pixels ready for OCR, from the screen or a file
    Captured(CapturedImage),
    CaptureFailed(CaptureError),
    /// User edit in the LaTeX text area
    LatexEdited(String),
    CopyLatex,
    CopyMathml,
    OpenSettings,
    SaveSettings(SettingsForm),
    FocusPreview,
    PreviewStatus(PreviewStatus),
    OcrFinished {
        request_id: u64,
        outcome: Result<String, OcrError>,
    },
    Shutdown,
}

/// Lifecycle of the external renderer as seen by the sync actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewStatus {
    Loading,
    Ready,
    Unavailable,
}

/// Messages applied by the UI thread
#[derive(Debug, Clone)]
pub enum UiUpdate {
    Status(String),
    Busy(bool),
    LatexText(String),
    CapturedImage(CapturedImage),
    PreviewNote(String),
    ShowError { title: String, message: String },
    ShowSettings(SettingsForm),
    HotkeyLabel(String),
    Close,
}

/// Flat string view of the settings dialog fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsForm {
    pub api_base_url: String,
    pub api_key: String,
    pub api_model: String,
    pub api_format: String,
    pub copy_format: String,
    pub hotkey: String,
}

/// Rectangle in logical pixels, normalized so left <= right and top <= bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl SelectionRect {
    pub fn from_points(a: (i32, i32), b: (i32, i32)) -> Self {
        Self {
            left: a.0.min(b.0),
            top: a.1.min(b.1),
            right: a.0.max(b.0),
            bottom: a.1.max(b.1),
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// Physical bounds of the monitor a selection was made on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenInfo {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub scale_factor: f32,
}

/// Completed drag gesture, relative to the screen's top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub rect: SelectionRect,
    pub screen: ScreenInfo,
}

/// RGBA8 bitmap
#[derive(Clone, PartialEq, Eq)]
pub struct CapturedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl fmt::Debug for CapturedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

impl CapturedImage {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.rgba.is_empty()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown {kind} value '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Format written to the clipboard after a successful OCR
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyFormat {
    #[default]
    Latex,
    Mathml,
}

impl CopyFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            CopyFormat::Latex => "latex",
            CopyFormat::Mathml => "mathml",
        }
    }
}

impl FromStr for CopyFormat {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latex" => Ok(CopyFormat::Latex),
            "mathml" => Ok(CopyFormat::Mathml),
            other => Err(ParseEnumError {
                kind: "copy_format",
                value: other.to_string(),
            }),
        }
    }
}

/// Which request payload the OCR endpoint expects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiFormat {
    /// Pick from the endpoint URL
    #[default]
    Auto,
    ChatCompletions,
    Responses,
}

impl ApiFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiFormat::Auto => "auto",
            ApiFormat::ChatCompletions => "chat_completions",
            ApiFormat::Responses => "responses",
        }
    }
}

impl FromStr for ApiFormat {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(ApiFormat::Auto),
            "chat_completions" | "chat" => Ok(ApiFormat::ChatCompletions),
            "responses" => Ok(ApiFormat::Responses),
            other => Err(ParseEnumError {
                kind: "api_format",
                value: other.to_string(),
            }),
        }
    }
}

/// Encoding used for the image embedded in the OCR request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}

impl FromStr for ImageFormat {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpeg" | "jpg" => Ok(ImageFormat::Jpeg),
            other => Err(ParseEnumError {
                kind: "image_format",
                value: other.to_string(),
            }),
        }
    }
}
