/// Failure of a single OCR attempt. Cloneable so it can travel inside events.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum OcrError {
    #[error("Missing API settings: {0}")]
    MissingSettings(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("Image encoding failed: {0}")]
    Encoding(String),
}

impl OcrError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, OcrError::MissingSettings(_))
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("No screen available to capture")]
    NoScreen,

    #[error("Selection lies outside the screen")]
    OutOfBounds,

    #[error("Screen capture failed: {0}")]
    Backend(String),

    #[error("Failed to read image {path}: {message}")]
    ReadImage { path: String, message: String },
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum HotkeyError {
    #[error("Empty hotkey")]
    Empty,

    #[error("Unknown key '{0}'")]
    UnknownKey(String),

    #[error("Hotkey needs exactly one non-modifier key: '{0}'")]
    MissingKey(String),

    #[error("Failed to register hotkey: {0}")]
    Register(String),
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("Clipboard write failed: {0}")]
    Write(String),
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum PreviewError {
    #[error("Preview renderer is not running")]
    NotRunning,

    #[error("Failed to start preview renderer: {0}")]
    Spawn(String),

    #[error("Preview renderer channel closed")]
    Closed,
}
