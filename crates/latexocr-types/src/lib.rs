pub mod error;
pub mod types;

pub use error::{CaptureError, ClipboardError, HotkeyError, OcrError, PreviewError};
pub use types::*;
