//! Seams between the controller and platform services.

use std::path::Path;

use async_trait::async_trait;
use latexocr_types::{CaptureError, CapturedImage, ClipboardError, HotkeyError, Selection};

/// Modal drag-to-select interaction
#[async_trait]
pub trait RegionSelector: Send + Sync {
    /// Resolves once the user finishes or aborts. `None` means cancelled.
    async fn select(&self) -> Option<Selection>;
}

/// Blocking pixel access, called from `spawn_blocking`
pub trait ScreenCapture: Send + Sync {
    fn capture(&self, selection: &Selection) -> Result<CapturedImage, CaptureError>;

    fn load_file(&self, path: &Path) -> Result<CapturedImage, CaptureError>;
}

/// Single global capture chord
#[async_trait]
pub trait HotkeyBinder: Send + Sync {
    /// Tear down the current binding and install `chord`
    async fn rebind(&self, chord: &str) -> Result<(), HotkeyError>;
}

pub trait ClipboardSink: Send + Sync {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError>;
}
