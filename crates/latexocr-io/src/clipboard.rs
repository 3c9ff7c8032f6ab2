use std::sync::Mutex;

use arboard::Clipboard;
use latexocr_core::ports::ClipboardSink;
use latexocr_types::ClipboardError;

/// System clipboard through arboard.
///
/// The handle is opened on first use and kept alive afterwards, X11 only
/// serves the contents while the owning handle exists.
#[derive(Default)]
pub struct ArboardClipboard {
    inner: Mutex<Option<Clipboard>>,
}

impl ArboardClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardSink for ArboardClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| ClipboardError::Unavailable("clipboard lock poisoned".to_string()))?;

        if guard.is_none() {
            *guard = Some(Clipboard::new().map_err(map_error)?);
        }
        let Some(clipboard) = guard.as_mut() else {
            return Err(ClipboardError::Unavailable("no clipboard handle".to_string()));
        };

        if let Err(e) = clipboard.set_text(text.to_owned()) {
            // reopen on the next attempt
            *guard = None;
            return Err(map_error(e));
        }

        tracing::debug!("Copied {} chars to clipboard", text.chars().count());
        Ok(())
    }
}

fn map_error(e: arboard::Error) -> ClipboardError {
    match e {
        arboard::Error::ClipboardNotSupported => ClipboardError::Unavailable(e.to_string()),
        other => ClipboardError::Write(other.to_string()),
    }
}
