//! Port implementations that hop onto the UI thread.

use async_trait::async_trait;
use latexocr_core::ports::{HotkeyBinder, RegionSelector};
use latexocr_ocr::target_screen;
use latexocr_types::{HotkeyError, Selection};
use tokio::sync::oneshot;

use crate::overlay;
use crate::state::with_shell;

/// Drag-to-select on a full-screen Slint overlay
#[derive(Debug, Default, Clone, Copy)]
pub struct SlintRegionSelector;

#[async_trait]
impl RegionSelector for SlintRegionSelector {
    async fn select(&self) -> Option<Selection> {
        let screen = match tokio::task::spawn_blocking(target_screen).await {
            Ok(Ok(screen)) => screen,
            Ok(Err(e)) => {
                tracing::warn!("No screen to select on: {}", e);
                return None;
            }
            Err(e) => {
                tracing::error!("Screen lookup panicked: {}", e);
                return None;
            }
        };

        let (tx, rx) = oneshot::channel();
        let posted = slint::invoke_from_event_loop(move || {
            // tx is dropped when the shell is gone, which resolves as cancelled
            with_shell(|shell| overlay::open(shell, screen, tx));
        });
        if let Err(e) = posted {
            tracing::error!("UI event loop unavailable: {}", e);
            return None;
        }

        rx.await.ok().flatten()
    }
}

/// Global hotkey registration, owned by the UI thread
#[derive(Debug, Default, Clone, Copy)]
pub struct SlintHotkeys;

#[async_trait]
impl HotkeyBinder for SlintHotkeys {
    async fn rebind(&self, chord: &str) -> Result<(), HotkeyError> {
        let chord = chord.to_string();
        let (tx, rx) = oneshot::channel();

        slint::invoke_from_event_loop(move || {
            let result = with_shell(|shell| match shell.hotkeys.as_mut() {
                Some(manager) => manager.rebind(&chord),
                None => Err(HotkeyError::Register(
                    "global hotkeys are not supported here".to_string(),
                )),
            })
            .unwrap_or_else(|| Err(HotkeyError::Register("UI is not running".to_string())));
            let _ = tx.send(result);
        })
        .map_err(|e| HotkeyError::Register(e.to_string()))?;

        rx.await
            .map_err(|_| HotkeyError::Register("UI closed".to_string()))?
    }
}
