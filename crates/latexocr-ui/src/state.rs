use std::cell::RefCell;

use latexocr_core::selection::SelectionTracker;
use latexocr_ocr::HotkeyManager;
use latexocr_types::{ScreenInfo, Selection};
use tokio::sync::oneshot;

use crate::{ErrorDialog, MainWindow, SelectionOverlay, SettingsDialog};

/// Overlay session waiting for the user's gesture
pub(crate) struct PendingSelection {
    pub screen: ScreenInfo,
    pub reply: oneshot::Sender<Option<Selection>>,
}

/// Everything that must stay on the UI thread
pub(crate) struct UiShell {
    pub main: MainWindow,
    pub settings: SettingsDialog,
    pub error: ErrorDialog,
    pub overlay: SelectionOverlay,
    pub tracker: SelectionTracker,
    pub pending: Option<PendingSelection>,
    pub hotkeys: Option<HotkeyManager>,
}

thread_local! {
    static SHELL: RefCell<Option<UiShell>> = const { RefCell::new(None) };
}

pub(crate) fn install(shell: UiShell) {
    SHELL.with(|cell| *cell.borrow_mut() = Some(shell));
}

pub(crate) fn take() -> Option<UiShell> {
    SHELL.with(|cell| cell.borrow_mut().take())
}

/// Run `f` against the shell, `None` off the UI thread or after teardown
pub(crate) fn with_shell<R>(f: impl FnOnce(&mut UiShell) -> R) -> Option<R> {
    SHELL.with(|cell| match cell.try_borrow_mut() {
        Ok(mut shell) => shell.as_mut().map(f),
        Err(_) => {
            tracing::warn!("UI shell is busy, dropping nested access");
            None
        }
    })
}
