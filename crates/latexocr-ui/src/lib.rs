use std::thread;

use kanal::{AsyncReceiver, AsyncSender};
use latexocr_core::selection::SelectionTracker;
use latexocr_ocr::{HotkeyManager, forward_presses};
use latexocr_types::{AppEvent, UiUpdate};
use slint::{CloseRequestResponse, ComponentHandle};

slint::include_modules!();

mod bridge;
mod events;
mod overlay;
mod state;

pub use bridge::{SlintHotkeys, SlintRegionSelector};

use self::events::{apply_update, read_form};
use self::state::{UiShell, with_shell};

/// Forward a UI action to the controller without blocking the event loop
fn emit(tx: &AsyncSender<AppEvent>, event: AppEvent) {
    let tx = tx.clone();
    if let Err(e) = slint::spawn_local(async move {
        if tx.send(event).await.is_err() {
            tracing::debug!("[UI] Controller gone, event dropped");
        }
    }) {
        tracing::error!("[UI] Failed to queue event: {}", e);
    }
}

/// Build the windows, wire callbacks and start the hotkey forwarder.
///
/// Must be called on the main thread before [`run`].
pub fn init(ui_to_app_tx: AsyncSender<AppEvent>) -> anyhow::Result<()> {
    let main = MainWindow::new()?;
    let settings = SettingsDialog::new()?;
    let error = ErrorDialog::new()?;
    let selection_overlay = SelectionOverlay::new()?;

    // Main window
    {
        let tx = ui_to_app_tx.clone();
        main.on_capture(move || emit(&tx, AppEvent::TriggerCapture));
    }
    {
        let tx = ui_to_app_tx.clone();
        main.on_copy_latex(move || emit(&tx, AppEvent::CopyLatex));
    }
    {
        let tx = ui_to_app_tx.clone();
        main.on_copy_mathml(move || emit(&tx, AppEvent::CopyMathml));
    }
    {
        let tx = ui_to_app_tx.clone();
        main.on_open_settings(move || emit(&tx, AppEvent::OpenSettings));
    }
    {
        let tx = ui_to_app_tx.clone();
        main.on_focus_preview(move || emit(&tx, AppEvent::FocusPreview));
    }
    {
        let tx = ui_to_app_tx.clone();
        main.on_latex_edited(move |text| emit(&tx, AppEvent::LatexEdited(text.to_string())));
    }
    {
        let tx = ui_to_app_tx.clone();
        main.window().on_close_requested(move || {
            emit(&tx, AppEvent::Shutdown);
            CloseRequestResponse::HideWindow
        });
    }

    // Settings dialog
    {
        let tx = ui_to_app_tx.clone();
        settings.on_save(move || {
            let form = with_shell(|shell| {
                let form = read_form(&shell.settings);
                let _ = shell.settings.hide();
                form
            });
            if let Some(form) = form {
                emit(&tx, AppEvent::SaveSettings(form));
            }
        });
    }
    settings.on_cancel(|| {
        with_shell(|shell| {
            let _ = shell.settings.hide();
        });
    });

    error.on_dismiss(|| {
        with_shell(|shell| {
            let _ = shell.error.hide();
        });
    });

    // Selection overlay
    selection_overlay.on_pressed(|x, y| {
        with_shell(|shell| overlay::on_pressed(shell, x, y));
    });
    selection_overlay.on_dragged(|x, y| {
        with_shell(|shell| overlay::on_dragged(shell, x, y));
    });
    selection_overlay.on_released(|x, y| {
        with_shell(|shell| overlay::on_released(shell, x, y));
    });
    selection_overlay.on_cancelled(|| {
        with_shell(overlay::on_cancelled);
    });

    let hotkeys = match HotkeyManager::new() {
        Ok(manager) => {
            let active_id = manager.active_id();
            let tx = ui_to_app_tx.as_sync().clone();
            thread::Builder::new()
                .name("hotkey-forwarder".to_string())
                .spawn(move || {
                    forward_presses(active_id, || {
                        tracing::debug!("[HOTKEY] Capture chord pressed");
                        tx.send(AppEvent::TriggerCapture).is_ok()
                    })
                })?;
            Some(manager)
        }
        Err(e) => {
            tracing::warn!("Global hotkeys unavailable: {}", e);
            None
        }
    };

    state::install(UiShell {
        main,
        settings,
        error,
        overlay: selection_overlay,
        tracker: SelectionTracker::new(),
        pending: None,
        hotkeys,
    });

    Ok(())
}

/// Show the main window and run the Slint event loop until it closes
pub fn run(app_to_ui_rx: AsyncReceiver<UiUpdate>) -> anyhow::Result<()> {
    slint::spawn_local(async move {
        while let Ok(update) = app_to_ui_rx.recv().await {
            let keep_running = with_shell(|shell| apply_update(shell, update)).unwrap_or(false);
            if !keep_running {
                break;
            }
        }
        let _ = slint::quit_event_loop();
    })?;

    with_shell(|shell| shell.main.show()).transpose()?;
    slint::run_event_loop()?;

    // windows and the hotkey registration are dropped on this thread
    drop(state::take());
    tracing::info!("UI event loop finished");
    Ok(())
}
