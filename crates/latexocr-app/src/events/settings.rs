use latexocr_types::{SettingsForm, UiUpdate};

use crate::context::AppContext;
use crate::state::AppState;

pub async fn handle_open_settings(state: &AppState, ctx: &AppContext) {
    ctx.ui
        .send(UiUpdate::ShowSettings(state.config.to_form()))
        .await;
}

/// Persist the dialog values and re-register the capture chord.
/// Session overrides stay in effect but only edited fields reach the file.
pub async fn handle_save_settings(state: &mut AppState, ctx: &AppContext, form: SettingsForm) {
    let edited = state.config.apply_form(&form);
    let next = state.overrides.persistable(&state.file_config, edited);
    if let Err(e) = ctx.services.store.save(&next) {
        tracing::error!("[SETTINGS] {}", e);
        ctx.ui.status(format!("Failed to save settings: {}", e)).await;
        return;
    }

    tracing::info!(
        "[SETTINGS] Saved to {}",
        ctx.services.store.path().display()
    );
    state.config = state.overrides.apply(next.clone());
    state.file_config = next;

    if bind_hotkey(state, ctx).await {
        ctx.ui.status("Settings saved.").await;
    }
}

/// Install the configured chord. Failures only reach the status line.
pub async fn bind_hotkey(state: &AppState, ctx: &AppContext) -> bool {
    let chord = state.config.hotkey.as_str();
    match ctx.services.hotkeys.rebind(chord).await {
        Ok(()) => {
            tracing::info!("[HOTKEY] Capture bound to {}", chord);
            ctx.ui.send(UiUpdate::HotkeyLabel(chord.to_string())).await;
            true
        }
        Err(e) => {
            tracing::warn!("[HOTKEY] {}", e);
            ctx.ui.status(format!("Hotkey error: {}", e)).await;
            false
        }
    }
}
