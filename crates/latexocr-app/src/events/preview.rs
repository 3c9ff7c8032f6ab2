use latexocr_types::PreviewStatus;

use crate::context::AppContext;
use crate::state::AppState;

pub async fn handle_preview_status(state: &AppState, ctx: &AppContext, status: PreviewStatus) {
    tracing::info!("[PREVIEW] {:?}", status);

    let note = match status {
        PreviewStatus::Loading => "Opening preview window...",
        PreviewStatus::Ready if state.formula.is_empty() => "Waiting for capture...",
        PreviewStatus::Ready => "Preview updated.",
        PreviewStatus::Unavailable => "Preview not available.",
    };
    ctx.ui.note(note).await;
}

pub async fn handle_focus_preview(ctx: &AppContext) {
    if let Err(e) = ctx.services.preview.bring_to_front().await {
        tracing::debug!("[PREVIEW] {}", e);
        ctx.ui.status("Preview not available.").await;
    }
}
