use latexocr_core::normalize;
use latexocr_types::{OcrError, UiUpdate};

use crate::context::AppContext;
use crate::events::copy::auto_copy;
use crate::state::AppState;

pub async fn handle_ocr_finished(
    state: &mut AppState,
    ctx: &mut AppContext,
    request_id: u64,
    outcome: Result<String, OcrError>,
) {
    if !state.finish_request(request_id) {
        tracing::info!("[OCR] Discarding stale result #{}", request_id);
        return;
    }
    ctx.ui.busy(false).await;

    match outcome {
        Ok(raw) => {
            ctx.counters.success_count += 1;
            let latex = normalize(&raw);
            tracing::debug!("[OCR] #{} -> {} chars of LaTeX", request_id, latex.len());

            state.formula = latex.clone();
            ctx.ui.send(UiUpdate::LatexText(latex.clone())).await;
            ctx.ui.status("OCR complete.").await;
            ctx.services.preview_sync.push(latex).await;
            ctx.ui.note("Preview updated.").await;

            auto_copy(state, ctx).await;
        }
        Err(e) if e.is_configuration() => {
            tracing::warn!("[OCR] {}", e);
            ctx.ui.status("Missing API settings.").await;
            ctx.ui
                .send(UiUpdate::ShowSettings(state.config.to_form()))
                .await;
        }
        Err(e) => {
            ctx.counters.error_count += 1;
            tracing::warn!("[OCR] Request #{} failed: {}", request_id, e);
            ctx.ui.status(format!("OCR error: {}", e)).await;
            ctx.ui.note("OCR failed. Check settings.").await;
            ctx.ui.error("OCR error", e.to_string()).await;
        }
    }
}
