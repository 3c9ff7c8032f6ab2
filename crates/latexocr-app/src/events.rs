use kanal::AsyncReceiver;
use latexocr_types::{AppEvent, UiUpdate};
use tokio_util::sync::CancellationToken;

use crate::context::AppContext;
use crate::state::AppState;

pub mod capture;
pub mod copy;
pub mod ocr_result;
pub mod preview;
pub mod settings;
pub mod text_input;

use capture::{
    handle_capture_failed, handle_captured, handle_selection_canceled, handle_transcribe_file,
    handle_trigger_capture,
};
use copy::{handle_copy_latex, handle_copy_mathml};
use ocr_result::handle_ocr_finished;
use preview::{handle_focus_preview, handle_preview_status};
use settings::{bind_hotkey, handle_open_settings, handle_save_settings};
use text_input::handle_latex_edited;

/// Controller main loop. Sole owner of `state`.
pub async fn event_loop(
    mut state: AppState,
    mut ctx: AppContext,
    ui_to_app_rx: AsyncReceiver<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    bind_hotkey(&state, &ctx).await;
    ctx.ui.status("Ready").await;

    tracing::info!("[EVENT_LOOP] Waiting for events");
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = ui_to_app_rx.recv() => match event {
                Ok(event) => event,
                Err(_) => {
                    tracing::debug!("[EVENT_LOOP] Inbox closed");
                    break;
                }
            },
        };

        tracing::debug!("[EVENT_LOOP] {:?}", std::mem::discriminant(&event));
        if !handle_event(&mut state, &mut ctx, event).await {
            break;
        }
    }

    let counters = &ctx.counters;
    tracing::info!(
        "Controller stopped: {} captures, {} transcribed, {} failed",
        counters.capture_count,
        counters.success_count,
        counters.error_count
    );
    Ok(())
}

/// Dispatch one event. Returns false on shutdown.
pub async fn handle_event(state: &mut AppState, ctx: &mut AppContext, event: AppEvent) -> bool {
    match event {
        AppEvent::TriggerCapture => handle_trigger_capture(state, ctx).await,
        AppEvent::TranscribeFile(path) => handle_transcribe_file(state, ctx, path).await,
        AppEvent::SelectionCanceled => handle_selection_canceled(state, ctx).await,
        AppEvent::Captured(image) => handle_captured(state, ctx, image).await,
        AppEvent::CaptureFailed(error) => handle_capture_failed(state, ctx, error).await,
        AppEvent::OcrFinished {
            request_id,
            outcome,
        } => handle_ocr_finished(state, ctx, request_id, outcome).await,
        AppEvent::LatexEdited(text) => handle_latex_edited(state, ctx, text).await,
        AppEvent::CopyLatex => handle_copy_latex(state, ctx).await,
        AppEvent::CopyMathml => handle_copy_mathml(state, ctx).await,
        AppEvent::OpenSettings => handle_open_settings(state, ctx).await,
        AppEvent::SaveSettings(form) => handle_save_settings(state, ctx, form).await,
        AppEvent::FocusPreview => handle_focus_preview(ctx).await,
        AppEvent::PreviewStatus(status) => handle_preview_status(state, ctx, status).await,
        AppEvent::Shutdown => {
            tracing::info!("Shutdown requested");
            ctx.ui.send(UiUpdate::Close).await;
            ctx.services.preview.close().await;
            return false;
        }
    }
    true
}
