use std::path::PathBuf;

use latexocr_ocr::{OcrSettings, downscale_for_preview};
use latexocr_types::{AppEvent, CaptureError, CapturedImage, UiUpdate};

use crate::context::AppContext;
use crate::state::{AppState, Phase};

pub async fn handle_trigger_capture(state: &mut AppState, ctx: &AppContext) {
    if state.is_selecting() {
        tracing::debug!("[CAPTURE] Already selecting, trigger ignored");
        return;
    }

    state.phase = Phase::Selecting;
    ctx.ui.note("Waiting for capture...").await;

    let selector = ctx.services.selector.clone();
    let capture = ctx.services.capture.clone();
    let events_tx = ctx.events_tx.clone();
    tokio::spawn(async move {
        let event = match selector.select().await {
            None => AppEvent::SelectionCanceled,
            Some(selection) => {
                tracing::debug!("[CAPTURE] Selected {:?}", selection.rect);
                match tokio::task::spawn_blocking(move || capture.capture(&selection)).await {
                    Ok(Ok(image)) => AppEvent::Captured(image),
                    Ok(Err(e)) => AppEvent::CaptureFailed(e),
                    Err(e) => AppEvent::CaptureFailed(CaptureError::Backend(e.to_string())),
                }
            }
        };
        AppContext::post(&events_tx, event).await;
    });
}

pub async fn handle_transcribe_file(state: &mut AppState, ctx: &AppContext, path: PathBuf) {
    if state.is_selecting() {
        tracing::debug!("[CAPTURE] Busy, ignoring {}", path.display());
        return;
    }

    state.phase = Phase::Capturing;
    tracing::info!("[CAPTURE] Loading {}", path.display());

    let capture = ctx.services.capture.clone();
    let events_tx = ctx.events_tx.clone();
    tokio::spawn(async move {
        let event = match tokio::task::spawn_blocking(move || capture.load_file(&path)).await {
            Ok(Ok(image)) => AppEvent::Captured(image),
            Ok(Err(e)) => AppEvent::CaptureFailed(e),
            Err(e) => AppEvent::CaptureFailed(CaptureError::Backend(e.to_string())),
        };
        AppContext::post(&events_tx, event).await;
    });
}

pub async fn handle_selection_canceled(state: &mut AppState, ctx: &AppContext) {
    state.settle_phase();
    ctx.ui.status("Capture canceled.").await;
    ctx.ui.note("Capture canceled.").await;
}

pub async fn handle_capture_failed(state: &mut AppState, ctx: &mut AppContext, error: CaptureError) {
    tracing::warn!("[CAPTURE] {}", error);
    state.settle_phase();
    ctx.counters.error_count += 1;
    ctx.ui.status(format!("Capture error: {}", error)).await;
    ctx.ui.error("Capture error", error.to_string()).await;
}

/// Show the capture and dispatch OCR, unless the API settings are incomplete
pub async fn handle_captured(state: &mut AppState, ctx: &mut AppContext, image: CapturedImage) {
    ctx.counters.capture_count += 1;
    tracing::info!("[CAPTURE] Got {}x{} image", image.width, image.height);
    ctx.ui
        .send(UiUpdate::CapturedImage(downscale_for_preview(&image)))
        .await;

    let settings = match OcrSettings::from_config(&state.config) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("[OCR] {}", e);
            state.settle_phase();
            ctx.ui.status("Missing API settings.").await;
            ctx.ui
                .send(UiUpdate::ShowSettings(state.config.to_form()))
                .await;
            return;
        }
    };

    let request_id = state.begin_request();
    ctx.ui.busy(true).await;
    ctx.ui.status("OCR in progress...").await;
    ctx.ui.note("Rendering after OCR...").await;

    let transcriber = ctx.services.transcriber.clone();
    let events_tx = ctx.events_tx.clone();
    tokio::spawn(async move {
        tracing::debug!("[OCR] Request #{} started", request_id);
        let outcome = transcriber.transcribe(&image, &settings).await;
        AppContext::post(
            &events_tx,
            AppEvent::OcrFinished {
                request_id,
                outcome,
            },
        )
        .await;
    });
}
