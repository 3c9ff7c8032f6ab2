use std::sync::Arc;

use kanal::AsyncSender;
use latexocr_config::ConfigStore;
use latexocr_core::ports::{ClipboardSink, HotkeyBinder, RegionSelector, ScreenCapture};
use latexocr_ocr::Transcriber;
use latexocr_preview::{PreviewPort, PreviewSyncHandle};
use latexocr_types::AppEvent;

use crate::status::{OcrStatus, StatusReporter};

/// Platform collaborators the controller drives
#[derive(Clone)]
pub struct Services {
    pub selector: Arc<dyn RegionSelector>,
    pub capture: Arc<dyn ScreenCapture>,
    pub transcriber: Arc<dyn Transcriber>,
    pub hotkeys: Arc<dyn HotkeyBinder>,
    pub clipboard: Arc<dyn ClipboardSink>,
    pub preview: Arc<dyn PreviewPort>,
    pub preview_sync: PreviewSyncHandle,
    pub store: ConfigStore,
}

/// Everything a handler needs besides the state itself
pub struct AppContext {
    pub services: Services,
    /// Loop-back into the controller inbox for background jobs
    pub events_tx: AsyncSender<AppEvent>,
    pub ui: StatusReporter,
    pub counters: OcrStatus,
}

impl AppContext {
    pub fn new(services: Services, events_tx: AsyncSender<AppEvent>, ui: StatusReporter) -> Self {
        Self {
            services,
            events_tx,
            ui,
            counters: OcrStatus::default(),
        }
    }

    /// Post a background result to the controller
    pub async fn post(events_tx: &AsyncSender<AppEvent>, event: AppEvent) {
        if events_tx.send(event).await.is_err() {
            tracing::debug!("Controller gone, background result dropped");
        }
    }
}
