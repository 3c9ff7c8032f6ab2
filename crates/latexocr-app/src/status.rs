use kanal::AsyncSender;
use latexocr_types::UiUpdate;

/// Pipeline counters, logged on shutdown
#[derive(Clone, Debug, Default)]
pub struct OcrStatus {
    pub capture_count: u64,
    pub success_count: u64,
    pub error_count: u64,
}

/// Sends projections of controller state to the UI thread
#[derive(Clone)]
pub struct StatusReporter {
    ui_tx: AsyncSender<UiUpdate>,
}

impl StatusReporter {
    pub fn new(ui_tx: AsyncSender<UiUpdate>) -> Self {
        Self { ui_tx }
    }

    pub async fn send(&self, update: UiUpdate) {
        if self.ui_tx.send(update).await.is_err() {
            tracing::debug!("UI gone, update dropped");
        }
    }

    pub async fn status(&self, text: impl Into<String>) {
        let text = text.into();
        tracing::info!("Status: {}", text);
        self.send(UiUpdate::Status(text)).await;
    }

    pub async fn note(&self, text: impl Into<String>) {
        self.send(UiUpdate::PreviewNote(text.into())).await;
    }

    pub async fn busy(&self, busy: bool) {
        self.send(UiUpdate::Busy(busy)).await;
    }

    pub async fn error(&self, title: &str, message: impl Into<String>) {
        self.send(UiUpdate::ShowError {
            title: title.to_string(),
            message: message.into(),
        })
        .await;
    }
}
