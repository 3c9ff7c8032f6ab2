use std::sync::Arc;
use std::time::Duration;

use kanal::{AsyncReceiver, AsyncSender};
use latexocr_config::{Config, ConfigStore, SessionOverrides};
use latexocr_preview::PreviewSync;
use latexocr_types::{AppEvent, UiUpdate};
use tokio::task::JoinSet;
use tokio::time::timeout;

use super::mocks::{
    FakeCapture, FakePreview, FixedSelector, MemoryClipboard, RecordingHotkeys,
    ScriptedTranscriber,
};
use crate::context::Services;
use crate::controller::AppController;

pub const WAIT: Duration = Duration::from_secs(3);
pub const SHORT_DEBOUNCE: Duration = Duration::from_millis(20);

pub fn configured() -> Config {
    Config {
        api_key: "sk-test".to_string(),
        ..Config::default()
    }
}

pub fn scratch_store() -> ConfigStore {
    ConfigStore::new(
        std::env::temp_dir()
            .join(format!("latexocr-app-{}", uuid::Uuid::new_v4()))
            .join("config.json"),
    )
}

pub struct Collaborators {
    pub selector: FixedSelector,
    pub transcriber: ScriptedTranscriber,
    pub hotkeys: RecordingHotkeys,
    pub capture: FakeCapture,
    pub overrides: SessionOverrides,
}

impl Collaborators {
    pub fn new(selector: FixedSelector, transcriber: ScriptedTranscriber) -> Self {
        Self {
            selector,
            transcriber,
            hotkeys: RecordingHotkeys::default(),
            capture: FakeCapture::default(),
            overrides: SessionOverrides::default(),
        }
    }
}

/// Running controller wired to mocks
pub struct Harness {
    pub controller: AppController,
    pub events_tx: AsyncSender<AppEvent>,
    pub ui_rx: AsyncReceiver<UiUpdate>,
    pub preview: Arc<FakePreview>,
    pub clipboard: Arc<MemoryClipboard>,
    pub capture: Arc<FakeCapture>,
    pub transcriber: Arc<ScriptedTranscriber>,
    pub hotkeys: Arc<RecordingHotkeys>,
    pub store: ConfigStore,
    pub tasks: JoinSet<anyhow::Result<()>>,
}

impl Harness {
    /// `config` plays the settings file; `collaborators.overrides` sit on top of it
    pub fn start(config: Config, collaborators: Collaborators) -> Self {
        let controller = AppController::new();
        let preview = Arc::new(FakePreview::new());
        let clipboard = Arc::new(MemoryClipboard::default());
        let capture = Arc::new(collaborators.capture);
        let transcriber = Arc::new(collaborators.transcriber);
        let hotkeys = Arc::new(collaborators.hotkeys);
        let store = scratch_store();

        let (preview_sync, preview_sync_handle) = PreviewSync::new(preview.clone(), SHORT_DEBOUNCE);
        let services = Services {
            selector: Arc::new(collaborators.selector),
            capture: capture.clone(),
            transcriber: transcriber.clone(),
            hotkeys: hotkeys.clone(),
            clipboard: clipboard.clone(),
            preview: preview.clone(),
            preview_sync: preview_sync_handle,
            store: store.clone(),
        };
        let tasks = controller.spawn_tasks(config, collaborators.overrides, services, preview_sync);

        Self {
            events_tx: controller.ui_to_app_tx(),
            ui_rx: controller.app_to_ui_rx(),
            controller,
            preview,
            clipboard,
            capture,
            transcriber,
            hotkeys,
            store,
            tasks,
        }
    }

    pub async fn send(&self, event: AppEvent) {
        self.events_tx.send(event).await.expect("controller inbox closed");
    }

    /// Receive updates until `matches` accepts one, returning everything seen
    pub async fn wait_for(&self, mut matches: impl FnMut(&UiUpdate) -> bool) -> Vec<UiUpdate> {
        let mut seen = Vec::new();
        loop {
            match timeout(WAIT, self.ui_rx.recv()).await {
                Ok(Ok(update)) => {
                    let done = matches(&update);
                    seen.push(update);
                    if done {
                        return seen;
                    }
                }
                Ok(Err(e)) => panic!("UI channel closed: {}; seen {:?}", e, seen),
                Err(_) => panic!("Timed out waiting for update; seen {:?}", seen),
            }
        }
    }

    pub async fn wait_for_status(&self, text: &str) -> Vec<UiUpdate> {
        self.wait_for(|update| matches!(update, UiUpdate::Status(s) if s == text))
            .await
    }

    /// Everything that arrives within `window`
    pub async fn drain_for(&self, window: Duration) -> Vec<UiUpdate> {
        let mut seen = Vec::new();
        while let Ok(Ok(update)) = timeout(window, self.ui_rx.recv()).await {
            seen.push(update);
        }
        seen
    }

    pub async fn stop(mut self) {
        self.controller.shutdown();
        while let Some(joined) = timeout(WAIT, self.tasks.join_next())
            .await
            .expect("tasks did not stop")
        {
            joined.expect("task panicked").expect("task failed");
        }
        let _ = std::fs::remove_dir_all(self.store.path().parent().unwrap());
    }
}

pub fn statuses(updates: &[UiUpdate]) -> Vec<&str> {
    updates
        .iter()
        .filter_map(|update| match update {
            UiUpdate::Status(s) => Some(s.as_str()),
            _ => None,
        })
        .collect()
}
