use kanal::{AsyncReceiver, AsyncSender};
use latexocr_config::{Config, SessionOverrides};
use latexocr_preview::PreviewSync;
use latexocr_types::{AppEvent, UiUpdate};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::context::{AppContext, Services};
use crate::events::event_loop;
use crate::state::AppState;
use crate::status::StatusReporter;

/// Centralized channel management
pub struct ChannelSet {
    pub app_to_ui: (AsyncSender<UiUpdate>, AsyncReceiver<UiUpdate>),
    pub ui_to_app: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            app_to_ui: kanal::bounded_async(256),
            ui_to_app: kanal::bounded_async(64),
        }
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new() -> Self {
        Self {
            channels: ChannelSet::new(),
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn ui_to_app_tx(&self) -> AsyncSender<AppEvent> {
        self.channels.ui_to_app.0.clone()
    }

    pub fn app_to_ui_rx(&self) -> AsyncReceiver<UiUpdate> {
        self.channels.app_to_ui.1.clone()
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Start the controller loop and the preview sync actor.
    ///
    /// `preview_sync` must be the actor paired with `services.preview_sync`.
    pub fn spawn_tasks(
        &self,
        file_config: Config,
        overrides: SessionOverrides,
        services: Services,
        preview_sync: PreviewSync,
    ) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();
        let events_tx = self.channels.ui_to_app.0.clone();

        // Preview sync
        {
            let preview_sync = preview_sync.with_status(events_tx.clone());
            let cancel = self.cancel_token.child_token();
            tasks.spawn(async move {
                preview_sync.run(cancel).await;
                Ok(())
            });
        }

        // Event loop
        let ctx = AppContext::new(
            services,
            events_tx,
            StatusReporter::new(self.channels.app_to_ui.0.clone()),
        );
        tasks.spawn(event_loop(
            AppState::new(file_config, overrides),
            ctx,
            self.channels.ui_to_app.1.clone(),
            self.cancel_token.child_token(),
        ));

        tasks
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}

impl Default for AppController {
    fn default() -> Self {
        Self::new()
    }
}
