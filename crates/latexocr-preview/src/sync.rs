use std::sync::Arc;
use std::time::Duration;

use kanal::{AsyncReceiver, AsyncSender};
use latexocr_types::{AppEvent, PreviewStatus};
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

use crate::port::PreviewPort;

/// Quiet period before an edit is rendered
pub const DEBOUNCE: Duration = Duration::from_millis(250);

#[derive(Debug)]
enum SyncCommand {
    /// Keystroke in the editor, debounced
    Edit(String),
    /// New formula from OCR, rendered right away
    Push(String),
}

/// Sending side of the sync actor
#[derive(Clone)]
pub struct PreviewSyncHandle {
    tx: AsyncSender<SyncCommand>,
}

impl PreviewSyncHandle {
    pub async fn edit(&self, text: impl Into<String>) {
        if self.tx.send(SyncCommand::Edit(text.into())).await.is_err() {
            tracing::debug!("Preview sync stopped, dropping edit");
        }
    }

    pub async fn push(&self, text: impl Into<String>) {
        if self.tx.send(SyncCommand::Push(text.into())).await.is_err() {
            tracing::debug!("Preview sync stopped, dropping push");
        }
    }
}

/// Keeps the renderer showing the latest formula.
///
/// Text arriving before the renderer has loaded is held and pushed once on
/// load. Afterwards edits are debounced and an explicit push replaces any
/// edit still waiting.
pub struct PreviewSync {
    port: Arc<dyn PreviewPort>,
    rx: AsyncReceiver<SyncCommand>,
    status_tx: Option<AsyncSender<AppEvent>>,
    debounce: Duration,
    ready: bool,
    pending: Option<String>,
    deadline: Option<Instant>,
    last_pushed: Option<String>,
}

impl PreviewSync {
    pub fn new(port: Arc<dyn PreviewPort>, debounce: Duration) -> (Self, PreviewSyncHandle) {
        let (tx, rx) = kanal::bounded_async(64);
        let actor = Self {
            port,
            rx,
            status_tx: None,
            debounce,
            ready: false,
            pending: None,
            deadline: None,
            last_pushed: None,
        };
        (actor, PreviewSyncHandle { tx })
    }

    /// Report renderer lifecycle changes to the controller
    pub fn with_status(mut self, status_tx: AsyncSender<AppEvent>) -> Self {
        self.status_tx = Some(status_tx);
        self
    }

    pub async fn run(mut self, cancel: CancellationToken) {
        let port = self.port.clone();
        let rx = self.rx.clone();
        let mut waiting_for_ready = port.is_alive();

        if waiting_for_ready {
            self.report(PreviewStatus::Loading).await;
        } else {
            self.report(PreviewStatus::Unavailable).await;
        }

        loop {
            let deadline = self.deadline;
            tokio::select! {
                _ = cancel.cancelled() => break,
                command = rx.recv() => match command {
                    Ok(command) => self.handle(command).await,
                    Err(_) => break,
                },
                loaded = port.wait_ready(), if waiting_for_ready => {
                    waiting_for_ready = false;
                    self.on_ready(loaded).await;
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.deadline = None;
                    self.flush_debounced().await;
                }
            }
        }

        tracing::debug!("Preview sync stopped");
    }

    async fn handle(&mut self, command: SyncCommand) {
        match command {
            SyncCommand::Edit(text) => {
                self.pending = Some(text);
                if self.ready {
                    self.deadline = Some(Instant::now() + self.debounce);
                }
            }
            SyncCommand::Push(text) => {
                if self.ready {
                    self.pending = None;
                    self.deadline = None;
                    self.send(text).await;
                } else {
                    self.pending = Some(text);
                }
            }
        }
    }

    async fn on_ready(&mut self, loaded: bool) {
        if !loaded {
            tracing::warn!("Preview renderer exited before loading");
            self.report(PreviewStatus::Unavailable).await;
            return;
        }

        self.ready = true;
        self.report(PreviewStatus::Ready).await;
        if let Some(text) = self.pending.take() {
            self.deadline = None;
            self.send(text).await;
        }
    }

    async fn flush_debounced(&mut self) {
        let Some(text) = self.pending.take() else {
            return;
        };
        if self.last_pushed.as_deref() == Some(text.as_str()) {
            return;
        }
        self.send(text).await;
    }

    async fn send(&mut self, text: String) {
        match self.port.push(&text).await {
            Ok(()) => {
                tracing::debug!("Pushed {} chars to preview", text.len());
                self.last_pushed = Some(text);
            }
            Err(e) => {
                tracing::warn!("Preview push failed: {}", e);
                if self.ready && !self.port.is_alive() {
                    self.ready = false;
                    self.report(PreviewStatus::Unavailable).await;
                }
            }
        }
    }

    async fn report(&self, status: PreviewStatus) {
        if let Some(tx) = &self.status_tx
            && tx.send(AppEvent::PreviewStatus(status)).await.is_err()
        {
            tracing::debug!("Controller gone, preview status {:?} dropped", status);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use latexocr_types::PreviewError;
    use tokio::sync::watch;

    use super::*;

    struct FakePort {
        ready: watch::Sender<bool>,
        pushes: Mutex<Vec<String>>,
    }

    impl FakePort {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                ready: watch::channel(false).0,
                pushes: Mutex::new(Vec::new()),
            })
        }

        fn pushes(&self) -> Vec<String> {
            self.pushes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PreviewPort for FakePort {
        async fn push(&self, latex: &str) -> Result<(), PreviewError> {
            self.pushes.lock().unwrap().push(latex.to_string());
            Ok(())
        }

        async fn query_mathml(&self, _latex: &str, _timeout: Duration) -> Option<String> {
            None
        }

        fn is_alive(&self) -> bool {
            true
        }

        fn is_ready(&self) -> bool {
            *self.ready.borrow()
        }

        async fn wait_ready(&self) -> bool {
            let mut rx = self.ready.subscribe();
            rx.wait_for(|ready| *ready).await.is_ok()
        }

        async fn bring_to_front(&self) -> Result<(), PreviewError> {
            Ok(())
        }

        async fn close(&self) {}
    }

    fn start(port: Arc<FakePort>) -> (PreviewSyncHandle, CancellationToken) {
        let (actor, handle) = PreviewSync::new(port, DEBOUNCE);
        let cancel = CancellationToken::new();
        tokio::spawn(actor.run(cancel.clone()));
        (handle, cancel)
    }

    async fn settle(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn edits_before_ready_flush_once() {
        let port = FakePort::new();
        let (handle, _cancel) = start(port.clone());

        handle.edit("a").await;
        handle.edit("ab").await;
        handle.edit("abc").await;
        settle(1000).await;
        assert!(port.pushes().is_empty());

        port.ready.send_replace(true);
        settle(10).await;
        assert_eq!(port.pushes(), vec!["abc"]);

        settle(1000).await;
        assert_eq!(port.pushes(), vec!["abc"]);
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_edits_is_debounced() {
        let port = FakePort::new();
        port.ready.send_replace(true);
        let (handle, _cancel) = start(port.clone());
        settle(10).await;

        for text in ["x", "x^", "x^2", "x^2+", "x^2+1"] {
            handle.edit(text).await;
            settle(50).await;
        }
        assert!(port.pushes().is_empty());

        settle(300).await;
        assert_eq!(port.pushes(), vec!["x^2+1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_push_supersedes_pending_edit() {
        let port = FakePort::new();
        port.ready.send_replace(true);
        let (handle, _cancel) = start(port.clone());
        settle(10).await;

        handle.edit("typed").await;
        handle.push("from ocr").await;
        settle(10).await;
        assert_eq!(port.pushes(), vec!["from ocr"]);

        settle(1000).await;
        assert_eq!(port.pushes(), vec!["from ocr"]);
    }

    #[tokio::test(start_paused = true)]
    async fn debounced_edit_equal_to_last_push_is_skipped() {
        let port = FakePort::new();
        port.ready.send_replace(true);
        let (handle, _cancel) = start(port.clone());
        settle(10).await;

        handle.push("y").await;
        handle.edit("y").await;
        settle(500).await;
        assert_eq!(port.pushes(), vec!["y"]);
    }

    #[tokio::test(start_paused = true)]
    async fn status_is_reported() {
        let port = FakePort::new();
        let (status_tx, status_rx) = kanal::unbounded_async();
        let (actor, _handle) = PreviewSync::new(port.clone(), DEBOUNCE);
        let cancel = CancellationToken::new();
        tokio::spawn(actor.with_status(status_tx).run(cancel.clone()));

        let first = status_rx.recv().await.unwrap();
        assert!(matches!(first, AppEvent::PreviewStatus(PreviewStatus::Loading)));

        port.ready.send_replace(true);
        let second = status_rx.recv().await.unwrap();
        assert!(matches!(second, AppEvent::PreviewStatus(PreviewStatus::Ready)));

        cancel.cancel();
    }
}
