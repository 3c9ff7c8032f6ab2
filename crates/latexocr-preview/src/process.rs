use std::env;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use kanal::AsyncSender;
use latexocr_types::PreviewError;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::correlate::ResponseMatcher;
use crate::port::PreviewPort;
use crate::protocol::{AppMessage, HostMessage};

const CLOSE_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostState {
    Loading,
    Ready,
    Exited,
}

/// Directory holding bundled resources: `LATEXOCR_RESOURCE_DIR`, else the
/// directory of the running executable, else the source checkout when run
/// through cargo.
pub fn resource_root() -> PathBuf {
    if let Ok(dir) = env::var("LATEXOCR_RESOURCE_DIR")
        && !dir.trim().is_empty()
    {
        return PathBuf::from(dir);
    }

    let exe_dir = executable_dir().unwrap_or_else(|| PathBuf::from("."));
    let checkout = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..");
    find_resource_root(&[exe_dir.clone(), checkout]).unwrap_or(exe_dir)
}

/// First candidate that holds the preview page
pub fn find_resource_root(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates
        .iter()
        .find(|root| page_path(root).is_file())
        .cloned()
}

fn executable_dir() -> Option<PathBuf> {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

/// A bare host name is looked up next to the running executable before
/// falling back to `PATH`
pub fn resolve_command(command: &str) -> PathBuf {
    resolve_command_in(command, executable_dir().as_deref())
}

pub fn resolve_command_in(command: &str, exe_dir: Option<&Path>) -> PathBuf {
    let bare = Path::new(command);
    if bare.components().count() != 1 {
        return bare.to_path_buf();
    }

    if let Some(dir) = exe_dir {
        let sibling = dir.join(format!("{}{}", command, env::consts::EXE_SUFFIX));
        if sibling.is_file() {
            return sibling;
        }
    }
    bare.to_path_buf()
}

/// Preview page inside a resource root
pub fn page_path(root: &Path) -> PathBuf {
    root.join("assets").join("katex_preview.html")
}

/// Renderer host speaking JSON lines over stdin/stdout
pub struct ProcessPreview {
    outgoing: AsyncSender<AppMessage>,
    state: Arc<watch::Sender<HostState>>,
    matcher: ResponseMatcher<Option<String>>,
    child: Mutex<Option<Child>>,
    cancel: CancellationToken,
}

impl ProcessPreview {
    /// Launch `command <page>` and attach to its pipes
    pub fn spawn(
        command: &str,
        page: &Path,
        cancel: CancellationToken,
    ) -> Result<Arc<Self>, PreviewError> {
        let program = resolve_command(command);
        let mut child = Command::new(&program)
            .arg(page)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PreviewError::Spawn(format!("{}: {}", command, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| PreviewError::Spawn("renderer stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| PreviewError::Spawn("renderer stdout unavailable".to_string()))?;

        tracing::info!(
            "Started preview renderer {} with {}",
            program.display(),
            page.display()
        );
        Ok(Self::start(stdout, stdin, Some(child), cancel))
    }

    /// Attach to an already connected host
    pub fn from_io<R, W>(reader: R, writer: W, cancel: CancellationToken) -> Arc<Self>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        Self::start(reader, writer, None, cancel)
    }

    fn start<R, W>(reader: R, writer: W, child: Option<Child>, cancel: CancellationToken) -> Arc<Self>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (out_tx, out_rx) = kanal::bounded_async::<AppMessage>(64);
        let (resp_tx, resp_rx) = kanal::unbounded_async::<(u64, Option<String>)>();
        let (state_tx, _) = watch::channel(HostState::Loading);
        let state = Arc::new(state_tx);

        // Writer
        {
            let state = state.clone();
            let cancel = cancel.clone();
            let mut writer = writer;
            tokio::spawn(async move {
                loop {
                    let message = tokio::select! {
                        _ = cancel.cancelled() => break,
                        message = out_rx.recv() => match message {
                            Ok(message) => message,
                            Err(_) => break,
                        },
                    };

                    let mut line = match serde_json::to_string(&message) {
                        Ok(line) => line,
                        Err(e) => {
                            tracing::error!("Failed to encode preview message: {}", e);
                            continue;
                        }
                    };
                    line.push('\n');

                    let written = async {
                        writer.write_all(line.as_bytes()).await?;
                        writer.flush().await
                    };
                    if let Err(e) = written.await {
                        tracing::warn!("Preview renderer pipe closed: {}", e);
                        state.send_replace(HostState::Exited);
                        break;
                    }
                }
            });
        }

        // Reader
        {
            let state = state.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(reader).lines();
                loop {
                    let line = tokio::select! {
                        _ = cancel.cancelled() => break,
                        line = lines.next_line() => line,
                    };

                    let line = match line {
                        Ok(Some(line)) => line,
                        Ok(None) => break,
                        Err(e) => {
                            tracing::warn!("Failed to read from preview renderer: {}", e);
                            break;
                        }
                    };
                    if line.trim().is_empty() {
                        continue;
                    }

                    match serde_json::from_str::<HostMessage>(&line) {
                        Ok(HostMessage::Loaded) => {
                            let flipped = state.send_if_modified(|s| {
                                if *s == HostState::Loading {
                                    *s = HostState::Ready;
                                    true
                                } else {
                                    false
                                }
                            });
                            if flipped {
                                tracing::info!("Preview renderer loaded");
                            }
                        }
                        Ok(HostMessage::Mathml { id, result }) => {
                            if resp_tx.send((id, result)).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => tracing::debug!("Ignoring renderer output '{}': {}", line, e),
                    }
                }

                state.send_replace(HostState::Exited);
                tracing::info!("Preview renderer disconnected");
            });
        }

        Arc::new(Self {
            outgoing: out_tx,
            state,
            matcher: ResponseMatcher::new(resp_rx),
            child: Mutex::new(child),
            cancel,
        })
    }

    fn host_state(&self) -> HostState {
        *self.state.borrow()
    }

    async fn send(&self, message: AppMessage) -> Result<(), PreviewError> {
        if !self.is_alive() {
            return Err(PreviewError::NotRunning);
        }
        self.outgoing
            .send(message)
            .await
            .map_err(|_| PreviewError::Closed)
    }
}

#[async_trait]
impl PreviewPort for ProcessPreview {
    async fn push(&self, latex: &str) -> Result<(), PreviewError> {
        self.send(AppMessage::SetLatex {
            latex: latex.to_string(),
        })
        .await
    }

    async fn query_mathml(&self, latex: &str, timeout: Duration) -> Option<String> {
        if !self.is_alive() {
            return None;
        }

        let outgoing = self.outgoing.clone();
        let latex = latex.to_string();
        self.matcher
            .round_trip(timeout, move |id| async move {
                outgoing
                    .send(AppMessage::GetMathml { id, latex })
                    .await
                    .is_ok()
            })
            .await
            .flatten()
    }

    fn is_alive(&self) -> bool {
        self.host_state() != HostState::Exited
    }

    fn is_ready(&self) -> bool {
        self.host_state() == HostState::Ready
    }

    async fn wait_ready(&self) -> bool {
        let mut state = self.state.subscribe();
        match state.wait_for(|s| *s != HostState::Loading).await {
            Ok(s) => *s == HostState::Ready,
            Err(_) => false,
        }
    }

    async fn bring_to_front(&self) -> Result<(), PreviewError> {
        self.send(AppMessage::BringToFront).await
    }

    async fn close(&self) {
        if self.send(AppMessage::Close).await.is_ok() {
            let mut state = self.state.subscribe();
            let exited = state.wait_for(|s| *s == HostState::Exited);
            if tokio::time::timeout(CLOSE_GRACE, exited).await.is_err() {
                tracing::debug!("Preview renderer did not exit in time");
            }
        }

        self.cancel.cancel();
        if let Ok(mut guard) = self.child.lock()
            && let Some(child) = guard.as_mut()
            && let Err(e) = child.start_kill()
        {
            tracing::debug!("Preview renderer already gone: {}", e);
        }
        self.state.send_replace(HostState::Exited);
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines};

    use super::*;

    struct FakeHost {
        to_app: DuplexStream,
        from_app: Lines<BufReader<DuplexStream>>,
    }

    impl FakeHost {
        async fn say(&mut self, line: &str) {
            self.to_app.write_all(line.as_bytes()).await.unwrap();
            self.to_app.write_all(b"\n").await.unwrap();
        }

        async fn next(&mut self) -> AppMessage {
            let line = self.from_app.next_line().await.unwrap().unwrap();
            serde_json::from_str(&line).unwrap()
        }
    }

    fn connect() -> (Arc<ProcessPreview>, FakeHost) {
        let (app_read, host_write) = tokio::io::duplex(4096);
        let (host_read, app_write) = tokio::io::duplex(4096);
        let preview = ProcessPreview::from_io(app_read, app_write, CancellationToken::new());
        let host = FakeHost {
            to_app: host_write,
            from_app: BufReader::new(host_read).lines(),
        };
        (preview, host)
    }

    #[tokio::test]
    async fn becomes_ready_on_loaded() {
        let (preview, mut host) = connect();
        assert!(preview.is_alive());
        assert!(!preview.is_ready());

        host.say(r#"{"type":"loaded"}"#).await;
        assert!(preview.wait_ready().await);
        assert!(preview.is_ready());
    }

    #[tokio::test]
    async fn push_writes_set_latex() {
        let (preview, mut host) = connect();
        preview.push("x^2").await.unwrap();
        assert_eq!(
            host.next().await,
            AppMessage::SetLatex {
                latex: "x^2".to_string()
            }
        );
    }

    #[tokio::test]
    async fn mathml_round_trip_skips_stale_ids() {
        let (preview, mut host) = connect();
        host.say(r#"{"type":"loaded"}"#).await;

        let host_task = tokio::spawn(async move {
            let AppMessage::GetMathml { id, latex } = host.next().await else {
                panic!("expected get_mathml");
            };
            assert_eq!(latex, "a+b");
            host.say(&format!(r#"{{"type":"mathml","id":{},"result":"old"}}"#, id + 100))
                .await;
            host.say(&format!(r#"{{"type":"mathml","id":{},"result":"<math/>"}}"#, id))
                .await;
            host
        });

        let mathml = preview.query_mathml("a+b", Duration::from_secs(5)).await;
        assert_eq!(mathml.as_deref(), Some("<math/>"));
        host_task.await.unwrap();
    }

    #[tokio::test]
    async fn null_result_is_none() {
        let (preview, mut host) = connect();
        let host_task = tokio::spawn(async move {
            let AppMessage::GetMathml { id, .. } = host.next().await else {
                panic!("expected get_mathml");
            };
            host.say(&format!(r#"{{"type":"mathml","id":{},"result":null}}"#, id))
                .await;
            host
        });

        assert_eq!(preview.query_mathml("?", Duration::from_secs(5)).await, None);
        host_task.await.unwrap();
    }

    #[tokio::test]
    async fn disconnected_host_degrades_softly() {
        let (preview, host) = connect();
        drop(host);

        assert!(!preview.wait_ready().await);
        assert!(!preview.is_alive());
        assert_eq!(preview.push("x").await, Err(PreviewError::NotRunning));
        assert_eq!(preview.query_mathml("x", Duration::from_secs(1)).await, None);
    }

    #[test]
    fn page_lives_under_assets() {
        assert_eq!(
            page_path(Path::new("/opt/latexocr")),
            Path::new("/opt/latexocr/assets/katex_preview.html")
        );
    }

    #[test]
    fn source_checkout_holds_the_page() {
        let checkout = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..");
        let missing = env::temp_dir().join(format!("latexocr-{}", uuid::Uuid::new_v4()));

        let root = find_resource_root(&[missing, checkout.clone()]).unwrap();
        assert_eq!(root, checkout);
        assert!(page_path(&root).is_file());
        assert!(find_resource_root(&[]).is_none());
    }

    #[test]
    fn host_next_to_the_executable_wins() {
        let dir = env::temp_dir().join(format!("latexocr-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let host = dir.join(format!("latexocr-preview{}", env::consts::EXE_SUFFIX));

        assert_eq!(
            resolve_command_in("latexocr-preview", Some(&dir)),
            PathBuf::from("latexocr-preview")
        );
        std::fs::write(&host, b"").unwrap();
        assert_eq!(resolve_command_in("latexocr-preview", Some(&dir)), host);

        // explicit paths are used as given
        let explicit = dir.join("other-host");
        assert_eq!(
            resolve_command_in(explicit.to_str().unwrap(), Some(&dir)),
            explicit
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
