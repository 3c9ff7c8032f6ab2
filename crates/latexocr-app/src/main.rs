use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use latexocr_config::{ConfigStore, SessionOverrides};
use latexocr_io::ArboardClipboard;
use latexocr_ocr::{VisionClient, XcapCapture};
use latexocr_preview::{
    DEBOUNCE, OfflinePreview, PreviewPort, PreviewSync, ProcessPreview, page_path, resource_root,
};
use latexocr_types::AppEvent;
use latexocr_ui::{SlintHotkeys, SlintRegionSelector};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod context;
mod controller;
mod events;
mod state;
mod status;

#[cfg(test)]
mod tests;

use self::context::Services;
use self::controller::AppController;

/// Screenshot a formula and get LaTeX back
#[derive(Debug, Parser)]
#[command(name = "latexocr", version)]
struct Cli {
    /// Settings file, defaults to the per-user config directory
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Transcribe this image file on startup
    #[arg(long)]
    image: Option<PathBuf>,

    /// Renderer host executable for the live preview
    #[arg(long)]
    preview_command: Option<String>,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(atty::is(atty::Stream::Stdout))
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .init();
    }
}

/// Start the renderer host, or fall back to a preview that is never ready
fn start_preview(command: &str, cancel: CancellationToken) -> Arc<dyn PreviewPort> {
    let page = page_path(&resource_root());
    if !page.exists() {
        tracing::warn!("Preview page missing at {}", page.display());
        return Arc::new(OfflinePreview);
    }

    match ProcessPreview::spawn(command, &page, cancel) {
        Ok(preview) => preview,
        Err(e) => {
            tracing::warn!("{}", e);
            Arc::new(OfflinePreview)
        }
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let store = cli
        .config
        .clone()
        .map(ConfigStore::new)
        .unwrap_or_else(ConfigStore::default_location);
    let file_config = store.load();
    let overrides = SessionOverrides::from_env().with_preview_command(cli.preview_command.clone());
    let config = overrides.apply(file_config.clone());
    tracing::info!(
        "latexocr v{} using {}",
        env!("CARGO_PKG_VERSION"),
        store.path().display()
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("latexocr-worker")
        .build()
        .context("failed to build tokio runtime")?;
    let _guard = runtime.enter();

    let controller = AppController::new();
    let preview = start_preview(&config.preview_command, controller.cancel_token().child_token());
    let (preview_sync, preview_sync_handle) = PreviewSync::new(preview.clone(), DEBOUNCE);

    latexocr_ui::init(controller.ui_to_app_tx()).context("failed to build the UI")?;

    let services = Services {
        selector: Arc::new(SlintRegionSelector),
        capture: Arc::new(XcapCapture),
        transcriber: Arc::new(VisionClient::new()),
        hotkeys: Arc::new(SlintHotkeys),
        clipboard: Arc::new(ArboardClipboard::new()),
        preview: preview.clone(),
        preview_sync: preview_sync_handle,
        store,
    };
    let mut tasks = controller.spawn_tasks(file_config, overrides, services, preview_sync);

    if let Some(image) = cli.image {
        let tx = controller.ui_to_app_tx();
        runtime.spawn(async move {
            if tx.send(AppEvent::TranscribeFile(image)).await.is_err() {
                tracing::warn!("Controller gone before the startup image was queued");
            }
        });
    }

    let ui_result = latexocr_ui::run(controller.app_to_ui_rx());

    controller.shutdown();
    runtime.block_on(async {
        preview.close().await;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!("Task failed: {:#}", e),
                Err(e) => tracing::error!("Task panicked: {}", e),
            }
        }
    });

    tracing::info!("Shutdown complete");
    ui_result
}
