//! Preview window for latexocr. Renders the KaTeX page in a webview and
//! speaks the JSON line protocol of `latexocr_preview` over stdin/stdout.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[cfg_attr(not(any(windows, target_os = "macos")), allow(dead_code))]
mod bridge;
#[cfg(any(windows, target_os = "macos"))]
mod window;

#[derive(Parser, Debug)]
#[command(name = "latexocr-preview", version, about = "KaTeX preview window for latexocr")]
struct Cli {
    /// Preview page to load
    page: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries the protocol
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let html = std::fs::read_to_string(&cli.page)
        .with_context(|| format!("failed to read {}", cli.page.display()))?;
    tracing::info!("[HOST] Loading {}", cli.page.display());

    show(&html)
}

#[cfg(any(windows, target_os = "macos"))]
fn show(html: &str) -> anyhow::Result<()> {
    window::run(html)
}

/// No webview backend is built on other desktops. The controller sees the
/// exit and keeps running with the preview unavailable.
#[cfg(not(any(windows, target_os = "macos")))]
fn show(_html: &str) -> anyhow::Result<()> {
    anyhow::bail!("no webview backend on this platform; point preview_command at another renderer")
}
