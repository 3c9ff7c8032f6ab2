use latexocr_core::extract_pure_mathml;
use latexocr_preview::{MATHML_TIMEOUT, PreviewPort};
use latexocr_types::CopyFormat;

use crate::context::AppContext;
use crate::state::AppState;

pub async fn handle_copy_latex(state: &AppState, ctx: &AppContext) {
    let latex = state.formula.trim();
    if latex.is_empty() {
        ctx.ui.status("No LaTeX to copy.").await;
        return;
    }

    if write_clipboard(ctx, latex).await {
        ctx.ui.status("LaTeX copied.").await;
    }
}

pub async fn handle_copy_mathml(state: &AppState, ctx: &AppContext) {
    let latex = state.formula.trim();
    if latex.is_empty() {
        ctx.ui.status("No LaTeX to convert.").await;
        return;
    }

    match fetch_mathml(ctx.services.preview.as_ref(), latex).await {
        Ok(mathml) => {
            if write_clipboard(ctx, &mathml).await {
                ctx.ui.status("MathML copied.").await;
            }
        }
        Err(reason) => ctx.ui.status(reason).await,
    }
}

/// Copy after a successful OCR in the configured format. A MathML copy that
/// cannot be produced falls back to LaTeX.
pub async fn auto_copy(state: &AppState, ctx: &AppContext) {
    let latex = state.formula.trim();
    if state.config.copy_format == CopyFormat::Latex || latex.is_empty() {
        handle_copy_latex(state, ctx).await;
        return;
    }

    match fetch_mathml(ctx.services.preview.as_ref(), latex).await {
        Ok(mathml) => {
            if write_clipboard(ctx, &mathml).await {
                ctx.ui.status("MathML copied.").await;
            }
        }
        Err(reason) => {
            tracing::info!("[COPY] {} Falling back to LaTeX", reason);
            if write_clipboard(ctx, latex).await {
                ctx.ui.status(format!("{} LaTeX copied.", reason)).await;
            }
        }
    }
}

/// Presentation MathML for `latex`, or the status explaining why not
async fn fetch_mathml(preview: &dyn PreviewPort, latex: &str) -> Result<String, &'static str> {
    if !preview.is_alive() {
        return Err("Preview not available.");
    }
    if !preview.is_ready() {
        return Err("Preview not ready.");
    }

    preview
        .query_mathml(latex, MATHML_TIMEOUT)
        .await
        .as_deref()
        .and_then(extract_pure_mathml)
        .ok_or("MathML not ready.")
}

async fn write_clipboard(ctx: &AppContext, text: &str) -> bool {
    match ctx.services.clipboard.set_text(text) {
        Ok(()) => {
            tracing::debug!("[COPY] {} chars", text.len());
            true
        }
        Err(e) => {
            tracing::warn!("[COPY] {}", e);
            ctx.ui.status(e.to_string()).await;
            false
        }
    }
}
