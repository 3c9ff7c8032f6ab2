use std::time::Duration;

use async_trait::async_trait;
use latexocr_types::PreviewError;

/// Rendering surface for the current formula.
///
/// Every operation degrades softly once the renderer is gone.
#[async_trait]
pub trait PreviewPort: Send + Sync {
    /// Render `latex`, fire and forget
    async fn push(&self, latex: &str) -> Result<(), PreviewError>;

    /// MathML for `latex`, `None` on timeout or when the renderer is gone
    async fn query_mathml(&self, latex: &str, timeout: Duration) -> Option<String>;

    fn is_alive(&self) -> bool;

    fn is_ready(&self) -> bool;

    /// Resolves once the renderer reports it loaded (`true`)
    /// or exits before that (`false`)
    async fn wait_ready(&self) -> bool;

    async fn bring_to_front(&self) -> Result<(), PreviewError>;

    async fn close(&self);
}

/// Stand-in used when no renderer could be started
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflinePreview;

#[async_trait]
impl PreviewPort for OfflinePreview {
    async fn push(&self, _latex: &str) -> Result<(), PreviewError> {
        Err(PreviewError::NotRunning)
    }

    async fn query_mathml(&self, _latex: &str, _timeout: Duration) -> Option<String> {
        None
    }

    fn is_alive(&self) -> bool {
        false
    }

    fn is_ready(&self) -> bool {
        false
    }

    async fn wait_ready(&self) -> bool {
        false
    }

    async fn bring_to_front(&self) -> Result<(), PreviewError> {
        Err(PreviewError::NotRunning)
    }

    async fn close(&self) {}
}
