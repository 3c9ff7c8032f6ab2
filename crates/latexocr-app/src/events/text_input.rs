use crate::context::AppContext;
use crate::state::AppState;

/// Track the edited formula and re-render after the debounce window
pub async fn handle_latex_edited(state: &mut AppState, ctx: &AppContext, text: String) {
    tracing::trace!("[EDIT] {} chars", text.len());
    state.formula = text.clone();
    ctx.services.preview_sync.edit(text).await;
}
