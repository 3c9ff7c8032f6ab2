use latexocr_preview::{AppMessage, HostMessage};

/// One command from the controller. Blank or malformed lines are skipped.
pub fn parse_command(line: &str) -> Option<AppMessage> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str(line) {
        Ok(message) => Some(message),
        Err(e) => {
            tracing::warn!("[HOST] Ignoring bad command: {}", e);
            None
        }
    }
}

/// Page script for a command, `None` for the ones the window handles itself
pub fn command_script(message: &AppMessage) -> Option<String> {
    match message {
        AppMessage::SetLatex { latex } => {
            Some(format!("window.setLatex({});", serde_json::to_string(latex).ok()?))
        }
        AppMessage::GetMathml { id, latex } => Some(format!(
            "window.__answerMathML({}, {});",
            id,
            serde_json::to_string(latex).ok()?
        )),
        AppMessage::BringToFront | AppMessage::Close => None,
    }
}

/// Check a message posted by the page and re-encode it as one stdout line
pub fn ipc_line(body: &str) -> Option<String> {
    let message: HostMessage = match serde_json::from_str(body) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!("[HOST] Ignoring page message: {}", e);
            return None;
        }
    };
    serde_json::to_string(&message).ok()
}
