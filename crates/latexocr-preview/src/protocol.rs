use serde::{Deserialize, Serialize};

/// Lines written by the renderer host on its stdout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostMessage {
    Loaded,
    Mathml { id: u64, result: Option<String> },
}

/// Lines written to the renderer host's stdin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppMessage {
    SetLatex { latex: String },
    GetMathml { id: u64, latex: String },
    BringToFront,
    Close,
}
