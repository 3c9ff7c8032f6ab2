//! Live formula preview rendered by an external host process.
//!
//! The controller talks to the renderer through [`PreviewPort`]. Edits are
//! funnelled through [`PreviewSync`], which holds text back until the
//! renderer has loaded and debounces bursts of keystrokes.

mod correlate;
mod port;
mod process;
mod protocol;
mod sync;

pub use correlate::ResponseMatcher;
pub use port::{OfflinePreview, PreviewPort};
pub use process::{
    ProcessPreview, find_resource_root, page_path, resolve_command, resolve_command_in,
    resource_root,
};
pub use protocol::{AppMessage, HostMessage};
pub use sync::{DEBOUNCE, PreviewSync, PreviewSyncHandle};

/// Upper bound for a MathML round trip
pub const MATHML_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(6);
