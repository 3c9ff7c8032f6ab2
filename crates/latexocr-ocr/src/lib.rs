mod capture;
mod client;
mod encode;
mod hotkey;
mod request;

pub use capture::{
    PREVIEW_MAX_HEIGHT, PREVIEW_MAX_WIDTH, XcapCapture, capture_selection, crop_selection,
    downscale_for_preview, load_image_file, pick_screen, target_screen,
};
pub use client::{OcrSettings, Transcriber, VisionClient};
pub use encode::{encode_image, to_data_uri};
pub use hotkey::{HotkeyManager, forward_presses, parse_chord};
pub use request::{INSTRUCTION, RequestShape};
