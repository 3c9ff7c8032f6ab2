use std::path::Path;

use image::imageops::{self, FilterType};
use image::RgbaImage;
use latexocr_core::geometry::{fit_within, physical_crop};
use latexocr_core::ports::ScreenCapture;
use latexocr_types::{CaptureError, CapturedImage, ScreenInfo, Selection};
use xcap::Monitor;

/// Thumbnail box of the captured-image card
pub const PREVIEW_MAX_WIDTH: u32 = 620;
pub const PREVIEW_MAX_HEIGHT: u32 = 420;

/// Screen capture through xcap
#[derive(Debug, Default, Clone, Copy)]
pub struct XcapCapture;

impl ScreenCapture for XcapCapture {
    fn capture(&self, selection: &Selection) -> Result<CapturedImage, CaptureError> {
        capture_selection(selection)
    }

    fn load_file(&self, path: &Path) -> Result<CapturedImage, CaptureError> {
        load_image_file(path)
    }
}

/// Monitor under the mouse pointer, else the primary one, else the first
pub fn target_screen() -> Result<ScreenInfo, CaptureError> {
    let monitors = Monitor::all().map_err(|e| CaptureError::Backend(e.to_string()))?;
    let screens: Vec<(ScreenInfo, bool)> = monitors
        .iter()
        .map(|m| (screen_info(m), m.is_primary()))
        .collect();

    pick_screen(&screens, cursor_position).ok_or(CaptureError::NoScreen)
}

/// Choose among `(screen, is_primary)` pairs. The cursor is only queried
/// when there is more than one screen.
pub fn pick_screen(
    screens: &[(ScreenInfo, bool)],
    cursor: impl FnOnce() -> Option<(i32, i32)>,
) -> Option<ScreenInfo> {
    if let [(only, _)] = screens {
        return Some(*only);
    }

    if let Some((x, y)) = cursor() {
        if let Some((screen, _)) = screens.iter().find(|(s, _)| contains(s, x, y)) {
            return Some(*screen);
        }
        tracing::debug!("No monitor at cursor ({}, {})", x, y);
    }

    screens
        .iter()
        .find(|(_, primary)| *primary)
        .or(screens.first())
        .map(|(screen, _)| *screen)
}

fn contains(screen: &ScreenInfo, x: i32, y: i32) -> bool {
    let (x, y) = (i64::from(x), i64::from(y));
    let left = i64::from(screen.x);
    let top = i64::from(screen.y);
    x >= left
        && x < left + i64::from(screen.width)
        && y >= top
        && y < top + i64::from(screen.height)
}

fn screen_info(monitor: &Monitor) -> ScreenInfo {
    ScreenInfo {
        id: monitor.id(),
        x: monitor.x(),
        y: monitor.y(),
        width: monitor.width(),
        height: monitor.height(),
        scale_factor: monitor.scale_factor(),
    }
}

/// Capture the monitor a selection was made on and crop to the selection
pub fn capture_selection(selection: &Selection) -> Result<CapturedImage, CaptureError> {
    let monitors = Monitor::all().map_err(|e| CaptureError::Backend(e.to_string()))?;
    let monitor = monitors
        .iter()
        .find(|m| m.id() == selection.screen.id)
        .or(monitors.first())
        .ok_or(CaptureError::NoScreen)?;

    let screen = monitor
        .capture_image()
        .map_err(|e| CaptureError::Backend(e.to_string()))?;

    crop_selection(
        screen.width(),
        screen.height(),
        screen.into_raw(),
        selection,
    )
}

/// Crop a full-screen RGBA buffer to the selection, in physical pixels
pub fn crop_selection(
    width: u32,
    height: u32,
    rgba: Vec<u8>,
    selection: &Selection,
) -> Result<CapturedImage, CaptureError> {
    let buffer = RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| CaptureError::Backend("screen buffer size mismatch".to_string()))?;

    let region = physical_crop(
        &selection.rect,
        selection.screen.scale_factor,
        width,
        height,
    )
    .ok_or(CaptureError::OutOfBounds)?;

    tracing::debug!(
        "Cropping {}x{} at ({}, {}) from {}x{} screen",
        region.width,
        region.height,
        region.x,
        region.y,
        width,
        height
    );

    let cropped =
        imageops::crop_imm(&buffer, region.x, region.y, region.width, region.height).to_image();
    Ok(into_captured(cropped))
}

pub fn load_image_file(path: &Path) -> Result<CapturedImage, CaptureError> {
    let image = image::open(path).map_err(|e| CaptureError::ReadImage {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(into_captured(image.to_rgba8()))
}

/// Thumbnail that fits the captured-image card, aspect ratio preserved
pub fn downscale_for_preview(image: &CapturedImage) -> CapturedImage {
    let (w, h) = fit_within(
        image.width,
        image.height,
        PREVIEW_MAX_WIDTH,
        PREVIEW_MAX_HEIGHT,
    );
    if (w, h) == (image.width, image.height) {
        return image.clone();
    }

    match RgbaImage::from_raw(image.width, image.height, image.rgba.clone()) {
        Some(buffer) => into_captured(imageops::resize(&buffer, w, h, FilterType::Triangle)),
        None => {
            tracing::warn!("Captured image buffer has the wrong size, skipping thumbnail");
            image.clone()
        }
    }
}

fn into_captured(image: RgbaImage) -> CapturedImage {
    CapturedImage {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    }
}

#[cfg(windows)]
fn cursor_position() -> Option<(i32, i32)> {
    use windows::Win32::Foundation::POINT;
    use windows::Win32::UI::WindowsAndMessaging::GetCursorPos;

    let mut point = POINT::default();
    unsafe {
        if GetCursorPos(&mut point).is_ok() {
            Some((point.x, point.y))
        } else {
            None
        }
    }
}

/// Global pointer location in points, the unit of the monitor bounds here
#[cfg(target_os = "macos")]
fn cursor_position() -> Option<(i32, i32)> {
    use core_graphics::event::CGEvent;
    use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};

    let source = CGEventSource::new(CGEventSourceStateID::HIDSystemState).ok()?;
    let point = CGEvent::new(source).ok()?.location();
    Some((point.x.floor() as i32, point.y.floor() as i32))
}

/// Wayland exposes no global pointer position to regular clients, so Linux
/// and other desktops always fall back to the primary monitor.
#[cfg(not(any(windows, target_os = "macos")))]
fn cursor_position() -> Option<(i32, i32)> {
    None
}
