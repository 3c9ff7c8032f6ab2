use latexocr_types::SelectionRect;

/// Pixel region inside a physical screen buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Scale a logical rectangle to physical pixels and clamp it to the buffer.
/// Returns `None` when nothing of it lies on the screen.
pub fn physical_crop(
    rect: &SelectionRect,
    scale_factor: f32,
    screen_width: u32,
    screen_height: u32,
) -> Option<CropRegion> {
    let scale = if scale_factor.is_finite() && scale_factor > 0.0 {
        f64::from(scale_factor)
    } else {
        1.0
    };

    let to_px = |v: i32, max: u32| -> i64 {
        let px = (f64::from(v) * scale).round() as i64;
        px.clamp(0, i64::from(max))
    };

    let left = to_px(rect.left, screen_width);
    let top = to_px(rect.top, screen_height);
    let right = to_px(rect.right, screen_width);
    let bottom = to_px(rect.bottom, screen_height);

    if right <= left || bottom <= top {
        return None;
    }

    Some(CropRegion {
        x: left as u32,
        y: top as u32,
        width: (right - left) as u32,
        height: (bottom - top) as u32,
    })
}

/// Largest size with the same aspect ratio that fits in `max_w` x `max_h`.
/// Images already inside the box keep their size.
pub fn fit_within(width: u32, height: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if width == 0 || height == 0 || (width <= max_w && height <= max_h) {
        return (width, height);
    }

    let ratio = f64::min(
        f64::from(max_w) / f64::from(width),
        f64::from(max_h) / f64::from(height),
    );
    let w = ((f64::from(width) * ratio).round() as u32).max(1);
    let h = ((f64::from(height) * ratio).round() as u32).max(1);
    (w, h)
}
