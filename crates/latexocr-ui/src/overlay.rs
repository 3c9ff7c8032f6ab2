use std::time::Duration;

use latexocr_core::selection::SelectionOutcome;
use latexocr_types::{ScreenInfo, Selection};
use slint::{ComponentHandle, PhysicalPosition, PhysicalSize};
use tokio::sync::oneshot;

use crate::state::{PendingSelection, UiShell};

/// Time for the compositor to remove the overlay before pixels are grabbed
pub(crate) const SETTLE_DELAY: Duration = Duration::from_millis(150);

pub(crate) fn open(
    shell: &mut UiShell,
    screen: ScreenInfo,
    reply: oneshot::Sender<Option<Selection>>,
) {
    if let Some(previous) = shell.pending.take() {
        let _ = previous.reply.send(None);
    }
    shell.tracker.cancel();
    shell.overlay.set_has_selection(false);

    let window = shell.overlay.window();
    window.set_position(PhysicalPosition::new(screen.x, screen.y));
    window.set_size(PhysicalSize::new(screen.width, screen.height));

    if let Err(e) = shell.overlay.show() {
        tracing::error!("Failed to show selection overlay: {}", e);
        let _ = reply.send(None);
        return;
    }
    shell.overlay.invoke_grab_focus();

    tracing::debug!("Selection overlay on screen {} ({}x{})", screen.id, screen.width, screen.height);
    shell.pending = Some(PendingSelection { screen, reply });
}

pub(crate) fn on_pressed(shell: &mut UiShell, x: f32, y: f32) {
    let (x, y) = point(x, y);
    shell.tracker.press(x, y);
    draw(shell);
}

pub(crate) fn on_dragged(shell: &mut UiShell, x: f32, y: f32) {
    let (x, y) = point(x, y);
    if shell.tracker.drag(x, y).is_some() {
        draw(shell);
    }
}

pub(crate) fn on_released(shell: &mut UiShell, x: f32, y: f32) {
    let (x, y) = point(x, y);
    let outcome = shell.tracker.release(x, y);
    finish(shell, outcome);
}

pub(crate) fn on_cancelled(shell: &mut UiShell) {
    let outcome = shell.tracker.cancel();
    finish(shell, outcome);
}

fn draw(shell: &UiShell) {
    match shell.tracker.current() {
        Some(rect) => {
            shell.overlay.set_sel_x(rect.left as f32);
            shell.overlay.set_sel_y(rect.top as f32);
            shell.overlay.set_sel_width(rect.width() as f32);
            shell.overlay.set_sel_height(rect.height() as f32);
            shell.overlay.set_has_selection(true);
        }
        None => shell.overlay.set_has_selection(false),
    }
}

/// Hide the overlay and answer the waiting selector after it is gone
fn finish(shell: &mut UiShell, outcome: SelectionOutcome) {
    shell.overlay.set_has_selection(false);
    if let Err(e) = shell.overlay.hide() {
        tracing::warn!("Failed to hide selection overlay: {}", e);
    }

    let Some(pending) = shell.pending.take() else {
        return;
    };

    let selection = match outcome {
        SelectionOutcome::Selected(rect) => Some(Selection {
            rect,
            screen: ScreenInfo {
                scale_factor: shell.overlay.window().scale_factor(),
                ..pending.screen
            },
        }),
        SelectionOutcome::Cancelled => None,
    };

    let reply = pending.reply;
    slint::Timer::single_shot(SETTLE_DELAY, move || {
        let _ = reply.send(selection);
    });
}

/// Logical overlay coordinates to whole pixels
fn point(x: f32, y: f32) -> (i32, i32) {
    (x.round() as i32, y.round() as i32)
}
