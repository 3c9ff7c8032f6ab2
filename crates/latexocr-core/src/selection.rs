use latexocr_types::SelectionRect;

/// Smallest accepted width and height, in logical pixels
pub const MIN_SELECTION: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    Selected(SelectionRect),
    Cancelled,
}

/// Rubber-band drag state for the selection overlay
#[derive(Debug, Default)]
pub struct SelectionTracker {
    origin: Option<(i32, i32)>,
    current: Option<(i32, i32)>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, x: i32, y: i32) {
        self.origin = Some((x, y));
        self.current = Some((x, y));
    }

    /// Update the live rectangle, ignored until a press happened
    pub fn drag(&mut self, x: i32, y: i32) -> Option<SelectionRect> {
        let origin = self.origin?;
        self.current = Some((x, y));
        Some(SelectionRect::from_points(origin, (x, y)))
    }

    /// Finish the gesture. Too small, or no press at all, counts as a cancel.
    pub fn release(&mut self, x: i32, y: i32) -> SelectionOutcome {
        let Some(origin) = self.origin.take() else {
            return SelectionOutcome::Cancelled;
        };
        self.current = None;

        let rect = SelectionRect::from_points(origin, (x, y));
        if rect.width() < MIN_SELECTION || rect.height() < MIN_SELECTION {
            tracing::debug!("Selection too small: {}x{}", rect.width(), rect.height());
            return SelectionOutcome::Cancelled;
        }

        SelectionOutcome::Selected(rect)
    }

    pub fn cancel(&mut self) -> SelectionOutcome {
        self.origin = None;
        self.current = None;
        SelectionOutcome::Cancelled
    }

    /// Rectangle currently being dragged, for drawing the rubber band
    pub fn current(&self) -> Option<SelectionRect> {
        Some(SelectionRect::from_points(self.origin?, self.current?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_up_and_left_is_normalized() {
        let mut tracker = SelectionTracker::new();
        tracker.press(100, 80);
        tracker.drag(60, 50);
        assert_eq!(
            tracker.current(),
            Some(SelectionRect {
                left: 60,
                top: 50,
                right: 100,
                bottom: 80
            })
        );
        assert_eq!(
            tracker.release(10, 20),
            SelectionOutcome::Selected(SelectionRect {
                left: 10,
                top: 20,
                right: 100,
                bottom: 80
            })
        );
        assert_eq!(tracker.current(), None);
    }

    #[test]
    fn tiny_rectangles_cancel() {
        for (dx, dy) in [(0, 0), (1, 50), (50, 1), (-1, -40)] {
            let mut tracker = SelectionTracker::new();
            tracker.press(10, 10);
            assert_eq!(tracker.release(10 + dx, 10 + dy), SelectionOutcome::Cancelled);
        }

        let mut tracker = SelectionTracker::new();
        tracker.press(10, 10);
        assert!(matches!(tracker.release(12, 12), SelectionOutcome::Selected(_)));
    }

    #[test]
    fn release_without_press_cancels() {
        let mut tracker = SelectionTracker::new();
        assert_eq!(tracker.drag(5, 5), None);
        assert_eq!(tracker.release(50, 50), SelectionOutcome::Cancelled);
    }

    #[test]
    fn cancel_clears_gesture() {
        let mut tracker = SelectionTracker::new();
        tracker.press(0, 0);
        tracker.drag(30, 30);
        assert_eq!(tracker.cancel(), SelectionOutcome::Cancelled);
        assert_eq!(tracker.release(40, 40), SelectionOutcome::Cancelled);
    }
}
