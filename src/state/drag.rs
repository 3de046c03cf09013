//! Pointer drag tracking.

use std::time::Duration;
use web_time::Instant;

/// Whether a handle is being dragged, and since when.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragState {
    started_at: Option<Instant>,
}

impl DragState {
    pub fn begin(&mut self, now: Instant) {
        self.started_at = Some(now);
        log::trace!("Drag started");
    }

    pub fn end(&mut self) {
        if self.started_at.take().is_some() {
            log::trace!("Drag ended");
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.started_at.is_some()
    }

    /// Whether pointer moves should be applied yet.
    ///
    /// Moves during the first `delay` of a drag are dropped so that a plain
    /// click on a handle does not nudge it.
    pub fn should_apply(&self, now: Instant, delay: Duration) -> bool {
        self.started_at
            .is_some_and(|start| now.saturating_duration_since(start) > delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_dragging_by_default() {
        let drag = DragState::default();
        assert!(!drag.is_dragging());
        assert!(!drag.should_apply(Instant::now(), Duration::ZERO));
    }

    #[test]
    fn test_moves_gated_by_delay() {
        let start = Instant::now();
        let mut drag = DragState::default();
        drag.begin(start);
        let delay = Duration::from_millis(100);
        assert!(!drag.should_apply(start + Duration::from_millis(50), delay));
        assert!(drag.should_apply(start + Duration::from_millis(101), delay));
    }

    #[test]
    fn test_end_stops_drag() {
        let start = Instant::now();
        let mut drag = DragState::default();
        drag.begin(start);
        drag.end();
        assert!(!drag.is_dragging());
        assert!(!drag.should_apply(start + Duration::from_secs(1), Duration::ZERO));
    }
}
