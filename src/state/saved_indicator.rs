//! Transient "saved" indicator.

use std::time::Duration;
use web_time::Instant;

/// Flag that turns on after a successful save and turns itself off again
/// after a fixed duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SavedIndicator {
    duration: Duration,
    shown_since: Option<Instant>,
}

impl SavedIndicator {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            shown_since: None,
        }
    }

    /// Show the indicator. Ignored while it is already showing.
    ///
    /// Returns whether the indicator was switched on.
    pub fn trigger(&mut self, now: Instant) -> bool {
        if self.is_visible(now) {
            return false;
        }
        self.shown_since = Some(now);
        true
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        self.shown_since
            .is_some_and(|since| now.saturating_duration_since(since) < self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_for_duration() {
        let start = Instant::now();
        let mut indicator = SavedIndicator::new(Duration::from_secs(2));
        assert!(!indicator.is_visible(start));
        assert!(indicator.trigger(start));
        assert!(indicator.is_visible(start + Duration::from_millis(1999)));
        assert!(!indicator.is_visible(start + Duration::from_secs(2)));
    }

    #[test]
    fn test_trigger_while_visible_does_not_extend() {
        let start = Instant::now();
        let mut indicator = SavedIndicator::new(Duration::from_secs(2));
        indicator.trigger(start);
        assert!(!indicator.trigger(start + Duration::from_secs(1)));
        assert!(!indicator.is_visible(start + Duration::from_millis(2500)));
        assert!(indicator.trigger(start + Duration::from_secs(3)));
    }
}
