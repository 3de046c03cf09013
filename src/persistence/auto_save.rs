//! Debounced saving of table lists.
//!
//! Every user change to the tables of an image schedules a save. Changes
//! arriving within the debounce delay replace the scheduled save, so a burst
//! of edits produces a single write. Each save handed out carries a token;
//! only the completion of the save currently in flight is accepted.

use std::fmt::Display;
use std::time::Duration;
use web_time::Instant;

use crate::constants::SAVE_DEBOUNCE;
use crate::model::Table;

/// A save the caller has to perform.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveTicket {
    pub token: u64,
    pub image_name: String,
    pub tables: Vec<Table>,
}

#[derive(Debug, Clone, PartialEq)]
struct PendingSave {
    image_name: String,
    tables: Vec<Table>,
    last_change: Instant,
}

/// Schedules table saves with debouncing.
#[derive(Debug)]
pub struct SaveScheduler {
    /// Debounce delay (wait this long after last change before saving).
    debounce_delay: Duration,

    /// Revision of the tables last seen by [`observe`](Self::observe).
    last_revision: Option<u64>,

    /// Latest unsaved state, waiting for the debounce delay.
    pending: Option<PendingSave>,

    /// Unsaved states of images the user has moved away from.
    ready: Vec<PendingSave>,

    /// Token of the save currently in flight.
    in_flight: Option<u64>,

    next_token: u64,
}

impl SaveScheduler {
    pub fn new(debounce_delay: Duration) -> Self {
        Self {
            debounce_delay,
            last_revision: None,
            pending: None,
            ready: Vec::new(),
            in_flight: None,
            next_token: 0,
        }
    }

    /// Look at the current tables and schedule a save if they changed.
    ///
    /// The first call only records the revision. Returns whether a save was
    /// scheduled.
    pub fn observe(
        &mut self,
        revision: u64,
        image_name: &str,
        tables: &[Table],
        now: Instant,
    ) -> bool {
        let previous = self.last_revision.replace(revision);
        if previous.is_none() || previous == Some(revision) {
            return false;
        }

        // Edits to the previous image must not be lost.
        if let Some(pending) = self
            .pending
            .take()
            .filter(|pending| pending.image_name != image_name)
        {
            self.ready.push(pending);
        }
        self.pending = Some(PendingSave {
            image_name: image_name.to_string(),
            tables: tables.to_vec(),
            last_change: now,
        });
        log::trace!("Auto-save: scheduled save of {}", image_name);
        true
    }

    /// Whether there are changes that have not been written yet.
    pub fn is_dirty(&self) -> bool {
        self.pending.is_some() || !self.ready.is_empty() || self.in_flight.is_some()
    }

    /// Hand out the next save that is due, if any.
    ///
    /// Saves are handed out one at a time; nothing is returned while a save
    /// is in flight.
    pub fn poll(&mut self, now: Instant) -> Option<SaveTicket> {
        if self.in_flight.is_some() {
            return None;
        }
        let save = if self.ready.is_empty() {
            let due = self.pending.as_ref().is_some_and(|pending| {
                now.saturating_duration_since(pending.last_change) >= self.debounce_delay
            });
            if !due {
                return None;
            }
            self.pending.take()?
        } else {
            self.ready.remove(0)
        };

        self.next_token += 1;
        self.in_flight = Some(self.next_token);
        Some(SaveTicket {
            token: self.next_token,
            image_name: save.image_name,
            tables: save.tables,
        })
    }

    /// Report the outcome of a save handed out by [`poll`](Self::poll).
    ///
    /// Returns true when the save went through and nothing newer is waiting
    /// for the same image, i.e. when the saved indicator should be shown.
    /// A failed save is scheduled again unless newer changes superseded it.
    pub fn complete<E: Display>(
        &mut self,
        ticket: SaveTicket,
        result: Result<(), E>,
        now: Instant,
    ) -> bool {
        if self.in_flight != Some(ticket.token) {
            log::debug!("Auto-save: ignoring stale save {}", ticket.token);
            return false;
        }
        self.in_flight = None;

        let superseded = self
            .pending
            .iter()
            .chain(&self.ready)
            .any(|pending| pending.image_name == ticket.image_name);

        match result {
            Ok(()) => {
                log::info!("Saved tables of {}", ticket.image_name);
                !superseded
            }
            Err(e) => {
                log::warn!("Saving tables of {} failed: {}", ticket.image_name, e);
                if !superseded {
                    self.ready.push(PendingSave {
                        image_name: ticket.image_name,
                        tables: ticket.tables,
                        last_change: now,
                    });
                }
                false
            }
        }
    }
}

impl Default for SaveScheduler {
    fn default() -> Self {
        Self::new(SAVE_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn tables(width: f32) -> Vec<Table> {
        vec![Table::new(
            Point::new(0.0, 0.0),
            Point::new(width, 50.0),
            0.0,
        )]
    }

    fn scheduler_at(start: Instant) -> SaveScheduler {
        let mut scheduler = SaveScheduler::default();
        scheduler.observe(0, "p1.png", &[], start);
        scheduler
    }

    #[test]
    fn test_initial_observation_does_not_save() {
        let start = Instant::now();
        let scheduler = scheduler_at(start);
        assert!(!scheduler.is_dirty());
    }

    #[test]
    fn test_debounce_merges_bursts() {
        let start = Instant::now();
        let mut scheduler = scheduler_at(start);
        assert!(scheduler.observe(1, "p1.png", &tables(100.0), start));
        assert!(scheduler.poll(start + Duration::from_millis(100)).is_none());

        let later = start + Duration::from_millis(100);
        assert!(scheduler.observe(2, "p1.png", &tables(120.0), later));
        assert!(scheduler.poll(later + Duration::from_millis(149)).is_none());

        let ticket = scheduler
            .poll(later + Duration::from_millis(150))
            .expect("due");
        assert_eq!(ticket.tables, tables(120.0));
        assert!(scheduler.poll(later + Duration::from_secs(1)).is_none());
    }

    #[test]
    fn test_unchanged_revision_is_ignored() {
        let start = Instant::now();
        let mut scheduler = scheduler_at(start);
        assert!(!scheduler.observe(0, "p1.png", &tables(100.0), start));
        assert!(!scheduler.is_dirty());
    }

    #[test]
    fn test_superseded_save_does_not_signal() {
        let start = Instant::now();
        let mut scheduler = scheduler_at(start);
        scheduler.observe(1, "p1.png", &tables(100.0), start);
        let due = start + Duration::from_millis(200);
        let ticket = scheduler.poll(due).expect("due");

        scheduler.observe(2, "p1.png", &tables(120.0), due);
        assert!(!scheduler.complete(ticket, Ok::<(), String>(()), due));

        let next = scheduler
            .poll(due + Duration::from_millis(200))
            .expect("newer save");
        assert!(scheduler.complete(next, Ok::<(), String>(()), due));
        assert!(!scheduler.is_dirty());
    }

    #[test]
    fn test_stale_token_is_ignored() {
        let start = Instant::now();
        let mut scheduler = scheduler_at(start);
        scheduler.observe(1, "p1.png", &tables(100.0), start);
        let mut ticket = scheduler
            .poll(start + Duration::from_millis(200))
            .expect("due");
        ticket.token += 1;
        assert!(!scheduler.complete(ticket, Ok::<(), String>(()), start));
        assert!(scheduler.is_dirty());
    }

    #[test]
    fn test_edits_of_previous_image_are_kept() {
        let start = Instant::now();
        let mut scheduler = scheduler_at(start);
        scheduler.observe(1, "p1.png", &tables(100.0), start);
        scheduler.observe(2, "p2.png", &tables(80.0), start);

        let first = scheduler.poll(start).expect("previous image first");
        assert_eq!(first.image_name, "p1.png");
        assert!(scheduler.complete(first, Ok::<(), String>(()), start));

        let second = scheduler
            .poll(start + Duration::from_millis(150))
            .expect("due");
        assert_eq!(second.image_name, "p2.png");
    }

    #[test]
    fn test_failed_save_is_retried() {
        let start = Instant::now();
        let mut scheduler = scheduler_at(start);
        scheduler.observe(1, "p1.png", &tables(100.0), start);
        let ticket = scheduler
            .poll(start + Duration::from_millis(200))
            .expect("due");
        assert!(!scheduler.complete(ticket, Err("disk full"), start));
        let retry = scheduler.poll(start).expect("retry");
        assert_eq!(retry.tables, tables(100.0));
    }
}
