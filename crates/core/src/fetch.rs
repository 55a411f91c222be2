//! Stale-result guard for asynchronous view loads.
//!
//! Every load takes a [`Ticket`] from the view's [`ViewGeneration`]. When the
//! result arrives it is applied only if the ticket is still current; starting
//! a newer load or tearing the view down makes older tickets stale.

/// Generation counter owned by a single view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewGeneration {
    current: u64,
}

/// Proof that a load was started at a given generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl ViewGeneration {
    #[must_use]
    pub const fn new() -> Self {
        Self { current: 0 }
    }

    /// Start a load, making every earlier ticket stale.
    pub const fn begin(&mut self) -> Ticket {
        self.current = self.current.wrapping_add(1);
        Ticket(self.current)
    }

    /// Whether `ticket` belongs to the latest load and the view is still up.
    #[must_use]
    pub const fn is_current(&self, ticket: Ticket) -> bool {
        self.current == ticket.0
    }

    /// Tear the view down: no outstanding ticket will be accepted.
    pub const fn invalidate(&mut self) {
        self.current = self.current.wrapping_add(1);
    }

    /// Pass `value` through if `ticket` is current, otherwise drop it.
    pub fn accept<T>(&self, ticket: Ticket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            tracing::debug!(ticket = ticket.0, current = self.current, "Discarding stale view result");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_ticket_is_current() {
        let mut generation = ViewGeneration::new();
        let ticket = generation.begin();
        assert!(generation.is_current(ticket));
        assert_eq!(generation.accept(ticket, 7), Some(7));
    }

    #[test]
    fn test_newer_load_supersedes_older() {
        let mut generation = ViewGeneration::new();
        let first = generation.begin();
        let second = generation.begin();

        assert!(!generation.is_current(first));
        assert_eq!(generation.accept(first, "old"), None);
        assert_eq!(generation.accept(second, "new"), Some("new"));
    }

    #[test]
    fn test_teardown_discards_outstanding() {
        let mut generation = ViewGeneration::new();
        let ticket = generation.begin();
        generation.invalidate();

        assert_eq!(generation.accept(ticket, ()), None);
    }
}
