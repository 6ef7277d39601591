//! Fetch queue for cover resolution.
//!
//! An ordered list of filenames waiting for artwork, plus the one filename
//! currently being resolved. A filename is never present twice, counting the
//! in-flight slot, and at most one item is in flight at a time.

use std::collections::VecDeque;

/// FIFO of representative filenames with a single in-flight slot.
#[derive(Debug, Clone, Default)]
pub struct FetchQueue {
    pending: VecDeque<String>,
    in_flight: Option<String>,
}

impl FetchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `filename` is waiting or being resolved.
    pub fn contains(&self, filename: &str) -> bool {
        self.in_flight.as_deref() == Some(filename) || self.pending.iter().any(|f| f == filename)
    }

    /// Append a filename. Returns false if it was already queued.
    pub fn push_back(&mut self, filename: impl Into<String>) -> bool {
        let filename = filename.into();
        if self.contains(&filename) {
            return false;
        }
        self.pending.push_back(filename);
        true
    }

    /// Move (or insert) a filename to the head of the pending list.
    ///
    /// Returns false if it is already in flight; the running resolution is
    /// never disturbed.
    pub fn push_front(&mut self, filename: impl Into<String>) -> bool {
        let filename = filename.into();
        if self.in_flight.as_deref() == Some(filename.as_str()) {
            return false;
        }
        self.pending.retain(|f| *f != filename);
        self.pending.push_front(filename);
        true
    }

    /// Take the head of the queue into the in-flight slot.
    ///
    /// Returns `None` while another item is in flight or when nothing waits.
    pub fn begin_next(&mut self) -> Option<String> {
        if self.in_flight.is_some() {
            return None;
        }
        let next = self.pending.pop_front()?;
        self.in_flight = Some(next.clone());
        Some(next)
    }

    /// Release the in-flight slot held by `filename`.
    pub fn finish(&mut self, filename: &str) {
        if self.in_flight.as_deref() == Some(filename) {
            self.in_flight = None;
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<&str> {
        self.in_flight.as_deref()
    }

    /// Filenames waiting, in processing order.
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }

    /// Waiting and in-flight filenames.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.in_flight.as_deref().into_iter().chain(self.pending())
    }

    /// Number of filenames waiting (excluding the in-flight one).
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True when nothing is waiting and nothing is in flight.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.in_flight.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue = FetchQueue::new();
        queue.push_back("a.mp3");
        queue.push_back("b.mp3");

        assert_eq!(queue.begin_next().as_deref(), Some("a.mp3"));
        queue.finish("a.mp3");
        assert_eq!(queue.begin_next().as_deref(), Some("b.mp3"));
        queue.finish("b.mp3");
        assert!(queue.is_idle());
    }

    #[test]
    fn test_no_duplicates() {
        let mut queue = FetchQueue::new();
        assert!(queue.push_back("a.mp3"));
        assert!(!queue.push_back("a.mp3"));
        assert_eq!(queue.len(), 1);

        queue.begin_next();
        // In flight still counts as queued
        assert!(!queue.push_back("a.mp3"));
        assert!(queue.contains("a.mp3"));
    }

    #[test]
    fn test_single_in_flight() {
        let mut queue = FetchQueue::new();
        queue.push_back("a.mp3");
        queue.push_back("b.mp3");

        assert_eq!(queue.begin_next().as_deref(), Some("a.mp3"));
        assert!(queue.begin_next().is_none());
        assert!(queue.is_busy());

        // Finishing something else doesn't free the slot
        queue.finish("b.mp3");
        assert!(queue.is_busy());
    }

    #[test]
    fn test_push_front_moves_existing() {
        let mut queue = FetchQueue::new();
        queue.push_back("a.mp3");
        queue.push_back("b.mp3");
        queue.push_back("c.mp3");

        assert!(queue.push_front("c.mp3"));
        assert_eq!(queue.pending().collect::<Vec<_>>(), vec!["c.mp3", "a.mp3", "b.mp3"]);

        assert!(queue.push_front("d.mp3"));
        assert_eq!(queue.len(), 4);
    }

    #[test]
    fn test_push_front_leaves_in_flight_alone() {
        let mut queue = FetchQueue::new();
        queue.push_back("a.mp3");
        queue.push_back("b.mp3");
        queue.begin_next();

        assert!(!queue.push_front("a.mp3"));
        assert_eq!(queue.all().collect::<Vec<_>>(), vec!["a.mp3", "b.mp3"]);
    }
}
