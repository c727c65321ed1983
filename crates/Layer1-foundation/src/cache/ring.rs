//! Bounded FIFO ring buffer
//!
//! Newest items are appended at the back; once the optional maximum is
//! exceeded the oldest item falls off the front.

use std::collections::VecDeque;

/// Append-only buffer with an optional length cap
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    /// `None` = never evict
    max_len: Option<usize>,
}

impl<T> RingBuffer<T> {
    pub fn new(max_len: Option<usize>) -> Self {
        let initial = max_len.unwrap_or(0).min(1024);
        Self {
            items: VecDeque::with_capacity(initial),
            max_len,
        }
    }

    /// Buffer that never drops anything
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Append an item, returning the oldest one if it had to be dropped
    pub fn push(&mut self, item: T) -> Option<T> {
        self.items.push_back(item);
        match self.max_len {
            Some(max) if self.items.len() > max => self.items.pop_front(),
            _ => None,
        }
    }

    /// Newest-first search; the most recently pushed match wins
    pub fn find_newest<F>(&self, mut predicate: F) -> Option<&T>
    where
        F: FnMut(&T) -> bool,
    {
        self.items.iter().rev().find(|item| predicate(item))
    }

    /// Drop every item the predicate rejects, returning how many went
    pub fn retain<F>(&mut self, f: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let before = self.items.len();
        self.items.retain(f);
        before - self.items.len()
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn max_len(&self) -> Option<usize> {
        self.max_len
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_oldest_past_max() {
        let mut ring = RingBuffer::new(Some(3));

        for i in 1..=3 {
            assert!(ring.push(i).is_none());
        }
        assert_eq!(ring.push(4), Some(1));
        assert_eq!(ring.push(5), Some(2));

        assert_eq!(ring.iter().copied().collect::<Vec<_>>(), vec![3, 4, 5]);
    }

    #[test]
    fn test_unbounded_keeps_everything() {
        let mut ring = RingBuffer::unbounded();

        for i in 0..5000 {
            assert!(ring.push(i).is_none());
        }
        assert_eq!(ring.len(), 5000);
        assert_eq!(ring.max_len(), None);
    }

    #[test]
    fn test_find_newest_prefers_latest() {
        let mut ring = RingBuffer::new(Some(10));

        ring.push((1, "old"));
        ring.push((2, "other"));
        ring.push((1, "new"));

        assert_eq!(ring.find_newest(|(id, _)| *id == 1), Some(&(1, "new")));
        assert_eq!(ring.find_newest(|(id, _)| *id == 9), None);
    }

    #[test]
    fn test_retain_counts_removed() {
        let mut ring = RingBuffer::new(None);
        ring.push(1);
        ring.push(2);
        ring.push(1);

        assert_eq!(ring.retain(|x| *x != 1), 2);
        assert_eq!(ring.len(), 1);
    }
}
