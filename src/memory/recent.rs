//! Bounded FIFO of recently recommended titles

use std::collections::VecDeque;

pub const DEFAULT_RECENT_CAPACITY: usize = 20;

/// Fixed-capacity queue: pushing past capacity evicts the oldest title
#[derive(Debug, Clone)]
pub struct RecentTitles {
    titles: VecDeque<String>,
    capacity: usize,
}

impl RecentTitles {
    pub fn new(capacity: usize) -> Self {
        Self {
            titles: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a title and return whatever was evicted to stay within capacity
    pub fn push(&mut self, title: impl Into<String>) -> Vec<String> {
        self.titles.push_back(title.into());

        let mut evicted = Vec::new();
        while self.titles.len() > self.capacity {
            if let Some(oldest) = self.titles.pop_front() {
                evicted.push(oldest);
            }
        }
        evicted
    }

    pub fn contains(&self, title: &str) -> bool {
        self.titles.iter().any(|t| t == title)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.titles.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.titles.clear();
    }
}

impl Default for RecentTitles {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_within_capacity() {
        let mut recent = RecentTitles::new(3);
        assert!(recent.push("a").is_empty());
        assert!(recent.push("b").is_empty());

        assert_eq!(recent.len(), 2);
        assert!(recent.contains("a"));
        assert!(!recent.contains("c"));
    }

    #[test]
    fn test_oldest_evicted_first() {
        let mut recent = RecentTitles::default();

        for i in 0..25 {
            recent.push(format!("Song {}", i));
            assert!(recent.len() <= DEFAULT_RECENT_CAPACITY);
        }

        assert_eq!(recent.len(), 20);
        assert!(!recent.contains("Song 4"));
        assert!(recent.contains("Song 5"));
        assert_eq!(recent.iter().next(), Some("Song 5"));
        assert_eq!(recent.iter().last(), Some("Song 24"));
    }

    #[test]
    fn test_push_reports_eviction() {
        let mut recent = RecentTitles::new(1);
        recent.push("first");
        assert_eq!(recent.push("second"), vec!["first".to_string()]);
    }

    #[test]
    fn test_clear() {
        let mut recent = RecentTitles::new(2);
        recent.push("x");
        recent.clear();
        assert!(recent.is_empty());
        assert_eq!(recent.capacity(), 2);
    }
}
