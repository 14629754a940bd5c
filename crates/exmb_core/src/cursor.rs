//! Rollback stack for the discovery cursor.

use std::collections::VecDeque;

/// Previously seen post full names, most recent last.
///
/// With a capacity set, pushing onto a full stack evicts the oldest entry.
///
/// # Examples
///
/// ```
/// use exmb_core::CursorStack;
///
/// let mut stack = CursorStack::with_capacity(2);
/// stack.push("t3_a");
/// stack.push("t3_b");
/// stack.push("t3_c");
///
/// assert_eq!(stack.len(), 2);
/// assert_eq!(stack.pop().as_deref(), Some("t3_c"));
/// assert_eq!(stack.pop().as_deref(), Some("t3_b"));
/// assert!(stack.pop().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorStack {
    entries: VecDeque<String>,
    capacity: Option<usize>,
}

impl CursorStack {
    /// Unbounded stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stack holding at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: Some(capacity),
        }
    }

    /// Push a full name. Repeating the current top is a no-op.
    pub fn push(&mut self, full_name: impl Into<String>) {
        let full_name = full_name.into();
        if self.entries.back() == Some(&full_name) {
            return;
        }
        if let Some(capacity) = self.capacity {
            if capacity == 0 {
                return;
            }
            while self.entries.len() >= capacity {
                self.entries.pop_front();
            }
        }
        self.entries.push_back(full_name);
    }

    /// Pop the most recent entry.
    pub fn pop(&mut self) -> Option<String> {
        self.entries.pop_back()
    }

    /// Most recent entry.
    pub fn peek(&self) -> Option<&str> {
        self.entries.back().map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `full_name` is anywhere on the stack.
    pub fn contains(&self, full_name: &str) -> bool {
        self.entries.iter().any(|e| e == full_name)
    }

    /// Entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}
