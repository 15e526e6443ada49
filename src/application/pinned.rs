//! In-memory representation of a scope's pinned items.

/// Pinned items of one scope, in the order the source returned them.
#[derive(Debug, Clone, PartialEq)]
pub struct PinnedSet<T> {
    items: Vec<T>,
    count: u64,
}

impl<T> PinnedSet<T> {
    /// Build a set whose count is the number of items supplied.
    pub fn new(items: Vec<T>) -> Self {
        let count = items.len() as u64;
        Self { items, count }
    }

    /// Build a set with a separately reported count.
    ///
    /// The count is authoritative for pagination arithmetic even when it
    /// disagrees with `items.len()`.
    pub fn with_count(items: Vec<T>, count: u64) -> Self {
        Self { items, count }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn loaded(&self) -> u64 {
        self.items.len() as u64
    }

    pub fn is_complete(&self) -> bool {
        self.loaded() == self.count
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Pinned items visible on a page: `take` items after the first `skip`.
    ///
    /// Bounds are clamped to what was actually loaded.
    pub fn window(&self, skip: u64, take: u64) -> &[T] {
        let len = self.items.len();
        let start = usize::try_from(skip).unwrap_or(usize::MAX).min(len);
        let end = start
            .saturating_add(usize::try_from(take).unwrap_or(usize::MAX))
            .min(len);
        &self.items[start..end]
    }
}
