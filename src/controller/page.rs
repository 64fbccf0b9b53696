//! Page identity.

use std::fmt;

/// Stage-wide unique page identity.
///
/// Gears key their stored values by `PageId`, never by page index, so
/// inserting or removing pages does not shift stored values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(u32);

impl PageId {
    /// The raw counter value.
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Monotonic page id source, owned by the stage.
#[derive(Debug, Default)]
pub struct PageIdAllocator {
    next: u32,
}

impl PageIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh id.
    pub fn allocate(&mut self) -> PageId {
        let id = PageId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids issued since creation or the last reset.
    pub fn issued(&self) -> u32 {
        self.next
    }

    /// Restart numbering. Only safe when no controller holds an older id,
    /// e.g. between tests.
    pub fn reset(&mut self) {
        self.next = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_ordered() {
        let mut alloc = PageIdAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        assert_ne!(a, b);
        assert!(a < b);
        assert_eq!(alloc.issued(), 2);
        assert_eq!(b.to_string(), "p1");
    }

    #[test]
    fn reset_restarts() {
        let mut alloc = PageIdAllocator::new();
        alloc.allocate();
        alloc.reset();
        assert_eq!(alloc.allocate().raw(), 0);
    }
}
