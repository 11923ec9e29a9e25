use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open byte range `[start, end)` into the original module source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "inverted span {start}..{end}");
        Span { start, end }
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `offset` lies strictly between the two ends.
    pub fn strictly_contains(&self, offset: u32) -> bool {
        self.start < offset && offset < self.end
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn start_usize(&self) -> usize {
        self.start as usize
    }

    pub fn end_usize(&self) -> usize {
        self.end as usize
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_is_exclusive_at_boundaries() {
        let a = Span::new(0, 5);
        let b = Span::new(5, 9);
        let c = Span::new(4, 6);

        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(b.overlaps(&c));
    }

    #[test]
    fn test_strictly_contains() {
        let span = Span::new(2, 6);
        assert!(!span.strictly_contains(2));
        assert!(span.strictly_contains(3));
        assert!(!span.strictly_contains(6));
    }

    #[test]
    fn test_empty_span() {
        let span = Span::new(3, 3);
        assert!(span.is_empty());
        assert_eq!(span.len(), 0);
        assert!(!span.strictly_contains(3));
    }
}
