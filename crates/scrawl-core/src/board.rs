//! Ordered board state.

use crate::segment::Segment;
use serde::{Deserialize, Serialize};

/// The ordered list of every segment drawn so far.
///
/// The server holds the authoritative copy; each client keeps a mirror so
/// the surface can be redrawn after a resize or a full-state replay.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Board {
    segments: Vec<Segment>,
}

impl Board {
    /// Create a new empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a board from an already-ordered segment list.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Append a segment, preserving draw order.
    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Remove all segments.
    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// Replace the whole board with a new ordered list.
    pub fn replace(&mut self, segments: Vec<Segment>) {
        self.segments = segments;
    }

    /// Segments in draw order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn seg(x: f64) -> Segment {
        Segment::new(Point::new(x, 0.0), Point::new(x + 1.0, 1.0), "#000", 2.0)
    }

    #[test]
    fn test_push_preserves_order() {
        let mut board = Board::new();
        board.push(seg(0.0));
        board.push(seg(1.0));
        board.push(seg(2.0));

        let xs: Vec<f64> = board.segments().iter().map(|s| s.x0).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_clear() {
        let mut board = Board::from_segments(vec![seg(0.0), seg(1.0)]);
        assert_eq!(board.len(), 2);
        board.clear();
        assert!(board.is_empty());
    }

    #[test]
    fn test_replace() {
        let mut board = Board::from_segments(vec![seg(0.0)]);
        board.replace(vec![seg(5.0), seg(6.0)]);
        assert_eq!(board.len(), 2);
        assert_eq!(board.segments()[0].x0, 5.0);
    }
}
