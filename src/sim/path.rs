//! The red line: an append-only path of grid points
//!
//! Columns start at 0 and grow by exactly one per tick, so a point's index
//! in the path is also its column.

use serde::{Deserialize, Serialize};

/// A vertex of the line, in absolute grid coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathPoint {
    pub column: usize,
    pub row: usize,
}

/// Ordered, append-only sequence of path points.
/// Only built through `seeded`, so it is never empty.
#[derive(Debug, Clone, Serialize)]
pub struct Path {
    points: Vec<PathPoint>,
}

impl Path {
    /// Create a path seeded with its first point at column 0
    pub fn seeded(row: usize) -> Self {
        Self {
            points: vec![PathPoint { column: 0, row }],
        }
    }

    /// Most recently appended point
    #[inline]
    pub fn leading(&self) -> PathPoint {
        // Seeded on construction and never popped
        self.points[self.points.len() - 1]
    }

    /// Append the next point one column to the right
    pub fn advance(&mut self, row: usize) -> PathPoint {
        let point = PathPoint {
            column: self.leading().column + 1,
            row,
        };
        self.points.push(point);
        point
    }

    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_path() {
        let path = Path::seeded(5);
        assert_eq!(path.points(), &[PathPoint { column: 0, row: 5 }]);
        assert_eq!(path.leading(), PathPoint { column: 0, row: 5 });
    }

    #[test]
    fn test_advance_increments_column() {
        let mut path = Path::seeded(5);
        let p = path.advance(2);
        assert_eq!(p, PathPoint { column: 1, row: 2 });
        path.advance(9);
        assert_eq!(path.leading().column, 2);
        assert_eq!(path.points()[0].row, 5);
        let columns: Vec<usize> = path.points().iter().map(|p| p.column).collect();
        assert_eq!(columns, vec![0, 1, 2]);
    }
}
