//! Scrolling grid store
//!
//! Cells are addressed by absolute column. Every row is kept the same
//! length and only ever grows, so an absolute column keeps its cell for
//! the whole run. Old columns are never evicted.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A single grid cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub marked: bool,
}

/// Per-cell marked state over an unbounded column range
#[derive(Debug, Clone, PartialEq)]
pub struct GridStore {
    rows: Vec<Vec<Cell>>,
    /// Populated column count, tracked apart from `rows` so a zero-row grid still grows
    width: usize,
    growth_batch: usize,
    /// (row, screen column) positions the player has marked at least once
    revealed: BTreeSet<(usize, usize)>,
}

impl GridStore {
    pub fn new(rows: usize, initial_width: usize, growth_batch: usize) -> Self {
        Self {
            rows: vec![vec![Cell::default(); initial_width]; rows],
            width: initial_width,
            growth_batch: growth_batch.max(1),
            revealed: BTreeSet::new(),
        }
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Populated column count (shared by every row)
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row)?.get(column)
    }

    pub fn is_marked(&self, row: usize, column: usize) -> bool {
        self.cell(row, column).is_some_and(|c| c.marked)
    }

    /// Grow every row in whole batches until `column` is populated.
    /// Returns true if the grid grew.
    pub fn ensure_capacity(&mut self, column: usize) -> bool {
        let mut grew = false;
        while column >= self.width() {
            for row in &mut self.rows {
                row.extend(std::iter::repeat_n(Cell::default(), self.growth_batch));
            }
            self.width += self.growth_batch;
            grew = true;
        }
        if grew {
            log::debug!("Grid grew to {} columns", self.width());
        }
        grew
    }

    /// Flip a cell and record its screen position as revealed.
    /// Returns the new marked state, or None if the cell is not populated.
    pub fn flip(&mut self, row: usize, column: usize, screen_column: usize) -> Option<bool> {
        let cell = self.rows.get_mut(row)?.get_mut(column)?;
        cell.marked = !cell.marked;
        self.revealed.insert((row, screen_column));
        Some(cell.marked)
    }

    /// Mark every listed row at `column` that is not marked yet.
    /// Out-of-range rows are skipped. Returns how many cells changed.
    pub fn mark_batch(&mut self, column: usize, rows: &[usize], screen_column: usize) -> usize {
        self.ensure_capacity(column);
        let mut marked = 0;
        for &row in rows {
            let Some(cell) = self.rows.get_mut(row).map(|r| &mut r[column]) else {
                continue;
            };
            if !cell.marked {
                cell.marked = true;
                self.revealed.insert((row, screen_column));
                marked += 1;
            }
        }
        marked
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.len()
    }

    /// Share of the visible area the player has ever marked, in percent
    pub fn coverage(&self, visible_columns: usize) -> f64 {
        let area = self.row_count() * visible_columns;
        if area == 0 {
            return 0.0;
        }
        (self.revealed.len() as f64 / area as f64 * 100.0).min(100.0)
    }

    /// Copy out `len` columns starting at `start` for every row
    pub fn window(&self, start: usize, len: usize) -> Vec<Vec<Cell>> {
        self.rows
            .iter()
            .map(|row| {
                (start..start + len)
                    .map(|c| row.get(c).copied().unwrap_or_default())
                    .collect()
            })
            .collect()
    }
}

/// The window of columns currently rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub scroll_offset: usize,
    pub visible_columns: usize,
}

impl Viewport {
    pub fn new(visible_columns: usize) -> Self {
        Self {
            scroll_offset: 0,
            visible_columns,
        }
    }

    /// First column past the right edge
    #[inline]
    pub fn right_edge(&self) -> usize {
        self.scroll_offset + self.visible_columns
    }

    #[inline]
    pub fn contains(&self, column: usize) -> bool {
        column >= self.scroll_offset && column < self.right_edge()
    }

    /// Viewport-relative column, if the column is on screen
    pub fn screen_column(&self, column: usize) -> Option<usize> {
        self.contains(column).then(|| column - self.scroll_offset)
    }

    /// Leading column past which the viewport must scroll
    #[inline]
    pub fn scroll_threshold(&self, lookahead_margin: usize) -> usize {
        self.right_edge().saturating_sub(lookahead_margin)
    }
}

/// Scroll the viewport forward once the line gets within `lookahead_margin`
/// columns of its right edge, then make sure the grid covers the new window.
/// Returns true if the viewport moved.
pub fn follow_line(
    viewport: &mut Viewport,
    grid: &mut GridStore,
    leading: usize,
    lookahead_margin: usize,
    scroll_step: usize,
) -> bool {
    if leading <= viewport.scroll_threshold(lookahead_margin) {
        return false;
    }
    viewport.scroll_offset += scroll_step;
    grid.ensure_capacity(viewport.right_edge() - 1);
    true
}
