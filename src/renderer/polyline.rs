//! Screen-space geometry for the line overlay

use glam::Vec2;

use crate::sim::PathPoint;

/// Canvas-space shapes for one frame of the line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineGeometry {
    /// Connected runs of vertices, split wherever a point was culled
    pub segments: Vec<Vec<Vec2>>,
    /// Leading point (drawn as the moving head)
    pub head: Option<Vec2>,
    /// Seed point, only while it is still on screen and the line has moved
    pub start: Option<Vec2>,
}

/// Centre of a grid cell in canvas pixels
#[inline]
pub fn cell_center(column: usize, row: usize, scroll_offset: usize, cell_size: f32) -> Vec2 {
    Vec2::new(
        (column as f32 - scroll_offset as f32 + 0.5) * cell_size,
        (row as f32 + 0.5) * cell_size,
    )
}

/// Project the path onto a canvas `width` pixels wide.
///
/// Points more than one cell outside the canvas are culled.
pub fn line_geometry(
    path: &[PathPoint],
    scroll_offset: usize,
    cell_size: f32,
    width: f32,
) -> LineGeometry {
    let Some(last) = path.last() else {
        return LineGeometry::default();
    };

    let mut segments: Vec<Vec<Vec2>> = Vec::new();
    let mut prev_kept = false;
    for point in path {
        let pos = cell_center(point.column, point.row, scroll_offset, cell_size);
        if pos.x < -cell_size || pos.x > width + cell_size {
            prev_kept = false;
            continue;
        }
        match segments.last_mut() {
            Some(segment) if prev_kept => segment.push(pos),
            _ => segments.push(vec![pos]),
        }
        prev_kept = true;
    }

    let first = path[0];
    let start = cell_center(first.column, first.row, scroll_offset, cell_size);
    LineGeometry {
        segments,
        head: Some(cell_center(last.column, last.row, scroll_offset, cell_size)),
        start: (path.len() > 1 && start.x >= 0.0 && start.x <= width).then_some(start),
    }
}
