//! 2D canvas painter for the grid and the line

use std::f64::consts::TAU;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::polyline::line_geometry;
use crate::sim::{PathPoint, ViewportSnapshot};

const GRID_LINE: &str = "rgba(255, 255, 255, 0.12)";
const MARKED: &str = "#f5c542";
const PASSED: &str = "rgba(0, 0, 0, 0.25)";
const LINE: &str = "red";
const LINE_GLOW: &str = "rgba(255, 0, 0, 0.5)";
const HEAD_HALO: &str = "rgba(255, 0, 0, 0.3)";
const START: &str = "blue";

pub struct CanvasPainter {
    ctx: CanvasRenderingContext2d,
    /// Canvas size in CSS pixels
    pub size: (f32, f32),
}

impl CanvasPainter {
    pub fn new(ctx: CanvasRenderingContext2d, width: f32, height: f32) -> Self {
        ctx.set_line_cap("round");
        ctx.set_line_join("round");
        Self {
            ctx,
            size: (width, height),
        }
    }

    pub fn clear(&self) {
        self.ctx
            .clear_rect(0.0, 0.0, self.size.0 as f64, self.size.1 as f64);
    }

    /// Repaint the visible window. Columns at or behind `leading` are shaded.
    pub fn paint(&self, view: &ViewportSnapshot, path: &[PathPoint]) -> Result<(), JsValue> {
        self.clear();
        let cell = view.cell_size as f64;
        let leading = path.last().map_or(0, |p| p.column);

        for (row, cells) in view.cells.iter().enumerate() {
            for (screen_col, c) in cells.iter().enumerate() {
                let x = screen_col as f64 * cell;
                let y = row as f64 * cell;
                if c.marked {
                    self.ctx.set_fill_style_str(MARKED);
                    self.ctx.fill_rect(x + 1.0, y + 1.0, cell - 2.0, cell - 2.0);
                }
                if view.scroll_offset + screen_col <= leading {
                    self.ctx.set_fill_style_str(PASSED);
                    self.ctx.fill_rect(x, y, cell, cell);
                }
                self.ctx.set_stroke_style_str(GRID_LINE);
                self.ctx.set_line_width(1.0);
                self.ctx.stroke_rect(x, y, cell, cell);
            }
        }

        let geometry = line_geometry(path, view.scroll_offset, view.cell_size, self.size.0);

        self.ctx.save();
        self.ctx.set_stroke_style_str(LINE);
        self.ctx.set_line_width(cell * 0.1);
        self.ctx.set_shadow_color(LINE_GLOW);
        self.ctx.set_shadow_blur(5.0);
        self.ctx.begin_path();
        for segment in &geometry.segments {
            let mut points = segment.iter();
            if let Some(first) = points.next() {
                self.ctx.move_to(first.x as f64, first.y as f64);
            }
            for p in points {
                self.ctx.line_to(p.x as f64, p.y as f64);
            }
        }
        self.ctx.stroke();
        self.ctx.restore();

        if let Some(head) = geometry.head {
            self.dot(head.x as f64, head.y as f64, cell * 0.9, HEAD_HALO)?;
            self.dot(head.x as f64, head.y as f64, cell * 0.3, LINE)?;
        }
        if let Some(start) = geometry.start {
            self.dot(start.x as f64, start.y as f64, cell * 0.25, START)?;
        }
        Ok(())
    }

    fn dot(&self, x: f64, y: f64, radius: f64, color: &str) -> Result<(), JsValue> {
        self.ctx.begin_path();
        self.ctx.set_fill_style_str(color);
        self.ctx.arc(x, y, radius, 0.0, TAU)?;
        self.ctx.fill();
        Ok(())
    }
}
