//! Rendering module
//!
//! Geometry is computed natively so it can be tested; painting onto the
//! browser's 2D canvas only exists on wasm.

pub mod polyline;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasPainter;
pub use polyline::{LineGeometry, cell_center, line_geometry};
