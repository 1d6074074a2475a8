//! Deterministic game core
//!
//! All gameplay logic lives here. The game is a pure function of its
//! inputs:
//! - Row events from the feed adapter
//! - Player clicks and control buttons
//! - No rendering, network or platform dependencies

pub mod grid;
pub mod path;
pub mod state;
pub mod tick;

pub use grid::{Cell, GridStore, Viewport, follow_line};
pub use path::{Path, PathPoint};
pub use state::{GameEvent, GamePhase, GameState, Layout, Run, RunSummary, ViewportSnapshot};
pub use tick::{on_row_event, push_row};
