//! Tick Line - a price-driven line grid game
//!
//! Core modules:
//! - `sim`: Deterministic game core (grid store, path driver, controls)
//! - `feed`: Market stream adapter and offline simulated feed
//! - `session`: Game plus its single live feed link
//! - `renderer`: Line geometry and 2D canvas painting
//! - `tuning`: Data-driven game balance

pub mod error;
pub mod feed;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{FeedError, GameError};
pub use session::Session;
pub use settings::{Preset, Settings};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Grid height in rows
    pub const DEFAULT_ROWS: usize = 10;
    /// Visible columns used when the container size is unknown
    pub const DEFAULT_VISIBLE_COLUMNS: usize = 20;
    /// Columns of lookahead kept ahead of the line
    pub const LOOKAHEAD_MARGIN: usize = 5;
    /// Columns appended per grid growth
    pub const GROWTH_BATCH: usize = 10;
    /// Upper bound on visible columns and growth batch size
    pub const MAX_VISIBLE_COLUMNS: usize = 4096;
    /// Distance between milestone toasts
    pub const MILESTONE_INTERVAL: u64 = 100;

    /// Feed defaults
    pub const DEFAULT_SYMBOL: &str = "BTCUSDT";
    pub const DEFAULT_INTERVAL: &str = "1s";
    pub const DEFAULT_STREAM_BASE: &str = "wss://stream.binance.com:9443";
}
