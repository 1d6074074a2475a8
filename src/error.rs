//! Error types for the game core and the feed adapter

use thiserror::Error;

/// Errors raised by the market feed adapter while decoding a message
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("malformed feed message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("message carries no kline payload")]
    MissingKline,
    #[error("field `{field}` is not a number: {value:?}")]
    BadNumber { field: &'static str, value: String },
    #[error("field `{field}` is not a finite non-negative value: {value}")]
    NonFinite { field: &'static str, value: f64 },
}

/// Errors raised by the game core
#[derive(Debug, Error)]
pub enum GameError {
    #[error("row {row} is outside the grid (0..{rows})")]
    RowOutOfRange { row: i64, rows: usize },
    #[error("invalid layout: {0}")]
    InvalidLayout(String),
    #[error("invalid tuning: {0}")]
    InvalidTuning(String),
    #[error("no run in progress")]
    NotRunning,
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),
}
