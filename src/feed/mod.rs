//! Market feed adapter
//!
//! Turns untrusted stream frames into row indices in `[0, rows)`.
//! Malformed frames are logged and dropped here and never reach the game.

pub mod binance;
pub mod simulated;

pub use binance::{Kline, parse_kline, stream_name, stream_url, subscribe_message};
pub use simulated::SimulatedFeed;

use serde::{Deserialize, Serialize};

use crate::error::FeedError;

/// How a kline is turned into a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RowMapping {
    /// Hundredths digit of the close price: `floor(close * 100) mod rows`
    #[default]
    PriceHundredths,
    /// Same extraction applied to the quote-asset turnover
    TurnoverHundredths,
}

impl RowMapping {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowMapping::PriceHundredths => "price",
            RowMapping::TurnoverHundredths => "turnover",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "price" => Some(RowMapping::PriceHundredths),
            "turnover" | "quote" => Some(RowMapping::TurnoverHundredths),
            _ => None,
        }
    }

    /// Row for a decoded kline. `rows` must be non-zero.
    pub fn row(&self, kline: &Kline, rows: usize) -> usize {
        let value = match self {
            RowMapping::PriceHundredths => kline.close,
            RowMapping::TurnoverHundredths => kline.quote_volume,
        };
        // parse_kline only yields finite, non-negative values
        let hundredths = (value * 100.0).floor() as u64;
        (hundredths % rows.max(1) as u64) as usize
    }
}

/// A live connection feeding the game. Closing must stop further frames.
pub trait FeedLink {
    fn close(&mut self);
}

/// Decodes stream frames into rows for a grid of fixed height
#[derive(Debug, Clone, Copy)]
pub struct FeedAdapter {
    mapping: RowMapping,
    rows: usize,
}

impl FeedAdapter {
    pub fn new(mapping: RowMapping, rows: usize) -> Self {
        Self {
            mapping,
            rows: rows.max(1),
        }
    }

    pub fn decode(&self, text: &str) -> Result<usize, FeedError> {
        let kline = parse_kline(text)?;
        if kline.closed {
            log::trace!("Kline interval closed at {}", kline.close);
        }
        Ok(self.mapping.row(&kline, self.rows))
    }

    /// Decode a frame, logging and swallowing anything unusable
    pub fn row_for_message(&self, text: &str) -> Option<usize> {
        match self.decode(text) {
            Ok(row) => Some(row),
            // Subscription acks and other control frames
            Err(FeedError::MissingKline) => {
                log::debug!("Ignoring non-kline frame: {text}");
                None
            }
            Err(e) => {
                log::warn!("Dropping feed frame: {e}");
                None
            }
        }
    }
}
