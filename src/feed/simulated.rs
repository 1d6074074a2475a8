//! Offline price feed
//!
//! Seeded random walk that emits Binance-shaped kline frames, so the game
//! can be played and tested without a network connection.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::FeedLink;

/// Deterministic random-walk ticker
#[derive(Debug, Clone)]
pub struct SimulatedFeed {
    rng: Pcg32,
    price: f64,
    /// Max relative move per tick
    volatility: f64,
    closed: bool,
}

impl SimulatedFeed {
    pub fn new(seed: u64, start_price: f64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            price: start_price.max(0.01),
            volatility: 0.0005,
            closed: false,
        }
    }

    /// Next kline frame as JSON text, or None once closed
    pub fn next_message(&mut self) -> Option<String> {
        if self.closed {
            return None;
        }
        let step = self.rng.random_range(-self.volatility..=self.volatility);
        self.price = ((self.price * (1.0 + step)) * 100.0).round() / 100.0;
        self.price = self.price.max(0.01);
        let volume: f64 = self.rng.random_range(0.01..5.0);
        let frame = serde_json::json!({
            "e": "kline",
            "s": "SIMUSDT",
            "k": {
                "c": format!("{:.2}", self.price),
                "v": format!("{:.4}", volume),
                "q": format!("{:.2}", volume * self.price),
                "x": false,
            }
        });
        Some(frame.to_string())
    }
}

impl FeedLink for SimulatedFeed {
    fn close(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::parse_kline;

    #[test]
    fn test_same_seed_same_frames() {
        let mut a = SimulatedFeed::new(7, 65000.0);
        let mut b = SimulatedFeed::new(7, 65000.0);
        for _ in 0..20 {
            assert_eq!(a.next_message(), b.next_message());
        }
    }

    #[test]
    fn test_frames_decode() {
        let mut feed = SimulatedFeed::new(3, 100.0);
        for _ in 0..50 {
            let kline = parse_kline(&feed.next_message().unwrap()).unwrap();
            assert!(kline.close >= 0.01);
        }
    }

    #[test]
    fn test_closed_feed_stops() {
        let mut feed = SimulatedFeed::new(1, 100.0);
        feed.close();
        assert!(feed.next_message().is_none());
    }
}
