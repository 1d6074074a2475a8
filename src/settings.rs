//! Game settings and preferences
//!
//! Read from an inline JSON block on the page; nothing is written back.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::GameError;
use crate::feed::{RowMapping, stream_url};
use crate::tuning::Tuning;

/// Balance preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Preset {
    /// One-column scroll, integer scores
    #[default]
    Classic,
    /// Five-column scroll, fractional bonus, special action enabled
    Batched,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Classic => "Classic",
            Preset::Batched => "Batched",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" | "web" => Some(Preset::Classic),
            "batched" | "mini" => Some(Preset::Batched),
            _ => None,
        }
    }

    pub fn tuning(&self) -> Tuning {
        match self {
            Preset::Classic => Tuning::classic(),
            Preset::Batched => Tuning::batched(),
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Balance preset
    pub preset: Preset,

    // === Feed ===
    /// Exchange symbol, e.g. BTCUSDT
    pub symbol: String,
    /// Kline interval, e.g. 1s
    pub interval: String,
    /// WebSocket endpoint base
    pub stream_base: String,
    /// Which kline value picks the row
    pub row_mapping: RowMapping,
    /// Play against the offline random walk instead of the exchange
    pub simulated_feed: bool,

    // === Cosmetics ===
    /// Flash the grid on hits
    pub hit_flash: bool,
    /// Toast every milestone
    pub milestone_toasts: bool,
    /// Show the coverage percentage in the HUD
    pub show_coverage: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preset: Preset::Classic,

            symbol: DEFAULT_SYMBOL.to_string(),
            interval: DEFAULT_INTERVAL.to_string(),
            stream_base: DEFAULT_STREAM_BASE.to_string(),
            row_mapping: RowMapping::PriceHundredths,
            simulated_feed: false,

            hit_flash: true,
            milestone_toasts: true,
            show_coverage: true,
        }
    }
}

impl Settings {
    /// Create settings from a preset (applies preset defaults)
    pub fn from_preset(preset: Preset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a preset. The mini-program build steers by turnover.
    pub fn apply_preset(&mut self, preset: Preset) {
        self.preset = preset;
        if preset == Preset::Batched {
            self.row_mapping = RowMapping::TurnoverHundredths;
        }
    }

    pub fn tuning(&self) -> Tuning {
        self.preset.tuning()
    }

    /// Kline stream for the configured symbol
    pub fn stream_url(&self) -> String {
        stream_url(&self.stream_base, &self.symbol, &self.interval)
    }

    /// Parse settings; missing fields fall back to the preset's defaults
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let explicit_mapping = value.get("row_mapping").is_some();
        let mut settings: Self = serde_json::from_value(value)?;
        if !explicit_mapping {
            settings.apply_preset(settings.preset);
        }
        log::info!("Loaded settings");
        Ok(settings)
    }

    /// Settings from the page's `#settings` JSON block (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("settings"))
            .and_then(|el| el.text_content());

        if let Some(json) = json {
            match Self::from_json(&json) {
                Ok(settings) => return settings,
                Err(e) => log::warn!("Ignoring page settings: {e}"),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native: optional JSON in `TICK_LINE_SETTINGS`
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        match std::env::var("TICK_LINE_SETTINGS") {
            Ok(json) => Self::from_json(&json).unwrap_or_else(|e| {
                log::warn!("Ignoring TICK_LINE_SETTINGS: {e}");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }
}
