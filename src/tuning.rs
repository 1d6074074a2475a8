//! Data-driven game balance
//!
//! The mini-program and the web build disagree on scroll step and score
//! deltas, so both live here as parameters with a preset for each.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::GameError;

/// Balance knobs for a single run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    /// Fixed number of grid rows (R)
    pub rows: usize,
    /// Columns kept visible ahead of the line before the viewport scrolls
    pub lookahead_margin: usize,
    /// Columns the viewport advances per scroll
    pub scroll_step: usize,
    /// Empty columns appended to every row when the grid grows
    pub growth_batch: usize,
    /// Score charged for marking a cell (refunded on unmark)
    pub mark_cost: f64,
    /// Score awarded when the line lands on a marked cell
    pub collision_bonus: f64,
    /// Whether the one-shot batch mark is available
    pub special_action_enabled: bool,
    /// Flat score charged per special action
    pub special_action_cost: f64,
    /// Distance between milestone events (0 disables them)
    pub milestone_interval: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self::classic()
    }
}

impl Tuning {
    /// Web build: scroll one column at a time, integer scoring
    pub fn classic() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            lookahead_margin: LOOKAHEAD_MARGIN,
            scroll_step: 1,
            growth_batch: GROWTH_BATCH,
            mark_cost: 1.0,
            collision_bonus: 1.0,
            special_action_enabled: false,
            special_action_cost: 5.0,
            milestone_interval: MILESTONE_INTERVAL,
        }
    }

    /// Mini-program build: scroll in blocks of the margin, fractional bonus
    pub fn batched() -> Self {
        Self {
            scroll_step: LOOKAHEAD_MARGIN,
            collision_bonus: 9.8,
            special_action_enabled: true,
            ..Self::classic()
        }
    }

    /// Middle row where the line is seeded
    #[inline]
    pub fn start_row(&self) -> usize {
        self.rows / 2
    }

    /// Reject balance values the grid store cannot work with
    pub fn validate(&self) -> Result<(), GameError> {
        if self.rows == 0 {
            return Err(GameError::InvalidTuning("rows must be positive".into()));
        }
        if self.lookahead_margin == 0 {
            return Err(GameError::InvalidTuning("lookahead_margin must be positive".into()));
        }
        if self.scroll_step == 0 {
            return Err(GameError::InvalidTuning("scroll_step must be positive".into()));
        }
        if self.growth_batch == 0 || self.growth_batch > MAX_VISIBLE_COLUMNS {
            return Err(GameError::InvalidTuning(format!(
                "growth_batch must be in 1..={MAX_VISIBLE_COLUMNS}, got {}",
                self.growth_batch
            )));
        }
        let costs = [self.mark_cost, self.collision_bonus, self.special_action_cost];
        if costs.iter().any(|c| !c.is_finite() || *c < 0.0) {
            return Err(GameError::InvalidTuning(
                "score deltas must be finite and non-negative".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        assert!(Tuning::classic().validate().is_ok());
        assert!(Tuning::batched().validate().is_ok());
        assert_eq!(Tuning::batched().scroll_step, 5);
        assert_eq!(Tuning::classic().start_row(), 5);
    }

    #[test]
    fn test_rejects_zero_rows() {
        let tuning = Tuning {
            rows: 0,
            ..Tuning::classic()
        };
        assert!(matches!(tuning.validate(), Err(GameError::InvalidTuning(_))));
    }

    #[test]
    fn test_rejects_oversized_growth_batch() {
        let tuning = Tuning {
            growth_batch: usize::MAX,
            ..Tuning::classic()
        };
        assert!(matches!(tuning.validate(), Err(GameError::InvalidTuning(_))));
    }

    #[test]
    fn test_rejects_nan_bonus() {
        let tuning = Tuning {
            collision_bonus: f64::NAN,
            ..Tuning::classic()
        };
        assert!(tuning.validate().is_err());
    }
}
