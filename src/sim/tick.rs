//! Feed-driven line advance
//!
//! One price tick moves the line one column. Ticks arriving outside the
//! Running phase are dropped, never queued.

use super::grid::follow_line;
use super::path::PathPoint;
use super::state::{GameEvent, GamePhase, GameState};
use crate::error::GameError;

/// Feed ingress. Validates the raw row before it reaches the grid.
///
/// Returns the appended point, or `None` when the tick was dropped because
/// the game is not running.
pub fn on_row_event(state: &mut GameState, row: i64) -> Result<Option<PathPoint>, GameError> {
    if state.phase != GamePhase::Running {
        log::debug!("Dropping row {row} while {:?}", state.phase);
        return Ok(None);
    }
    let rows = state.tuning.rows;
    let row = usize::try_from(row)
        .ok()
        .filter(|r| *r < rows)
        .ok_or(GameError::RowOutOfRange { row, rows })?;
    push_row(state, row)
}

/// Advance the line one column to `target_row`
pub fn push_row(state: &mut GameState, target_row: usize) -> Result<Option<PathPoint>, GameError> {
    if state.phase != GamePhase::Running {
        return Ok(None);
    }
    let tuning = &state.tuning;
    if target_row >= tuning.rows {
        return Err(GameError::RowOutOfRange {
            row: target_row as i64,
            rows: tuning.rows,
        });
    }
    let Some(run) = state.run.as_mut() else {
        return Ok(None);
    };

    let point = run.path.advance(target_row);
    run.total_distance += 1;
    run.special_used = false;

    if run.grid.is_marked(point.row, point.column) {
        run.score += tuning.collision_bonus;
        state.events.push(GameEvent::Hit {
            row: point.row,
            column: point.column,
            bonus: tuning.collision_bonus,
        });
        log::debug!(
            "Hit at ({}, {}), score {}",
            point.row,
            point.column,
            run.score
        );
    }

    if follow_line(
        &mut run.viewport,
        &mut run.grid,
        point.column,
        tuning.lookahead_margin,
        tuning.scroll_step,
    ) {
        state.events.push(GameEvent::Scrolled {
            scroll_offset: run.viewport.scroll_offset,
        });
    }

    if tuning.milestone_interval > 0 && run.total_distance % tuning.milestone_interval == 0 {
        state.events.push(GameEvent::Milestone {
            distance: run.total_distance,
        });
        log::info!("Milestone: {} columns", run.total_distance);
    }

    state.dirty = true;
    Ok(Some(point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Layout;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    fn started(tuning: Tuning) -> GameState {
        let mut state = GameState::new(tuning).unwrap();
        state
            .start(Layout {
                visible_columns: 20,
                cell_size: 30.0,
            })
            .unwrap();
        state
    }

    fn offset(state: &GameState) -> usize {
        state.run().unwrap().viewport.scroll_offset
    }

    #[test]
    fn test_push_row_appends_next_column() {
        let mut state = started(Tuning::classic());
        let p = push_row(&mut state, 7).unwrap().unwrap();
        assert_eq!(p, PathPoint { column: 1, row: 7 });
        assert_eq!(state.total_distance(), 1);
        assert_eq!(state.path().len(), 2);
    }

    #[test]
    fn test_scroll_threshold_column() {
        let mut state = started(Tuning::classic());
        for _ in 0..15 {
            push_row(&mut state, 5).unwrap();
        }
        assert_eq!(state.run().unwrap().leading_column(), 15);
        assert_eq!(offset(&state), 0);

        push_row(&mut state, 5).unwrap();
        assert_eq!(state.run().unwrap().leading_column(), 16);
        assert_eq!(offset(&state), 1);

        let scrolls: Vec<_> = state
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::Scrolled { .. }))
            .collect();
        assert_eq!(scrolls, vec![GameEvent::Scrolled { scroll_offset: 1 }]);
    }

    #[test]
    fn test_batched_scroll_step() {
        let mut state = started(Tuning::batched());
        for _ in 0..16 {
            push_row(&mut state, 5).unwrap();
        }
        assert_eq!(offset(&state), 5);
        let run = state.run().unwrap();
        assert!(run.grid.width() >= run.viewport.right_edge());
    }

    #[test]
    fn test_collision_bonus_applied_once() {
        let mut state = started(Tuning::classic());
        assert!(state.toggle_cell(3, 2));
        assert_eq!(state.score(), -1.0);

        push_row(&mut state, 0).unwrap();
        push_row(&mut state, 3).unwrap();
        assert_eq!(state.score(), 0.0);
        for _ in 0..5 {
            push_row(&mut state, 3).unwrap();
        }
        assert_eq!(state.score(), 0.0);

        let hits: Vec<_> = state
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::Hit { .. }))
            .collect();
        assert_eq!(
            hits,
            vec![GameEvent::Hit {
                row: 3,
                column: 2,
                bonus: 1.0
            }]
        );
        assert!(!state.toggle_cell(3, 2));
    }

    #[test]
    fn test_fractional_bonus() {
        let mut state = started(Tuning::batched());
        state.toggle_cell(2, 1);
        push_row(&mut state, 2).unwrap();
        assert!((state.score() - 8.8).abs() < 1e-9);
    }

    #[test]
    fn test_pause_drops_ticks() {
        let mut state = started(Tuning::classic());
        push_row(&mut state, 1).unwrap();
        state.pause();
        for row in 0..5 {
            assert_eq!(on_row_event(&mut state, row).unwrap(), None);
        }
        assert_eq!(state.total_distance(), 1);

        state.resume();
        on_row_event(&mut state, 4).unwrap();
        assert_eq!(state.total_distance(), 2);
    }

    #[test]
    fn test_out_of_range_row_rejected() {
        let mut state = started(Tuning::classic());
        assert!(matches!(
            on_row_event(&mut state, 10),
            Err(GameError::RowOutOfRange { row: 10, rows: 10 })
        ));
        assert!(on_row_event(&mut state, -1).is_err());
        assert!(push_row(&mut state, 42).is_err());
        assert_eq!(state.total_distance(), 0);
        assert_eq!(state.path().len(), 1);
    }

    #[test]
    fn test_idle_and_ended_drop_ticks() {
        let mut state = GameState::new(Tuning::classic()).unwrap();
        assert_eq!(on_row_event(&mut state, 3).unwrap(), None);
        state
            .start(Layout {
                visible_columns: 20,
                cell_size: 30.0,
            })
            .unwrap();
        state.end();
        assert_eq!(on_row_event(&mut state, 3).unwrap(), None);
        assert!(state.path().is_empty());
    }

    #[test]
    fn test_special_action_resets_each_column() {
        let mut state = started(Tuning::batched());
        assert!(state.special_action(&[4]));
        assert!(!state.special_action(&[4]));
        push_row(&mut state, 4).unwrap();
        assert_eq!(state.score(), -5.0 + 9.8);
        assert!(state.special_action(&[6]));
        assert!(!state.toggle_cell(1, 5));
    }

    #[test]
    fn test_milestone_every_interval() {
        let mut state = started(Tuning {
            milestone_interval: 4,
            ..Tuning::classic()
        });
        for _ in 0..9 {
            push_row(&mut state, 0).unwrap();
        }
        let milestones: Vec<_> = state
            .take_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::Milestone { distance } => Some(distance),
                _ => None,
            })
            .collect();
        assert_eq!(milestones, vec![4, 8]);
    }

    proptest! {
        #[test]
        fn prop_path_tracks_distance(rows in proptest::collection::vec(0usize..10, 0..200)) {
            let mut state = started(Tuning::classic());
            for row in rows {
                push_row(&mut state, row).unwrap();
                let run = state.run().unwrap();
                prop_assert!(run.viewport.right_edge() <= run.grid.width());
            }
            let path = state.path();
            prop_assert_eq!(path.len() as u64, state.total_distance() + 1);
            for (i, point) in path.iter().enumerate() {
                prop_assert_eq!(point.column, i);
            }
        }

        #[test]
        fn prop_toggle_behind_line_is_noop(pushes in 1usize..40, row in 0usize..10, back in 0usize..40) {
            let mut state = started(Tuning::classic());
            for _ in 0..pushes {
                push_row(&mut state, 0).unwrap();
            }
            let column = state.run().unwrap().leading_column().saturating_sub(back);
            let before = state.viewport();
            let score = state.score();
            prop_assert!(!state.toggle_cell(row, column));
            prop_assert_eq!(state.viewport(), before);
            prop_assert_eq!(state.score(), score);
        }
    }
}
