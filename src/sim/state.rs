//! Game state and the player's control surface
//!
//! A run's grid, path and viewport exist only between `start` and `end`.
//! Everything else here survives across runs.

use serde::{Deserialize, Serialize};

use super::grid::{Cell, GridStore, Viewport};
use super::path::{Path, PathPoint};
use crate::consts::MAX_VISIBLE_COLUMNS;
use crate::error::GameError;
use crate::tuning::Tuning;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// No run yet, only `start` is accepted
    #[default]
    Idle,
    /// Feed ticks move the line
    Running,
    /// Feed ticks and clicks are dropped
    Paused,
    /// Run finished, summary available until the next start
    Ended,
}

/// On-screen size of the grid for one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub visible_columns: usize,
    /// Cell edge length in CSS pixels
    pub cell_size: f32,
}

impl Layout {
    /// Fit the grid to a container: rows fill the height, columns fill
    /// whatever width is left at that cell size.
    pub fn fit(width: f32, height: f32, rows: usize) -> Result<Self, GameError> {
        if !(width > 0.0 && height > 0.0) || rows == 0 {
            return Err(GameError::InvalidLayout(format!(
                "container {width}x{height} cannot hold {rows} rows"
            )));
        }
        let cell_size = height / rows as f32;
        let visible_columns = (width / cell_size).floor() as usize;
        Ok(Self {
            visible_columns,
            cell_size,
        })
    }

    fn validate(&self, tuning: &Tuning) -> Result<(), GameError> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(GameError::InvalidLayout(format!(
                "cell size must be positive, got {}",
                self.cell_size
            )));
        }
        if self.visible_columns > MAX_VISIBLE_COLUMNS {
            return Err(GameError::InvalidLayout(format!(
                "{} visible columns exceeds the limit of {MAX_VISIBLE_COLUMNS}",
                self.visible_columns
            )));
        }
        // A scroll must never move the left edge past the line
        if self.visible_columns < tuning.lookahead_margin + tuning.scroll_step {
            return Err(GameError::InvalidLayout(format!(
                "{} visible columns leave no room for a lookahead of {} scrolling by {}",
                self.visible_columns, tuning.lookahead_margin, tuning.scroll_step
            )));
        }
        Ok(())
    }
}

/// Side effects for the front end (sounds, toasts, confetti)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Started,
    /// Line landed on a marked cell
    Hit { row: usize, column: usize, bonus: f64 },
    Scrolled { scroll_offset: usize },
    Milestone { distance: u64 },
    SpecialAction { column: usize, marked: usize },
    Paused,
    Resumed,
    Ended(RunSummary),
}

/// Final numbers shown to the player when a run ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub score: f64,
    pub distance: u64,
    /// Percent of the visible area the player ever marked
    pub coverage: f64,
}

/// Read-only copy of the visible window for the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportSnapshot {
    /// `cells[row][screen_column]`
    pub cells: Vec<Vec<Cell>>,
    pub scroll_offset: usize,
    pub visible_columns: usize,
    pub cell_size: f32,
}

/// Everything owned by a single run
#[derive(Debug, Clone)]
pub struct Run {
    pub grid: GridStore,
    pub path: Path,
    pub viewport: Viewport,
    pub score: f64,
    pub total_distance: u64,
    pub cell_size: f32,
    /// Special action already spent on the current leading column
    pub(crate) special_used: bool,
}

impl Run {
    fn new(tuning: &Tuning, layout: Layout) -> Self {
        Self {
            grid: GridStore::new(
                tuning.rows,
                layout.visible_columns + tuning.growth_batch,
                tuning.growth_batch,
            ),
            path: Path::seeded(tuning.start_row()),
            viewport: Viewport::new(layout.visible_columns),
            score: 0.0,
            total_distance: 0,
            cell_size: layout.cell_size,
            special_used: false,
        }
    }

    #[inline]
    pub fn leading_column(&self) -> usize {
        self.path.leading().column
    }

    fn summary(&self) -> RunSummary {
        RunSummary {
            score: self.score,
            distance: self.total_distance,
            coverage: self.grid.coverage(self.viewport.visible_columns),
        }
    }
}

/// Complete game state, one per game instance
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    pub(crate) phase: GamePhase,
    pub(crate) run: Option<Run>,
    pub(crate) events: Vec<GameEvent>,
    pub(crate) last_summary: Option<RunSummary>,
    /// Something visible changed since the renderer last looked
    pub(crate) dirty: bool,
}

impl GameState {
    pub fn new(tuning: Tuning) -> Result<Self, GameError> {
        tuning.validate()?;
        Ok(Self {
            tuning,
            phase: GamePhase::Idle,
            run: None,
            events: Vec::new(),
            last_summary: None,
            dirty: false,
        })
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn run(&self) -> Option<&Run> {
        self.run.as_ref()
    }

    pub fn score(&self) -> f64 {
        self.run.as_ref().map_or(0.0, |r| r.score)
    }

    pub fn total_distance(&self) -> u64 {
        self.run.as_ref().map_or(0, |r| r.total_distance)
    }

    pub fn last_summary(&self) -> Option<RunSummary> {
        self.last_summary
    }

    /// Begin a new run. Returns Ok(false) while a run is in progress.
    pub fn start(&mut self, layout: Layout) -> Result<bool, GameError> {
        if matches!(self.phase, GamePhase::Running | GamePhase::Paused) {
            return Ok(false);
        }
        // `tuning` is public and may have changed since `new`
        self.tuning.validate()?;
        layout.validate(&self.tuning)?;

        self.run = Some(Run::new(&self.tuning, layout));
        self.last_summary = None;
        self.phase = GamePhase::Running;
        self.events.push(GameEvent::Started);
        self.dirty = true;
        log::info!(
            "Run started: {} rows x {} visible columns",
            self.tuning.rows,
            layout.visible_columns
        );
        Ok(true)
    }

    pub fn pause(&mut self) -> bool {
        if self.phase != GamePhase::Running {
            return false;
        }
        self.phase = GamePhase::Paused;
        self.events.push(GameEvent::Paused);
        log::info!("Paused");
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.phase != GamePhase::Paused {
            return false;
        }
        self.phase = GamePhase::Running;
        self.events.push(GameEvent::Resumed);
        log::info!("Resumed");
        true
    }

    /// Finish the run, dropping its grid and path
    pub fn end(&mut self) -> Option<RunSummary> {
        if !matches!(self.phase, GamePhase::Running | GamePhase::Paused) {
            return None;
        }
        let summary = self.run.take()?.summary();
        self.phase = GamePhase::Ended;
        self.last_summary = Some(summary);
        self.events.push(GameEvent::Ended(summary));
        self.dirty = true;
        log::info!(
            "Run ended: distance {}, score {}, coverage {:.1}%",
            summary.distance,
            summary.score,
            summary.coverage
        );
        Some(summary)
    }

    /// Mark or unmark a visible cell ahead of the line.
    /// Returns false (and changes nothing) when the click is not allowed.
    pub fn toggle_cell(&mut self, row: usize, column: usize) -> bool {
        if self.phase != GamePhase::Running {
            return false;
        }
        let Some(run) = self.run.as_mut() else {
            return false;
        };
        if column <= run.leading_column() || row >= self.tuning.rows {
            return false;
        }
        if self.tuning.special_action_enabled && run.special_used {
            return false;
        }
        let Some(screen_column) = run.viewport.screen_column(column) else {
            return false;
        };
        let Some(marked) = run.grid.flip(row, column, screen_column) else {
            return false;
        };

        if marked {
            run.score -= self.tuning.mark_cost;
        } else {
            run.score += self.tuning.mark_cost;
        }
        self.dirty = true;
        log::debug!("Cell ({row}, {column}) marked={marked}, score {}", run.score);
        true
    }

    /// Spend the one-shot batch mark on the column the line reaches next
    pub fn special_action(&mut self, rows: &[usize]) -> bool {
        if self.phase != GamePhase::Running || !self.tuning.special_action_enabled {
            return false;
        }
        let Some(run) = self.run.as_mut() else {
            return false;
        };
        if run.special_used || rows.is_empty() {
            return false;
        }

        let column = run.leading_column() + 1;
        let Some(screen_column) = run.viewport.screen_column(column) else {
            return false;
        };
        let marked = run.grid.mark_batch(column, rows, screen_column);
        run.score -= self.tuning.special_action_cost;
        run.special_used = true;
        self.events.push(GameEvent::SpecialAction { column, marked });
        self.dirty = true;
        log::info!("Special action on column {column}: {marked} cells marked");
        true
    }

    /// Snapshot of the visible window, if a run is active
    pub fn viewport(&self) -> Option<ViewportSnapshot> {
        let run = self.run.as_ref()?;
        let viewport = run.viewport;
        Some(ViewportSnapshot {
            cells: run
                .grid
                .window(viewport.scroll_offset, viewport.visible_columns),
            scroll_offset: viewport.scroll_offset,
            visible_columns: viewport.visible_columns,
            cell_size: run.cell_size,
        })
    }

    /// The line so far (empty when no run is active)
    pub fn path(&self) -> &[PathPoint] {
        self.run.as_ref().map(|r| r.path.points()).unwrap_or(&[])
    }

    /// Drain pending side effects
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// True once after every visible change
    pub fn take_redraw(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}
