//! A game bound to its market feed
//!
//! At most one feed link drives a game at a time: the old link is closed
//! before a new one is opened, and `end` closes it.

use crate::error::GameError;
use crate::feed::{FeedAdapter, FeedLink, RowMapping};
use crate::sim::{GamePhase, GameState, Layout, PathPoint, RunSummary, on_row_event};

pub struct Session<L: FeedLink> {
    pub game: GameState,
    adapter: FeedAdapter,
    link: Option<L>,
}

impl<L: FeedLink> Session<L> {
    pub fn new(game: GameState, mapping: RowMapping) -> Self {
        let adapter = FeedAdapter::new(mapping, game.tuning.rows);
        Self {
            game,
            adapter,
            link: None,
        }
    }

    pub fn link_mut(&mut self) -> Option<&mut L> {
        self.link.as_mut()
    }

    /// Start a run and open a fresh feed link for it.
    /// `connect` is only called when the run actually starts.
    pub fn start<F>(&mut self, layout: Layout, connect: F) -> Result<bool, GameError>
    where
        F: FnOnce() -> L,
    {
        if !self.game.start(layout)? {
            return Ok(false);
        }
        self.close_link();
        self.link = Some(connect());
        Ok(true)
    }

    /// End the run and close its feed
    pub fn end(&mut self) -> Option<RunSummary> {
        self.close_link();
        self.game.end()
    }

    /// Route one stream frame into the game
    pub fn on_message(&mut self, text: &str) -> Option<PathPoint> {
        if self.game.phase() != GamePhase::Running {
            return None;
        }
        let row = self.adapter.row_for_message(text)?;
        match on_row_event(&mut self.game, row as i64) {
            Ok(point) => point,
            Err(e) => {
                log::warn!("Rejected feed row: {e}");
                None
            }
        }
    }

    fn close_link(&mut self) {
        if let Some(mut link) = self.link.take() {
            link.close();
            log::info!("Feed link closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::tuning::Tuning;

    /// Records open/close order into a shared log
    struct MockLink {
        id: u32,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl MockLink {
        fn open(id: u32, log: &Rc<RefCell<Vec<String>>>) -> Self {
            log.borrow_mut().push(format!("open {id}"));
            Self {
                id,
                log: log.clone(),
            }
        }
    }

    impl FeedLink for MockLink {
        fn close(&mut self) {
            self.log.borrow_mut().push(format!("close {}", self.id));
        }
    }

    fn layout() -> Layout {
        Layout {
            visible_columns: 20,
            cell_size: 30.0,
        }
    }

    fn session() -> Session<MockLink> {
        Session::new(
            GameState::new(Tuning::classic()).unwrap(),
            RowMapping::PriceHundredths,
        )
    }

    #[test]
    fn test_old_link_closed_before_new_opens() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut session = session();

        assert!(session.start(layout(), || MockLink::open(1, &log)).unwrap());
        assert!(!session.start(layout(), || MockLink::open(99, &log)).unwrap());
        session.end();
        assert!(session.link_mut().is_none());
        assert!(session.start(layout(), || MockLink::open(2, &log)).unwrap());

        assert_eq!(*log.borrow(), vec!["open 1", "close 1", "open 2"]);
    }

    #[test]
    fn test_messages_drive_the_line() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut session = session();
        session.start(layout(), || MockLink::open(1, &log)).unwrap();

        let point = session.on_message(r#"{"k":{"c":"100.25"}}"#).unwrap();
        assert_eq!(point, PathPoint { column: 1, row: 5 });
        assert!(session.on_message("garbage").is_none());
        assert!(session.on_message(r#"{"result":null,"id":1}"#).is_none());
        assert_eq!(session.game.total_distance(), 1);
    }

    #[test]
    fn test_paused_session_drops_frames() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut session = session();
        session.start(layout(), || MockLink::open(1, &log)).unwrap();
        session.game.pause();
        for _ in 0..5 {
            assert!(session.on_message(r#"{"k":{"c":"100.25"}}"#).is_none());
        }
        assert_eq!(session.game.total_distance(), 0);
        session.game.resume();
        session.on_message(r#"{"k":{"c":"100.25"}}"#);
        assert_eq!(session.game.total_distance(), 1);
    }

    #[test]
    fn test_invalid_layout_keeps_link() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut session = session();
        let bad = Layout {
            visible_columns: 3,
            cell_size: 30.0,
        };
        assert!(session.start(bad, || MockLink::open(1, &log)).is_err());
        assert!(session.link_mut().is_none());
        assert!(log.borrow().is_empty());
    }
}
