//! Tick Line entry point
//!
//! Handles platform-specific initialization. The browser build wires the
//! DOM, canvas and exchange socket; the native build plays a headless run
//! against the simulated feed.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, HtmlButtonElement, HtmlCanvasElement, MessageEvent,
        MouseEvent, WebSocket,
    };

    use tick_line::feed::{FeedLink, SimulatedFeed, stream_name, subscribe_message};
    use tick_line::renderer::CanvasPainter;
    use tick_line::sim::{GameEvent, GamePhase, GameState, Layout};
    use tick_line::{Session, Settings};

    /// Live exchange socket, or the offline ticker on an interval timer
    enum Link {
        Socket {
            ws: WebSocket,
            _on_open: Closure<dyn FnMut(web_sys::Event)>,
            _on_message: Closure<dyn FnMut(MessageEvent)>,
            _on_error: Closure<dyn FnMut(web_sys::Event)>,
        },
        Simulated {
            handle: i32,
            _tick: Closure<dyn FnMut()>,
        },
    }

    impl FeedLink for Link {
        fn close(&mut self) {
            match self {
                Link::Socket { ws, .. } => {
                    ws.set_onopen(None);
                    ws.set_onmessage(None);
                    ws.set_onerror(None);
                    let _ = ws.close();
                }
                Link::Simulated { handle, .. } => {
                    if let Some(window) = web_sys::window() {
                        window.clear_interval_with_handle(*handle);
                    }
                }
            }
        }
    }

    /// Game instance holding all state
    struct Game {
        session: Session<Link>,
        settings: Settings,
        painter: Option<CanvasPainter>,
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(id: &str, hidden: bool) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            let classes = el.class_list();
            let _ = if hidden {
                classes.add_1("hidden")
            } else {
                classes.remove_1("hidden")
            };
        }
    }

    fn set_disabled(id: &str, disabled: bool) {
        if let Some(btn) = document()
            .and_then(|d| d.get_element_by_id(id))
            .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok())
        {
            btn.set_disabled(disabled);
        }
    }

    /// Repaint and update the HUD after any mutation
    fn refresh(game: &Rc<RefCell<Game>>) {
        let mut g = game.borrow_mut();
        let events = g.session.game.take_events();
        let redraw = g.session.game.take_redraw();

        if redraw {
            let state = &g.session.game;
            match (&g.painter, state.viewport()) {
                (Some(painter), Some(view)) => {
                    if let Err(e) = painter.paint(&view, state.path()) {
                        log::warn!("Paint failed: {:?}", e);
                    }
                }
                (Some(painter), None) => painter.clear(),
                _ => {}
            }
        }

        let state = &g.session.game;
        set_text("score", &format!("Score: {}", state.score()));
        set_text("distance", &format!("Distance: {}", state.total_distance()));
        if g.settings.show_coverage {
            let coverage = state
                .run()
                .map_or(0.0, |r| r.grid.coverage(r.viewport.visible_columns));
            set_text("coverage", &format!("Coverage: {:.0}%", coverage));
        }

        let phase = state.phase();
        let active = matches!(phase, GamePhase::Running | GamePhase::Paused);
        set_disabled("start-btn", active);
        set_disabled("pause-btn", phase != GamePhase::Running);
        set_disabled("resume-btn", phase != GamePhase::Paused);
        set_disabled("end-btn", !active);
        set_disabled(
            "special-btn",
            phase != GamePhase::Running || !state.tuning.special_action_enabled,
        );

        for event in events {
            match event {
                GameEvent::Hit { .. } if g.settings.hit_flash => {
                    if let Some(el) = document().and_then(|d| d.get_element_by_id("game-container"))
                    {
                        let _ = el.class_list().remove_1("hit");
                        let _ = el.class_list().add_1("hit");
                    }
                }
                GameEvent::Milestone { distance } if g.settings.milestone_toasts => {
                    set_text("toast", &format!("{} cells travelled!", distance));
                    set_hidden("toast", false);
                }
                GameEvent::Ended(summary) => {
                    if summary.distance > 0 {
                        set_text(
                            "final-summary",
                            &format!(
                                "Your line travelled {} cells. Score: {}",
                                summary.distance, summary.score
                            ),
                        );
                        set_hidden("game-over", false);
                    }
                }
                _ => {}
            }
        }
    }

    fn open_socket(url: &str, stream: String, game: Rc<RefCell<Game>>) -> Result<Link, JsValue> {
        let ws = WebSocket::new(url)?;

        let ws_clone = ws.clone();
        let on_open = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            log::info!("Feed connected");
            let _ = ws_clone.send_with_str(&subscribe_message(&[stream.clone()], 1));
        });
        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));

        let on_message = Closure::<dyn FnMut(_)>::new(move |event: MessageEvent| {
            let Some(text) = event.data().as_string() else {
                return;
            };
            game.borrow_mut().session.on_message(&text);
            refresh(&game);
        });
        ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

        let on_error = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            log::warn!("Feed socket error");
        });
        ws.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        Ok(Link::Socket {
            ws,
            _on_open: on_open,
            _on_message: on_message,
            _on_error: on_error,
        })
    }

    fn open_simulated(game: Rc<RefCell<Game>>) -> Result<Link, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let mut feed = SimulatedFeed::new(js_sys::Date::now() as u64, 65000.0);
        let tick = Closure::<dyn FnMut()>::new(move || {
            if let Some(text) = feed.next_message() {
                game.borrow_mut().session.on_message(&text);
                refresh(&game);
            }
        });
        let handle = window.set_interval_with_callback_and_timeout_and_arguments_0(
            tick.as_ref().unchecked_ref(),
            1000,
        )?;
        Ok(Link::Simulated {
            handle,
            _tick: tick,
        })
    }

    /// Size the canvas to its container and start a run
    fn start_game(game: &Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let container = document
            .get_element_by_id("game-container")
            .ok_or_else(|| JsValue::from_str("game container not found"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("line-canvas")
            .ok_or_else(|| JsValue::from_str("canvas not found"))?
            .dyn_into()?;

        let rect = container.get_bounding_client_rect();
        let (width, height) = (rect.width() as f32, rect.height() as f32);
        let rows = game.borrow().session.game.tuning.rows;
        let layout = Layout::fit(width, height, rows)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let dpr = window.device_pixel_ratio();
        canvas.set_width((width as f64 * dpr) as u32);
        canvas.set_height((height as f64 * dpr) as u32);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into()?;
        ctx.scale(dpr, dpr)?;

        let (simulated, url, stream) = {
            let g = game.borrow();
            let s = &g.settings;
            (s.simulated_feed, s.stream_url(), stream_name(&s.symbol, &s.interval))
        };

        let mut opened = Ok(());
        let started = {
            let mut g = game.borrow_mut();
            let feed_game = game.clone();
            g.session
                .start(layout, || {
                    let link = if simulated {
                        open_simulated(feed_game)
                    } else {
                        open_socket(&url, stream, feed_game)
                    };
                    link.unwrap_or_else(|e| {
                        opened = Err(e);
                        Link::Simulated {
                            handle: 0,
                            _tick: Closure::<dyn FnMut()>::new(|| {}),
                        }
                    })
                })
                .map_err(|e| JsValue::from_str(&e.to_string()))?
        };
        if let Err(e) = opened {
            game.borrow_mut().session.end();
            return Err(e);
        }
        if started {
            game.borrow_mut().painter = Some(CanvasPainter::new(ctx, width, height));
            set_hidden("game-over", true);
            log::info!("Game started ({}x{} px)", width, height);
        }
        Ok(())
    }

    fn on_click<F>(id: &str, game: &Rc<RefCell<Game>>, mut handler: F)
    where
        F: FnMut(&Rc<RefCell<Game>>, MouseEvent) + 'static,
    {
        let Some(el) = document().and_then(|d| d.get_element_by_id(id)) else {
            log::warn!("Missing element #{}", id);
            return;
        };
        let game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            handler(&game, event);
            refresh(&game);
        });
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_controls(game: &Rc<RefCell<Game>>) {
        on_click("start-btn", game, |game, _| {
            if let Err(e) = start_game(game) {
                log::error!("Start failed: {:?}", e);
                set_text("status", "Could not size the game area, please retry");
            }
        });
        on_click("pause-btn", game, |game, _| {
            game.borrow_mut().session.game.pause();
        });
        on_click("resume-btn", game, |game, _| {
            game.borrow_mut().session.game.resume();
        });
        on_click("end-btn", game, |game, _| {
            game.borrow_mut().session.end();
        });
        on_click("special-btn", game, |game, _| {
            let rows: Vec<usize> = (0..game.borrow().session.game.tuning.rows).collect();
            game.borrow_mut().session.game.special_action(&rows);
        });
        on_click("line-canvas", game, |game, event| {
            let mut g = game.borrow_mut();
            let Some(view) = g.session.game.viewport() else {
                return;
            };
            let row = (event.offset_y() as f32 / view.cell_size) as usize;
            let col = (event.offset_x() as f32 / view.cell_size) as usize;
            g.session.game.toggle_cell(row, view.scroll_offset + col);
        });
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Tick Line starting...");

        let settings = Settings::load();
        let state = match GameState::new(settings.tuning()) {
            Ok(state) => state,
            Err(e) => {
                log::error!("Bad tuning, using defaults: {}", e);
                GameState::new(Default::default()).expect("default tuning is valid")
            }
        };
        log::info!(
            "Preset {}, feed {}",
            settings.preset.as_str(),
            if settings.simulated_feed {
                "simulated".to_string()
            } else {
                settings.stream_url()
            }
        );

        let game = Rc::new(RefCell::new(Game {
            session: Session::new(state, settings.row_mapping),
            settings,
            painter: None,
        }));

        setup_controls(&game);
        refresh(&game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Tick Line (native) starting...");

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|a| a.parse().ok()).unwrap_or(42);
    let ticks = args.next().and_then(|a| a.parse().ok()).unwrap_or(200);
    let mapping = args.next().and_then(|a| {
        let mapping = tick_line::feed::RowMapping::from_str(&a);
        if mapping.is_none() {
            log::warn!("Unknown row mapping {a:?}, using settings");
        }
        mapping
    });

    match native::play(seed, ticks, mapping) {
        Ok(summary) => println!(
            "Distance: {}  Score: {}  Coverage: {:.1}%",
            summary.distance, summary.score, summary.coverage
        ),
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use tick_line::consts::DEFAULT_VISIBLE_COLUMNS;
    use tick_line::feed::{RowMapping, SimulatedFeed};
    use tick_line::sim::{GameEvent, GameState, Layout, RunSummary};
    use tick_line::{GameError, Session, Settings};

    /// Headless run: a bot marks a random cell a few columns ahead per tick
    pub fn play(
        seed: u64,
        ticks: u32,
        mapping: Option<RowMapping>,
    ) -> Result<RunSummary, GameError> {
        let settings = Settings::load();
        let mapping = mapping.unwrap_or(settings.row_mapping);
        log::info!("Rows follow the {} hundredths", mapping.as_str());
        let mut session: Session<SimulatedFeed> =
            Session::new(GameState::new(settings.tuning())?, mapping);
        let layout = Layout {
            visible_columns: DEFAULT_VISIBLE_COLUMNS,
            cell_size: 1.0,
        };
        session.start(layout, || SimulatedFeed::new(seed, 65000.0))?;

        let mut bot = Pcg32::seed_from_u64(seed ^ 0x5eed);
        let rows = session.game.tuning.rows;
        for _ in 0..ticks {
            if let Some(run) = session.game.run() {
                let column = run.leading_column() + bot.random_range(1..=4);
                let row = bot.random_range(0..rows);
                session.game.toggle_cell(row, column);
            }
            let Some(text) = session.link_mut().and_then(|feed| feed.next_message()) else {
                break;
            };
            session.on_message(&text);
            for event in session.game.take_events() {
                if let GameEvent::Hit { row, column, .. } = event {
                    log::info!("Hit at ({row}, {column})");
                }
            }
        }

        session.end().ok_or(GameError::NotRunning)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_headless_run_is_deterministic() {
            let a = play(7, 60, Some(RowMapping::PriceHundredths)).unwrap();
            let b = play(7, 60, Some(RowMapping::PriceHundredths)).unwrap();
            assert_eq!(a, b);
            assert_eq!(a.distance, 60);
        }

        #[test]
        fn test_headless_run_with_no_ticks() {
            let summary = play(1, 0, None).unwrap();
            assert_eq!(summary.distance, 0);
        }
    }
}
