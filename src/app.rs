//! App: session bootstrap, main loop, event dispatch and the once-per-second tick.

use crate::canvas::Canvas;
use crate::config::Config;
use crate::display::Display;
use crate::generator::Unpacker;
use crate::gui::{Gui, SpriteSheet};
use crate::input::{key_to_action, Action};
use crate::playfield::Playfield;
use crate::tetromino::{Rotation, TetrominoKind};
use crate::ui;
use anyhow::{bail, Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, info, warn};
use ratatui::backend::Backend;
use ratatui::layout::{Rect, Size};
use ratatui::style::Style;
use std::time::{Duration, Instant};

/// Diagnostic counters are logged and reset this often.
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Events consumed by the main loop, one at a time in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Quit,
    Key(KeyEvent),
    Tick,
}

/// Terminal event -> game event. Only key presses (and OS repeats) matter.
/// Ctrl+C is the terminal's interrupt and ends the session like a window close.
pub fn to_game_event(ev: Event) -> Option<GameEvent> {
    match ev {
        Event::Key(key) if key.kind == KeyEventKind::Release => None,
        Event::Key(key)
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            Some(GameEvent::Quit)
        }
        Event::Key(key) => Some(GameEvent::Key(key)),
        Event::Resize(w, h) => {
            debug!("Ignoring resize to {w}x{h}; the window layout is fixed for the session");
            None
        }
        _ => None,
    }
}

pub struct App {
    config: Config,
    gui: Gui,
    sprites: SpriteSheet,
    canvas: Canvas,
    board: Rect,
    playfield: Playfield,
    unpacker: Unpacker,
    /// Rotation applied to the following placements.
    rotation: Rotation,
    font_style: Style,
    running: bool,
}

impl App {
    /// Build the window canvas, playfield and generator. Fails if anything structural is off.
    pub fn new(config: Config, window: Size) -> Result<Self> {
        let gui = Gui::preset(config.gui);
        let (need_w, need_h) = ui::required_window(&config, &gui);
        if window.width < need_w || window.height < need_h {
            bail!(
                "terminal is {}x{} cells, the playfield needs at least {}x{}",
                window.width,
                window.height,
                need_w,
                need_h
            );
        }
        let window_style = Style::default().bg(config.window_bg).fg(config.window_fg);
        let font_style = window_style.fg(config.font_color);
        let mut canvas = Canvas::new(window, window_style);
        let sprites = SpriteSheet::from_gui(&gui, config.window_bg);
        let board = ui::board_rect(&config, &gui);

        let tiles = ui::board_tiles(&canvas, &config, &gui).context("laying out playfield tiles")?;
        let playfield = Playfield::new(
            config.rows as usize,
            config.columns as usize,
            tiles,
            sprites.background().clone(),
            &mut canvas,
            config.spawn_row,
            config.spawn_column,
        )
        .context("building playfield")?;
        let unpacker = Unpacker::from_kinds(
            config.supply,
            config.source,
            config.seed,
            TetrominoKind::ALL.len(),
        )
        .context("building piece generator")?;
        info!(
            "Playfield {}x{} with spawn anchor {:?}",
            playfield.rows(),
            playfield.columns(),
            playfield.spawn_anchor()
        );
        debug!(
            "Using {:?} gui, {:?} supply over {} variants, {:?} random source",
            config.gui,
            config.supply,
            unpacker.variant_count(),
            config.source
        );

        ui::draw_border(&mut canvas, board, window_style);
        ui::draw_title(&mut canvas, board, &gui, window_style);
        ui::draw_help(&mut canvas, board, font_style);

        Ok(Self {
            config,
            gui,
            sprites,
            canvas,
            board,
            playfield,
            unpacker,
            rotation: Rotation::Spawn,
            font_style,
            running: true,
        })
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[cfg(test)]
    pub fn playfield(&self) -> &Playfield {
        &self.playfield
    }

    #[cfg(test)]
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn handle_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::Quit => {
                debug!("Interrupted, closing the session");
                self.running = false;
            }
            GameEvent::Key(key) => self.apply_action(key_to_action(key)),
            GameEvent::Tick => self.on_tick(),
        }
    }

    fn apply_action(&mut self, action: Action) {
        match action {
            Action::Place(kind) => self.place(kind),
            Action::SpawnNext => {
                let index = self.unpacker.spawn_next();
                match TetrominoKind::from_index(index) {
                    Some(kind) => self.place(kind),
                    None => warn!("Generator index {index} has no piece variant"),
                }
            }
            Action::RotateCw => {
                self.rotation = self.rotation.cw();
                debug!("Placing with rotation {:?}", self.rotation);
            }
            Action::RotateCcw => {
                self.rotation = self.rotation.ccw();
                debug!("Placing with rotation {:?}", self.rotation);
            }
            Action::ClearAll => {
                debug!("Clearing {} occupied tiles", self.playfield.occupied_count());
                self.playfield.clear_all(&mut self.canvas);
            }
            Action::Quit => {
                debug!("User pressed Ctrl-Q to quit the game");
                self.running = false;
            }
            Action::None => {}
        }
    }

    fn place(&mut self, kind: TetrominoKind) {
        let piece = self.sprites.tetromino(kind).with_rotation(self.rotation);
        if let Err(err) = self.playfield.draw_tetromino(&mut self.canvas, &piece) {
            warn!(
                "Rejected {:?} placement in rotation {:?}: {err}",
                piece.kind(),
                piece.rotation()
            );
        }
    }

    fn on_tick(&mut self) {
        let dirty = self.canvas.dirty();
        let (added, peak) = (dirty.added_count(), dirty.peak_count());
        debug!("TICK with {added} rects added (peak {peak} pending)");
        if self.gui.show_diagnostics {
            ui::draw_diagnostics(&mut self.canvas, self.board, added, peak, self.font_style);
        }
        self.canvas.dirty_mut().reset_all();
    }

    /// Main loop: present, wait out the frame while collecting events, dispatch them, tick.
    pub fn run<B>(&mut self, display: &mut Display<B>) -> Result<()>
    where
        B: Backend,
        B::Error: Send + Sync + 'static,
    {
        let frame = Duration::from_secs_f64(1.0 / f64::from(self.config.framerate));
        let mut last_tick = Instant::now();
        display.flip(&mut self.canvas)?;
        info!("Entering main game loop");

        while self.running {
            let frame_start = Instant::now();
            display.update(&mut self.canvas)?;

            let timeout = frame.saturating_sub(frame_start.elapsed());
            if event::poll(timeout)? {
                while self.running && event::poll(Duration::ZERO)? {
                    if let Some(ev) = to_game_event(event::read()?) {
                        self.handle_event(ev);
                    }
                }
            }

            if self.running && last_tick.elapsed() >= TICK_INTERVAL {
                last_tick = Instant::now();
                self.handle_event(GameEvent::Tick);
            }
        }
        info!("Left main game loop");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CONFIG;
    use crate::generator::{SourceKind, SupplyKind};

    fn config() -> Config {
        let mut c = Config::parse(DEFAULT_CONFIG).unwrap();
        c.supply = SupplyKind::Bag;
        c.source = SourceKind::Seeded;
        c.seed = Some(99);
        c
    }

    fn app() -> App {
        let _ = env_logger::builder().is_test(true).try_init();
        App::new(config(), Size::new(80, 30)).unwrap()
    }

    fn press(c: char, modifiers: KeyModifiers) -> GameEvent {
        GameEvent::Key(KeyEvent::new(KeyCode::Char(c), modifiers))
    }

    #[test]
    fn test_number_key_places_piece_at_anchor() {
        let mut app = app();
        app.handle_event(press('1', KeyModifiers::NONE));
        for column in 4..8 {
            assert!(!app.playfield().tile(3, column).unwrap().is_empty());
        }
        assert_eq!(app.playfield().occupied_count(), 4);
    }

    #[test]
    fn test_rotation_applies_to_next_placement() {
        let mut app = app();
        app.handle_event(press('r', KeyModifiers::NONE));
        app.handle_event(press('1', KeyModifiers::NONE));
        for row in 2..6 {
            assert!(!app.playfield().tile(row, 6).unwrap().is_empty());
        }
    }

    #[test]
    fn test_spawn_next_and_clear() {
        let mut app = app();
        app.handle_event(press('n', KeyModifiers::NONE));
        assert_eq!(app.playfield().occupied_count(), 4);
        app.handle_event(press('q', KeyModifiers::NONE));
        assert_eq!(app.playfield().occupied_count(), 0);
        assert!(app.is_running());
    }

    #[test]
    fn test_out_of_bounds_placement_is_ignored() {
        let mut c = config();
        c.spawn_column = 8;
        let mut app = App::new(c, Size::new(80, 30)).unwrap();
        let added = app.canvas().dirty().added_count();
        app.handle_event(press('1', KeyModifiers::NONE));
        assert_eq!(app.playfield().occupied_count(), 0);
        assert_eq!(app.canvas().dirty().added_count(), added);
        assert!(app.is_running());
    }

    #[test]
    fn test_tick_resets_counters() {
        let mut app = app();
        assert!(app.canvas().dirty().added_count() >= 200);
        app.handle_event(GameEvent::Tick);
        assert_eq!(app.canvas().dirty().added_count(), 0);
        assert_eq!(app.canvas().dirty().peak_count(), 0);
        assert!(!app.canvas().dirty().is_empty());
    }

    #[test]
    fn test_quit() {
        let mut app = app();
        app.handle_event(press('q', KeyModifiers::CONTROL));
        assert!(!app.is_running());
        let mut app = self::app();
        let interrupt = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        let event = to_game_event(Event::Key(interrupt)).unwrap();
        assert_eq!(event, GameEvent::Quit);
        app.handle_event(event);
        assert!(!app.is_running());
    }

    #[test]
    fn test_window_too_small() {
        assert!(App::new(config(), Size::new(20, 10)).is_err());
    }

    #[test]
    fn test_release_events_are_dropped() {
        let mut key = KeyEvent::new(KeyCode::Char('1'), KeyModifiers::NONE);
        assert!(matches!(to_game_event(Event::Key(key)), Some(GameEvent::Key(_))));
        key.kind = KeyEventKind::Release;
        assert_eq!(to_game_event(Event::Key(key)), None);
        assert_eq!(to_game_event(Event::Resize(10, 10)), None);
    }
}
