//! Absolutris: a tetromino placement sandbox drawn with dirty-rectangle updates in the terminal.

mod app;
mod canvas;
mod config;
mod dirty;
mod display;
mod generator;
mod gui;
mod input;
mod playfield;
mod tetromino;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use config::Config;
use display::Display;
use generator::{SourceKind, SupplyKind};
use gui::GuiKind;
use log::{debug, error, info};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Size;
use std::fs::File;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_file)?;

    if args.reset_config && Config::delete(&args.config)? {
        info!("Removed {} to restore defaults", args.config.display());
    }
    let mut config = Config::read_or_create(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    args.apply(&mut config);

    let result = run(config);
    if let Err(err) = &result {
        error!("Exiting with error: {err:#}");
    }
    result
}

fn init_logging(path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    // Log to a file: stderr shares the terminal with the playfield.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run(config: Config) -> Result<()> {
    use crossterm::{
        cursor, execute,
        event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
        terminal::{disable_raw_mode, enable_raw_mode, size, EnterAlternateScreen, LeaveAlternateScreen},
    };

    let (cols, rows) = size()?;
    let mut app = App::new(config, Size::new(cols, rows))?;

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
    // Release events are only reported with this; terminals without it just send presses.
    optional(
        "pushing keyboard enhancement flags",
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        ),
    );

    let mut display = Display::new(CrosstermBackend::new(stdout));
    let result = app.run(&mut display);

    optional(
        "popping keyboard enhancement flags",
        execute!(std::io::stdout(), PopKeyboardEnhancementFlags),
    );
    execute!(std::io::stdout(), cursor::Show, LeaveAlternateScreen)?;
    disable_raw_mode()?;

    result
}

/// Log a failed optional terminal setup step and carry on. Returns whether it succeeded.
fn optional(what: &str, result: std::io::Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            debug!("Ignoring failure {what}: {err}");
            false
        }
    }
}

/// Place tetrominoes on a playfield in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "absolutris",
    version,
    about = "Tetromino placement sandbox in the terminal, redrawn one dirty rectangle at a time.",
    long_about = "Absolutris shows a playfield and lets you place tetrominoes on it.\n\n\
        Settings come from an INI file (created with defaults when missing); the flags below \
        override it for one run.\n\n\
        CONTROLS:\n  1-7     Place I J L O S T Z at the spawn point\n  n       Place the next generated piece\n  \
        r / e   Rotate following placements cw / ccw\n  q       Clear the playfield\n  Ctrl+Q  Quit (Ctrl+C works too)"
)]
pub struct Args {
    /// Path to the INI config file. Created with defaults if missing.
    #[arg(short, long, default_value = "config.ini", value_name = "FILE")]
    pub config: PathBuf,

    /// Delete the config file first so the defaults are written again.
    #[arg(long)]
    pub reset_config: bool,

    /// Game window look: default, debug (shows redraw counters) or m.
    #[arg(short, long)]
    pub gui: Option<GuiKind>,

    /// Piece supply policy.
    #[arg(long)]
    pub supply: Option<SupplyKind>,

    /// Random source for the supply policy.
    #[arg(long)]
    pub source: Option<SourceKind>,

    /// Seed for the seeded source. Implies `--source seeded` unless a source is given.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Frame rate limit.
    #[arg(long, value_name = "FPS", value_parser = clap::value_parser!(u32).range(1..))]
    pub framerate: Option<u32>,

    /// Where log output goes. Filter with RUST_LOG.
    #[arg(long, default_value = "absolutris.log", value_name = "FILE")]
    pub log_file: PathBuf,
}

impl Args {
    /// Command-line values win over the file.
    fn apply(&self, config: &mut Config) {
        if let Some(gui) = self.gui {
            config.gui = gui;
        }
        if let Some(supply) = self.supply {
            config.supply = supply;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
            config.source = SourceKind::Seeded;
        }
        if let Some(source) = self.source {
            config.source = source;
        }
        if let Some(framerate) = self.framerate {
            config.framerate = framerate;
        }
    }
}
