//! GUI presets (closed set, selected by name at startup) and the sprites built from them.

use crate::canvas::Sprite;
use crate::tetromino::{Tetromino, TetrominoKind};
use clap::ValueEnum;
use ratatui::style::{Color, Style};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuiError {
    #[error("cannot find any gui named \"{0}\"")]
    NotImplemented(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum GuiKind {
    #[default]
    Default,
    Debug,
    /// Compact: one terminal cell per mino.
    M,
}

const GUI_NAMES: [(&str, GuiKind); 3] = [
    ("default", GuiKind::Default),
    ("debug", GuiKind::Debug),
    ("m", GuiKind::M),
];

impl FromStr for GuiKind {
    type Err = GuiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        GUI_NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, kind)| kind)
            .ok_or(GuiError::NotImplemented(name))
    }
}

/// Guideline piece colours, indexed like `TetrominoKind::ALL`.
const GUIDELINE: [Color; 7] = [
    Color::Rgb(0x00, 0xF0, 0xF0), // I cyan
    Color::Rgb(0x00, 0x50, 0xF0), // J blue
    Color::Rgb(0xF0, 0xA0, 0x00), // L orange
    Color::Rgb(0xF0, 0xF0, 0x00), // O yellow
    Color::Rgb(0x00, 0xF0, 0x00), // S green
    Color::Rgb(0xA0, 0x00, 0xF0), // T purple
    Color::Rgb(0xF0, 0x00, 0x00), // Z red
];

/// Layout and glyphs of one preset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gui {
    pub title: &'static str,
    /// Terminal cells per mino.
    pub mino_width: u16,
    pub mino_height: u16,
    pub piece_symbol: &'static str,
    pub empty_symbol: &'static str,
    pub empty_fg: Color,
    pub pieces: [Color; 7],
    /// Show the once-per-tick redraw counters under the title.
    pub show_diagnostics: bool,
}

impl Gui {
    pub fn preset(kind: GuiKind) -> Self {
        match kind {
            GuiKind::Default => Self {
                title: "Absolutris",
                mino_width: 2,
                mino_height: 1,
                piece_symbol: "█",
                empty_symbol: "·",
                empty_fg: Color::Rgb(0x46, 0x46, 0x46),
                pieces: GUIDELINE,
                show_diagnostics: false,
            },
            GuiKind::Debug => Self {
                title: "Absolutris [debug]",
                mino_width: 2,
                mino_height: 1,
                piece_symbol: "▓",
                empty_symbol: ".",
                empty_fg: Color::DarkGray,
                pieces: [
                    Color::Cyan,
                    Color::Blue,
                    Color::LightRed,
                    Color::Yellow,
                    Color::Green,
                    Color::Magenta,
                    Color::Red,
                ],
                show_diagnostics: true,
            },
            GuiKind::M => Self {
                title: "Absolutris M",
                mino_width: 1,
                mino_height: 1,
                piece_symbol: "■",
                empty_symbol: "·",
                empty_fg: Color::Rgb(0x46, 0x46, 0x46),
                pieces: GUIDELINE,
                show_diagnostics: false,
            },
        }
    }

    #[inline]
    pub fn piece_color(&self, kind: TetrominoKind) -> Color {
        self.pieces[kind.index()]
    }
}

/// Decoded sprites for one session: background tile plus one sprite per variant.
#[derive(Debug, Clone)]
pub struct SpriteSheet {
    background: Sprite,
    pieces: [Sprite; 7],
}

impl SpriteSheet {
    /// All sprites are `mino_width x mino_height`, drawn on `window_bg`.
    pub fn from_gui(gui: &Gui, window_bg: Color) -> Self {
        let (w, h) = (gui.mino_width, gui.mino_height);
        let base = Style::default().bg(window_bg);
        let background = Sprite::solid(w, h, gui.empty_symbol, base.fg(gui.empty_fg));
        let pieces = TetrominoKind::ALL
            .map(|kind| Sprite::solid(w, h, gui.piece_symbol, base.fg(gui.piece_color(kind))));
        Self { background, pieces }
    }

    pub fn background(&self) -> &Sprite {
        &self.background
    }

    pub fn piece(&self, kind: TetrominoKind) -> &Sprite {
        &self.pieces[kind.index()]
    }

    /// Fresh spawn-state piece of `kind` using this sheet's sprite.
    pub fn tetromino(&self, kind: TetrominoKind) -> Tetromino {
        Tetromino::new(kind, self.piece(kind).clone())
    }
}
