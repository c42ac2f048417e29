//! Layout: where the board sits in the window, its tiles, border, title and diagnostics.

use crate::canvas::{Canvas, CanvasError};
use crate::config::Config;
use crate::gui::Gui;
use crate::playfield::Tile;
use ratatui::layout::{Position, Rect};
use log::debug;
use ratatui::style::Style;

/// Gap between the board border and the side text.
const SIDE_GAP: u16 = 2;

/// Board rect (tiles only, no border) in window cells.
pub fn board_rect(config: &Config, gui: &Gui) -> Rect {
    Rect::new(
        config.x_position,
        config.y_position,
        config.columns.saturating_mul(gui.mino_width),
        config.rows.saturating_mul(gui.mino_height),
    )
}

/// Window size the board plus border needs.
pub fn required_window(config: &Config, gui: &Gui) -> (u16, u16) {
    let board = board_rect(config, gui);
    (board.right().saturating_add(1), board.bottom().saturating_add(1))
}

/// One surface per grid cell, row-major, each sized to one mino.
pub fn board_tiles(canvas: &Canvas, config: &Config, gui: &Gui) -> Result<Vec<Tile>, CanvasError> {
    let board = board_rect(config, gui);
    let mut tiles = Vec::with_capacity(config.rows as usize * config.columns as usize);
    for row in 0..config.rows {
        for column in 0..config.columns {
            let rect = Rect::new(
                board.x + column * gui.mino_width,
                board.y + row * gui.mino_height,
                gui.mino_width,
                gui.mino_height,
            );
            tiles.push(Tile::new(canvas.subsurface(rect)?));
        }
    }
    Ok(tiles)
}

/// Box-drawing frame one cell outside `board`. Parts falling off the window are skipped.
pub fn draw_border(canvas: &mut Canvas, board: Rect, style: Style) {
    if board.x == 0 || board.y == 0 {
        return;
    }
    let (left, top) = (board.x - 1, board.y - 1);
    let (right, bottom) = (board.right(), board.bottom());
    let span = "─".repeat(board.width as usize);
    canvas.draw_text(Position::new(left, top), &format!("┌{span}┐"), style);
    canvas.draw_text(Position::new(left, bottom), &format!("└{span}┘"), style);
    for y in board.top()..board.bottom() {
        canvas.draw_text(Position::new(left, y), "│", style);
        canvas.draw_text(Position::new(right, y), "│", style);
    }
}

/// Title on the top row. Skipped when the border (or the board) already occupies it.
pub fn draw_title(canvas: &mut Canvas, board: Rect, gui: &Gui, style: Style) -> Option<Rect> {
    if board.y < 2 {
        debug!("No room above the playfield for the title");
        return None;
    }
    Some(canvas.draw_text(Position::new(board.x, 0), gui.title, style))
}

/// Key help to the right of the board.
pub fn draw_help(canvas: &mut Canvas, board: Rect, style: Style) {
    const HELP: [&str; 5] = [
        "1-7  place I J L O S T Z",
        "n    place next",
        "r/e  rotate cw/ccw",
        "q    clear",
        "^q   quit",
    ];
    let x = board.right() + 1 + SIDE_GAP;
    for (i, line) in HELP.iter().enumerate() {
        canvas.draw_text(Position::new(x, board.y + i as u16), line, style);
    }
}

/// Redraw the diagnostics line (added/peak rects per tick) below the help text.
pub fn draw_diagnostics(
    canvas: &mut Canvas,
    board: Rect,
    added: usize,
    peak: usize,
    style: Style,
) -> Rect {
    let at = Position::new(board.right() + 1 + SIDE_GAP, board.y + 7);
    canvas.clear_line(at, style);
    canvas.draw_text(at, &format!("rects/tick {added:>4}  peak {peak:>4}"), style)
}
