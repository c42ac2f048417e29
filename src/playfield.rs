//! Playfield: a rows x columns grid of tiles, each remembering every sprite stamped onto it.

use crate::canvas::{to_absolute, Canvas, Sprite, Surface};
use crate::tetromino::Tetromino;
use ratatui::layout::Rect;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlayfieldError {
    #[error("playfield needs {expected} tiles, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[error("cell (row {row}, column {column}) is outside the playfield")]
    OutOfBounds { row: i32, column: i32 },
}

/// One grid cell: a window surface and the history ("hold") of sprites blitted onto it.
///
/// The first entry of `hold` is the background and does not count as content.
#[derive(Debug, Clone)]
pub struct Tile {
    surface: Surface,
    hold: Vec<Sprite>,
}

impl Tile {
    pub fn new(surface: Surface) -> Self {
        Self {
            surface,
            hold: Vec::new(),
        }
    }

    /// Blit at the surface origin, track the absolute rect and remember the sprite.
    pub fn blit_onto(&mut self, canvas: &mut Canvas, sprite: &Sprite) {
        let rect = self.stamp(canvas, sprite);
        canvas.dirty_mut().append_tracked(rect);
    }

    /// Untracked blit; returns the absolute rect for the caller to track.
    fn stamp(&mut self, canvas: &mut Canvas, sprite: &Sprite) -> Rect {
        let local = canvas.blit(&self.surface, sprite);
        self.hold.push(sprite.clone());
        to_absolute(local, self.surface.abs_offset())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hold.len() <= 1
    }

    /// Absolute window rect of this tile.
    #[cfg(test)]
    pub fn get_rect(&self) -> Rect {
        to_absolute(self.surface.local_rect(), self.surface.abs_offset())
    }

    #[cfg(test)]
    pub fn hold(&self) -> &[Sprite] {
        &self.hold
    }
}

/// Grid of tiles plus the spawn anchor pieces are placed against.
#[derive(Debug, Clone)]
pub struct Playfield {
    rows: usize,
    columns: usize,
    /// Row-major: tiles[row * columns + column].
    tiles: Vec<Tile>,
    background: Sprite,
    spawn_row: i32,
    spawn_column: i32,
}

impl Playfield {
    /// Take exactly `rows * columns` tiles (row-major) and stamp the background onto each.
    pub fn new<I>(
        rows: usize,
        columns: usize,
        tiles: I,
        background: Sprite,
        canvas: &mut Canvas,
        spawn_row: i32,
        spawn_column: i32,
    ) -> Result<Self, PlayfieldError>
    where
        I: IntoIterator<Item = Tile>,
    {
        let tiles: Vec<Tile> = tiles.into_iter().collect();
        let expected = rows * columns;
        if tiles.len() != expected {
            return Err(PlayfieldError::ShapeMismatch {
                expected,
                actual: tiles.len(),
            });
        }
        let mut playfield = Self {
            rows,
            columns,
            tiles,
            background,
            spawn_row,
            spawn_column,
        };
        playfield.blit_initial_sprites(canvas);
        Ok(playfield)
    }

    fn blit_initial_sprites(&mut self, canvas: &mut Canvas) {
        let background = self.background.clone();
        for tile in &mut self.tiles {
            tile.blit_onto(canvas, &background);
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// (spawn_row, spawn_column).
    pub fn spawn_anchor(&self) -> (i32, i32) {
        (self.spawn_row, self.spawn_column)
    }

    fn index_of(&self, column: i32, row: i32) -> Result<usize, PlayfieldError> {
        let in_range = |v: i32, len: usize| usize::try_from(v).ok().filter(|&v| v < len);
        match (in_range(row, self.rows), in_range(column, self.columns)) {
            (Some(r), Some(c)) => Ok(r * self.columns + c),
            _ => Err(PlayfieldError::OutOfBounds { row, column }),
        }
    }

    #[cfg(test)]
    pub fn tile(&self, row: usize, column: usize) -> Option<&Tile> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        self.tiles.get(row * self.columns + column)
    }

    #[cfg(test)]
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Number of tiles holding something besides the background.
    pub fn occupied_count(&self) -> usize {
        self.tiles.iter().filter(|t| !t.is_empty()).count()
    }

    /// Blit `sprite` onto the tile at (row, column). Nothing changes when out of range.
    pub fn blit_at(
        &mut self,
        canvas: &mut Canvas,
        column: i32,
        row: i32,
        sprite: &Sprite,
    ) -> Result<(), PlayfieldError> {
        let index = self.index_of(column, row)?;
        self.tiles[index].blit_onto(canvas, sprite);
        Ok(())
    }

    /// Restore every occupied tile to background-only. The restored rects are tracked as one batch.
    pub fn clear_all(&mut self, canvas: &mut Canvas) {
        let background = self.background.clone();
        let mut rects = Vec::new();
        for tile in self.tiles.iter_mut().filter(|t| !t.is_empty()) {
            tile.hold.clear();
            rects.push(tile.stamp(canvas, &background));
        }
        canvas.dirty_mut().extend_tracked(rects);
    }

    /// Stamp each mino of `piece` relative to the spawn anchor.
    ///
    /// Occupancy is not checked. All target cells are validated first, so a piece
    /// reaching outside the grid is rejected whole.
    pub fn draw_tetromino(
        &mut self,
        canvas: &mut Canvas,
        piece: &Tetromino,
    ) -> Result<(), PlayfieldError> {
        // Saturated sums land outside any grid and fail the bounds check below.
        let minoes = *piece.minoes();
        let targets = minoes.map(|mino| {
            (
                self.spawn_column.saturating_add(mino.column),
                self.spawn_row
                    .saturating_add(mino.row)
                    .saturating_add(piece.spawn_offset()),
            )
        });
        for &(column, row) in &targets {
            self.index_of(column, row)?;
        }
        for (column, row) in targets {
            self.blit_at(canvas, column, row, piece.sprite())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tetromino::{Rotation, TetrominoKind};
    use ratatui::layout::Size;
    use ratatui::style::{Color, Style};

    const ROWS: usize = 20;
    const COLUMNS: usize = 10;

    fn background() -> Sprite {
        Sprite::solid(2, 1, "·", Style::default())
    }

    fn block() -> Sprite {
        Sprite::solid(2, 1, "█", Style::default().fg(Color::Cyan))
    }

    fn tiles(canvas: &Canvas, rows: usize, columns: usize) -> Vec<Tile> {
        let mut out = Vec::new();
        for row in 0..rows as u16 {
            for column in 0..columns as u16 {
                let rect = Rect::new(1 + column * 2, 1 + row, 2, 1);
                out.push(Tile::new(canvas.subsurface(rect).unwrap()));
            }
        }
        out
    }

    fn setup(spawn_row: i32, spawn_column: i32) -> (Canvas, Playfield) {
        let mut canvas = Canvas::new(Size::new(40, 30), Style::default());
        let t = tiles(&canvas, ROWS, COLUMNS);
        let pf = Playfield::new(
            ROWS,
            COLUMNS,
            t,
            background(),
            &mut canvas,
            spawn_row,
            spawn_column,
        )
        .unwrap();
        (canvas, pf)
    }

    fn holds(pf: &Playfield) -> Vec<usize> {
        pf.tiles().map(|t| t.hold().len()).collect()
    }

    #[test]
    fn test_fresh_grid_shape() {
        let (canvas, pf) = setup(3, 4);
        assert_eq!(pf.tiles().count(), ROWS * COLUMNS);
        assert!(pf.tiles().all(|t| t.is_empty() && t.hold().len() == 1));
        assert_eq!(canvas.dirty().added_count(), ROWS * COLUMNS);
        assert_eq!(canvas.dirty().peak_count(), ROWS * COLUMNS);
    }

    #[test]
    fn test_drain_keeps_counters() {
        let (mut canvas, _pf) = setup(3, 4);
        let drained = canvas.dirty_mut().drain();
        assert_eq!(drained.len(), ROWS * COLUMNS);
        assert!(canvas.dirty().is_empty());
        assert_eq!(canvas.dirty().added_count(), ROWS * COLUMNS);
        assert_eq!(canvas.dirty().peak_count(), ROWS * COLUMNS);
    }

    #[test]
    fn test_shape_mismatch() {
        let mut canvas = Canvas::new(Size::new(40, 30), Style::default());
        let t = tiles(&canvas, 2, 3);
        let err = Playfield::new(2, 4, t, background(), &mut canvas, 0, 0).unwrap_err();
        assert_eq!(
            err,
            PlayfieldError::ShapeMismatch {
                expected: 8,
                actual: 6
            }
        );
        assert!(canvas.dirty().is_empty());
    }

    #[test]
    fn test_tile_rect_is_absolute() {
        let (_canvas, pf) = setup(3, 4);
        assert_eq!(pf.tile(2, 3).unwrap().get_rect(), Rect::new(7, 3, 2, 1));
    }

    #[test]
    fn test_place_i_piece() {
        let (mut canvas, mut pf) = setup(3, 4);
        canvas.dirty_mut().drain();
        let piece = Tetromino::new(TetrominoKind::I, block());
        pf.draw_tetromino(&mut canvas, &piece).unwrap();
        for column in 4..8 {
            let tile = pf.tile(3, column).unwrap();
            assert_eq!(tile.hold().len(), 2);
            assert!(Sprite::same(&tile.hold()[1], piece.sprite()));
        }
        assert_eq!(pf.occupied_count(), 4);
        assert_eq!(canvas.dirty().len(), 4);
        assert_eq!(canvas.dirty().pending()[0], pf.tile(3, 4).unwrap().get_rect());
        assert_eq!(canvas.buffer()[(9, 4)].symbol(), "█");
    }

    #[test]
    fn test_place_applies_spawn_offset() {
        let (mut canvas, mut pf) = setup(3, 4);
        let piece = Tetromino::new(TetrominoKind::T, block());
        pf.draw_tetromino(&mut canvas, &piece).unwrap();
        // T spawn state: (0,1) (1,0) (1,1) (1,2), shifted up by one row.
        for (row, column) in [(2, 5), (3, 4), (3, 5), (3, 6)] {
            assert!(!pf.tile(row, column).unwrap().is_empty());
        }
        assert_eq!(pf.occupied_count(), 4);
    }

    #[test]
    fn test_placement_ignores_occupancy() {
        let (mut canvas, mut pf) = setup(3, 4);
        let piece = Tetromino::new(TetrominoKind::O, block());
        pf.draw_tetromino(&mut canvas, &piece).unwrap();
        pf.draw_tetromino(&mut canvas, &piece).unwrap();
        assert_eq!(pf.tile(2, 4).unwrap().hold().len(), 3);
    }

    #[test]
    fn test_out_of_bounds_blit() {
        let (mut canvas, mut pf) = setup(3, 4);
        let before_holds = holds(&pf);
        let before_dirty = canvas.dirty().clone();
        let rows = ROWS as i32;
        assert_eq!(
            pf.blit_at(&mut canvas, -1, 0, &block()),
            Err(PlayfieldError::OutOfBounds { row: 0, column: -1 })
        );
        assert_eq!(
            pf.blit_at(&mut canvas, 0, rows, &block()),
            Err(PlayfieldError::OutOfBounds { row: rows, column: 0 })
        );
        assert_eq!(holds(&pf), before_holds);
        assert_eq!(canvas.dirty(), &before_dirty);
    }

    #[test]
    fn test_partly_outside_piece_is_rejected_whole() {
        let (mut canvas, mut pf) = setup(0, 8);
        canvas.dirty_mut().drain();
        let piece = Tetromino::new(TetrominoKind::I, block());
        assert!(matches!(
            pf.draw_tetromino(&mut canvas, &piece),
            Err(PlayfieldError::OutOfBounds { .. })
        ));
        assert_eq!(pf.occupied_count(), 0);
        assert!(canvas.dirty().is_empty());
        // Rotated upright the I piece reaches row -1 from anchor row 0.
        let upright = piece.clone().with_rotation(Rotation::Right);
        assert!(pf.draw_tetromino(&mut canvas, &upright).is_err());
    }

    #[test]
    fn test_extreme_anchor_is_out_of_bounds() {
        for (row, column) in [(3, i32::MAX), (i32::MAX, 4), (i32::MIN, 4), (3, i32::MIN)] {
            let (mut canvas, mut pf) = setup(row, column);
            canvas.dirty_mut().drain();
            for kind in TetrominoKind::ALL {
                let piece = Tetromino::new(kind, block()).with_rotation(Rotation::Left);
                assert!(matches!(
                    pf.draw_tetromino(&mut canvas, &piece),
                    Err(PlayfieldError::OutOfBounds { .. })
                ));
            }
            assert_eq!(pf.occupied_count(), 0);
            assert!(canvas.dirty().is_empty());
        }
    }

    #[test]
    fn test_clear_all_is_idempotent() {
        let (mut canvas, mut pf) = setup(3, 4);
        pf.draw_tetromino(&mut canvas, &Tetromino::new(TetrominoKind::S, block()))
            .unwrap();
        canvas.dirty_mut().drain();
        pf.clear_all(&mut canvas);
        assert_eq!(canvas.dirty().len(), 4);
        let once = holds(&pf);
        assert!(once.iter().all(|&n| n == 1));
        pf.clear_all(&mut canvas);
        assert_eq!(holds(&pf), once);
        assert_eq!(canvas.dirty().len(), 4);
        assert!(pf
            .tiles()
            .all(|t| Sprite::same(&t.hold()[0], &pf.background)));
    }

    #[test]
    fn test_hold_history_grows() {
        let (mut canvas, mut pf) = setup(3, 4);
        let n = 5;
        for _ in 0..n {
            pf.blit_at(&mut canvas, 2, 7, &block()).unwrap();
        }
        let tile = pf.tile(7, 2).unwrap();
        assert_eq!(tile.hold().len(), 1 + n);
        assert!(!tile.is_empty());
    }
}
