//! Drawing layer: the window buffer, sub-surfaces of it, and sprites blitted onto them.

use crate::dirty::DirtyRegions;
use ratatui::buffer::{Buffer, Cell};
use ratatui::layout::{Position, Rect, Size};
use ratatui::style::Style;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CanvasError {
    #[error("surface {rect:?} lies outside the {window:?} window")]
    OutsideWindow { rect: Rect, window: Rect },
}

/// An image: a block of styled cells. Clones share the same cells.
#[derive(Debug, Clone)]
pub struct Sprite {
    size: Size,
    cells: Rc<[Cell]>,
}

impl Sprite {
    /// Sprite of `width` x `height` cells, each showing `symbol` in `style`.
    pub fn solid(width: u16, height: u16, symbol: &str, style: Style) -> Self {
        let mut cell = Cell::default();
        cell.set_symbol(symbol).set_style(style);
        let count = width as usize * height as usize;
        Self {
            size: Size::new(width, height),
            cells: vec![cell; count].into(),
        }
    }

    #[cfg(test)]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Cell at local (x, y), row-major.
    pub fn cell(&self, x: u16, y: u16) -> Option<&Cell> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        self.cells
            .get(y as usize * self.size.width as usize + x as usize)
    }

    /// True if both handles refer to the same sprite data.
    #[cfg(test)]
    pub fn same(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.cells, &b.cells)
    }
}

/// A rectangular region of the window with a fixed absolute offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surface {
    offset: Position,
    size: Size,
}

impl Surface {
    #[inline]
    pub fn abs_offset(&self) -> Position {
        self.offset
    }

    /// Rect in surface-local coordinates (origin at 0,0).
    pub fn local_rect(&self) -> Rect {
        Rect::new(0, 0, self.size.width, self.size.height)
    }
}

/// Translate a surface-local rect to absolute window coordinates.
pub fn to_absolute(local: Rect, offset: Position) -> Rect {
    Rect::new(
        local.x + offset.x,
        local.y + offset.y,
        local.width,
        local.height,
    )
}

/// The game window: cell buffer plus the tracker of rects changed since the last update.
#[derive(Debug, Clone)]
pub struct Canvas {
    buffer: Buffer,
    dirty: DirtyRegions,
}

impl Canvas {
    /// Window of `size` cells filled with `style`.
    pub fn new(size: Size, style: Style) -> Self {
        let area = Rect::new(0, 0, size.width, size.height);
        let mut buffer = Buffer::empty(area);
        buffer.set_style(area, style);
        Self {
            buffer,
            dirty: DirtyRegions::new(),
        }
    }

    #[inline]
    pub fn area(&self) -> Rect {
        self.buffer.area
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn dirty(&self) -> &DirtyRegions {
        &self.dirty
    }

    pub fn dirty_mut(&mut self) -> &mut DirtyRegions {
        &mut self.dirty
    }

    /// Surface covering `rect`, which must lie fully inside the window.
    pub fn subsurface(&self, rect: Rect) -> Result<Surface, CanvasError> {
        let window = self.area();
        if rect.is_empty() || window.intersection(rect) != rect {
            return Err(CanvasError::OutsideWindow { rect, window });
        }
        Ok(Surface {
            offset: Position::new(rect.x, rect.y),
            size: Size::new(rect.width, rect.height),
        })
    }

    /// Copy `sprite` to the surface's local origin, clipped to the surface.
    /// Returns the written rect in surface-local coordinates; nothing is tracked.
    pub fn blit(&mut self, surface: &Surface, sprite: &Sprite) -> Rect {
        let width = sprite.size.width.min(surface.size.width);
        let height = sprite.size.height.min(surface.size.height);
        for y in 0..height {
            for x in 0..width {
                let Some(src) = sprite.cell(x, y) else {
                    continue;
                };
                let pos = (surface.offset.x + x, surface.offset.y + y);
                if let Some(dst) = self.buffer.cell_mut(pos) {
                    *dst = src.clone();
                }
            }
        }
        Rect::new(0, 0, width, height)
    }

    /// Write one line of text and track the touched rect. Text past the right edge is cut.
    pub fn draw_text(&mut self, at: Position, text: &str, style: Style) -> Rect {
        let area = self.area();
        if !area.contains(at) {
            return Rect::new(at.x, at.y, 0, 0);
        }
        let max_width = (area.right() - at.x) as usize;
        let (end_x, _) = self.buffer.set_stringn(at.x, at.y, text, max_width, style);
        let rect = Rect::new(at.x, at.y, end_x - at.x, 1);
        self.dirty.append_tracked(rect);
        rect
    }

    /// Reset one line from `at` to the right edge to `style` blanks and track it.
    pub fn clear_line(&mut self, at: Position, style: Style) -> Rect {
        let area = self.area();
        if !area.contains(at) {
            return Rect::new(at.x, at.y, 0, 0);
        }
        let rect = Rect::new(at.x, at.y, area.right() - at.x, 1);
        for x in rect.left()..rect.right() {
            if let Some(cell) = self.buffer.cell_mut((x, at.y)) {
                cell.reset();
                cell.set_style(style);
            }
        }
        self.dirty.append_tracked(rect);
        rect
    }
}
