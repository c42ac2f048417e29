//! Display driver: pushes only the dirty parts of the canvas to the terminal backend.

use crate::canvas::Canvas;
use log::trace;
use ratatui::backend::Backend;
use ratatui::buffer::Cell;

pub struct Display<B: Backend> {
    backend: B,
}

impl<B: Backend> Display<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Draw the whole canvas and drop whatever was pending.
    pub fn flip(&mut self, canvas: &mut Canvas) -> Result<(), B::Error> {
        canvas.dirty_mut().drain();
        let buffer = canvas.buffer();
        let content = buffer
            .area
            .positions()
            .filter_map(|p| buffer.cell(p).map(|cell| (p.x, p.y, cell)));
        self.backend.draw(content)?;
        self.backend.flush()
    }

    /// Drain the canvas' dirty rects and draw the cells they cover.
    /// Returns how many rects were drained.
    pub fn update(&mut self, canvas: &mut Canvas) -> Result<usize, B::Error> {
        let rects = canvas.dirty_mut().drain();
        let buffer = canvas.buffer();
        let mut content: Vec<(u16, u16, &Cell)> = Vec::new();
        for rect in &rects {
            let rect = rect.intersection(buffer.area);
            for y in rect.top()..rect.bottom() {
                for x in rect.left()..rect.right() {
                    if let Some(cell) = buffer.cell((x, y)) {
                        content.push((x, y, cell));
                    }
                }
            }
        }
        if !content.is_empty() {
            trace!("Updating {} cells in {} rects", content.len(), rects.len());
            self.backend.draw(content.into_iter())?;
        }
        self.backend.flush()?;
        Ok(rects.len())
    }
}
