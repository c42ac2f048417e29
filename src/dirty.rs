//! Dirty regions: screen rects changed since the last display update, plus redraw counters.

use ratatui::layout::Rect;

/// Pending screen rectangles with peak/added counters for diagnostics.
///
/// The counters never influence `drain`; they are reset on their own schedule
/// (once per tick) while the pending list is drained once per frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtyRegions {
    pending: Vec<Rect>,
    /// Highest pending length since the last peak reset.
    peak: usize,
    /// Rects appended since the last added reset.
    added: usize,
}

impl DirtyRegions {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn update_peak(&mut self) {
        self.peak = self.peak.max(self.pending.len());
    }

    pub fn append_tracked(&mut self, rect: Rect) {
        self.pending.push(rect);
        self.added += 1;
        self.update_peak();
    }

    /// Append a batch; the peak is compared once after the whole batch.
    pub fn extend_tracked<I>(&mut self, rects: I)
    where
        I: IntoIterator<Item = Rect>,
    {
        let before = self.pending.len();
        self.pending.extend(rects);
        self.added += self.pending.len() - before;
        self.update_peak();
    }

    /// Remove and return every pending rect, oldest first.
    pub fn drain(&mut self) -> Vec<Rect> {
        std::mem::take(&mut self.pending)
    }

    pub fn reset_peak(&mut self) {
        self.peak = 0;
    }

    pub fn reset_added(&mut self) {
        self.added = 0;
    }

    pub fn reset_all(&mut self) {
        self.reset_peak();
        self.reset_added();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[inline]
    pub fn peak_count(&self) -> usize {
        self.peak
    }

    #[inline]
    pub fn added_count(&self) -> usize {
        self.added
    }

    #[cfg(test)]
    pub fn pending(&self) -> &[Rect] {
        &self.pending
    }
}
