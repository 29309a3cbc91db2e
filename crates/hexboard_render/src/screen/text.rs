use std::sync::Arc;

use super::{Frame, Screen};
use crate::font::{Font, Glyph, SegmentFont};
use crate::layout::geometry::{FILLER_SLOT, SEGMENTS_PER_DIGIT};
use crate::layout::Layout;

/// Uniform intensity scaling applied when a text screen renders.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Style {
    brightness: f32,
}

impl Style {
    pub fn brightness(level: f32) -> Self {
        Self { brightness: level.max(0.0) }
    }

    pub fn level(&self) -> f32 {
        self.brightness
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::brightness(1.0)
    }
}

#[derive(Clone, Copy, Debug)]
struct Marker {
    column: usize,
    row: usize,
    glyph: Glyph,
}

/// A row/column grid of glyphs addressed through the layout's text cells.
pub struct TextScreen {
    layout: Arc<Layout>,
    font: Arc<dyn Font>,
    cells: Vec<Glyph>,
    style: Style,
    marker: Option<Marker>,
}

impl TextScreen {
    pub fn new(layout: Arc<Layout>) -> Self {
        let cells = vec![Glyph::BLANK; layout.columns() * layout.rows()];
        Self {
            layout,
            font: Arc::new(SegmentFont),
            cells,
            style: Style::default(),
            marker: None,
        }
    }

    pub fn set_font(&mut self, font: Arc<dyn Font>) {
        self.font = font;
    }

    pub fn font(&self) -> &dyn Font {
        self.font.as_ref()
    }

    pub fn layout(&self) -> &Arc<Layout> {
        &self.layout
    }

    pub fn columns(&self) -> usize {
        self.layout.columns()
    }

    pub fn rows(&self) -> usize {
        self.layout.rows()
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    pub fn clear(&mut self) {
        self.cells.fill(Glyph::BLANK);
    }

    pub fn write_at(&mut self, text: &str, column: i32, row: i32) {
        let glyphs = self.font.glyphs(text);
        self.write_raw_at(&glyphs, column, row);
    }

    /// Write glyphs left to right from `(column, row)`, dropping whatever runs past
    /// the right edge. Out of range start positions are ignored.
    pub fn write_raw_at(&mut self, glyphs: &[Glyph], column: i32, row: i32) {
        let Some(start) = self.cell_index(column, row) else {
            return;
        };
        let room = self.columns() - column as usize;
        let count = glyphs.len().min(room);
        self.cells[start..start + count].copy_from_slice(&glyphs[..count]);
    }

    pub fn glyph_at(&self, column: i32, row: i32) -> Option<Glyph> {
        self.cell_index(column, row).map(|index| self.cells[index])
    }

    /// Overlay `glyph` on a single cell without touching the written text. Moving the
    /// marker off the grid hides it.
    pub fn set_marker(&mut self, column: i32, row: i32, glyph: Glyph) {
        self.marker = self.cell_index(column, row).map(|_| Marker {
            column: column as usize,
            row: row as usize,
            glyph,
        });
    }

    pub fn clear_marker(&mut self) {
        self.marker = None;
    }

    pub fn marker(&self) -> Option<(usize, usize, Glyph)> {
        self.marker.map(|marker| (marker.column, marker.row, marker.glyph))
    }

    fn cell_index(&self, column: i32, row: i32) -> Option<usize> {
        let column = usize::try_from(column).ok()?;
        let row = usize::try_from(row).ok()?;
        if column >= self.columns() || row >= self.rows() {
            return None;
        }
        Some(row * self.columns() + column)
    }

    fn put_glyph(&self, frame: &mut Frame, column: usize, row: usize, glyph: &Glyph) {
        let Some(digit) = self.layout.cell_digit(column, row) else {
            return;
        };
        let level = self.style.level();
        let base = digit * SEGMENTS_PER_DIGIT;
        for slot in 0..FILLER_SLOT {
            let value = (glyph.level(slot) * level).clamp(0.0, 1.0);
            frame[base + slot] = frame[base + slot].max(value);
        }
    }
}

impl Screen for TextScreen {
    fn segment_count(&self) -> usize {
        self.layout.segment_count()
    }

    fn render(&mut self) -> Frame {
        let mut frame = vec![0.0; self.segment_count()];
        let columns = self.columns();
        for (index, glyph) in self.cells.iter().enumerate() {
            if !glyph.is_blank() {
                self.put_glyph(&mut frame, index % columns, index / columns, glyph);
            }
        }
        if let Some(marker) = self.marker {
            self.put_glyph(&mut frame, marker.column, marker.row, &marker.glyph);
        }
        frame
    }
}
