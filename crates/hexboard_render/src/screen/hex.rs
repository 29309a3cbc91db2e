use std::sync::Arc;

use super::text::TextScreen;
use super::{Frame, Screen};
use crate::font::Glyph;
use crate::layout::Layout;

/// Title text occupies the first row, up to this many cells.
pub const TITLE_CELLS: usize = 64;
pub const FIELD_COUNT: usize = 256;
pub const LINE_COUNT: usize = 16;
const FIELDS_PER_LINE: usize = 16;
const OFFSET_DIGITS: usize = 8;
const HEX_DIGITS: usize = 2;

const HEX_START_ROW: usize = 0;
const OFFSET_COLUMN: usize = 0;
const ASCII_COLUMN: usize = 69;
/// First text column of each hex byte on a line; a wider gap separates the halves.
const HEX_COLUMNS: [usize; FIELDS_PER_LINE] =
    [13, 16, 19, 22, 25, 28, 31, 34, 41, 44, 47, 50, 53, 56, 59, 62];

/// Hex-dump view: an offset column, sixteen two digit hex fields and an ascii band
/// per line, built on text screen addressing. Out of range fields and lines are ignored.
pub struct HexScreen {
    text: TextScreen,
}

impl HexScreen {
    pub fn new(layout: Arc<Layout>) -> Self {
        Self { text: TextScreen::new(layout) }
    }

    pub fn text(&self) -> &TextScreen {
        &self.text
    }

    pub fn text_mut(&mut self) -> &mut TextScreen {
        &mut self.text
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn write_raw_title(&mut self, glyphs: &[Glyph], start: i32) {
        let Ok(start) = usize::try_from(start) else {
            return;
        };
        if start >= TITLE_CELLS {
            return;
        }
        let count = glyphs.len().min(TITLE_CELLS - start);
        self.write_at(&glyphs[..count], start, HEX_START_ROW);
    }

    pub fn write_raw_hex_field(&mut self, glyphs: &[Glyph], field: i32) {
        let Some(field) = field_index(field) else {
            return;
        };
        let digits = padded::<HEX_DIGITS>(glyphs);
        self.write_at(
            &digits,
            HEX_COLUMNS[field % FIELDS_PER_LINE],
            HEX_START_ROW + field / FIELDS_PER_LINE,
        );
    }

    pub fn write_raw_ascii_field(&mut self, glyph: Glyph, field: i32) {
        let Some(field) = field_index(field) else {
            return;
        };
        self.write_at(
            &[glyph],
            ASCII_COLUMN + field % FIELDS_PER_LINE,
            HEX_START_ROW + field / FIELDS_PER_LINE,
        );
    }

    pub fn write_raw_offset(&mut self, glyphs: &[Glyph], line: i32) {
        let Ok(line) = usize::try_from(line) else {
            return;
        };
        if line >= LINE_COUNT {
            return;
        }
        let digits = padded::<OFFSET_DIGITS>(glyphs);
        self.write_at(&digits, OFFSET_COLUMN, HEX_START_ROW + line);
    }

    pub fn write_title(&mut self, title: &str, start: i32) {
        let glyphs = self.text.font().glyphs(title);
        self.write_raw_title(&glyphs, start);
    }

    pub fn write_hex_field(&mut self, digits: &str, field: i32) {
        let glyphs = self.text.font().glyphs(digits);
        self.write_raw_hex_field(&glyphs, field);
    }

    /// Only the first character of `ch` is shown.
    pub fn write_ascii_field(&mut self, ch: &str, field: i32) {
        let glyph = self.text.font().glyphs(ch).first().copied().unwrap_or(Glyph::BLANK);
        self.write_raw_ascii_field(glyph, field);
    }

    pub fn write_offset(&mut self, offset: &str, line: i32) {
        let glyphs = self.text.font().glyphs(offset);
        self.write_raw_offset(&glyphs, line);
    }

    /// Fill a whole line: offset, hex fields and ascii band for up to sixteen bytes.
    pub fn write_line(&mut self, line: i32, offset: u32, bytes: &[u8]) {
        let Ok(index) = usize::try_from(line) else {
            return;
        };
        if index >= LINE_COUNT {
            return;
        }
        self.write_offset(&format!("{offset:08X}"), line);
        for (i, byte) in bytes.iter().take(FIELDS_PER_LINE).enumerate() {
            let field = (index * FIELDS_PER_LINE + i) as i32;
            self.write_hex_field(&format!("{byte:02X}"), field);
            let ch = if byte.is_ascii_graphic() { *byte as char } else { '.' };
            self.write_ascii_field(&ch.to_string(), field);
        }
    }

    fn write_at(&mut self, glyphs: &[Glyph], column: usize, row: usize) {
        // Coordinates are bounded by the tables above and always fit.
        self.text.write_raw_at(glyphs, column as i32, row as i32);
    }
}

fn field_index(field: i32) -> Option<usize> {
    usize::try_from(field).ok().filter(|&field| field < FIELD_COUNT)
}

/// Exactly `N` glyphs: truncated, or padded with blanks.
fn padded<const N: usize>(glyphs: &[Glyph]) -> [Glyph; N] {
    let mut out = [Glyph::BLANK; N];
    for (slot, glyph) in out.iter_mut().zip(glyphs) {
        *slot = *glyph;
    }
    out
}

impl Screen for HexScreen {
    fn segment_count(&self) -> usize {
        self.text.segment_count()
    }

    fn render(&mut self) -> Frame {
        self.text.render()
    }
}
