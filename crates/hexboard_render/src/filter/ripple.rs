use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::Filter;
use crate::font::{Glyph, SegmentFont};
use crate::layout::geometry::{Vector2, FILLER_SLOT, SEGMENTS_PER_DIGIT};
use crate::layout::Layout;
use crate::screen::text::TextScreen;
use crate::screen::Frame;

const RING_COUNT: usize = 3;
/// Board units between concentric rings.
const RING_SPACING: f32 = 4.0;

/// Something with a settable text-grid position.
pub trait Cursor {
    fn set_cursor(&self, column: i32, row: i32);
}

/// Latest cursor position, shared between producers and the render loop. Both
/// coordinates live in a single atomic word so readers never see a torn pair.
#[derive(Clone, Debug, Default)]
pub struct CursorHandle {
    position: Arc<AtomicU64>,
}

impl CursorHandle {
    pub fn new(column: i32, row: i32) -> Self {
        Self { position: Arc::new(AtomicU64::new(pack(column, row))) }
    }

    pub fn position(&self) -> (i32, i32) {
        unpack(self.position.load(Ordering::Acquire))
    }
}

impl Cursor for CursorHandle {
    fn set_cursor(&self, column: i32, row: i32) {
        self.position.store(pack(column, row), Ordering::Release);
    }
}

fn pack(column: i32, row: i32) -> u64 {
    (u64::from(column as u32) << 32) | u64::from(row as u32)
}

fn unpack(value: u64) -> (i32, i32) {
    ((value >> 32) as u32 as i32, value as u32 as i32)
}

/// Maps a cursor cell centre in board space to the ripple centre.
pub type CoordinateTransform = Box<dyn Fn(Vector2) -> Vector2 + Send>;

/// Concentric rings spreading from the cursor, plus a marker glyph written into the
/// text screen at the cursor cell. Rings restart whenever the cursor moves and cycle
/// once they have crossed the board.
pub struct RippleCursor {
    cursor: CursorHandle,
    speed: f32,
    width: f32,
    marker: Glyph,
    transform: CoordinateTransform,
    text: Arc<Mutex<TextScreen>>,
    layout: Arc<Layout>,
    coords: Vec<Option<Vector2>>,
    reach: f32,
    radius: f32,
    last: Option<(i32, i32)>,
}

impl RippleCursor {
    /// `speed` is the ring growth in board units per frame, `width` the half
    /// thickness of a ring. Without a `marker` an underscore is used.
    pub fn new(
        speed: f32,
        width: f32,
        marker: Option<Glyph>,
        transform: CoordinateTransform,
        text: Arc<Mutex<TextScreen>>,
    ) -> Self {
        let layout = text.lock().layout().clone();
        let coords = layout.coords().collect();
        let bounds = layout.bounds();
        let reach = if bounds.is_degenerate() {
            1.0
        } else {
            bounds.width().hypot(bounds.height())
        };

        Self {
            cursor: CursorHandle::default(),
            speed: speed.max(0.0),
            width: width.max(f32::EPSILON),
            marker: marker.unwrap_or_else(|| SegmentFont::glyph('_')),
            transform,
            text,
            layout,
            coords,
            reach,
            radius: 0.0,
            last: None,
        }
    }

    pub fn identity() -> CoordinateTransform {
        Box::new(|v| v)
    }

    /// A handle producers can keep after the filter moves into a screen.
    pub fn cursor(&self) -> CursorHandle {
        self.cursor.clone()
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    fn ring_level(&self, distance: f32) -> f32 {
        (0..RING_COUNT)
            .map(|ring| self.radius - ring as f32 * RING_SPACING)
            .take_while(|&radius| radius >= 0.0)
            .map(|radius| {
                let band = (1.0 - (distance - radius).abs() / self.width).max(0.0);
                let fade = (1.0 - radius / self.reach).max(0.0);
                band * fade
            })
            .fold(0.0, f32::max)
    }
}

impl RippleCursor {
    /// The text screen only picks the marker up on its next render, so the current
    /// frame gets it directly.
    fn draw_marker(&self, frame: &mut Frame, column: i32, row: i32, level: f32) {
        let (Ok(column), Ok(row)) = (usize::try_from(column), usize::try_from(row)) else {
            return;
        };
        let Some(digit) = self.layout.cell_digit(column, row) else {
            return;
        };
        let base = digit * SEGMENTS_PER_DIGIT;
        for slot in 0..FILLER_SLOT {
            if let Some(value) = frame.get_mut(base + slot) {
                *value = value.max((self.marker.level(slot) * level).clamp(0.0, 1.0));
            }
        }
    }
}

impl Cursor for RippleCursor {
    fn set_cursor(&self, column: i32, row: i32) {
        self.cursor.set_cursor(column, row);
    }
}

impl Filter for RippleCursor {
    fn apply(&mut self, frame: &mut Frame) {
        let position = self.cursor.position();
        let (column, row) = position;

        if self.last != Some(position) {
            self.last = Some(position);
            self.radius = 0.0;
        } else {
            self.radius += self.speed;
            let outer = self.radius - (RING_COUNT - 1) as f32 * RING_SPACING;
            if outer > self.reach {
                self.radius = 0.0;
            }
        }

        let center = (self.transform)(self.layout.cell_center(column, row));
        for (value, coord) in frame.iter_mut().zip(&self.coords) {
            if let Some(coord) = coord {
                *value = value.max(self.ring_level(coord.distance(center)));
            }
        }

        let level = {
            let mut text = self.text.lock();
            text.set_marker(column, row, self.marker);
            text.style().level()
        };
        self.draw_marker(frame, column, row, level);
    }
}
