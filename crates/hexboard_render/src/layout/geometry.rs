/// Slots per digit module; the last one carries no physical segment.
pub const SEGMENTS_PER_DIGIT: usize = 16;
pub const FILLER_SLOT: usize = 15;
/// Digits on a single panel strip.
pub const PANEL_DIGITS: usize = 32;

/// Horizontal distance between neighbouring digit origins in board units.
pub const DIGIT_PITCH: f32 = 1.6;
/// Vertical distance between neighbouring text rows in board units.
pub const ROW_PITCH: f32 = 3.0;

/// Segment centres relative to the digit origin. A digit is one unit wide and two
/// units tall, the decimal point sits just outside the bottom right corner.
const DIGIT_SEGMENTS: [Vector2; FILLER_SLOT] = [
    Vector2::new(0.5, 0.0),   // top
    Vector2::new(1.0, 0.5),   // upper right
    Vector2::new(1.0, 1.5),   // lower right
    Vector2::new(0.5, 2.0),   // bottom
    Vector2::new(0.0, 1.5),   // lower left
    Vector2::new(0.0, 0.5),   // upper left
    Vector2::new(0.25, 1.0),  // middle left
    Vector2::new(0.75, 1.0),  // middle right
    Vector2::new(0.25, 0.5),  // upper left diagonal
    Vector2::new(0.5, 0.5),   // upper centre
    Vector2::new(0.75, 0.5),  // upper right diagonal
    Vector2::new(0.25, 1.5),  // lower left diagonal
    Vector2::new(0.5, 1.5),   // lower centre
    Vector2::new(0.75, 1.5),  // lower right diagonal
    Vector2::new(1.2, 2.0),   // decimal point
];

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Vector2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl std::ops::Add for Vector2 {
    type Output = Vector2;

    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

pub fn is_filler(index: usize) -> bool {
    index % SEGMENTS_PER_DIGIT == FILLER_SLOT
}

/// Offset of a segment slot from its digit origin, `None` for the filler slot.
pub fn segment_offset(slot: usize) -> Option<Vector2> {
    DIGIT_SEGMENTS.get(slot).copied()
}

/// Board-space origin of the digit occupying a text cell.
pub fn cell_origin(column: f32, row: f32) -> Vector2 {
    Vector2::new(column * DIGIT_PITCH, row * ROW_PITCH)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    /// Digits run left to right along a text row.
    Horizontal,
    /// Digits run top to bottom along a text column.
    Vertical,
}

/// A strip of [`PANEL_DIGITS`] digits whose first digit sits at text cell `(column, row)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Panel {
    pub column: usize,
    pub row: usize,
    pub orientation: Orientation,
}

impl Panel {
    pub const fn new(column: usize, row: usize, orientation: Orientation) -> Self {
        Self { column, row, orientation }
    }

    /// Text cell of the panel's `digit`-th digit.
    pub fn cell(&self, digit: usize) -> (usize, usize) {
        match self.orientation {
            Orientation::Horizontal => (self.column + digit, self.row),
            Orientation::Vertical => (self.column, self.row + digit),
        }
    }
}

/// Ordered panel placements. Segment indices follow this order, panel by panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Configuration {
    panels: Vec<Panel>,
}

impl Configuration {
    pub fn new(panels: Vec<Panel>) -> Self {
        Self { panels }
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }
}

impl Default for Configuration {
    /// Four horizontal panels stacked into a 32x4 text area.
    fn default() -> Self {
        Self::new((0..4).map(|row| Panel::new(0, row, Orientation::Horizontal)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filler_slot_has_no_offset() {
        assert!(segment_offset(FILLER_SLOT).is_none());
        assert!(segment_offset(0).is_some());
        assert!(is_filler(15));
        assert!(is_filler(31));
        assert!(!is_filler(16));
    }

    #[test]
    fn vertical_panel_runs_down() {
        let panel = Panel::new(3, 1, Orientation::Vertical);
        assert_eq!(panel.cell(0), (3, 1));
        assert_eq!(panel.cell(5), (3, 6));

        let panel = Panel::new(3, 1, Orientation::Horizontal);
        assert_eq!(panel.cell(5), (8, 1));
    }

    #[test]
    fn default_configuration_is_four_rows() {
        let config = Configuration::default();
        assert_eq!(config.panels().len(), 4);
        assert!(config.panels().iter().all(|panel| panel.column == 0));
        assert_eq!(config.panels()[3].row, 3);
    }
}
