pub mod geometry;
pub mod projection;

use crate::BoardError;

use geometry::{
    cell_origin, is_filler, segment_offset, Configuration, Vector2, PANEL_DIGITS,
    SEGMENTS_PER_DIGIT,
};
use projection::{Bounds, Projection};

/// Immutable board geometry: every segment's board-space coordinate and the mapping
/// between text cells and digits.
#[derive(Clone, Debug)]
pub struct Layout {
    configuration: Configuration,
    columns: usize,
    rows: usize,
    /// Text cell of each digit, indexed by digit.
    digit_cells: Vec<(usize, usize)>,
    /// Digit shown in each text cell, row-major over `columns * rows`.
    cell_digits: Vec<Option<usize>>,
}

impl Layout {
    pub fn new(configuration: Configuration) -> Self {
        let digit_cells: Vec<(usize, usize)> = configuration
            .panels()
            .iter()
            .flat_map(|panel| (0..PANEL_DIGITS).map(move |digit| panel.cell(digit)))
            .collect();

        let columns = digit_cells.iter().map(|&(column, _)| column + 1).max().unwrap_or(0);
        let rows = digit_cells.iter().map(|&(_, row)| row + 1).max().unwrap_or(0);

        // The first panel claiming a cell owns it for text addressing.
        let mut cell_digits = vec![None; columns * rows];
        for (digit, &(column, row)) in digit_cells.iter().enumerate() {
            let slot = &mut cell_digits[row * columns + column];
            if slot.is_none() {
                *slot = Some(digit);
            }
        }

        Self { configuration, columns, rows, digit_cells, cell_digits }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn segment_count(&self) -> usize {
        self.digit_cells.len() * SEGMENTS_PER_DIGIT
    }

    pub fn digit_count(&self) -> usize {
        self.digit_cells.len()
    }

    /// Width of the text grid in cells.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Height of the text grid in cells.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Board-space coordinate of a segment; `None` for filler slots and out of range indices.
    pub fn segment_coord(&self, index: usize) -> Option<Vector2> {
        let (column, row) = self.segment_cell(index)?;
        let offset = segment_offset(index % SEGMENTS_PER_DIGIT)?;
        Some(cell_origin(column as f32, row as f32) + offset)
    }

    /// Text cell of the digit a segment belongs to; `None` for filler slots.
    pub fn segment_cell(&self, index: usize) -> Option<(usize, usize)> {
        if is_filler(index) {
            return None;
        }
        self.digit_cells.get(index / SEGMENTS_PER_DIGIT).copied()
    }

    pub fn cell_digit(&self, column: usize, row: usize) -> Option<usize> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.cell_digits[row * self.columns + column]
    }

    /// Board-space centre of a text cell. Defined for any position, including cells
    /// outside the grid, so callers can place effects relative to off-board cursors.
    pub fn cell_center(&self, column: i32, row: i32) -> Vector2 {
        cell_origin(column as f32, row as f32) + Vector2::new(0.5, 1.0)
    }

    pub fn coords(&self) -> impl Iterator<Item = Option<Vector2>> + '_ {
        (0..self.segment_count()).map(move |index| self.segment_coord(index))
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_coords(self.coords().flatten())
    }

    /// Map every segment onto a `width` x `height` raster. See [`Projection`].
    pub fn project(&self, width: usize, height: usize) -> Result<Projection, BoardError> {
        Projection::new(self.coords(), width, height)
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(Configuration::default())
    }
}
