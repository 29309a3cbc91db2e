use super::geometry::{is_filler, Vector2};
use crate::BoardError;

/// Axis-aligned bounding box over segment coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn from_coords<I: IntoIterator<Item = Vector2>>(coords: I) -> Self {
        coords.into_iter().fold(
            Bounds {
                min_x: f32::INFINITY,
                max_x: f32::NEG_INFINITY,
                min_y: f32::INFINITY,
                max_y: f32::NEG_INFINITY,
            },
            |bounds, c| Bounds {
                min_x: bounds.min_x.min(c.x),
                max_x: bounds.max_x.max(c.x),
                min_y: bounds.min_y.min(c.y),
                max_y: bounds.max_y.max(c.y),
            },
        )
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.max_x > self.min_x && self.max_y > self.min_y)
    }
}

/// Per-segment raster index for a fixed `width` x `height` source, computed once and
/// reused for every ingested frame. Filler slots map to `None`.
#[derive(Clone, Debug)]
pub struct Projection {
    width: usize,
    height: usize,
    positions: Vec<Option<usize>>,
}

impl Projection {
    /// `coords[i]` is the board coordinate of segment `i`; `None` entries are skipped
    /// when computing the bounding box and never receive a raster position.
    pub fn new<I>(coords: I, width: usize, height: usize) -> Result<Self, BoardError>
    where
        I: IntoIterator<Item = Option<Vector2>>,
    {
        if width == 0 || height == 0 {
            return Err(BoardError::InvalidRaster { width, height });
        }

        let coords: Vec<Option<Vector2>> = coords
            .into_iter()
            .enumerate()
            .map(|(index, coord)| if is_filler(index) { None } else { coord })
            .collect();

        let bounds = Bounds::from_coords(coords.iter().flatten().copied());
        if bounds.is_degenerate() {
            return Err(BoardError::DegenerateLayout {
                min_x: bounds.min_x,
                max_x: bounds.max_x,
                min_y: bounds.min_y,
                max_y: bounds.max_y,
            });
        }

        let fx = (width - 1) as f32 / bounds.width();
        let fy = (height - 1) as f32 / bounds.height();
        let max_x = (width - 1) as f32;
        let max_y = (height - 1) as f32;

        let positions = coords
            .iter()
            .map(|coord| {
                coord.map(|c| {
                    let px = ((c.x - bounds.min_x) * fx).round().clamp(0.0, max_x) as usize;
                    let py = ((c.y - bounds.min_y) * fy).round().clamp(0.0, max_y) as usize;
                    px + py * width
                })
            })
            .collect();

        Ok(Self { width, height, positions })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn position(&self, segment: usize) -> Option<usize> {
        self.positions.get(segment).copied().flatten()
    }

    pub fn positions(&self) -> &[Option<usize>] {
        &self.positions
    }

    /// Sample `raster` into `out`, one value per segment. Unused segments and
    /// positions outside the raster are written as zero.
    pub fn sample<F>(&self, raster: &[u8], out: &mut [f32], map: F)
    where
        F: Fn(u8) -> f32,
    {
        for (value, position) in out.iter_mut().zip(&self.positions) {
            *value = position.and_then(|p| raster.get(p)).map_or(0.0, |&v| map(v));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(n: usize) -> Vec<Option<Vector2>> {
        (0..n).map(|i| Some(Vector2::new((i % 4) as f32, (i / 4) as f32))).collect()
    }

    #[test]
    fn corners_map_to_raster_corners() {
        let projection = Projection::new(square(15), 10, 5).unwrap();
        assert_eq!(projection.position(0), Some(0));
        assert_eq!(projection.position(3), Some(9));
        // Segment 14 sits at (2, 3), the bottom edge of the box.
        assert_eq!(projection.position(14), Some(6 + 4 * 10));
    }

    #[test]
    fn filler_slots_are_unused() {
        let projection = Projection::new(square(32), 8, 8).unwrap();
        assert_eq!(projection.position(15), None);
        assert_eq!(projection.position(31), None);
        assert!(projection.position(16).is_some());
    }

    #[test]
    fn degenerate_box_is_rejected() {
        let flat = vec![Some(Vector2::new(0.0, 1.0)), Some(Vector2::new(3.0, 1.0))];
        assert!(matches!(
            Projection::new(flat, 10, 10),
            Err(BoardError::DegenerateLayout { .. })
        ));
        assert!(matches!(
            Projection::new(square(4), 0, 10),
            Err(BoardError::InvalidRaster { .. })
        ));
    }

    #[test]
    fn sample_zeroes_unused_segments() {
        let projection = Projection::new(square(16), 4, 4).unwrap();
        let raster: Vec<u8> = (0..16).map(|v| v as u8 * 10).collect();
        let mut out = vec![1.0; 16];
        projection.sample(&raster, &mut out, |v| v as f32);
        assert_eq!(out[5], 50.0);
        assert_eq!(out[15], 0.0);
    }
}
