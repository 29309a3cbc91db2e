use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::Filter;
use crate::layout::Layout;
use crate::screen::Frame;

/// Trail intensity multiplier per board unit behind the drop head.
pub const DEFAULT_DECAY: f32 = 0.7;
/// Trail intensity below which a drop counts as gone.
const FADE_FLOOR: f32 = 0.01;
/// Board units advanced per render call.
const MIN_SPEED: f32 = 0.15;
const MAX_SPEED: f32 = 0.6;
/// Render calls a respawned drop waits before falling.
const MAX_DELAY: u32 = 90;

#[derive(Clone, Copy, Debug)]
struct Raindrop {
    head: f32,
    speed: f32,
    delay: u32,
}

impl Raindrop {
    fn spawn<R: Rng>(rng: &mut R) -> Self {
        Self {
            head: 0.0,
            speed: rng.gen_range(MIN_SPEED..MAX_SPEED),
            delay: rng.gen_range(0..MAX_DELAY),
        }
    }
}

#[derive(Clone, Debug)]
struct RainColumn {
    /// Segment index and its depth below the top of the board.
    segments: Vec<(usize, f32)>,
    /// Depth of the column's lowest segment.
    height: f32,
    drop: Raindrop,
}

/// Falling drops, one per text column, drawn over a dark frame. The input frame's
/// content is discarded; the animation only depends on the random source and the
/// number of render calls.
pub struct RainFilter<R = StdRng> {
    rng: R,
    columns: Vec<RainColumn>,
    decay: f32,
    trail: f32,
}

impl RainFilter<StdRng> {
    pub fn new(layout: &Layout) -> Self {
        Self::with_rng(layout, StdRng::from_entropy())
    }
}

impl<R: Rng> RainFilter<R> {
    pub fn with_rng(layout: &Layout, mut rng: R) -> Self {
        let bounds = layout.bounds();
        let mut columns: Vec<RainColumn> = (0..layout.columns())
            .map(|_| RainColumn {
                segments: Vec::new(),
                height: 0.0,
                drop: Raindrop::spawn(&mut rng),
            })
            .collect();

        for index in 0..layout.segment_count() {
            if let (Some((column, _)), Some(coord)) =
                (layout.segment_cell(index), layout.segment_coord(index))
            {
                columns[column].segments.push((index, coord.y - bounds.min_y));
            }
        }

        for column in &mut columns {
            column.height = column.segments.iter().map(|&(_, depth)| depth).fold(0.0, f32::max);
        }

        let mut rain = Self { rng, columns, decay: DEFAULT_DECAY, trail: 0.0 };
        rain.set_decay(DEFAULT_DECAY);
        rain
    }

    /// Per board unit trail fade, clamped to `[0.05, 0.99]`.
    pub fn set_decay(&mut self, decay: f32) {
        self.decay = decay.clamp(0.05, 0.99);
        self.trail = FADE_FLOOR.ln() / self.decay.ln();
    }

    pub fn decay(&self) -> f32 {
        self.decay
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

impl<R: Rng> Filter for RainFilter<R> {
    fn apply(&mut self, frame: &mut Frame) {
        frame.fill(0.0);

        let Self { rng, columns, decay, trail } = self;
        for column in columns.iter_mut() {
            let drop = &mut column.drop;
            if drop.delay > 0 {
                drop.delay -= 1;
                continue;
            }

            drop.head += drop.speed;
            if drop.head - *trail > column.height {
                *drop = Raindrop::spawn(rng);
                continue;
            }

            for &(index, depth) in &column.segments {
                let distance = drop.head - depth;
                if distance < 0.0 {
                    continue;
                }
                if let Some(value) = frame.get_mut(index) {
                    *value = decay.powf(distance);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::geometry::{Configuration, Orientation, Panel, FILLER_SLOT};

    fn seeded(seed: u64) -> RainFilter<StdRng> {
        RainFilter::with_rng(&Layout::default(), StdRng::seed_from_u64(seed))
    }

    #[test]
    fn one_drop_per_column() {
        assert_eq!(seeded(1).column_count(), 32);
    }

    #[test]
    fn same_seed_same_animation() {
        let mut a = seeded(7);
        let mut b = seeded(7);
        for _ in 0..200 {
            let mut fa = vec![0.0; 2048];
            let mut fb = vec![0.0; 2048];
            a.apply(&mut fa);
            b.apply(&mut fb);
            assert_eq!(fa, fb);
        }
    }

    #[test]
    fn input_content_is_ignored() {
        let mut a = seeded(3);
        let mut b = seeded(3);
        for _ in 0..50 {
            let mut lit = vec![1.0; 2048];
            let mut dark = vec![0.0; 2048];
            a.apply(&mut lit);
            b.apply(&mut dark);
            assert_eq!(lit, dark);
        }
    }

    #[test]
    fn every_column_eventually_rains() {
        let layout = Layout::default();
        let mut rain = seeded(11);
        let mut seen = vec![false; layout.columns()];
        for _ in 0..400 {
            let mut frame = vec![0.0; layout.segment_count()];
            rain.apply(&mut frame);
            for (index, value) in frame.iter().enumerate() {
                assert!((0.0..=1.0).contains(value));
                if index % 16 == FILLER_SLOT {
                    assert_eq!(*value, 0.0);
                }
                if *value > 0.0 {
                    let (column, _) = layout.segment_cell(index).unwrap();
                    seen[column] = true;
                }
            }
        }
        assert!(seen.iter().all(|&s| s), "dry columns: {seen:?}");
    }

    #[test]
    fn short_column_respawns_below_its_own_bottom() {
        // Column 0 runs down a vertical panel; the other columns are one row deep.
        let layout = Layout::new(Configuration::new(vec![
            Panel::new(0, 0, Orientation::Horizontal),
            Panel::new(0, 1, Orientation::Vertical),
        ]));
        let mut rain = RainFilter::with_rng(&layout, StdRng::seed_from_u64(2));
        let short = rain.columns[5].height;
        assert!(short > 0.0);
        assert!(short < rain.columns[0].height);

        let trail = rain.trail;
        for column in &mut rain.columns {
            column.drop.delay = 1;
        }
        rain.columns[5].drop = Raindrop { head: short + trail, speed: 0.2, delay: 0 };

        let mut frame = vec![0.0; layout.segment_count()];
        rain.apply(&mut frame);

        assert_eq!(rain.columns[5].drop.head, 0.0);
        assert!(frame.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn trail_fades_behind_head() {
        let mut rain = seeded(5);
        rain.set_decay(0.5);
        // Wait until column 0's drop has passed the bottom of its first digit.
        let layout = Layout::default();
        for _ in 0..1000 {
            let mut frame = vec![0.0; layout.segment_count()];
            rain.apply(&mut frame);
            let top = frame[0];
            let bottom_of_digit = frame[3];
            if bottom_of_digit > 0.0 && top > 0.0 {
                assert!(top < bottom_of_digit);
                return;
            }
        }
        panic!("column 0 never rained");
    }
}
