use super::Filter;
use crate::screen::Frame;

/// Matches the board's perceived brightness response.
pub const DEFAULT_GAMMA: f32 = 2.5;

/// Pointwise power-law remap, `out = in^gamma`, clamped to `[0, 1]`.
#[derive(Clone, Debug)]
pub struct GammaFilter {
    gamma: f32,
    table: [f32; 256],
}

impl GammaFilter {
    pub fn new(gamma: f32) -> Self {
        let gamma = if gamma.is_finite() && gamma > 0.0 { gamma } else { DEFAULT_GAMMA };
        let mut table = [0.0; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            *entry = (i as f32 / 255.0).powf(gamma).clamp(0.0, 1.0);
        }
        Self { gamma, table }
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    pub fn map(&self, value: f32) -> f32 {
        if value.is_nan() {
            return 0.0;
        }
        value.clamp(0.0, 1.0).powf(self.gamma).clamp(0.0, 1.0)
    }

    /// Table lookup for 8-bit samples.
    pub fn map_u8(&self, value: u8) -> f32 {
        self.table[value as usize]
    }
}

impl Default for GammaFilter {
    fn default() -> Self {
        Self::new(DEFAULT_GAMMA)
    }
}

impl Filter for GammaFilter {
    fn apply(&mut self, frame: &mut Frame) {
        for value in frame.iter_mut() {
            *value = self.map(*value);
        }
    }
}
