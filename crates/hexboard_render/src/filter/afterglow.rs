use super::Filter;
use crate::screen::Frame;

/// Persistence: each segment fades by `decay` per frame unless the input is brighter.
#[derive(Clone, Debug)]
pub struct AfterGlowFilter {
    decay: f32,
    previous: Frame,
}

impl AfterGlowFilter {
    /// `decay` is clamped into `[0, 1]`; values strictly inside give a geometric fade.
    pub fn new(decay: f32) -> Self {
        Self { decay: decay.clamp(0.0, 1.0), previous: Vec::new() }
    }

    pub fn decay(&self) -> f32 {
        self.decay
    }

    pub fn reset(&mut self) {
        self.previous.clear();
    }
}

impl Filter for AfterGlowFilter {
    fn apply(&mut self, frame: &mut Frame) {
        if self.previous.len() != frame.len() {
            self.previous = vec![0.0; frame.len()];
        }
        for (value, previous) in frame.iter_mut().zip(self.previous.iter_mut()) {
            *value = value.max(*previous * self.decay);
            *previous = *value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_fades_geometrically() {
        let mut filter = AfterGlowFilter::new(0.5);
        let mut frame = vec![1.0, 0.0];
        filter.apply(&mut frame);
        assert_eq!(frame, vec![1.0, 0.0]);

        for expected in [0.5, 0.25, 0.125] {
            let mut frame = vec![0.0, 0.0];
            filter.apply(&mut frame);
            assert_eq!(frame, vec![expected, 0.0]);
        }
    }

    #[test]
    fn brighter_input_wins() {
        let mut filter = AfterGlowFilter::new(0.9);
        filter.apply(&mut vec![0.5]);
        let mut frame = vec![0.8];
        filter.apply(&mut frame);
        assert_eq!(frame, vec![0.8]);
    }

    #[test]
    fn resized_frames_restart_from_dark() {
        let mut filter = AfterGlowFilter::new(0.5);
        filter.apply(&mut vec![1.0; 3]);
        let mut frame = vec![0.0; 4];
        filter.apply(&mut frame);
        assert_eq!(frame, vec![0.0; 4]);
    }
}
