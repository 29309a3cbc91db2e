pub mod afterglow;
pub mod gamma;
pub mod rain;
pub mod ripple;

use crate::screen::{fit_frame, Frame, Screen};

/// A per-frame transform. Stateful filters advance once per call.
pub trait Filter {
    fn apply(&mut self, frame: &mut Frame);
}

/// Renders an inner screen and pipes the result through filters in order.
pub struct FilterScreen {
    inner: Box<dyn Screen + Send>,
    filters: Vec<Box<dyn Filter + Send>>,
}

impl FilterScreen {
    pub fn new<S: Screen + Send + 'static>(inner: S, filters: Vec<Box<dyn Filter + Send>>) -> Self {
        Self { inner: Box::new(inner), filters }
    }

    pub fn push<F: Filter + Send + 'static>(&mut self, filter: F) {
        self.filters.push(Box::new(filter));
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Screen for FilterScreen {
    fn segment_count(&self) -> usize {
        self.inner.segment_count()
    }

    fn render(&mut self) -> Frame {
        let mut frame = fit_frame(self.inner.render(), self.segment_count());
        for filter in &mut self.filters {
            filter.apply(&mut frame);
        }
        frame
    }
}
