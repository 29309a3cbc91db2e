pub mod hex;
pub mod raster;
pub mod switch;
pub mod text;

use std::sync::Arc;

use parking_lot::Mutex;

/// One intensity in `[0.0, 1.0]` per segment index.
pub type Frame = Vec<f32>;

/// A content producer that renders a complete frame on demand.
///
/// `render` must not fail: content faults degrade to dark segments. Animated screens
/// advance their state once per call.
pub trait Screen {
    fn segment_count(&self) -> usize;

    fn render(&mut self) -> Frame;
}

/// A screen shared between the producer that owns it and the render loop.
pub type SharedScreen = Arc<Mutex<dyn Screen + Send>>;

/// Wrap a screen for sharing. The concrete handle coerces into [`SharedScreen`].
pub fn share<S: Screen + Send + 'static>(screen: S) -> Arc<Mutex<S>> {
    Arc::new(Mutex::new(screen))
}

impl<S: Screen + ?Sized> Screen for Arc<Mutex<S>> {
    fn segment_count(&self) -> usize {
        self.lock().segment_count()
    }

    fn render(&mut self) -> Frame {
        self.lock().render()
    }
}

impl<S: Screen + ?Sized> Screen for Box<S> {
    fn segment_count(&self) -> usize {
        (**self).segment_count()
    }

    fn render(&mut self) -> Frame {
        (**self).render()
    }
}

/// Pad or truncate a frame to the expected segment count.
pub(crate) fn fit_frame(mut frame: Frame, segment_count: usize) -> Frame {
    frame.resize(segment_count, 0.0);
    frame
}
