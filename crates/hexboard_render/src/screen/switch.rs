use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};

use log::{debug, error};

use super::{fit_frame, Frame, Screen, SharedScreen};

/// Producer side of a [`ScreenSwitch`]. Cloneable and never blocks.
#[derive(Clone)]
pub struct ScreenSender {
    sender: Sender<SharedScreen>,
}

impl ScreenSender {
    /// Make `screen` the one rendered from the next frame on. The last call wins.
    pub fn set(&self, screen: SharedScreen) {
        if self.sender.send(screen).is_err() {
            debug!("screen switch is gone, dropping screen change");
        }
    }
}

/// Holds the screen currently being rendered. Owned by the render loop; producers
/// swap screens through [`ScreenSender`] handles.
pub struct ScreenSwitch {
    receiver: Receiver<SharedScreen>,
    active: Option<SharedScreen>,
    segment_count: usize,
}

impl ScreenSwitch {
    pub fn new(segment_count: usize) -> (Self, ScreenSender) {
        let (sender, receiver) = mpsc::channel();
        (Self { receiver, active: None, segment_count }, ScreenSender { sender })
    }

    pub fn active(&self) -> Option<&SharedScreen> {
        self.active.as_ref()
    }

    /// Adopt the most recently sent screen, if any arrived since the last call.
    pub fn poll(&mut self) -> bool {
        match self.receiver.try_iter().last() {
            Some(screen) => {
                self.active = Some(screen);
                true
            },
            None => false,
        }
    }
}

impl Screen for ScreenSwitch {
    fn segment_count(&self) -> usize {
        self.segment_count
    }

    fn render(&mut self) -> Frame {
        self.poll();

        let Some(screen) = &self.active else {
            return vec![0.0; self.segment_count];
        };

        match panic::catch_unwind(AssertUnwindSafe(|| screen.lock().render())) {
            Ok(frame) => fit_frame(frame, self.segment_count),
            Err(_) => {
                error!("screen panicked while rendering, showing a dark frame");
                vec![0.0; self.segment_count]
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::screen::share;

    struct Solid(f32, usize);

    impl Screen for Solid {
        fn segment_count(&self) -> usize {
            self.1
        }

        fn render(&mut self) -> Frame {
            vec![self.0; self.1]
        }
    }

    struct Broken;

    impl Screen for Broken {
        fn segment_count(&self) -> usize {
            4
        }

        fn render(&mut self) -> Frame {
            panic!("broken screen");
        }
    }

    #[test]
    fn renders_dark_before_any_screen() {
        let (mut switch, _sender) = ScreenSwitch::new(3);
        assert_eq!(switch.render(), vec![0.0; 3]);
    }

    #[test]
    fn last_swap_wins() {
        let (mut switch, sender) = ScreenSwitch::new(2);
        sender.set(share(Solid(0.1, 2)));
        sender.set(share(Solid(0.9, 2)));

        for _ in 0..5 {
            assert_eq!(switch.render(), vec![0.9; 2]);
        }
    }

    #[test]
    fn ordered_swaps_from_other_threads() {
        let (mut switch, sender) = ScreenSwitch::new(2);
        let a = sender.clone();
        thread::spawn(move || a.set(share(Solid(0.25, 2)))).join().unwrap();
        let b = sender.clone();
        thread::spawn(move || b.set(share(Solid(0.75, 2)))).join().unwrap();

        assert_eq!(switch.render(), vec![0.75; 2]);
        assert_eq!(switch.render(), vec![0.75; 2]);
    }

    #[test]
    fn same_screen_can_be_sent_again() {
        let (mut switch, sender) = ScreenSwitch::new(1);
        let idle: SharedScreen = share(Solid(0.5, 1));
        sender.set(idle.clone());
        sender.set(share(Solid(1.0, 1)));
        sender.set(idle.clone());

        switch.render();
        assert!(Arc::ptr_eq(switch.active().unwrap(), &idle));
    }

    #[test]
    fn mismatched_length_is_fitted() {
        let (mut switch, sender) = ScreenSwitch::new(4);
        sender.set(share(Solid(1.0, 2)));
        assert_eq!(switch.render(), vec![1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn panicking_screen_degrades_to_dark() {
        let (mut switch, sender) = ScreenSwitch::new(4);
        sender.set(share(Broken));
        assert_eq!(switch.render(), vec![0.0; 4]);
        // The lock must still be usable after the panic.
        assert_eq!(switch.render(), vec![0.0; 4]);
    }
}
