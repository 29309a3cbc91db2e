use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};
use parking_lot::{Condvar, Mutex};

use crate::filter::afterglow::AfterGlowFilter;
use crate::filter::gamma::{GammaFilter, DEFAULT_GAMMA};
use crate::filter::rain::RainFilter;
use crate::filter::ripple::{Cursor, CursorHandle, RippleCursor};
use crate::filter::FilterScreen;
use crate::layout::Layout;
use crate::screen::hex::HexScreen;
use crate::screen::switch::ScreenSender;
use crate::screen::text::{Style, TextScreen};
use crate::screen::{share, SharedScreen};

const MAX_LINES: usize = 4;
const MAX_LINE_CHARS: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MessageOptions {
    /// How long a message stays up before the board returns to idle.
    pub timeout: Duration,
    pub gamma: f32,
    pub afterglow: f32,
}

impl Default for MessageOptions {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), gamma: DEFAULT_GAMMA, afterglow: 0.85 }
    }
}

/// Upper-cased message text, at most four lines of at most 32 characters.
pub fn message_lines(message: &str) -> Vec<String> {
    message
        .split('\n')
        .take(MAX_LINES)
        .map(|line| {
            line.trim_end_matches('\r').to_uppercase().chars().take(MAX_LINE_CHARS).collect()
        })
        .collect()
}

/// Parse a `"column row"` cursor update.
pub fn parse_cursor(input: &str) -> Option<(i32, i32)> {
    let mut parts = input.split_whitespace();
    let column = parts.next()?.parse().ok()?;
    let row = parts.next()?.parse().ok()?;
    match parts.next() {
        Some(_) => None,
        None => Some((column, row)),
    }
}

#[derive(Debug, Default)]
struct RevertState {
    deadline: Option<Instant>,
    shutdown: bool,
}

/// The single pending revert to idle, shared with the worker thread that fires it.
/// Screen swaps happen under the state lock so a revert can never land after a newer
/// message has been shown.
#[derive(Default)]
struct Revert {
    state: Mutex<RevertState>,
    wakeup: Condvar,
}

impl Revert {
    fn run(&self, screens: &ScreenSender, idle: &SharedScreen) {
        let mut state = self.state.lock();
        while !state.shutdown {
            let deadline = state.deadline;
            match deadline {
                None => self.wakeup.wait(&mut state),
                Some(deadline) if Instant::now() >= deadline => {
                    state.deadline = None;
                    debug!("message timed out, back to idle");
                    screens.set(idle.clone());
                },
                Some(deadline) => {
                    self.wakeup.wait_until(&mut state, deadline);
                },
            }
        }
    }
}

/// Producer side of the board: owns the idle and message screens and decides which
/// one the render loop shows.
///
/// Showing a message moves the one pending revert deadline; a single worker thread
/// swaps back to idle once it passes, so a newer message is never cut short by an
/// older one.
pub struct MessageBoard {
    screens: ScreenSender,
    idle: SharedScreen,
    message: SharedScreen,
    text: Arc<Mutex<TextScreen>>,
    cursor: CursorHandle,
    options: MessageOptions,
    revert: Arc<Revert>,
}

impl MessageBoard {
    pub fn new(layout: Arc<Layout>, screens: ScreenSender, options: MessageOptions) -> Self {
        let idle = FilterScreen::new(
            HexScreen::new(layout.clone()),
            vec![Box::new(RainFilter::new(&layout)), Box::new(GammaFilter::new(options.gamma))],
        );

        let mut text = TextScreen::new(layout);
        text.set_style(Style::brightness(1.0));
        let text = share(text);

        let ripple = RippleCursor::new(1.0, 0.5, None, RippleCursor::identity(), text.clone());
        let cursor = ripple.cursor();
        let message = FilterScreen::new(
            text.clone(),
            vec![
                Box::new(ripple),
                Box::new(GammaFilter::new(options.gamma)),
                Box::new(AfterGlowFilter::new(options.afterglow)),
            ],
        );

        let idle: SharedScreen = share(idle);
        let revert = Arc::new(Revert::default());
        {
            let revert = revert.clone();
            let screens = screens.clone();
            let idle = idle.clone();
            thread::spawn(move || revert.run(&screens, &idle));
        }

        Self { screens, idle, message: share(message), text, cursor, options, revert }
    }

    pub fn idle_screen(&self) -> &SharedScreen {
        &self.idle
    }

    pub fn message_screen(&self) -> &SharedScreen {
        &self.message
    }

    pub fn text(&self) -> &Arc<Mutex<TextScreen>> {
        &self.text
    }

    pub fn options(&self) -> &MessageOptions {
        &self.options
    }

    /// When the board goes back to idle, if a message is up.
    pub fn revert_deadline(&self) -> Option<Instant> {
        self.revert.state.lock().deadline
    }

    /// Switch to idle now, cancelling any pending revert.
    pub fn show_idle(&self) {
        let mut state = self.revert.state.lock();
        state.deadline = None;
        self.screens.set(self.idle.clone());
        self.revert.wakeup.notify_one();
    }

    pub fn show_message(&self, message: &str) {
        let lines = message_lines(message);
        {
            let mut text = self.text.lock();
            text.clear();
            for (row, line) in lines.iter().enumerate() {
                text.write_at(line, 0, row as i32);
            }
        }
        info!("showing message: {}", lines.join(" / "));

        let mut state = self.revert.state.lock();
        state.deadline = Some(Instant::now() + self.options.timeout);
        self.screens.set(self.message.clone());
        self.revert.wakeup.notify_one();
    }

    /// A handle producers can move the cursor with.
    pub fn cursor(&self) -> CursorHandle {
        self.cursor.clone()
    }

    /// Apply a `"column row"` line; anything else is dropped.
    pub fn apply_cursor_input(&self, input: &str) -> bool {
        match parse_cursor(input) {
            Some((column, row)) => {
                self.set_cursor(column, row);
                true
            },
            None => {
                debug!("ignoring malformed cursor input {input:?}");
                false
            },
        }
    }
}

impl Drop for MessageBoard {
    fn drop(&mut self) {
        self.revert.state.lock().shutdown = true;
        self.revert.wakeup.notify_one();
    }
}

impl Cursor for MessageBoard {
    fn set_cursor(&self, column: i32, row: i32) {
        self.cursor.set_cursor(column, row);
    }
}
