mod config;
mod display;
mod driver;
mod filter;
mod font;
mod layout;
mod messages;
mod screen;

pub use config::BoardConfig;
pub use display::{run_display, LoopConfig, LoopStats};
pub use driver::{
    discover, discover_with, encode_frame, Driver, FrameSink, PortSettings, DEFAULT_BAUD_RATE,
    DEFAULT_DEVICES, DISCARD_FRAME, FRAME_TRAILER, MAX_SAMPLE,
};
pub use filter::{
    afterglow::AfterGlowFilter,
    gamma::{GammaFilter, DEFAULT_GAMMA},
    rain::RainFilter,
    ripple::{CoordinateTransform, Cursor, CursorHandle, RippleCursor},
    Filter, FilterScreen,
};
pub use font::{Font, Glyph, SegmentFont};
pub use layout::{
    geometry::{
        is_filler, Configuration, Orientation, Panel, Vector2, FILLER_SLOT, PANEL_DIGITS,
        SEGMENTS_PER_DIGIT,
    },
    projection::{Bounds, Projection},
    Layout,
};
pub use messages::{message_lines, parse_cursor, MessageBoard, MessageOptions};
pub use screen::{
    hex::HexScreen,
    raster::{luma_raster, RasterScreen},
    share,
    switch::{ScreenSender, ScreenSwitch},
    text::{Style, TextScreen},
    Frame, Screen, SharedScreen,
};

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("degenerate segment bounds: x {min_x}..{max_x}, y {min_y}..{max_y}")]
    DegenerateLayout { min_x: f32, max_x: f32, min_y: f32, max_y: f32 },
    #[error("invalid raster dimensions {width}x{height}")]
    InvalidRaster { width: usize, height: usize },
    #[error("raster frame has {actual} bytes, expected {expected}")]
    RasterSize { expected: usize, actual: usize },
    #[error("no active serial device found (tried: {})", .0.join(", "))]
    NoDevice(Vec<String>),
    #[error("failed to open serial device {path}: {source}")]
    Serial {
        path: String,
        #[source]
        source: serialport::Error,
    },
    #[error("device lost after {0} consecutive write failures")]
    DeviceLost(u32),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to load image: {0}")]
    Image(#[from] image::ImageError),
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}
