use std::fmt::Display;
use std::io::{self, Write};
use std::time::Duration;

use log::{debug, info};
use serialport::SerialPort;

use crate::BoardError;

/// Marks the end of a frame so the receiver can resynchronise.
pub const FRAME_TRAILER: [u8; 4] = [0xff, 0xff, 0xff, 0xf0];
/// An out of range sample followed by a trailer; flushes any half received frame.
pub const DISCARD_FRAME: [u8; 6] = [0xff, 0xff, 0xff, 0xff, 0xff, 0xf0];
/// Sample value for full intensity.
pub const MAX_SAMPLE: u16 = 0xff00;

pub const DEFAULT_BAUD_RATE: u32 = 1_500_000;
pub const DEFAULT_DEVICES: &[&str] = &["/dev/ttyACM0", "/dev/ttyACM1", "/dev/ttyUSB0"];

/// Where to look for the board and how to talk to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortSettings {
    pub candidates: Vec<String>,
    pub baud_rate: u32,
    pub timeout: Duration,
}

impl Default for PortSettings {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_DEVICES.iter().map(|path| path.to_string()).collect(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: Duration::from_millis(100),
        }
    }
}

/// Consumer of rendered frames.
pub trait FrameSink {
    fn write_frame(&mut self, frame: &[f32]) -> io::Result<()>;
}

/// First candidate that opens at the configured baud rate. The port is closed again
/// straight away; this is a presence check, not a handshake.
pub fn discover(settings: &PortSettings) -> Result<String, BoardError> {
    discover_with(&settings.candidates, |path| {
        serialport::new(path, settings.baud_rate).timeout(settings.timeout).open().map(drop)
    })
}

pub fn discover_with<F, E>(candidates: &[String], mut probe: F) -> Result<String, BoardError>
where
    F: FnMut(&str) -> Result<(), E>,
    E: Display,
{
    for path in candidates {
        match probe(path) {
            Ok(()) => {
                info!("found serial device {path}");
                return Ok(path.clone());
            },
            Err(err) => debug!("serial device {path} unavailable: {err}"),
        }
    }
    Err(BoardError::NoDevice(candidates.to_vec()))
}

/// Encode intensities as little-endian samples into `buffer`, two bytes each. Extra
/// intensities are dropped; samples past the end of `frame` are written dark.
pub fn encode_frame(frame: &[f32], buffer: &mut [u8]) {
    for (i, sample) in buffer.chunks_exact_mut(2).enumerate() {
        let value = frame.get(i).map_or(0, |&v| quantize(v));
        sample.copy_from_slice(&value.to_le_bytes());
    }
}

fn quantize(intensity: f32) -> u16 {
    // NaN saturates to zero in the cast.
    (intensity * f32::from(MAX_SAMPLE)).round().clamp(0.0, f32::from(MAX_SAMPLE)) as u16
}

/// Serial framing for a board with a fixed number of segments.
pub struct Driver<W: Write = Box<dyn SerialPort>> {
    port: W,
    buffer: Vec<u8>,
}

impl Driver<Box<dyn SerialPort>> {
    /// Discover the board, open it and flush any stale partial frame.
    pub fn open(settings: &PortSettings, segments: usize) -> Result<Self, BoardError> {
        let path = discover(settings)?;
        let port = serialport::new(&path, settings.baud_rate)
            .timeout(settings.timeout)
            .open()
            .map_err(|source| BoardError::Serial { path: path.clone(), source })?;
        info!("opened {path} at {} baud for {segments} segments", settings.baud_rate);
        Self::new(port, segments)
    }
}

impl<W: Write> Driver<W> {
    pub fn new(mut port: W, segments: usize) -> Result<Self, BoardError> {
        let mut buffer = vec![0; segments * 2 + FRAME_TRAILER.len()];
        buffer[segments * 2..].copy_from_slice(&FRAME_TRAILER);

        port.write_all(&DISCARD_FRAME)?;
        port.flush()?;
        debug!("wrote discard frame");

        Ok(Self { port, buffer })
    }

    /// Number of segments a frame carries.
    pub fn capacity(&self) -> usize {
        (self.buffer.len() - FRAME_TRAILER.len()) / 2
    }

    pub fn write(&mut self, frame: &[f32]) -> io::Result<()> {
        let samples = self.buffer.len() - FRAME_TRAILER.len();
        encode_frame(frame, &mut self.buffer[..samples]);
        self.port.write_all(&self.buffer)?;
        self.port.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.port
    }

    /// Release the port.
    pub fn into_inner(self) -> W {
        self.port
    }
}

impl<W: Write> FrameSink for Driver<W> {
    fn write_frame(&mut self, frame: &[f32]) -> io::Result<()> {
        self.write(frame)
    }
}
