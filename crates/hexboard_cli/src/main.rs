use std::fs::File;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hexboard_render::{
    discover, luma_raster, run_display, share, BoardConfig, Driver, Layout, MessageBoard,
    RasterScreen, ScreenSwitch,
};
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use parking_lot::Mutex;
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(author, version, about = "Drive a segmented hex display board over serial")]
struct Cli {
    /// Board settings file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Serial device to try, in order; repeat for several candidates
    #[arg(long = "device", global = true)]
    devices: Vec<String>,
    /// Serial baud rate
    #[arg(long, global = true)]
    baud: Option<u32>,
    /// Display refresh interval in milliseconds
    #[arg(long, global = true)]
    refresh_ms: Option<u64>,
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Idle rain; stdin lines become messages, `cursor COL ROW` moves the cursor
    Run(RunArgs),
    /// Play a GIF, still image or directory of frames on the board
    Play(PlayArgs),
    /// Look for the board and print the device path
    Probe,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Seconds a message stays up before returning to idle
    #[arg(long)]
    timeout: Option<u64>,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Input path (GIF file, image or directory of images)
    input: PathBuf,
    /// Frame rate for inputs without timing information
    #[arg(long, default_value_t = 30.0)]
    fps: f32,
    /// Raster columns the input is scaled to; rows follow the board's aspect
    #[arg(long, default_value_t = 128)]
    width: usize,
    /// Start over after the last frame
    #[arg(long = "loop", default_value_t = false)]
    repeat: bool,
}

/// A decoded frame ready for the raster screen, with how long it stays up.
struct PlayFrame {
    luma: Vec<u8>,
    delay: Duration,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = load_config(&cli)?;
    match cli.command {
        Commands::Run(args) => run(&config, args),
        Commands::Play(args) => play(&config, args),
        Commands::Probe => probe(&config),
    }
}

fn load_config(cli: &Cli) -> Result<BoardConfig> {
    let mut config = match &cli.config {
        Some(path) => BoardConfig::load(path)
            .with_context(|| format!("failed to load config {:?}", path))?,
        None => BoardConfig::default(),
    };

    if !cli.devices.is_empty() {
        config.devices = cli.devices.clone();
    }
    if let Some(baud) = cli.baud {
        config.baud_rate = baud;
    }
    if let Some(refresh_ms) = cli.refresh_ms {
        config.refresh_ms = refresh_ms;
    }
    debug!("board config: {config:?}");
    Ok(config)
}

/// Stop flag raised by SIGINT or SIGTERM.
fn stop_flag() -> Result<Arc<AtomicBool>> {
    let stop = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, stop.clone())
            .with_context(|| format!("failed to install handler for signal {signal}"))?;
    }
    Ok(stop)
}

fn probe(config: &BoardConfig) -> Result<()> {
    let path = discover(&config.port_settings()).context("no display board found")?;
    println!("{path}");
    Ok(())
}

fn run(config: &BoardConfig, args: RunArgs) -> Result<()> {
    let mut options = config.message_options();
    if let Some(secs) = args.timeout {
        options.timeout = Duration::from_secs(secs);
    }

    let layout = Arc::new(Layout::default());
    let segments = layout.segment_count();
    let mut driver =
        Driver::open(&config.port_settings(), segments).context("failed to open display board")?;

    let (mut switch, screens) = ScreenSwitch::new(segments);
    let board = MessageBoard::new(layout, screens, options);
    board.show_idle();

    let stop = stop_flag()?;
    thread::spawn(move || read_commands(io::stdin().lock(), &board));

    let stats = run_display(&mut switch, &mut driver, &config.loop_config(), &stop)?;
    info!("sent {} frames ({} failed writes)", stats.frames, stats.failures);
    Ok(())
}

/// Feed stdin lines to the board until end of input. A literal `\n` in a line
/// starts a new message line.
fn read_commands<R: BufRead>(input: R, board: &MessageBoard) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!("failed to read input: {err}");
                break;
            },
        };

        if let Some(position) = line.strip_prefix("cursor ") {
            board.apply_cursor_input(position);
        } else if !line.trim().is_empty() {
            board.show_message(&line.replace("\\n", "\n"));
        }
    }
    debug!("input closed");
}

fn play(config: &BoardConfig, args: PlayArgs) -> Result<()> {
    let layout = Layout::default();
    let bounds = layout.bounds();
    let aspect = if bounds.is_degenerate() { 1.0 } else { bounds.height() / bounds.width() };
    let width = args.width.max(1);
    let height = ((width as f32 * aspect).round() as usize).max(1);

    let fallback = Duration::from_secs_f32(1.0 / args.fps.max(0.1));
    let frames = load_frames(&args.input, width, height, fallback)?;
    info!("loaded {} frames at {width}x{height}", frames.len());

    let raster = share(
        RasterScreen::new(&layout, width, height, config.gamma)
            .context("failed to project board onto raster")?,
    );
    let mut driver = Driver::open(&config.port_settings(), layout.segment_count())
        .context("failed to open display board")?;
    let (mut switch, screens) = ScreenSwitch::new(layout.segment_count());
    screens.set(raster.clone());

    let progress = ProgressBar::new(frames.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "{spinner} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames",
        )?
        .progress_chars("=> "),
    );

    let stop = stop_flag()?;
    let player = {
        let stop = stop.clone();
        thread::spawn(move || feed_frames(&frames, &raster, &progress, args.repeat, &stop))
    };

    let result = run_display(&mut switch, &mut driver, &config.loop_config(), &stop);
    stop.store(true, Ordering::Release);
    if player.join().is_err() {
        warn!("frame player panicked");
    }

    let stats = result?;
    info!("sent {} frames ({} failed writes)", stats.frames, stats.failures);
    Ok(())
}

/// Push frames into the raster screen on their own schedule; raises `stop` when the
/// input runs out.
fn feed_frames(
    frames: &[PlayFrame],
    raster: &Mutex<RasterScreen>,
    progress: &ProgressBar,
    repeat: bool,
    stop: &AtomicBool,
) {
    loop {
        progress.reset();
        for frame in frames {
            if stop.load(Ordering::Acquire) {
                progress.abandon();
                return;
            }
            if let Err(err) = raster.lock().set_frame(&frame.luma) {
                warn!("skipping frame: {err}");
            }
            progress.inc(1);
            thread::sleep(frame.delay);
        }
        if !repeat {
            break;
        }
    }
    progress.finish_with_message("done");
    stop.store(true, Ordering::Release);
}

fn load_frames(
    path: &Path,
    width: usize,
    height: usize,
    fallback: Duration,
) -> Result<Vec<PlayFrame>> {
    let timed = if path.is_dir() {
        load_images_from_directory(path)?
    } else {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if extension == "gif" {
            load_frames_from_gif(path)?
        } else {
            let image =
                image::open(path).with_context(|| format!("failed to open image {:?}", path))?;
            vec![(image, None)]
        }
    };

    Ok(timed
        .into_iter()
        .map(|(image, delay)| PlayFrame {
            luma: luma_raster(&image, width, height),
            delay: delay.filter(|delay| !delay.is_zero()).unwrap_or(fallback),
        })
        .collect())
}

fn load_frames_from_gif(path: &Path) -> Result<Vec<(DynamicImage, Option<Duration>)>> {
    let file = File::open(path).with_context(|| format!("failed to open GIF {:?}", path))?;
    let decoder =
        GifDecoder::new(file).with_context(|| format!("failed to decode GIF {:?}", path))?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .with_context(|| format!("failed to collect frames from {:?}", path))?;
    Ok(frames
        .into_iter()
        .map(|frame| {
            let delay = Duration::from(frame.delay());
            (DynamicImage::ImageRgba8(frame.into_buffer()), Some(delay))
        })
        .collect())
}

fn load_images_from_directory(path: &Path) -> Result<Vec<(DynamicImage, Option<Duration>)>> {
    let mut entries: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().to_path_buf())
        .collect();
    entries.sort();
    if entries.is_empty() {
        anyhow::bail!("no image files found in {:?}", path);
    }

    let mut frames = Vec::with_capacity(entries.len());
    for entry in entries {
        let image =
            image::open(&entry).with_context(|| format!("failed to open image {:?}", entry))?;
        frames.push((image, None));
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use hexboard_render::SegmentFont;

    use super::*;

    #[test]
    fn stdin_lines_drive_the_board() {
        let layout = Arc::new(Layout::default());
        let (_switch, screens) = ScreenSwitch::new(layout.segment_count());
        let board = MessageBoard::new(layout, screens, Default::default());

        let input = Cursor::new("cursor 4 2\nhello\\nworld\n\ncursor nope\n");
        read_commands(input, &board);

        assert_eq!(board.cursor().position(), (4, 2));
        let text = board.text().lock();
        assert_eq!(text.glyph_at(0, 0), Some(SegmentFont::glyph('H')));
        assert_eq!(text.glyph_at(0, 1), Some(SegmentFont::glyph('W')));
    }

    #[test]
    fn cli_flags_override_defaults() {
        let cli = Cli::parse_from([
            "hexboard",
            "--device",
            "/dev/ttyUSB7",
            "--device",
            "/dev/ttyUSB8",
            "--refresh-ms",
            "40",
            "probe",
        ]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.devices, vec!["/dev/ttyUSB7", "/dev/ttyUSB8"]);
        assert_eq!(config.refresh_ms, 40);
        assert_eq!(config.baud_rate, BoardConfig::default().baud_rate);
    }

    #[test]
    fn still_image_gets_fallback_delay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("still.png");
        DynamicImage::new_luma8(20, 10).save(&path).unwrap();

        let frames = load_frames(&path, 8, 4, Duration::from_millis(33)).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].luma.len(), 32);
        assert_eq!(frames[0].delay, Duration::from_millis(33));
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_frames(dir.path(), 8, 4, Duration::from_millis(33)).is_err());
    }
}
