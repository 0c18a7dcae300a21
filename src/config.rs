//! Tunable constants and command-line options.

use crate::color::Rgb;
use std::path::PathBuf;
use tracing::Level;

/// Logical drawing surface (in show pixels, before terminal scaling)
pub mod canvas {
    use crate::color::Rgb;

    pub const WIDTH: f32 = 800.0;
    pub const HEIGHT: f32 = 600.0;
    pub const BACKGROUND: Rgb = Rgb::BLACK;
    /// Opacity used for solid points, whatever the particle alpha
    pub const SOLID_ALPHA: u8 = 0x7F;
    /// Inner stop of the radial gradient, in show pixels
    pub const GRADIENT_INNER_RADIUS: f32 = 0.1;
}

/// Timing constants (in milliseconds unless noted)
pub mod timing {
    pub const DEFAULT_FPS: u32 = 60;
    pub const MAX_FPS: u32 = 240;
    /// Upper bound for a single input poll inside a frame
    pub const EVENT_POLL_MS: u64 = 1;
}

/// Simulation coefficients shared by every firework of a kind
pub mod sim {
    /// Particles produced by one rocket explosion
    pub const ROCKET_BURST: usize = 90;
    /// Diameter of an ascending rocket head
    pub const ROCKET_SIZE: f32 = 8.0;
    /// Concurrent live particles per fountain
    pub const FOUNTAIN_MAX_PARTICLES: usize = 50;
    /// Show velocities are px/s, rockets integrate in px/ms
    pub const VELOCITY_SCALE: f32 = 1.0 / 1000.0;
}

/// Bundled show used when no file is given
pub const DEFAULT_SHOW: &str = include_str!("../shows/default.xml");

/// Message shown when the show has to stop
pub const FATAL_MESSAGE: &str =
    "Oops! Unfortunately you will need to wait until the new year to see more fireworks :(";

#[derive(Debug, Clone, PartialEq)]
pub enum ShowPath {
    Bundled,
    Stdin,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub show: ShowPath,
    pub bg_color: Rgb,
    pub width: f32,
    pub height: f32,
    pub fps: u32,
    pub log_file: Option<PathBuf>,
    pub log_level: Level,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            show: ShowPath::Bundled,
            bg_color: canvas::BACKGROUND,
            width: canvas::WIDTH,
            height: canvas::HEIGHT,
            fps: timing::DEFAULT_FPS,
            log_file: None,
            log_level: Level::INFO,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Command {
    Run(Options),
    Help,
}

pub fn usage() -> String {
    let mut s = String::new();
    s.push_str("skyshow - Terminal fireworks display driven by a show file\n\n");
    s.push_str("Usage: skyshow [SHOW_FILE] [OPTIONS]\n\n");
    s.push_str("Show file:\n");
    s.push_str("  *.json    JSON show description\n");
    s.push_str("  *         XML <FireworkDisplay> document\n");
    s.push_str("  -         read XML from stdin\n");
    s.push_str("  (none)    bundled demo show\n\n");
    s.push_str("Options:\n");
    s.push_str("  --bg-color RRGGBB  Background color as hex (e.g., --bg-color 1a1b26)\n");
    s.push_str("  --size WxH         Logical canvas size in show pixels (default 800x600)\n");
    s.push_str("  --fps N            Target frame rate (default 60)\n");
    s.push_str("  --log FILE         Write logs to FILE\n");
    s.push_str("  --log-level LEVEL  trace, debug, info, warn or error (default info)\n\n");
    s.push_str("Press 'q', ESC, or Ctrl+C to exit");
    s
}

fn parse_size(value: &str) -> Option<(f32, f32)> {
    let (w, h) = value.split_once(['x', 'X'])?;
    let w: f32 = w.trim().parse().ok()?;
    let h: f32 = h.trim().parse().ok()?;
    (w >= 1.0 && h >= 1.0).then_some((w, h))
}

/// Parse command-line arguments (without the program name).
pub fn parse_args<I, S>(args: I) -> Result<Command, String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    let mut options = Options::default();
    let mut show_given = false;

    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        let value = args.get(i + 1).map(String::as_str);
        match arg {
            "help" | "--help" | "-h" => return Ok(Command::Help),
            "--bg-color" => {
                let value = value.ok_or("--bg-color requires a hex color value")?;
                options.bg_color = Rgb::from_hex(value)
                    .ok_or_else(|| format!("Invalid hex color: {value}\nExpected format: RRGGBB (e.g., 1a1b26)"))?;
                i += 2;
            }
            "--size" => {
                let value = value.ok_or("--size requires a WxH value")?;
                let (w, h) = parse_size(value).ok_or_else(|| format!("Invalid canvas size: {value}"))?;
                options.width = w;
                options.height = h;
                i += 2;
            }
            "--fps" => {
                let value = value.ok_or("--fps requires a number")?;
                options.fps = value
                    .parse()
                    .ok()
                    .filter(|fps| (1..=timing::MAX_FPS).contains(fps))
                    .ok_or_else(|| format!("Invalid frame rate: {value}"))?;
                i += 2;
            }
            "--log" => {
                let value = value.ok_or("--log requires a file path")?;
                options.log_file = Some(PathBuf::from(value));
                i += 2;
            }
            "--log-level" => {
                let value = value.ok_or("--log-level requires a level")?;
                options.log_level = value.parse().map_err(|_| format!("Invalid log level: {value}"))?;
                i += 2;
            }
            "-" if !show_given => {
                options.show = ShowPath::Stdin;
                show_given = true;
                i += 1;
            }
            arg if !arg.starts_with('-') && !show_given => {
                options.show = ShowPath::File(PathBuf::from(arg));
                show_given = true;
                i += 1;
            }
            arg => return Err(format!("Unknown option: {arg}")),
        }
    }

    Ok(Command::Run(options))
}
