//! Offscreen capture: mount one background, drive it at a fixed frame rate
//! and write the result as an animated GIF or a PNG of the last frame.

mod gif_capture;
mod snapshot;

pub use gif_capture::GifCapture;
pub use snapshot::save_png;

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use exp3_backdrop_core::{Scene, SceneConfig};
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

use crate::backgrounds::{Backdrop, BlobBackground};
use crate::frame_loop::{FrameScheduler, Viewport};
use crate::render::PixelCanvas;

/// Which background to capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    /// Drifting 3D shapes
    Backdrop,
    /// Gradient blob field
    Blobs,
}

/// Output container, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Gif,
    Png,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("gif") => Ok(OutputFormat::Gif),
            Some("png") => Ok(OutputFormat::Png),
            _ => anyhow::bail!(
                "Unsupported output '{}': use a .gif or .png file",
                path.display()
            ),
        }
    }
}

/// Switch the blob category when a given frame is reached, e.g. `60:forum`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySwitch {
    pub frame: usize,
    pub key: String,
}

impl FromStr for CategorySwitch {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (frame, key) = s
            .split_once(':')
            .with_context(|| format!("Expected <frame>:<category>, got '{}'", s))?;
        let frame = frame
            .trim()
            .parse()
            .with_context(|| format!("Invalid frame number in '{}'", s))?;
        Ok(Self {
            frame,
            key: key.trim().to_string(),
        })
    }
}

/// Everything a capture run needs
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub mode: Mode,
    pub category: String,
    pub frames: usize,
    pub fps: u16,
    pub width: u16,
    pub height: u16,
    pub seed: u64,
    pub scene: SceneConfig,
    pub switch_category: Option<CategorySwitch>,
    pub output: PathBuf,
    pub show_progress: bool,
}

/// What a capture run produced
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureSummary {
    pub frames: usize,
    pub format: OutputFormat,
    pub output: PathBuf,
}

enum Mounted {
    Backdrop(Backdrop),
    Blobs(BlobBackground),
}

impl Mounted {
    fn unmount(self) {
        match self {
            Mounted::Backdrop(backdrop) => backdrop.unmount(),
            Mounted::Blobs(blobs) => blobs.unmount(),
        }
    }
}

fn progress_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
    )
    .map(|style| style.progress_chars("█▓░"))
    .unwrap_or_else(|_| ProgressStyle::default_bar())
}

/// Mount, drive and unmount one background, then write the output file.
pub fn run_capture(options: &CaptureOptions) -> Result<CaptureSummary> {
    let format = OutputFormat::from_path(&options.output)?;
    if options.frames == 0 {
        anyhow::bail!("Nothing to capture: frame count is 0");
    }
    if options.width == 0 || options.height == 0 {
        anyhow::bail!("Viewport must be at least 1x1");
    }

    let viewport = Viewport::new(options.width as u32, options.height as u32);
    let mut scheduler = FrameScheduler::new(viewport);
    let canvas = Rc::new(RefCell::new(PixelCanvas::new(
        options.width as usize,
        options.height as usize,
    )));
    let mut rng = Xoshiro256StarStar::seed_from_u64(options.seed);

    let mounted = match options.mode {
        Mode::Backdrop => {
            let scene = Scene::from_config(&options.scene).context("Invalid scene configuration")?;
            Mounted::Backdrop(Backdrop::mount(&mut scheduler, scene, &mut rng, &canvas))
        }
        Mode::Blobs => Mounted::Blobs(BlobBackground::mount(
            &mut scheduler,
            &options.category,
            rng,
            &canvas,
        )),
    };
    log::info!(
        "Capturing {} frames of {:?} at {} fps ({}x{}, seed {})",
        options.frames,
        options.mode,
        options.fps,
        options.width,
        options.height,
        options.seed
    );

    let pb = if options.show_progress {
        ProgressBar::new(options.frames as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(progress_style());

    let mut gif = GifCapture::new(options.width, options.height, options.fps);
    let frame_secs = 1.0 / options.fps.max(1) as f64;

    for frame in 0..options.frames {
        if let (Some(switch), Mounted::Blobs(blobs)) = (&options.switch_category, &mounted) {
            if switch.frame == frame && blobs.set_category(&switch.key) {
                pb.println(format!("Frame {}: category -> {}", frame, blobs.category()));
            }
        }

        scheduler.run_frame(Duration::from_secs_f64(frame as f64 * frame_secs));
        if format == OutputFormat::Gif {
            gif.capture_frame(&canvas.borrow())?;
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    mounted.unmount();

    match format {
        OutputFormat::Gif => gif.save(&options.output)?,
        OutputFormat::Png => save_png(&canvas.borrow(), &options.output)?,
    }

    Ok(CaptureSummary {
        frames: options.frames,
        format,
        output: options.output.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("a.gif")).unwrap(), OutputFormat::Gif);
        assert_eq!(OutputFormat::from_path(Path::new("a.PNG")).unwrap(), OutputFormat::Png);
        assert!(OutputFormat::from_path(Path::new("a.mp4")).is_err());
        assert!(OutputFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_category_switch_parsing() {
        let switch: CategorySwitch = "60:coming-soon".parse().unwrap();
        assert_eq!(switch.frame, 60);
        assert_eq!(switch.key, "coming-soon");

        assert!("forum".parse::<CategorySwitch>().is_err());
        assert!("x:forum".parse::<CategorySwitch>().is_err());
    }
}
