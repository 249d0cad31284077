use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use exp3_backdrop::capture::{self, CaptureOptions, CategorySwitch, Mode};
use exp3_backdrop::BackdropConfig;
use exp3_backdrop_core::SceneConfig;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Background to render
    #[arg(long, value_enum, default_value_t = Mode::Backdrop)]
    mode: Mode,

    /// Blob category: all, reading, forum, coming-soon (others use the default palette)
    #[arg(long)]
    category: Option<String>,

    /// Number of frames to render
    #[arg(long)]
    frames: Option<usize>,

    /// Frames per second of the capture clock
    #[arg(long)]
    fps: Option<u16>,

    /// Viewport width in pixels
    #[arg(long)]
    width: Option<u16>,

    /// Viewport height in pixels
    #[arg(long)]
    height: Option<u16>,

    /// RNG seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// RON file with a custom scene roster
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Output file: .gif for an animation, .png for the last frame
    #[arg(long)]
    output: Option<PathBuf>,

    /// Change the blob category mid-capture, e.g. 60:forum
    #[arg(long)]
    switch_category: Option<CategorySwitch>,

    /// Configuration file (default: backdrop.ron if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the built-in scene roster as RON and exit
    #[arg(long)]
    print_scene: bool,
}

fn load_scene(path: Option<&str>) -> anyhow::Result<SceneConfig> {
    let Some(path) = path else {
        return Ok(SceneConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene file {}", path))?;
    ron::from_str(&text).with_context(|| format!("Failed to parse scene file {}", path))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => BackdropConfig::load_from(path)?,
        None => BackdropConfig::load()?,
    };

    let default_level = if config.debug.verbose_logging {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if args.print_scene {
        let text = ron::ser::to_string_pretty(&SceneConfig::default(), Default::default())
            .context("Failed to serialize scene")?;
        println!("{}", text);
        return Ok(());
    }

    // Command line flags win over every config layer
    if let Some(category) = args.category {
        config.blobs.category = category;
    }
    if let Some(frames) = args.frames {
        config.capture.frames = frames;
    }
    if let Some(fps) = args.fps {
        config.capture.fps = fps;
    }
    if let Some(width) = args.width {
        config.viewport.width = width;
    }
    if let Some(height) = args.height {
        config.viewport.height = height;
    }
    if let Some(seed) = args.seed {
        config.capture.seed = Some(seed);
    }
    if let Some(scene) = args.scene {
        config.scene.file = Some(scene.to_string_lossy().into_owned());
    }

    if args.switch_category.is_some() && args.mode != Mode::Blobs {
        log::warn!("--switch-category only applies to --mode blobs; ignoring it");
    }

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(&config.capture.output));
    let seed = config.capture.seed.unwrap_or_else(rand::random);

    let options = CaptureOptions {
        mode: args.mode,
        category: config.blobs.category.clone(),
        frames: config.capture.frames,
        fps: config.capture.fps,
        width: config.viewport.width,
        height: config.viewport.height,
        seed,
        scene: load_scene(config.scene.file.as_deref())?,
        switch_category: args.switch_category,
        output,
        show_progress: true,
    };

    let summary = capture::run_capture(&options)?;
    println!(
        "Wrote {} frames to {} (seed {})",
        summary.frames,
        summary.output.display(),
        seed
    );
    Ok(())
}
