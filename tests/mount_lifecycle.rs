//! Mounting, unmounting and capturing backgrounds through the public API

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use exp3_backdrop::capture::{run_capture, CaptureOptions, CategorySwitch, Mode, OutputFormat};
use exp3_backdrop::{Backdrop, BlobBackground, FrameScheduler, PixelCanvas, Viewport};
use exp3_backdrop_core::{BlobField, Category, Scene, SceneConfig};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

fn canvas() -> Rc<RefCell<PixelCanvas>> {
    Rc::new(RefCell::new(PixelCanvas::new(1, 1)))
}

fn frame(scheduler: &mut FrameScheduler, n: u64) {
    scheduler.run_frame(Duration::from_millis(n * 33));
}

// ============================================================================
// Registration lifecycle
// ============================================================================

#[test]
fn test_unmount_withdraws_all_registrations() {
    let mut scheduler = FrameScheduler::new(Viewport::new(64, 36));
    let target = canvas();

    let mut rng = Xoshiro256StarStar::seed_from_u64(1);
    let backdrop = Backdrop::mount(&mut scheduler, Scene::compose(), &mut rng, &target);
    let blobs = BlobBackground::mount(
        &mut scheduler,
        "forum",
        Xoshiro256StarStar::seed_from_u64(2),
        &target,
    );
    assert_eq!(scheduler.frame_callbacks(), 2);
    assert_eq!(scheduler.resize_listeners(), 2);

    backdrop.unmount();
    assert_eq!(scheduler.frame_callbacks(), 1);
    assert_eq!(scheduler.resize_listeners(), 1);

    drop(blobs);
    assert_eq!(scheduler.frame_callbacks(), 0);
    assert_eq!(scheduler.resize_listeners(), 0);
    assert_eq!(scheduler.run_frame(Duration::from_secs(1)), 0);
}

#[test]
fn test_dropped_target_skips_frames() {
    let mut scheduler = FrameScheduler::new(Viewport::new(64, 36));
    let target = canvas();

    let mut rng = Xoshiro256StarStar::seed_from_u64(3);
    let backdrop = Backdrop::mount(&mut scheduler, Scene::compose(), &mut rng, &target);

    frame(&mut scheduler, 0);
    frame(&mut scheduler, 1);
    assert_eq!(backdrop.frames_drawn(), 2);

    drop(target);
    frame(&mut scheduler, 2);
    frame(&mut scheduler, 3);
    assert_eq!(backdrop.frames_drawn(), 2);
    assert!(backdrop.is_mounted());
}

#[test]
fn test_backgrounds_are_clocked_independently() {
    let mut scheduler = FrameScheduler::new(Viewport::new(64, 36));
    let first = canvas();
    let second = canvas();

    let blobs = BlobBackground::mount(
        &mut scheduler,
        "reading",
        Xoshiro256StarStar::seed_from_u64(4),
        &first,
    );
    scheduler.run_frame(Duration::from_secs(10));
    scheduler.run_frame(Duration::from_secs(11));
    assert_eq!(blobs.opacity(), 1.0);

    let mut rng = Xoshiro256StarStar::seed_from_u64(5);
    let backdrop = Backdrop::mount(&mut scheduler, Scene::compose(), &mut rng, &second);
    scheduler.run_frame(Duration::from_secs(12));

    // The backdrop's own clock starts now, so its fade has only just begun
    assert_eq!(backdrop.opacity(), 0.0);
    assert_eq!(blobs.opacity(), 1.0);
}

// ============================================================================
// Blob background behavior
// ============================================================================

#[test]
fn test_blob_opacity_never_decreases_across_frames() {
    let mut scheduler = FrameScheduler::new(Viewport::new(120, 80));
    let target = canvas();
    let blobs = BlobBackground::mount(
        &mut scheduler,
        "coming-soon",
        Xoshiro256StarStar::seed_from_u64(6),
        &target,
    );

    let opacities = |f: &BlobField| f.blobs().iter().map(|b| b.opacity).collect::<Vec<_>>();
    let mut previous = blobs.with_field(opacities);
    for n in 0..30 {
        frame(&mut scheduler, n);
        let current = blobs.with_field(opacities);
        for (before, after) in previous.iter().zip(&current) {
            assert!(after >= before);
        }
        previous = current;
    }
}

#[test]
fn test_frames_paint_the_blob_canvas() {
    let mut scheduler = FrameScheduler::new(Viewport::new(120, 80));
    let target = canvas();
    let _blobs = BlobBackground::mount(
        &mut scheduler,
        "all",
        Xoshiro256StarStar::seed_from_u64(7),
        &target,
    );

    for n in 0..40 {
        frame(&mut scheduler, n);
    }

    // The darkening veil alone covers every row with at least 40% black
    let canvas = target.borrow();
    assert_eq!(canvas.width(), 120);
    assert!((0..80).all(|y| canvas.pixel(60, y).map(|p| p[3]).unwrap_or(0) >= 100));
}

// ============================================================================
// Capture pipeline
// ============================================================================

fn options(mode: Mode, output: std::path::PathBuf) -> CaptureOptions {
    CaptureOptions {
        mode,
        category: "all".to_string(),
        frames: 4,
        fps: 10,
        width: 48,
        height: 27,
        seed: 99,
        scene: SceneConfig::default(),
        switch_category: None,
        output,
        show_progress: false,
    }
}

#[test]
fn test_capture_backdrop_gif() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("backdrop.gif");

    let summary = run_capture(&options(Mode::Backdrop, path.clone())).unwrap();
    assert_eq!(summary.frames, 4);
    assert_eq!(summary.format, OutputFormat::Gif);

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..6], b"GIF89a");
}

#[test]
fn test_capture_blobs_png_with_category_switch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blobs.png");

    let mut opts = options(Mode::Blobs, path.clone());
    opts.switch_category = Some(CategorySwitch {
        frame: 2,
        key: Category::Forum.key().to_string(),
    });

    let summary = run_capture(&opts).unwrap();
    assert_eq!(summary.format, OutputFormat::Png);

    let img = image::open(&path).unwrap();
    assert_eq!((img.width(), img.height()), (48, 27));
}

#[test]
fn test_capture_rejects_bad_scene_and_output() {
    let dir = tempfile::tempdir().unwrap();

    let mut opts = options(Mode::Backdrop, dir.path().join("out.gif"));
    opts.scene.shapes[0].color = "not-a-color".to_string();
    assert!(run_capture(&opts).is_err());

    let opts = options(Mode::Backdrop, dir.path().join("out.webm"));
    assert!(run_capture(&opts).is_err());
}
