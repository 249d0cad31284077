//! Mountable 3D backdrop: the composed scene, its fade-in and bottom fade.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use exp3_backdrop_core::{AnimatedValue, EaseType, Scene, VisualRng};

use crate::frame_loop::{FrameHandle, FrameScheduler, FrameTick, Viewport};
use crate::render::{PixelCanvas, SceneRenderer, VerticalGradient};

/// Duration of the opacity fade when the backdrop appears
pub const BACKDROP_FADE_SECS: f32 = 1.5;

struct BackdropState {
    scene: Scene,
    renderer: SceneRenderer,
    fade: AnimatedValue,
    overlay: VerticalGradient,
    frames_drawn: u64,
}

impl BackdropState {
    fn on_frame(&mut self, tick: FrameTick, canvas: &mut PixelCanvas) {
        self.fade.update(tick.delta);
        self.scene.tick(tick.elapsed);

        canvas.clear();
        self.renderer.render(&self.scene, tick.elapsed, canvas);
        self.overlay.paint(canvas);
        canvas.set_opacity(self.fade.value());

        self.frames_drawn += 1;
    }
}

/// The 3D backdrop attached to a scheduler and a render target.
///
/// Dropping it (or calling [`Backdrop::unmount`]) withdraws both its frame
/// callback and its resize listener.
pub struct Backdrop {
    state: Rc<RefCell<BackdropState>>,
    frames: FrameHandle,
    _resize: FrameHandle,
}

impl Backdrop {
    /// Prepare `scene`'s paths from `rng` and start drawing into `target`.
    ///
    /// The target is held weakly; once it is gone frames are skipped.
    pub fn mount<R: VisualRng + ?Sized>(
        scheduler: &mut FrameScheduler,
        mut scene: Scene,
        rng: &mut R,
        target: &Rc<RefCell<PixelCanvas>>,
    ) -> Self {
        scene.prepare(rng);
        log::info!(
            "Backdrop mounted: {} shapes, {} accents",
            scene.shapes().len(),
            scene.accents().len()
        );

        let viewport = scheduler.viewport();
        target
            .borrow_mut()
            .resize(viewport.width as usize, viewport.height as usize);

        let mut fade = AnimatedValue::new(0.0);
        fade.animate_to(1.0, BACKDROP_FADE_SECS, EaseType::EaseInOut);

        let state = Rc::new(RefCell::new(BackdropState {
            scene,
            renderer: SceneRenderer::default(),
            fade,
            overlay: VerticalGradient::bottom_fade(),
            frames_drawn: 0,
        }));

        let shared = Rc::clone(&state);
        let canvas: Weak<RefCell<PixelCanvas>> = Rc::downgrade(target);
        let frames = scheduler.request_frames(move |tick| {
            let Some(canvas) = canvas.upgrade() else {
                return;
            };
            shared.borrow_mut().on_frame(tick, &mut canvas.borrow_mut());
        });

        let canvas = Rc::downgrade(target);
        let resize = scheduler.on_resize(move |viewport: Viewport| {
            if let Some(canvas) = canvas.upgrade() {
                canvas
                    .borrow_mut()
                    .resize(viewport.width as usize, viewport.height as usize);
            }
        });

        Self {
            state,
            frames,
            _resize: resize,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.frames.is_active()
    }

    /// Frames actually drawn (skipped frames are not counted)
    pub fn frames_drawn(&self) -> u64 {
        self.state.borrow().frames_drawn
    }

    /// Current opacity of the fade-in wrapper
    pub fn opacity(&self) -> f32 {
        self.state.borrow().fade.value()
    }

    /// Rotate the camera within the orbit window
    pub fn drag(&self, delta_azimuth: f32, delta_polar: f32) {
        self.state
            .borrow_mut()
            .scene
            .orbit
            .drag(delta_azimuth, delta_polar);
    }

    pub fn with_scene<T>(&self, f: impl FnOnce(&Scene) -> T) -> T {
        f(&self.state.borrow().scene)
    }

    pub fn unmount(self) {
        log::debug!(
            "Backdrop unmounted after {} frames",
            self.state.borrow().frames_drawn
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;
    use std::time::Duration;

    fn mount(scheduler: &mut FrameScheduler, canvas: &Rc<RefCell<PixelCanvas>>) -> Backdrop {
        let mut rng = Xoshiro256StarStar::seed_from_u64(7);
        Backdrop::mount(scheduler, Scene::compose(), &mut rng, canvas)
    }

    #[test]
    fn test_mount_prepares_paths_and_sizes_target() {
        let mut scheduler = FrameScheduler::new(Viewport::new(96, 54));
        let canvas = Rc::new(RefCell::new(PixelCanvas::new(1, 1)));
        let backdrop = mount(&mut scheduler, &canvas);

        assert_eq!(canvas.borrow().width(), 96);
        assert_eq!(canvas.borrow().height(), 54);
        assert!(backdrop.with_scene(|s| s.shapes().iter().all(|shape| shape.path().is_some())));
    }

    #[test]
    fn test_fade_reaches_full_opacity() {
        let mut scheduler = FrameScheduler::new(Viewport::new(64, 36));
        let canvas = Rc::new(RefCell::new(PixelCanvas::new(64, 36)));
        let backdrop = mount(&mut scheduler, &canvas);

        scheduler.run_frame(Duration::ZERO);
        assert_eq!(backdrop.opacity(), 0.0);

        scheduler.run_frame(Duration::from_millis(750));
        let halfway = backdrop.opacity();
        assert!(halfway > 0.0 && halfway < 1.0);

        scheduler.run_frame(Duration::from_secs(2));
        assert_eq!(backdrop.opacity(), 1.0);
        assert_eq!(canvas.borrow().opacity(), 1.0);
    }

    #[test]
    fn test_drag_is_clamped_to_orbit_window() {
        let mut scheduler = FrameScheduler::new(Viewport::new(32, 32));
        let canvas = Rc::new(RefCell::new(PixelCanvas::new(32, 32)));
        let backdrop = mount(&mut scheduler, &canvas);

        backdrop.drag(100.0, 0.0);
        let azimuth = backdrop.with_scene(|s| s.orbit.azimuth());
        assert!(azimuth <= exp3_backdrop_core::scene::ORBIT_WINDOW + 1e-6);
    }
}
