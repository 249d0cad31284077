//! Mountable gradient blob background for the activities page.

use std::cell::RefCell;
use std::rc::Rc;

use exp3_backdrop_core::{AnimatedValue, BlobField, Category, EaseType};
use rand::RngCore;

use crate::frame_loop::{FrameHandle, FrameScheduler, FrameTick, Viewport};
use crate::render::{PixelCanvas, VerticalGradient};

/// Duration of the opacity fade on mount and on every category change
pub const BLOB_FADE_SECS: f32 = 0.5;

struct BlobState {
    field: BlobField,
    rng: Box<dyn RngCore>,
    fade: AnimatedValue,
    overlay: VerticalGradient,
}

impl BlobState {
    fn restart_fade(&mut self) {
        self.fade.set_immediate(0.0);
        self.fade.animate_to(1.0, BLOB_FADE_SECS, EaseType::EaseInOut);
    }

    fn on_frame(&mut self, tick: FrameTick, canvas: &mut PixelCanvas) {
        self.fade.update(tick.delta);
        self.field.frame(tick.elapsed, canvas);
        self.overlay.paint(canvas);
        canvas.set_opacity(self.fade.value());
    }
}

/// Blob field attached to a scheduler, a resize listener and a render target
pub struct BlobBackground {
    state: Rc<RefCell<BlobState>>,
    frames: FrameHandle,
    resize: FrameHandle,
}

impl BlobBackground {
    /// Spawn blobs for `category` (unknown keys use the default palette)
    /// and start drawing into `target`, sized to the scheduler's viewport.
    pub fn mount(
        scheduler: &mut FrameScheduler,
        category: &str,
        rng: impl RngCore + 'static,
        target: &Rc<RefCell<PixelCanvas>>,
    ) -> Self {
        let viewport = scheduler.viewport();
        target
            .borrow_mut()
            .resize(viewport.width as usize, viewport.height as usize);

        let mut rng: Box<dyn RngCore> = Box::new(rng);
        let category = Category::from_key(category);
        let field = BlobField::new(
            category,
            viewport.width as f32,
            viewport.height as f32,
            &mut *rng,
        );
        log::info!(
            "Blob background mounted: category '{}', {}x{}",
            category,
            viewport.width,
            viewport.height
        );

        let mut state = BlobState {
            field,
            rng,
            fade: AnimatedValue::new(0.0),
            overlay: VerticalGradient::darkening(),
        };
        state.restart_fade();
        let state = Rc::new(RefCell::new(state));

        let shared = Rc::clone(&state);
        let canvas = Rc::downgrade(target);
        let frames = scheduler.request_frames(move |tick| {
            let Some(canvas) = canvas.upgrade() else {
                return;
            };
            shared.borrow_mut().on_frame(tick, &mut canvas.borrow_mut());
        });

        let shared = Rc::clone(&state);
        let canvas = Rc::downgrade(target);
        let resize = scheduler.on_resize(move |viewport: Viewport| {
            shared
                .borrow_mut()
                .field
                .resize(viewport.width as f32, viewport.height as f32);
            if let Some(canvas) = canvas.upgrade() {
                canvas
                    .borrow_mut()
                    .resize(viewport.width as usize, viewport.height as usize);
            }
        });

        Self {
            state,
            frames,
            resize,
        }
    }

    /// Switch palettes. A different category respawns every blob and
    /// restarts the fade; the same category changes nothing.
    pub fn set_category(&self, key: &str) -> bool {
        let category = Category::from_key(key);
        let mut state = self.state.borrow_mut();
        let BlobState { field, rng, .. } = &mut *state;

        if !field.set_category(category, &mut **rng) {
            return false;
        }
        state.restart_fade();
        true
    }

    pub fn category(&self) -> Category {
        self.state.borrow().field.category()
    }

    /// Current opacity of the fade wrapper
    pub fn opacity(&self) -> f32 {
        self.state.borrow().fade.value()
    }

    pub fn with_field<T>(&self, f: impl FnOnce(&BlobField) -> T) -> T {
        f(&self.state.borrow().field)
    }

    pub fn is_mounted(&self) -> bool {
        self.frames.is_active() && self.resize.is_active()
    }

    pub fn unmount(self) {
        log::debug!("Blob background unmounted ({})", self.category());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;
    use std::time::Duration;

    fn mount(
        scheduler: &mut FrameScheduler,
        key: &str,
    ) -> (BlobBackground, Rc<RefCell<PixelCanvas>>) {
        let canvas = Rc::new(RefCell::new(PixelCanvas::new(1, 1)));
        let rng = Xoshiro256StarStar::seed_from_u64(21);
        let background = BlobBackground::mount(scheduler, key, rng, &canvas);
        (background, canvas)
    }

    #[test]
    fn test_unknown_category_uses_default_palette() {
        let mut scheduler = FrameScheduler::new(Viewport::new(80, 60));
        let (background, _canvas) = mount(&mut scheduler, "archery");
        assert_eq!(background.category(), Category::All);
        assert_eq!(background.with_field(|f| f.blobs().len()), 4);
    }

    #[test]
    fn test_category_change_restarts_fade() {
        let mut scheduler = FrameScheduler::new(Viewport::new(80, 60));
        let (background, _canvas) = mount(&mut scheduler, "reading");

        scheduler.run_frame(Duration::ZERO);
        scheduler.run_frame(Duration::from_secs(1));
        assert_eq!(background.opacity(), 1.0);

        assert!(!background.set_category("reading"));
        assert_eq!(background.opacity(), 1.0);

        assert!(background.set_category("forum"));
        assert_eq!(background.category(), Category::Forum);
        assert_eq!(background.opacity(), 0.0);
        assert!(background.with_field(|f| f.blobs().iter().all(|b| b.opacity == 0.0)));
    }

    #[test]
    fn test_resize_updates_bounds_and_target() {
        let mut scheduler = FrameScheduler::new(Viewport::new(80, 60));
        let (background, canvas) = mount(&mut scheduler, "all");
        let positions = |f: &BlobField| f.blobs().iter().map(|b| b.position).collect::<Vec<_>>();
        let before = background.with_field(positions);

        scheduler.resize(Viewport::new(40, 30));

        assert_eq!(background.with_field(|f| f.bounds()), glam::Vec2::new(40.0, 30.0));
        assert_eq!(canvas.borrow().width(), 40);
        let after = background.with_field(positions);
        assert_eq!(before, after);
    }
}
