//! # EXP3 Backdrop
//!
//! Host side of the EXP3 animated backgrounds: a cooperative frame scheduler,
//! a CPU canvas and scene renderer, the two mountable backgrounds and an
//! offscreen capture pipeline. The animation engine itself lives in
//! [`exp3_backdrop_core`].

pub mod backgrounds;
pub mod capture;
pub mod config;
pub mod frame_loop;
pub mod render;

pub use backgrounds::{Backdrop, BlobBackground};
pub use config::BackdropConfig;
pub use frame_loop::{FrameHandle, FrameScheduler, FrameTick, Viewport};
pub use render::{PixelCanvas, SceneRenderer};

/// Common imports for internal use
pub mod prelude {
    pub use exp3_backdrop_core::{BlobField, Category, Color, Scene, SceneConfig, VisualRng};
    pub use glam::{Vec2, Vec3};
}
