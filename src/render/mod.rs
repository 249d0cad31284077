//! Rendering - CPU pixel canvas, 3D scene rasterizer and page overlays

mod canvas;
mod overlay;
mod raster;
mod scene_renderer;

pub use canvas::{BlendMode, PixelCanvas};
pub use overlay::VerticalGradient;
pub use scene_renderer::SceneRenderer;
