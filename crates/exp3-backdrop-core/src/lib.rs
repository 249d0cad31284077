//! # EXP3 Backdrop Core
//!
//! Renderer-agnostic animation engine behind the EXP3 backgrounds:
//! - `curve` builds closed, randomized 3D Bézier loops
//! - `shape` moves deforming bodies and accents along those loops
//! - `scene` composes the 3D backdrop roster, lights and camera
//! - `blob` drives the 2D gradient blob field and its drawing surface trait
//!
//! All randomness is drawn at construction through [`rng::VisualRng`], so a
//! seeded generator reproduces a backdrop exactly.

pub mod blob;
pub mod color;
pub mod curve;
pub mod error;
pub mod rng;
pub mod scene;
pub mod shape;
pub mod tween;

pub use blob::{BlobField, BlobPass, BlobShape, BlobSurface, Category};
pub use color::Color;
pub use curve::{CubicBezier3, CurvePath, PathSpec};
pub use error::{BackdropError, Result};
pub use rng::VisualRng;
pub use scene::{Camera, Lighting, OrbitControls, Scene, SceneConfig};
pub use shape::{AccentShape, AnimatedShape, Material, ShapeKind, ShapeRenderData};
pub use tween::{AnimatedValue, EaseType};
