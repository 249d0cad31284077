//! Shapes that travel along their own curve path.
//!
//! Large shapes wobble, rotate, squash and stretch on a 7 second cycle and
//! pulse in brightness. Accent shapes are lighter: they follow a busier loop
//! faster, spin, and pulse uniformly in size.
//!
//! Every shape owns its path and accumulators; nothing is shared between
//! shapes. A shape without a path skips its update until `prepare` builds one.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::color::Color;
use crate::curve::{CurvePath, PathSpec};
use crate::rng::VisualRng;
use crate::tween::EaseType;

/// Seconds for one full compression/expansion cycle
pub const COMPRESSION_CYCLE_SECS: f32 = 7.0;
/// Fraction of the base scale traded between x and y at full deformation
pub const DEFORMATION_FACTOR: f32 = 0.35;
/// Brightness swing around 1.0 over the compression cycle
pub const BRIGHTNESS_PULSE: f32 = 0.15;

/// Path progress added per frame, multiplied by shape speed
const SHAPE_PROGRESS_STEP: f32 = 0.02;
const ACCENT_PROGRESS_STEP: f32 = 0.04;
/// Spin accumulator step for accents, multiplied by speed
const ACCENT_SPIN_STEP: f32 = 0.01;
/// Accumulators wrap at this value; it maps to one full loop
const PROGRESS_RANGE: f32 = 100.0;

/// Radii and complexity of every accent loop
const ACCENT_PATH_RADII: Vec3 = Vec3::new(2.5, 2.0, 1.0);
const ACCENT_PATH_COMPLEXITY: f32 = 3.0;

/// Surface finish, forwarded to renderers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub metalness: f32,
    pub roughness: f32,
    pub opacity: f32,
}

impl Material {
    pub const SHAPE: Material = Material {
        metalness: 0.8,
        roughness: 0.2,
        opacity: 0.85,
    };
    pub const ACCENT: Material = Material {
        metalness: 0.9,
        roughness: 0.1,
        opacity: 0.6,
    };
}

/// Static configuration of a large deforming shape
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeConfig {
    pub position: Vec3,
    pub color: Color,
    pub speed: f32,
    /// Surface distortion amount, consumed by renderers
    pub distort: f32,
    pub scale: f32,
    pub phase_offset: f32,
    pub path_complexity: f32,
    pub path_scale: Vec3,
}

impl ShapeConfig {
    pub const DEFAULT_PATH_COMPLEXITY: f32 = 1.0;
    pub const DEFAULT_PATH_SCALE: Vec3 = Vec3::new(1.5, 1.2, 0.8);

    pub fn path_spec(&self) -> PathSpec {
        PathSpec::new(self.position, self.path_scale, self.path_complexity)
    }
}

/// Static configuration of an accent shape
#[derive(Debug, Clone, PartialEq)]
pub struct AccentConfig {
    pub position: Vec3,
    pub color: Color,
    pub scale: f32,
    pub speed: f32,
}

impl AccentConfig {
    pub fn path_spec(&self) -> PathSpec {
        PathSpec::new(self.position, ACCENT_PATH_RADII, ACCENT_PATH_COMPLEXITY)
    }
}

/// What kind of body a render snapshot describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// Large, smooth, deforming body
    Body,
    /// Small faceted accent
    Accent,
}

/// Per-frame snapshot handed to renderers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeRenderData {
    pub kind: ShapeKind,
    pub position: Vec3,
    /// Euler angles in radians (x, y, z)
    pub rotation: Vec3,
    pub scale: Vec3,
    pub color: Color,
    pub material: Material,
    pub distort: f32,
    /// Speed of the surface distortion animation
    pub surface_speed: f32,
}

/// Cubic-eased compression value in [-1, 1] at `elapsed` seconds.
///
/// Shapes whose phase offsets differ by π return negated values.
pub fn compression(elapsed: f32, phase_offset: f32) -> f32 {
    let cycle = (elapsed / COMPRESSION_CYCLE_SECS * TAU + phase_offset).sin();
    let raw = (cycle + 1.0) / 2.0;
    EaseType::CubicInOut.apply(raw) * 2.0 - 1.0
}

/// Anisotropic scale for a base scale and compression value
pub fn deformed_scale(base: f32, compression: f32) -> Vec3 {
    Vec3::new(
        base * (1.0 + compression * DEFORMATION_FACTOR),
        base * (1.0 - compression * DEFORMATION_FACTOR),
        base,
    )
}

/// Brightness multiplier at `elapsed` seconds
pub fn brightness(elapsed: f32) -> f32 {
    1.0 + (elapsed / COMPRESSION_CYCLE_SECS * TAU).sin() * BRIGHTNESS_PULSE
}

/// A large shape travelling along its own curve path
#[derive(Debug, Clone)]
pub struct AnimatedShape {
    config: ShapeConfig,
    material: Material,
    path: Option<CurvePath>,
    progress: f32,
    position: Vec3,
    rotation: Vec3,
    scale: Vec3,
    color: Color,
}

impl AnimatedShape {
    /// Create a shape without a path; call `prepare` before the first frame.
    pub fn new(config: ShapeConfig) -> Self {
        Self {
            position: config.position,
            rotation: Vec3::ZERO,
            scale: Vec3::splat(config.scale),
            color: config.color,
            material: Material::SHAPE,
            path: None,
            progress: 0.0,
            config,
        }
    }

    /// Build the path if missing and pick a random start along it.
    ///
    /// Does nothing when the path already exists, so re-preparing never
    /// reshuffles a running shape.
    pub fn prepare<R: VisualRng + ?Sized>(&mut self, rng: &mut R) {
        if self.path.is_some() {
            return;
        }
        self.progress = rng.gen_f32() * PROGRESS_RANGE;
        let path = CurvePath::new(self.config.path_spec(), rng);
        log::debug!(
            "Built shape path with {} segments around {:?}",
            path.segment_count(),
            self.config.position
        );
        self.path = Some(path);
    }

    /// Replace origin, radii and complexity.
    ///
    /// The current path is discarded only if the spec actually changed; the
    /// shape then idles until the next `prepare`.
    pub fn set_path_spec(&mut self, spec: PathSpec) {
        if spec == self.config.path_spec() {
            return;
        }
        self.config.position = spec.origin;
        self.config.path_scale = spec.radii;
        self.config.path_complexity = spec.complexity;
        self.path = None;
    }

    /// Advance one frame. Returns `false` when skipped for lack of a path.
    pub fn tick(&mut self, elapsed: f32) -> bool {
        let Some(path) = &self.path else {
            return false;
        };

        let speed = self.config.speed;
        self.progress = (self.progress + speed * SHAPE_PROGRESS_STEP) % PROGRESS_RANGE;
        let on_path = path.point_at(self.progress / PROGRESS_RANGE);

        let t = elapsed * speed;
        self.position = on_path
            + Vec3::new(
                (t * 0.15).sin() * 0.2,
                (t * 0.2).sin() * 0.2,
                (t * 0.1).sin() * 0.1,
            );

        self.rotation = Vec3::new(
            (t * 0.15).sin() * 0.3,
            (t * 0.1).sin() * 0.4,
            (t * 0.05).sin() * 0.2,
        );

        self.scale = deformed_scale(
            self.config.scale,
            compression(elapsed, self.config.phase_offset),
        );

        // Always from the configured color, never from last frame's tint
        self.color = self.config.color.scaled(brightness(elapsed));
        true
    }

    pub fn config(&self) -> &ShapeConfig {
        &self.config
    }

    pub fn path(&self) -> Option<&CurvePath> {
        self.path.as_ref()
    }

    /// Path progress accumulator in [0, 100)
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn render_data(&self) -> ShapeRenderData {
        ShapeRenderData {
            kind: ShapeKind::Body,
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
            color: self.color,
            material: self.material,
            distort: self.config.distort,
            surface_speed: self.config.speed * 0.3,
        }
    }
}

/// A small accent travelling quickly along a busier loop
#[derive(Debug, Clone)]
pub struct AccentShape {
    config: AccentConfig,
    path: Option<CurvePath>,
    progress: f32,
    spin: f32,
    position: Vec3,
    rotation: Vec3,
    scale: f32,
}

impl AccentShape {
    pub fn new(config: AccentConfig) -> Self {
        Self {
            position: config.position,
            rotation: Vec3::ZERO,
            scale: config.scale,
            path: None,
            progress: 0.0,
            spin: 0.0,
            config,
        }
    }

    /// Build the path if missing and randomize both accumulators.
    pub fn prepare<R: VisualRng + ?Sized>(&mut self, rng: &mut R) {
        if self.path.is_some() {
            return;
        }
        self.spin = rng.gen_f32() * PROGRESS_RANGE;
        self.progress = rng.gen_f32() * PROGRESS_RANGE;
        self.path = Some(CurvePath::new(self.config.path_spec(), rng));
    }

    /// Advance one frame. Returns `false` when skipped for lack of a path.
    pub fn tick(&mut self, elapsed: f32) -> bool {
        let Some(path) = &self.path else {
            return false;
        };

        let speed = self.config.speed;
        self.spin += speed * ACCENT_SPIN_STEP;
        self.progress = (self.progress + speed * ACCENT_PROGRESS_STEP) % PROGRESS_RANGE;

        self.position = path.point_at(self.progress / PROGRESS_RANGE);
        self.rotation = Vec3::new(self.spin * 0.5, self.spin * 0.3, 0.0);
        self.scale = self.config.scale * ((elapsed * speed).sin() * 0.1 + 1.0);
        true
    }

    pub fn config(&self) -> &AccentConfig {
        &self.config
    }

    pub fn path(&self) -> Option<&CurvePath> {
        self.path.as_ref()
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Current uniform scale
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn render_data(&self) -> ShapeRenderData {
        ShapeRenderData {
            kind: ShapeKind::Accent,
            position: self.position,
            rotation: self.rotation,
            scale: Vec3::splat(self.scale),
            color: self.config.color,
            material: Material::ACCENT,
            distort: 0.0,
            surface_speed: 0.0,
        }
    }
}
