//! Gradient blob field for the activities page background.
//!
//! Four soft radial-gradient blobs drift across the viewport, wrap around its
//! edges, rotate, squash and fade in. Nothing of the previous frame is kept on
//! the drawing surface: every frame clears it and draws every blob again,
//! first normally and then as a blurred additive glow.

use std::f32::consts::TAU;
use std::fmt;

use glam::{Affine2, Vec2};

use crate::color::Color;
use crate::rng::VisualRng;

/// Opacity gained per frame during fade-in
pub const FADE_IN_STEP: f32 = 0.005;
/// Blur radius of the glow pass in pixels
pub const GLOW_BLUR: f32 = 60.0;
/// Outline points around each blob
pub const OUTLINE_POINTS: usize = 8;
/// How far outline radii swing around the nominal radius
pub const OUTLINE_IRREGULARITY: f32 = 0.4;
/// Angular speed of the outline wobble
const OUTLINE_WOBBLE_SPEED: f32 = 0.5;

/// Page category selecting a palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    All,
    Reading,
    Forum,
    ComingSoon,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::All,
        Category::Reading,
        Category::Forum,
        Category::ComingSoon,
    ];

    /// Exact key match; `None` for unknown keys
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "all" => Some(Category::All),
            "reading" => Some(Category::Reading),
            "forum" => Some(Category::Forum),
            "coming-soon" => Some(Category::ComingSoon),
            _ => None,
        }
    }

    /// Any key, falling back to `All` for unknown ones
    pub fn from_key(key: &str) -> Self {
        Self::parse(key).unwrap_or_else(|| {
            log::debug!("Unknown blob category '{}', using default palette", key);
            Category::All
        })
    }

    pub fn key(&self) -> &'static str {
        match self {
            Category::All => "all",
            Category::Reading => "reading",
            Category::Forum => "forum",
            Category::ComingSoon => "coming-soon",
        }
    }

    pub fn palette(&self) -> &'static Palette {
        match self {
            Category::All => &PALETTE_ALL,
            Category::Reading => &PALETTE_READING,
            Category::Forum => &PALETTE_FORUM,
            Category::ComingSoon => &PALETTE_COMING_SOON,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Two-stop gradient and size of one blob slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlobStyle {
    pub inner: Color,
    pub outer: Color,
    pub size: f32,
}

const fn style(inner: Color, outer: Color, size: f32) -> BlobStyle {
    BlobStyle { inner, outer, size }
}

/// Four blob styles per category
pub type Palette = [BlobStyle; 4];

pub static PALETTE_ALL: Palette = [
    // Purple
    style(Color::rgba8(124, 58, 237, 0.15), Color::rgba8(139, 92, 246, 0.1), 300.0),
    // Green
    style(Color::rgba8(52, 211, 153, 0.15), Color::rgba8(16, 185, 129, 0.1), 350.0),
    // Blue
    style(Color::rgba8(59, 130, 246, 0.15), Color::rgba8(37, 99, 235, 0.1), 280.0),
    // Red
    style(Color::rgba8(239, 68, 68, 0.15), Color::rgba8(220, 38, 38, 0.1), 320.0),
];

pub static PALETTE_READING: Palette = [
    style(Color::rgba8(52, 211, 153, 0.2), Color::rgba8(16, 185, 129, 0.15), 350.0),
    style(Color::rgba8(5, 150, 105, 0.2), Color::rgba8(4, 120, 87, 0.15), 300.0),
    // Teal
    style(Color::rgba8(20, 184, 166, 0.2), Color::rgba8(13, 148, 136, 0.15), 280.0),
    // Cyan
    style(Color::rgba8(6, 182, 212, 0.15), Color::rgba8(8, 145, 178, 0.1), 320.0),
];

pub static PALETTE_FORUM: Palette = [
    style(Color::rgba8(124, 58, 237, 0.2), Color::rgba8(109, 40, 217, 0.15), 320.0),
    style(Color::rgba8(139, 92, 246, 0.2), Color::rgba8(124, 58, 237, 0.15), 280.0),
    style(Color::rgba8(91, 33, 182, 0.2), Color::rgba8(76, 29, 149, 0.15), 350.0),
    // Lavender
    style(Color::rgba8(167, 139, 250, 0.15), Color::rgba8(139, 92, 246, 0.1), 300.0),
];

pub static PALETTE_COMING_SOON: Palette = [
    style(Color::rgba8(59, 130, 246, 0.15), Color::rgba8(37, 99, 235, 0.1), 300.0),
    style(Color::rgba8(96, 165, 250, 0.15), Color::rgba8(59, 130, 246, 0.1), 280.0),
    // Grays
    style(Color::rgba8(75, 85, 99, 0.15), Color::rgba8(55, 65, 81, 0.1), 350.0),
    style(Color::rgba8(107, 114, 128, 0.1), Color::rgba8(75, 85, 99, 0.05), 320.0),
];

/// A single drifting blob
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    pub style: BlobStyle,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub deform_factor: f32,
    pub deform_speed: f32,
    pub deform_offset: f32,
    pub opacity: f32,
    pub target_opacity: f32,
}

impl Blob {
    fn spawn<R: VisualRng + ?Sized>(style: &BlobStyle, bounds: Vec2, rng: &mut R) -> Self {
        Self {
            position: Vec2::new(rng.gen_f32() * bounds.x, rng.gen_f32() * bounds.y),
            velocity: Vec2::new(rng.gen_centered() * 0.3, rng.gen_centered() * 0.3),
            size: style.size,
            style: *style,
            rotation: rng.gen_f32() * TAU,
            rotation_speed: rng.gen_centered() * 0.002,
            deform_factor: rng.gen_span(0.3, 0.3),
            deform_speed: rng.gen_span(0.0005, 0.001),
            deform_offset: rng.gen_f32() * TAU,
            opacity: 0.0,
            target_opacity: rng.gen_span(0.8, 0.2),
        }
    }

    /// Move, wrap around the viewport, spin and fade in by one frame.
    pub fn step(&mut self, bounds: Vec2) {
        self.position += self.velocity;

        let half = self.size / 2.0;
        if self.position.x < -half {
            self.position.x = bounds.x + half;
        }
        if self.position.x > bounds.x + half {
            self.position.x = -half;
        }
        if self.position.y < -half {
            self.position.y = bounds.y + half;
        }
        if self.position.y > bounds.y + half {
            self.position.y = -half;
        }

        self.rotation += self.rotation_speed;

        if self.opacity < self.target_opacity {
            self.opacity = (self.opacity + FADE_IN_STEP).min(self.target_opacity);
        }
    }

    /// Squash/stretch amount at `elapsed` seconds
    pub fn deformation(&self, elapsed: f32) -> f32 {
        (elapsed * self.deform_speed + self.deform_offset).sin() * self.deform_factor
    }

    /// Local-to-screen transform: translate, rotate, then squash
    pub fn transform(&self, elapsed: f32) -> Affine2 {
        let deform = self.deformation(elapsed);
        Affine2::from_translation(self.position)
            * Affine2::from_angle(self.rotation)
            * Affine2::from_scale(Vec2::new(1.0 + deform, 1.0 - deform))
    }

    /// Everything a surface needs to paint this blob at `elapsed` seconds
    pub fn shape(&self, elapsed: f32) -> BlobShape {
        BlobShape {
            transform: self.transform(elapsed),
            outline: BlobOutline::irregular(self.size / 2.0, elapsed),
            gradient: RadialGradient {
                radius: self.size / 2.0,
                inner: self.style.inner,
                outer: self.style.outer,
            },
            opacity: self.opacity,
        }
    }
}

/// Radial gradient centered on the blob's local origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialGradient {
    pub radius: f32,
    pub inner: Color,
    pub outer: Color,
}

impl RadialGradient {
    /// Color at `distance` from the center; clamps to the outer stop
    pub fn color_at(&self, distance: f32) -> Color {
        if self.radius <= 0.0 {
            return self.outer;
        }
        let t = (distance / self.radius).clamp(0.0, 1.0);
        self.inner.lerp(self.outer, t)
    }
}

/// Closed outline made of cubic Bézier curves in blob-local coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct BlobOutline {
    pub start: Vec2,
    /// (ctrl1, ctrl2, end) triples continuing from the previous end
    pub curves: Vec<[Vec2; 3]>,
}

impl BlobOutline {
    /// Star-like outline whose radii wobble independently of the blob's own
    /// deformation.
    pub fn irregular(radius: f32, elapsed: f32) -> Self {
        let step = TAU / OUTLINE_POINTS as f32;
        let radius_at = |angle: f32| {
            let wobble = (elapsed * OUTLINE_WOBBLE_SPEED + angle).sin();
            radius * (1.0 + wobble * OUTLINE_IRREGULARITY)
        };
        let point_at = |angle: f32| Vec2::from_angle(angle) * radius_at(angle);

        let curves = (1..=OUTLINE_POINTS)
            .map(|i| {
                let prev = step * (i - 1) as f32;
                let angle = step * i as f32;
                [
                    point_at(prev + step / 3.0),
                    point_at(prev + step / 3.0 * 2.0),
                    point_at(angle),
                ]
            })
            .collect();

        Self {
            start: point_at(0.0),
            curves,
        }
    }

    /// Polyline approximation with `steps` points per curve
    pub fn flatten(&self, steps: usize) -> Vec<Vec2> {
        let steps = steps.max(1);
        let mut points = Vec::with_capacity(self.curves.len() * steps + 1);
        points.push(self.start);

        let mut from = self.start;
        for [c1, c2, to] in &self.curves {
            for s in 1..=steps {
                let u = s as f32 / steps as f32;
                let v = 1.0 - u;
                points.push(
                    from * (v * v * v)
                        + *c1 * (3.0 * v * v * u)
                        + *c2 * (3.0 * v * u * u)
                        + *to * (u * u * u),
                );
            }
            from = *to;
        }
        points
    }
}

/// One blob, ready to paint
#[derive(Debug, Clone, PartialEq)]
pub struct BlobShape {
    pub transform: Affine2,
    pub outline: BlobOutline,
    pub gradient: RadialGradient,
    /// Global alpha applied on top of the gradient stops
    pub opacity: f32,
}

/// Which of the two paint passes a fill belongs to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlobPass {
    /// Normal source-over fill
    Base,
    /// Blurred fill composited additively
    Glow { blur: f32 },
}

/// Immediate-mode 2D drawing target for the blob field
pub trait BlobSurface {
    /// Erase the previous frame
    fn clear(&mut self);

    fn fill_blob(&mut self, shape: &BlobShape, pass: BlobPass);
}

/// The set of blobs for one category
#[derive(Debug, Clone)]
pub struct BlobField {
    category: Category,
    bounds: Vec2,
    blobs: Vec<Blob>,
}

impl BlobField {
    pub fn new<R: VisualRng + ?Sized>(
        category: Category,
        width: f32,
        height: f32,
        rng: &mut R,
    ) -> Self {
        let bounds = Vec2::new(width, height);
        Self {
            blobs: Self::spawn_blobs(category, bounds, rng),
            category,
            bounds,
        }
    }

    fn spawn_blobs<R: VisualRng + ?Sized>(
        category: Category,
        bounds: Vec2,
        rng: &mut R,
    ) -> Vec<Blob> {
        category
            .palette()
            .iter()
            .map(|style| Blob::spawn(style, bounds, rng))
            .collect()
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn blobs(&self) -> &[Blob] {
        &self.blobs
    }

    /// Discard every blob and start over with the new palette.
    ///
    /// Returns `false` and keeps the field untouched if the category is the same.
    pub fn set_category<R: VisualRng + ?Sized>(
        &mut self,
        category: Category,
        rng: &mut R,
    ) -> bool {
        if category == self.category {
            return false;
        }
        log::debug!("Blob field switching {} -> {}", self.category, category);
        self.category = category;
        self.blobs = Self::spawn_blobs(category, self.bounds, rng);
        true
    }

    /// New wrap bounds; blob positions are kept.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.bounds = Vec2::new(width, height);
    }

    /// Advance every blob by one frame
    pub fn step(&mut self) {
        let bounds = self.bounds;
        for blob in &mut self.blobs {
            blob.step(bounds);
        }
    }

    /// Paint every blob at `elapsed` seconds: base pass, then glow pass.
    pub fn draw<S: BlobSurface + ?Sized>(&self, elapsed: f32, surface: &mut S) {
        for blob in &self.blobs {
            let shape = blob.shape(elapsed);
            surface.fill_blob(&shape, BlobPass::Base);
            surface.fill_blob(&shape, BlobPass::Glow { blur: GLOW_BLUR });
        }
    }

    /// One full frame: clear, step, draw
    pub fn frame<S: BlobSurface + ?Sized>(&mut self, elapsed: f32, surface: &mut S) {
        surface.clear();
        self.step();
        self.draw(elapsed, surface);
    }
}
