//! Closed 3D Bézier loops that shapes travel along.
//!
//! A path is sampled around an ellipse whose z coordinate follows `sin(2θ)`,
//! which bends the flat ellipse into a figure-eight-like loop. Control points
//! between neighbouring samples get a frozen random offset so each loop looks
//! hand drawn.

use std::f32::consts::TAU;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::rng::VisualRng;

/// Base number of Bézier segments in every loop
const BASE_SEGMENTS: usize = 5;
/// Extra segments per unit of complexity
const SEGMENTS_PER_COMPLEXITY: f32 = 3.0;

/// Where along the chord the first/second control point sits, per axis
const CTRL1_CHORD: Vec3 = Vec3::new(0.3, 0.3, 0.1);
const CTRL2_CHORD: Vec3 = Vec3::new(0.7, 0.7, 0.9);
/// Control point jitter as a fraction of the radius, per axis
const CTRL_JITTER: Vec3 = Vec3::new(0.3, 0.3, 0.2);

/// Center, radii and complexity of a loop. Immutable for the lifetime of a path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathSpec {
    pub origin: Vec3,
    pub radii: Vec3,
    pub complexity: f32,
}

impl PathSpec {
    pub fn new(origin: Vec3, radii: Vec3, complexity: f32) -> Self {
        Self {
            origin,
            radii,
            complexity,
        }
    }

    /// Number of Bézier segments: `5 + floor(complexity * 3)`.
    ///
    /// Negative complexity is treated as zero.
    pub fn segment_count(&self) -> usize {
        BASE_SEGMENTS + (self.complexity.max(0.0) * SEGMENTS_PER_COMPLEXITY).floor() as usize
    }

    /// Point on the underlying warped ellipse at angle `theta`
    fn ellipse_point(&self, theta: f32) -> Vec3 {
        self.origin
            + Vec3::new(
                theta.cos() * self.radii.x,
                theta.sin() * self.radii.y,
                (theta * 2.0).sin() * self.radii.z,
            )
    }
}

/// One cubic Bézier segment in 3D
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier3 {
    pub start: Vec3,
    pub ctrl1: Vec3,
    pub ctrl2: Vec3,
    pub end: Vec3,
}

impl CubicBezier3 {
    /// Evaluate at `u` in [0, 1]
    pub fn point(&self, u: f32) -> Vec3 {
        let v = 1.0 - u;
        self.start * (v * v * v)
            + self.ctrl1 * (3.0 * v * v * u)
            + self.ctrl2 * (3.0 * v * u * u)
            + self.end * (u * u * u)
    }
}

/// Closed loop of cubic Bézier segments.
///
/// The end of every segment is the start of the next one and the last
/// segment ends exactly on the first segment's start.
#[derive(Debug, Clone)]
pub struct CurvePath {
    spec: PathSpec,
    segments: Vec<CubicBezier3>,
}

impl CurvePath {
    /// Build a loop for `spec`, drawing all control point jitter from `rng` now.
    pub fn new<R: VisualRng + ?Sized>(spec: PathSpec, rng: &mut R) -> Self {
        let count = spec.segment_count();
        let mut segments: Vec<CubicBezier3> = Vec::with_capacity(count);

        for i in 0..count {
            let theta = i as f32 / count as f32 * TAU;
            let next_theta = ((i + 1) % count) as f32 / count as f32 * TAU;

            let start = spec.ellipse_point(theta);
            let next = spec.ellipse_point(next_theta);
            let chord = next - start;

            let jitter1 = Vec3::new(rng.gen_centered(), rng.gen_centered(), rng.gen_centered())
                * spec.radii
                * CTRL_JITTER;
            let jitter2 = Vec3::new(rng.gen_centered(), rng.gen_centered(), rng.gen_centered())
                * spec.radii
                * CTRL_JITTER;

            // The closing segment reuses the first sample so the loop is exact.
            let end = match segments.first() {
                Some(first) if i == count - 1 => first.start,
                _ => next,
            };

            segments.push(CubicBezier3 {
                start,
                ctrl1: start + chord * CTRL1_CHORD + jitter1,
                ctrl2: start + chord * CTRL2_CHORD + jitter2,
                end,
            });
        }

        Self { spec, segments }
    }

    pub fn spec(&self) -> &PathSpec {
        &self.spec
    }

    pub fn segments(&self) -> &[CubicBezier3] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Point at normalized loop position `t`.
    ///
    /// `t` wraps, so `point_at(t)` and `point_at(t + 1.0)` land on the same
    /// spot and callers can feed an ever-growing accumulator.
    pub fn point_at(&self, t: f32) -> Vec3 {
        let count = self.segments.len();
        let mut t = t.rem_euclid(1.0);
        if !t.is_finite() || t >= 1.0 {
            t = 0.0;
        }

        let scaled = t * count as f32;
        let index = (scaled.floor() as usize).min(count - 1);
        let local = scaled - index as f32;
        self.segments[index].point(local)
    }
}
