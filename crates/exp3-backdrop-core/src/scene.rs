//! Scene composition for the 3D backdrop.
//!
//! Two large bodies in opposite deformation phase sit at diagonally opposite
//! off-center positions; three accents add texture. Lights and camera are
//! static; the orbit controls only allow a narrow angular window.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::Result;
use crate::rng::VisualRng;
use crate::shape::{AccentConfig, AccentShape, AnimatedShape, ShapeConfig, ShapeRenderData};

/// Orbit window half-width in radians (about 8.6 degrees)
pub const ORBIT_WINDOW: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub position: Vec3,
    pub intensity: f32,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub intensity: f32,
    pub color: Color,
}

/// Static lighting rig
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub ambient: AmbientLight,
    pub directional: DirectionalLight,
    pub point: PointLight,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: AmbientLight { intensity: 0.15 },
            directional: DirectionalLight {
                position: Vec3::new(10.0, 10.0, 5.0),
                intensity: 0.4,
                color: Color::WHITE,
            },
            point: PointLight {
                position: Vec3::new(-10.0, -10.0, -5.0),
                intensity: 0.3,
                color: Color::rgb8(0x6d, 0x28, 0xd9),
            },
        }
    }
}

/// Perspective camera looking at `target`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            position: Vec3::new(0.0, 0.0, 6.0),
            target: Vec3::ZERO,
        }
    }
}

/// Rotate-only orbit controls restricted to a small window around the front view.
///
/// Angles follow the usual spherical convention: polar is measured from +Y,
/// azimuth around Y starting at +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitControls {
    pub min_polar: f32,
    pub max_polar: f32,
    pub min_azimuth: f32,
    pub max_azimuth: f32,
    pub rotate_speed: f32,
    pub enable_zoom: bool,
    pub enable_pan: bool,
    polar: f32,
    azimuth: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            min_polar: FRAC_PI_2 - ORBIT_WINDOW,
            max_polar: FRAC_PI_2 + ORBIT_WINDOW,
            min_azimuth: -ORBIT_WINDOW,
            max_azimuth: ORBIT_WINDOW,
            rotate_speed: 0.05,
            enable_zoom: false,
            enable_pan: false,
            polar: FRAC_PI_2,
            azimuth: 0.0,
        }
    }
}

impl OrbitControls {
    /// Rotate by a pointer delta in radians before speed scaling, then clamp.
    pub fn drag(&mut self, delta_azimuth: f32, delta_polar: f32) {
        self.azimuth = (self.azimuth + delta_azimuth * self.rotate_speed)
            .clamp(self.min_azimuth, self.max_azimuth);
        self.polar =
            (self.polar + delta_polar * self.rotate_speed).clamp(self.min_polar, self.max_polar);
    }

    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    pub fn polar(&self) -> f32 {
        self.polar
    }

    /// Camera with its eye moved onto the orbit sphere around the target
    pub fn apply(&self, camera: &Camera) -> Camera {
        let radius = (camera.position - camera.target).length();
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let offset = Vec3::new(
            sin_polar * self.azimuth.sin(),
            cos_polar,
            sin_polar * self.azimuth.cos(),
        ) * radius;
        Camera {
            position: camera.target + offset,
            ..*camera
        }
    }
}

/// Serializable description of a large shape; colors are hex strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeSpec {
    pub position: Vec3,
    pub color: String,
    pub speed: f32,
    pub distort: f32,
    pub scale: f32,
    #[serde(default)]
    pub phase_offset: f32,
    #[serde(default = "default_path_complexity")]
    pub path_complexity: f32,
    #[serde(default = "default_path_scale")]
    pub path_scale: Vec3,
}

fn default_path_complexity() -> f32 {
    ShapeConfig::DEFAULT_PATH_COMPLEXITY
}

fn default_path_scale() -> Vec3 {
    ShapeConfig::DEFAULT_PATH_SCALE
}

impl ShapeSpec {
    fn to_config(&self) -> Result<ShapeConfig> {
        Ok(ShapeConfig {
            position: self.position,
            color: Color::from_hex(&self.color)?,
            speed: self.speed,
            distort: self.distort,
            scale: self.scale,
            phase_offset: self.phase_offset,
            path_complexity: self.path_complexity,
            path_scale: self.path_scale,
        })
    }
}

/// Serializable description of an accent shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccentSpec {
    pub position: Vec3,
    pub color: String,
    pub scale: f32,
    pub speed: f32,
}

impl AccentSpec {
    fn to_config(&self) -> Result<AccentConfig> {
        Ok(AccentConfig {
            position: self.position,
            color: Color::from_hex(&self.color)?,
            scale: self.scale,
            speed: self.speed,
        })
    }
}

/// Roster of a scene, loadable from RON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    pub shapes: Vec<ShapeSpec>,
    pub accents: Vec<AccentSpec>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            shapes: vec![
                ShapeSpec {
                    position: Vec3::new(-6.0, 4.0, -3.0),
                    color: "#5b21b6".to_string(),
                    speed: 0.25,
                    distort: 0.3,
                    scale: 7.5,
                    phase_offset: 0.0,
                    path_complexity: 1.5,
                    path_scale: Vec3::new(2.0, 1.5, 0.8),
                },
                ShapeSpec {
                    position: Vec3::new(6.0, -4.0, -4.0),
                    color: "#7c3aed".to_string(),
                    speed: 0.2,
                    distort: 0.25,
                    scale: 8.0,
                    phase_offset: PI,
                    path_complexity: 1.2,
                    path_scale: Vec3::new(1.8, 2.0, 0.7),
                },
            ],
            accents: vec![
                AccentSpec {
                    position: Vec3::new(3.0, 2.0, -2.0),
                    color: "#9333ea".to_string(),
                    scale: 0.8,
                    speed: 0.4,
                },
                AccentSpec {
                    position: Vec3::new(-4.0, -3.0, -1.0),
                    color: "#a855f7".to_string(),
                    scale: 0.6,
                    speed: 0.5,
                },
                AccentSpec {
                    position: Vec3::new(0.0, 5.0, -3.0),
                    color: "#8b5cf6".to_string(),
                    scale: 0.4,
                    speed: 0.6,
                },
            ],
        }
    }
}

/// The composed backdrop: shapes, accents, lights, camera and orbit limits
#[derive(Debug, Clone)]
pub struct Scene {
    shapes: Vec<AnimatedShape>,
    accents: Vec<AccentShape>,
    pub lighting: Lighting,
    pub camera: Camera,
    pub orbit: OrbitControls,
}

impl Scene {
    /// The default roster
    pub fn compose() -> Self {
        Self::from_config(&SceneConfig::default()).unwrap_or_else(|err| {
            log::error!("Default scene failed to compose: {}", err);
            Self::empty()
        })
    }

    pub fn from_config(config: &SceneConfig) -> Result<Self> {
        let shapes = config
            .shapes
            .iter()
            .map(|spec| spec.to_config().map(AnimatedShape::new))
            .collect::<Result<Vec<_>>>()?;
        let accents = config
            .accents
            .iter()
            .map(|spec| spec.to_config().map(AccentShape::new))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            shapes,
            accents,
            ..Self::empty()
        })
    }

    fn empty() -> Self {
        Self {
            shapes: Vec::new(),
            accents: Vec::new(),
            lighting: Lighting::default(),
            camera: Camera::default(),
            orbit: OrbitControls::default(),
        }
    }

    /// Build every missing path. Safe to call repeatedly.
    pub fn prepare<R: VisualRng + ?Sized>(&mut self, rng: &mut R) {
        for shape in &mut self.shapes {
            shape.prepare(rng);
        }
        for accent in &mut self.accents {
            accent.prepare(rng);
        }
    }

    /// Advance all entities; returns how many were updated this frame.
    pub fn tick(&mut self, elapsed: f32) -> usize {
        let mut updated = 0;
        for shape in &mut self.shapes {
            if shape.tick(elapsed) {
                updated += 1;
            }
        }
        for accent in &mut self.accents {
            if accent.tick(elapsed) {
                updated += 1;
            }
        }
        updated
    }

    pub fn shapes(&self) -> &[AnimatedShape] {
        &self.shapes
    }

    pub fn shapes_mut(&mut self) -> &mut [AnimatedShape] {
        &mut self.shapes
    }

    pub fn accents(&self) -> &[AccentShape] {
        &self.accents
    }

    /// Camera after applying the orbit controls
    pub fn view_camera(&self) -> Camera {
        self.orbit.apply(&self.camera)
    }

    /// Snapshots of every entity, large bodies first
    pub fn render_data(&self) -> Vec<ShapeRenderData> {
        self.shapes
            .iter()
            .map(AnimatedShape::render_data)
            .chain(self.accents.iter().map(AccentShape::render_data))
            .collect()
    }
}
