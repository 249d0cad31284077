//! Software renderer for the 3D backdrop
//!
//! Bodies are drawn as lit, wobbling ellipsoid silhouettes and accents as
//! flat-shaded pentagons, back to front, through the scene's perspective
//! camera.

use std::f32::consts::{FRAC_PI_2, TAU};

use exp3_backdrop_core::{Camera, Color, Lighting, Material, Scene, ShapeKind, ShapeRenderData};
use glam::{Mat4, Vec2, Vec3};

use super::canvas::{BlendMode, PixelCanvas};

/// Anything closer than this to the camera is culled
const NEAR_PLANE: f32 = 0.1;
const ACCENT_SIDES: usize = 5;
/// Outward tilt of accent facet normals
const FACET_TILT: f32 = 0.55;
/// Radius swing of the body silhouette per unit of distortion
const WOBBLE_AMPLITUDE: f32 = 0.2;

/// Camera basis and pinhole projection in pixels
struct Projector {
    view: Mat4,
    focal: f32,
    center: Vec2,
    right: Vec3,
    up: Vec3,
    back: Vec3,
}

impl Projector {
    fn new(camera: &Camera, width: usize, height: usize) -> Self {
        let forward = (camera.target - camera.position).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);

        Self {
            view: Mat4::look_at_rh(camera.position, camera.target, Vec3::Y),
            focal: (height as f32 / 2.0) / (camera.fov_degrees.to_radians() / 2.0).tan(),
            center: Vec2::new(width as f32 / 2.0, height as f32 / 2.0),
            right,
            up,
            back: -forward,
        }
    }

    /// Screen position and view depth, `None` behind the near plane
    fn project(&self, world: Vec3) -> Option<(Vec2, f32)> {
        let view = self.view.transform_point3(world);
        let depth = -view.z;
        if depth <= NEAR_PLANE {
            return None;
        }
        let s = self.focal / depth;
        Some((
            Vec2::new(self.center.x + view.x * s, self.center.y - view.y * s),
            depth,
        ))
    }

    /// Screen-plane direction (x right, y up) plus outward component to world
    fn to_world(&self, screen: Vec2, outward: f32) -> Vec3 {
        self.right * screen.x + self.up * screen.y + self.back * outward
    }
}

/// Draws a [`Scene`] onto a [`PixelCanvas`]
#[derive(Debug, Clone)]
pub struct SceneRenderer {
    /// Silhouette points per body
    pub body_detail: usize,
}

impl Default for SceneRenderer {
    fn default() -> Self {
        Self { body_detail: 64 }
    }
}

impl SceneRenderer {
    /// Paint every visible entity, farthest first. The canvas is not cleared.
    ///
    /// Returns the number of entities drawn.
    pub fn render(&self, scene: &Scene, elapsed: f32, canvas: &mut PixelCanvas) -> usize {
        let projector = Projector::new(&scene.view_camera(), canvas.width(), canvas.height());

        let mut visible: Vec<(f32, Vec2, ShapeRenderData)> = scene
            .render_data()
            .into_iter()
            .filter_map(|data| {
                projector
                    .project(data.position)
                    .map(|(screen, depth)| (depth, screen, data))
            })
            .collect();
        visible.sort_by(|a, b| b.0.total_cmp(&a.0));

        for (depth, screen, data) in &visible {
            let px_per_unit = projector.focal / depth;
            match data.kind {
                ShapeKind::Body => self.draw_body(
                    &projector,
                    &scene.lighting,
                    data,
                    *screen,
                    px_per_unit,
                    elapsed,
                    canvas,
                ),
                ShapeKind::Accent => {
                    draw_accent(&projector, &scene.lighting, data, *screen, px_per_unit, canvas)
                }
            }
        }
        visible.len()
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_body(
        &self,
        projector: &Projector,
        lighting: &Lighting,
        data: &ShapeRenderData,
        center: Vec2,
        px_per_unit: f32,
        elapsed: f32,
        canvas: &mut PixelCanvas,
    ) {
        let axes = Vec2::new(data.scale.x, data.scale.y) * px_per_unit;
        if axes.min_element() <= 0.0 {
            return;
        }
        let spin = Vec2::from_angle(data.rotation.z);
        let unspin = Vec2::from_angle(-data.rotation.z);

        // Surface ripple driven by the shape's own rotation and surface speed
        let flow = elapsed * data.surface_speed * TAU;
        let wobble = |angle: f32| {
            let ripple = (3.0 * angle + data.rotation.y + flow).sin() * 0.6
                + (5.0 * angle - data.rotation.x * 2.0 - flow * 0.7).sin() * 0.4;
            1.0 + data.distort * WOBBLE_AMPLITUDE * ripple
        };

        let detail = self.body_detail.max(8);
        let outline: Vec<Vec2> = (0..detail)
            .map(|i| {
                let angle = i as f32 / detail as f32 * TAU;
                let local = spin.rotate(Vec2::from_angle(angle) * axes * wobble(angle));
                center + Vec2::new(local.x, -local.y)
            })
            .collect();

        let shade = |p: Vec2| {
            let offset = p - center;
            let local = unspin.rotate(Vec2::new(offset.x, -offset.y)) / axes;
            let r2 = local.length_squared();
            let (uv, outward) = if r2 >= 1.0 {
                (local / r2.sqrt(), 0.0)
            } else {
                (local, (1.0 - r2).sqrt())
            };
            let normal = projector.to_world(spin.rotate(uv), outward);
            light(lighting, &data.material, data.color, data.position, normal, projector.back)
        };

        canvas.fill_polygon(&outline, BlendMode::SourceOver, shade);
    }
}

fn draw_accent(
    projector: &Projector,
    lighting: &Lighting,
    data: &ShapeRenderData,
    center: Vec2,
    px_per_unit: f32,
    canvas: &mut PixelCanvas,
) {
    let radius = data.scale.x * px_per_unit;
    if radius <= 0.0 {
        return;
    }

    let spin = data.rotation.x + data.rotation.y;
    let sector = TAU / ACCENT_SIDES as f32;
    let corner = |k: usize| {
        let angle = spin + FRAC_PI_2 + k as f32 * sector;
        let v = Vec2::from_angle(angle) * radius;
        center + Vec2::new(v.x, -v.y)
    };
    let outline: Vec<Vec2> = (0..ACCENT_SIDES).map(corner).collect();

    let facets: Vec<Color> = (0..ACCENT_SIDES)
        .map(|k| {
            let mid = spin + FRAC_PI_2 + (k as f32 + 0.5) * sector;
            let normal = projector.to_world(Vec2::from_angle(mid) * FACET_TILT, 1.0 - FACET_TILT);
            light(lighting, &data.material, data.color, data.position, normal, projector.back)
        })
        .collect();

    let shade = |p: Vec2| {
        let offset = p - center;
        let angle = (-offset.y).atan2(offset.x) - spin - FRAC_PI_2;
        let k = (angle.rem_euclid(TAU) / sector) as usize;
        facets[k.min(ACCENT_SIDES - 1)]
    };

    canvas.fill_polygon(&outline, BlendMode::SourceOver, shade);
}

/// Ambient plus directional and point light, with a metallic highlight
fn light(
    lighting: &Lighting,
    material: &Material,
    base: Color,
    position: Vec3,
    normal: Vec3,
    to_eye: Vec3,
) -> Color {
    let normal = normal.normalize_or_zero();
    let base = Vec3::new(base.r, base.g, base.b);

    let to_sun = lighting.directional.position.normalize_or_zero();
    let to_point = (lighting.point.position - position).normalize_or_zero();
    let sun_color = rgb(lighting.directional.color);
    let point_color = rgb(lighting.point.color);

    let sun = normal.dot(to_sun).max(0.0) * lighting.directional.intensity;
    let point = normal.dot(to_point).max(0.0) * lighting.point.intensity;

    // Metals reflect mostly through highlights, not diffuse
    let diffuse_weight = 1.0 - material.metalness * 0.5;
    let direct = (sun_color * sun + point_color * point) * diffuse_weight;
    let diffuse = base * (lighting.ambient.intensity + direct);

    let shininess = 2.0 + (1.0 - material.roughness) * 62.0;
    let half = (to_sun + to_eye).normalize_or_zero();
    let highlight = normal.dot(half).max(0.0).powf(shininess)
        * lighting.directional.intensity
        * material.metalness;
    let color = diffuse + (base + Vec3::ONE) * 0.5 * highlight;

    Color {
        r: color.x,
        g: color.y,
        b: color.z,
        a: material.opacity,
    }
}

fn rgb(color: Color) -> Vec3 {
    Vec3::new(color.r, color.g, color.b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    #[test]
    fn test_projection_centers_target() {
        let projector = Projector::new(&Camera::default(), 200, 100);
        let (screen, depth) = projector.project(Vec3::ZERO).unwrap();
        assert!((screen - Vec2::new(100.0, 50.0)).length() < 1e-3);
        assert!((depth - 6.0).abs() < 1e-4);

        // Up in the world is up on screen
        let (above, _) = projector.project(Vec3::new(0.0, 1.0, 0.0)).unwrap();
        assert!(above.y < 50.0);

        assert!(projector.project(Vec3::new(0.0, 0.0, 10.0)).is_none());
    }

    #[test]
    fn test_unprepared_scene_still_draws() {
        let scene = Scene::compose();
        let mut canvas = PixelCanvas::new(160, 90);
        let drawn = SceneRenderer::default().render(&scene, 0.0, &mut canvas);
        assert_eq!(drawn, 5);
    }

    #[test]
    fn test_render_paints_pixels() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(42);
        let mut scene = Scene::compose();
        scene.prepare(&mut rng);
        scene.tick(0.5);

        let mut canvas = PixelCanvas::new(160, 90);
        SceneRenderer::default().render(&scene, 0.5, &mut canvas);

        let painted = canvas
            .get_rgb_buffer()
            .chunks_exact(3)
            .filter(|px| px.iter().any(|c| *c > 0))
            .count();
        assert!(painted > 160 * 90 / 10);
    }

    #[test]
    fn test_light_facing_sun_is_brighter() {
        let lighting = Lighting::default();
        let toward = lighting.directional.position.normalize();
        let lit = light(&lighting, &Material::SHAPE, Color::WHITE, Vec3::ZERO, toward, Vec3::Z);
        let unlit = light(&lighting, &Material::SHAPE, Color::WHITE, Vec3::ZERO, -toward, Vec3::Z);
        assert!(lit.r > unlit.r);
        assert_eq!(lit.a, Material::SHAPE.opacity);
    }
}
