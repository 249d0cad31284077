//! CPU pixel canvas used as the offscreen drawing target
//!
//! Stores premultiplied RGBA so repeated translucent fills blend without
//! drifting, and exports RGB composited over the black page background.

use exp3_backdrop_core::{BlobPass, BlobShape, BlobSurface, Color};
use glam::Vec2;

use super::raster;

/// Glow layers are rasterized and blurred at this fraction of full resolution
const GLOW_DOWNSAMPLE: f32 = 4.0;
/// Box blur passes per glow fill
const GLOW_BLUR_PASSES: usize = 3;
/// Polyline points per outline curve
const OUTLINE_STEPS: usize = 6;

/// How a fill combines with what is already on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Paint over, respecting source alpha
    SourceOver,
    /// Add premultiplied colors, clamped
    Lighter,
}

/// CPU-based RGBA canvas
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    width: usize,
    height: usize,
    /// Premultiplied RGBA pixel buffer (4 bytes per pixel)
    buffer: Vec<u8>,
    /// Whole-canvas opacity applied on export
    opacity: f32,
}

impl PixelCanvas {
    /// Create a transparent canvas of the given size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            buffer: vec![0u8; width * height * 4],
            opacity: 1.0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Reallocate for a new size; content is discarded.
    pub fn resize(&mut self, width: usize, height: usize) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.buffer = vec![0u8; width * height * 4];
    }

    /// Reset every pixel to transparent
    pub fn clear(&mut self) {
        self.buffer.fill(0);
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    /// Premultiplied RGBA of one pixel
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        Some([
            self.buffer[idx],
            self.buffer[idx + 1],
            self.buffer[idx + 2],
            self.buffer[idx + 3],
        ])
    }

    /// Blend a straight-alpha color into one pixel
    pub fn blend_pixel(&mut self, x: usize, y: usize, color: Color, mode: BlendMode) {
        if x >= self.width || y >= self.height {
            return;
        }
        self.composite(x, y, premultiply(color), mode);
    }

    fn composite(&mut self, x: usize, y: usize, src: [f32; 4], mode: BlendMode) {
        let idx = (y * self.width + x) * 4;
        let dst = &mut self.buffer[idx..idx + 4];
        let src_alpha = src[3];

        for (channel, s) in dst.iter_mut().zip(src) {
            let d = *channel as f32 / 255.0;
            let out = match mode {
                BlendMode::SourceOver => s + d * (1.0 - src_alpha),
                BlendMode::Lighter => s + d,
            };
            *channel = (out.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
    }

    /// Fill a closed polygon in canvas pixels, shading each covered pixel
    /// by its center position.
    pub fn fill_polygon(
        &mut self,
        points: &[Vec2],
        mode: BlendMode,
        shade: impl Fn(Vec2) -> Color,
    ) {
        let mut covered = Vec::new();
        raster::fill_polygon(points, self.width, self.height, |x, y| covered.push((x, y)));

        for (x, y) in covered {
            let color = shade(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
            self.composite(x, y, premultiply(color), mode);
        }
    }

    /// Fill a polygon blurred by roughly `blur` pixels, added onto the canvas.
    pub fn fill_glow(&mut self, points: &[Vec2], blur: f32, shade: impl Fn(Vec2) -> Color) {
        if points.len() < 3 {
            return;
        }

        let (min, max) = points.iter().fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(lo, hi), p| (lo.min(*p), hi.max(*p)),
        );
        let margin = Vec2::splat(blur.max(0.0) * GLOW_BLUR_PASSES as f32);
        let size = Vec2::new(self.width as f32, self.height as f32);
        let origin = (min - margin).max(-margin).floor();
        let end = (max + margin).min(size + margin).ceil();
        if end.x <= origin.x || end.y <= origin.y || !origin.is_finite() || !end.is_finite() {
            return;
        }

        let layer_w = ((end.x - origin.x) / GLOW_DOWNSAMPLE).ceil() as usize;
        let layer_h = ((end.y - origin.y) / GLOW_DOWNSAMPLE).ceil() as usize;
        let mut layer = vec![[0.0f32; 4]; layer_w * layer_h];

        let local: Vec<Vec2> = points
            .iter()
            .map(|p| (*p - origin) / GLOW_DOWNSAMPLE)
            .collect();
        raster::fill_polygon(&local, layer_w, layer_h, |x, y| {
            let center = origin + (Vec2::new(x as f32, y as f32) + 0.5) * GLOW_DOWNSAMPLE;
            layer[y * layer_w + x] = premultiply(shade(center));
        });

        let radius = (blur / GLOW_DOWNSAMPLE).round().max(0.0) as usize;
        raster::box_blur(&mut layer, layer_w, layer_h, radius, GLOW_BLUR_PASSES);

        let x_range = origin.x.max(0.0) as usize..(end.x.min(size.x).max(0.0) as usize);
        let y_range = origin.y.max(0.0) as usize..(end.y.min(size.y).max(0.0) as usize);
        for y in y_range {
            let ly = (y as f32 + 0.5 - origin.y) / GLOW_DOWNSAMPLE - 0.5;
            for x in x_range.clone() {
                let lx = (x as f32 + 0.5 - origin.x) / GLOW_DOWNSAMPLE - 0.5;
                let src = raster::sample_bilinear(&layer, layer_w, layer_h, lx, ly);
                if src[3] > 0.0 {
                    self.composite(x, y, src, BlendMode::Lighter);
                }
            }
        }
    }

    /// Paint a full-width band per row; `shade` receives the row's
    /// vertical position in 0..1 from the top.
    pub fn fill_rows(&mut self, shade: impl Fn(f32) -> Color) {
        for y in 0..self.height {
            let src = premultiply(shade((y as f32 + 0.5) / self.height as f32));
            if src[3] <= 0.0 {
                continue;
            }
            for x in 0..self.width {
                self.composite(x, y, src, BlendMode::SourceOver);
            }
        }
    }

    /// RGB buffer composited over black, with the canvas opacity applied
    pub fn get_rgb_buffer(&self) -> Vec<u8> {
        self.buffer
            .chunks_exact(4)
            .flat_map(|px| {
                [px[0], px[1], px[2]].map(|c| (c as f32 * self.opacity).round() as u8)
            })
            .collect()
    }
}

fn premultiply(color: Color) -> [f32; 4] {
    let a = color.a.clamp(0.0, 1.0);
    [
        color.r.clamp(0.0, 1.0) * a,
        color.g.clamp(0.0, 1.0) * a,
        color.b.clamp(0.0, 1.0) * a,
        a,
    ]
}

impl BlobSurface for PixelCanvas {
    fn clear(&mut self) {
        PixelCanvas::clear(self);
    }

    fn fill_blob(&mut self, shape: &BlobShape, pass: BlobPass) {
        let outline: Vec<Vec2> = shape
            .outline
            .flatten(OUTLINE_STEPS)
            .into_iter()
            .map(|p| shape.transform.transform_point2(p))
            .collect();

        // Gradient distance is measured in the blob's own (unsquashed) space
        let inverse = shape.transform.inverse();
        let shade = |p: Vec2| {
            let color = shape.gradient.color_at(inverse.transform_point2(p).length());
            color.with_alpha(color.a * shape.opacity)
        };

        match pass {
            BlobPass::Base => self.fill_polygon(&outline, BlendMode::SourceOver, shade),
            BlobPass::Glow { blur } => self.fill_glow(&outline, blur, shade),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: f32, max: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(min, min),
            Vec2::new(max, min),
            Vec2::new(max, max),
            Vec2::new(min, max),
        ]
    }

    #[test]
    fn test_new_canvas_is_transparent() {
        let canvas = PixelCanvas::new(8, 4);
        assert_eq!(canvas.pixel(7, 3), Some([0, 0, 0, 0]));
        assert_eq!(canvas.pixel(8, 0), None);
        assert_eq!(canvas.get_rgb_buffer().len(), 8 * 4 * 3);
    }

    #[test]
    fn test_source_over_half_alpha() {
        let mut canvas = PixelCanvas::new(1, 1);
        canvas.blend_pixel(0, 0, Color::WHITE, BlendMode::SourceOver);
        canvas.blend_pixel(0, 0, Color::BLACK.with_alpha(0.5), BlendMode::SourceOver);
        assert_eq!(canvas.pixel(0, 0), Some([128, 128, 128, 255]));
    }

    #[test]
    fn test_lighter_adds_and_clamps() {
        let mut canvas = PixelCanvas::new(1, 1);
        let grey = Color::rgb8(100, 100, 100);
        canvas.blend_pixel(0, 0, grey, BlendMode::Lighter);
        canvas.blend_pixel(0, 0, grey, BlendMode::Lighter);
        assert_eq!(canvas.pixel(0, 0), Some([200, 200, 200, 255]));
        canvas.blend_pixel(0, 0, grey, BlendMode::Lighter);
        assert_eq!(canvas.pixel(0, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_glow_spreads_beyond_polygon() {
        let mut canvas = PixelCanvas::new(64, 64);
        canvas.fill_glow(&square(24.0, 40.0), 8.0, |_| Color::WHITE);

        let inside = canvas.pixel(32, 32).map(|p| p[3]).unwrap_or(0);
        let outside = canvas.pixel(32, 44).map(|p| p[3]).unwrap_or(0);
        let far = canvas.pixel(0, 0).map(|p| p[3]).unwrap_or(0);
        assert!(inside > outside);
        assert!(outside > 0);
        assert_eq!(far, 0);
    }

    #[test]
    fn test_opacity_scales_export() {
        let mut canvas = PixelCanvas::new(2, 2);
        canvas.fill_polygon(&square(0.0, 2.0), BlendMode::SourceOver, |_| Color::WHITE);
        canvas.set_opacity(0.5);
        assert!(canvas.get_rgb_buffer().iter().all(|c| *c == 128));

        canvas.set_opacity(0.0);
        assert!(canvas.get_rgb_buffer().iter().all(|c| *c == 0));
    }

    #[test]
    fn test_rows_follow_vertical_position() {
        let mut canvas = PixelCanvas::new(2, 10);
        canvas.fill_rows(|t| Color::WHITE.with_alpha(t));
        let top = canvas.pixel(0, 0).map(|p| p[3]).unwrap_or(0);
        let bottom = canvas.pixel(0, 9).map(|p| p[3]).unwrap_or(0);
        assert!(bottom > top);
    }
}
