//! Scanline helpers shared by the canvas and its offscreen glow layers.

use glam::Vec2;

/// Visit every pixel of a `width` x `height` grid whose center lies inside
/// the closed polygon `points` (even-odd rule).
pub fn fill_polygon(
    points: &[Vec2],
    width: usize,
    height: usize,
    mut plot: impl FnMut(usize, usize),
) {
    if points.len() < 3 || width == 0 || height == 0 {
        return;
    }

    let (min_y, max_y) = points
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.y), hi.max(p.y))
        });
    if !min_y.is_finite() || !max_y.is_finite() {
        return;
    }

    // Rows whose centers (y + 0.5) fall within [min_y, max_y]
    let first_row = (min_y - 0.5).ceil().max(0.0);
    let last_row = (max_y - 0.5).floor().min(height as f32 - 1.0);
    if last_row < first_row {
        return;
    }

    let mut crossings: Vec<f32> = Vec::with_capacity(8);
    for y in first_row as usize..=last_row as usize {
        let center_y = y as f32 + 0.5;

        crossings.clear();
        for (i, a) in points.iter().enumerate() {
            let b = points[(i + 1) % points.len()];
            if (a.y <= center_y) != (b.y <= center_y) {
                let t = (center_y - a.y) / (b.y - a.y);
                crossings.push(a.x + t * (b.x - a.x));
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));

        for span in crossings.chunks_exact(2) {
            let first_col = (span[0] - 0.5).ceil().max(0.0);
            let last_col = (span[1] - 0.5).floor().min(width as f32 - 1.0);
            if last_col < first_col {
                continue;
            }
            for x in first_col as usize..=last_col as usize {
                plot(x, y);
            }
        }
    }
}

/// Separable box blur over premultiplied RGBA, repeated `passes` times.
///
/// Three passes approximate a Gaussian with sigma close to `radius`.
/// Everything outside the layer counts as transparent.
pub fn box_blur(
    layer: &mut [[f32; 4]],
    width: usize,
    height: usize,
    radius: usize,
    passes: usize,
) {
    if radius == 0 || width == 0 || height == 0 {
        return;
    }

    let mut line = vec![[0.0; 4]; width.max(height)];
    let mut out = vec![[0.0; 4]; width.max(height)];

    for _ in 0..passes {
        for y in 0..height {
            let row = &mut layer[y * width..(y + 1) * width];
            line[..width].copy_from_slice(row);
            blur_line(&line[..width], &mut out[..width], radius);
            row.copy_from_slice(&out[..width]);
        }

        for x in 0..width {
            for y in 0..height {
                line[y] = layer[y * width + x];
            }
            blur_line(&line[..height], &mut out[..height], radius);
            for y in 0..height {
                layer[y * width + x] = out[y];
            }
        }
    }
}

fn blur_line(src: &[[f32; 4]], dst: &mut [[f32; 4]], radius: usize) {
    let len = src.len();
    let norm = 1.0 / (2 * radius + 1) as f32;
    let mut acc = [0.0f32; 4];

    for px in &src[..=radius.min(len - 1)] {
        add(&mut acc, px, 1.0);
    }

    for i in 0..len {
        dst[i] = acc.map(|c| c * norm);
        if i + radius + 1 < len {
            add(&mut acc, &src[i + radius + 1], 1.0);
        }
        if i >= radius {
            add(&mut acc, &src[i - radius], -1.0);
        }
    }
}

fn add(acc: &mut [f32; 4], px: &[f32; 4], sign: f32) {
    for (a, c) in acc.iter_mut().zip(px) {
        *a += c * sign;
    }
}

/// Bilinear sample with transparent edges; `x`/`y` in pixel-center coordinates.
pub fn sample_bilinear(
    layer: &[[f32; 4]],
    width: usize,
    height: usize,
    x: f32,
    y: f32,
) -> [f32; 4] {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;

    let texel = |ix: f32, iy: f32| -> [f32; 4] {
        if ix < 0.0 || iy < 0.0 || ix >= width as f32 || iy >= height as f32 {
            return [0.0; 4];
        }
        layer[iy as usize * width + ix as usize]
    };

    let a = texel(x0, y0);
    let b = texel(x0 + 1.0, y0);
    let c = texel(x0, y0 + 1.0);
    let d = texel(x0 + 1.0, y0 + 1.0);

    std::array::from_fn(|i| {
        let top = a[i] + (b[i] - a[i]) * fx;
        let bottom = c[i] + (d[i] - c[i]) * fx;
        top + (bottom - top) * fy
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_covers_expected_pixels() {
        let square = [
            Vec2::new(1.0, 1.0),
            Vec2::new(4.0, 1.0),
            Vec2::new(4.0, 3.0),
            Vec2::new(1.0, 3.0),
        ];
        let mut hits = Vec::new();
        fill_polygon(&square, 10, 10, |x, y| hits.push((x, y)));

        assert_eq!(hits.len(), 3 * 2);
        assert!(hits.contains(&(1, 1)));
        assert!(hits.contains(&(3, 2)));
        assert!(!hits.contains(&(4, 1)));
    }

    #[test]
    fn test_polygon_is_clipped_to_grid() {
        let big = [
            Vec2::new(-50.0, -50.0),
            Vec2::new(50.0, -50.0),
            Vec2::new(50.0, 50.0),
            Vec2::new(-50.0, 50.0),
        ];
        let mut count = 0;
        fill_polygon(&big, 4, 3, |_, _| count += 1);
        assert_eq!(count, 12);
    }

    #[test]
    fn test_blur_preserves_mass_away_from_edges() {
        let (w, h) = (21, 21);
        let mut layer = vec![[0.0; 4]; w * h];
        layer[10 * w + 10] = [1.0, 1.0, 1.0, 1.0];

        box_blur(&mut layer, w, h, 2, 3);

        let total: f32 = layer.iter().map(|p| p[3]).sum();
        assert!((total - 1.0).abs() < 1e-4);
        assert!(layer[10 * w + 10][3] < 1.0);
        assert!(layer[10 * w + 11][3] > 0.0);
    }

    #[test]
    fn test_bilinear_midpoint() {
        let layer = vec![[0.0; 4], [1.0; 4]];
        let mid = sample_bilinear(&layer, 2, 1, 0.5, 0.0);
        assert!((mid[0] - 0.5).abs() < 1e-6);
        assert_eq!(sample_bilinear(&layer, 2, 1, -3.0, 0.0), [0.0; 4]);
    }
}
