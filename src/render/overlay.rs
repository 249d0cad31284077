//! Full-width page overlays painted over a finished frame

use exp3_backdrop_core::Color;

use super::canvas::PixelCanvas;

/// Piecewise-linear gradient from top (0.0) to bottom (1.0)
#[derive(Debug, Clone, PartialEq)]
pub struct VerticalGradient {
    stops: Vec<(f32, Color)>,
}

impl VerticalGradient {
    /// Stops are sorted by position; positions outside 0..1 are clamped.
    pub fn new(mut stops: Vec<(f32, Color)>) -> Self {
        for stop in &mut stops {
            stop.0 = stop.0.clamp(0.0, 1.0);
        }
        stops.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { stops }
    }

    /// Black rising from transparent to opaque over the bottom quarter
    pub fn bottom_fade() -> Self {
        Self::new(vec![
            (0.75, Color::TRANSPARENT),
            (1.0, Color::BLACK),
        ])
    }

    /// Darkening veil over the blob field: 70%, 40%, then 80% black
    pub fn darkening() -> Self {
        Self::new(vec![
            (0.0, Color::BLACK.with_alpha(0.7)),
            (0.5, Color::BLACK.with_alpha(0.4)),
            (1.0, Color::BLACK.with_alpha(0.8)),
        ])
    }

    pub fn color_at(&self, t: f32) -> Color {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return Color::TRANSPARENT;
        };
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }

        for pair in self.stops.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if t <= to.0 {
                let span = to.0 - from.0;
                if span <= f32::EPSILON {
                    return to.1;
                }
                return from.1.lerp(to.1, (t - from.0) / span);
            }
        }
        last.1
    }

    pub fn paint(&self, canvas: &mut PixelCanvas) {
        canvas.fill_rows(|t| self.color_at(t));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bottom_fade_leaves_top_untouched() {
        let fade = VerticalGradient::bottom_fade();
        assert_eq!(fade.color_at(0.2).a, 0.0);
        assert_eq!(fade.color_at(0.75).a, 0.0);
        assert!((fade.color_at(0.875).a - 0.5).abs() < 1e-6);
        assert_eq!(fade.color_at(1.0), Color::BLACK);
    }

    #[test]
    fn test_darkening_stops() {
        let veil = VerticalGradient::darkening();
        assert!((veil.color_at(0.0).a - 0.7).abs() < 1e-6);
        assert!((veil.color_at(0.5).a - 0.4).abs() < 1e-6);
        assert!((veil.color_at(1.0).a - 0.8).abs() < 1e-6);
        assert!((veil.color_at(0.25).a - 0.55).abs() < 1e-6);
    }

    #[test]
    fn test_empty_gradient_is_transparent() {
        let gradient = VerticalGradient::new(Vec::new());
        assert_eq!(gradient.color_at(0.5), Color::TRANSPARENT);
    }

    #[test]
    fn test_paint_darkens_canvas() {
        let mut canvas = PixelCanvas::new(4, 4);
        canvas.fill_rows(|_| Color::WHITE);
        VerticalGradient::darkening().paint(&mut canvas);
        let px = canvas.pixel(0, 0).unwrap_or_default();
        assert!(px[0] < 255);
        assert_eq!(px[3], 255);
    }
}
