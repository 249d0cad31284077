//! Linear RGBA colors shared by the 3D scene and the blob field.

use std::str::FromStr;

use crate::error::{BackdropError, Result};

/// RGBA color with components in 0.0..=1.0.
///
/// Color channels may exceed 1.0 after brightness scaling; they are clamped
/// only when converted to bytes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb8(0, 0, 0);
    pub const WHITE: Color = Color::rgb8(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba8(0, 0, 0, 0.0);

    /// Opaque color from 8-bit channels
    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba8(r, g, b, 1.0)
    }

    /// Color from 8-bit channels and a fractional alpha, like CSS `rgba()`
    pub const fn rgba8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a,
        }
    }

    /// Parse `#rrggbb` or `#rgb` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let invalid = || BackdropError::InvalidColor(hex.to_string());

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match digits.len() {
            6 => Ok(Self::rgb8(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => {
                let short = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
                Ok(Self::rgb8(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(invalid()),
        }
    }

    /// Multiply the color channels by `factor`, leaving alpha untouched.
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            r: self.r * factor,
            g: self.g * factor,
            b: self.b * factor,
            a: self.a,
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Component-wise interpolation including alpha
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Clamp to bytes for pixel buffers
    pub fn to_rgba8(self) -> [u8; 4] {
        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [byte(self.r), byte(self.g), byte(self.b), byte(self.a)]
    }
}

impl FromStr for Color {
    type Err = BackdropError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_long_form() {
        let color = Color::from_hex("#5b21b6").unwrap();
        assert_eq!(color.to_rgba8(), [0x5b, 0x21, 0xb6, 255]);
    }

    #[test]
    fn test_from_hex_short_form() {
        let color: Color = "#fff".parse().unwrap();
        assert_eq!(color.to_rgba8(), [255, 255, 255, 255]);
    }

    #[test]
    fn test_from_hex_rejects_garbage() {
        assert_eq!(
            Color::from_hex("#12345g"),
            Err(BackdropError::InvalidColor("#12345g".to_string()))
        );
        assert!(Color::from_hex("#1234").is_err());
        assert!(Color::from_hex("").is_err());
    }

    #[test]
    fn test_scaled_keeps_alpha() {
        let color = Color::rgba8(100, 100, 100, 0.5).scaled(1.15);
        assert!((color.r - 100.0 / 255.0 * 1.15).abs() < 1e-6);
        assert_eq!(color.a, 0.5);
    }

    #[test]
    fn test_to_rgba8_clamps_overbright() {
        let color = Color::WHITE.scaled(2.0);
        assert_eq!(color.to_rgba8(), [255, 255, 255, 255]);
    }
}
