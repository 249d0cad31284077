//! Single-frame PNG output

use std::path::Path;

use anyhow::{Context, Result};
use image::RgbImage;

use crate::render::PixelCanvas;

/// Save the canvas, composited over black, as a PNG
pub fn save_png<P: AsRef<Path>>(canvas: &PixelCanvas, path: P) -> Result<()> {
    let path = path.as_ref();
    let img = RgbImage::from_raw(
        canvas.width() as u32,
        canvas.height() as u32,
        canvas.get_rgb_buffer(),
    )
    .context("Failed to create image from canvas")?;

    img.save(path)
        .with_context(|| format!("Failed to save snapshot to {}", path.display()))?;
    log::info!("Saved snapshot to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use exp3_backdrop_core::Color;

    #[test]
    fn test_snapshot_round_trips_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");

        let mut canvas = PixelCanvas::new(4, 3);
        canvas.fill_rows(|_| Color::rgb8(200, 100, 50));
        save_png(&canvas, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (4, 3));
        assert_eq!(img.get_pixel(2, 1).0, [200, 100, 50]);
    }
}
