//! Animated GIF output for offscreen captures

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use gif::{Encoder, Frame, Repeat};

use crate::render::PixelCanvas;

/// NeuQuant sampling factor: 1 is best quality, 30 fastest
const QUANTIZE_SPEED: i32 = 10;

/// Collects canvas frames and encodes them as a looping GIF
pub struct GifCapture {
    /// Collected frames (RGB data)
    frames: Vec<Vec<u8>>,
    width: u16,
    height: u16,
    /// Delay between frames in centiseconds
    frame_delay: u16,
}

impl GifCapture {
    /// `fps` is converted to a per-frame delay; 0 falls back to 10 fps.
    pub fn new(width: u16, height: u16, fps: u16) -> Self {
        let frame_delay = if fps > 0 { (100 / fps).max(1) } else { 10 };

        Self {
            frames: Vec::new(),
            width,
            height,
            frame_delay,
        }
    }

    /// Snapshot the canvas as it would appear over the black page
    pub fn capture_frame(&mut self, canvas: &PixelCanvas) -> Result<()> {
        if canvas.width() != self.width as usize || canvas.height() != self.height as usize {
            anyhow::bail!(
                "Canvas is {}x{}, capture expects {}x{}",
                canvas.width(),
                canvas.height(),
                self.width,
                self.height
            );
        }
        self.frames.push(canvas.get_rgb_buffer());
        Ok(())
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame_delay(&self) -> u16 {
        self.frame_delay
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Encode all captured frames as an infinitely looping GIF
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if self.frames.is_empty() {
            anyhow::bail!("No frames to save");
        }

        let file = File::create(path.as_ref()).context("Failed to create GIF file")?;
        let mut encoder = Encoder::new(file, self.width, self.height, &[])
            .context("Failed to create GIF encoder")?;
        encoder
            .set_repeat(Repeat::Infinite)
            .context("Failed to set GIF repeat")?;

        for rgb in &self.frames {
            let mut frame = Frame::from_rgb_speed(self.width, self.height, rgb, QUANTIZE_SPEED);
            frame.delay = self.frame_delay;
            encoder
                .write_frame(&frame)
                .context("Failed to write GIF frame")?;
        }

        log::info!(
            "Saved {} frames to {}",
            self.frames.len(),
            path.as_ref().display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gif_capture_creation() {
        let capture = GifCapture::new(128, 72, 25);
        assert_eq!(capture.frame_delay(), 4);
        assert_eq!(capture.frame_count(), 0);
        assert_eq!(GifCapture::new(8, 8, 0).frame_delay(), 10);
        assert_eq!(GifCapture::new(8, 8, 500).frame_delay(), 1);
    }

    #[test]
    fn test_frame_capture() {
        let mut capture = GifCapture::new(16, 9, 10);
        let canvas = PixelCanvas::new(16, 9);

        capture.capture_frame(&canvas).unwrap();
        capture.capture_frame(&canvas).unwrap();
        assert_eq!(capture.frame_count(), 2);

        capture.clear();
        assert_eq!(capture.frame_count(), 0);
    }

    #[test]
    fn test_mismatched_canvas_is_rejected() {
        let mut capture = GifCapture::new(16, 9, 10);
        assert!(capture.capture_frame(&PixelCanvas::new(9, 16)).is_err());
    }

    #[test]
    fn test_empty_capture_save_fails() {
        let dir = tempfile::tempdir().unwrap();
        let capture = GifCapture::new(16, 9, 10);
        let err = capture.save(dir.path().join("empty.gif")).unwrap_err();
        assert!(err.to_string().contains("No frames"));
    }

    #[test]
    fn test_save_writes_gif_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.gif");

        let mut capture = GifCapture::new(16, 9, 10);
        capture.capture_frame(&PixelCanvas::new(16, 9)).unwrap();
        capture.save(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..6], b"GIF89a");
    }
}
