//! RNG trait abstraction for randomized construction
//!
//! Paths, shapes and blob fields draw their randomness once at construction.
//! Taking the source as a parameter lets callers use:
//! - `rand::thread_rng()` or an entropy-seeded RNG (live backgrounds)
//! - a seeded `Xoshiro256StarStar` (reproducible captures and tests)

/// Random number generator used by the visual engine
pub trait VisualRng {
    /// Generate random f32 in [0.0, 1.0)
    fn gen_f32(&mut self) -> f32;

    /// Random value in [-0.5, 0.5), the centered jitter used for control points
    fn gen_centered(&mut self) -> f32 {
        self.gen_f32() - 0.5
    }

    /// Random value in [min, min + span)
    fn gen_span(&mut self, min: f32, span: f32) -> f32 {
        min + self.gen_f32() * span
    }
}

// Blanket implementation for any type implementing rand::Rng
impl<T: ?Sized + rand::Rng> VisualRng for T {
    fn gen_f32(&mut self) -> f32 {
        rand::Rng::gen(self)
    }
}
