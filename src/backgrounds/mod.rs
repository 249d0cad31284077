//! Mountable backgrounds: each owns its state, its scheduler registrations
//! and a fade-in wrapper, and draws into a weakly held canvas.

mod backdrop;
mod blob_background;

pub use backdrop::{Backdrop, BACKDROP_FADE_SECS};
pub use blob_background::{BlobBackground, BLOB_FADE_SECS};
