//! Capabilities the run cache needs from the outside world.
//!
//! A [`FontBackend`] turns a string into an image, a [`Canvas`] draws that
//! image somewhere. The software implementations in this module rasterize
//! with `fontdue` into RGBA bitmaps.

pub mod bitmap;
pub mod fontdue_backend;

pub use bitmap::{Bitmap, RunBitmap};
pub use fontdue_backend::{FontdueBackend, MIN_FONT_SIZE};

use crate::color::Color;

/// Image produced for one text run.
pub trait RunImage {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// Rasterizes and measures text for one loaded font at one size.
pub trait FontBackend {
    type Image: RunImage;

    /// Renders `text` in `fg`, outlined in `outline`, with `alpha` applied to
    /// the whole run.
    ///
    /// Returns `None` when no image can be produced. Callers treat this as
    /// "draw nothing" and never as an error.
    fn rasterize(&self, text: &str, fg: Color, outline: Color, alpha: f32) -> Option<Self::Image>;

    /// Horizontal advance of `text` in pixels.
    fn measure_width(&self, text: &str) -> u32;

    /// Line height in pixels.
    fn measure_height(&self) -> u32;
}

/// Draw target for cached run images.
pub trait Canvas<I> {
    /// Draws `image` with its top-left corner at `(x, y)`. Parts outside the
    /// target are clipped.
    fn blit(&mut self, image: &I, x: i32, y: i32);
}
