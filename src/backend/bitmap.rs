use euclid::default::Box2D;
use euclid::point2;

use super::{Canvas, RunImage};

/// RGBA8 image of one rasterized text run.
///
/// Pixels are arranged in row-major order with the origin at the top-left.
/// Alpha is straight (not premultiplied).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunBitmap {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl RunBitmap {
    pub fn new(width: usize, height: usize) -> Self {
        let len = width.saturating_mul(height).saturating_mul(4);
        Self {
            width,
            height,
            pixels: vec![0; len],
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        let px = &self.pixels[idx..idx + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = (y * self.width + x) * 4;
        self.pixels[idx..idx + 4].copy_from_slice(&rgba);
    }
}

impl RunImage for RunBitmap {
    fn width(&self) -> u32 {
        self.width.min(u32::MAX as usize) as u32
    }

    fn height(&self) -> u32 {
        self.height.min(u32::MAX as usize) as u32
    }
}

/// RGBA8 render target that run images are blended onto.
pub struct Bitmap {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl Bitmap {
    /// Creates a fully transparent bitmap.
    pub fn new(width: usize, height: usize) -> Self {
        let len = width.saturating_mul(height).saturating_mul(4);
        Self {
            width,
            height,
            pixels: vec![0; len],
        }
    }

    pub fn fill(&mut self, rgba: [u8; 4]) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        let px = &self.pixels[idx..idx + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Source-over blend of one straight-alpha pixel.
    pub fn blend(&mut self, x: usize, y: usize, src: [u8; 4]) {
        if x >= self.width || y >= self.height || src[3] == 0 {
            return;
        }
        let idx = (y * self.width + x) * 4;
        let dst = &mut self.pixels[idx..idx + 4];

        if src[3] == 255 {
            dst.copy_from_slice(&src);
            return;
        }

        let sa = src[3] as f32 / 255.0;
        let da = dst[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            dst.copy_from_slice(&[0, 0, 0, 0]);
            return;
        }

        for c in 0..3 {
            let value = (src[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
            dst[c] = value.round().clamp(0.0, 255.0) as u8;
        }
        dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }
}

impl Canvas<RunBitmap> for Bitmap {
    fn blit(&mut self, image: &RunBitmap, x: i32, y: i32) {
        if image.width == 0 || image.height == 0 || self.width == 0 || self.height == 0 {
            return;
        }

        let target: Box2D<i64> = Box2D::new(
            point2(0, 0),
            point2(self.width as i64, self.height as i64),
        );
        let source: Box2D<i64> = Box2D::new(
            point2(x as i64, y as i64),
            point2(x as i64 + image.width as i64, y as i64 + image.height as i64),
        );
        let Some(visible) = source.intersection(&target) else {
            return;
        };

        for dy in visible.min.y..visible.max.y {
            let sy = (dy - y as i64) as usize;
            for dx in visible.min.x..visible.max.x {
                let sx = (dx - x as i64) as usize;
                let Some(src) = image.pixel(sx, sy) else {
                    continue;
                };
                self.blend(dx as usize, dy as usize, src);
            }
        }
    }
}
