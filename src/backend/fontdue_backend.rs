use std::sync::Arc;

use euclid::default::Box2D;
use euclid::point2;

use crate::color::Color;

use super::{FontBackend, RunBitmap};

/// Smallest pixel size a font is loaded at. Smaller requests are clamped.
pub const MIN_FONT_SIZE: f32 = 4.0;

/// Outline thickness in pixels.
const OUTLINE_SIZE: usize = 1;

/// Software backend that lays a string out on one line and rasterizes it with
/// `fontdue`.
///
/// The outline is only drawn when its color differs from the foreground.
#[derive(Clone)]
pub struct FontdueBackend {
    font: Arc<fontdue::Font>,
    px: f32,
}

impl FontdueBackend {
    pub fn new(font: Arc<fontdue::Font>, px: f32) -> Self {
        let px = if px.is_nan() || px < MIN_FONT_SIZE {
            log::warn!(
                "Requested font size {} is below the minimum, using {}",
                px,
                MIN_FONT_SIZE
            );
            MIN_FONT_SIZE
        } else {
            px
        };

        Self { font, px }
    }

    pub fn font(&self) -> &Arc<fontdue::Font> {
        &self.font
    }

    pub fn px(&self) -> f32 {
        self.px
    }

    /// `(ascent, line height)` in pixels.
    fn line_metrics(&self) -> (f32, f32) {
        match self.font.horizontal_line_metrics(self.px) {
            Some(metrics) => (metrics.ascent, metrics.new_line_size),
            None => (self.px, self.px),
        }
    }

    fn advance(&self, text: &str) -> f32 {
        let mut pen = 0.0;
        let mut prev: Option<char> = None;
        for c in text.chars() {
            if let Some(prev) = prev {
                pen += self.font.horizontal_kern(prev, c, self.px).unwrap_or(0.0);
            }
            pen += self.font.metrics(c, self.px).advance_width;
            prev = Some(c);
        }
        pen
    }

    fn rasterize_coverage(&self, text: &str) -> Option<Coverage> {
        let (ascent, line_height) = self.line_metrics();
        let baseline = ascent.ceil() as i32;

        let mut glyphs = Vec::with_capacity(text.len());
        let mut pen = 0.0;
        let mut prev: Option<char> = None;
        for c in text.chars() {
            if let Some(prev) = prev {
                pen += self.font.horizontal_kern(prev, c, self.px).unwrap_or(0.0);
            }
            let (metrics, data) = self.font.rasterize(c, self.px);
            glyphs.push(PlacedGlyph {
                x: (pen + metrics.xmin as f32).round() as i32,
                y: baseline - (metrics.ymin + metrics.height as i32),
                width: metrics.width,
                height: metrics.height,
                data,
            });

            pen += metrics.advance_width;
            prev = Some(c);
        }

        let advance = pen.ceil().max(0.0) as i32;
        let line_height = line_height.ceil().max(0.0) as i32;
        if advance == 0 || line_height == 0 {
            return None;
        }

        Some(stamp_glyphs(&glyphs, advance, line_height))
    }
}

/// Glyph coverage placed relative to the pen origin at the top of the line.
struct PlacedGlyph {
    x: i32,
    y: i32,
    width: usize,
    height: usize,
    data: Vec<u8>,
}

/// Box covering the advance, the line and every glyph's ink. Ink may reach
/// left of the origin or past the advance.
fn run_bounds(glyphs: &[PlacedGlyph], advance: i32, line_height: i32) -> Box2D<i32> {
    let line = Box2D::new(point2(0, 0), point2(advance, line_height));
    glyphs.iter().fold(line, |bounds, glyph| {
        let ink = Box2D::new(
            point2(glyph.x, glyph.y),
            point2(glyph.x + glyph.width as i32, glyph.y + glyph.height as i32),
        );
        if ink.is_empty() {
            bounds
        } else {
            bounds.union(&ink)
        }
    })
}

/// Draws all glyphs into one mask sized by [`run_bounds`]. The mask's top-left
/// corner is the top-left corner of the bounds.
fn stamp_glyphs(glyphs: &[PlacedGlyph], advance: i32, line_height: i32) -> Coverage {
    let bounds = run_bounds(glyphs, advance, line_height);
    let size = bounds.size();
    let mut coverage = Coverage::new(size.width.max(0) as usize, size.height.max(0) as usize);

    for glyph in glyphs {
        let origin_x = (glyph.x - bounds.min.x) as usize;
        let origin_y = (glyph.y - bounds.min.y) as usize;
        for row in 0..glyph.height {
            for col in 0..glyph.width {
                let value = glyph.data[row * glyph.width + col];
                if value != 0 {
                    coverage.accumulate(origin_x + col, origin_y + row, value);
                }
            }
        }
    }

    coverage
}

impl FontBackend for FontdueBackend {
    type Image = RunBitmap;

    fn rasterize(&self, text: &str, fg: Color, outline: Color, alpha: f32) -> Option<RunBitmap> {
        if text.is_empty() {
            return None;
        }

        let coverage = self.rasterize_coverage(text)?;
        let outline = (!fg.same_rgb(&outline)).then_some(outline);
        Some(compose_run(&coverage, fg, outline, alpha))
    }

    fn measure_width(&self, text: &str) -> u32 {
        self.advance(text).ceil().max(0.0) as u32
    }

    fn measure_height(&self) -> u32 {
        self.line_metrics().1.ceil().max(0.0) as u32
    }
}

/// Single channel coverage mask.
#[derive(Clone, Debug, PartialEq)]
struct Coverage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Coverage {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width.saturating_mul(height)],
        }
    }

    fn get(&self, x: usize, y: usize) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.data[y * self.width + x]
    }

    /// Adds coverage, saturating at 255. Out-of-bounds writes are dropped.
    fn accumulate(&mut self, x: usize, y: usize, value: u8) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = y * self.width + x;
        self.data[idx] = self.data[idx].saturating_add(value);
    }

    /// Grows the mask by `radius` on every side, each pixel taking the
    /// maximum coverage found within `radius` of it.
    fn dilate(&self, radius: usize) -> Coverage {
        let mut out = Coverage::new(self.width + radius * 2, self.height + radius * 2);
        for y in 0..self.height {
            for x in 0..self.width {
                let value = self.get(x, y);
                if value == 0 {
                    continue;
                }
                // (x, y) sits at (x + radius, y + radius) in `out`
                for oy in y..=y + radius * 2 {
                    for ox in x..=x + radius * 2 {
                        let idx = oy * out.width + ox;
                        out.data[idx] = out.data[idx].max(value);
                    }
                }
            }
        }
        out
    }
}

/// Colors a coverage mask, optionally putting an outline behind it, and
/// multiplies the result by `alpha`.
fn compose_run(coverage: &Coverage, fg: Color, outline: Option<Color>, alpha: f32) -> RunBitmap {
    let alpha = alpha.clamp(0.0, 1.0);

    let Some(outline) = outline else {
        let mut image = RunBitmap::new(coverage.width, coverage.height);
        for y in 0..coverage.height {
            for x in 0..coverage.width {
                let a = coverage.get(x, y) as f32 / 255.0 * alpha;
                image.set_pixel(x, y, [fg.r, fg.g, fg.b, to_u8(a)]);
            }
        }
        return image;
    };

    let border = coverage.dilate(OUTLINE_SIZE);
    let mut image = RunBitmap::new(border.width, border.height);
    let outline_alpha = outline.alpha_f32();

    for y in 0..border.height {
        for x in 0..border.width {
            let text_a = if x >= OUTLINE_SIZE && y >= OUTLINE_SIZE {
                coverage.get(x - OUTLINE_SIZE, y - OUTLINE_SIZE) as f32 / 255.0
            } else {
                0.0
            };
            let border_a = border.get(x, y) as f32 / 255.0 * outline_alpha;

            let out_a = text_a + border_a * (1.0 - text_a);
            if out_a <= 0.0 {
                continue;
            }

            let mix = |text: u8, border: u8| {
                (text as f32 * text_a + border as f32 * border_a * (1.0 - text_a)) / out_a
            };
            image.set_pixel(
                x,
                y,
                [
                    to_u8(mix(fg.r, outline.r) / 255.0),
                    to_u8(mix(fg.g, outline.g) / 255.0),
                    to_u8(mix(fg.b, outline.b) / 255.0),
                    to_u8(out_a * alpha),
                ],
            );
        }
    }

    image
}

fn to_u8(unit: f32) -> u8 {
    (unit * 255.0).round().clamp(0.0, 255.0) as u8
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn mask(width: usize, height: usize, set: &[(usize, usize, u8)]) -> Coverage {
        let mut coverage = Coverage::new(width, height);
        for &(x, y, v) in set {
            coverage.accumulate(x, y, v);
        }
        coverage
    }

    #[test]
    fn test_accumulate_saturates_and_clips() {
        let mut coverage = Coverage::new(2, 2);
        coverage.accumulate(0, 0, 200);
        coverage.accumulate(0, 0, 200);
        coverage.accumulate(5, 5, 200);
        assert_eq!(coverage.get(0, 0), 255);
        assert_eq!(coverage.data.iter().filter(|v| **v != 0).count(), 1);
    }

    #[test]
    fn test_dilate_grows_single_pixel() {
        let coverage = mask(1, 1, &[(0, 0, 100)]);
        let border = coverage.dilate(1);
        assert_eq!((border.width, border.height), (3, 3));
        assert!(border.data.iter().all(|v| *v == 100));
    }

    #[test]
    fn test_dilate_keeps_maximum() {
        let coverage = mask(3, 1, &[(0, 0, 50), (2, 0, 200)]);
        let border = coverage.dilate(1);
        assert_eq!((border.width, border.height), (5, 3));
        // center column is reached by both pixels
        assert_eq!(border.get(2, 1), 200);
        assert_eq!(border.get(0, 1), 50);
        assert_eq!(border.get(4, 1), 200);
    }

    #[test]
    fn test_compose_without_outline_uses_fg_and_alpha() {
        let coverage = mask(2, 1, &[(0, 0, 255)]);
        let image = compose_run(&coverage, Color::rgb(10, 20, 30), None, 0.5);

        assert_eq!((image.width, image.height), (2, 1));
        assert_eq!(image.pixel(0, 0).unwrap(), [10, 20, 30, 128]);
        assert_eq!(image.pixel(1, 0).unwrap()[3], 0);
    }

    #[test]
    fn test_compose_with_outline_surrounds_text() {
        let coverage = mask(1, 1, &[(0, 0, 255)]);
        let image = compose_run(
            &coverage,
            Color::rgb(255, 255, 255),
            Some(Color::rgb(0, 0, 0)),
            1.0,
        );

        assert_eq!((image.width, image.height), (3, 3));
        // text in the middle, outline around it
        assert_eq!(image.pixel(1, 1).unwrap(), [255, 255, 255, 255]);
        assert_eq!(image.pixel(0, 0).unwrap(), [0, 0, 0, 255]);
        assert_eq!(image.pixel(2, 1).unwrap(), [0, 0, 0, 255]);
    }

    #[test]
    fn test_compose_transparent_outline_leaves_border_empty() {
        let coverage = mask(1, 1, &[(0, 0, 255)]);
        let image = compose_run(
            &coverage,
            Color::rgb(255, 0, 0),
            Some(Color::TRANSPARENT),
            1.0,
        );
        assert_eq!(image.pixel(0, 0).unwrap()[3], 0);
        assert_eq!(image.pixel(1, 1).unwrap(), [255, 0, 0, 255]);
    }

    fn glyph(x: i32, y: i32, width: usize, height: usize) -> PlacedGlyph {
        PlacedGlyph {
            x,
            y,
            width,
            height,
            data: vec![255; width * height],
        }
    }

    #[test]
    fn test_bounds_cover_left_bearing_and_overhang() {
        // a slanted glyph starting left of the origin and ending past the advance
        let glyphs = [glyph(-3, 2, 22, 30)];
        let bounds = run_bounds(&glyphs, 14, 40);

        assert_eq!((bounds.min.x, bounds.max.x), (-3, 19));
        assert_eq!((bounds.min.y, bounds.max.y), (0, 40));
    }

    #[test]
    fn test_bounds_grow_above_and_below_line() {
        let glyphs = [glyph(0, -2, 4, 4), glyph(4, 8, 4, 5), glyph(9, 0, 0, 0)];
        let bounds = run_bounds(&glyphs, 10, 10);

        assert_eq!((bounds.min.x, bounds.max.x), (0, 10));
        assert_eq!((bounds.min.y, bounds.max.y), (-2, 13));
    }

    #[test]
    fn test_stamp_keeps_every_ink_column() {
        let glyphs = [glyph(-3, 0, 22, 2)];
        let coverage = stamp_glyphs(&glyphs, 14, 2);

        assert_eq!((coverage.width, coverage.height), (22, 2));
        assert!(coverage.data.iter().all(|v| *v == 255));
    }

    #[test]
    fn test_stamp_offsets_glyphs_into_bounds() {
        let glyphs = [glyph(-1, 0, 1, 1), glyph(2, -1, 1, 1)];
        let coverage = stamp_glyphs(&glyphs, 3, 2);

        assert_eq!((coverage.width, coverage.height), (4, 3));
        assert_eq!(coverage.get(0, 1), 255);
        assert_eq!(coverage.get(3, 0), 255);
        assert_eq!(coverage.data.iter().filter(|v| **v != 0).count(), 2);
    }

    fn system_backend() -> Option<FontdueBackend> {
        let mut storage = crate::font_storage::FontStorage::new();
        storage.load_system_fonts();
        storage
            .load_backend(&crate::font_storage::FontRequest::new("sans-serif", 24.0))
            .ok()
    }

    #[test]
    fn test_system_font_measures_and_rasterizes() {
        let Some(backend) = system_backend() else {
            // no system font installed
            return;
        };

        assert_eq!(backend.measure_width(""), 0);
        assert!(backend.measure_height() > 0);
        let width_a = backend.measure_width("A");
        let width_v = backend.measure_width("V");
        assert!(width_a > 0);
        assert!(backend.measure_width("AV") <= width_a + width_v);
        assert!(backend.measure_width("AAAA") > width_a);

        assert!(backend.rasterize("", Color::WHITE, Color::BLACK, 1.0).is_none());

        let plain = backend
            .rasterize("Hello", Color::WHITE, Color::WHITE, 1.0)
            .unwrap();
        assert!(plain.width >= backend.measure_width("Hello") as usize);
        assert!(plain.height >= backend.measure_height() as usize);
        assert!(plain.pixels.chunks_exact(4).any(|px| px[3] > 200));

        let outlined = backend
            .rasterize("Hello", Color::WHITE, Color::BLACK, 1.0)
            .unwrap();
        assert_eq!(outlined.width, plain.width + 2 * OUTLINE_SIZE);
        assert_eq!(outlined.height, plain.height + 2 * OUTLINE_SIZE);

        let faded = backend
            .rasterize("Hello", Color::WHITE, Color::WHITE, 0.5)
            .unwrap();
        assert!(faded.pixels.chunks_exact(4).all(|px| px[3] <= 128));
    }

    #[test]
    fn test_small_size_is_clamped() {
        let Some(backend) = system_backend() else {
            return;
        };
        let small = FontdueBackend::new(Arc::clone(backend.font()), 1.0);
        assert_eq!(small.px(), MIN_FONT_SIZE);
    }
}
