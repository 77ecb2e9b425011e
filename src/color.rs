/// 8-bit RGBA color.
///
/// The default color is opaque black.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    /// Opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Returns the same color with its alpha channel replaced.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Compares the color channels only.
    pub const fn same_rgb(&self, other: &Color) -> bool {
        self.r == other.r && self.g == other.g && self.b == other.b
    }

    /// Alpha channel normalized to `0.0..=1.0`.
    pub fn alpha_f32(&self) -> f32 {
        self.a as f32 / 255.0
    }
}

impl From<[u8; 4]> for Color {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Color> for [u8; 4] {
    fn from(color: Color) -> Self {
        [color.r, color.g, color.b, color.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_opaque_black() {
        assert_eq!(Color::default(), Color::rgba(0, 0, 0, 255));
    }

    #[test]
    fn test_same_rgb_ignores_alpha() {
        let a = Color::rgba(10, 20, 30, 255);
        let b = a.with_alpha(0);
        assert!(a.same_rgb(&b));
        assert_ne!(a, b);
        assert!(!a.same_rgb(&Color::rgb(10, 20, 31)));
    }

    #[test]
    fn test_alpha_f32() {
        assert_eq!(Color::rgba(0, 0, 0, 255).alpha_f32(), 1.0);
        assert_eq!(Color::rgba(0, 0, 0, 0).alpha_f32(), 0.0);
    }
}
