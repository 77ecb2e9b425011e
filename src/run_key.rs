use std::cmp::Ordering;

use crate::color::Color;

/// Identifies one cached text run: the text plus the colors it was drawn with.
///
/// Keys are ordered by text, then by the foreground `r`, `g`, `b`, then by the
/// outline `r`, `g`, `b`, then by the foreground alpha. Outside soft mode the
/// alpha is stored as 255, so two keys that differ only in alpha are the same
/// key.
#[derive(Clone, Debug)]
pub struct GlyphRunKey {
    text: String,
    fg: Color,
    outline: Color,
    soft_mode: bool,
}

impl GlyphRunKey {
    pub fn new(text: impl Into<String>, fg: Color, outline: Color) -> Self {
        Self::with_soft_mode(text, fg, outline, false)
    }

    pub fn with_soft_mode(
        text: impl Into<String>,
        fg: Color,
        outline: Color,
        soft_mode: bool,
    ) -> Self {
        let fg = if soft_mode { fg } else { fg.with_alpha(u8::MAX) };
        Self {
            text: text.into(),
            fg,
            outline,
            soft_mode,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn fg(&self) -> Color {
        self.fg
    }

    pub fn outline(&self) -> Color {
        self.outline
    }

    pub fn soft_mode(&self) -> bool {
        self.soft_mode
    }
}

impl Ord for GlyphRunKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.text
            .cmp(&other.text)
            .then(self.fg.r.cmp(&other.fg.r))
            .then(self.fg.g.cmp(&other.fg.g))
            .then(self.fg.b.cmp(&other.fg.b))
            .then(self.outline.r.cmp(&other.outline.r))
            .then(self.outline.g.cmp(&other.outline.g))
            .then(self.outline.b.cmp(&other.outline.b))
            .then(self.fg.a.cmp(&other.fg.a))
    }
}

impl PartialOrd for GlyphRunKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Equality follows the ordering so map lookups and `==` never disagree.
impl PartialEq for GlyphRunKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GlyphRunKey {}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(text: &str, fg: (u8, u8, u8), outline: (u8, u8, u8)) -> GlyphRunKey {
        GlyphRunKey::new(
            text,
            Color::rgb(fg.0, fg.1, fg.2),
            Color::rgb(outline.0, outline.1, outline.2),
        )
    }

    #[test]
    fn test_equal_keys() {
        let item1 = key("test line1", (1, 2, 3), (1, 2, 3));
        let item2 = key("test line1", (1, 2, 3), (1, 2, 3));
        assert!(!(item1 < item2));
        assert!(!(item2 < item1));
        assert_eq!(item1, item2);
    }

    #[test]
    fn test_text_orders_first() {
        let item1 = key("test line1", (9, 9, 9), (9, 9, 9));
        let item2 = key("test line2", (1, 2, 3), (1, 2, 3));
        assert!(item1 < item2);
        assert!(!(item2 < item1));
    }

    #[test]
    fn test_fg_components_in_order() {
        let base = key("test line1", (1, 2, 3), (1, 2, 3));
        assert!(base < key("test line1", (2, 3, 4), (1, 2, 3)));
        assert!(base < key("test line1", (1, 3, 4), (1, 2, 3)));
        assert!(base < key("test line1", (1, 2, 4), (1, 2, 3)));
        // red outranks green and blue
        assert!(key("test line1", (2, 0, 0), (1, 2, 3)) > key("test line1", (1, 9, 9), (1, 2, 3)));
    }

    #[test]
    fn test_outline_components_after_fg() {
        let base = key("test line1", (1, 2, 3), (1, 2, 3));
        assert!(base < key("test line1", (1, 2, 3), (2, 2, 3)));
        assert!(base < key("test line1", (1, 2, 3), (1, 3, 3)));
        assert!(base < key("test line1", (1, 2, 3), (1, 2, 4)));
        // any fg difference outranks the outline
        assert!(key("test line1", (1, 2, 4), (0, 0, 0)) > key("test line1", (1, 2, 3), (9, 9, 9)));
    }

    #[test]
    fn test_alpha_ignored_without_soft_mode() {
        let opaque = GlyphRunKey::new("text", Color::rgba(1, 2, 3, 255), Color::BLACK);
        let faded = GlyphRunKey::new("text", Color::rgba(1, 2, 3, 10), Color::BLACK);
        assert_eq!(opaque.cmp(&faded), Ordering::Equal);
        assert_eq!(opaque, faded);
    }

    #[test]
    fn test_alpha_orders_last_in_soft_mode() {
        let opaque =
            GlyphRunKey::with_soft_mode("text", Color::rgba(1, 2, 3, 255), Color::BLACK, true);
        let faded =
            GlyphRunKey::with_soft_mode("text", Color::rgba(1, 2, 3, 10), Color::BLACK, true);
        assert!(faded < opaque);
        assert_ne!(opaque, faded);

        // rgb still decides before alpha
        let brighter =
            GlyphRunKey::with_soft_mode("text", Color::rgba(1, 2, 4, 0), Color::BLACK, true);
        assert!(opaque < brighter);
    }

    #[test]
    fn test_alpha_normalized_without_soft_mode() {
        let faded = GlyphRunKey::new("text", Color::rgba(1, 2, 3, 10), Color::BLACK);
        assert_eq!(faded.fg(), Color::rgb(1, 2, 3));

        let soft =
            GlyphRunKey::with_soft_mode("text", Color::rgba(1, 2, 3, 10), Color::BLACK, true);
        assert_eq!(soft.fg().a, 10);
    }

    #[test]
    fn test_mixed_soft_mode_order_is_transitive() {
        let x = GlyphRunKey::new("text", Color::rgba(1, 2, 3, 10), Color::BLACK);
        let y = GlyphRunKey::new("text", Color::rgba(1, 2, 3, 200), Color::BLACK);
        let z =
            GlyphRunKey::with_soft_mode("text", Color::rgba(1, 2, 3, 100), Color::BLACK, true);

        assert_eq!(x.cmp(&y), Ordering::Equal);
        assert_eq!(x.cmp(&z), y.cmp(&z));
        assert_eq!(z.cmp(&x), z.cmp(&y));
        assert_eq!(x.cmp(&z).reverse(), z.cmp(&x));
    }

    #[test]
    fn test_mixed_soft_mode_keys_in_map() {
        let mut map = std::collections::BTreeMap::new();
        for (alpha, soft) in [(10, false), (100, true), (200, false), (255, true), (50, true)] {
            let fg = Color::rgba(1, 2, 3, alpha);
            let key = GlyphRunKey::with_soft_mode("text", fg, Color::BLACK, soft);
            map.insert(key, alpha);
        }

        // both plain keys collapse onto the opaque soft key
        assert_eq!(map.len(), 3);
        let plain = GlyphRunKey::new("text", Color::rgba(1, 2, 3, 77), Color::BLACK);
        assert_eq!(map.get(&plain), Some(&255));
        let soft =
            GlyphRunKey::with_soft_mode("text", Color::rgba(1, 2, 3, 100), Color::BLACK, true);
        assert_eq!(map.get(&soft), Some(&100));

        let keys: Vec<_> = map.keys().collect();
        assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
