use std::path::PathBuf;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::{
    backend::{Canvas, FontdueBackend, RunBitmap},
    cache::{FontCache, FontCacheConfig},
    color::Color,
    error::FontError,
    font_storage::{FontRequest, FontStorage},
};

/// High-level entry point: font storage plus one text run cache.
///
/// Use `Mutex` to allow shared mutable access, which is common in UI frameworks.
///
/// The fields are public to allow direct access to the underlying storage and cache when necessary
/// (e.g. to inspect shards or to draw several strings under one lock).
pub struct FontSystem {
    /// The underlying font storage.
    pub font_storage: Mutex<FontStorage>,
    /// The text run cache, present once [`FontSystem::font_init`] succeeded.
    pub font_cache: Mutex<Option<Box<FontCache<FontdueBackend>>>>,
}

impl Default for FontSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FontSystem {
    /// Creates a font system with empty storage and no cache.
    pub fn new() -> Self {
        Self {
            font_storage: Mutex::new(FontStorage::new()),
            font_cache: Mutex::new(None),
        }
    }
}

/// font storage initialization
impl FontSystem {
    /// Loads the system fonts into the storage.
    pub fn load_system_fonts(&self) {
        self.font_storage.lock().load_system_fonts();
    }

    /// Loads a font from binary data.
    pub fn load_font_binary(&self, data: impl Into<Vec<u8>>) {
        self.font_storage.lock().load_font_binary(data);
    }

    /// Loads a font from a file path.
    pub fn load_font_file(&self, path: PathBuf) -> Result<(), FontError> {
        self.font_storage.lock().load_font_file(path)
    }

    /// Loads all fonts from a directory.
    pub fn load_fonts_dir(&self, dir: PathBuf) {
        self.font_storage.lock().load_fonts_dir(dir)
    }

    /// Checks if the storage is empty.
    pub fn is_empty(&self) -> bool {
        self.font_storage.lock().is_empty()
    }

    /// Returns the number of registered faces.
    pub fn len(&self) -> usize {
        self.font_storage.lock().len()
    }
}

/// font cache
impl FontSystem {
    /// Loads the requested font and creates a fresh cache for it.
    ///
    /// This will replace any existing cache. On error the previous cache is kept.
    pub fn font_init(
        &self,
        request: &FontRequest,
        config: FontCacheConfig,
    ) -> Result<(), FontError> {
        let backend = self.font_storage.lock().load_backend(request)?;

        // ensures first drop previous runs to avoid unnecessary memory usage.
        *self.font_cache.lock() = None;

        *self.font_cache.lock() = Some(Box::new(FontCache::with_config(backend, config)));
        Ok(())
    }

    /// Switches the cache to another font or size, dropping every cached run.
    ///
    /// Creates a cache with the default configuration when called before
    /// [`Self::font_init`].
    pub fn load_font(&self, request: &FontRequest) -> Result<(), FontError> {
        let backend = self.font_storage.lock().load_backend(request)?;

        let mut font_cache = self.font_cache.lock();
        if let Some(cache) = &mut *font_cache {
            cache.replace_backend(backend);
        } else {
            log::warn!("Font loaded before font cache initialized, using default config.");
            *font_cache = Some(Box::new(FontCache::new(backend)));
        }
        Ok(())
    }

    /// Draws `text` at `(x, y)` through the cache.
    pub fn draw_string(
        &self,
        target: &mut impl Canvas<RunBitmap>,
        text: &str,
        fg: Color,
        outline: Color,
        x: i32,
        y: i32,
    ) {
        if let Some(cache) = &mut *self.font_cache.lock() {
            cache.draw_string(target, text, fg, outline, x, y);
        } else {
            log::warn!("Draw called before font cache initialized.");
        }
    }

    /// Advance width of `text` in pixels, 0 before initialization.
    pub fn width(&self, text: &str) -> u32 {
        if let Some(cache) = &*self.font_cache.lock() {
            cache.width(text)
        } else {
            log::warn!("Width called before font cache initialized.");
            0
        }
    }

    /// Line height in pixels, 0 before initialization.
    pub fn height(&self) -> u32 {
        if let Some(cache) = &*self.font_cache.lock() {
            cache.height()
        } else {
            log::warn!("Height called before font cache initialized.");
            0
        }
    }

    /// Periodic cache cleanup, see [`FontCache::slow_logic`].
    pub fn slow_logic(&self, now: Instant, jitter: Duration) -> bool {
        if let Some(cache) = &mut *self.font_cache.lock() {
            cache.slow_logic(now, jitter)
        } else {
            false
        }
    }

    /// Drops every cached run.
    pub fn clear(&self) {
        if let Some(cache) = &mut *self.font_cache.lock() {
            cache.clear();
        } else {
            log::warn!("Cache clear called before font cache initialized.");
        }
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Bitmap;

    #[test]
    fn test_calls_before_init_are_noops() {
        let system = FontSystem::new();
        let mut target = Bitmap::new(8, 8);

        system.draw_string(&mut target, "text", Color::WHITE, Color::BLACK, 0, 0);
        system.clear();

        assert_eq!(system.width("text"), 0);
        assert_eq!(system.height(), 0);
        assert!(!system.slow_logic(Instant::now(), Duration::ZERO));
        assert!(system.font_cache.lock().is_none());
    }

    #[test]
    fn test_init_without_fonts_fails() {
        let system = FontSystem::new();
        assert!(system.is_empty());

        let result = system.font_init(&FontRequest::default(), FontCacheConfig::default());

        assert!(matches!(result, Err(FontError::NotFound { .. })));
        assert!(system.font_cache.lock().is_none());
        assert!(system.load_font(&FontRequest::default()).is_err());
    }
}
