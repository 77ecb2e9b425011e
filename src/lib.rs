//! # Fude
//!
//! A sharded LRU cache of rasterized text runs for immediate-mode text drawing.
//!
//! ## Overview
//!
//! Game and tool UIs redraw the same strings every frame. `Fude` rasterizes each
//! `(text, foreground, outline)` combination once and keeps the image in one of
//! many small LRU lists selected by a hash of the text. The core is the
//! [`FontCache`], which draws through a [`backend::FontBackend`] onto any
//! [`backend::Canvas`]. [`FontSystem`] bundles it with font loading for
//! applications that share one text renderer.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::{Duration, Instant};
//!
//! use fude::{backend::Bitmap, Color, FontCacheConfig, FontRequest, FontSystem};
//!
//! // 1. Create a FontSystem and register fonts
//! let font_system = FontSystem::new();
//! font_system.load_system_fonts();
//!
//! // 2. Pick a font and create the cache
//! let request = FontRequest::new("sans-serif", 16.0);
//! font_system.font_init(&request, FontCacheConfig::default()).unwrap();
//!
//! // 3. Draw every frame; repeated strings come from the cache
//! let mut target = Bitmap::new(320, 64);
//! font_system.draw_string(&mut target, "Hello", Color::WHITE, Color::BLACK, 4, 4);
//!
//! // 4. Let the cache trim itself once in a while
//! font_system.slow_logic(Instant::now(), Duration::ZERO);
//! ```
//!
//! ## Features
//!
//! *   **Sharded LRU**: Lookups, promotion and eviction touch one short list.
//! *   **Pluggable Backend**: Any rasterizer implementing [`backend::FontBackend`] can be cached.
//! *   **Periodic Cleanup**: Shards are trimmed on a timer according to a [`cache::CleanPolicy`].
//! *   **Thread Safety**: [`FontSystem`] guards storage and cache with internal locking.

pub mod backend;
pub mod cache;
pub mod color;
pub mod error;
pub mod font_storage;
pub mod font_system;
pub mod run_key;

// common re-exports
pub use cache::{FontCache, FontCacheConfig, GlyphRun, GlyphRunCache};
pub use color::Color;
pub use error::FontError;
pub use font_storage::{FontRequest, FontStorage, FontStyle};
pub use font_system::FontSystem;
pub use run_key::GlyphRunKey;

// re-export dependencies
pub use fontdb;
pub use fontdue;
pub use parking_lot;
