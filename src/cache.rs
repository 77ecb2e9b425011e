pub mod config;
pub mod font_cache;
pub mod glyph_run;
pub mod run_list;

pub use config::{CleanPolicy, CleanTier, FontCacheConfig};
pub use font_cache::FontCache;
pub use glyph_run::{GlyphRun, RunCounters};
pub use run_list::{GlyphRunCache, RunId};
