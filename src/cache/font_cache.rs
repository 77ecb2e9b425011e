use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::backend::{Canvas, FontBackend, RunImage};
use crate::color::Color;
use crate::run_key::GlyphRunKey;

use super::config::FontCacheConfig;
use super::glyph_run::{GlyphRun, RunCounters};
use super::run_list::GlyphRunCache;

/// Sharded cache of rasterized text runs on top of one [`FontBackend`].
///
/// Each text is assigned to a shard by hash, so lookups and evictions only
/// ever touch one short list. Every shard is an independent LRU bounded by
/// [`FontCacheConfig::max_shard_size`], and [`FontCache::slow_logic`] trims
/// all shards once per [`FontCacheConfig::clean_interval`].
pub struct FontCache<B: FontBackend> {
    backend: B,
    config: FontCacheConfig,
    shards: Box<[GlyphRunCache<B::Image>]>,
    counters: Arc<RunCounters>,
    clean_deadline: Option<Instant>,
}

impl<B: FontBackend> FontCache<B> {
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, FontCacheConfig::default())
    }

    pub fn with_config(backend: B, config: FontCacheConfig) -> Self {
        let shards = (0..config.shard_count.get())
            .map(|_| GlyphRunCache::new())
            .collect();

        Self {
            backend,
            config,
            shards,
            counters: RunCounters::new(),
            clean_deadline: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &FontCacheConfig {
        &self.config
    }

    pub fn shards(&self) -> &[GlyphRunCache<B::Image>] {
        &self.shards
    }

    /// Shard holding the runs of `text`. Stable for the lifetime of the cache.
    pub fn shard_index(&self, text: &str) -> usize {
        (fxhash::hash64(text) % self.shards.len() as u64) as usize
    }

    /// Total number of runs over all shards.
    pub fn len(&self) -> usize {
        self.shards.iter().map(GlyphRunCache::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(GlyphRunCache::is_empty)
    }

    pub fn create_counter(&self) -> usize {
        self.counters.created()
    }

    pub fn delete_counter(&self) -> usize {
        self.counters.destroyed()
    }

    /// Runs alive anywhere, including runs handed out by [`Self::take_run`].
    pub fn live_runs(&self) -> usize {
        self.counters.live()
    }

    // Outside soft mode the key drops the alpha, which is applied when
    // rasterizing, so one entry serves every alpha of the same color.
    fn make_key(&self, text: &str, fg: Color, outline: Color) -> GlyphRunKey {
        GlyphRunKey::with_soft_mode(text, fg, outline, self.config.soft_mode)
    }
}

// draw and measure
impl<B: FontBackend> FontCache<B> {
    /// Draws `text` at `(x, y)`, rasterizing it only if no matching run is
    /// cached. The alpha of `fg` is applied to the whole run.
    pub fn draw_string<C>(
        &mut self,
        target: &mut C,
        text: &str,
        fg: Color,
        outline: Color,
        x: i32,
        y: i32,
    ) where
        C: Canvas<B::Image> + ?Sized,
    {
        if text.is_empty() {
            return;
        }

        let alpha = fg.alpha_f32();
        let key = self.make_key(text, fg, outline);
        let index = self.shard_index(text);
        let max_shard_size = self.config.max_shard_size.get();
        let shard = &mut self.shards[index];

        let id = match shard.find(&key) {
            Some(id) => {
                shard.move_to_first(id);
                if let Some(run) = shard.get_mut(id) {
                    if run.is_stale(alpha) {
                        run.generate(&self.backend, alpha);
                    }
                }
                id
            }
            None => {
                if shard.len() >= max_shard_size {
                    shard.remove_back();
                }
                let mut run = GlyphRun::new(key, &self.counters);
                run.generate(&self.backend, alpha);
                shard.insert_first(run)
            }
        };

        if let Some(image) = shard.get(id).and_then(GlyphRun::image) {
            target.blit(image, x, y);
        }
    }

    /// Advance width of `text` in pixels. Does not touch the cache.
    pub fn width(&self, text: &str) -> u32 {
        if text.is_empty() {
            return 0;
        }
        self.backend.measure_width(text)
    }

    /// Line height in pixels.
    pub fn height(&self) -> u32 {
        self.backend.measure_height()
    }

    /// Image width of the most recently cached run of `text`, if any.
    ///
    /// Colors are ignored and the run is not promoted.
    pub fn cached_width(&self, text: &str) -> Option<u32> {
        let shard = &self.shards[self.shard_index(text)];
        shard
            .find_text(text)
            .and_then(|id| shard.get(id))
            .and_then(GlyphRun::image)
            .map(RunImage::width)
    }

    /// Byte index of the first character boundary whose prefix is wider
    /// than `x`, or `text.len()` when the whole text fits.
    pub fn string_index_at(&self, text: &str, x: i32) -> usize {
        text.char_indices()
            .map(|(index, _)| index)
            .find(|&index| i64::from(self.width(&text[..index])) > i64::from(x))
            .unwrap_or(text.len())
    }
}

// detached runs
impl<B: FontBackend> FontCache<B> {
    /// Hands out a generated run for a caller that keeps it across frames.
    ///
    /// A cached run with the same key is moved out of its shard instead of
    /// rasterizing the text again. Empty text yields an ungenerated run.
    pub fn take_run(&mut self, text: &str, fg: Color, outline: Color) -> GlyphRun<B::Image> {
        let alpha = fg.alpha_f32();
        let key = self.make_key(text, fg, outline);
        if text.is_empty() {
            return GlyphRun::new(key, &self.counters);
        }

        let index = self.shard_index(text);
        let max_shard_size = self.config.max_shard_size.get();
        let shard = &mut self.shards[index];

        if let Some(mut run) = shard.find(&key).and_then(|id| shard.remove(id)) {
            if run.is_stale(alpha) {
                run.generate(&self.backend, alpha);
            }
            return run;
        }

        if shard.len() >= max_shard_size {
            shard.remove_back();
        }
        let mut run = GlyphRun::new(key, &self.counters);
        run.generate(&self.backend, alpha);
        run
    }

    /// Gives a run obtained from [`Self::take_run`] back to the cache.
    ///
    /// The run is dropped instead when it has no text or no image, or when
    /// its key is cached again already. Returns whether it was kept.
    pub fn return_run(&mut self, run: GlyphRun<B::Image>) -> bool {
        if run.text().is_empty() || run.image().is_none() {
            return false;
        }

        let index = self.shard_index(run.text());
        let max_shard_size = self.config.max_shard_size.get();
        let shard = &mut self.shards[index];

        if shard.find(run.key()).is_some() {
            return false;
        }
        if shard.len() >= max_shard_size {
            shard.remove_back();
        }
        shard.insert_first(run);

        true
    }
}

// maintenance
impl<B: FontBackend> FontCache<B> {
    /// Periodic housekeeping, meant to be called once per frame or tick.
    ///
    /// The first call only schedules the next cleanup at
    /// `now + clean_interval + jitter`. Later calls run [`Self::do_clean`]
    /// once that deadline has passed and schedule the next one. Returns
    /// whether a cleanup ran.
    pub fn slow_logic(&mut self, now: Instant, jitter: Duration) -> bool {
        let next = now + self.config.clean_interval + jitter;

        match self.clean_deadline {
            None => {
                self.clean_deadline = Some(next);
                false
            }
            Some(deadline) if deadline < now => {
                self.do_clean();
                self.clean_deadline = Some(next);
                true
            }
            Some(_) => false,
        }
    }

    /// Trims every shard according to the clean policy. Returns the number
    /// of runs removed.
    pub fn do_clean(&mut self) -> usize {
        let mut removed = 0;

        for (index, shard) in self.shards.iter_mut().enumerate() {
            let excess = self.config.clean_policy.excess(shard.len());
            if excess == 0 {
                continue;
            }
            let count = shard.remove_back_n(excess);
            log::trace!("Trimmed {count} text runs from shard {index}");
            removed += count;
        }

        log::debug!(
            "Text run cleanup removed {removed} runs, {} left",
            self.len()
        );

        removed
    }

    /// Destroys every cached run.
    pub fn clear(&mut self) {
        for shard in self.shards.iter_mut() {
            shard.clear();
        }
    }

    /// Swaps the font backend, e.g. after a font or size change. All cached
    /// runs are dropped since they were rasterized with the old font.
    pub fn replace_backend(&mut self, backend: B) -> B {
        self.clear();
        std::mem::replace(&mut self.backend, backend)
    }
}
