use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::backend::FontBackend;
use crate::color::Color;
use crate::run_key::GlyphRunKey;

/// Creation and destruction counts of the runs belonging to one cache.
///
/// Every [`GlyphRun`] holds a handle and reports its own construction and
/// drop, so `created - destroyed` is the number of runs alive anywhere,
/// including runs handed out of the cache.
#[derive(Debug, Default)]
pub struct RunCounters {
    created: AtomicUsize,
    destroyed: AtomicUsize,
}

impl RunCounters {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    pub fn destroyed(&self) -> usize {
        self.destroyed.load(Ordering::Relaxed)
    }

    pub fn live(&self) -> usize {
        self.created().saturating_sub(self.destroyed())
    }
}

/// One text string rasterized in one foreground/outline color pair.
///
/// A run starts without an image. [`GlyphRun::generate`] fills it through a
/// [`FontBackend`]; the image stays `None` if the backend fails, which simply
/// means nothing gets drawn.
#[derive(Debug)]
pub struct GlyphRun<I> {
    key: GlyphRunKey,
    image: Option<I>,
    /// Alpha the current image was generated for. `None` until generated.
    alpha: Option<f32>,
    counters: Arc<RunCounters>,
}

impl<I> GlyphRun<I> {
    pub fn new(key: GlyphRunKey, counters: &Arc<RunCounters>) -> Self {
        counters.created.fetch_add(1, Ordering::Relaxed);
        Self {
            key,
            image: None,
            alpha: None,
            counters: Arc::clone(counters),
        }
    }

    pub fn key(&self) -> &GlyphRunKey {
        &self.key
    }

    pub fn text(&self) -> &str {
        self.key.text()
    }

    pub fn fg(&self) -> Color {
        self.key.fg()
    }

    pub fn outline(&self) -> Color {
        self.key.outline()
    }

    pub fn image(&self) -> Option<&I> {
        self.image.as_ref()
    }

    pub fn is_generated(&self) -> bool {
        self.alpha.is_some()
    }

    /// True when the run must be generated again to be drawn at `alpha`.
    pub fn is_stale(&self, alpha: f32) -> bool {
        match self.alpha {
            Some(generated) => (generated - alpha).abs() > f32::EPSILON,
            None => true,
        }
    }

    /// Rasterizes the run again, replacing any previous image.
    pub fn generate<B>(&mut self, backend: &B, alpha: f32)
    where
        B: FontBackend<Image = I>,
    {
        // release the old image before allocating a new one
        self.image = None;
        self.image = backend.rasterize(self.key.text(), self.key.fg(), self.key.outline(), alpha);
        self.alpha = Some(alpha);

        if self.image.is_none() {
            log::trace!("No image produced for text run {:?}", self.key.text());
        }
    }
}

impl<I> Drop for GlyphRun<I> {
    fn drop(&mut self) {
        self.counters.destroyed.fetch_add(1, Ordering::Relaxed);
    }
}
