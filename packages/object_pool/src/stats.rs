use std::sync::atomic::{AtomicUsize, Ordering};

/// Point-in-time statistics of a [`PoolContainer`][crate::PoolContainer].
///
/// The counters are updated without synchronization between them, so a snapshot taken while
/// other threads use the container may be slightly inconsistent.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct PoolStats {
    /// Items currently cached in the container.
    pub size: usize,

    /// Items handed out from the cache.
    pub hits: usize,

    /// Items created by the factory because the cache was empty.
    pub misses: usize,

    /// Items accepted back into the cache.
    pub returns: usize,

    /// Items discarded because the cache was at its threshold.
    pub drops: usize,
}

impl PoolStats {
    /// Fraction of requested items that were served from the cache, from 0.0 to 1.0.
    ///
    /// Returns 0.0 if no items have been requested yet.
    ///
    /// # Examples
    ///
    /// ```
    /// use object_pool::PoolContainer;
    ///
    /// let pool = PoolContainer::<String>::new();
    /// pool.push(pool.pop());
    /// _ = pool.pop();
    ///
    /// let stats = pool.stats();
    /// assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    /// ```
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "a rate does not need exact counts at such magnitudes"
    )]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits.saturating_add(self.misses);

        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// The live counters behind [`PoolStats`].
#[derive(Debug, Default)]
pub(crate) struct Counters {
    hits: AtomicUsize,
    misses: AtomicUsize,
    returns: AtomicUsize,
    drops: AtomicUsize,
}

impl Counters {
    #[inline]
    pub(crate) fn record_hits(&self, count: usize) {
        self.hits.fetch_add(count, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_misses(&self, count: usize) {
        self.misses.fetch_add(count, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_returns(&self, count: usize) {
        self.returns.fetch_add(count, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_drops(&self, count: usize) {
        self.drops.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, size: usize) -> PoolStats {
        PoolStats {
            size,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            returns: self.returns.load(Ordering::Relaxed),
            drops: self.drops.load(Ordering::Relaxed),
        }
    }
}
