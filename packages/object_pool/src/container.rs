use std::any::type_name;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::{fmt, iter};

use arc_swap::ArcSwap;
use tracing::trace;

use crate::constants::ERR_POISONED_LOCK;
use crate::stats::Counters;
use crate::{Instantiate, PoolContainerBuilder, PoolStats};

/// Threshold of a [`PoolContainer`] that was not given one explicitly.
pub const DEFAULT_THRESHOLD: usize = 50;

/// A bounded cache of reusable instances of one type, with lazy construction on demand.
///
/// Items are handed out in last-in-first-out order. When the cache is empty, a factory creates
/// a new item instead. Items pushed back into a container that is at its threshold are dropped.
///
/// # Threshold
///
/// The threshold is a soft bound. The number of cached items is checked separately from the act
/// of caching an item, so when many threads push at the same time, the container may briefly
/// hold more items than the threshold permits. A threshold of zero makes the container
/// effectively unbounded.
///
/// A single pushed item is only cached if the container holds fewer than `threshold - 1` items,
/// whereas [`push_range()`][Self::push_range] fills the container up to the threshold.
///
/// # Factory
///
/// Containers created via [`new()`][Self::new] use [`Instantiate::instantiate()`] as the
/// factory. A custom factory can be supplied at construction time or replaced later via
/// [`register_initializer()`][Self::register_initializer]. A panic in the factory is not caught
/// and propagates to the caller that requested the item.
///
/// # Example
///
/// ```rust
/// use object_pool::PoolContainer;
///
/// let pool = PoolContainer::<Vec<u8>>::new();
///
/// let mut buffer = pool.pop();
/// buffer.extend_from_slice(b"hello");
///
/// // Cached items are handed out as-is, so clear them if that matters to you.
/// buffer.clear();
/// pool.push(buffer);
///
/// assert_eq!(pool.len(), 1);
/// ```
///
/// # Thread safety
///
/// The container is thread-safe ([`Sync`]) if the item type is thread-mobile ([`Send`]). All
/// operations take `&self`, so a container can be shared between threads via [`Arc`].
///
/// The cached items are guarded by a lock. It is held only for the stack operation itself
/// (constant time per item, or linear in the batch size for the range operations) and never
/// while a factory runs.
pub struct PoolContainer<T> {
    /// The cached items. The top of the stack is the end of the vector.
    items: Mutex<Vec<T>>,

    /// Mirror of `items.len()`, readable without taking the lock.
    len: AtomicUsize,

    /// Soft upper bound on `len`. `usize::MAX` if unbounded.
    threshold: usize,

    /// Creates an item whenever the cache runs dry. Replaceable at runtime, so the
    /// current one is loaded for every miss.
    factory: ArcSwap<Factory<T>>,

    counters: Counters,
}

impl<T> PoolContainer<T>
where
    T: Instantiate + 'static,
{
    /// Creates a container with the default threshold that uses [`Instantiate::instantiate()`]
    /// to create new items.
    ///
    /// # Example
    ///
    /// ```rust
    /// use object_pool::{DEFAULT_THRESHOLD, PoolContainer};
    ///
    /// let pool = PoolContainer::<String>::new();
    ///
    /// assert_eq!(pool.threshold(), DEFAULT_THRESHOLD);
    /// assert_eq!(pool.pop(), "");
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a container with a custom threshold that uses [`Instantiate::instantiate()`]
    /// to create new items.
    ///
    /// A threshold of zero makes the container effectively unbounded.
    ///
    /// # Example
    ///
    /// ```rust
    /// use object_pool::PoolContainer;
    ///
    /// let pool = PoolContainer::<String>::with_threshold(4);
    /// assert_eq!(pool.threshold(), 4);
    /// ```
    #[must_use]
    pub fn with_threshold(threshold: usize) -> Self {
        Self::builder().threshold(threshold).build()
    }
}

impl<T> PoolContainer<T> {
    /// Creates a builder for configuring and constructing a [`PoolContainer`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use object_pool::PoolContainer;
    ///
    /// let pool = PoolContainer::builder()
    ///     .threshold(16)
    ///     .factory(|| String::with_capacity(256))
    ///     .build();
    ///
    /// assert!(pool.pop().capacity() >= 256);
    /// ```
    pub fn builder() -> PoolContainerBuilder<T> {
        PoolContainerBuilder::new()
    }

    /// Creates a container with the default threshold that uses `factory` to create new items.
    ///
    /// This works for any item type, including types without the [`Instantiate`] capability.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::net::{Ipv4Addr, SocketAddrV4};
    ///
    /// use object_pool::PoolContainer;
    ///
    /// let pool = PoolContainer::with_factory(|| SocketAddrV4::new(Ipv4Addr::LOCALHOST, 80));
    /// assert_eq!(pool.pop().port(), 80);
    /// ```
    #[must_use]
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::builder().factory(factory).build()
    }

    pub(crate) fn new_inner(threshold: usize, create: Box<dyn Fn() -> T + Send + Sync>) -> Self {
        let threshold = if threshold == 0 {
            usize::MAX
        } else {
            threshold
        };

        Self {
            items: Mutex::new(Vec::new()),
            len: AtomicUsize::new(0),
            threshold,
            factory: ArcSwap::from_pointee(Factory { create }),
            counters: Counters::default(),
        }
    }

    /// Takes the most recently cached item, or creates a new one if the cache is empty.
    ///
    /// # Panics
    ///
    /// Propagates any panic raised by the factory.
    ///
    /// # Example
    ///
    /// ```rust
    /// use object_pool::PoolContainer;
    ///
    /// let pool = PoolContainer::<String>::new();
    /// pool.push("cached".to_string());
    ///
    /// assert_eq!(pool.pop(), "cached");
    /// assert_eq!(pool.pop(), "");
    /// ```
    #[must_use]
    pub fn pop(&self) -> T {
        let cached = {
            let mut items = self.items.lock().expect(ERR_POISONED_LOCK);
            let item = items.pop();
            self.len.store(items.len(), Ordering::Relaxed);
            item
        };

        match cached {
            Some(item) => {
                self.counters.record_hits(1);
                item
            }
            None => {
                self.counters.record_misses(1);
                self.create()
            }
        }
    }

    /// Takes exactly `count` items, reusing as many cached items as are available and creating
    /// the rest.
    ///
    /// Cached items are taken in one batch, most recently cached first. Newly created items
    /// follow them.
    ///
    /// # Panics
    ///
    /// Propagates any panic raised by the factory.
    ///
    /// # Example
    ///
    /// ```rust
    /// use object_pool::PoolContainer;
    ///
    /// let pool = PoolContainer::<String>::new();
    /// pool.push("cached".to_string());
    ///
    /// let items = pool.pop_range(3);
    /// assert_eq!(items, ["cached", "", ""]);
    /// ```
    #[must_use]
    pub fn pop_range(&self, count: usize) -> Vec<T> {
        let mut result = Vec::with_capacity(count);

        {
            let mut items = self.items.lock().expect(ERR_POISONED_LOCK);
            let keep = items.len().saturating_sub(count);
            result.extend(items.drain(keep..).rev());
            self.len.store(items.len(), Ordering::Relaxed);
        }

        let reused = result.len();
        self.counters.record_hits(reused);

        let missing = count.saturating_sub(reused);

        if missing > 0 {
            self.counters.record_misses(missing);

            let factory = self.factory.load_full();
            result.extend(iter::repeat_with(|| (factory.create)()).take(missing));
        }

        result
    }

    /// Caches an item for reuse, unless the container is at its threshold, in which case the
    /// item is dropped.
    ///
    /// # Example
    ///
    /// ```rust
    /// use object_pool::PoolContainer;
    ///
    /// let pool = PoolContainer::<String>::with_threshold(2);
    ///
    /// pool.push("kept".to_string());
    /// pool.push("dropped".to_string());
    ///
    /// assert_eq!(pool.len(), 1);
    /// ```
    pub fn push(&self, item: T) {
        // Another thread may push between this check and ours, so the threshold is only a
        // soft limit.
        if self.len().saturating_add(1) >= self.threshold {
            self.counters.record_drops(1);
            trace!(
                item = type_name::<T>(),
                threshold = self.threshold,
                "container at threshold, dropping pushed item"
            );
            return;
        }

        {
            let mut items = self.items.lock().expect(ERR_POISONED_LOCK);
            items.push(item);
            self.len.store(items.len(), Ordering::Relaxed);
        }

        self.counters.record_returns(1);
    }

    /// Caches as many of the given items as fit below the threshold, taken from the front of the
    /// sequence. The rest are dropped.
    ///
    /// Items are pulled from the iterator only while there is room for them. Items past that
    /// point are never produced, so a lazily generated sequence does no wasted work.
    ///
    /// # Example
    ///
    /// ```rust
    /// use object_pool::PoolContainer;
    ///
    /// let pool = PoolContainer::<u32>::with_threshold(3);
    /// pool.push_range([1, 2, 3, 4, 5]);
    ///
    /// assert_eq!(pool.len(), 3);
    /// assert_eq!(pool.pop_range(3), [3, 2, 1]);
    /// ```
    pub fn push_range<I>(&self, items: I)
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let remaining = self.threshold.saturating_sub(self.len());

        let mut items = items.into_iter();
        let admitted = items.by_ref().take(remaining).collect::<Vec<_>>();
        let admitted_count = admitted.len();

        if admitted_count > 0 {
            {
                let mut cached = self.items.lock().expect(ERR_POISONED_LOCK);
                cached.extend(admitted);
                self.len.store(cached.len(), Ordering::Relaxed);
            }

            self.counters.record_returns(admitted_count);
        }

        let dropped = items.len();

        if dropped > 0 {
            self.counters.record_drops(dropped);
            trace!(
                item = type_name::<T>(),
                threshold = self.threshold,
                dropped,
                "container at threshold, dropping pushed items"
            );
        }
    }

    /// Replaces the factory used to create new items when the cache is empty.
    ///
    /// Only affects items created after this call. Items already cached are kept.
    ///
    /// # Example
    ///
    /// ```rust
    /// use object_pool::PoolContainer;
    ///
    /// let pool = PoolContainer::<String>::new();
    /// assert_eq!(pool.pop(), "");
    ///
    /// pool.register_initializer(|| "configured".to_string());
    /// assert_eq!(pool.pop(), "configured");
    /// ```
    pub fn register_initializer<F>(&self, factory: F)
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.factory.store(Arc::new(Factory {
            create: Box::new(factory),
        }));
    }

    /// The number of items currently cached.
    ///
    /// This is a snapshot that other threads may invalidate at any time.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    /// Whether the cache is currently empty.
    ///
    /// This is a snapshot that other threads may invalidate at any time.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The soft upper bound on cached items. `usize::MAX` if the container is unbounded.
    #[must_use]
    #[inline]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Statistics about how the container has been used so far.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.counters.snapshot(self.len())
    }

    fn create(&self) -> T {
        // Loading a full `Arc` instead of a guard, as the factory may run for a long time.
        let factory = self.factory.load_full();
        (factory.create)()
    }
}

impl<T> Default for PoolContainer<T>
where
    T: Instantiate + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for PoolContainer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolContainer")
            .field("item", &type_name::<T>())
            .field("len", &self.len())
            .field("threshold", &self.threshold)
            .field("counters", &self.counters)
            .finish_non_exhaustive()
    }
}

struct Factory<T> {
    create: Box<dyn Fn() -> T + Send + Sync>,
}

#[cfg(test)]
#[allow(
    clippy::indexing_slicing,
    reason = "tests focus on succinct code and do not need to tick all the boxes"
)]
mod tests {
    use std::cell::RefCell;
    use std::panic::{self, AssertUnwindSafe};
    use std::rc::Rc;
    use std::sync::atomic::AtomicU32;

    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;

    assert_impl_all!(PoolContainer<String>: Send, Sync, fmt::Debug);
    assert_impl_all!(PoolContainer<RefCell<u32>>: Send, Sync);
    assert_not_impl_any!(PoolContainer<Rc<u32>>: Send, Sync);

    /// A type with no default construction of its own.
    #[derive(Debug, PartialEq)]
    struct Handle {
        id: u32,
    }

    /// Keeps count of how many instances are alive.
    struct Tracked(Arc<AtomicU32>);

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn pop_without_factory_returns_default() {
        let pool = PoolContainer::<u64>::new();

        assert_eq!(pool.pop(), 0);
    }

    #[test]
    fn pop_of_optional_type_returns_none() {
        let pool = PoolContainer::<Option<Handle>>::new();

        assert_eq!(pool.pop(), None);
        assert_eq!(pool.pop_range(2), [None, None]);
    }

    #[test]
    fn push_then_pop_returns_same_item() {
        let pool = PoolContainer::with_factory(|| Handle { id: 0 });

        pool.push(Handle { id: 42 });

        assert_eq!(pool.pop(), Handle { id: 42 });
        assert_eq!(pool.pop(), Handle { id: 0 });
    }

    #[test]
    fn pop_is_last_in_first_out() {
        let pool = PoolContainer::<u32>::new();

        pool.push(1);
        pool.push(2);
        pool.push(3);

        assert_eq!(pool.pop(), 3);
        assert_eq!(pool.pop(), 2);
        assert_eq!(pool.pop(), 1);
    }

    #[test]
    fn zero_threshold_is_unbounded() {
        let pool = PoolContainer::<u32>::with_threshold(0);

        assert_eq!(pool.threshold(), usize::MAX);

        for i in 0..1000 {
            pool.push(i);
        }

        assert_eq!(pool.len(), 1000);
    }

    #[test]
    fn push_keeps_count_below_threshold() {
        let pool = PoolContainer::<u32>::with_threshold(5);

        for i in 0..10 {
            pool.push(i);
        }

        // A single push is admitted only while count + 1 stays below the threshold.
        assert_eq!(pool.len(), 4);
        assert_eq!(pool.stats().drops, 6);
    }

    #[test]
    fn threshold_of_one_never_caches_single_items() {
        let pool = PoolContainer::<u32>::with_threshold(1);

        pool.push(1);

        assert!(pool.is_empty());
    }

    #[test]
    fn push_range_fills_up_to_threshold() {
        let pool = PoolContainer::<u32>::with_threshold(5);
        pool.push(100);

        pool.push_range(0..10);

        assert_eq!(pool.len(), 5);
        assert_eq!(pool.pop_range(5), [3, 2, 1, 0, 100]);

        let stats = pool.stats();
        assert_eq!(stats.returns, 5);
        assert_eq!(stats.drops, 6);
    }

    #[test]
    fn push_range_into_full_container_drops_everything() {
        let pool = PoolContainer::<u32>::with_threshold(2);
        pool.push_range([1, 2]);

        pool.push_range([3, 4, 5]);

        assert_eq!(pool.len(), 2);
        assert_eq!(pool.stats().drops, 3);
    }

    #[test]
    fn overflow_items_are_dropped() {
        let live = Arc::new(AtomicU32::new(0));
        let make = || {
            live.fetch_add(1, Ordering::Relaxed);
            Some(Tracked(Arc::clone(&live)))
        };

        let pool = PoolContainer::<Option<Tracked>>::with_threshold(3);
        pool.push_range((0..8).map(|_| make()));

        assert_eq!(pool.len(), 3);
        assert_eq!(live.load(Ordering::Relaxed), 3);

        drop(pool);
        assert_eq!(live.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn push_range_does_not_produce_items_that_do_not_fit() {
        let pool = PoolContainer::<Vec<u8>>::with_threshold(5);
        let mut produced = 0;

        pool.push_range((0..10_000).map(|_| {
            produced += 1;
            Vec::with_capacity(4096)
        }));

        assert_eq!(produced, 5);
        assert_eq!(pool.len(), 5);

        let stats = pool.stats();
        assert_eq!(stats.returns, 5);
        assert_eq!(stats.drops, 9_995);
    }

    #[test]
    fn pop_range_reuses_then_creates() {
        let created = Arc::new(AtomicU32::new(0));
        let pool = PoolContainer::with_factory({
            let created = Arc::clone(&created);
            move || created.fetch_add(1, Ordering::Relaxed) + 100
        });

        pool.push(1);
        pool.push(2);

        let items = pool.pop_range(4);

        assert_eq!(items, [2, 1, 100, 101]);
        assert_eq!(created.load(Ordering::Relaxed), 2);
        assert!(pool.is_empty());

        let stats = pool.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 2);
    }

    #[test]
    fn pop_range_takes_most_recent_items() {
        let pool = PoolContainer::<u32>::new();
        pool.push_range([1, 2, 3, 4]);

        assert_eq!(pool.pop_range(2), [4, 3]);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn pop_range_of_zero_is_empty() {
        let pool = PoolContainer::<u32>::new();
        pool.push(5);

        assert!(pool.pop_range(0).is_empty());
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn pop_range_on_empty_container_creates_defaults() {
        let pool = PoolContainer::<u32>::with_threshold(50);

        let items = pool.pop_range(10);

        assert_eq!(items.len(), 10);
        assert!(items.iter().all(|item| *item == 0));
    }

    #[test]
    fn register_initializer_affects_later_misses_only() {
        let pool = PoolContainer::<String>::new();
        pool.push("cached".to_string());

        pool.register_initializer(|| "new".to_string());

        assert_eq!(pool.pop(), "cached");
        assert_eq!(pool.pop(), "new");
    }

    #[test]
    fn factory_panic_propagates() {
        let pool = PoolContainer::<String>::with_factory(|| panic!("factory failed"));

        let result = panic::catch_unwind(AssertUnwindSafe(|| pool.pop()));
        assert!(result.is_err());

        // The container remains usable afterwards.
        pool.push("ok".to_string());
        assert_eq!(pool.pop(), "ok");
    }

    #[test]
    #[should_panic(expected = "factory failed")]
    fn factory_panic_propagates_from_pop_range() {
        let pool = PoolContainer::<String>::with_factory(|| panic!("factory failed"));

        drop(pool.pop_range(1));
    }

    #[test]
    fn stats_track_usage() {
        let pool = PoolContainer::<u32>::with_threshold(2);

        let item = pool.pop();
        pool.push(item);
        pool.push(item);
        _ = pool.pop();

        assert_eq!(
            pool.stats(),
            PoolStats {
                size: 0,
                hits: 1,
                misses: 1,
                returns: 1,
                drops: 1,
            }
        );
    }

    #[test]
    fn default_is_new() {
        let pool = PoolContainer::<String>::default();

        assert_eq!(pool.threshold(), DEFAULT_THRESHOLD);
        assert!(pool.is_empty());
    }

    #[test]
    fn debug_shows_item_type_and_len() {
        let pool = PoolContainer::<String>::new();
        pool.push(String::new());

        let output = format!("{pool:?}");
        assert!(output.contains("String"));
        assert!(output.contains("len: 1"));
    }

    #[test]
    fn items_are_returned_as_is() {
        let pool = PoolContainer::<Vec<u8>>::new();
        pool.push(vec![1, 2, 3]);

        assert_eq!(pool.pop()[2], 3);
    }
}
