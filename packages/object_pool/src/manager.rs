use std::any::{Any, TypeId, type_name};
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::{Arc, RwLock};

use foldhash::{HashMap, HashMapExt};
use tracing::debug;

use crate::constants::ERR_POISONED_LOCK;
use crate::{Error, Instantiate, PoolContainer, Result, is_reference_like};

/// A registry that holds at most one [`PoolContainer`] per item type and offers a uniform
/// add/get surface for all of them.
///
/// Types must be registered before they can be pooled. Operations on a type that was never
/// registered report failure (`false` or `None`) instead of implicitly creating a container.
///
/// Dispatch is purely by type identity: a `Box<dyn Trait>` pool and a pool of a concrete type
/// implementing that trait are unrelated.
///
/// Only reference-like types (see [`is_reference_like()`]) can be registered. Plain values are
/// pooled with a directly owned [`PoolContainer`] instead.
///
/// # Example
///
/// ```rust
/// use object_pool::PoolManager;
///
/// let pools = PoolManager::new();
///
/// assert!(pools.register::<String>().unwrap());
/// assert!(pools.register_with_factory(|| Vec::<u8>::with_capacity(1024)).unwrap());
///
/// assert!(pools.add("reused".to_string()));
/// assert_eq!(pools.get::<String>().unwrap(), "reused");
///
/// let buffer = pools.get::<Vec<u8>>().unwrap();
/// assert!(buffer.capacity() >= 1024);
///
/// // Types that were never registered are not pooled.
/// assert!(!pools.add(Box::new(5_u32)));
/// assert!(pools.get::<Box<u32>>().is_none());
/// ```
///
/// # Thread safety
///
/// The manager is thread-safe ([`Sync`]) and all operations take `&self`. Application code
/// typically creates one manager and shares it between threads via [`Arc`].
pub struct PoolManager {
    /// Every value is an `Arc<PoolContainer<T>>` where `TypeId::of::<T>()` is the key.
    containers: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl PoolManager {
    /// Creates a manager with no registered types.
    #[must_use]
    pub fn new() -> Self {
        Self {
            containers: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a default-configured container for `T`.
    ///
    /// Returns `Ok(true)` if the container was registered and `Ok(false)` if `T` already had a
    /// container, in which case the existing container remains in use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotReferenceLike`] if `T` is a plain value type. Nothing is registered.
    ///
    /// # Example
    ///
    /// ```rust
    /// use object_pool::PoolManager;
    ///
    /// let pools = PoolManager::new();
    ///
    /// assert!(pools.register::<String>().unwrap());
    /// assert!(!pools.register::<String>().unwrap());
    /// assert!(pools.register::<u32>().is_err());
    /// ```
    pub fn register<T>(&self) -> Result<bool>
    where
        T: Instantiate + Send + 'static,
    {
        self.insert(PoolContainer::<T>::new)
    }

    /// Registers a container for `T` with a custom threshold.
    ///
    /// A threshold of zero makes the container effectively unbounded. Otherwise behaves like
    /// [`register()`][Self::register].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotReferenceLike`] if `T` is a plain value type. Nothing is registered.
    pub fn register_with_threshold<T>(&self, threshold: usize) -> Result<bool>
    where
        T: Instantiate + Send + 'static,
    {
        self.insert(|| PoolContainer::<T>::with_threshold(threshold))
    }

    /// Registers a container for `T` that uses `factory` to create new items.
    ///
    /// Otherwise behaves like [`register()`][Self::register].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotReferenceLike`] if `T` is a plain value type. Nothing is registered.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::sync::Arc;
    ///
    /// use object_pool::PoolManager;
    ///
    /// struct Session {
    ///     name: Arc<str>,
    /// }
    ///
    /// let pools = PoolManager::new();
    /// pools
    ///     .register_with_factory(|| Session { name: Arc::from("guest") })
    ///     .unwrap();
    ///
    /// assert_eq!(&*pools.get::<Session>().unwrap().name, "guest");
    /// ```
    pub fn register_with_factory<T, F>(&self, factory: F) -> Result<bool>
    where
        T: Send + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.insert(|| PoolContainer::with_factory(factory))
    }

    /// Registers a container for `T` with a custom threshold that uses `factory` to create
    /// new items.
    ///
    /// Otherwise behaves like [`register()`][Self::register].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotReferenceLike`] if `T` is a plain value type. Nothing is registered.
    pub fn register_with<T, F>(&self, threshold: usize, factory: F) -> Result<bool>
    where
        T: Send + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.insert(|| {
            PoolContainer::builder()
                .threshold(threshold)
                .factory(factory)
                .build()
        })
    }

    /// Caches an item in the container registered for `T`.
    ///
    /// Returns `false` if no container is registered for `T`, in which case the item is dropped.
    /// Returns `true` otherwise, even if the container was at its threshold and dropped the item.
    pub fn add<T>(&self, item: T) -> bool
    where
        T: Send + 'static,
    {
        let Some(container) = self.container::<T>() else {
            return false;
        };

        container.push(item);
        true
    }

    /// Caches items in the container registered for `T`, as many as fit below its threshold.
    ///
    /// Returns `false` if no container is registered for `T`, in which case no items are taken
    /// from the sequence at all.
    pub fn add_range<T, I>(&self, items: I) -> bool
    where
        T: Send + 'static,
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let Some(container) = self.container::<T>() else {
            return false;
        };

        container.push_range(items);
        true
    }

    /// Takes an item from the container registered for `T`, creating one if the container has
    /// none cached.
    ///
    /// Returns `None` if no container is registered for `T`.
    ///
    /// # Panics
    ///
    /// Propagates any panic raised by the factory of the container.
    #[must_use]
    pub fn get<T>(&self) -> Option<T>
    where
        T: Send + 'static,
    {
        self.container::<T>().map(|container| container.pop())
    }

    /// Takes exactly `count` items from the container registered for `T`, creating as many as
    /// the container has not cached.
    ///
    /// Returns `None` if no container is registered for `T`.
    ///
    /// # Panics
    ///
    /// Propagates any panic raised by the factory of the container.
    #[must_use]
    pub fn get_range<T>(&self, count: usize) -> Option<Vec<T>>
    where
        T: Send + 'static,
    {
        self.container::<T>().map(|container| container.pop_range(count))
    }

    /// The container registered for `T`, if any.
    ///
    /// Useful for inspecting [statistics][PoolContainer::stats] or for replacing the factory
    /// via [`PoolContainer::register_initializer()`].
    #[must_use]
    pub fn container<T>(&self) -> Option<Arc<PoolContainer<T>>>
    where
        T: Send + 'static,
    {
        // The lock is released before the caller touches the container, so that factories
        // never run while we hold it.
        let erased = self
            .containers
            .read()
            .expect(ERR_POISONED_LOCK)
            .get(&TypeId::of::<T>())
            .map(Arc::clone)?;

        Some(
            erased
                .downcast::<PoolContainer<T>>()
                .expect("containers are always registered under the TypeId of their item type"),
        )
    }

    /// Whether a container is registered for `T`.
    #[must_use]
    pub fn contains<T>(&self) -> bool
    where
        T: 'static,
    {
        self.containers
            .read()
            .expect(ERR_POISONED_LOCK)
            .contains_key(&TypeId::of::<T>())
    }

    /// The number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.containers.read().expect(ERR_POISONED_LOCK).len()
    }

    /// Whether no type is registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert<T, F>(&self, build: F) -> Result<bool>
    where
        T: Send + 'static,
        F: FnOnce() -> PoolContainer<T>,
    {
        let type_name = type_name::<T>();

        if !is_reference_like::<T>() {
            debug!(type_name, "rejected registration of plain value type");
            return Err(Error::NotReferenceLike { type_name });
        }

        // Built before taking the lock. If another thread registers the same type first,
        // this container is simply dropped.
        let container: Arc<dyn Any + Send + Sync> = Arc::new(build());

        let mut containers = self.containers.write().expect(ERR_POISONED_LOCK);

        match containers.entry(TypeId::of::<T>()) {
            Entry::Occupied(_) => {
                debug!(type_name, "type already registered, keeping existing container");
                Ok(false)
            }
            Entry::Vacant(entry) => {
                entry.insert(container);
                debug!(type_name, "registered pool container");
                Ok(true)
            }
        }
    }
}

impl Default for PoolManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PoolManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolManager")
            .field("registered_types", &self.len())
            .finish()
    }
}
