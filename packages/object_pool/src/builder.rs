use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use crate::{DEFAULT_THRESHOLD, Instantiate, PoolContainer};

/// Builder for creating an instance of [`PoolContainer`].
///
/// Both settings are optional:
///
/// * The threshold defaults to [`DEFAULT_THRESHOLD`]. A threshold of zero means the container is
///   effectively unbounded.
/// * The factory defaults to [`Instantiate::instantiate()`], which is only available if the item
///   type has that capability. Any item type can be pooled by supplying a custom factory.
///
/// # Examples
///
/// ```
/// use object_pool::PoolContainer;
///
/// // Default container for a type that can instantiate itself.
/// let pool = PoolContainer::<Vec<u8>>::builder().build();
/// assert_eq!(pool.threshold(), 50);
///
/// // Custom threshold and custom factory.
/// let pool = PoolContainer::builder()
///     .threshold(8)
///     .factory(|| Vec::<u8>::with_capacity(4096))
///     .build();
///
/// assert!(pool.pop().capacity() >= 4096);
/// ```
#[must_use]
pub struct PoolContainerBuilder<T, F = DefaultFactory> {
    threshold: usize,
    factory: F,

    _item: PhantomData<fn() -> T>,
}

impl<T> PoolContainerBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            factory: DefaultFactory,
            _item: PhantomData,
        }
    }
}

impl<T, F> PoolContainerBuilder<T, F> {
    /// Sets the soft upper bound on the number of items the container keeps.
    ///
    /// A value of zero means the container is effectively unbounded.
    ///
    /// # Examples
    ///
    /// ```
    /// use object_pool::PoolContainer;
    ///
    /// let pool = PoolContainer::<String>::builder().threshold(0).build();
    /// assert_eq!(pool.threshold(), usize::MAX);
    /// ```
    pub fn threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the factory used to create a new item whenever the container is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use object_pool::PoolContainer;
    ///
    /// let pool = PoolContainer::builder()
    ///     .factory(|| String::from("fresh"))
    ///     .build();
    ///
    /// assert_eq!(pool.pop(), "fresh");
    /// ```
    pub fn factory<G>(self, factory: G) -> PoolContainerBuilder<T, G>
    where
        G: Fn() -> T + Send + Sync + 'static,
    {
        PoolContainerBuilder {
            threshold: self.threshold,
            factory,
            _item: PhantomData,
        }
    }

    /// Builds the container with the specified configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use object_pool::PoolContainer;
    ///
    /// let pool = PoolContainer::<String>::builder().threshold(10).build();
    /// assert!(pool.is_empty());
    /// ```
    pub fn build(self) -> PoolContainer<T>
    where
        F: IntoFactory<T>,
    {
        PoolContainer::new_inner(self.threshold, self.factory.into_factory())
    }
}

impl<T, F> fmt::Debug for PoolContainerBuilder<T, F> {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolContainerBuilder")
            .field("item", &type_name::<T>())
            .field("threshold", &self.threshold)
            .field("factory", &type_name::<F>())
            .finish()
    }
}

/// Marker for a [`PoolContainerBuilder`] that has no custom factory and will fall back to
/// [`Instantiate::instantiate()`].
#[derive(Clone, Copy, Debug, Default)]
#[non_exhaustive]
pub struct DefaultFactory;

/// Something that can be turned into the item factory of a [`PoolContainer`].
///
/// Implemented by [`DefaultFactory`] (for item types with the [`Instantiate`] capability) and by
/// every thread-safe closure that returns the item type.
pub trait IntoFactory<T> {
    /// Converts `self` into a boxed factory.
    fn into_factory(self) -> Box<dyn Fn() -> T + Send + Sync>;
}

impl<T> IntoFactory<T> for DefaultFactory
where
    T: Instantiate + 'static,
{
    fn into_factory(self) -> Box<dyn Fn() -> T + Send + Sync> {
        Box::new(T::instantiate)
    }
}

impl<T, F> IntoFactory<T> for F
where
    F: Fn() -> T + Send + Sync + 'static,
{
    fn into_factory(self) -> Box<dyn Fn() -> T + Send + Sync> {
        Box::new(self)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(PoolContainerBuilder<String>: Send, Sync, fmt::Debug);
    assert_impl_all!(PoolContainerBuilder<Rc<u8>>: Send, Sync);

    #[test]
    fn new_uses_defaults() {
        let builder = PoolContainerBuilder::<String>::new();

        assert_eq!(builder.threshold, DEFAULT_THRESHOLD);
    }

    #[test]
    fn threshold_sets_threshold() {
        let builder = PoolContainerBuilder::<String>::new().threshold(7);

        assert_eq!(builder.threshold, 7);
    }

    #[test]
    fn factory_keeps_threshold() {
        let builder = PoolContainerBuilder::<String>::new()
            .threshold(3)
            .factory(|| "made".to_string());

        assert_eq!(builder.threshold, 3);

        let pool = builder.build();
        assert_eq!(pool.threshold(), 3);
        assert_eq!(pool.pop(), "made");
    }

    #[test]
    fn default_factory_instantiates() {
        let pool = PoolContainerBuilder::<Vec<u32>>::new().build();

        assert!(pool.pop().is_empty());
    }

    #[test]
    fn debug_names_item_type() {
        let builder = PoolContainerBuilder::<String>::new();

        let output = format!("{builder:?}");
        assert!(output.contains("String"));
        assert!(output.contains("DefaultFactory"));
    }
}
