use std::mem;

/// Capability of a type to produce a fresh instance of itself without any inputs.
///
/// A [`PoolContainer`][crate::PoolContainer] built without a custom factory uses this
/// capability to materialize new items when its cache is empty.
///
/// Every type that implements [`Default`] has this capability automatically. Types that have
/// no meaningful default can either implement this trait by hand or be pooled with a custom
/// factory. Types that have no value to offer at all can be pooled as `Option<T>`, in which case
/// the default factory produces `None`.
///
/// # Examples
///
/// ```
/// use object_pool::Instantiate;
///
/// struct Connection {
///     retries: u32,
/// }
///
/// impl Instantiate for Connection {
///     fn instantiate() -> Self {
///         Self { retries: 3 }
///     }
/// }
///
/// assert_eq!(Connection::instantiate().retries, 3);
/// assert_eq!(<Vec<u8>>::instantiate(), Vec::<u8>::new());
/// ```
pub trait Instantiate: Sized {
    /// Creates a new instance of the type.
    fn instantiate() -> Self;
}

impl<T> Instantiate for T
where
    T: Default,
{
    #[inline]
    fn instantiate() -> Self {
        Self::default()
    }
}

/// Whether `T` is a reference-like type that a [`PoolManager`][crate::PoolManager] accepts.
///
/// Reference-like types own resources that are released when they are dropped (heap memory,
/// handles, shared references). Plain value types such as integers or `Copy` structs own
/// nothing, so keeping them in a shared cache gains nothing over creating them anew.
///
/// # Examples
///
/// ```
/// use object_pool::is_reference_like;
///
/// assert!(is_reference_like::<String>());
/// assert!(is_reference_like::<Box<u32>>());
/// assert!(!is_reference_like::<u64>());
/// assert!(!is_reference_like::<(u8, char)>());
/// ```
#[must_use]
#[inline]
pub fn is_reference_like<T>() -> bool {
    mem::needs_drop::<T>()
}
