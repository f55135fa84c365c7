use thiserror::Error;

/// Errors that can occur when registering types with a [`PoolManager`][crate::PoolManager].
///
/// Absence conditions (a type that is not registered, a type that is registered twice) are not
/// errors and are reported through `bool` and `Option` return values instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The caller attempted to register a plain value type with a pool manager.
    ///
    /// A pool manager only accepts types that own resources (heap memory, handles and similar),
    /// as reusing plain values saves nothing. Such types can still be pooled by owning a
    /// [`PoolContainer`][crate::PoolContainer] directly.
    #[error(
        "cannot register '{type_name}' with a pool manager: it owns no resources, \
         pool it with a directly owned PoolContainer instead"
    )]
    NotReferenceLike {
        /// The name of the rejected type, as reported by [`std::any::type_name`].
        type_name: &'static str,
    },
}

/// A specialized `Result` type for pool manager operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_rejected_type() {
        let error = Error::NotReferenceLike { type_name: "u64" };

        let message = error.to_string();
        assert!(message.contains("'u64'"));
        assert!(message.contains("PoolContainer"));
    }
}
