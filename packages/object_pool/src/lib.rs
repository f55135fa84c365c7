#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Bounded, thread-safe caches of reusable objects that avoid repeated construction of
//! expensive or frequently needed instances.
//!
//! This package provides two layers:
//!
//! * [`PoolContainer<T>`] caches instances of one type. Taking an item from an empty container
//!   creates a new one via a factory, so callers never have to handle an empty pool.
//! * [`PoolManager`] holds one [`PoolContainer`] per registered type behind a uniform
//!   add/get surface, dispatching purely by type.
//!
//! # Soft capacity
//!
//! Every container has a threshold that bounds how many items it keeps. Items returned to a
//! full container are dropped. The threshold is checked separately from the act of caching an
//! item, so under heavy contention a container may briefly exceed it. A threshold of zero makes
//! a container effectively unbounded.
//!
//! # Item lifecycle
//!
//! Items are handed out as they were returned. There is no reset or validation step, so clear
//! any state that must not leak between users before returning an item.
//!
//! # Example
//!
//! ```rust
//! use object_pool::PoolContainer;
//!
//! let buffers = PoolContainer::builder()
//!     .threshold(16)
//!     .factory(|| Vec::<u8>::with_capacity(4096))
//!     .build();
//!
//! let mut buffer = buffers.pop();
//! buffer.extend_from_slice(b"payload");
//!
//! buffer.clear();
//! buffers.push(buffer);
//!
//! // The same allocation is handed out again.
//! assert!(buffers.pop().capacity() >= 4096);
//! ```
//!
//! Pooling several types through one manager:
//!
//! ```rust
//! use object_pool::PoolManager;
//!
//! let pools = PoolManager::new();
//! pools.register::<String>().unwrap();
//! pools.register_with_threshold::<Vec<u64>>(4).unwrap();
//!
//! assert!(pools.add(String::from("hello")));
//! assert_eq!(pools.get::<String>().unwrap(), "hello");
//!
//! let numbers = pools.get_range::<Vec<u64>>(3).unwrap();
//! assert_eq!(numbers.len(), 3);
//!
//! // Plain values are not accepted by the manager.
//! assert!(pools.register::<u64>().is_err());
//! ```

mod builder;
mod capability;
mod constants;
mod container;
mod error;
mod manager;
mod stats;

pub use builder::*;
pub use capability::*;
pub use container::*;
pub use error::*;
pub use manager::*;
pub use stats::PoolStats;
