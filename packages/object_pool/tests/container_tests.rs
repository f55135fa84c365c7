//! Integration tests for `PoolContainer`.
//!
//! These tests exercise the public container API, including behavior under contention from
//! many threads.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use object_pool::{Instantiate, PoolContainer};
use testing::{contention_thread_count, run_on_threads, with_watchdog};

/// A type that offers no default value of its own.
#[derive(Debug)]
struct Connection {
    port: u16,
}

/// A type that knows how to create itself without implementing `Default`.
#[derive(Debug)]
struct Worker {
    name: &'static str,
}

impl Instantiate for Worker {
    fn instantiate() -> Self {
        Self { name: "idle" }
    }
}

#[test]
fn type_without_default_pops_none_when_pooled_as_option() {
    let pool = PoolContainer::<Option<Connection>>::new();

    assert!(pool.pop().is_none());
}

#[test]
fn hand_written_capability_is_used_as_default_factory() {
    let pool = PoolContainer::<Worker>::new();

    assert_eq!(pool.pop().name, "idle");
}

#[test]
fn pushed_item_is_popped_back() {
    let pool = PoolContainer::with_threshold(50);

    pool.push(Some(Connection { port: 8080 }));

    assert_eq!(pool.pop().map(|connection| connection.port), Some(8080));
    assert!(pool.is_empty());
}

#[test]
fn pop_range_on_empty_container_returns_requested_count() {
    let pool = PoolContainer::<String>::with_threshold(50);

    let items = pool.pop_range(20);

    assert_eq!(items.len(), 20);
    assert!(items.iter().all(String::is_empty));
}

#[test]
fn push_range_keeps_only_what_fits() {
    let pool = PoolContainer::<String>::with_threshold(10);
    pool.push_range((0..4).map(|i| format!("early-{i}")));

    pool.push_range((0..20).map(|i| format!("late-{i}")));

    let drained = pool.pop_range(pool.len());
    let retained_late = drained
        .iter()
        .filter(|item| item.starts_with("late-"))
        .collect::<HashSet<_>>();

    assert_eq!(drained.len(), 10);
    assert_eq!(retained_late.len(), 6);

    for i in 0..6 {
        assert!(retained_late.contains(&format!("late-{i}")));
    }
}

#[test]
fn zero_threshold_retains_large_batches() {
    let pool = PoolContainer::<u32>::with_threshold(0);

    for i in 0..10_000 {
        pool.push(i);
    }

    let drained = pool.pop_range(10_000);

    assert_eq!(drained.len(), 10_000);
    assert_eq!(pool.stats().misses, 0);
    assert_eq!(drained.iter().copied().collect::<HashSet<_>>().len(), 10_000);
}

#[test]
fn factory_runs_once_per_missing_item() {
    let created = Arc::new(AtomicUsize::new(0));
    let pool = PoolContainer::with_factory({
        let created = Arc::clone(&created);
        move || {
            created.fetch_add(1, Ordering::Relaxed);
            Vec::<u8>::with_capacity(64)
        }
    });

    pool.push_range([Vec::new(), Vec::new()]);

    let items = pool.pop_range(5);

    assert_eq!(items.len(), 5);
    assert_eq!(created.load(Ordering::Relaxed), 3);
}

#[test]
fn container_can_be_moved_between_threads() {
    let pool = PoolContainer::<String>::new();
    pool.push("from main".to_string());

    let handle = thread::spawn(move || pool.pop());

    assert_eq!(handle.join().unwrap(), "from main");
}

#[test]
fn concurrent_push_and_pop_lose_no_admitted_items() {
    with_watchdog(|| {
        let pool = PoolContainer::<u64>::with_threshold(0);
        let threads = contention_thread_count();

        run_on_threads(threads, |index| {
            let base = u64::try_from(index).unwrap() * 1_000;

            for i in 0..1_000 {
                pool.push(base + i);
            }
        });

        assert_eq!(pool.len(), threads * 1_000);

        let popped = run_on_threads(threads, |_| pool.pop_range(1_000));
        let unique = popped.into_iter().flatten().collect::<HashSet<_>>();

        assert_eq!(unique.len(), threads * 1_000);
        assert!(pool.is_empty());
    });
}

#[test]
fn threshold_is_approximately_respected_under_contention() {
    with_watchdog(|| {
        const THRESHOLD: usize = 64;

        let pool = PoolContainer::<Box<u32>>::with_threshold(THRESHOLD);
        let threads = contention_thread_count();

        run_on_threads(threads, |_| {
            for i in 0..1_000 {
                pool.push(Box::new(i));
            }
        });

        // Every thread may slip through the check once before anyone else observes the
        // new count, so the overshoot is bounded by the number of threads.
        assert!(pool.len() < THRESHOLD + threads);

        let stats = pool.stats();
        assert_eq!(stats.returns + stats.drops, threads * 1_000);
    });
}

#[test]
fn concurrent_pop_from_empty_container_always_yields_items() {
    with_watchdog(|| {
        let pool = Arc::new(PoolContainer::<String>::with_factory(|| "fresh".to_string()));
        let threads = contention_thread_count();

        let results = run_on_threads(threads, |_| {
            let mut taken = 0;

            for _ in 0..100 {
                let item = pool.pop();
                assert!(!item.is_empty());
                pool.push(item);
                taken += 1;
            }

            taken
        });

        assert_eq!(results.iter().sum::<usize>(), threads * 100);

        let stats = pool.stats();
        assert_eq!(stats.hits + stats.misses, threads * 100);
    });
}

#[test]
fn factory_can_be_replaced_while_in_use() {
    with_watchdog(|| {
        let pool = PoolContainer::<String>::with_factory(|| "old".to_string());

        let results = run_on_threads(contention_thread_count(), |index| {
            if index == 0 {
                pool.register_initializer(|| "new".to_string());
            }

            pool.pop()
        });

        assert!(results.iter().all(|item| item == "old" || item == "new"));
        assert_eq!(pool.pop(), "new");
    });
}
