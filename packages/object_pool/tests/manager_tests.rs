//! Integration tests for `PoolManager`.
//!
//! These tests verify registration semantics, type-based dispatch and thread safety of the
//! manager as seen through its public API.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use object_pool::{Error, PoolManager};
use testing::{contention_thread_count, run_on_threads, with_watchdog};

#[derive(Debug, Default)]
struct Request {
    headers: Vec<(String, String)>,
}

#[derive(Debug, Default)]
struct Response {
    body: Vec<u8>,
}

#[test]
fn get_of_unregistered_types_fails() {
    let pools = PoolManager::new();

    assert!(pools.get::<Request>().is_none());
    assert!(pools.get::<Response>().is_none());
    assert!(pools.get::<String>().is_none());
    assert!(pools.get_range::<Request>(2).is_none());
}

#[test]
fn second_registration_fails_and_keeps_first_container() {
    let pools = PoolManager::new();

    assert!(pools.register_with_threshold::<Request>(5).unwrap());
    assert!(!pools.register_with_threshold::<Request>(500).unwrap());

    let container = pools.container::<Request>().unwrap();
    assert_eq!(container.threshold(), 5);

    assert!(pools.add(Request {
        headers: vec![("host".to_string(), "example.com".to_string())],
    }));
    assert_eq!(container.len(), 1);

    let request = pools.get::<Request>().unwrap();
    assert_eq!(request.headers.len(), 1);
}

#[test]
fn plain_value_registration_is_an_error() {
    let pools = PoolManager::new();

    match pools.register::<u32>() {
        Err(Error::NotReferenceLike { type_name }) => assert_eq!(type_name, "u32"),
        other => panic!("expected registration to be rejected, got {other:?}"),
    }

    assert!(!pools.contains::<u32>());
    assert!(pools.is_empty());
}

#[test]
fn each_type_gets_its_own_container() {
    let pools = PoolManager::new();
    pools.register::<Request>().unwrap();
    pools.register::<Response>().unwrap();

    pools.add(Response {
        body: b"cached".to_vec(),
    });

    assert!(pools.get::<Request>().unwrap().headers.is_empty());
    assert_eq!(pools.get::<Response>().unwrap().body, b"cached");
    assert_eq!(pools.len(), 2);
}

#[test]
fn get_range_mixes_cached_and_new_items() {
    let pools = PoolManager::new();
    pools
        .register_with_factory(|| Response {
            body: Vec::with_capacity(512),
        })
        .unwrap();

    pools.add_range([
        Response {
            body: b"one".to_vec(),
        },
        Response {
            body: b"two".to_vec(),
        },
    ]);

    let responses = pools.get_range::<Response>(4).unwrap();

    assert_eq!(responses.len(), 4);
    assert_eq!(responses[0].body, b"two");
    assert_eq!(responses[1].body, b"one");
    assert!(responses[2].body.capacity() >= 512);
    assert!(responses[3].body.capacity() >= 512);
}

#[test]
fn manager_can_be_shared_between_threads() {
    let pools = Arc::new(PoolManager::new());
    pools.register::<String>().unwrap();

    let handle = thread::spawn({
        let pools = Arc::clone(&pools);
        move || pools.add("from worker".to_string())
    });

    assert!(handle.join().unwrap());
    assert_eq!(pools.get::<String>().unwrap(), "from worker");
}

#[test]
fn concurrent_registration_has_exactly_one_winner() {
    with_watchdog(|| {
        let pools = PoolManager::new();
        let threads = contention_thread_count();

        let outcomes = run_on_threads(threads, |index| {
            pools
                .register_with_factory(move || format!("winner-{index}"))
                .unwrap()
        });

        assert_eq!(outcomes.iter().filter(|won| **won).count(), 1);

        let winner = outcomes.iter().position(|won| *won).unwrap();
        assert_eq!(pools.get::<String>().unwrap(), format!("winner-{winner}"));
        assert_eq!(pools.len(), 1);
    });
}

#[test]
fn concurrent_use_of_different_types() {
    with_watchdog(|| {
        let pools = PoolManager::new();
        pools.register_with_threshold::<Request>(0).unwrap();
        pools.register_with_threshold::<Response>(0).unwrap();

        let threads = contention_thread_count();

        run_on_threads(threads, |index| {
            for _ in 0..100 {
                if index % 2 == 0 {
                    let request = pools.get::<Request>().unwrap();
                    assert!(pools.add(request));
                } else {
                    let response = pools.get::<Response>().unwrap();
                    assert!(pools.add(response));
                }
            }
        });

        let requests = pools.container::<Request>().unwrap().stats();
        let responses = pools.container::<Response>().unwrap().stats();

        assert_eq!(
            requests.hits + requests.misses + responses.hits + responses.misses,
            threads * 100
        );
    });
}

#[test]
fn failed_add_does_not_register() {
    struct Tracked(Arc<AtomicUsize>);

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    let dropped = Arc::new(AtomicUsize::new(0));
    let pools = PoolManager::new();

    assert!(!pools.add(Tracked(Arc::clone(&dropped))));

    assert_eq!(dropped.load(Ordering::Relaxed), 1);
    assert!(!pools.contains::<Tracked>());
}
