#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))] // This is all test code, no need to test it.

//! Private helpers for testing and examples in the object pool packages.

use std::sync::{Barrier, mpsc};
use std::thread;
use std::time::Duration;

/// Runs a test with a timeout to prevent infinite hangs.
///
/// If the test takes longer than the timeout to complete, this panics instead of letting the
/// test run forever. The timeout is 10 seconds under normal conditions and 60 seconds under
/// Miri, where thread synchronization is significantly slower.
///
/// When the `MUTATION_TESTING` environment variable is set to "1", the watchdog is disabled
/// and the test function is executed directly, so mutation testing can detect hangs itself.
///
/// # Panics
///
/// Panics if the test exceeds the timeout (when not in mutation testing mode) and re-raises
/// any panic of the test itself.
///
/// # Example
///
/// ```rust
/// use testing::with_watchdog;
///
/// with_watchdog(|| {
///     assert_eq!(2 + 2, 4);
/// });
/// ```
pub fn with_watchdog<F, R>(test_fn: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    if std::env::var("MUTATION_TESTING").as_deref() == Ok("1") {
        return test_fn();
    }

    let (tx, rx) = mpsc::channel();

    let test_handle = thread::spawn(move || {
        let result = test_fn();
        // If this fails, the receiver has already timed out.
        drop(tx.send(result));
    });

    let timeout = if cfg!(miri) {
        Duration::from_secs(60)
    } else {
        Duration::from_secs(10)
    };

    match rx.recv_timeout(timeout) {
        Ok(result) => {
            test_handle.join().expect("test thread should not panic");
            result
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            panic!("test exceeded {} second timeout", timeout.as_secs());
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => match test_handle.join() {
            Ok(()) => panic!("test thread disconnected unexpectedly"),
            Err(e) => std::panic::resume_unwind(e),
        },
    }
}

/// Runs `work` on `thread_count` threads that all start at the same moment, maximizing
/// contention on whatever shared state `work` touches.
///
/// Each invocation receives the index of its thread. Returns the results in thread index order.
///
/// # Panics
///
/// Re-raises the panic of any worker thread.
///
/// # Example
///
/// ```rust
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// use testing::run_on_threads;
///
/// let counter = AtomicUsize::new(0);
///
/// let indexes = run_on_threads(4, |index| {
///     counter.fetch_add(1, Ordering::Relaxed);
///     index
/// });
///
/// assert_eq!(indexes, [0, 1, 2, 3]);
/// assert_eq!(counter.load(Ordering::Relaxed), 4);
/// ```
pub fn run_on_threads<F, R>(thread_count: usize, work: F) -> Vec<R>
where
    F: Fn(usize) -> R + Sync,
    R: Send,
{
    let start = Barrier::new(thread_count);

    thread::scope(|scope| {
        let handles = (0..thread_count)
            .map(|index| {
                let start = &start;
                let work = &work;

                scope.spawn(move || {
                    start.wait();
                    work(index)
                })
            })
            .collect::<Vec<_>>();

        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(result) => result,
                Err(e) => std::panic::resume_unwind(e),
            })
            .collect()
    })
}

/// The number of threads to use for contention tests: enough to overlap, few enough for Miri.
#[must_use]
pub fn contention_thread_count() -> usize {
    if cfg!(miri) {
        2
    } else {
        thread::available_parallelism().map_or(4, |count| count.get().clamp(4, 16))
    }
}
