//! Example demonstrating `PoolManager` holding pools of several types.
//!
//! One manager is created by the application and shared with worker threads.

use std::sync::Arc;
use std::thread;

use object_pool::PoolManager;

#[derive(Debug, Default)]
struct Message {
    topic: String,
    payload: Vec<u8>,
}

fn main() {
    println!("=== PoolManager: pooling several types ===");

    let pools = Arc::new(PoolManager::new());

    pools
        .register::<Message>()
        .expect("Message owns heap memory, so it can be registered");
    pools
        .register_with(8, || String::with_capacity(64))
        .expect("String owns heap memory, so it can be registered");

    // Plain values are rejected, they are better served by a directly owned container.
    if let Err(error) = pools.register::<u64>() {
        println!("Rejected: {error}");
    }

    let workers = (0..4)
        .map(|worker| {
            let pools = Arc::clone(&pools);

            thread::spawn(move || {
                let mut message = pools.get::<Message>().expect("Message is registered");
                message.topic.push_str("greetings");
                message.payload.extend_from_slice(format!("hello from {worker}").as_bytes());

                println!("Worker {worker} built message on '{}'", message.topic);

                message.topic.clear();
                message.payload.clear();
                pools.add(message);
            })
        })
        .collect::<Vec<_>>();

    for worker in workers {
        worker.join().expect("worker thread panicked");
    }

    let messages = pools.container::<Message>().expect("Message is registered");
    println!("Cached messages: {}", messages.len());
    println!("Message statistics: {:?}", messages.stats());

    // Types that were never registered are not pooled.
    println!("Boxed values pooled: {}", pools.add(Box::new(1_u8)));
}
