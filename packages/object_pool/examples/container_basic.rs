//! Example demonstrating basic usage of `PoolContainer` for reusing buffers.
//!
//! Buffers are taken from the container, used and returned, so their allocations are reused.

use object_pool::PoolContainer;

fn main() {
    println!("=== PoolContainer: reusing buffers ===");

    let buffers = PoolContainer::builder()
        .threshold(4)
        .factory(|| Vec::<u8>::with_capacity(1024))
        .build();

    for round in 0..3 {
        // The first round creates a buffer, later rounds reuse it.
        let mut buffer = buffers.pop();
        buffer.extend_from_slice(format!("round {round}").as_bytes());

        println!("Round {round}: {}", String::from_utf8_lossy(&buffer));

        // Items are returned as-is, so reset them before putting them back.
        buffer.clear();
        buffers.push(buffer);
    }

    // Taking a batch reuses what is cached and creates the rest.
    let batch = buffers.pop_range(3);
    println!("Batch of {} buffers", batch.len());

    // Only as many as fit below the threshold are kept, the rest are dropped.
    buffers.push_range(batch);
    buffers.push_range([Vec::new(), Vec::new(), Vec::new()]);

    println!("Cached buffers: {}", buffers.len());
    println!("Statistics: {:?}", buffers.stats());
}
