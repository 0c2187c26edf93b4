// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Demonstrates how the three locking strategies behave when several
//! threads request the same absent key at once.
//!
//! The per-key strategy constructs exactly once no matter how many
//! requests race; the exclusive-lock and reader/writer strategies may
//! construct once per racer before converging on a single stored resource.

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use refresh_cache::{CacheBuilder, ResourceCache, ResourceFactory};

const REQUESTS: usize = 4;

fn stampede(
    name: &str,
    factory: &ResourceFactory,
    cache: Arc<dyn ResourceCache<&'static str> + Send + Sync>,
) {
    let barrier = Arc::new(Barrier::new(REQUESTS));

    let handles: Vec<_> = (1..=REQUESTS)
        .map(|i| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let resource = cache.get(&"config");
                println!("  [request {i}] got resource #{}", resource.serial());
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("request panicked");
    }

    println!("{name}: factory ran {} time(s) for {REQUESTS} concurrent requests\n", factory.max_serial());
}

fn main() {
    println!("{REQUESTS} concurrent requests per strategy, each construction takes 50ms...\n");

    // A fresh factory per strategy so the construction counts are comparable.
    let factory = ResourceFactory::with_delay(Duration::from_millis(50));
    let cache = CacheBuilder::new(factory.clone()).build_exclusive();
    stampede("exclusive_lock", &factory, Arc::new(cache));

    let factory = ResourceFactory::with_delay(Duration::from_millis(50));
    let cache = CacheBuilder::new(factory.clone()).build_read_write();
    stampede("read_write_lock", &factory, Arc::new(cache));

    let factory = ResourceFactory::with_delay(Duration::from_millis(50));
    let cache = CacheBuilder::new(factory.clone()).build_per_key();
    stampede("per_key", &factory, Arc::new(cache));
}
