// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Demonstrates entry expiry driven by a manually controlled clock.
//!
//! The cache reads time through `tempo`, so the example advances time
//! explicitly instead of sleeping. The same wiring is how expiry is
//! exercised in tests.

use refresh_cache::{CacheBuilder, ResourceCache, ResourceFactory};
use tempo::ClockControl;

fn main() {
    let control = ClockControl::new();
    let factory = ResourceFactory::new();
    let cache = CacheBuilder::new(factory.clone())
        .ttl_millis(50)
        .clock(control.to_clock())
        .build_per_key();

    let first = cache.get(&"session");
    println!("first lookup constructed resource #{}", first.serial());

    control.advance_millis(40);
    let still_fresh = cache.get(&"session");
    println!("at 40ms the entry is still fresh: resource #{}", still_fresh.serial());
    assert_eq!(still_fresh, first);

    control.advance_millis(20);
    let rebuilt = cache.get(&"session");
    println!("at 60ms the entry expired and was rebuilt: resource #{}", rebuilt.serial());
    assert_ne!(rebuilt, first);

    println!("factory ran {} time(s) in total", factory.max_serial());
}
