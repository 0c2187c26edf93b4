// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! An in-memory cache that rebuilds expired entries through a resource
//! factory, with selectable locking strategies.
//!
//! Every cache in this crate memoizes the output of a [`ResourceFactory`]:
//! the first lookup for a key constructs a [`Resource`] and stores it, and
//! later lookups return the stored resource until it outlives the configured
//! time-to-live. Expired entries are rebuilt in place on the next lookup.
//! Nothing happens in the background: no eviction, no sweeper threads, and
//! no capacity bound. With the default TTL of [`Duration::MAX`] entries
//! never expire and the cache is a plain memoizer.
//!
//! [`Duration::MAX`]: std::time::Duration::MAX
//!
//! The interesting part is what happens when several threads look up the
//! same absent or expired key at once. The crate ships three implementations
//! of the same [`ResourceCache`] trait that answer that question differently:
//!
//! | Strategy | Fresh reads | Concurrent refresh |
//! | :--- | :--- | :--- |
//! | [`ExclusiveLockCache`] | Serialized by one mutex | Duplicates possible; last write wins |
//! | [`ReadWriteLockCache`] | Proceed in parallel | Duplicates possible; writers serialized |
//! | [`PerKeyCache`] | Parallel across shards | Exactly one construction per expiry |
//!
//! The first two deliberately tolerate duplicate construction: their locks
//! are released between noticing a missing entry and storing a replacement,
//! so racing callers can each run the factory. The caches still converge on
//! a single stored resource, and every caller observes a resource the
//! factory really produced. [`PerKeyCache`] closes the gap by performing the
//! check and the construction as one atomic step inside a concurrent map,
//! at the cost of holding a shard lock while the factory runs.
//!
//! # Entry lifecycle
//!
//! An entry for a key is absent until the first lookup, valid from then
//! until its age exceeds the TTL, and stale afterwards. A lookup of a stale
//! entry constructs a replacement and the entry is valid again with a new
//! timestamp. All transitions happen inside [`ResourceCache::get`]; stale
//! entries that are never looked up again simply stay in the map.
//!
//! An entry is stale only when its age *exceeds* the TTL. At an age exactly
//! equal to the TTL it is still served as a hit.
//!
//! # Example
//!
//! ```
//! use refresh_cache::{CacheBuilder, ResourceCache, ResourceFactory};
//!
//! let factory = ResourceFactory::new();
//! let cache = CacheBuilder::new(factory.clone()).build_per_key();
//!
//! let first = cache.get(&"alpha");
//! let again = cache.get(&"alpha");
//! let other = cache.get(&"beta");
//!
//! assert_eq!(first, again);
//! assert_ne!(first, other);
//! assert_eq!(factory.max_serial(), 2);
//! ```
//!
//! # Testing expiry
//!
//! Caches read time from a [`Clock`]. Production code uses the default
//! system clock; tests inject a controlled clock from [`tempo`] and advance
//! it manually, so expiry is exercised without sleeping:
//!
//! ```
//! use refresh_cache::{CacheBuilder, ResourceCache, ResourceFactory};
//! use tempo::ClockControl;
//!
//! let control = ClockControl::new();
//! let cache = CacheBuilder::new(ResourceFactory::new())
//!     .ttl_millis(50)
//!     .clock(control.to_clock())
//!     .build_per_key();
//!
//! let first = cache.get(&"alpha");
//! control.advance_millis(60);
//! let rebuilt = cache.get(&"alpha");
//!
//! assert_ne!(first, rebuilt);
//! ```
//!
//! # Features
//!
//! - `logs` - Emits a `tracing` event for every cache hit and every factory
//!   construction, tagged with the strategy name and the cause.

mod builder;
mod cache;
mod entry;
mod exclusive;
mod factory;
mod per_key;
mod read_write;
mod telemetry;

pub use builder::CacheBuilder;
pub use cache::ResourceCache;
pub use exclusive::ExclusiveLockCache;
pub use factory::{Resource, ResourceFactory};
pub use per_key::PerKeyCache;
pub use read_write::ReadWriteLockCache;

// Re-export the clock type for convenience
pub use tempo::Clock;
