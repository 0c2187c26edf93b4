// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::hash::Hash;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tempo::Clock;

use crate::cache::ResourceCache;
use crate::entry::Stamped;
use crate::factory::{Resource, ResourceFactory};
use crate::telemetry::{self, Cause};

/// A cache that refreshes each key atomically: at most one construction
/// per key per expiry.
///
/// The check-and-construct sequence runs inside the concurrent map's entry
/// API, which holds the key's shard locked for the duration. When several
/// callers race on an absent or stale key, exactly one constructs; the rest
/// wait on the shard and then read the freshly stored resource. No duplicate
/// construction and no lost update are possible.
///
/// The serialization unit is the map shard, not the individual key, so a
/// construction in progress also delays callers for other keys that happen
/// to hash to the same shard. Unrelated keys on other shards are unaffected.
/// With a slow factory and hot contention spread across many keys this is
/// the trade for the exactly-once guarantee.
///
/// # Examples
///
/// ```
/// use refresh_cache::{PerKeyCache, ResourceCache, ResourceFactory};
///
/// let factory = ResourceFactory::new();
/// let cache = PerKeyCache::new(factory.clone());
///
/// let first = cache.get(&"thruster");
/// let again = cache.get(&"thruster");
///
/// assert_eq!(first, again);
/// assert_eq!(factory.max_serial(), 1);
/// ```
pub struct PerKeyCache<K> {
    entries: DashMap<K, Stamped, ahash::RandomState>,
    factory: ResourceFactory,
    clock: Clock,
    ttl: Duration,
}

impl<K: Eq + Hash> std::fmt::Debug for PerKeyCache<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerKeyCache")
            .field("len", &self.entries.len())
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl<K: Eq + Hash + Clone> PerKeyCache<K> {
    /// Creates a cache with the default configuration: entries never expire
    /// and timestamps come from the system clock.
    ///
    /// Use [`CacheBuilder`][crate::CacheBuilder] to configure a TTL or
    /// inject a clock.
    #[must_use]
    pub fn new(factory: ResourceFactory) -> Self {
        crate::CacheBuilder::new(factory).build_per_key()
    }

    pub(crate) fn from_parts(factory: ResourceFactory, clock: Clock, ttl: Duration) -> Self {
        Self {
            entries: DashMap::with_hasher(ahash::RandomState::new()),
            factory,
            clock,
            ttl,
        }
    }

    /// Returns the number of keys with a live entry, fresh or stale.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entry has been stored yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the configured TTL.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the clock that supplies entry timestamps.
    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Returns a handle to the factory this cache constructs through.
    #[must_use]
    pub fn factory(&self) -> &ResourceFactory {
        &self.factory
    }
}

impl<K: Eq + Hash + Clone> ResourceCache<K> for PerKeyCache<K> {
    fn get(&self, key: &K) -> Resource {
        let now = self.clock.instant();

        // The entry holds the shard's write lock until the arm completes,
        // so the freshness check and any construction are one atomic step.
        match self.entries.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_fresh(now, self.ttl) {
                    let resource = occupied.get().resource().clone();
                    drop(occupied);
                    telemetry::hit("per_key", &resource);
                    resource
                } else {
                    let resource =
                        telemetry::construct(&self.factory, &self.clock, "per_key", Cause::Expired);
                    occupied.insert(Stamped::new(resource.clone(), self.clock.instant()));
                    resource
                }
            }
            Entry::Vacant(vacant) => {
                let resource =
                    telemetry::construct(&self.factory, &self.clock, "per_key", Cause::Miss);
                vacant.insert(Stamped::new(resource.clone(), self.clock.instant()));
                resource
            }
        }
    }
}
