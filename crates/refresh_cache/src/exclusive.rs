// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::hash::Hash;
use std::time::Duration;

use hashbrown::HashMap;
use parking_lot::Mutex;
use tempo::Clock;

use crate::cache::ResourceCache;
use crate::entry::Stamped;
use crate::factory::{Resource, ResourceFactory};
use crate::telemetry::{self, Cause};

/// A cache guarded by one mutex, with the check and the store in two
/// separate critical sections.
///
/// A `get` first takes the lock only to check for a fresh entry, then
/// releases it. On a miss or a stale entry the factory runs with no lock
/// held, and a second critical section stores the result. Readers therefore
/// never wait behind a construction, at a cost:
///
/// # Accepted race
///
/// Between the two critical sections another caller may construct and store
/// its own resource for the same key. This strategy does not re-check; the
/// last writer wins. Concurrent first-time callers for one key can each
/// invoke the factory, so duplicate serial numbers are issued, and every
/// caller returns the resource it constructed. All *subsequent* reads
/// converge on whichever write landed last. Use [`PerKeyCache`][crate::PerKeyCache]
/// when duplicate construction must be ruled out.
///
/// # Examples
///
/// ```
/// use refresh_cache::{ExclusiveLockCache, ResourceCache, ResourceFactory};
///
/// let cache = ExclusiveLockCache::new(ResourceFactory::new());
///
/// let first = cache.get(&"thruster");
/// let again = cache.get(&"thruster");
///
/// assert_eq!(first, again);
/// ```
pub struct ExclusiveLockCache<K> {
    entries: Mutex<HashMap<K, Stamped>>,
    factory: ResourceFactory,
    clock: Clock,
    ttl: Duration,
}

impl<K> std::fmt::Debug for ExclusiveLockCache<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExclusiveLockCache")
            .field("len", &self.entries.lock().len())
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl<K: Eq + Hash + Clone> ExclusiveLockCache<K> {
    /// Creates a cache with the default configuration: entries never expire
    /// and timestamps come from the system clock.
    ///
    /// Use [`CacheBuilder`][crate::CacheBuilder] to configure a TTL or
    /// inject a clock.
    #[must_use]
    pub fn new(factory: ResourceFactory) -> Self {
        crate::CacheBuilder::new(factory).build_exclusive()
    }

    pub(crate) fn from_parts(factory: ResourceFactory, clock: Clock, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            factory,
            clock,
            ttl,
        }
    }

    /// Returns the number of keys with a live entry, fresh or stale.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if no entry has been stored yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
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

impl<K: Eq + Hash + Clone> ResourceCache<K> for ExclusiveLockCache<K> {
    fn get(&self, key: &K) -> Resource {
        let now = self.clock.instant();

        // First critical section: check only.
        let cause = {
            let entries = self.entries.lock();
            match entries.get(key) {
                Some(stamped) if stamped.is_fresh(now, self.ttl) => {
                    let resource = stamped.resource().clone();
                    drop(entries);
                    telemetry::hit("exclusive_lock", &resource);
                    return resource;
                }
                Some(_) => Cause::Expired,
                None => Cause::Miss,
            }
        };

        // The lock is not held while the factory runs; a concurrent caller
        // may store its own resource first and this write will replace it.
        let resource = telemetry::construct(&self.factory, &self.clock, "exclusive_lock", cause);

        // Second critical section: store, last writer wins.
        let stamped = Stamped::new(resource.clone(), self.clock.instant());
        self.entries.lock().insert(key.clone(), stamped);

        resource
    }
}
