// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::hash::Hash;
use std::time::Duration;

use hashbrown::HashMap;
use parking_lot::RwLock;
use tempo::Clock;

use crate::cache::ResourceCache;
use crate::entry::Stamped;
use crate::factory::{Resource, ResourceFactory};
use crate::telemetry::{self, Cause};

/// A cache guarded by a reader/writer lock: shared-read checks with an
/// always-construct write path.
///
/// Fresh hits take only a read lock, so they proceed in parallel. A miss or
/// a stale entry releases the read lock and enters the write path, which
/// takes the write lock and **unconditionally** constructs and stores a
/// fresh resource. The write path never re-checks whether another caller
/// refreshed the entry in the meantime; always-refresh keeps the writer
/// logic free of a second staleness decision.
///
/// # Accepted race
///
/// The upgrade from reader to writer is a release followed by an acquire,
/// not an atomic upgrade. Every reader that saw the same miss or stale entry
/// enters the write path, so N such readers construct N resources one after
/// another, each overwriting the previous. The factory runs under the write
/// lock, which serializes the constructions and keeps the resource and its
/// timestamp atomic with respect to all readers. Subsequent reads converge
/// on the last write. Use [`PerKeyCache`][crate::PerKeyCache] when duplicate
/// construction must be ruled out.
///
/// # Examples
///
/// ```
/// use refresh_cache::{ReadWriteLockCache, ResourceCache, ResourceFactory};
///
/// let cache = ReadWriteLockCache::new(ResourceFactory::new());
///
/// let first = cache.get(&"thruster");
/// let again = cache.get(&"thruster");
///
/// assert_eq!(first, again);
/// ```
pub struct ReadWriteLockCache<K> {
    entries: RwLock<HashMap<K, Stamped>>,
    factory: ResourceFactory,
    clock: Clock,
    ttl: Duration,
}

impl<K> std::fmt::Debug for ReadWriteLockCache<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadWriteLockCache")
            .field("len", &self.entries.read().len())
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl<K: Eq + Hash + Clone> ReadWriteLockCache<K> {
    /// Creates a cache with the default configuration: entries never expire
    /// and timestamps come from the system clock.
    ///
    /// Use [`CacheBuilder`][crate::CacheBuilder] to configure a TTL or
    /// inject a clock.
    #[must_use]
    pub fn new(factory: ResourceFactory) -> Self {
        crate::CacheBuilder::new(factory).build_read_write()
    }

    pub(crate) fn from_parts(factory: ResourceFactory, clock: Clock, ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            factory,
            clock,
            ttl,
        }
    }

    /// Returns the number of keys with a live entry, fresh or stale.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if no entry has been stored yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
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

    // The write path: construct under the write lock, store, return. Runs
    // for every caller whose read-side check failed, with no re-check, so
    // back-to-back writers each refresh the entry again.
    fn refresh(&self, key: &K, cause: Cause) -> Resource {
        let mut entries = self.entries.write();
        let resource = telemetry::construct(&self.factory, &self.clock, "read_write_lock", cause);
        entries.insert(key.clone(), Stamped::new(resource.clone(), self.clock.instant()));
        resource
    }
}

impl<K: Eq + Hash + Clone> ResourceCache<K> for ReadWriteLockCache<K> {
    fn get(&self, key: &K) -> Resource {
        let now = self.clock.instant();

        // Read section: presence and freshness under a shared lock.
        let cause = {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(stamped) if stamped.is_fresh(now, self.ttl) => {
                    let resource = stamped.resource().clone();
                    drop(entries);
                    telemetry::hit("read_write_lock", &resource);
                    return resource;
                }
                Some(_) => Cause::Expired,
                None => Cause::Miss,
            }
        };

        // The read lock is gone; whatever happens between here and the
        // write lock, the write path constructs its own fresh resource.
        self.refresh(key, cause)
    }
}

#[cfg(test)]
mod tests {
    use static_assertions::assert_impl_all;
    use tempo::ClockControl;

    use super::*;
    use crate::CacheBuilder;

    assert_impl_all!(ReadWriteLockCache<String>: Send, Sync);

    #[test]
    fn test_miss_constructs_and_caches() {
        let factory = ResourceFactory::new();
        let cache = ReadWriteLockCache::new(factory.clone());

        let resource = cache.get(&"pump");

        assert_eq!(resource.serial(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(factory.max_serial(), 1);
    }

    #[test]
    fn test_hit_returns_cached_resource_without_construction() {
        let factory = ResourceFactory::new();
        let cache = ReadWriteLockCache::new(factory.clone());

        let first = cache.get(&"pump");
        let second = cache.get(&"pump");

        assert_eq!(first, second);
        assert_eq!(factory.max_serial(), 1);
    }

    #[test]
    fn test_distinct_keys_get_distinct_resources() {
        let cache = ReadWriteLockCache::new(ResourceFactory::new());

        let pump = cache.get(&"pump");
        let valve = cache.get(&"valve");

        assert_ne!(pump, valve);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_stale_entry_is_rebuilt_in_place() {
        let control = ClockControl::new();
        let factory = ResourceFactory::new();
        let cache = CacheBuilder::new(factory.clone())
            .ttl_millis(50)
            .clock(control.to_clock())
            .build_read_write();

        let first = cache.get(&"pump");
        control.advance_millis(60);
        let second = cache.get(&"pump");

        assert_ne!(first, second);
        assert_eq!(second.serial(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_sequential_reads_do_not_refresh_fresh_entries() {
        let control = ClockControl::new();
        let factory = ResourceFactory::new();
        let cache = CacheBuilder::new(factory.clone())
            .ttl_millis(100)
            .clock(control.to_clock())
            .build_read_write();

        let first = cache.get(&"pump");
        for _ in 0..10 {
            control.advance_millis(5);
            assert_eq!(cache.get(&"pump"), first);
        }

        assert_eq!(factory.max_serial(), 1);
    }

    #[test]
    fn test_accessors_expose_the_injected_clock_and_factory() {
        let control = ClockControl::new();
        let factory = ResourceFactory::new();
        let cache = CacheBuilder::new(factory.clone())
            .clock(control.to_clock())
            .build_read_write();

        let _resource = cache.get(&"pump");
        assert_eq!(cache.factory().max_serial(), 1);
        assert_eq!(cache.factory().max_serial(), factory.max_serial());

        let before = cache.clock().instant();
        control.advance_millis(40);
        assert_eq!(
            cache.clock().instant().saturating_duration_since(before),
            Duration::from_millis(40)
        );
    }

    #[test]
    fn test_debug_reports_len_and_ttl() {
        let cache = ReadWriteLockCache::<&str>::new(ResourceFactory::new());

        let rendered = format!("{cache:?}");

        assert!(rendered.contains("ReadWriteLockCache"));
        assert!(rendered.contains("ttl"));
    }
}
