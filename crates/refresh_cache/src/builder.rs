// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::hash::Hash;
use std::marker::PhantomData;
use std::time::Duration;

use tempo::Clock;

use crate::factory::ResourceFactory;
use crate::{ExclusiveLockCache, PerKeyCache, ReadWriteLockCache};

/// Configures and builds a cache over a [`ResourceFactory`].
///
/// The builder owns the knobs every strategy shares: the TTL and the time
/// source. The strategy itself is picked by the terminal method, so the same
/// configuration can be replayed against different locking disciplines.
///
/// The TTL is fixed once the cache is built. There is deliberately no way to
/// change it afterwards: a TTL that mutates while traffic is in flight has
/// no well-defined meaning, so the configuration window is the builder and
/// nothing else.
///
/// # Defaults
///
/// - `ttl`: [`Duration::MAX`], entries never expire.
/// - `clock`: the system clock.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use refresh_cache::{CacheBuilder, ResourceCache, ResourceFactory};
/// use tempo::ClockControl;
///
/// let control = ClockControl::new();
/// let factory = ResourceFactory::new();
///
/// let cache = CacheBuilder::new(factory.clone())
///     .ttl(Duration::from_millis(50))
///     .clock(control.to_clock())
///     .build_exclusive();
///
/// let first = cache.get(&"reading");
///
/// // Within the TTL the same resource is served back.
/// control.advance_millis(50);
/// assert_eq!(cache.get(&"reading"), first);
///
/// // Once the entry's age exceeds the TTL, the next get rebuilds it.
/// control.advance_millis(1);
/// assert_ne!(cache.get(&"reading"), first);
/// assert_eq!(factory.max_serial(), 2);
/// ```
#[derive(Debug)]
pub struct CacheBuilder<K> {
    factory: ResourceFactory,
    clock: Clock,
    ttl: Duration,
    _marker: PhantomData<K>,
}

impl<K> CacheBuilder<K> {
    /// Creates a builder over `factory` with the default configuration.
    #[must_use]
    pub fn new(factory: ResourceFactory) -> Self {
        Self {
            factory,
            clock: Clock::new(),
            ttl: Duration::MAX,
            _marker: PhantomData,
        }
    }

    /// Sets how old an entry may grow before a `get` rebuilds it.
    ///
    /// An entry is stale strictly when its age *exceeds* `ttl`; an age of
    /// exactly `ttl` is still fresh. The default of [`Duration::MAX`] means
    /// entries never expire.
    #[must_use]
    pub const fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the TTL in milliseconds. See [`ttl`][Self::ttl].
    #[must_use]
    pub const fn ttl_millis(self, millis: u64) -> Self {
        self.ttl(Duration::from_millis(millis))
    }

    /// Sets the clock that supplies entry timestamps.
    ///
    /// Defaults to the system clock; tests inject a controlled clock from
    /// `tempo::ClockControl` to drive expiry deterministically.
    #[must_use]
    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

impl<K: Eq + Hash + Clone> CacheBuilder<K> {
    /// Builds an [`ExclusiveLockCache`]: one mutex, check and store in two
    /// separate critical sections.
    #[must_use]
    pub fn build_exclusive(self) -> ExclusiveLockCache<K> {
        ExclusiveLockCache::from_parts(self.factory, self.clock, self.ttl)
    }

    /// Builds a [`ReadWriteLockCache`]: shared-read checks with an
    /// always-construct write path.
    #[must_use]
    pub fn build_read_write(self) -> ReadWriteLockCache<K> {
        ReadWriteLockCache::from_parts(self.factory, self.clock, self.ttl)
    }

    /// Builds a [`PerKeyCache`]: check and replacement as one atomic
    /// per-key operation.
    #[must_use]
    pub fn build_per_key(self) -> PerKeyCache<K> {
        PerKeyCache::from_parts(self.factory, self.clock, self.ttl)
    }
}
