// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::Resource;

/// The read-through contract shared by every locking strategy.
///
/// All caches in this crate expose the same single operation; they differ
/// only in how they guard the check-then-construct sequence. Code that does
/// not care which strategy is in use can take any `ResourceCache`.
///
/// # Contract
///
/// For a call to [`get`][Self::get] with key `k`:
///
/// 1. If a live entry for `k` exists and its age does not exceed the TTL,
///    the entry's resource is returned and the factory is not invoked.
/// 2. If no entry exists, or the live entry has gone stale, the factory is
///    invoked and the new resource is stored under `k` with a current
///    timestamp, then returned.
/// 3. Repeated calls with the same key inside the TTL window return equal
///    resources without additional constructions.
/// 4. `get` never blocks indefinitely and never deadlocks, regardless of
///    how calls interleave.
///
/// Entries are never removed; a stale entry stays in the map until a `get`
/// for its key overwrites it. How many constructions *concurrent* callers
/// can trigger for one key is the property that distinguishes the
/// strategies; see the documentation of each implementation.
///
/// # Examples
///
/// ```
/// use refresh_cache::{Resource, ResourceCache, ResourceFactory};
///
/// fn serial_for_key(cache: &impl ResourceCache<String>, key: &str) -> u64 {
///     cache.get(&key.to_string()).serial()
/// }
///
/// let factory = ResourceFactory::new();
/// let cache = refresh_cache::CacheBuilder::new(factory).build_per_key();
///
/// assert_eq!(serial_for_key(&cache, "altimeter"), 1);
/// assert_eq!(serial_for_key(&cache, "altimeter"), 1);
/// assert_eq!(serial_for_key(&cache, "gyroscope"), 2);
/// ```
pub trait ResourceCache<K> {
    /// Returns the cached resource for `key`, constructing it first if the
    /// key is absent or its entry has gone stale.
    fn get(&self, key: &K) -> Resource;
}
