// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The resource factory and the resources it produces.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

/// An expensive-to-construct resource identified by a serial number.
///
/// Resources are produced exclusively by a [`ResourceFactory`]; there is no
/// other way to obtain one. Each construction is assigned the next serial
/// number from the factory's counter, so two separate constructions are
/// never equal while clones of one construction always are. Equality,
/// ordering, and hashing all follow the serial number.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Resource {
    serial: u64,
}

impl Resource {
    pub(crate) fn new(serial: u64) -> Self {
        Self { serial }
    }

    /// Returns the serial number assigned at construction.
    ///
    /// Serial numbers start at 1 and are unique across all resources
    /// produced by one factory (and its clones).
    #[must_use]
    pub fn serial(&self) -> u64 {
        self.serial
    }
}

/// Produces [`Resource`]s with strictly increasing serial numbers.
///
/// The factory is a cheap-clone handle over a shared atomic counter: clones
/// draw serials from the same sequence, which lets a test keep a handle to
/// the counter a cache is using. Across any number of threads the issued
/// serials are unique and gapless, starting at 1.
///
/// Construction is infallible. Real factories are expensive because they do
/// real work; this one can simulate that cost with an optional artificial
/// delay (see [`with_delay`][Self::with_delay]), which widens race windows
/// in concurrency tests without affecting correctness.
///
/// # Examples
///
/// ```
/// use refresh_cache::ResourceFactory;
///
/// let factory = ResourceFactory::new();
///
/// let first = factory.create();
/// let second = factory.create();
///
/// assert_eq!(first.serial(), 1);
/// assert_eq!(second.serial(), 2);
/// assert_eq!(factory.max_serial(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResourceFactory {
    state: Arc<FactoryState>,
}

#[derive(Debug, Default)]
struct FactoryState {
    serials: AtomicU64,
    delay: Duration,
}

impl ResourceFactory {
    /// Creates a factory with no artificial construction delay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a factory whose every construction takes at least `delay`.
    ///
    /// The serial number is assigned before the delay, so concurrent
    /// constructions claim their identities immediately and then spend the
    /// delay "working".
    #[must_use]
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            state: Arc::new(FactoryState {
                serials: AtomicU64::new(0),
                delay,
            }),
        }
    }

    /// Constructs a new [`Resource`] with the next serial number.
    ///
    /// Never fails and never returns a previously issued serial.
    #[must_use]
    pub fn create(&self) -> Resource {
        let serial = self.state.serials.fetch_add(1, Ordering::AcqRel) + 1;
        self.simulate_work();
        Resource::new(serial)
    }

    /// Returns the highest serial number issued so far.
    ///
    /// The value is a non-decreasing snapshot: it may lag constructions that
    /// are concurrently in flight, but it never runs ahead of them. Returns
    /// 0 before the first construction.
    #[must_use]
    pub fn max_serial(&self) -> u64 {
        self.state.serials.load(Ordering::Acquire)
    }

    // Stands in for the expensive part of construction.
    #[cfg_attr(test, mutants::skip)] // wall-clock behavior is not asserted in tests
    fn simulate_work(&self) {
        if !self.state.delay.is_zero() {
            thread::sleep(self.state.delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Resource: Send, Sync, Clone);
    assert_impl_all!(ResourceFactory: Send, Sync, Clone);

    #[test]
    fn test_serials_start_at_one_and_increase() {
        let factory = ResourceFactory::new();

        assert_eq!(factory.max_serial(), 0);
        assert_eq!(factory.create().serial(), 1);
        assert_eq!(factory.create().serial(), 2);
        assert_eq!(factory.create().serial(), 3);
        assert_eq!(factory.max_serial(), 3);
    }

    #[test]
    fn test_clones_share_the_counter() {
        let factory = ResourceFactory::new();
        let clone = factory.clone();

        assert_eq!(factory.create().serial(), 1);
        assert_eq!(clone.create().serial(), 2);
        assert_eq!(factory.max_serial(), 2);
        assert_eq!(clone.max_serial(), 2);
    }

    #[test]
    fn test_resources_compare_by_serial() {
        let factory = ResourceFactory::new();

        let first = factory.create();
        let second = factory.create();

        assert_ne!(first, second);
        assert!(first < second);
        assert_eq!(first, first.clone());
    }

    #[test]
    fn test_concurrent_creates_issue_unique_gapless_serials() {
        const THREADS: u64 = 8;
        const PER_THREAD: u64 = 100;

        let factory = ResourceFactory::new();

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let factory = factory.clone();
                std::thread::spawn(move || (0..PER_THREAD).map(|_| factory.create().serial()).collect::<Vec<_>>())
            })
            .collect();

        let mut serials = HashSet::new();
        for handle in handles {
            for serial in handle.join().expect("thread should not panic") {
                assert!(serials.insert(serial), "serial {serial} issued twice");
            }
        }

        assert_eq!(serials.len() as u64, THREADS * PER_THREAD);
        assert_eq!(factory.max_serial(), THREADS * PER_THREAD);
        assert!(serials.contains(&1));
        assert!(serials.contains(&(THREADS * PER_THREAD)));
    }

    #[test]
    fn test_max_serial_never_decreases() {
        let factory = ResourceFactory::new();

        let mut previous = factory.max_serial();
        for _ in 0..10 {
            let _resource = factory.create();
            let current = factory.max_serial();
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn test_delayed_factory_issues_correct_serials() {
        let factory = ResourceFactory::with_delay(Duration::from_millis(1));

        assert_eq!(factory.create().serial(), 1);
        assert_eq!(factory.create().serial(), 2);
    }
}
