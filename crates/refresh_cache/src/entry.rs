// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::{Duration, Instant};

use crate::Resource;

/// A cached resource together with the time it was last constructed.
///
/// Every strategy stores one `Stamped` per key, so the resource and its
/// timestamp are always written and read as a unit.
#[derive(Debug, Clone)]
pub(crate) struct Stamped {
    resource: Resource,
    refreshed_at: Instant,
}

impl Stamped {
    pub(crate) fn new(resource: Resource, refreshed_at: Instant) -> Self {
        Self { resource, refreshed_at }
    }

    pub(crate) fn resource(&self) -> &Resource {
        &self.resource
    }

    /// An entry is fresh until its age *exceeds* the TTL; an age exactly
    /// equal to the TTL is still fresh. With `Duration::MAX` the entry never
    /// goes stale.
    pub(crate) fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.refreshed_at) <= ttl
    }
}

#[cfg(test)]
mod tests {
    use tempo::ClockControl;

    use super::*;

    fn stamped_now(control: &ClockControl) -> (Stamped, tempo::Clock) {
        let clock = control.to_clock();
        let stamped = Stamped::new(Resource::new(1), clock.instant());
        (stamped, clock)
    }

    #[test]
    fn test_fresh_within_ttl() {
        let control = ClockControl::new();
        let (stamped, clock) = stamped_now(&control);

        control.advance_millis(40);

        assert!(stamped.is_fresh(clock.instant(), Duration::from_millis(50)));
    }

    #[test]
    fn test_age_equal_to_ttl_is_fresh() {
        let control = ClockControl::new();
        let (stamped, clock) = stamped_now(&control);

        control.advance_millis(50);

        assert!(stamped.is_fresh(clock.instant(), Duration::from_millis(50)));
    }

    #[test]
    fn test_stale_once_age_exceeds_ttl() {
        let control = ClockControl::new();
        let (stamped, clock) = stamped_now(&control);

        control.advance_millis(51);

        assert!(!stamped.is_fresh(clock.instant(), Duration::from_millis(50)));
    }

    #[test]
    fn test_max_ttl_never_goes_stale() {
        let control = ClockControl::new();
        let (stamped, clock) = stamped_now(&control);

        control.advance(Duration::from_secs(60 * 60 * 24 * 365));

        assert!(stamped.is_fresh(clock.instant(), Duration::MAX));
    }

    #[test]
    fn test_zero_ttl_is_fresh_only_at_the_same_instant() {
        let control = ClockControl::new();
        let (stamped, clock) = stamped_now(&control);

        assert!(stamped.is_fresh(clock.instant(), Duration::ZERO));

        control.advance_millis(1);

        assert!(!stamped.is_fresh(clock.instant(), Duration::ZERO));
    }
}
