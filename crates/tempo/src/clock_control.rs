// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime};

use crate::Clock;

const OUT_OF_RANGE: &str = "time advanced outside of the representable range";

/// Controls the flow of time in tests.
///
/// A `ClockControl` owns a manual timeline: a monotonic instant and a
/// wall-clock time that move only when one of the `advance` methods is
/// called, or automatically by a fixed step per read when
/// [`auto_advance`][Self::auto_advance] is configured. Clocks created via
/// [`to_clock`][Self::to_clock] read this timeline instead of the system
/// clock. `ClockControl` is available when the `test-util` feature is
/// enabled.
///
/// The timeline starts at the moment the control is created, with the
/// wall-clock component at [`SystemTime::UNIX_EPOCH`]. Clones of a control
/// share one timeline.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use tempo::ClockControl;
///
/// let control = ClockControl::new();
/// let clock = control.to_clock();
///
/// let start = clock.instant();
/// control.advance(Duration::from_secs(1));
///
/// assert_eq!(clock.instant().saturating_duration_since(start), Duration::from_secs(1));
/// ```
///
/// # Production code and `ClockControl`
///
/// Enable the `test-util` feature only through `dev-dependencies`. The
/// controlled timeline adds a branch and a mutex to every time read, which
/// production clocks do not pay.
#[derive(Debug, Clone, Default)]
pub struct ClockControl {
    // Time control must be observed consistently across threads, so the
    // timeline lives behind a mutex shared by all clones.
    state: Arc<Mutex<State>>,
}

impl ClockControl {
    /// Creates a new `ClockControl` with time frozen at the current instant.
    ///
    /// The wall-clock component starts at [`SystemTime::UNIX_EPOCH`]; use
    /// [`new_at`][Self::new_at] to start it elsewhere.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::new())),
        }
    }

    /// Creates a new `ClockControl` with the wall clock set to the given
    /// time.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::{Duration, SystemTime};
    ///
    /// use tempo::ClockControl;
    ///
    /// let start = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
    /// let control = ClockControl::new_at(start);
    ///
    /// assert_eq!(control.to_clock().system_time(), start);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the given time precedes [`SystemTime::UNIX_EPOCH`].
    #[must_use]
    pub fn new_at(time: impl Into<SystemTime>) -> Self {
        let this = Self::new();
        let offset = time
            .into()
            .duration_since(SystemTime::UNIX_EPOCH)
            .expect("the starting time must not precede the UNIX epoch");
        this.advance(offset);
        this
    }

    /// Converts the `ClockControl` to a [`Clock`] reading its timeline.
    #[must_use]
    pub fn to_clock(&self) -> Clock {
        Clock::with_control(self)
    }

    /// Sets the duration by which the timeline advances on every read.
    ///
    /// Each call to [`Clock::instant`] or [`Clock::system_time`] returns the
    /// current time and then moves the timeline forward by `duration`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use tempo::ClockControl;
    ///
    /// let clock = ClockControl::new().auto_advance(Duration::from_secs(1)).to_clock();
    ///
    /// let first = clock.instant();
    /// let second = clock.instant();
    ///
    /// assert_eq!(second.saturating_duration_since(first), Duration::from_secs(1));
    /// ```
    #[must_use]
    pub fn auto_advance(self, duration: Duration) -> Self {
        self.with_state(|s| s.auto_advance = duration);
        self
    }

    /// Manually advances the timeline by the specified number of
    /// milliseconds.
    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    /// Manually advances the timeline by the specified duration.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use tempo::ClockControl;
    ///
    /// let control = ClockControl::new();
    /// let clock = control.to_clock();
    ///
    /// let start = clock.system_time();
    /// control.advance(Duration::from_secs(60));
    ///
    /// assert_eq!(clock.system_time(), start + Duration::from_secs(60));
    /// ```
    pub fn advance(&self, duration: Duration) {
        self.with_state(|s| s.advance(duration));
    }

    pub(crate) fn instant(&self) -> Instant {
        self.with_state(State::instant)
    }

    pub(crate) fn system_time(&self) -> SystemTime {
        self.with_state(State::system_time)
    }

    fn with_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut State) -> R,
    {
        f(&mut self.state.lock().expect("acquiring the time lock must always succeed"))
    }
}

impl From<ClockControl> for Clock {
    fn from(control: ClockControl) -> Self {
        control.to_clock()
    }
}

impl From<&ClockControl> for Clock {
    fn from(control: &ClockControl) -> Self {
        control.to_clock()
    }
}

#[derive(Debug)]
struct State {
    instant: Instant,
    system_time: SystemTime,
    auto_advance: Duration,
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl State {
    fn new() -> Self {
        Self {
            instant: Instant::now(),
            system_time: SystemTime::UNIX_EPOCH,
            auto_advance: Duration::ZERO,
        }
    }

    fn instant(&mut self) -> Instant {
        let instant = self.instant;
        self.advance_auto();
        instant
    }

    fn system_time(&mut self) -> SystemTime {
        let time = self.system_time;
        self.advance_auto();
        time
    }

    fn advance_auto(&mut self) {
        let step = self.auto_advance;
        self.advance(step);
    }

    fn advance(&mut self, duration: Duration) {
        if duration == Duration::ZERO {
            return;
        }

        self.instant = self.instant.checked_add(duration).expect(OUT_OF_RANGE);
        self.system_time = self.system_time.checked_add(duration).expect(OUT_OF_RANGE);
    }
}

#[cfg(test)]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(ClockControl: Send, Sync, Clone);

    #[test]
    fn test_advance_moves_instant_and_system_time() {
        let control = ClockControl::new();
        let clock = control.to_clock();

        let instant = clock.instant();
        let time = clock.system_time();

        control.advance(Duration::from_millis(250));

        assert_eq!(clock.instant().saturating_duration_since(instant), Duration::from_millis(250));
        assert_eq!(clock.system_time(), time + Duration::from_millis(250));
    }

    #[test]
    fn test_advance_millis_matches_advance() {
        let control = ClockControl::new();
        let clock = control.to_clock();

        let start = clock.instant();
        control.advance_millis(42);

        assert_eq!(clock.instant().saturating_duration_since(start), Duration::from_millis(42));
    }

    #[test]
    fn test_auto_advance_steps_per_read() {
        let clock = ClockControl::new().auto_advance(Duration::from_secs(1)).to_clock();

        let first = clock.instant();
        let second = clock.instant();
        let third = clock.instant();

        assert_eq!(second.saturating_duration_since(first), Duration::from_secs(1));
        assert_eq!(third.saturating_duration_since(second), Duration::from_secs(1));
    }

    #[test]
    fn test_auto_advance_applies_to_system_time() {
        let clock = ClockControl::new().auto_advance(Duration::from_millis(10)).to_clock();

        let first = clock.system_time();
        let second = clock.system_time();

        assert_eq!(second, first + Duration::from_millis(10));
    }

    #[test]
    fn test_new_starts_at_unix_epoch() {
        let clock = ClockControl::new().to_clock();

        assert_eq!(clock.system_time(), SystemTime::UNIX_EPOCH);
    }

    #[test]
    fn test_default_matches_new() {
        let control = ClockControl::default();
        let clock = control.to_clock();

        assert_eq!(clock.system_time(), SystemTime::UNIX_EPOCH);

        let before = clock.instant();
        control.advance_millis(15);

        assert_eq!(clock.instant().saturating_duration_since(before), Duration::from_millis(15));
    }

    #[test]
    fn test_new_at_starts_at_given_time() {
        let start = SystemTime::UNIX_EPOCH + Duration::from_secs(86_400);
        let clock = ClockControl::new_at(start).to_clock();

        assert_eq!(clock.system_time(), start);
    }

    #[test]
    fn test_zero_advance_is_a_no_op() {
        let control = ClockControl::new();
        let clock = control.to_clock();

        let before = clock.instant();
        control.advance(Duration::ZERO);

        assert_eq!(clock.instant(), before);
    }

    #[test]
    fn test_clones_share_state() {
        let control = ClockControl::new();
        let clone = control.clone();
        let clock = control.to_clock();

        let start = clock.instant();
        clone.advance(Duration::from_secs(3));

        assert_eq!(clock.instant().saturating_duration_since(start), Duration::from_secs(3));
    }

    #[test]
    fn test_from_conversions() {
        let control = ClockControl::new();

        let by_ref: Clock = (&control).into();
        let by_value: Clock = control.into();

        assert_eq!(by_ref.instant(), by_value.instant());
    }
}
