// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;
use std::time::{Instant, SystemTime};

/// Reads the current time, either from the system or from a controlled
/// timeline.
///
/// A clock constructed with [`Clock::new`] is a passthrough to the operating
/// system: [`instant`][Self::instant] reads [`Instant::now`] and
/// [`system_time`][Self::system_time] reads [`SystemTime::now`]. A clock
/// obtained from a [`ClockControl`][crate::ClockControl] (with the
/// `test-util` feature) instead reads a manual timeline that only moves when
/// the control advances it.
///
/// Cloning a clock is inexpensive (an `Arc` clone) and every clone shares the
/// same underlying state. For a controlled clock this means all clones
/// observe each advancement at the same moment.
///
/// # Examples
///
/// ```
/// use std::time::SystemTime;
///
/// use tempo::Clock;
///
/// # fn read_time(clock: &Clock) {
/// let time1: SystemTime = clock.system_time();
/// let time2: SystemTime = clock.system_time();
///
/// assert!(time2 >= time1);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Clock(Arc<ClockState>);

#[derive(Debug)]
enum ClockState {
    #[cfg(any(feature = "test-util", test))]
    Control(crate::ClockControl),
    System,
}

impl Clock {
    /// Creates a clock that reads the system time.
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(ClockState::System))
    }

    #[cfg(any(feature = "test-util", test))]
    pub(crate) fn with_control(control: &crate::ClockControl) -> Self {
        Self(Arc::new(ClockState::Control(control.clone())))
    }

    /// Creates a clock whose time does not pass.
    ///
    /// This is a convenience method equivalent to
    /// `ClockControl::new().to_clock()`; the returned clock always reports
    /// the same instant. Use [`ClockControl`][crate::ClockControl] directly
    /// when the test needs to advance time.
    ///
    /// # Examples
    ///
    /// ```
    /// use tempo::Clock;
    ///
    /// let clock = Clock::new_frozen();
    ///
    /// assert_eq!(clock.instant(), clock.instant());
    /// ```
    #[cfg(any(feature = "test-util", test))]
    #[cfg_attr(docsrs, doc(cfg(feature = "test-util")))]
    #[must_use]
    pub fn new_frozen() -> Self {
        crate::ClockControl::new().to_clock()
    }

    /// Retrieves the current monotonic time.
    ///
    /// > **Important**: When measuring elapsed time against a previously
    /// > retrieved instant, use [`Instant::saturating_duration_since`] rather
    /// > than `Instant::elapsed`. The `elapsed` method bypasses the clock and
    /// > reads system time directly, so it does not respect controlled time
    /// > in tests. Better yet, use a [`Stopwatch`][crate::Stopwatch].
    ///
    /// # Examples
    ///
    /// ```
    /// use tempo::Clock;
    ///
    /// # fn read_instants(clock: &Clock) {
    /// let instant1 = clock.instant();
    /// let instant2 = clock.instant();
    ///
    /// assert!(instant2 >= instant1);
    /// # }
    /// ```
    #[must_use]
    pub fn instant(&self) -> Instant {
        match &*self.0 {
            #[cfg(any(feature = "test-util", test))]
            ClockState::Control(control) => control.instant(),
            ClockState::System => Instant::now(),
        }
    }

    /// Retrieves the current wall-clock time.
    ///
    /// > **Note**: The system time is not monotonic and can move backwards
    /// > when the system clock changes. For relative measurements, prefer
    /// > [`instant`][Self::instant] or a [`Stopwatch`][crate::Stopwatch].
    #[must_use]
    pub fn system_time(&self) -> SystemTime {
        match &*self.0 {
            #[cfg(any(feature = "test-util", test))]
            ClockState::Control(control) => control.system_time(),
            ClockState::System => SystemTime::now(),
        }
    }

    /// Creates a [`Stopwatch`][crate::Stopwatch] that starts measuring
    /// elapsed time now.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use tempo::Clock;
    ///
    /// # fn measure(clock: &Clock) -> Duration {
    /// let stopwatch = clock.stopwatch();
    /// // Perform some operation...
    /// stopwatch.elapsed()
    /// # }
    /// ```
    #[must_use]
    pub fn stopwatch(&self) -> crate::Stopwatch {
        crate::Stopwatch::new(self)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
