// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::{Duration, Instant};

use crate::Clock;

/// Measures elapsed time against the clock that created it.
///
/// An instance of `Stopwatch` is created by calling [`Clock::stopwatch`] or
/// by passing a [`Clock`] to [`Stopwatch::new`]. Without the `test-util`
/// feature the stopwatch is a plain captured [`Instant`]; with it, the
/// stopwatch keeps its clock so controlled time is respected.
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
#[derive(Debug)]
pub struct Stopwatch(StopwatchRepr);

#[derive(Debug)]
enum StopwatchRepr {
    #[cfg(not(any(feature = "test-util", test)))]
    System(Instant),
    #[cfg(any(feature = "test-util", test))]
    Clock(Clock, Instant),
}

impl Stopwatch {
    /// Creates a stopwatch that starts measuring elapsed time now.
    #[cfg_attr(
        not(any(feature = "test-util", test)),
        expect(unused_variables, reason = "the clock handle is only retained when controlled time is compiled in")
    )]
    #[must_use]
    pub fn new(clock: &Clock) -> Self {
        #[cfg(any(feature = "test-util", test))]
        let repr = StopwatchRepr::Clock(clock.clone(), clock.instant());

        #[cfg(not(any(feature = "test-util", test)))]
        let repr = StopwatchRepr::System(Instant::now());

        Self(repr)
    }

    /// Returns the elapsed time since the stopwatch was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        match &self.0 {
            #[cfg(not(any(feature = "test-util", test)))]
            StopwatchRepr::System(start) => start.elapsed(),

            #[cfg(any(feature = "test-util", test))]
            StopwatchRepr::Clock(clock, start) => clock.instant().saturating_duration_since(*start),
        }
    }
}

impl From<Stopwatch> for Duration {
    fn from(stopwatch: Stopwatch) -> Self {
        stopwatch.elapsed()
    }
}
