// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![expect(clippy::unwrap_used, reason = "example code")]

//! Drives a `Clock` through a manual timeline with `ClockControl`.

use std::time::Duration;

use tempo::ClockControl;

fn main() {
    let control = ClockControl::new();
    let clock = control.to_clock();

    // A controlled clock is frozen: reads repeat until the control moves.
    let opened = clock.system_time();
    assert_eq!(clock.system_time(), opened);

    // Every clone of the clock follows the same timeline.
    let twin = clock.clone();
    control.advance(Duration::from_secs(30));
    assert_eq!(twin.system_time().duration_since(opened).unwrap(), Duration::from_secs(30));

    // Stopwatches started from a controlled clock measure controlled time.
    let stopwatch = clock.stopwatch();
    assert_eq!(stopwatch.elapsed(), Duration::ZERO);

    control.advance_millis(250);
    assert_eq!(stopwatch.elapsed(), Duration::from_millis(250));

    // With auto_advance the timeline steps forward on every read.
    let stepping = ClockControl::new().auto_advance(Duration::from_millis(10)).to_clock();
    let first = stepping.instant();
    let second = stepping.instant();
    let third = stepping.instant();

    assert_eq!(second.saturating_duration_since(first), Duration::from_millis(10));
    assert_eq!(third.saturating_duration_since(first), Duration::from_millis(20));
}
