// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A synchronous time source that can be manually controlled in tests.
//!
//! Code that reads the system clock directly is slow and unreliable to test:
//! every time-dependent assertion turns into a real sleep. This crate routes
//! all time reads through a [`Clock`] handle. In production the handle is a
//! zero-overhead passthrough to [`std::time::Instant`] and
//! [`std::time::SystemTime`]; in tests, with the `test-util` feature enabled,
//! a [`ClockControl`] drives the same handle through a manual timeline that
//! advances only when told to.
//!
//! # Quick Start
//!
//! ```
//! use tempo::Clock;
//!
//! let clock = Clock::new();
//!
//! let stopwatch = clock.stopwatch();
//! // Perform some operation...
//! let elapsed = stopwatch.elapsed();
//! ```
//!
//! # Testing
//!
//! With the `test-util` feature enabled, construct the clock from a
//! [`ClockControl`] and advance time explicitly:
//!
//! ```
//! # #[cfg(feature = "test-util")] {
//! use std::time::Duration;
//!
//! use tempo::ClockControl;
//!
//! let control = ClockControl::new();
//! let clock = control.to_clock();
//!
//! let start = clock.instant();
//! control.advance(Duration::from_secs(60));
//!
//! assert_eq!(clock.instant().saturating_duration_since(start), Duration::from_secs(60));
//! # }
//! ```
//!
//! Code under test takes a `Clock` and never knows which kind it holds.
//! Always enable `test-util` through `dev-dependencies` only; the manual
//! timeline costs a branch on every read.
//!
//! # Overview
//!
//! - [`Clock`] - Reads monotonic and wall-clock time. Cloning is an `Arc`
//!   clone; all clones observe the same timeline.
//! - [`ClockControl`] - Owns a manual timeline. Available with the
//!   `test-util` feature.
//! - [`Stopwatch`] - Measures elapsed time against the clock it came from.

mod clock;
#[cfg(any(feature = "test-util", test))]
mod clock_control;
mod stopwatch;

pub use clock::Clock;
#[cfg(any(feature = "test-util", test))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-util")))]
pub use clock_control::ClockControl;
pub use stopwatch::Stopwatch;
