// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Structured cache activity events.
//!
//! With the `logs` feature enabled, every strategy emits a `tracing` debug
//! event when it serves a hit and when it runs the factory. Without the
//! feature these helpers compile down to the bare factory call.

use tempo::Clock;

use crate::factory::{Resource, ResourceFactory};

/// Why a strategy ran the factory.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Cause {
    /// No entry existed for the key.
    Miss,
    /// The live entry's age exceeded the TTL.
    Expired,
}

#[cfg(feature = "logs")]
impl Cause {
    fn as_str(self) -> &'static str {
        match self {
            Self::Miss => "miss",
            Self::Expired => "expired",
        }
    }
}

/// Runs the factory for `strategy` and emits a `cache.refresh` event with
/// the cause, the new serial, and the construction duration.
#[cfg(feature = "logs")]
pub(crate) fn construct(factory: &ResourceFactory, clock: &Clock, strategy: &'static str, cause: Cause) -> Resource {
    let stopwatch = clock.stopwatch();
    let resource = factory.create();

    tracing::debug!(
        cache.strategy = strategy,
        cache.cause = cause.as_str(),
        cache.serial = resource.serial(),
        cache.build_ns = ?stopwatch.elapsed().as_nanos(),
        "cache.refresh"
    );

    resource
}

#[cfg(not(feature = "logs"))]
pub(crate) fn construct(factory: &ResourceFactory, _clock: &Clock, _strategy: &'static str, _cause: Cause) -> Resource {
    factory.create()
}

/// Emits a `cache.hit` event for a fresh entry.
#[cfg(feature = "logs")]
pub(crate) fn hit(strategy: &'static str, resource: &Resource) {
    tracing::debug!(cache.strategy = strategy, cache.serial = resource.serial(), "cache.hit");
}

#[cfg(not(feature = "logs"))]
pub(crate) fn hit(_strategy: &'static str, _resource: &Resource) {}
