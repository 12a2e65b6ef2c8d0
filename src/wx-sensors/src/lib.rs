//! Sensor acquisition layer for a small weather-station controller.
//!
//! Physical measurements come from two kinds of sources: polled hardware
//! drivers behind the [`SampleSource`] seam, and asynchronous digital edges
//! counted by the [`pulse`] module. Every measurement is exposed through the
//! polymorphic [`Sensor`] trait, which the host control loop drives:
//!
//! 1. [`Sensor::setup()`] once per sensor, before anything else;
//! 2. [`Sensor::update()`] every loop iteration (or per measurement window);
//! 3. [`Sensor::value()`] / [`Sensor::data_string()`] to harvest results;
//! 4. [`Sensor::reset_averages()`] at the end of each averaging window, and
//!    [`Sensor::reset_accumulation()`] at the end of each (longer)
//!    cumulative window.
//!
//! The crate is `no_std`; its unit tests run on the host.

#![cfg_attr(not(test), no_std)]
#![deny(unused_must_use)]

pub mod average;
pub mod categories;
pub mod pulse;
pub mod sensor;

pub use average::{Averaged, RunningAverage};
pub use sensor::{ReadError, SampleSource, Sensor, SensorId, SetupError, Unit};

/// Monotonic timestamp with microsecond resolution, supplied by the host loop.
pub type Instant = fugit::TimerInstantU64<1_000_000>;

/// Time span with microsecond resolution.
pub type Duration = fugit::TimerDurationU64<1_000_000>;
