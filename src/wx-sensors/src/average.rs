//! Rolling-average policy and the [`Averaged`] sensor built on top of it.
//!
//! Averaging is a standalone, composable policy rather than a base-class
//! obligation: [`RunningAverage`] knows nothing about hardware, and
//! [`Averaged`] glues it to any [`SampleSource`]. Current, battery-voltage
//! and wind-direction sensors all share this one implementation and differ
//! only in their raw source.

use crate::sensor::{SampleSource, Sensor, SensorId, Unit};
use crate::Instant;

/// Accumulates samples between window resets and exposes the running mean.
#[derive(Debug, Copy, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RunningAverage {
    accumulation: f32,
    samples: u32,
    last_average: f32,
}

impl RunningAverage {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            accumulation: 0.0,
            samples: 0,
            last_average: 0.0,
        }
    }

    /// Folds one sample into the current window and recomputes the mean.
    pub fn fold(&mut self, sample: f32) {
        self.accumulation += sample;
        self.samples += 1;
        self.last_average = self.accumulation / self.samples as f32;
    }

    /// Returns the mean of the current window.
    ///
    /// With zero samples folded since the last [`reset()`](Self::reset) this
    /// returns the previous window's mean unchanged (`0.0` if there has never
    /// been one): the stale-value policy, never a division by zero, never a
    /// discontinuous drop to zero.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.last_average
    }

    /// Number of samples folded since the last reset.
    #[must_use]
    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// Starts a new averaging window. Does not touch the last reported mean.
    pub fn reset(&mut self) {
        self.accumulation = 0.0;
        self.samples = 0;
    }
}

/// A sensor reporting the rolling mean of a raw sample source.
///
/// Each [`update()`](Sensor::update) call reads exactly one sample; the host
/// loop's calling frequency is the sampling rate. Failed and non-finite reads
/// are skipped, leaving the window untouched.
#[derive(Debug)]
pub struct Averaged<S> {
    id: SensorId,
    unit: Unit,
    source: S,
    average: RunningAverage,
}

impl<S: SampleSource> Averaged<S> {
    pub const fn new(id: SensorId, unit: Unit, source: S) -> Self {
        Self {
            id,
            unit,
            source,
            average: RunningAverage::new(),
        }
    }
}

impl<S: SampleSource> Sensor for Averaged<S> {
    fn id(&self) -> SensorId {
        self.id
    }

    fn unit(&self) -> Unit {
        self.unit
    }

    fn update(&mut self, _now: Instant, _force: bool) {
        match self.source.read_sample() {
            Ok(sample) if sample.is_finite() => self.average.fold(sample),
            _ => {
                // Stale-value policy: a bad read leaves the window untouched.
                #[cfg(feature = "defmt")]
                defmt::warn!("{}: sample read skipped", self.id);
            }
        }
    }

    fn value(&self) -> f32 {
        self.average.value()
    }

    fn reset_averages(&mut self) {
        self.average.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::ReadError;

    fn at(us: u64) -> Instant {
        Instant::from_ticks(us)
    }

    #[test]
    fn mean_of_folded_samples() {
        let mut avg = RunningAverage::new();
        for sample in [1.0, 2.0, 3.0, 4.0] {
            avg.fold(sample);
        }
        assert!((avg.value() - 2.5).abs() < f32::EPSILON);
        assert_eq!(avg.samples(), 4);
    }

    #[test]
    fn empty_window_reports_zero() {
        let avg = RunningAverage::new();
        assert_eq!(avg.value(), 0.0);
    }

    #[test]
    fn reset_keeps_last_mean() {
        let mut avg = RunningAverage::new();
        avg.fold(10.0);
        avg.fold(20.0);
        let before = avg.value();

        avg.reset();
        assert_eq!(avg.value(), before);
        assert_eq!(avg.samples(), 0);

        // The next window starts fresh.
        avg.fold(1.0);
        assert_eq!(avg.value(), 1.0);
    }

    #[test]
    fn averaged_sensor_folds_each_update() {
        let mut samples = [2.0_f32, 4.0, 6.0].into_iter();
        let mut sensor = Averaged::new(SensorId::new("BATT"), Unit::Volt, move || {
            samples.next().ok_or(ReadError::NotReady)
        });

        sensor.update(at(0), false);
        sensor.update(at(1_000), false);
        sensor.update(at(2_000), false);
        assert!((sensor.value() - 4.0).abs() < f32::EPSILON);

        // Source exhausted: further updates leave the value stale.
        sensor.update(at(3_000), false);
        assert!((sensor.value() - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn non_finite_samples_are_skipped() {
        let mut samples = [1.0, f32::NAN, 3.0].into_iter();
        let mut sensor = Averaged::new(SensorId::new("CURR"), Unit::Ampere, move || {
            Ok(samples.next().unwrap_or(f32::INFINITY))
        });

        sensor.update(at(0), false);
        sensor.update(at(1), false);
        sensor.update(at(2), false);
        assert!((sensor.value() - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn reset_then_value_without_update_is_unchanged() {
        let mut sensor = Averaged::new(SensorId::new("BATT"), Unit::Volt, || Ok(12.6_f32));
        sensor.update(at(0), false);
        let before = sensor.value();

        sensor.reset_averages();
        assert_eq!(sensor.value(), before);
    }
}
