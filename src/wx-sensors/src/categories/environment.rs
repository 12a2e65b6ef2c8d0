//! Pass-through environmental sensors (temperature, humidity, pressure).
//!
//! These carry no logic of their own beyond the stale-value policy and an
//! optional internal rate limit: the actual conversion happens in the driver
//! behind the [`SampleSource`] seam (DHT-class for outside temperature and
//! humidity, BMP280-class for inside temperature and pressure).

use crate::sensor::{SampleSource, Sensor, SensorId, Unit};
use crate::{Duration, Instant};

/// A sensor reporting the last good raw read of its source.
///
/// With a `min_interval` configured, updates between reads are skipped; this
/// suits slow-conversion parts that must not be sampled every loop iteration
/// (a DHT22 allows one conversion every two seconds). `force` bypasses the
/// limit.
#[derive(Debug)]
pub struct Instantaneous<S> {
    id: SensorId,
    unit: Unit,
    source: S,
    min_interval: Option<Duration>,
    last_attempt: Option<Instant>,
    value: f32,
}

impl<S: SampleSource> Instantaneous<S> {
    #[must_use]
    pub const fn new(id: SensorId, unit: Unit, source: S) -> Self {
        Self {
            id,
            unit,
            source,
            min_interval: None,
            last_attempt: None,
            value: 0.0,
        }
    }

    /// Limits how often the source is actually read.
    #[must_use]
    pub const fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = Some(min_interval);
        self
    }
}

impl<S: SampleSource> Sensor for Instantaneous<S> {
    fn id(&self) -> SensorId {
        self.id
    }

    fn unit(&self) -> Unit {
        self.unit
    }

    fn update(&mut self, now: Instant, force: bool) {
        if !force {
            if let (Some(interval), Some(last)) = (self.min_interval, self.last_attempt) {
                match now.checked_duration_since(last) {
                    Some(elapsed) if elapsed >= interval => {}
                    _ => return,
                }
            }
        }
        // The rate limit counts attempts, not successes.
        self.last_attempt = Some(now);

        if let Ok(sample) = self.source.read_sample() {
            if sample.is_finite() {
                self.value = sample;
            }
        }
    }

    fn value(&self) -> f32 {
        self.value
    }
}
