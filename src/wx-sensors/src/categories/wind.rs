//! Wind speed and wind direction sensors.
//!
//! The anemometer is a pulse-counting sensor: a reed switch closes once per
//! cup rotation and the speed is derived from the pulse count over the
//! sampling window. The vane is an analog sensor: a resistor network maps
//! sixteen compass positions to distinct voltages.

use crate::pulse::{PulseChannel, PulseHandle};
use crate::sensor::{ReadError, SampleSource, Sensor, SensorId, SetupError, Unit};
use crate::{Duration, Instant};

/// Anemometer pulse-to-speed calibration.
#[derive(Debug, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnemometerCalibration {
    /// Wind speed corresponding to one pulse per second.
    pub meters_per_second_per_hz: f32,
}

impl Default for AnemometerCalibration {
    /// SparkFun/Davis reed-switch anemometer: 1 Hz = 2.4 km/h.
    fn default() -> Self {
        Self {
            meters_per_second_per_hz: 2.4 / 3.6,
        }
    }
}

/// Wind speed sensor driven by a claimed pulse channel.
///
/// [`value()`](Sensor::value) is the most recently computed instantaneous
/// speed over the last sampling window, not an average: speed is inherently
/// a rate.
#[derive(Debug)]
pub struct Anemometer {
    id: SensorId,
    channel: &'static PulseChannel,
    handle: Option<PulseHandle>,
    calibration: AnemometerCalibration,
    /// Minimum window length before a new speed is derived; `force` bypasses.
    min_window: Duration,
    window_start: Option<Instant>,
    window_pulses: u32,
    speed: f32,
}

impl Anemometer {
    #[must_use]
    pub const fn new(id: SensorId, channel: &'static PulseChannel) -> Self {
        Self {
            id,
            channel,
            handle: None,
            calibration: AnemometerCalibration {
                meters_per_second_per_hz: 2.4 / 3.6,
            },
            min_window: Duration::secs(1),
            window_start: None,
            window_pulses: 0,
            speed: 0.0,
        }
    }

    #[must_use]
    pub const fn with_calibration(mut self, calibration: AnemometerCalibration) -> Self {
        self.calibration = calibration;
        self
    }

    #[must_use]
    pub const fn with_min_window(mut self, min_window: Duration) -> Self {
        self.min_window = min_window;
        self
    }
}

impl Sensor for Anemometer {
    fn id(&self) -> SensorId {
        self.id
    }

    fn unit(&self) -> Unit {
        Unit::MeterPerSecond
    }

    fn setup(&mut self) -> Result<(), SetupError> {
        if self.handle.is_none() {
            self.handle = Some(
                self.channel
                    .claim()
                    .map_err(|_| SetupError::ChannelClaimed)?,
            );
        }
        Ok(())
    }

    fn update(&mut self, now: Instant, force: bool) {
        let Some(handle) = self.handle.as_mut() else {
            return;
        };
        self.window_pulses += handle.take();

        let Some(start) = self.window_start else {
            // First update after setup opens the window; edges recorded
            // before a timestamp existed cannot be turned into a rate.
            self.window_start = Some(now);
            self.window_pulses = 0;
            return;
        };

        let Some(elapsed) = now.checked_duration_since(start) else {
            return;
        };
        if !force && elapsed < self.min_window {
            return;
        }

        let seconds = elapsed.to_micros() as f32 / 1e6;
        if seconds > 0.0 {
            self.speed =
                self.window_pulses as f32 / seconds * self.calibration.meters_per_second_per_hz;
        }
        self.window_pulses = 0;
        self.window_start = Some(now);
    }

    fn value(&self) -> f32 {
        self.speed
    }
}

/// Wind vane voltage-to-bearing table, SparkFun weather-meter resistor
/// network read through a 10 kOhm series resistor at a 5 V reference.
/// Voltages are not monotonic in bearing; matching is nearest-entry.
const VANE_TABLE: [(f32, f32); 16] = [
    (3.84, 0.0),
    (1.98, 22.5),
    (2.25, 45.0),
    (0.41, 67.5),
    (0.45, 90.0),
    (0.32, 112.5),
    (0.90, 135.0),
    (0.62, 157.5),
    (1.40, 180.0),
    (1.19, 202.5),
    (3.08, 225.0),
    (2.93, 247.5),
    (4.62, 270.0),
    (4.04, 292.5),
    (4.33, 315.0),
    (3.43, 337.5),
];

const VANE_TABLE_REFERENCE_VOLTS: f32 = 5.0;

/// Converts the vane's analog voltage into a compass bearing.
///
/// Wraps any voltage-producing [`SampleSource`]; compose with
/// [`Averaged`](crate::Averaged) for the usual rolling mean.
///
/// # Limitation
///
/// Downstream averaging of bearings is arithmetic: a window straddling north
/// (readings near both 0 and 360 degrees) averages toward 180 instead of
/// north. A circular (vector) mean would be needed if accuracy near the wrap
/// matters.
#[derive(Debug)]
pub struct WindVane<S> {
    source: S,
    reference_volts: f32,
}

impl<S: SampleSource> WindVane<S> {
    /// `reference_volts` is the supply feeding the vane's divider; table
    /// voltages are scaled accordingly.
    #[must_use]
    pub const fn new(source: S, reference_volts: f32) -> Self {
        Self {
            source,
            reference_volts,
        }
    }

    fn bearing_for(&self, volts: f32) -> f32 {
        let scale = self.reference_volts / VANE_TABLE_REFERENCE_VOLTS;
        let mut best = (f32::INFINITY, 0.0);
        for (table_volts, bearing) in VANE_TABLE {
            let distance = (volts - table_volts * scale).abs();
            if distance < best.0 {
                best = (distance, bearing);
            }
        }
        best.1
    }
}

impl<S: SampleSource> SampleSource for WindVane<S> {
    fn read_sample(&mut self) -> Result<f32, ReadError> {
        let volts = self.source.read_sample()?;
        Ok(self.bearing_for(volts))
    }
}
