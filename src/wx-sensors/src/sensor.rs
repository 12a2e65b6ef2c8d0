//! Provides the [`Sensor`] trait abstracting over implementation details of a
//! sensor, and the [`SampleSource`] seam behind which hardware drivers live.

use core::fmt::Write as _;

use crate::Instant;

/// Capacity of the telemetry line returned by [`Sensor::data_string()`].
pub const DATA_STRING_CAPACITY: usize = 24;

/// Represents a device providing measurements to the host control loop.
///
/// Implementations fall into three groups: pass-through sensors that report
/// the last raw driver read, averaging sensors that report a rolling mean
/// over the current window, and pulse-counting sensors that derive their
/// value from hardware edge counts.
pub trait Sensor {
    /// Identifier used as the key of the emitted telemetry line.
    #[must_use]
    fn id(&self) -> SensorId;

    /// Unit of measurement of [`value()`](Sensor::value).
    #[must_use]
    fn unit(&self) -> Unit;

    /// One-time hardware/interrupt initialization.
    ///
    /// Called exactly once by the host before the first
    /// [`update()`](Sensor::update). Safe to call again; a second call is a
    /// no-op for every implementation in this crate.
    fn setup(&mut self) -> Result<(), SetupError> {
        Ok(())
    }

    /// Advances internal state; called from the main loop, never from
    /// interrupt context.
    ///
    /// `force` bypasses any internal rate limiting and forces an immediate
    /// recomputation.
    fn update(&mut self, now: Instant, force: bool) {
        let _ = (now, force);
    }

    /// Returns the current representative value.
    ///
    /// Never fails: on an invalid hardware read this returns the last good
    /// value, or `0.0` if there has never been one. Telemetry delivery must
    /// not stall on one bad sensor.
    #[must_use]
    fn value(&self) -> f32;

    /// Clears the averaging window. Default no-op for non-averaging sensors.
    ///
    /// The last reported value survives the reset: a consumer reading
    /// immediately afterwards, before the next sample, still sees the prior
    /// window's value.
    fn reset_averages(&mut self) {}

    /// Clears cumulative totals.
    ///
    /// Distinct from [`reset_averages()`](Sensor::reset_averages): strictly
    /// cumulative sensors (rainfall) are cleared by this call only, on a much
    /// longer period than the display-refresh reset. Default no-op.
    fn reset_accumulation(&mut self) {}

    /// Formats the `ID=VALUE` telemetry line, with two decimal places.
    ///
    /// The line is truncated if the formatted value would overflow the
    /// buffer, which cannot happen for in-range weather quantities.
    #[must_use]
    fn data_string(&self) -> heapless::String<DATA_STRING_CAPACITY> {
        let mut line = heapless::String::new();
        let _ = write!(&mut line, "{}={:.2}", self.id(), self.value());
        line
    }
}

/// Short textual sensor identifier, assigned at construction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorId(&'static str);

impl SensorId {
    /// Creates an identifier from a four-character ASCII code.
    ///
    /// # Panics
    ///
    /// Panics (at compile time when used in const context) if `code` is not
    /// exactly four bytes long.
    #[must_use]
    pub const fn new(code: &'static str) -> Self {
        assert!(code.len() == 4, "sensor ids are four-character codes");
        Self(code)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl core::fmt::Display for SensorId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.0)
    }
}

/// Represents a unit of measurement.
///
/// Missing variants can be added when required.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Unit {
    /// Degree Celsius.
    Celsius,
    /// Percent (relative humidity).
    Percent,
    /// Hectopascal (hPa).
    Hectopascal,
    /// Ampere (A).
    Ampere,
    /// Volt (V).
    Volt,
    /// Meter per second (m/s).
    MeterPerSecond,
    /// Degree (compass bearing, 0..360, clockwise from north).
    Degree,
    /// Millimeter (rainfall depth).
    Millimeter,
}

/// Obtains one raw hardware sample.
///
/// This is the boundary toward driver crates: anything that can produce a
/// synchronous `f32` read (I2C transaction, ADC conversion, mock) implements
/// it. The return value is treated as ground truth; consumers apply only the
/// NaN/error stale-value fallback, no retries.
pub trait SampleSource {
    fn read_sample(&mut self) -> Result<f32, ReadError>;
}

/// Any `FnMut` closure returning a sample result is a source. Mostly useful
/// for tests and thin driver adapters.
impl<F> SampleSource for F
where
    F: FnMut() -> Result<f32, ReadError>,
{
    fn read_sample(&mut self) -> Result<f32, ReadError> {
        self()
    }
}

/// Raw sample read failure. Always masked by the stale-value policy, never
/// propagated past [`Sensor::update()`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum ReadError {
    /// Cannot access the sensor (e.g., because of a bus error).
    Hardware,
    /// The sensor returned data that is out of range or unparseable.
    Invalid,
    /// No fresh conversion is available yet.
    NotReady,
}

impl core::fmt::Display for ReadError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Hardware => write!(f, "hardware access failed"),
            Self::Invalid => write!(f, "sensor returned invalid data"),
            Self::NotReady => write!(f, "no fresh sample available"),
        }
    }
}

impl core::error::Error for ReadError {}

/// Error returned by [`Sensor::setup()`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum SetupError {
    /// The pulse channel this sensor needs is already claimed by a live
    /// instance. Only one instance per pulse source may exist.
    ChannelClaimed,
}

impl core::fmt::Display for SetupError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ChannelClaimed => write!(f, "pulse channel is already claimed"),
        }
    }
}

impl core::error::Error for SetupError {}

#[cfg(test)]
mod tests {
    use super::*;

    // Assert that the Sensor trait is object-safe.
    fn _assert_object_safe(_: &dyn Sensor) {}

    struct Fixed(SensorId, f32);

    impl Sensor for Fixed {
        fn id(&self) -> SensorId {
            self.0
        }

        fn unit(&self) -> Unit {
            Unit::Celsius
        }

        fn value(&self) -> f32 {
            self.1
        }
    }

    #[test]
    fn data_string_format() {
        let sensor = Fixed(SensorId::new("OTMP"), 21.5);
        assert_eq!(sensor.data_string().as_str(), "OTMP=21.50");

        let sensor = Fixed(SensorId::new("CURR"), -0.75);
        assert_eq!(sensor.data_string().as_str(), "CURR=-0.75");
    }

    #[test]
    fn default_hooks_are_noops() {
        let mut sensor = Fixed(SensorId::new("HUMI"), 55.0);
        assert!(sensor.setup().is_ok());
        sensor.update(crate::Instant::from_ticks(0), false);
        sensor.reset_averages();
        sensor.reset_accumulation();
        assert_eq!(sensor.value(), 55.0);
    }

    #[test]
    fn id_display() {
        let id = SensorId::new("WSPD");
        assert_eq!(id.as_str(), "WSPD");
        assert_eq!(format!("{id}"), "WSPD");
    }
}
