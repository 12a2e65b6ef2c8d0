//! Tipping-bucket rain gauge.

use crate::pulse::{PulseChannel, PulseHandle};
use crate::sensor::{Sensor, SensorId, SetupError, Unit};
use crate::Instant;

/// Rain gauge tip-to-depth calibration.
#[derive(Debug, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RainGaugeCalibration {
    /// Rainfall depth per bucket tip.
    pub millimeters_per_tip: f32,
}

impl Default for RainGaugeCalibration {
    /// SparkFun/Davis tipping bucket: 0.2794 mm per tip.
    fn default() -> Self {
        Self {
            millimeters_per_tip: 0.2794,
        }
    }
}

/// Cumulative rainfall sensor driven by a claimed pulse channel.
///
/// [`value()`](Sensor::value) is the total depth since the last
/// [`reset_accumulation()`](Sensor::reset_accumulation). The frequent
/// display-refresh [`reset_averages()`](Sensor::reset_averages) has no
/// effect on the total; the host clears it on a much longer period
/// (typically daily).
#[derive(Debug)]
pub struct TippingBucket {
    id: SensorId,
    channel: &'static PulseChannel,
    handle: Option<PulseHandle>,
    calibration: RainGaugeCalibration,
    total_millimeters: f32,
}

impl TippingBucket {
    #[must_use]
    pub const fn new(id: SensorId, channel: &'static PulseChannel) -> Self {
        Self {
            id,
            channel,
            handle: None,
            calibration: RainGaugeCalibration {
                millimeters_per_tip: 0.2794,
            },
            total_millimeters: 0.0,
        }
    }

    #[must_use]
    pub const fn with_calibration(mut self, calibration: RainGaugeCalibration) -> Self {
        self.calibration = calibration;
        self
    }
}

impl Sensor for TippingBucket {
    fn id(&self) -> SensorId {
        self.id
    }

    fn unit(&self) -> Unit {
        Unit::Millimeter
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

    fn update(&mut self, _now: Instant, _force: bool) {
        let Some(handle) = self.handle.as_mut() else {
            return;
        };
        let tips = handle.take();
        if tips > 0 {
            self.total_millimeters += tips as f32 * self.calibration.millimeters_per_tip;
        }
    }

    fn value(&self) -> f32 {
        self.total_millimeters
    }

    fn reset_accumulation(&mut self) {
        self.total_millimeters = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(us: u64) -> Instant {
        Instant::from_ticks(us)
    }

    #[test]
    fn total_is_tips_times_calibration() {
        static CHANNEL: PulseChannel = PulseChannel::new();
        let mut gauge = TippingBucket::new(SensorId::new("RAIN"), &CHANNEL);
        gauge.setup().unwrap();

        for _ in 0..5 {
            CHANNEL.record_pulse();
        }
        gauge.update(at(0), false);
        assert!((gauge.value() - 5.0 * 0.2794).abs() < 1e-5);
    }

    #[test]
    fn reset_averages_leaves_the_total() {
        static CHANNEL: PulseChannel = PulseChannel::new();
        let mut gauge = TippingBucket::new(SensorId::new("RAIN"), &CHANNEL);
        gauge.setup().unwrap();

        CHANNEL.record_pulse();
        gauge.update(at(0), false);
        let before = gauge.value();

        gauge.reset_averages();
        assert_eq!(gauge.value(), before);
    }

    #[test]
    fn only_reset_accumulation_zeroes_the_total() {
        static CHANNEL: PulseChannel = PulseChannel::new();
        let mut gauge = TippingBucket::new(SensorId::new("RAIN"), &CHANNEL);
        gauge.setup().unwrap();

        CHANNEL.record_pulse();
        CHANNEL.record_pulse();
        gauge.update(at(0), false);
        assert!(gauge.value() > 0.0);

        gauge.reset_accumulation();
        assert_eq!(gauge.value(), 0.0);

        // Tips recorded after the reset accumulate into the new window.
        CHANNEL.record_pulse();
        gauge.update(at(1_000_000), false);
        assert!((gauge.value() - 0.2794).abs() < 1e-6);
    }

    #[test]
    fn custom_calibration() {
        static CHANNEL: PulseChannel = PulseChannel::new();
        let mut gauge = TippingBucket::new(SensorId::new("RAIN"), &CHANNEL).with_calibration(
            RainGaugeCalibration {
                millimeters_per_tip: 0.5,
            },
        );
        gauge.setup().unwrap();

        for _ in 0..4 {
            CHANNEL.record_pulse();
        }
        gauge.update(at(0), false);
        assert_eq!(gauge.value(), 2.0);
    }
}
