//! Current and battery-voltage sensing.
//!
//! Both are analog reads with a fixed scaling, averaged over the display
//! window by composing with [`Averaged`](crate::Averaged); this module only
//! supplies the scaling adapters.

use crate::sensor::{ReadError, SampleSource};

/// Hall-effect current sense (ACS714-class): output centered at half the
/// supply, with a fixed sensitivity.
#[derive(Debug)]
pub struct CurrentSense<S> {
    source: S,
    zero_current_volts: f32,
    volts_per_amp: f32,
}

impl<S: SampleSource> CurrentSense<S> {
    /// ACS714-05B on a 5 V supply: 2.5 V at zero current, 185 mV/A.
    #[must_use]
    pub const fn acs714(source: S) -> Self {
        Self::new(source, 2.5, 0.185)
    }

    #[must_use]
    pub const fn new(source: S, zero_current_volts: f32, volts_per_amp: f32) -> Self {
        Self {
            source,
            zero_current_volts,
            volts_per_amp,
        }
    }
}

impl<S: SampleSource> SampleSource for CurrentSense<S> {
    fn read_sample(&mut self) -> Result<f32, ReadError> {
        let volts = self.source.read_sample()?;
        Ok((volts - self.zero_current_volts) / self.volts_per_amp)
    }
}

/// Resistive divider in front of an ADC pin; the battery sits behind a 4:1
/// divider so a 12 V pack stays within the ADC range.
#[derive(Debug)]
pub struct VoltageDivider<S> {
    source: S,
    ratio: f32,
}

impl<S: SampleSource> VoltageDivider<S> {
    /// `ratio` is the division factor, e.g. `4.0` for a 4:1 divider.
    #[must_use]
    pub const fn new(source: S, ratio: f32) -> Self {
        Self { source, ratio }
    }
}

impl<S: SampleSource> SampleSource for VoltageDivider<S> {
    fn read_sample(&mut self) -> Result<f32, ReadError> {
        let volts = self.source.read_sample()?;
        Ok(volts * self.ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::{Sensor, SensorId, Unit};
    use crate::{Averaged, Instant};

    #[test]
    fn current_scaling() {
        let mut sense = CurrentSense::acs714(|| Ok(2.5_f32 + 0.185));
        assert!((sense.read_sample().unwrap() - 1.0).abs() < 1e-6);

        // Bidirectional: below the midpoint means negative current.
        let mut sense = CurrentSense::acs714(|| Ok(2.5_f32 - 0.37));
        assert!((sense.read_sample().unwrap() + 2.0).abs() < 1e-5);
    }

    #[test]
    fn divider_scaling() {
        let mut divider = VoltageDivider::new(|| Ok(3.15_f32), 4.0);
        assert!((divider.read_sample().unwrap() - 12.6).abs() < 1e-5);
    }

    #[test]
    fn errors_pass_through_unmasked() {
        let mut divider = VoltageDivider::new(|| Err::<f32, _>(ReadError::Hardware), 4.0);
        assert_eq!(divider.read_sample().unwrap_err(), ReadError::Hardware);
    }

    #[test]
    fn averaged_battery_voltage() {
        let mut raw = [3.0_f32, 3.2].into_iter();
        let divider = VoltageDivider::new(move || raw.next().ok_or(ReadError::NotReady), 4.0);
        let mut battery = Averaged::new(SensorId::new("BATT"), Unit::Volt, divider);

        battery.update(Instant::from_ticks(0), false);
        battery.update(Instant::from_ticks(1), false);
        assert!((battery.value() - 12.4).abs() < 1e-5);
    }
}
