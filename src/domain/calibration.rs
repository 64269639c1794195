//! Temperature calibration domain service
//!
//! This module holds the linear calibration parameters that convert averaged
//! raw ADC readings to temperature values, one pair per channel.

use crate::config::CHANNELS;
use crate::domain::channel::Channel;
use crate::domain::fit::FitReport;

/// Linear calibration for one thermistor channel
///
/// Converts an averaged raw ADC reading to temperature in Celsius:
/// `temperature = raw * slope + intercept`
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TemperatureCalibration {
    /// Degrees per ADC count
    pub slope: f32,
    /// Temperature at a raw reading of zero
    pub intercept: f32,
}

impl TemperatureCalibration {
    /// Create a new calibration with custom parameters
    pub const fn new(slope: f32, intercept: f32) -> Self {
        Self { slope, intercept }
    }

    /// Convert an averaged raw reading to temperature in Celsius
    #[inline]
    pub fn raw_to_celsius(&self, raw: f32) -> f32 {
        raw * self.slope + self.intercept
    }

    /// Both parameters are finite numbers
    pub fn is_finite(&self) -> bool {
        self.slope.is_finite() && self.intercept.is_finite()
    }
}

/// Calibration for every channel of the board
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationSet {
    channels: [TemperatureCalibration; CHANNELS],
}

impl CalibrationSet {
    /// Bench-derived parameters for the stock thermistor shield
    ///
    /// Intercepts are the corrected set, about 1 C below the first bench run.
    pub const FACTORY_DEFAULT: Self = Self {
        channels: [
            TemperatureCalibration::new(0.1203, 12.68),
            TemperatureCalibration::new(0.1224, 13.13),
            TemperatureCalibration::new(0.1217, 13.62),
            TemperatureCalibration::new(0.1229, 13.97),
            TemperatureCalibration::new(0.1232, 13.57),
            TemperatureCalibration::new(0.1240, 13.16),
        ],
    };

    /// Create a set from explicit per-channel parameters
    pub const fn new(channels: [TemperatureCalibration; CHANNELS]) -> Self {
        Self { channels }
    }

    /// Calibration for one channel
    pub fn get(&self, channel: Channel) -> TemperatureCalibration {
        self.channels[channel.index()]
    }

    /// All channel calibrations, in port order
    pub fn channels(&self) -> &[TemperatureCalibration; CHANNELS] {
        &self.channels
    }

    /// Convert a raw reading on `channel` to Celsius
    pub fn convert(&self, channel: Channel, raw: f32) -> f32 {
        self.get(channel).raw_to_celsius(raw)
    }

    /// Take over every valid fit from `report`
    ///
    /// Channels whose fit failed keep their previous parameters.
    /// Returns the number of channels updated.
    pub fn adopt(&mut self, report: &FitReport) -> usize {
        let mut adopted = 0;
        for channel in Channel::ALL {
            match report.get(channel) {
                Ok(fit) => {
                    self.channels[channel.index()] = fit;
                    adopted += 1;
                }
                Err(e) => {
                    warn!(
                        "channel {} keeps previous calibration: {}",
                        channel.index(),
                        e.as_str()
                    );
                }
            }
        }
        adopted
    }
}

impl Default for CalibrationSet {
    fn default() -> Self {
        Self::FACTORY_DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fit::FitError;

    #[test]
    fn test_factory_conversion() {
        let cal = CalibrationSet::FACTORY_DEFAULT;
        // ~100 counts is room temperature on the stock divider
        let temp = cal.convert(Channel::ALL[0], 100.0);
        assert!((temp - 24.71).abs() < 0.01);
    }

    #[test]
    fn test_adopt_skips_failed_channels() {
        let mut cal = CalibrationSet::FACTORY_DEFAULT;
        let mut channels = [Ok(TemperatureCalibration::new(0.5, -50.0)); CHANNELS];
        channels[3] = Err(FitError::Degenerate);
        let report = FitReport::new(channels);

        assert_eq!(cal.adopt(&report), CHANNELS - 1);
        assert_eq!(cal.get(Channel::ALL[0]), TemperatureCalibration::new(0.5, -50.0));
        assert_eq!(
            cal.get(Channel::ALL[3]),
            CalibrationSet::FACTORY_DEFAULT.get(Channel::ALL[3])
        );
    }
}
