//! Ordinary least squares fit of reference temperature against raw reading
//!
//! Closed form per channel, from the regression sums:
//!
//! ```text
//! denom     = N·Σx² − (Σx)²
//! intercept = (Σy·Σx² − Σx·Σxy) / denom
//! slope     = (N·Σxy − Σx·Σy) / denom
//! ```
//!
//! `x` is the averaged raw reading and `y` the reference temperature, so the
//! result converts raw readings straight to Celsius.
//!
//! A channel is degenerate when its raw column has no spread. That is decided
//! from the second statistics pass, where a constant `f32` column gives a
//! deviation of exactly zero; `denom` itself carries rounding from the
//! accumulation and is only trusted for its sign.

use crate::config::CHANNELS;
use crate::domain::calibration::TemperatureCalibration;
use crate::domain::channel::Channel;
use crate::domain::statistics::Statistics;

/// Error type for a single channel fit
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FitError {
    /// No rows were collected
    #[error("no rows to fit")]
    NoRows,
    /// Raw readings have no variance, slope is undefined
    #[error("raw readings have no variance")]
    Degenerate,
    /// Arithmetic produced NaN or infinity
    #[error("fit parameters are not finite")]
    NonFinite,
}

impl FitError {
    /// Short label for logs and reports
    pub const fn as_str(&self) -> &'static str {
        match self {
            FitError::NoRows => "no rows",
            FitError::Degenerate => "degenerate",
            FitError::NonFinite => "non-finite",
        }
    }
}

/// Fit outcome for every channel
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitReport {
    channels: [Result<TemperatureCalibration, FitError>; CHANNELS],
}

impl FitReport {
    pub const fn new(channels: [Result<TemperatureCalibration, FitError>; CHANNELS]) -> Self {
        Self { channels }
    }

    /// Fit every channel of a computed table
    ///
    /// Channels whose raw readings never changed are degenerate.
    pub fn from_statistics(stats: &Statistics) -> Self {
        let sums = stats.sums();
        let mut channels = [Err(FitError::NoRows); CHANNELS];
        for (j, slot) in channels.iter_mut().enumerate() {
            *slot = if stats.channels[j].column.std_dev == 0.0 {
                Err(FitError::Degenerate)
            } else {
                fit_channel(sums.n, sums.sum_x[j], sums.sum_x2[j], sums.sum_xy[j], sums.sum_y)
            };
        }
        Self { channels }
    }

    /// Outcome for one channel
    pub fn get(&self, channel: Channel) -> Result<TemperatureCalibration, FitError> {
        self.channels[channel.index()]
    }

    /// Outcomes in port order
    pub fn channels(&self) -> &[Result<TemperatureCalibration, FitError>; CHANNELS] {
        &self.channels
    }

    /// Number of channels with a usable fit
    pub fn valid_count(&self) -> usize {
        self.channels.iter().filter(|c| c.is_ok()).count()
    }
}

/// Least squares fit of one channel
pub fn fit_channel(
    n: usize,
    sum_x: f64,
    sum_x2: f64,
    sum_xy: f64,
    sum_y: f64,
) -> Result<TemperatureCalibration, FitError> {
    if n == 0 {
        return Err(FitError::NoRows);
    }
    let n = n as f64;

    // N²·variance, never negative for real data
    let denom = n * sum_x2 - sum_x * sum_x;
    if denom <= 0.0 {
        return Err(FitError::Degenerate);
    }

    let intercept = (sum_y * sum_x2 - sum_x * sum_xy) / denom;
    let slope = (n * sum_xy - sum_x * sum_y) / denom;

    let fit = TemperatureCalibration::new(slope as f32, intercept as f32);
    if !fit.is_finite() {
        return Err(FitError::NonFinite);
    }
    Ok(fit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TABLE_SIZE;
    use crate::domain::reference::{parse_reference, ReferenceInput};
    use crate::domain::table::SampleTable;

    fn sums_of(points: &[(f64, f64)]) -> (usize, f64, f64, f64, f64) {
        let mut s = (points.len(), 0.0, 0.0, 0.0, 0.0);
        for &(x, y) in points {
            s.1 += x;
            s.2 += x * x;
            s.3 += x * y;
            s.4 += y;
        }
        s
    }

    #[test]
    fn test_three_point_line() {
        // (ref, raw): (0, 100), (50, 200), (100, 300)  ->  ref = 0.5·raw − 50
        let (n, sx, sx2, sxy, sy) = sums_of(&[(100.0, 0.0), (200.0, 50.0), (300.0, 100.0)]);
        let fit = fit_channel(n, sx, sx2, sxy, sy).unwrap();
        assert_eq!(fit.slope, 0.5);
        assert_eq!(fit.intercept, -50.0);
    }

    #[test]
    fn test_recovers_inverse_of_generating_line() {
        // raw = a·ref + c  =>  ref = raw/a − c/a
        for &(a, c) in &[(2.0, 100.0), (8.17, -112.4), (-3.5, 900.0), (0.25, 12.0)] {
            let points: heapless::Vec<(f64, f64), 16> = (0..16)
                .map(|i| {
                    let reference = -5.0 + i as f64 * 6.5;
                    (a * reference + c, reference)
                })
                .collect();
            let (n, sx, sx2, sxy, sy) = sums_of(&points);
            let fit = fit_channel(n, sx, sx2, sxy, sy).unwrap();

            let slope = 1.0 / a;
            let intercept = -c / a;
            assert!(((fit.slope as f64) - slope).abs() < 1e-5 * slope.abs().max(1.0));
            assert!(((fit.intercept as f64) - intercept).abs() < 1e-4 * intercept.abs().max(1.0));
        }
    }

    #[test]
    fn test_constant_raw_is_degenerate() {
        let (n, sx, sx2, sxy, sy) = sums_of(&[(512.0, 10.0), (512.0, 20.0), (512.0, 30.0)]);
        assert_eq!(fit_channel(n, sx, sx2, sxy, sy), Err(FitError::Degenerate));

        // inexact value over a full table: rounding in the sums must not matter
        let mut table: SampleTable = SampleTable::new();
        for i in 0..TABLE_SIZE {
            table.append(10.0 + i as f32, [512.35; CHANNELS]).unwrap();
        }
        let report = FitReport::from_statistics(&Statistics::compute(&table).unwrap());
        assert_eq!(report.valid_count(), 0);
        assert_eq!(report.get(Channel::ALL[1]), Err(FitError::Degenerate));
    }

    #[test]
    fn test_small_spread_still_fits() {
        let mut table: SampleTable = SampleTable::new();
        table.append(20.0, [1000.0; CHANNELS]).unwrap();
        table.append(25.0, [1000.05; CHANNELS]).unwrap();
        let stats = Statistics::compute(&table).unwrap();
        assert!(stats.channel(Channel::ALL[0]).column.std_dev > 0.0);

        let report = FitReport::from_statistics(&stats);
        assert_eq!(report.valid_count(), CHANNELS);
        let fit = report.get(Channel::ALL[0]).unwrap();
        assert!((fit.raw_to_celsius(1000.0) - 20.0).abs() < 0.1);
        assert!((fit.raw_to_celsius(1000.05) - 25.0).abs() < 0.1);

        // one outlier in a full table of identical readings
        let mut table: SampleTable = SampleTable::new();
        for i in 0..TABLE_SIZE {
            let raw = if i == TABLE_SIZE - 1 { 500.05 } else { 500.0 };
            table.append(20.0 + i as f32, [raw; CHANNELS]).unwrap();
        }
        let report = FitReport::from_statistics(&Statistics::compute(&table).unwrap());
        for outcome in report.channels() {
            assert!(matches!(outcome, Ok(fit) if fit.is_finite()));
        }
    }

    #[test]
    fn test_overflowing_reference_is_non_finite() {
        let nines = "9999999999999999999999999999999999999999";
        let ReferenceInput::Value(huge) = parse_reference(nines) else {
            panic!("expected a value");
        };
        assert!(huge.is_infinite());

        let mut table: SampleTable = SampleTable::new();
        table.append(20.0, [100.0; CHANNELS]).unwrap();
        table.append(huge, [200.0; CHANNELS]).unwrap();
        table.append(40.0, [300.0; CHANNELS]).unwrap();
        let report = FitReport::from_statistics(&Statistics::compute(&table).unwrap());
        assert_eq!(report.get(Channel::ALL[0]), Err(FitError::NonFinite));
        assert_eq!(report.valid_count(), 0);
    }

    #[test]
    fn test_no_rows() {
        assert_eq!(fit_channel(0, 0.0, 0.0, 0.0, 0.0), Err(FitError::NoRows));
    }

    #[test]
    fn test_report_flags_only_flat_channel() {
        let mut table: SampleTable = SampleTable::new();
        for reference in [10.0f32, 25.0, 40.0, 55.0].iter() {
            let mut raw = [0.0f32; CHANNELS];
            for (j, x) in raw.iter_mut().enumerate() {
                *x = 60.0 + reference * (2.0 + j as f32);
            }
            // channel 2 sees a disconnected input
            raw[2] = 1023.0;
            table.append(*reference, raw).unwrap();
        }
        let stats = Statistics::compute(&table).unwrap();
        let ch2 = stats.channel(Channel::ALL[2]).column;
        assert_eq!(ch2.std_dev, 0.0);
        assert_eq!(ch2.mean_abs_deviation, 0.0);

        let report = FitReport::from_statistics(&stats);
        assert_eq!(report.get(Channel::ALL[2]), Err(FitError::Degenerate));
        assert_eq!(report.valid_count(), CHANNELS - 1);

        let fit0 = report.get(Channel::ALL[0]).unwrap();
        assert!((fit0.raw_to_celsius(60.0 + 25.0 * 2.0) - 25.0).abs() < 1e-3);
    }
}
