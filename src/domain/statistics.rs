//! Descriptive statistics and regression sums over a sample table
//!
//! Two passes over the rows: the first accumulates the sums (Σy, Σx, Σx²,
//! Σxy) and the means, the second the absolute and squared deviations from
//! those means. Deviations are population figures (divide by N).
//!
//! Accumulation is done in `f64`; raw readings reach ~1000 counts and Σx²
//! over a full table would lose the low digits the fit depends on in `f32`.

use crate::config::CHANNELS;
use crate::domain::channel::Channel;
use crate::domain::table::SampleTable;

/// Error type for statistics computation
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatisticsError {
    /// No rows to average over
    #[error("no calibration rows collected")]
    EmptyTable,
}

/// Statistics of one column of the table
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnStatistics {
    /// Σv
    pub sum: f64,
    /// Σv²
    pub sum_sq: f64,
    pub mean: f64,
    /// Mean absolute deviation from `mean`
    pub mean_abs_deviation: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl ColumnStatistics {
    /// Largest distance of either extreme from the mean
    pub fn max_excursion(&self) -> f64 {
        let low = abs(self.min - self.mean);
        let high = abs(self.max - self.mean);
        if low > high {
            low
        } else {
            high
        }
    }
}

/// Statistics of one raw channel column, with its cross term
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelStatistics {
    pub column: ColumnStatistics,
    /// Σ(raw · reference)
    pub sum_xy: f64,
}

/// Everything the fit needs from a table
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegressionSums {
    pub n: usize,
    pub sum_x: [f64; CHANNELS],
    pub sum_x2: [f64; CHANNELS],
    pub sum_xy: [f64; CHANNELS],
    pub sum_y: f64,
}

/// Statistics for a whole table
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Statistics {
    /// Number of rows the figures were computed over
    pub rows: usize,
    /// Reference temperature column
    pub reference: ColumnStatistics,
    /// Raw reading columns, in port order
    pub channels: [ChannelStatistics; CHANNELS],
}

impl Statistics {
    /// Compute statistics over every row of `table`
    pub fn compute<const N: usize>(table: &SampleTable<N>) -> Result<Self, StatisticsError> {
        let rows = table.rows();
        if rows.is_empty() {
            return Err(StatisticsError::EmptyTable);
        }
        let n = rows.len() as f64;

        let mut reference = ColumnStatistics {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            ..Default::default()
        };
        let mut channels = [ChannelStatistics::default(); CHANNELS];

        for row in rows {
            let y = row.reference as f64;
            reference.sum += y;
            reference.sum_sq += y * y;
            reference.min = reference.min.min(y);
            reference.max = reference.max.max(y);

            for (stats, &raw) in channels.iter_mut().zip(row.raw.iter()) {
                let x = raw as f64;
                stats.column.sum += x;
                stats.column.sum_sq += x * x;
                stats.sum_xy += x * y;
            }
        }

        reference.mean = reference.sum / n;
        for (ch, stats) in Channel::ALL.iter().zip(channels.iter_mut()) {
            stats.column.mean = stats.column.sum / n;
            if let Some((lo, hi)) = table.extrema(*ch) {
                stats.column.min = lo as f64;
                stats.column.max = hi as f64;
            }
        }

        let mut ref_sq = 0.0;
        let mut chan_sq = [0.0f64; CHANNELS];
        for row in rows {
            let t = row.reference as f64 - reference.mean;
            reference.mean_abs_deviation += abs(t);
            ref_sq += t * t;

            for (j, stats) in channels.iter_mut().enumerate() {
                let t = row.raw[j] as f64 - stats.column.mean;
                stats.column.mean_abs_deviation += abs(t);
                chan_sq[j] += t * t;
            }
        }

        reference.mean_abs_deviation /= n;
        reference.std_dev = sqrt(ref_sq / n);
        for (stats, sq) in channels.iter_mut().zip(chan_sq.iter()) {
            stats.column.mean_abs_deviation /= n;
            stats.column.std_dev = sqrt(sq / n);
        }

        debug!(
            "statistics over {} rows, reference mean {}",
            rows.len(),
            reference.mean
        );

        Ok(Self {
            rows: rows.len(),
            reference,
            channels,
        })
    }

    /// Statistics for one channel
    pub fn channel(&self, channel: Channel) -> &ChannelStatistics {
        &self.channels[channel.index()]
    }

    /// Regression sums for the fit engine
    pub fn sums(&self) -> RegressionSums {
        let mut sums = RegressionSums {
            n: self.rows,
            sum_x: [0.0; CHANNELS],
            sum_x2: [0.0; CHANNELS],
            sum_xy: [0.0; CHANNELS],
            sum_y: self.reference.sum,
        };
        for (j, stats) in self.channels.iter().enumerate() {
            sums.sum_x[j] = stats.column.sum;
            sums.sum_x2[j] = stats.column.sum_sq;
            sums.sum_xy[j] = stats.sum_xy;
        }
        sums
    }
}

/// |v|, through `libm` when there is no `std`
#[inline]
pub(crate) fn abs(v: f64) -> f64 {
    #[cfg(feature = "std")]
    {
        v.abs()
    }
    #[cfg(not(feature = "std"))]
    {
        libm::fabs(v)
    }
}

/// |v| for `f32` readings
#[inline]
pub(crate) fn abs_f32(v: f32) -> f32 {
    #[cfg(feature = "std")]
    {
        v.abs()
    }
    #[cfg(not(feature = "std"))]
    {
        libm::fabsf(v)
    }
}

#[inline]
fn sqrt(v: f64) -> f64 {
    #[cfg(feature = "std")]
    {
        v.sqrt()
    }
    #[cfg(not(feature = "std"))]
    {
        libm::sqrt(v)
    }
}
