//! Domain layer - pure calibration logic independent of hardware
//!
//! Tables, statistics and fits are plain values; nothing here touches an
//! ADC, a serial line or a clock.

pub mod calibration;
pub mod channel;
pub mod fit;
pub mod reference;
pub mod statistics;
pub mod table;

pub use calibration::{CalibrationSet, TemperatureCalibration};
pub use channel::{Channel, InvalidChannel};
pub use fit::{fit_channel, FitError, FitReport};
pub use reference::{parse_reference, DecimalAccumulator, ReferenceInput, Step};
pub use statistics::{ChannelStatistics, ColumnStatistics, RegressionSums, Statistics, StatisticsError};
pub use table::{SampleRow, SampleTable, TableError};
