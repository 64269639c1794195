//! Console report formatting
//!
//! Layout follows the bench console: two decimals per value, four spaces of
//! padding, one line per quantity with channels in port order.

use crate::config::CHANNELS;
use crate::domain::{
    CalibrationSet, ColumnStatistics, FitReport, SampleRow, SampleTable, Statistics,
};
use crate::ports::TextOutput;
use crate::protocol::{
    BANNER, COLUMN_HEADER, INVALID_FIT, LABEL_AVG, LABEL_DEV, LABEL_ERROR, LABEL_EXCURSION,
    LABEL_INTERCEPT, LABEL_MAX, LABEL_MEAN_ERROR, LABEL_MIN, LABEL_SLOPE, LABEL_STDEV, NO_ROWS,
    PAD, REFERENCE_HEADER,
};

/// Blank line and banner at the start of a session
pub fn session_start<O: TextOutput>(out: &mut O) {
    out.write_line("");
    out.write_line(BANNER);
}

/// Echo of a freshly collected row
pub fn row<O: TextOutput>(out: &mut O, index: usize, row: &SampleRow) {
    write!(out, "{}){}{:.2}{}", index, PAD, row.reference, PAD);
    for x in row.raw.iter() {
        write!(out, "{:.2}{}", x, PAD);
    }
    out.write_line("");
}

/// Full dump of a table
pub fn readings<O: TextOutput, const N: usize>(out: &mut O, table: &SampleTable<N>) {
    write!(out, "{}", table.len());
    out.write_line(" Calibration readings");
    for (i, r) in table.rows().iter().enumerate() {
        write!(out, "{}) ", i);
        for x in r.raw.iter() {
            write!(out, "{:.2}{}", x, PAD);
        }
        write!(out, "Cal {:.2}", r.reference);
        out.write_line("");
    }
}

fn column(stats: &Statistics, f: impl Fn(&ColumnStatistics) -> f64) -> [f64; CHANNELS] {
    let mut values = [0.0; CHANNELS];
    for (v, c) in values.iter_mut().zip(stats.channels.iter()) {
        *v = f(&c.column);
    }
    values
}

fn channel_line<O: TextOutput>(out: &mut O, label: &str, values: [f64; CHANNELS]) {
    out.write(label);
    for v in values.iter() {
        write!(out, "{:.2}{}", v, PAD);
    }
    out.write_line("");
}

/// Reference and per-channel statistics
pub fn statistics<O: TextOutput>(out: &mut O, stats: &Statistics) {
    out.write_line(REFERENCE_HEADER);
    let r = &stats.reference;
    write!(
        out,
        "{:.2}{}{:.2}{}{:.2}",
        r.mean, PAD, r.mean_abs_deviation, PAD, r.std_dev
    );
    out.write_line("");
    out.write_line(PAD);
    out.write_line(COLUMN_HEADER);

    channel_line(out, LABEL_MAX, column(stats, |c| c.max));
    channel_line(out, LABEL_MIN, column(stats, |c| c.min));
    channel_line(out, LABEL_AVG, column(stats, |c| c.mean));
    channel_line(out, LABEL_DEV, column(stats, |c| c.mean_abs_deviation));
    // scaled so sub-count spread stays visible at two decimals
    channel_line(out, LABEL_STDEV, column(stats, |c| c.std_dev * 100.0));
    channel_line(out, LABEL_EXCURSION, column(stats, |c| c.max_excursion()));
}

/// Slope and intercept per channel; failed channels print a marker
pub fn fit<O: TextOutput>(out: &mut O, report: &FitReport) {
    out.write_line(COLUMN_HEADER);

    out.write(LABEL_SLOPE);
    for outcome in report.channels().iter() {
        match outcome {
            Ok(cal) => write!(out, "{:.2}{}", cal.slope * 100.0, PAD),
            Err(_) => write!(out, "{}{}", INVALID_FIT, PAD),
        }
    }
    out.write_line("");

    out.write(LABEL_INTERCEPT);
    for outcome in report.channels().iter() {
        match outcome {
            Ok(cal) => write!(out, "{:.2}{}", cal.intercept, PAD),
            Err(_) => write!(out, "{}{}", INVALID_FIT, PAD),
        }
    }
    out.write_line("");
    out.write_line("");
}

/// Calibrated estimates for a verification row, then their errors
pub fn check_row<O: TextOutput>(
    out: &mut O,
    index: usize,
    reference: f32,
    estimates: &[f32; CHANNELS],
) {
    write!(out, "{}){}{:.2}{}", index, PAD, reference, PAD);
    for e in estimates.iter() {
        write!(out, "{:.2}{}", e, PAD);
    }
    out.write_line("");

    out.write(LABEL_ERROR);
    for e in estimates.iter() {
        write!(out, "{:.2}{}", e - reference, PAD);
    }
    out.write_line("");
}

/// Mean absolute error per channel at the end of verification
pub fn mean_error<O: TextOutput>(out: &mut O, errors: &[f32; CHANNELS]) {
    out.write_line("");
    out.write(LABEL_MEAN_ERROR);
    for e in errors.iter() {
        write!(out, "{:.2}{}", e, PAD);
    }
    out.write_line("");
}

/// Calibration currently in effect, same layout as a fit report
pub fn calibration<O: TextOutput>(out: &mut O, set: &CalibrationSet) {
    fit(out, &FitReport::new(set.channels().map(Ok)));
}

/// Session ended before any row was collected
pub fn empty<O: TextOutput>(out: &mut O) {
    out.write_line(NO_ROWS);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::scripted::LineBuffer;
    use crate::domain::{FitError, TemperatureCalibration};

    #[test]
    fn test_row_layout() {
        let mut out: LineBuffer = LineBuffer::new();
        row(&mut out, 2, &SampleRow::new(25.0, [100.0, 101.5, 99.25, 100.0, 98.0, 97.0]));
        assert_eq!(
            out.lines().next(),
            Some("2)    25.00    100.00    101.50    99.25    100.00    98.00    97.00    ")
        );
    }

    #[test]
    fn test_fit_marks_invalid_channels() {
        let mut channels = [Ok(TemperatureCalibration::new(0.1203, 12.68)); CHANNELS];
        channels[1] = Err(FitError::Degenerate);
        let mut out: LineBuffer = LineBuffer::new();
        fit(&mut out, &FitReport::new(channels));

        let slope = out.find(LABEL_SLOPE).unwrap();
        assert!(slope.starts_with("M*100     12.03    --    12.03"));
        let intercept = out.find("b ").unwrap();
        assert!(intercept.starts_with("b        12.68    --    12.68"));
    }

    #[test]
    fn test_check_row_errors() {
        let mut out: LineBuffer = LineBuffer::new();
        check_row(&mut out, 0, 30.0, &[30.5, 29.0, 30.0, 31.25, 30.0, 30.0]);
        let err = out.find(LABEL_ERROR).unwrap();
        assert!(err.starts_with("Error:        0.50    -1.00    0.00    1.25"));
    }
}
