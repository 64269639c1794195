//! Shared line protocol for the calibration console
//!
//! The operator side sends plain decimal numbers, one per row, and `#` to end
//! collection. The device answers with text lines whose first token names
//! the line. Both the device-side reporting and the host terminal use the
//! vocabulary defined here.

/// Ends collection when seen anywhere in the operator's input
pub const TERMINATOR: char = '#';

/// Separates integer and fractional digits
pub const DECIMAL_POINT: char = '.';

/// Emitted when a session starts collecting
pub const BANNER: &str = "begin";

/// Column padding between printed values
pub const PAD: &str = "    ";

/// Header printed above per-channel tables
pub const COLUMN_HEADER: &str = "         0       1      2       3       4       5";

/// Reference statistics header
pub const REFERENCE_HEADER: &str = "AvgY  DevY   StdvY";

pub const LABEL_MAX: &str = "MaxX    ";
pub const LABEL_MIN: &str = "MinX    ";
pub const LABEL_AVG: &str = "AvgX    ";
pub const LABEL_DEV: &str = "devX    ";
pub const LABEL_STDEV: &str = "StdevX  ";
pub const LABEL_EXCURSION: &str = "ErrX    ";

/// Slope row of the fit report (values scaled by 100)
pub const LABEL_SLOPE: &str = "M*100     ";
/// Intercept row of the fit report, last line of a calibration session
pub const LABEL_INTERCEPT: &str = "b        ";

/// Per-row error line in verification mode
pub const LABEL_ERROR: &str = "Error:        ";
/// Mean absolute error line, last line of a verification session
pub const LABEL_MEAN_ERROR: &str = "AvgErr:  ";

/// Printed in place of the parameters of a channel that could not be fitted
pub const INVALID_FIT: &str = "--";

/// Printed when a session ends without any rows
pub const NO_ROWS: &str = "no readings collected";

/// Kind of a line received from the device
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceLine {
    /// Session started collecting
    Banner,
    /// A collected row echo (`i)    ref    raw...`)
    Row { index: usize },
    /// Final line of a calibration session
    FitComplete,
    /// Final line of a verification session
    CheckComplete,
    /// Session ended with an empty table
    Empty,
    /// Any other report line
    Other,
}

impl DeviceLine {
    /// Whether the device finished a session with this line
    pub fn ends_session(&self) -> bool {
        matches!(
            self,
            DeviceLine::FitComplete | DeviceLine::CheckComplete | DeviceLine::Empty
        )
    }
}

/// Classify one line of device output
pub fn classify_line(line: &str) -> DeviceLine {
    let trimmed = line.trim_end();
    if trimmed == BANNER {
        return DeviceLine::Banner;
    }
    if trimmed == NO_ROWS {
        return DeviceLine::Empty;
    }
    if trimmed
        .strip_prefix(LABEL_INTERCEPT.trim_end())
        .is_some_and(|rest| rest.starts_with(' '))
    {
        return DeviceLine::FitComplete;
    }
    if trimmed.starts_with(LABEL_MEAN_ERROR.trim_end()) {
        return DeviceLine::CheckComplete;
    }
    if let Some((index, _)) = trimmed.split_once(')') {
        if let Ok(index) = index.trim().parse::<usize>() {
            return DeviceLine::Row { index };
        }
    }
    DeviceLine::Other
}
