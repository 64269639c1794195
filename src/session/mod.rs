//! Interactive calibration sessions
//!
//! A [`Calibrator`] owns the console, the analog source and the clock, plus
//! the calibration currently in effect. Each call to [`Calibrator::calibrate`]
//! or [`Calibrator::check`] runs one complete session:
//!
//! ```text
//! Idle ──startup delay──▶ Collecting ──'#' or table full──▶ Finalizing ──▶ Reported
//! ```
//!
//! Collecting repeats: read a reference from the operator, sample every
//! channel, append and echo the row. A terminator ends collection without
//! appending anything for that iteration.

pub mod input;
pub mod report;
pub mod sampler;

pub use input::ReferenceReader;
pub use sampler::AnalogSampler;

use crate::config::{CalibrationConfig, CHANNELS, TABLE_SIZE};
use crate::domain::{
    CalibrationSet, Channel, FitReport, ReferenceInput, SampleRow, SampleTable, Statistics,
};
use crate::domain::statistics::abs_f32;
use crate::ports::{AnalogSource, Clock, TextInput, TextOutput};

/// Where a session currently is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SessionState {
    Idle,
    Collecting,
    Finalizing,
    Reported,
}

impl SessionState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Collecting => "collecting",
            SessionState::Finalizing => "finalizing",
            SessionState::Reported => "reported",
        }
    }
}

/// Why collection stopped
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    /// Operator sent the terminator
    Terminated,
    /// Every row of the table was filled
    TableFull,
}

/// Error type for a whole session
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionError {
    /// Collection ended before the first row
    #[error("session ended without any readings")]
    EmptyTable,
}

/// Result of a calibration session
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationOutcome {
    pub rows: usize,
    pub stop: StopReason,
    pub statistics: Statistics,
    pub fit: FitReport,
    /// Channels whose new fit replaced the previous calibration
    pub adopted: usize,
}

/// Result of a verification session
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VerificationOutcome {
    pub rows: usize,
    pub stop: StopReason,
    /// Mean of |calibrated − reference| per channel
    pub mean_abs_error: [f32; CHANNELS],
}

/// Calibration service wiring the ports to the domain
pub struct Calibrator<I, O, A, C> {
    input: I,
    output: O,
    source: A,
    clock: C,
    config: CalibrationConfig,
    calibration: CalibrationSet,
    state: SessionState,
    dump_readings: bool,
}

impl<I, O, A, C> Calibrator<I, O, A, C>
where
    I: TextInput,
    O: TextOutput,
    A: AnalogSource,
    C: Clock,
{
    /// Create a calibrator starting from the factory calibration
    pub fn new(input: I, output: O, source: A, clock: C, config: CalibrationConfig) -> Self {
        Self {
            input,
            output,
            source,
            clock,
            config,
            calibration: CalibrationSet::FACTORY_DEFAULT,
            state: SessionState::Idle,
            dump_readings: false,
        }
    }

    /// Start from a known calibration instead of the factory one
    pub fn with_calibration(mut self, calibration: CalibrationSet) -> Self {
        self.calibration = calibration;
        self
    }

    /// Print the whole table before the statistics report
    pub fn with_readings_dump(mut self, enabled: bool) -> Self {
        self.dump_readings = enabled;
        self
    }

    pub fn calibration(&self) -> &CalibrationSet {
        &self.calibration
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    /// Give back the ports
    pub fn into_parts(self) -> (I, O, A, C) {
        (self.input, self.output, self.source, self.clock)
    }

    fn transition(&mut self, next: SessionState) {
        debug!("session {} -> {}", self.state.as_str(), next.as_str());
        self.state = next;
    }

    async fn start(&mut self) {
        self.transition(SessionState::Idle);
        if self.config.startup_delay_ms > 0 {
            self.clock.delay_ms(self.config.startup_delay_ms).await;
        }
        report::session_start(&mut self.output);
        self.transition(SessionState::Collecting);
    }

    /// Ask for one reference value and, unless terminated, sample every channel
    async fn next_row(&mut self) -> Option<SampleRow> {
        let reader = ReferenceReader::from_config(&self.config);
        let reference = match reader.read_reference(&mut self.input, &mut self.clock).await {
            ReferenceInput::Value(v) => v,
            ReferenceInput::Terminate => return None,
        };

        let sampler = AnalogSampler::from_config(&self.config);
        let raw = sampler.sample_all(&mut self.source, &mut self.clock).await;
        Some(SampleRow::new(reference, raw))
    }

    /// Collect rows until the operator terminates or the table is full
    async fn collect<const N: usize>(&mut self, table: &mut SampleTable<N>) -> StopReason {
        while !table.is_full() {
            let Some(row) = self.next_row().await else {
                info!("collection terminated after {} rows", table.len());
                return StopReason::Terminated;
            };
            let index = table.len();
            if table.push(row).is_err() {
                break;
            }
            report::row(&mut self.output, index, &row);
            trace!("row {} reference {}", index, row.reference);
        }
        info!("sample table full at {} rows", table.len());
        StopReason::TableFull
    }

    /// Run one calibration session and adopt every usable fit
    ///
    /// Channels whose fit is degenerate keep their previous calibration and
    /// are reported with an invalid marker.
    pub async fn calibrate(&mut self) -> Result<CalibrationOutcome, SessionError> {
        self.calibrate_with::<TABLE_SIZE>().await
    }

    /// [`calibrate`](Self::calibrate) with a table of `N` rows
    pub async fn calibrate_with<const N: usize>(
        &mut self,
    ) -> Result<CalibrationOutcome, SessionError> {
        self.start().await;

        let mut table: SampleTable<N> = SampleTable::new();
        let stop = self.collect(&mut table).await;
        self.transition(SessionState::Finalizing);

        let statistics = match Statistics::compute(&table) {
            Ok(stats) => stats,
            Err(_) => {
                warn!("no rows collected, calibration unchanged");
                report::empty(&mut self.output);
                self.transition(SessionState::Reported);
                return Err(SessionError::EmptyTable);
            }
        };
        if self.dump_readings {
            report::readings(&mut self.output, &table);
        }
        report::statistics(&mut self.output, &statistics);

        let fit = FitReport::from_statistics(&statistics);
        let adopted = self.calibration.adopt(&fit);
        report::fit(&mut self.output, &fit);
        info!(
            "calibration finished: {} rows, {} of {} channels adopted",
            table.len(),
            adopted,
            CHANNELS
        );

        self.transition(SessionState::Reported);
        Ok(CalibrationOutcome {
            rows: table.len(),
            stop,
            statistics,
            fit,
            adopted,
        })
    }

    /// Run one verification session against the current calibration
    ///
    /// Nothing is fitted or adopted; each row reports the calibrated
    /// estimate of every channel and its error against the reference.
    pub async fn check(&mut self) -> Result<VerificationOutcome, SessionError> {
        self.start().await;

        let mut rows = 0usize;
        let mut error_sum = [0.0f32; CHANNELS];
        let mut stop = StopReason::TableFull;

        while rows < TABLE_SIZE {
            let Some(row) = self.next_row().await else {
                stop = StopReason::Terminated;
                break;
            };

            let mut estimates = [0.0f32; CHANNELS];
            for channel in Channel::ALL {
                let j = channel.index();
                estimates[j] = self.calibration.convert(channel, row.raw[j]);
                let error = estimates[j] - row.reference;
                error_sum[j] += abs_f32(error);
            }
            report::check_row(&mut self.output, rows, row.reference, &estimates);
            rows += 1;
        }
        self.transition(SessionState::Finalizing);

        if rows == 0 {
            report::empty(&mut self.output);
            self.transition(SessionState::Reported);
            return Err(SessionError::EmptyTable);
        }

        let mut mean_abs_error = [0.0f32; CHANNELS];
        for (mean, sum) in mean_abs_error.iter_mut().zip(error_sum.iter()) {
            *mean = sum / rows as f32;
        }
        report::mean_error(&mut self.output, &mean_abs_error);
        info!("verification finished over {} rows", rows);

        self.transition(SessionState::Reported);
        Ok(VerificationOutcome {
            rows,
            stop,
            mean_abs_error,
        })
    }

    /// Print the calibration currently in effect
    pub fn report_calibration(&mut self) {
        report::calibration(&mut self.output, &self.calibration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::scripted::{LineBuffer, RecordingClock, ScriptedInput};
    use crate::domain::{FitError, TemperatureCalibration};
    use crate::protocol::{classify_line, DeviceLine, BANNER, NO_ROWS};
    use core::cell::Cell;
    use embassy_futures::block_on;

    /// Linear thermistor model: raw = gain·T + offset per channel, with a
    /// bath temperature that the test sets before each row is sampled
    struct Bath<'a> {
        temperature: &'a Cell<f32>,
        gain: [f32; CHANNELS],
        offset: [f32; CHANNELS],
    }

    impl<'a> AnalogSource for Bath<'a> {
        async fn read_raw(&mut self, channel: Channel) -> u16 {
            let j = channel.index();
            (self.gain[j] * self.temperature.get() + self.offset[j]) as u16
        }
    }

    /// Input that moves the bath to each entry's value as it is read
    struct Operator<'a> {
        script: ScriptedInput<'a>,
        temperatures: &'a [f32],
        next: usize,
        bath: &'a Cell<f32>,
    }

    impl<'a> TextInput for Operator<'a> {
        fn available(&mut self) -> bool {
            self.script.available()
        }

        fn read_char(&mut self) -> char {
            if let Some(t) = self.temperatures.get(self.next) {
                self.bath.set(*t);
            }
            let c = self.script.read_char();
            if c == '\n' {
                self.next += 1;
            }
            c
        }
    }

    fn run_calibration(
        entries: &[&str],
        temperatures: &[f32],
        gain: [f32; CHANNELS],
        offset: [f32; CHANNELS],
    ) -> (Result<CalibrationOutcome, SessionError>, LineBuffer, CalibrationSet, SessionState) {
        let bath = Cell::new(0.0);
        let input = Operator {
            script: ScriptedInput::new(entries),
            temperatures,
            next: 0,
            bath: &bath,
        };
        let source = Bath {
            temperature: &bath,
            gain,
            offset,
        };
        let mut cal = Calibrator::new(
            input,
            LineBuffer::new(),
            source,
            RecordingClock::new(),
            CalibrationConfig::fast(),
        );
        let outcome = block_on(cal.calibrate());
        let state = cal.state();
        let set = *cal.calibration();
        let (_, out, _, _) = cal.into_parts();
        (outcome, out, set, state)
    }

    #[test]
    fn test_three_rows_single_channel_exact() {
        // raw = 2·ref + 100 on channel 0
        let mut gain = [2.0; CHANNELS];
        let mut offset = [100.0; CHANNELS];
        gain[3] = 0.0;
        offset[3] = 512.0;
        let (outcome, out, set, state) = run_calibration(
            &["0\n", "50\n", "100\n", "#"],
            &[0.0, 50.0, 100.0],
            gain,
            offset,
        );
        let outcome = outcome.unwrap();

        assert_eq!(state, SessionState::Reported);
        assert_eq!(outcome.rows, 3);
        assert_eq!(outcome.stop, StopReason::Terminated);

        let fit0 = outcome.fit.get(Channel::ALL[0]).unwrap();
        assert_eq!(fit0, TemperatureCalibration::new(0.5, -50.0));
        assert_eq!(set.get(Channel::ALL[0]), fit0);

        // constant input on channel 3 is never adopted
        assert_eq!(outcome.fit.get(Channel::ALL[3]), Err(FitError::Degenerate));
        assert_eq!(outcome.adopted, CHANNELS - 1);
        assert_eq!(
            set.get(Channel::ALL[3]),
            CalibrationSet::FACTORY_DEFAULT.get(Channel::ALL[3])
        );

        let lines: heapless::Vec<DeviceLine, 96> = out.lines().map(classify_line).collect();
        assert_eq!(out.lines().nth(1), Some(BANNER));
        assert_eq!(
            lines.iter().filter(|l| matches!(l, DeviceLine::Row { .. })).count(),
            3
        );
        assert!(lines.contains(&DeviceLine::FitComplete));
        assert!(out.find("b ").unwrap().contains("--"));
    }

    #[test]
    fn test_readings_dump() {
        let bath = Cell::new(0.0);
        let input = Operator {
            script: ScriptedInput::new(&["20\n", "40\n", "#"]),
            temperatures: &[20.0, 40.0],
            next: 0,
            bath: &bath,
        };
        let source = Bath {
            temperature: &bath,
            gain: [10.0; CHANNELS],
            offset: [0.0; CHANNELS],
        };
        let mut cal = Calibrator::new(
            input,
            LineBuffer::<96>::new(),
            source,
            RecordingClock::new(),
            CalibrationConfig::fast(),
        )
        .with_readings_dump(true);

        block_on(cal.calibrate()).unwrap();
        assert_eq!(cal.output().find("2 Calibration"), Some("2 Calibration readings"));
        assert!(cal
            .output()
            .lines()
            .any(|l| l.starts_with("1) ") && l.ends_with("Cal 40.00")));
    }

    #[test]
    fn test_immediate_terminator_refuses_to_finalize() {
        let (outcome, out, set, state) =
            run_calibration(&["#"], &[], [1.0; CHANNELS], [0.0; CHANNELS]);
        assert_eq!(outcome, Err(SessionError::EmptyTable));
        assert_eq!(state, SessionState::Reported);
        assert_eq!(set, CalibrationSet::FACTORY_DEFAULT);
        assert_eq!(out.find(NO_ROWS), Some(NO_ROWS));
    }

    #[test]
    fn test_table_full_finalizes() {
        let entries: heapless::Vec<heapless::String<8>, 40> = (0..35)
            .map(|i| {
                let mut s = heapless::String::new();
                core::fmt::Write::write_fmt(&mut s, format_args!("{}\n", 10 + i)).unwrap();
                s
            })
            .collect();
        let refs: heapless::Vec<&str, 40> = entries.iter().map(|s| s.as_str()).collect();
        let temps: heapless::Vec<f32, 40> = (0..35).map(|i| (10 + i) as f32).collect();

        let (outcome, _, _, _) =
            run_calibration(&refs, &temps, [4.0; CHANNELS], [200.0; CHANNELS]);
        let outcome = outcome.unwrap();
        assert_eq!(outcome.stop, StopReason::TableFull);
        assert_eq!(outcome.rows, TABLE_SIZE);
        assert_eq!(outcome.adopted, CHANNELS);
        let fit = outcome.fit.get(Channel::ALL[5]).unwrap();
        assert!((fit.slope - 0.25).abs() < 1e-5);
        assert!((fit.intercept + 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_check_reports_mean_abs_error() {
        let bath = Cell::new(0.0);
        let input = Operator {
            script: ScriptedInput::new(&["20\n", "40\n", "#"]),
            temperatures: &[20.0, 40.0],
            next: 0,
            bath: &bath,
        };
        // raw = 10·T; calibration reads 0.1·raw + 1, one degree high everywhere
        let source = Bath {
            temperature: &bath,
            gain: [10.0; CHANNELS],
            offset: [0.0; CHANNELS],
        };
        let set = CalibrationSet::new([TemperatureCalibration::new(0.1, 1.0); CHANNELS]);
        let mut cal = Calibrator::new(
            input,
            LineBuffer::<96>::new(),
            source,
            RecordingClock::new(),
            CalibrationConfig::fast(),
        )
        .with_calibration(set);

        let outcome = block_on(cal.check()).unwrap();
        assert_eq!(outcome.rows, 2);
        assert_eq!(outcome.stop, StopReason::Terminated);
        for e in outcome.mean_abs_error.iter() {
            assert!((e - 1.0).abs() < 1e-4);
        }
        // verification never changes the calibration
        assert_eq!(*cal.calibration(), set);
        assert_eq!(
            cal.output().lines().last().map(classify_line),
            Some(DeviceLine::CheckComplete)
        );
    }

    #[test]
    fn test_check_errors_below_reference_count_as_positive() {
        let bath = Cell::new(0.0);
        let input = Operator {
            script: ScriptedInput::new(&["20\n", "40\n", "#"]),
            temperatures: &[20.0, 40.0],
            next: 0,
            bath: &bath,
        };
        let source = Bath {
            temperature: &bath,
            gain: [10.0; CHANNELS],
            offset: [0.0; CHANNELS],
        };
        // even channels read one degree low, odd channels one degree high
        let mut lines = [TemperatureCalibration::new(0.1, 1.0); CHANNELS];
        for line in lines.iter_mut().step_by(2) {
            *line = TemperatureCalibration::new(0.1, -1.0);
        }
        let mut cal = Calibrator::new(
            input,
            LineBuffer::<96>::new(),
            source,
            RecordingClock::new(),
            CalibrationConfig::fast(),
        )
        .with_calibration(CalibrationSet::new(lines));

        let outcome = block_on(cal.check()).unwrap();
        assert_eq!(outcome.rows, 2);
        for e in outcome.mean_abs_error.iter() {
            assert!((e - 1.0).abs() < 1e-4, "mean error {e}");
        }
    }

    #[test]
    fn test_startup_and_sampling_time() {
        let bath = Cell::new(25.0);
        let source = Bath {
            temperature: &bath,
            gain: [4.0; CHANNELS],
            offset: [0.0; CHANNELS],
        };
        let mut cal = Calibrator::new(
            ScriptedInput::new(&["25", "#"]),
            LineBuffer::<96>::new(),
            source,
            RecordingClock::new(),
            CalibrationConfig {
                char_delay_ms: 0,
                ..CalibrationConfig::DEFAULT
            },
        );
        let outcome = block_on(cal.calibrate());
        assert_eq!(outcome.map(|o| o.rows), Ok(1));
        let (_, _, _, clock) = cal.into_parts();
        // 500 ms startup, 20 samples × 2 ms on each of 6 channels
        assert_eq!(clock.elapsed_ms(), 500 + 20 * 2 * CHANNELS as u64);
    }
}
