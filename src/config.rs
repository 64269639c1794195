//! Calibration timing and sizing configuration

/// Number of analog thermistor inputs (ports 0..=5)
pub const CHANNELS: usize = 6;

/// Maximum calibration rows per session
///
/// Sized for the SRAM of the smallest supported board.
pub const TABLE_SIZE: usize = 30;

/// Largest value a 10-bit ADC conversion can return
pub const ADC_MAX: u16 = 1023;

/// Configuration for a calibration session
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationConfig {
    /// Raw ADC reads averaged into one reading (noise reduction)
    pub samples_per_reading: u16,
    /// Delay after each raw read to let the ADC settle (milliseconds)
    pub settle_delay_ms: u32,
    /// Backoff between polls while waiting for operator input (milliseconds)
    pub input_poll_ms: u32,
    /// Delay after each consumed input character (milliseconds)
    pub char_delay_ms: u32,
    /// Wait for the transport to come up before a session starts (milliseconds)
    pub startup_delay_ms: u32,
}

impl CalibrationConfig {
    /// Timing used on the bench hardware
    pub const DEFAULT: Self = Self {
        samples_per_reading: 20,
        settle_delay_ms: 2,
        input_poll_ms: 100,
        char_delay_ms: 10,
        startup_delay_ms: 500,
    };

    /// Same averaging, no delays (simulation and tests)
    pub const fn fast() -> Self {
        Self {
            samples_per_reading: 20,
            settle_delay_ms: 0,
            input_poll_ms: 0,
            char_delay_ms: 0,
            startup_delay_ms: 0,
        }
    }

    /// Averaging count, never zero
    pub const fn effective_samples(&self) -> u16 {
        if self.samples_per_reading == 0 {
            1
        } else {
            self.samples_per_reading
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
