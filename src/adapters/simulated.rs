//! Simulated thermistor bank
//!
//! Each channel behaves like a thermistor whose true transfer function is a
//! known [`TemperatureCalibration`](crate::domain::TemperatureCalibration): the ADC reports
//! `(T - intercept) / slope` counts plus uniform noise. All channels sit in
//! the same bath, whose temperature is shared with a [`BathFollower`] so the
//! readings track what the operator types.

use std::cell::Cell;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ADC_MAX;
use crate::domain::reference::{DecimalAccumulator, Step};
use crate::domain::{CalibrationSet, Channel};
use crate::ports::{AnalogSource, TextInput};

/// Shared bath temperature in °C
pub type Bath = Rc<Cell<f32>>;

/// ADC model for six thermistors in one bath
pub struct SimulatedThermistors {
    bath: Bath,
    truth: CalibrationSet,
    noise: f32,
    rng: StdRng,
}

impl SimulatedThermistors {
    /// Bank following `bath`, with the factory calibration as ground truth
    pub fn new(bath: Bath, seed: u64) -> Self {
        Self {
            bath,
            truth: CalibrationSet::FACTORY_DEFAULT,
            noise: 0.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Replace the ground-truth transfer functions
    pub fn with_truth(mut self, truth: CalibrationSet) -> Self {
        self.truth = truth;
        self
    }

    /// Uniform noise amplitude in ADC counts
    pub fn with_noise(mut self, counts: f32) -> Self {
        self.noise = counts.max(0.0);
        self
    }

    pub fn truth(&self) -> &CalibrationSet {
        &self.truth
    }

    pub fn bath(&self) -> &Bath {
        &self.bath
    }

    fn conversion(&mut self, channel: Channel) -> u16 {
        let cal = self.truth.get(channel);
        let mut counts = if cal.slope != 0.0 {
            (self.bath.get() - cal.intercept) / cal.slope
        } else {
            0.0
        };
        if self.noise > 0.0 {
            counts += self.rng.gen_range(-self.noise..=self.noise);
        }
        counts.round().clamp(0.0, ADC_MAX as f32) as u16
    }
}

impl AnalogSource for SimulatedThermistors {
    async fn read_raw(&mut self, channel: Channel) -> u16 {
        self.conversion(channel)
    }
}

/// Console input that moves the bath to each value the operator enters
///
/// Characters pass through unchanged. When a transmission ends, the parsed
/// value becomes the new bath temperature, before the calibrator samples.
pub struct BathFollower<I> {
    inner: I,
    bath: Bath,
    entry: DecimalAccumulator,
    pending: bool,
}

impl<I: TextInput> BathFollower<I> {
    pub fn new(inner: I, bath: Bath) -> Self {
        Self {
            inner,
            bath,
            entry: DecimalAccumulator::new(),
            pending: false,
        }
    }

    pub fn into_inner(self) -> I {
        self.inner
    }
}

impl<I: TextInput> TextInput for BathFollower<I> {
    fn available(&mut self) -> bool {
        let available = self.inner.available();
        if !available && self.pending {
            self.bath.set(self.entry.value());
            self.entry.reset();
            self.pending = false;
        }
        available
    }

    fn read_char(&mut self) -> char {
        let c = self.inner.read_char();
        match self.entry.push(c) {
            Step::Continue => self.pending = true,
            Step::Terminate => {
                self.entry.reset();
                self.pending = false;
            }
        }
        c
    }
}
