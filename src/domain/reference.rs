//! Operator reference temperature grammar
//!
//! Digits before the first `.` build the integer part, digits after it the
//! fraction. `#` ends the session. Everything else, including a second `.`,
//! is ignored.

use crate::protocol::{DECIMAL_POINT, TERMINATOR};

/// What the operator sent for one calibration row
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReferenceInput {
    /// A reference temperature in Celsius
    Value(f32),
    /// The operator asked to stop collecting
    Terminate,
}

/// Result of feeding one character
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    Continue,
    Terminate,
}

/// Incremental decimal parser, fed one character at a time
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DecimalAccumulator {
    value: f32,
    /// Weight of the next fractional digit; zero while in the integer part
    divisor: f32,
}

impl DecimalAccumulator {
    pub const fn new() -> Self {
        Self {
            value: 0.0,
            divisor: 0.0,
        }
    }

    /// Consume one character
    pub fn push(&mut self, c: char) -> Step {
        if c == TERMINATOR {
            return Step::Terminate;
        }
        if c == DECIMAL_POINT {
            // Only the first point switches modes
            if self.divisor == 0.0 {
                self.divisor = 10.0;
            }
            return Step::Continue;
        }
        if let Some(digit) = c.to_digit(10) {
            let digit = digit as f32;
            if self.divisor == 0.0 {
                self.value = self.value * 10.0 + digit;
            } else {
                self.value += digit / self.divisor;
                self.divisor *= 10.0;
            }
        }
        Step::Continue
    }

    /// Value accumulated so far
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Start over for the next entry
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Parse a complete entry
pub fn parse_reference(text: &str) -> ReferenceInput {
    let mut acc = DecimalAccumulator::new();
    for c in text.chars() {
        if acc.push(c) == Step::Terminate {
            return ReferenceInput::Terminate;
        }
    }
    ReferenceInput::Value(acc.value())
}
