//! Adapters - concrete implementations of ports
//!
//! Adapters connect the calibration core to the outside world by
//! implementing the port traits.
//!
//! # Available Adapters
//!
//! - **scripted**: canned operator input, line-capturing output, recording clock
//! - **simulated** (std): thermistor bank in a virtual bath
//! - **stdio** (std): terminal console and thread-sleep clock
//! - **embedded** (`embedded` feature): embedded-hal delay, serial, ADC

pub mod scripted;

#[cfg(feature = "std")]
pub mod simulated;

#[cfg(feature = "std")]
pub mod stdio;

#[cfg(feature = "embedded")]
pub mod embedded;

pub use scripted::{LineBuffer, RecordingClock, ScriptedInput};

#[cfg(feature = "std")]
pub use simulated::{Bath, BathFollower, SimulatedThermistors};

#[cfg(feature = "std")]
pub use stdio::{StdClock, StdinInput, StdoutOutput};

#[cfg(feature = "embedded")]
pub use embedded::{AdcBank, HalDelay, SerialInput, SerialOutput};
