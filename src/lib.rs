//! Thermistor Calibration Library
//!
//! Interactive two-parameter calibration for a bank of six thermistors on
//! analog inputs. The operator places the thermistors in a bath, types the
//! reference temperature, and the calibrator averages every channel. When the
//! operator sends `#` (or the table fills), a least-squares line
//! `T = slope · raw + intercept` is fitted per channel and reported.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                                 │
//! │  - SampleTable, Statistics, FitReport                           │
//! │  - TemperatureCalibration / CalibrationSet                      │
//! │  - reference entry grammar                                      │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Session (Calibrator)                         │
//! │  - collect → statistics → fit → report                          │
//! │  - verification against the current calibration                │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Ports (Traits)                               │
//! │  - AnalogSource: raw ADC conversions                            │
//! │  - TextInput / TextOutput: operator console                     │
//! │  - Clock: settle, poll and startup delays                       │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Adapters                                     │
//! │  - scripted: test input, line capture, recording clock          │
//! │  - simulated / stdio: host simulation (std)                     │
//! │  - embedded: embedded-hal delay, serial, ADC                    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The core is `no_std` and allocation-free; tables and report lines live in
//! `heapless` buffers.

#![cfg_attr(not(feature = "std"), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

// ============================================================================
// Protocol (shared between host and device)
// ============================================================================

pub mod protocol;

pub use protocol::{classify_line, DeviceLine};

// ============================================================================
// Hexagonal Architecture
// ============================================================================

/// Compile-time sizes and session timing
pub mod config;

/// Domain layer - pure calibration logic
pub mod domain;

/// Ports - traits defining boundaries
pub mod ports;

/// Adapters - concrete implementations
pub mod adapters;

/// Calibration service
pub mod session;

pub use config::{CalibrationConfig, ADC_MAX, CHANNELS, TABLE_SIZE};

// Re-export key domain types
pub use domain::{
    CalibrationSet, Channel, FitError, FitReport, ReferenceInput, SampleRow, SampleTable,
    Statistics, TemperatureCalibration,
};

// Re-export key port traits
pub use ports::{AnalogSource, Clock, TextInput, TextOutput};

pub use session::{
    CalibrationOutcome, Calibrator, SessionError, SessionState, StopReason, VerificationOutcome,
};
