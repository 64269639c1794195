//! Bounded calibration sample table
//!
//! Rows are appended in the order the operator enters them and never change
//! afterwards. Capacity is fixed at compile time so the table fits the
//! device's static memory budget.

use heapless::Vec;

use crate::config::{CHANNELS, TABLE_SIZE};
use crate::domain::channel::Channel;

/// One calibration observation
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SampleRow {
    /// Operator-supplied reference temperature (Celsius)
    pub reference: f32,
    /// Averaged raw reading per channel
    pub raw: [f32; CHANNELS],
}

impl SampleRow {
    pub const fn new(reference: f32, raw: [f32; CHANNELS]) -> Self {
        Self { reference, raw }
    }

    /// Raw reading for one channel
    pub fn raw(&self, channel: Channel) -> f32 {
        self.raw[channel.index()]
    }
}

/// Error type for table operations
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TableError {
    /// Table already holds `capacity` rows
    #[error("sample table is full")]
    Full,
}

/// Fixed-capacity table of calibration rows with per-channel extrema
#[derive(Clone, Debug)]
pub struct SampleTable<const N: usize = TABLE_SIZE> {
    rows: Vec<SampleRow, N>,
    min: [f32; CHANNELS],
    max: [f32; CHANNELS],
}

impl<const N: usize> SampleTable<N> {
    /// Create an empty table
    pub const fn new() -> Self {
        Self {
            rows: Vec::new(),
            min: [f32::INFINITY; CHANNELS],
            max: [f32::NEG_INFINITY; CHANNELS],
        }
    }

    /// Append a row and fold it into the running extrema
    ///
    /// Fails once the table holds `N` rows; the rejected row is dropped.
    pub fn append(&mut self, reference: f32, raw: [f32; CHANNELS]) -> Result<(), TableError> {
        self.push(SampleRow::new(reference, raw))
    }

    /// Append an already built row
    pub fn push(&mut self, row: SampleRow) -> Result<(), TableError> {
        self.rows.push(row).map_err(|_| TableError::Full)?;

        for (j, &x) in row.raw.iter().enumerate() {
            if x < self.min[j] {
                self.min[j] = x;
            }
            if x > self.max[j] {
                self.max[j] = x;
            }
        }
        Ok(())
    }

    /// Rows in insertion order
    pub fn rows(&self) -> &[SampleRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.rows.is_full()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Smallest and largest raw reading seen on `channel`
    ///
    /// Returns `None` while the table is empty.
    pub fn extrema(&self, channel: Channel) -> Option<(f32, f32)> {
        if self.rows.is_empty() {
            return None;
        }
        let j = channel.index();
        Some((self.min[j], self.max[j]))
    }
}

impl<const N: usize> Default for SampleTable<N> {
    fn default() -> Self {
        Self::new()
    }
}
