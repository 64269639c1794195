//! Board adapters over the embedded-hal ecosystem traits
//!
//! These let firmware plug any HAL into the calibrator:
//!
//! - **HalDelay**: async delay provider (`embedded_hal_async::delay::DelayNs`)
//! - **SerialInput** / **SerialOutput**: UART or USB serial byte streams
//!   (`embedded_io`)
//! - **AdcBank**: blocking ADC reads through a board-specific closure

use embedded_hal_async::delay::DelayNs;
use embedded_io::{Read, ReadReady, Write};

use crate::config::CHANNELS;
use crate::domain::Channel;
use crate::ports::{AnalogSource, Clock, TextInput, TextOutput};
use crate::protocol::TERMINATOR;

/// Clock backed by a HAL delay
pub struct HalDelay<D> {
    delay: D,
}

impl<D: DelayNs> HalDelay<D> {
    pub fn new(delay: D) -> Self {
        Self { delay }
    }
}

impl<D: DelayNs> Clock for HalDelay<D> {
    async fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms).await;
    }
}

/// Operator input from a serial receiver, one byte per character
pub struct SerialInput<R> {
    rx: R,
}

impl<R: Read + ReadReady> SerialInput<R> {
    pub fn new(rx: R) -> Self {
        Self { rx }
    }

    pub fn into_inner(self) -> R {
        self.rx
    }
}

impl<R: Read + ReadReady> TextInput for SerialInput<R> {
    fn available(&mut self) -> bool {
        self.rx.read_ready().unwrap_or(false)
    }

    fn read_char(&mut self) -> char {
        let mut byte = [0u8; 1];
        match self.rx.read(&mut byte) {
            Ok(1) => byte[0] as char,
            // a dead link ends the session rather than stalling it
            _ => {
                warn!("serial read failed, ending session");
                TERMINATOR
            }
        }
    }
}

/// Report output to a serial transmitter
///
/// Write errors are dropped; the report is best effort.
pub struct SerialOutput<W> {
    tx: W,
}

impl<W: Write> SerialOutput<W> {
    pub fn new(tx: W) -> Self {
        Self { tx }
    }

    pub fn into_inner(self) -> W {
        self.tx
    }
}

impl<W: Write> TextOutput for SerialOutput<W> {
    fn write(&mut self, text: &str) {
        for chunk in text.split_inclusive('\n') {
            if let Some(line) = chunk.strip_suffix('\n') {
                let _ = self.tx.write_all(line.as_bytes());
                let _ = self.tx.write_all(b"\r\n");
                let _ = self.tx.flush();
            } else {
                let _ = self.tx.write_all(chunk.as_bytes());
            }
        }
    }
}

/// Analog source over a blocking per-channel read
///
/// The closure maps a channel to its pin and performs one conversion,
/// e.g. `|ch| adc.blocking_read(&mut pins[ch.index()]).unwrap_or(0)`.
pub struct AdcBank<F> {
    read: F,
    last_raw: [u16; CHANNELS],
}

impl<F: FnMut(Channel) -> u16> AdcBank<F> {
    pub fn new(read: F) -> Self {
        Self {
            read,
            last_raw: [0; CHANNELS],
        }
    }

    /// Most recent conversion per channel, for diagnostics
    pub fn last_raw(&self) -> [u16; CHANNELS] {
        self.last_raw
    }
}

impl<F: FnMut(Channel) -> u16> AnalogSource for AdcBank<F> {
    async fn read_raw(&mut self, channel: Channel) -> u16 {
        let raw = (self.read)(channel);
        self.last_raw[channel.index()] = raw;
        raw
    }
}
