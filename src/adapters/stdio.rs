//! Terminal console adapters
//!
//! Stdin is read line by line on a background thread so `available()` never
//! blocks. Each line is delivered as one transmission, newline included.
//! End of input reads as the terminator.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use crate::ports::{Clock, TextInput, TextOutput};
use crate::protocol::TERMINATOR;

/// Non-blocking operator input from stdin
pub struct StdinInput {
    lines: Receiver<String>,
    pending: VecDeque<char>,
    closed: bool,
}

impl StdinInput {
    /// Spawn the reader thread
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let Ok(mut line) = line else { break };
                line.push('\n');
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self::from_receiver(rx)
    }

    /// Input fed from any sender of whole lines
    pub fn from_receiver(lines: Receiver<String>) -> Self {
        Self {
            lines,
            pending: VecDeque::new(),
            closed: false,
        }
    }
}

impl TextInput for StdinInput {
    fn available(&mut self) -> bool {
        if !self.pending.is_empty() || self.closed {
            return true;
        }
        match self.lines.try_recv() {
            Ok(line) => {
                self.pending.extend(line.chars());
                !self.pending.is_empty()
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                debug!("stdin closed");
                self.closed = true;
                true
            }
        }
    }

    fn read_char(&mut self) -> char {
        self.pending.pop_front().unwrap_or(TERMINATOR)
    }
}

/// Report output to stdout, flushed at every line break
#[derive(Debug, Default)]
pub struct StdoutOutput;

impl TextOutput for StdoutOutput {
    fn write(&mut self, text: &str) {
        let mut out = io::stdout().lock();
        let _ = out.write_all(text.as_bytes());
        if text.contains('\n') {
            let _ = out.flush();
        }
    }
}

/// Wall-clock delays
#[derive(Clone, Copy, Debug, Default)]
pub struct StdClock;

impl Clock for StdClock {
    async fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(ms as u64));
    }
}
