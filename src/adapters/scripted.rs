//! Scripted console and clock adapters
//!
//! Deterministic stand-ins for the operator, the console and the timer.
//! The calibration loop runs unchanged while these feed it canned input and
//! record what it did.

use heapless::{String, Vec};

use crate::ports::{Clock, TextInput, TextOutput, MAX_LINE};
use crate::protocol::TERMINATOR;

/// Operator input replayed from a list of transmissions
///
/// Each entry is one transmission: its characters are available back to
/// back, then `available()` reports a single gap before the next entry
/// starts. Once the script is exhausted the input answers with the
/// terminator, as an operator giving up would.
#[derive(Clone, Debug)]
pub struct ScriptedInput<'a> {
    batches: &'a [&'a str],
    batch: usize,
    pos: usize,
    idle: u32,
}

impl<'a> ScriptedInput<'a> {
    pub const fn new(batches: &'a [&'a str]) -> Self {
        Self {
            batches,
            batch: 0,
            pos: 0,
            idle: 0,
        }
    }

    /// Report no input for the first `polls` calls to `available()`
    pub const fn idle_polls(mut self, polls: u32) -> Self {
        self.idle = polls;
        self
    }

    /// Whether every transmission has been consumed
    pub fn is_exhausted(&self) -> bool {
        self.batch >= self.batches.len()
    }
}

impl<'a> TextInput for ScriptedInput<'a> {
    fn available(&mut self) -> bool {
        if self.idle > 0 {
            self.idle -= 1;
            return false;
        }
        let Some(current) = self.batches.get(self.batch) else {
            return true;
        };
        if self.pos < current.len() {
            return true;
        }
        // end of this transmission
        self.batch += 1;
        self.pos = 0;
        false
    }

    fn read_char(&mut self) -> char {
        let Some(current) = self.batches.get(self.batch) else {
            return TERMINATOR;
        };
        match current[self.pos..].chars().next() {
            Some(c) => {
                self.pos += c.len_utf8();
                c
            }
            None => TERMINATOR,
        }
    }
}

/// Output sink that keeps every completed line
///
/// Lines past `LINES` are counted but dropped; long lines are cut at
/// [`MAX_LINE`].
#[derive(Clone, Debug, Default)]
pub struct LineBuffer<const LINES: usize = 96> {
    lines: Vec<String<MAX_LINE>, LINES>,
    partial: String<MAX_LINE>,
    dropped: usize,
}

impl<const LINES: usize> LineBuffer<LINES> {
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            partial: String::new(),
            dropped: 0,
        }
    }

    /// Completed lines, oldest first
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines.iter().map(|l| l.as_str())
    }

    /// Text written since the last line break
    pub fn partial(&self) -> &str {
        &self.partial
    }

    /// Number of lines that did not fit
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// First completed line starting with `prefix`
    pub fn find(&self, prefix: &str) -> Option<&str> {
        self.lines().find(|l| l.starts_with(prefix))
    }

    fn finish_line(&mut self) {
        let line = core::mem::take(&mut self.partial);
        if self.lines.push(line).is_err() {
            self.dropped += 1;
        }
    }
}

impl<const LINES: usize> TextOutput for LineBuffer<LINES> {
    fn write(&mut self, text: &str) {
        for c in text.chars() {
            match c {
                '\n' => self.finish_line(),
                '\r' => {}
                c => {
                    let _ = self.partial.push(c);
                }
            }
        }
    }
}

/// Clock that returns immediately and adds up the requested delays
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecordingClock {
    elapsed_ms: u64,
}

impl RecordingClock {
    pub const fn new() -> Self {
        Self { elapsed_ms: 0 }
    }

    /// Total delay requested so far
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }
}

impl Clock for RecordingClock {
    async fn delay_ms(&mut self, ms: u32) {
        self.elapsed_ms += ms as u64;
    }
}
