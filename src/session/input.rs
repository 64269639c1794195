//! Reading reference temperatures from the operator console

use crate::config::CalibrationConfig;
use crate::domain::reference::{DecimalAccumulator, ReferenceInput, Step};
use crate::ports::{Clock, TextInput};

/// Waits for one operator entry and parses it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReferenceReader {
    poll_ms: u32,
    char_delay_ms: u32,
}

impl ReferenceReader {
    pub const fn new(poll_ms: u32, char_delay_ms: u32) -> Self {
        Self {
            poll_ms,
            char_delay_ms,
        }
    }

    pub const fn from_config(config: &CalibrationConfig) -> Self {
        Self::new(config.input_poll_ms, config.char_delay_ms)
    }

    /// Block until input arrives, then consume everything available
    ///
    /// Polls `available()` every `poll_ms`. There is no timeout; only the
    /// terminator ends a session early. Characters after a terminator are
    /// left unread.
    pub async fn read_reference<I: TextInput, C: Clock>(
        &self,
        input: &mut I,
        clock: &mut C,
    ) -> ReferenceInput {
        while !input.available() {
            clock.delay_ms(self.poll_ms).await;
        }

        let mut acc = DecimalAccumulator::new();
        while input.available() {
            let c = input.read_char();
            if self.char_delay_ms > 0 {
                clock.delay_ms(self.char_delay_ms).await;
            }
            if acc.push(c) == Step::Terminate {
                debug!("terminator received");
                return ReferenceInput::Terminate;
            }
        }

        trace!("reference entry {}", acc.value());
        ReferenceInput::Value(acc.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::scripted::{RecordingClock, ScriptedInput};
    use embassy_futures::block_on;

    #[test]
    fn test_prefix_then_terminator() {
        let mut input = ScriptedInput::new(&["23.5", "#"]);
        let mut clock = RecordingClock::new();
        let reader = ReferenceReader::new(100, 0);

        let first = block_on(reader.read_reference(&mut input, &mut clock));
        assert_eq!(first, ReferenceInput::Value(23.5));
        let second = block_on(reader.read_reference(&mut input, &mut clock));
        assert_eq!(second, ReferenceInput::Terminate);
    }

    #[test]
    fn test_terminator_in_same_transmission() {
        let mut input = ScriptedInput::new(&["23.5#"]);
        let mut clock = RecordingClock::new();
        let reader = ReferenceReader::new(100, 0);

        let got = block_on(reader.read_reference(&mut input, &mut clock));
        assert_eq!(got, ReferenceInput::Terminate);
    }

    #[test]
    fn test_polls_with_backoff_until_input() {
        let mut input = ScriptedInput::new(&["42\n"]).idle_polls(3);
        let mut clock = RecordingClock::new();
        let reader = ReferenceReader::new(100, 10);

        let got = block_on(reader.read_reference(&mut input, &mut clock));
        assert_eq!(got, ReferenceInput::Value(42.0));
        // three empty polls, then 10 ms for each of the three characters
        assert_eq!(clock.elapsed_ms(), 3 * 100 + 3 * 10);
    }
}
