//! Text ports - operator console input and report output
//!
//! These traits model the serial console without knowing the specific
//! transport (UART, USB CDC, stdin/stdout, scripted test input).

use core::fmt;

/// Longest report line formatted through [`TextOutput::write_fmt`]
pub const MAX_LINE: usize = 192;

/// Port for character input from the operator
pub trait TextInput {
    /// Whether at least one character can be read without blocking
    fn available(&mut self) -> bool;

    /// Read the next character
    ///
    /// Only called after `available()` returned `true`.
    fn read_char(&mut self) -> char;
}

/// Port for line-oriented report output
///
/// `write!`/`writeln!` work on any implementation through `write_fmt`.
pub trait TextOutput {
    /// Write text without a line break
    fn write(&mut self, text: &str);

    /// Write text followed by a line break
    fn write_line(&mut self, text: &str) {
        self.write(text);
        self.write("\n");
    }

    /// Format into a bounded buffer and write the result
    ///
    /// Output longer than [`MAX_LINE`] is cut at the buffer limit.
    fn write_fmt(&mut self, args: fmt::Arguments<'_>) {
        let mut line = Truncating(heapless::String::new());
        let _ = fmt::write(&mut line, args);
        self.write(&line.0);
    }
}

impl<T: TextInput + ?Sized> TextInput for &mut T {
    fn available(&mut self) -> bool {
        (**self).available()
    }

    fn read_char(&mut self) -> char {
        (**self).read_char()
    }
}

impl<T: TextOutput + ?Sized> TextOutput for &mut T {
    fn write(&mut self, text: &str) {
        (**self).write(text)
    }

    fn write_line(&mut self, text: &str) {
        (**self).write_line(text)
    }
}

/// Keeps whatever fits instead of failing the whole format call
struct Truncating(heapless::String<MAX_LINE>);

impl fmt::Write for Truncating {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}
