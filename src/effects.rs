//! Effect strategies: what `,`, `.` and `:` do.
//!
//! The engine owns the dispatch loop and the tape; everything that leaves the
//! process goes through an [`Effects`] implementation. [`Interpreter`] performs
//! the I/O directly, [`crate::emit::Emission`] turns it into host-language
//! statements instead.

use crate::error::RunError;
use crate::sinks::{ByteSink, InputSource, InputValue, OutputSink};

pub trait Effects {
    /// `,` at instruction `ip`. `Some(byte)` is stored at the pointer,
    /// `None` leaves the cell untouched.
    fn input(&mut self, ip: usize) -> Result<Option<u8>, RunError>;

    /// `.` at instruction `ip` for a cell holding `value`.
    fn output(&mut self, ip: usize, value: u8, ascii: bool) -> Result<(), RunError>;

    /// `:` at instruction `ip`. Only called in ASCII mode.
    fn dump(&mut self, ip: usize, value: u8) -> Result<(), RunError>;

    /// Called once when the run ends, whether it succeeded or not.
    fn finish(&mut self, _ip: usize) -> Result<(), RunError> {
        Ok(())
    }
}

/// Text for a cell value: its decimal form, or the character with that code.
pub fn render_value(value: u8, ascii: bool) -> String {
    if ascii {
        char::from(value).to_string()
    } else {
        value.to_string()
    }
}

/// Direct execution against an input source, an output sink and a byte sink.
pub struct Interpreter<I, O, D> {
    input: I,
    output: O,
    dump: D,
}

impl<I, O, D> Interpreter<I, O, D>
where
    I: InputSource,
    O: OutputSink,
    D: ByteSink,
{
    pub fn new(input: I, output: O, dump: D) -> Self {
        Self { input, output, dump }
    }

    pub fn output_sink(&self) -> &O {
        &self.output
    }

    pub fn dump_sink(&self) -> &D {
        &self.dump
    }

    pub fn into_parts(self) -> (I, O, D) {
        (self.input, self.output, self.dump)
    }
}

impl<I, O, D> Effects for Interpreter<I, O, D>
where
    I: InputSource,
    O: OutputSink,
    D: ByteSink,
{
    fn input(&mut self, ip: usize) -> Result<Option<u8>, RunError> {
        // Nothing written so far may sit in a buffer while we block.
        self.finish(ip)?;

        match self.input.read_value().map_err(|source| RunError::Io { ip, source })? {
            // Truncate to the low byte, so 300 stores 44 and -1 stores 255.
            InputValue::Integer(n) => Ok(Some(n as u8)),
            InputValue::Malformed(text) => Err(RunError::InvalidInput { ip, text }),
            InputValue::Eof => Ok(Some(0)),
        }
    }

    fn output(&mut self, ip: usize, value: u8, ascii: bool) -> Result<(), RunError> {
        self.output
            .write_text(&render_value(value, ascii))
            .map_err(|source| RunError::Io { ip, source })
    }

    fn dump(&mut self, ip: usize, value: u8) -> Result<(), RunError> {
        self.dump.append(value).map_err(|source| RunError::Io { ip, source })
    }

    fn finish(&mut self, ip: usize) -> Result<(), RunError> {
        let output = self.output.flush();
        let dump = self.dump.flush();
        output.and(dump).map_err(|source| RunError::Io { ip, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::LineInput;
    use std::io;

    fn interpreter(input: &'static str) -> Interpreter<LineInput<&'static [u8]>, String, Vec<u8>> {
        Interpreter::new(LineInput::new(input.as_bytes()), String::new(), Vec::new())
    }

    #[test]
    fn renders_numeric_and_ascii_forms() {
        assert_eq!(render_value(2, false), "2");
        assert_eq!(render_value(2, true), "\u{2}");
        assert_eq!(render_value(65, true), "A");
        assert_eq!(render_value(233, true), "é");
    }

    #[test]
    fn input_truncates_to_a_byte() {
        let mut fx = interpreter("300\n-1\n65\n");
        assert_eq!(fx.input(0).unwrap(), Some(44));
        assert_eq!(fx.input(1).unwrap(), Some(255));
        assert_eq!(fx.input(2).unwrap(), Some(65));
        assert_eq!(fx.input(3).unwrap(), Some(0));
    }

    #[test]
    fn malformed_input_is_an_error() {
        let mut fx = interpreter("twelve\n");
        let err = fx.input(4).unwrap_err();
        assert!(matches!(err, RunError::InvalidInput { ip: 4, ref text } if text == "twelve"));
    }

    #[test]
    fn output_and_dump_reach_their_sinks() {
        let mut fx = interpreter("");
        fx.output(0, 72, true).unwrap();
        fx.output(1, 2, false).unwrap();
        fx.dump(2, 9).unwrap();
        fx.finish(3).unwrap();
        let (_, out, dump) = fx.into_parts();
        assert_eq!(out, "H2");
        assert_eq!(dump, vec![9]);
    }

    #[derive(Default)]
    struct CountingDump {
        bytes: Vec<u8>,
        flushed: usize,
    }

    impl ByteSink for CountingDump {
        fn append(&mut self, byte: u8) -> io::Result<()> {
            self.bytes.push(byte);
            Ok(())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushed = self.bytes.len();
            Ok(())
        }
    }

    #[test]
    fn dumped_bytes_are_flushed_before_blocking_on_input() {
        let mut fx = Interpreter::new(LineInput::new(&b"1\n"[..]), String::new(), CountingDump::default());
        fx.dump(0, 3).unwrap();
        fx.input(1).unwrap();
        assert_eq!(fx.dump_sink().flushed, 1);
    }

    struct BrokenSink;

    impl OutputSink for BrokenSink {
        fn write_text(&mut self, _text: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn sink_failures_carry_the_instruction_index() {
        let mut fx = Interpreter::new(LineInput::new(&b""[..]), BrokenSink, io::sink());
        let err = fx.output(11, 1, false).unwrap_err();
        assert!(matches!(err, RunError::Io { ip: 11, .. }));
    }
}
