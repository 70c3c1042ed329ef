//! I/O capabilities used by direct execution.
//!
//! The engine never touches stdin, stdout or the filesystem itself; the
//! direct-execution strategy talks to these traits instead, so tests can
//! swap in in-memory buffers.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

/// Default file that `:` appends to.
pub const DEFAULT_DUMP_FILE: &str = "bf-file.txt";

/// What a single `,` received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputValue {
    Integer(i64),
    /// A line that did not parse as an integer.
    Malformed(String),
    Eof,
}

/// Blocking "read one integer".
pub trait InputSource {
    fn read_value(&mut self) -> io::Result<InputValue>;
}

/// "Write text" for `.`.
pub trait OutputSink {
    fn write_text(&mut self, text: &str) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Append-only byte channel for `:`.
pub trait ByteSink {
    fn append(&mut self, byte: u8) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Reads one integer per line from any buffered reader.
pub struct LineInput<R> {
    reader: R,
}

impl<R: BufRead> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> InputSource for LineInput<R> {
    fn read_value(&mut self) -> io::Result<InputValue> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(InputValue::Eof);
        }
        let trimmed = line.trim();
        Ok(match trimmed.parse::<i64>() {
            Ok(n) => InputValue::Integer(n),
            Err(_) => InputValue::Malformed(trimmed.to_string()),
        })
    }
}

/// Writes `.` output to any writer, optionally ending each value with a newline.
pub struct WriterOutput<W> {
    writer: W,
    newline: bool,
}

impl<W: Write> WriterOutput<W> {
    pub fn new(writer: W, newline: bool) -> Self {
        Self { writer, newline }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSink for WriterOutput<W> {
    fn write_text(&mut self, text: &str) -> io::Result<()> {
        self.writer.write_all(text.as_bytes())?;
        if self.newline {
            self.writer.write_all(b"\n")?;
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl OutputSink for String {
    fn write_text(&mut self, text: &str) -> io::Result<()> {
        self.push_str(text);
        Ok(())
    }
}

impl ByteSink for Vec<u8> {
    fn append(&mut self, byte: u8) -> io::Result<()> {
        self.push(byte);
        Ok(())
    }
}

impl ByteSink for io::Sink {
    fn append(&mut self, _byte: u8) -> io::Result<()> {
        Ok(())
    }
}

/// Appends bytes to a file, never truncating it.
///
/// The file is opened on the first byte so runs that never dump leave no
/// file behind. Buffered bytes are flushed by [`ByteSink::flush`] and on drop.
pub struct AppendFile {
    path: PathBuf,
    file: Option<BufWriter<File>>,
}

impl AppendFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), file: None }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file(&mut self) -> io::Result<&mut BufWriter<File>> {
        let file = match self.file.take() {
            Some(file) => file,
            None => {
                debug!(path = %self.path.display(), "opening dump file for append");
                let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
                BufWriter::new(file)
            }
        };
        Ok(self.file.insert(file))
    }
}

impl ByteSink for AppendFile {
    fn append(&mut self, byte: u8) -> io::Result<()> {
        self.file()?.write_all(&[byte])
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}
