//! Emission mode: `,` and `.` become host-language statements.
//!
//! The tape is still simulated while emitting, so a `.` is written out as a
//! literal of whatever the cell holds at that point. A `,` produces a
//! read-and-bind statement and leaves the cell alone. `:` emits nothing.

use std::collections::HashMap;

use crate::effects::Effects;
use crate::error::RunError;

/// Formats statements for one host language.
pub trait CodeEmitter {
    /// Statement reading one integer from the console into a new binding `ident`.
    fn read_bind(&self, ident: &str) -> String;

    /// Statement writing `expr` to the console.
    fn write(&self, expr: &str) -> String;

    /// Literal for a cell value: an integer, or a character in ASCII mode.
    fn literal(&self, value: u8, ascii: bool) -> String;

    /// Surround emitted statements with a minimal runnable program.
    fn wrap(&self, body: &str) -> String;
}

/// Output languages the CLI can emit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Target {
    #[default]
    #[value(name = "csharp", alias = "cs")]
    CSharp,
    #[value(name = "rust", alias = "rs")]
    Rust,
}

/// Console statements for C#.
#[derive(Debug, Clone, Copy, Default)]
pub struct CSharp;

impl CodeEmitter for CSharp {
    fn read_bind(&self, ident: &str) -> String {
        format!("int {ident} = int.Parse(Console.ReadLine());\n")
    }

    fn write(&self, expr: &str) -> String {
        format!("Console.Write({expr});\n")
    }

    fn literal(&self, value: u8, ascii: bool) -> String {
        if !ascii {
            return value.to_string();
        }
        match value {
            b'\'' => "'\\''".to_string(),
            b'\\' => "'\\\\'".to_string(),
            0x20..=0x7e => format!("'{}'", char::from(value)),
            _ => format!("'\\u{value:04X}'"),
        }
    }

    fn wrap(&self, body: &str) -> String {
        let mut out = String::from("using System;\n\nclass Program\n{\n    static void Main()\n    {\n");
        for line in body.lines() {
            out.push_str("        ");
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("    }\n}\n");
        out
    }
}

/// Console statements for Rust.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rust;

impl CodeEmitter for Rust {
    fn read_bind(&self, ident: &str) -> String {
        format!(
            "let {ident}: i64 = std::io::stdin().lines().next().and_then(|l| l.ok()).and_then(|l| l.trim().parse().ok()).unwrap_or(0);\n"
        )
    }

    fn write(&self, expr: &str) -> String {
        format!("print!(\"{{}}\", {expr});\n")
    }

    fn literal(&self, value: u8, ascii: bool) -> String {
        if ascii {
            format!("{:?}", char::from(value))
        } else {
            value.to_string()
        }
    }

    fn wrap(&self, body: &str) -> String {
        let mut out = String::from("#[allow(unused_variables)]\nfn main() {\n");
        for line in body.lines() {
            out.push_str("    ");
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("}\n");
        out
    }
}

/// Binding name for the `occurrence`-th read by the `,` at `ip`.
/// A `,` inside a loop reads once per pass, so later passes get a suffix.
pub fn input_ident(ip: usize, occurrence: usize) -> String {
    match occurrence {
        0 => format!("_Line{ip}_Char{ip}"),
        n => format!("_Line{ip}_Char{ip}_{n}"),
    }
}

/// Effect strategy that accumulates statements instead of doing I/O.
pub struct Emission<E> {
    emitter: E,
    buffer: String,
    reads: HashMap<usize, usize>,
}

impl<E: CodeEmitter> Emission<E> {
    pub fn new(emitter: E) -> Self {
        Self { emitter, buffer: String::new(), reads: HashMap::new() }
    }

    /// Statements emitted so far, one per line.
    pub fn statements(&self) -> &str {
        &self.buffer
    }

    /// The emitted statements, optionally wrapped into a full program.
    pub fn into_output(self, wrap: bool) -> String {
        if wrap {
            self.emitter.wrap(&self.buffer)
        } else {
            self.buffer
        }
    }
}

impl<E: CodeEmitter> Effects for Emission<E> {
    fn input(&mut self, ip: usize) -> Result<Option<u8>, RunError> {
        let seen = self.reads.entry(ip).or_insert(0);
        let statement = self.emitter.read_bind(&input_ident(ip, *seen));
        *seen += 1;
        self.buffer.push_str(&statement);
        Ok(None)
    }

    fn output(&mut self, _ip: usize, value: u8, ascii: bool) -> Result<(), RunError> {
        let literal = self.emitter.literal(value, ascii);
        let statement = self.emitter.write(&literal);
        self.buffer.push_str(&statement);
        Ok(())
    }

    fn dump(&mut self, _ip: usize, _value: u8) -> Result<(), RunError> {
        Ok(())
    }
}
