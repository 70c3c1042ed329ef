use std::io::{self, IsTerminal, Write};

use nu_ansi_term::Color;

use crate::{RunError, SourceError};

/// Prefix `msg` with the program name and paint it red on a terminal.
fn header(program: Option<&str>, msg: &str) -> String {
    let text = match program {
        Some(p) => format!("{p}: {msg}"),
        None => msg.to_string(),
    };
    if io::stderr().is_terminal() {
        Color::Red.bold().paint(text).to_string()
    } else {
        text
    }
}

/// Report a rejected program: which line and which character.
pub fn print_source_error(program: Option<&str>, err: &SourceError) {
    match err {
        SourceError::InvalidCharacter { line, column, ch } => {
            eprintln!(
                "{}",
                header(program, &format!("Parse error: invalid character {ch:?} on line {line}, column {column}"))
            );
        }
    }
    let _ = io::stderr().flush();
}

/// Pretty-print a runtime fault with caret positioning into the flattened
/// instruction stream `code`.
pub fn print_run_error(program: Option<&str>, code: &str, err: &RunError) {
    match err {
        RunError::PointerOutOfRange { ip, pointer, op } => {
            let msg = header(program, &format!("Runtime error: pointer out of range (ptr={pointer}, op={op})"));
            print_error_with_context(&msg, code, *ip);
        }
        RunError::StackOverflow { ip, pointer, value } => {
            let msg = header(program, &format!("Runtime error: stack overflow (ptr={pointer}, value={value})"));
            print_error_with_context(&msg, code, *ip);
        }
        RunError::UnbalancedLoop { ip, kind } => {
            let msg = header(program, &format!("Runtime error: unbalanced loop {kind}"));
            print_error_with_context(&msg, code, *ip);
        }
        RunError::InvalidInput { ip, text } => {
            let msg = header(program, &format!("Input error: {text:?} is not an integer"));
            print_error_with_context(&msg, code, *ip);
        }
        RunError::Io { ip, source } => {
            let msg = header(program, &format!("I/O error: {source}"));
            print_error_with_context(&msg, code, *ip);
        }
        RunError::StepLimitExceeded { .. } | RunError::Canceled => {
            eprintln!("{err}");
            let _ = io::stderr().flush();
        }
    }
}

/// Print a concise error with instruction index and a caret context window,
/// working with UTF-8 by slicing using char indices.
pub fn print_error_with_context(prefix: &str, code: &str, pos: usize) {
    let mut stderr = io::stderr().lock();
    let _ = write_error_with_context(&mut stderr, prefix, code, pos);
    let _ = stderr.flush();
}

fn write_error_with_context(out: &mut impl Write, prefix: &str, code: &str, pos: usize) -> io::Result<()> {
    writeln!(out, "{prefix} at instruction {pos}")?;

    // Show a short window around the position for context
    const WINDOW_CHARS: usize = 32;

    let total_chars = code.chars().count();
    let start_char = pos.saturating_sub(WINDOW_CHARS);
    let end_char = (pos + WINDOW_CHARS + 1).min(total_chars);

    let window: String = code.chars().skip(start_char).take(end_char.saturating_sub(start_char)).collect();
    writeln!(out, "  {window}")?;

    // Caret under the exact position
    let caret_offset_chars = pos.saturating_sub(start_char);
    writeln!(out, "  {}^", " ".repeat(caret_offset_chars))
}
