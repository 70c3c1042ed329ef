//! Subcommands of the `bfc` binary.

pub mod emit;
pub mod run;

use std::fs;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

use crate::cli_util::print_source_error;
use crate::Program;

/// Load the program from `--file` or from positional code, one argument per
/// source line. Returns the exit code on failure.
fn load_program(program: &str, file: Option<&str>, code: &[String], comment: char) -> Result<Program, i32> {
    let parsed = match file {
        Some(path) => match fs::read_to_string(path) {
            Ok(s) => Program::parse(&s, comment),
            Err(e) => {
                eprintln!("{program}: failed to read code file as UTF-8: {e}");
                let _ = io::stderr().flush();
                return Err(1);
            }
        },
        None => Program::from_lines(code, comment),
    };

    parsed.map_err(|err| {
        print_source_error(Some(program), &err);
        1
    })
}

/// Read `name` from the environment, ignoring unparsable values.
fn env_value<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse::<T>().ok())
}

/// First ctrl+c asks the running program to stop so sinks get flushed;
/// a second one exits immediately.
fn install_interrupt_handler(cancel: Arc<AtomicBool>) {
    let result = ctrlc::set_handler(move || {
        if cancel.swap(true, Ordering::Relaxed) {
            let _ = io::stdout().flush();
            let _ = io::stderr().flush();
            std::process::exit(130);
        }
    });
    if let Err(e) = result {
        warn!(error = %e, "failed to set ctrl+c handler");
    }
}
