use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Args;

use crate::cli_util::print_run_error;
use crate::config::{EngineConfig, Settings};
use crate::emit::{CSharp, CodeEmitter, Emission, Rust, Target};
use crate::{Engine, MatchPolicy, Program, RunError, StepControl};

use super::{env_value, install_interrupt_handler, load_program};

/// Emission simulates the tape, so an endless loop would never finish.
const DEFAULT_EMIT_STEPS: usize = 10_000_000;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct EmitArgs {
    /// Read code from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Source lines; each argument is one line
    #[arg(value_name = "code", trailing_var_arg = true, allow_hyphen_values = true)]
    pub code: Vec<String>,

    /// Emit `.` values as character literals
    #[arg(short = 'a', long = "ascii")]
    pub ascii: bool,

    /// Abort when `+` would push a cell past 255
    #[arg(long = "overflow-guard")]
    pub overflow_guard: bool,

    /// Extra character accepted as a comment marker
    #[arg(long = "comment", value_name = "CHAR")]
    pub comment: Option<char>,

    /// Pair each `[` with the first depth-zero `]` after it
    #[arg(long = "balanced-loops")]
    pub balanced_loops: bool,

    /// Language of the emitted statements
    #[arg(short = 't', long = "target", value_enum, default_value_t = Target::CSharp)]
    pub target: Target,

    /// Surround the statements with a minimal program
    #[arg(short = 'w', long = "wrap")]
    pub wrap: bool,

    /// Write statements to PATH instead of stdout
    #[arg(short = 'o', long = "out", value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Maximum simulated steps before abort (fallback BFC_MAX_STEPS)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<usize>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: EmitArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let EmitArgs {
        file,
        code,
        ascii,
        overflow_guard,
        comment,
        balanced_loops,
        target,
        wrap,
        out,
        max_steps,
        ..
    } = args;

    if file.is_none() && code.is_empty() {
        usage_and_exit(program, 2);
    }

    if file.is_some() && !code.is_empty() {
        eprintln!("{program}: cannot use positional code together with --file");
        usage_and_exit(program, 2);
    }

    let settings = Settings::load();
    let config = EngineConfig {
        overflow_guard: overflow_guard || settings.overflow_guard,
        ascii: ascii || settings.ascii,
        comment: comment.unwrap_or(settings.comment),
        match_policy: if balanced_loops { MatchPolicy::Nearest } else { settings.match_policy() },
        ..EngineConfig::default()
    };
    let max_steps = max_steps
        .or_else(|| env_value("BFC_MAX_STEPS"))
        .or(settings.max_steps)
        .unwrap_or(DEFAULT_EMIT_STEPS);

    let parsed = match load_program(program, file.as_deref(), &code, config.comment) {
        Ok(p) => p,
        Err(exit_code) => return exit_code,
    };

    let cancel = Arc::new(AtomicBool::new(false));
    install_interrupt_handler(cancel.clone());
    let ctrl = StepControl::new(Some(max_steps), cancel);

    let emitted = match target {
        Target::CSharp => emit_with(CSharp, parsed, config, &ctrl, wrap),
        Target::Rust => emit_with(Rust, parsed, config, &ctrl, wrap),
    };

    let text = match emitted {
        Ok(text) => text,
        Err((err, flat_code)) => {
            print_run_error(Some(program), &flat_code, &err);
            return 1;
        }
    };

    match out {
        Some(path) => {
            if let Err(e) = fs::write(&path, text) {
                eprintln!("{program}: failed to write {}: {e}", path.display());
                let _ = io::stderr().flush();
                return 1;
            }
        }
        None => {
            print!("{text}");
            let _ = io::stdout().flush();
        }
    }
    0
}

/// Run the program in emission mode, returning the statement text or the
/// fault together with the flattened code for error context.
fn emit_with<E: CodeEmitter>(
    emitter: E,
    parsed: Program,
    config: EngineConfig,
    ctrl: &StepControl,
    wrap: bool,
) -> Result<String, (RunError, String)> {
    let mut engine = Engine::new(parsed, config);
    let mut fx = Emission::new(emitter);
    match engine.run_with_control(&mut fx, ctrl) {
        Ok(()) => Ok(fx.into_output(wrap)),
        Err(err) => Err((err, engine.program().text().to_string())),
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} emit [OPTIONS] "<line>" ["<line>" ...]
  {0} emit [OPTIONS] --file <PATH>

Options:
  --file,   -f <PATH>    Read code from PATH instead of positional lines
  --target, -t <LANG>    csharp (default) or rust
  --wrap,   -w           Surround the statements with a minimal program
  --out,    -o <PATH>    Write statements to PATH instead of stdout
  --ascii,  -a           Emit `.` values as character literals
  --overflow-guard       Abort when `+` is applied to a cell holding 255
  --comment <CHAR>       Extra comment character (`;` is always accepted)
  --balanced-loops       Pair `[` with the first depth-zero `]`
  --max-steps <N>        Abort after N simulated instructions
  --help,   -h           Show this help

Notes:
- Arithmetic, pointer moves and loops are evaluated while emitting, so each
  `.` is emitted as a literal of the cell value at that point.
- `,` emits a statement that reads an integer into a fresh binding; `:` emits nothing.

Examples:
    {0} emit "++." "," "."
    {0} emit --target rust --wrap --file ./program.bf
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
