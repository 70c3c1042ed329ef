use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use clap::Args;
use tracing::debug;

use crate::cli_util::print_run_error;
use crate::config::{EngineConfig, Settings};
use crate::sinks::{AppendFile, LineInput, WriterOutput};
use crate::{Engine, Interpreter, RunError, StepControl};

use super::{env_value, install_interrupt_handler, load_program};

/// How long a cancelled run gets to flush its sinks before we give up on it.
const CANCEL_GRACE: Duration = Duration::from_millis(500);

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Print a step-by-step table of operations instead of performing I/O
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Read code from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Source lines; each argument is one line
    #[arg(value_name = "code", trailing_var_arg = true, allow_hyphen_values = true)]
    pub code: Vec<String>,

    /// `.` prints characters and `:` appends to the dump file
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

    /// File that `:` appends to (default bf-file.txt)
    #[arg(long = "dump-file", value_name = "PATH")]
    pub dump_file: Option<PathBuf>,

    /// Do not print a newline after every `.`
    #[arg(long = "no-newline")]
    pub no_newline: bool,

    /// Wall-clock timeout in milliseconds (fallback BFC_TIMEOUT_MS; default none)
    #[arg(long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum interpreter steps before abort (fallback BFC_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<usize>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let RunArgs {
        debug,
        file,
        code,
        ascii,
        overflow_guard,
        comment,
        balanced_loops,
        dump_file,
        no_newline,
        timeout_ms,
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

    // Resolve options: flags -> env -> config file -> defaults
    let settings = Settings::load();
    let config = EngineConfig {
        overflow_guard: overflow_guard || settings.overflow_guard,
        ascii: ascii || settings.ascii,
        comment: comment.unwrap_or(settings.comment),
        match_policy: if balanced_loops {
            crate::MatchPolicy::Nearest
        } else {
            settings.match_policy()
        },
        ..EngineConfig::default()
    };
    let dump_file = dump_file.unwrap_or_else(|| settings.dump_file.clone());
    let newline = settings.newline && !no_newline;
    let timeout_ms = timeout_ms.or_else(|| env_value("BFC_TIMEOUT_MS")).or(settings.timeout_ms);
    let max_steps = max_steps.or_else(|| env_value("BFC_MAX_STEPS")).or(settings.max_steps);

    let parsed = match load_program(program, file.as_deref(), &code, config.comment) {
        Ok(p) => p,
        Err(exit_code) => return exit_code,
    };
    let flat_code = parsed.text().to_string();

    let cancel = Arc::new(AtomicBool::new(false));
    install_interrupt_handler(cancel.clone());

    // Execute on a worker thread with cooperative cancellation
    let (tx, rx) = mpsc::channel::<Result<(), RunError>>();
    let ctrl = StepControl::new(max_steps, cancel.clone());

    thread::spawn(move || {
        let mut engine = Engine::new(parsed, config);
        let res = if debug {
            let mut fx = Interpreter::new(LineInput::new(io::empty()), WriterOutput::new(io::sink(), false), io::sink());
            engine.run_debug_with_control(&mut fx, &mut io::stdout(), &ctrl)
        } else {
            // Stdout stays unlocked: after a timeout the main thread still
            // flushes it while this thread may be parked in a read.
            let mut fx = Interpreter::new(
                LineInput::new(io::stdin().lock()),
                WriterOutput::new(io::stdout(), newline),
                AppendFile::new(dump_file),
            );
            engine.run_with_control(&mut fx, &ctrl)
        };
        debug!(steps = engine.steps(), "worker done");
        let _ = tx.send(res);
    });

    let received = match timeout_ms {
        Some(ms) => rx.recv_timeout(Duration::from_millis(ms)),
        None => rx.recv().map_err(|_| mpsc::RecvTimeoutError::Disconnected),
    };

    let exit_code = match received {
        Ok(Ok(())) => 0,
        Ok(Err(RunError::StepLimitExceeded { limit })) => {
            eprintln!("Execution aborted: step limit exceeded ({limit})");
            let _ = io::stderr().flush();
            1
        }
        Ok(Err(RunError::Canceled)) => {
            eprintln!("Execution aborted: interrupted");
            let _ = io::stderr().flush();
            1
        }
        Ok(Err(other)) => {
            print_run_error(Some(program), &flat_code, &other);
            1
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            cancel.store(true, Ordering::Relaxed);
            // Give the worker a chance to stop and flush its sinks.
            let _ = rx.recv_timeout(CANCEL_GRACE);
            eprintln!(
                "Execution aborted: wall-clock timeout exceeded ({} ms)",
                timeout_ms.unwrap_or_default()
            );
            let _ = io::stderr().flush();
            1
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => 1,
    };

    let _ = io::stdout().flush();
    exit_code
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [OPTIONS] "<line>" ["<line>" ...]
  {0} run [OPTIONS] --file <PATH>

Options:
  --file,  -f <PATH>     Read code from PATH instead of positional lines
  --ascii, -a            Print `.` as characters; enable `:` byte dumps
  --overflow-guard       Abort when `+` is applied to a cell holding 255
  --comment <CHAR>       Extra comment character (`;` is always accepted)
  --balanced-loops       Pair `[` with the first depth-zero `]`
  --dump-file <PATH>     File `:` appends to (default bf-file.txt)
  --no-newline           Do not print a newline after every `.`
  --timeout <MS>         Abort after MS milliseconds
  --max-steps <N>        Abort after N instructions
  --debug, -d            Print a step-by-step table of operations instead of executing
  --help,  -h            Show this help

Notes:
- Instructions: + - < > [ ] , . : ;
- Input (`,`) reads one integer per line from stdin and keeps its low byte;
  on EOF the current cell is set to 0.
- Any other character is rejected before the program runs.

Examples:
- Load code from a file:
    {0} run --file ./program.bf
- Feed numbers to `,`:
    printf '3\n4\n' | {0} run ",>,<[->+<]>."
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
