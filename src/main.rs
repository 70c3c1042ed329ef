use clap::{Parser, Subcommand};
use rust_bfc::commands::{emit, run};
use std::env;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

fn print_top_usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run  [OPTIONS] "<line>"...        # Execute code (each argument is one source line)
  {0} run  [OPTIONS] --file <PATH>      # Execute code loaded from file
  {0} emit [OPTIONS] "<line>"...        # Emit C#/Rust statements for the program's I/O
  {0} emit [OPTIONS] --file <PATH>      # Emit statements for code loaded from file

Run "{0} <subcommand> --help" for more info.
Set BFC_LOG (e.g. BFC_LOG=debug) to see diagnostic logs on stderr.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

#[derive(Parser, Debug)]
#[command(name = "bfc", disable_help_flag = true, disable_help_subcommand = true)]
struct Cli {
    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Run(run::RunArgs),
    Emit(emit::EmitArgs),
}

/// Diagnostic logs go to stderr; program output owns stdout.
fn init_logging() {
    let filter = EnvFilter::try_from_env("BFC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_logging();

    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("bfc"));

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        print_top_usage_and_exit(&program, if cli.help { 0 } else { 2 });
    };
    if cli.help {
        print_top_usage_and_exit(&program, 0);
    }

    let code = match command {
        Command::Run(args) => run::run(&program, args),
        Command::Emit(args) => emit::run(&program, args),
    };

    std::process::exit(code);
}
