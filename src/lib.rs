//! An interpreter and statement emitter for a ten-symbol Brainfuck dialect.
//!
//! Programs operate on a memory tape of 30,000 byte cells with a single data
//! pointer. Besides the eight classic instructions the dialect knows `:`
//! (append the current cell to a byte file in ASCII mode) and `;` (comment).
//!
//! Features and behaviors:
//! - Source is validated line by line before anything runs; the first bad
//!   character is reported with its line number.
//! - Strict pointer bounds: moving left from cell 0 or right past the end
//!   returns an error.
//! - Cells wrap on `+` and `-`; an optional overflow guard turns `+` on 255
//!   into an error instead.
//! - Input `,` reads one integer per line and keeps its low byte.
//! - Output `.` writes the cell as a number, or as a character in ASCII mode.
//! - Two effect strategies share one dispatch loop: direct execution
//!   ([`Interpreter`]) and emission of host-language statements ([`Emission`]).
//!
//! Quick start:
//!
//! ```no_run
//! use rust_bfc::{Engine, EngineConfig, Interpreter, Program};
//! use rust_bfc::sinks::{LineInput, WriterOutput};
//!
//! let program = Program::parse("++++++++[>+++++++++<-]>.", ';').expect("valid source");
//! let config = EngineConfig { ascii: true, ..EngineConfig::default() };
//! let mut engine = Engine::new(program, config);
//! let mut effects = Interpreter::new(
//!     LineInput::new(std::io::stdin().lock()),
//!     WriterOutput::new(std::io::stdout(), false),
//!     std::io::sink(),
//! );
//! engine.run(&mut effects).expect("program should run");
//! println!(); // ensure a trailing newline for readability
//! ```

pub mod cli_util;
pub mod commands;
pub mod config;
pub mod effects;
pub mod emit;
pub mod engine;
pub mod error;
pub mod resolver;
pub mod sinks;
pub mod source;
pub mod tape;

pub use config::{EngineConfig, Settings};
pub use effects::{Effects, Interpreter};
pub use emit::{CodeEmitter, Emission, Target};
pub use engine::{Engine, LoopFrame, StepControl};
pub use error::{LoopSide, RunError, SourceError};
pub use resolver::{MatchPolicy, find_match};
pub use source::{Op, Program};
pub use tape::{TAPE_CAPACITY, Tape};
