//! The instruction-dispatch state machine.
//!
//! State is `(cursor, pointer, frames)`. The cursor walks the flattened
//! stream left to right; loop symbols move it. A run ends when the cursor
//! reaches the end of the stream or an instruction faults. A fault aborts
//! the run before the failing instruction changes the pointer or the tape.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::config::EngineConfig;
use crate::effects::Effects;
use crate::error::{LoopSide, RunError};
use crate::resolver::LoopResolver;
use crate::source::{Op, Program};
use crate::tape::{Tape, TapeFault};

/// Record of an entered loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopFrame {
    /// Index of the `[`.
    pub open: usize,
    /// Index of its resolved `]`, if one exists.
    pub close: Option<usize>,
    /// Data pointer when the loop was entered. Diagnostic only.
    pub pointer: usize,
}

/// Controls for cooperative cancellation and step limiting.
#[derive(Clone)]
pub struct StepControl {
    pub max_steps: Option<usize>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl StepControl {
    pub fn new(max_steps: Option<usize>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self { max_steps, cancel_flag }
    }
}

/// Runs one program over one tape. Not meant to be shared across threads.
pub struct Engine {
    program: Program,
    config: EngineConfig,
    tape: Tape,
    pointer: usize,
    cursor: usize,
    frames: Vec<LoopFrame>,
    resolver: LoopResolver,
    steps: usize,
}

impl Engine {
    pub fn new(program: Program, config: EngineConfig) -> Self {
        Self {
            program,
            tape: Tape::with_capacity(config.capacity, config.overflow_guard),
            pointer: 0,
            cursor: 0,
            frames: Vec::new(),
            resolver: LoopResolver::new(config.match_policy),
            steps: 0,
            config,
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn frames(&self) -> &[LoopFrame] {
        &self.frames
    }

    /// Instructions executed so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Execute the program until completion.
    pub fn run<E: Effects>(&mut self, effects: &mut E) -> Result<(), RunError> {
        self.execute(effects, None, None)
    }

    /// Execute with cooperative cancellation and optional step limit.
    pub fn run_with_control<E: Effects>(
        &mut self,
        effects: &mut E,
        control: &StepControl,
    ) -> Result<(), RunError> {
        self.execute(effects, None, Some(control))
    }

    /// Execute while writing a step-by-step table of operations to `trace`.
    pub fn run_debug<E: Effects>(
        &mut self,
        effects: &mut E,
        trace: &mut dyn Write,
    ) -> Result<(), RunError> {
        self.execute(effects, Some(trace), None)
    }

    pub fn run_debug_with_control<E: Effects>(
        &mut self,
        effects: &mut E,
        trace: &mut dyn Write,
        control: &StepControl,
    ) -> Result<(), RunError> {
        self.execute(effects, Some(trace), Some(control))
    }

    fn execute<E: Effects>(
        &mut self,
        effects: &mut E,
        trace: Option<&mut dyn Write>,
        control: Option<&StepControl>,
    ) -> Result<(), RunError> {
        debug!(
            instructions = self.program.len(),
            capacity = self.tape.capacity(),
            overflow_guard = self.config.overflow_guard,
            ascii = self.config.ascii,
            "starting run"
        );

        let result = self.dispatch(effects, trace, control);
        // Sinks are flushed on every exit path so partial output survives a fault.
        let finished = effects.finish(self.cursor);

        match result {
            Ok(()) => {
                debug!(steps = self.steps, "run finished");
                finished
            }
            Err(err) => {
                debug!(steps = self.steps, error = %err, "run aborted");
                Err(err)
            }
        }
    }

    fn dispatch<E: Effects>(
        &mut self,
        effects: &mut E,
        mut trace: Option<&mut dyn Write>,
        control: Option<&StepControl>,
    ) -> Result<(), RunError> {
        let code_len = self.program.len();

        if let Some(out) = trace.as_mut() {
            let header = writeln!(out, "STEP | IP  | PTR | CELL | INSTR | ACTION").and_then(|_| {
                writeln!(out, "-----+-----+-----+------+-------+------------------------------------------------")
            });
            header.map_err(|source| RunError::Io { ip: self.cursor, source })?;
        }

        while self.cursor < code_len {
            if let Some(ctrl) = control {
                if ctrl.cancel_flag.load(Ordering::Relaxed) {
                    return Err(RunError::Canceled);
                }
                if let Some(max) = ctrl.max_steps {
                    if self.steps >= max {
                        return Err(RunError::StepLimitExceeded { limit: max });
                    }
                }
            }

            let ip = self.cursor;
            let op = self.program.ops()[ip];
            let (ptr_before, cell_before) = (self.pointer, self.tape.read(self.pointer));
            let mut action: Option<String> = trace.as_ref().map(|_| String::new());

            match op {
                Op::Increment => {
                    let after = self.tape.increment(self.pointer).map_err(|f| fault(ip, op, f))?;
                    if let Some(a) = action.as_mut() { *a = format!("Increment cell[{ptr_before}] from {cell_before} to {after}"); }
                }
                Op::Decrement => {
                    let after = self.tape.decrement(self.pointer);
                    if let Some(a) = action.as_mut() { *a = format!("Decrement cell[{ptr_before}] from {cell_before} to {after}"); }
                }
                Op::Left => {
                    self.pointer = self.tape.move_left(self.pointer).map_err(|f| fault(ip, op, f))?;
                    if let Some(a) = action.as_mut() { *a = format!("Moved pointer head to index {}", self.pointer); }
                }
                Op::Right => {
                    self.pointer = self.tape.move_right(self.pointer).map_err(|f| fault(ip, op, f))?;
                    if let Some(a) = action.as_mut() { *a = format!("Moved pointer head to index {}", self.pointer); }
                }
                Op::Input => {
                    let stored = effects.input(ip)?;
                    if let Some(byte) = stored {
                        self.tape.write(self.pointer, byte);
                    }
                    if let Some(a) = action.as_mut() {
                        *a = match stored {
                            Some(byte) => format!("Read {byte} into cell[{ptr_before}]"),
                            None => "Emitted read statement (cell unchanged)".to_string(),
                        };
                    }
                }
                Op::Output => {
                    effects.output(ip, cell_before, self.config.ascii)?;
                    if let Some(a) = action.as_mut() { *a = format!("Output value {cell_before}"); }
                }
                Op::Dump => {
                    if self.config.ascii {
                        effects.dump(ip, cell_before)?;
                    }
                    if let Some(a) = action.as_mut() {
                        *a = if self.config.ascii {
                            format!("Dump byte {cell_before}")
                        } else {
                            "Dump skipped (ASCII mode off)".to_string()
                        };
                    }
                }
                Op::LoopOpen => {
                    let close = self.resolver.resolve(self.program.ops(), ip);
                    if cell_before != 0 {
                        self.frames.push(LoopFrame { open: ip, close, pointer: self.pointer });
                        if let Some(a) = action.as_mut() { *a = "Enter loop (cell != 0)".to_string(); }
                    } else {
                        let Some(j) = close else {
                            return Err(RunError::UnbalancedLoop { ip, kind: LoopSide::Open });
                        };
                        if let Some(a) = action.as_mut() { *a = format!("Cell is 0; jump forward to matching ']' at IP {j}"); }
                        self.cursor = j;
                    }
                }
                Op::LoopClose => {
                    if cell_before != 0 {
                        let Some(frame) = self.frames.last() else {
                            return Err(RunError::UnbalancedLoop { ip, kind: LoopSide::Close });
                        };
                        let j = frame.open;
                        if let Some(a) = action.as_mut() { *a = format!("Cell != 0; jump back to matching '[' at IP {j}"); }
                        self.cursor = j;
                    } else {
                        if self.frames.pop().is_none() {
                            return Err(RunError::UnbalancedLoop { ip, kind: LoopSide::Close });
                        }
                        if let Some(a) = action.as_mut() { *a = "Exit loop (cell is 0)".to_string(); }
                    }
                }
                Op::Comment => {
                    if let Some(a) = action.as_mut() { *a = "Comment (no effect)".to_string(); }
                }
            }

            if let Some(out) = trace.as_mut() {
                writeln!(
                    out,
                    "{:<4} | {:<3} | {:<3} | {:<4} |  {}    | {}",
                    self.steps,
                    ip,
                    ptr_before,
                    cell_before,
                    op,
                    action.unwrap_or_default()
                )
                .map_err(|source| RunError::Io { ip, source })?;
            }

            self.steps += 1;
            // Move to the next instruction; jumps land on the loop symbol itself.
            self.cursor += 1;
        }

        Ok(())
    }
}

fn fault(ip: usize, op: Op, f: TapeFault) -> RunError {
    match f {
        TapeFault::PointerOutOfRange { pointer } => {
            RunError::PointerOutOfRange { ip, pointer, op: op.symbol() }
        }
        TapeFault::Overflow { pointer, value } => RunError::StackOverflow { ip, pointer, value },
    }
}
