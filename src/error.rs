use std::fmt;

/// Rejection of a program before any instruction runs.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Encountered a character outside the instruction alphabet.
    #[error("Invalid character '{ch}' on line {line}, column {column}")]
    InvalidCharacter { line: usize, column: usize, ch: char },
}

/// Errors that abort a program that has already started running.
///
/// Every `ip` is an index into the flattened instruction stream, never a
/// source line number.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The data pointer attempted to move left of cell 0 or beyond the last cell.
    #[error("Pointer out of range at instruction {ip} (ptr={pointer}, op='{op}')")]
    PointerOutOfRange { ip: usize, pointer: usize, op: char },

    /// `+` on a cell already holding 255 while the overflow guard is on.
    #[error("Stack overflow at instruction {ip} (ptr={pointer}, value={value})")]
    StackOverflow { ip: usize, pointer: usize, value: u8 },

    /// A loop symbol whose partner could not be found.
    #[error("Unbalanced loop {kind} at instruction {ip}")]
    UnbalancedLoop { ip: usize, kind: LoopSide },

    /// `,` received something that does not parse as an integer.
    #[error("Invalid input {text:?} at instruction {ip}")]
    InvalidInput { ip: usize, text: String },

    /// An underlying I/O error occurred in one of the sinks.
    #[error("I/O error at instruction {ip}: {source}")]
    Io {
        ip: usize,
        #[source]
        source: std::io::Error,
    },

    /// Execution aborted due to step limit.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: usize },

    /// Execution aborted due to cooperative cancellation (e.g., timeout or ctrl+c)
    #[error("Execution aborted: cancelled")]
    Canceled,
}

impl RunError {
    /// Instruction index the error points at, when it has one.
    pub fn ip(&self) -> Option<usize> {
        match self {
            RunError::PointerOutOfRange { ip, .. }
            | RunError::StackOverflow { ip, .. }
            | RunError::UnbalancedLoop { ip, .. }
            | RunError::InvalidInput { ip, .. }
            | RunError::Io { ip, .. } => Some(*ip),
            RunError::StepLimitExceeded { .. } | RunError::Canceled => None,
        }
    }
}

/// Which side of the loop was left without a partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopSide {
    Open,
    Close,
}

impl fmt::Display for LoopSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopSide::Open => write!(f, "'['"),
            LoopSide::Close => write!(f, "']'"),
        }
    }
}
