//! Source validation and flattening.
//!
//! A program arrives as text lines. Every character on every line must be one
//! of the ten instruction symbols `+ - [ ] , . < > ; :` (or the configured
//! comment character). Line structure carries no meaning: after validation
//! the lines are concatenated into a single instruction stream.

use std::fmt;

use crate::error::SourceError;

/// The fixed instruction alphabet.
pub const ALPHABET: [char; 10] = ['+', '-', '[', ']', ',', '.', '<', '>', ';', ':'];

/// Default comment marker.
pub const DEFAULT_COMMENT: char = ';';

/// One decoded instruction symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Increment,
    Decrement,
    Left,
    Right,
    Input,
    Output,
    Dump,
    LoopOpen,
    LoopClose,
    Comment,
}

impl Op {
    /// Decode `ch`, treating `comment` as a no-op marker in addition to `;`.
    /// Instruction symbols always win over the comment marker.
    pub fn from_char(ch: char, comment: char) -> Option<Op> {
        let op = match ch {
            '+' => Op::Increment,
            '-' => Op::Decrement,
            '<' => Op::Left,
            '>' => Op::Right,
            ',' => Op::Input,
            '.' => Op::Output,
            ':' => Op::Dump,
            '[' => Op::LoopOpen,
            ']' => Op::LoopClose,
            ';' => Op::Comment,
            c if c == comment => Op::Comment,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(self) -> char {
        match self {
            Op::Increment => '+',
            Op::Decrement => '-',
            Op::Left => '<',
            Op::Right => '>',
            Op::Input => ',',
            Op::Output => '.',
            Op::Dump => ':',
            Op::LoopOpen => '[',
            Op::LoopClose => ']',
            Op::Comment => ';',
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Check every character of every line against the alphabet.
///
/// Fails on the first line holding a disallowed character, reporting the
/// 1-based line and column of the first such character on that line. On
/// success the lines are handed back untouched, ready for flattening.
pub fn validate<S: AsRef<str>>(lines: &[S], comment: char) -> Result<&[S], SourceError> {
    for (line_idx, line) in lines.iter().enumerate() {
        for (col_idx, ch) in line.as_ref().chars().enumerate() {
            if Op::from_char(ch, comment).is_none() {
                return Err(SourceError::InvalidCharacter {
                    line: line_idx + 1,
                    column: col_idx + 1,
                    ch,
                });
            }
        }
    }
    Ok(lines)
}

/// A validated, flattened instruction stream. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    ops: Vec<Op>,
    text: String,
}

impl Program {
    /// Validate and flatten already-split source lines.
    pub fn from_lines<S: AsRef<str>>(lines: &[S], comment: char) -> Result<Self, SourceError> {
        let lines = validate(lines, comment)?;

        let mut text = String::new();
        for line in lines {
            text.push_str(line.as_ref());
        }
        let ops = text
            .chars()
            .filter_map(|ch| Op::from_char(ch, comment))
            .collect();

        Ok(Self { ops, text })
    }

    /// Split raw program text into lines (`\r\n` and `\n` both end a line)
    /// and build the program from them.
    pub fn parse(source: &str, comment: char) -> Result<Self, SourceError> {
        let normalized = source.replace("\r\n", "\n");
        let lines: Vec<&str> = normalized.split('\n').collect();
        Self::from_lines(&lines, comment)
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// The flattened stream as text; char `i` is instruction `i`.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_every_symbol_of_the_alphabet() {
        let line: String = ALPHABET.iter().collect();
        let program = Program::from_lines(&[line.as_str()], DEFAULT_COMMENT).unwrap();
        assert_eq!(program.len(), 10);
        assert_eq!(program.ops()[8], Op::Comment);
        assert_eq!(program.ops()[9], Op::Dump);
    }

    #[test]
    fn reports_line_of_first_invalid_character() {
        let lines = ["+++", "--", "+a+", "b"];
        let err = Program::from_lines(&lines, DEFAULT_COMMENT).unwrap_err();
        assert!(matches!(
            err,
            SourceError::InvalidCharacter { line: 3, column: 2, ch: 'a' }
        ));
    }

    #[test]
    fn failing_line_does_not_depend_on_what_follows() {
        let short = ["+", "x"];
        let long = ["+", "x", "+++", "[-]", "still fine?"];
        for lines in [&short[..], &long[..]] {
            let err = validate(lines, DEFAULT_COMMENT).unwrap_err();
            assert!(matches!(err, SourceError::InvalidCharacter { line: 2, ch: 'x', .. }));
        }
    }

    #[test]
    fn validation_is_idempotent() {
        let lines = ["+[", "-]"];
        let first = validate(&lines, DEFAULT_COMMENT).unwrap();
        let second = validate(first, DEFAULT_COMMENT).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn flattening_drops_line_structure() {
        let split = Program::parse("++\r\n[-\n]\n", DEFAULT_COMMENT).unwrap();
        let joined = Program::parse("++[-]", DEFAULT_COMMENT).unwrap();
        assert_eq!(split, joined);
        assert_eq!(split.text(), "++[-]");
    }

    #[test]
    fn lone_carriage_return_is_rejected() {
        let err = Program::parse("+\r+", DEFAULT_COMMENT).unwrap_err();
        assert!(matches!(err, SourceError::InvalidCharacter { line: 1, ch: '\r', .. }));
    }

    #[test]
    fn custom_comment_character_is_accepted_as_no_op() {
        let program = Program::parse("+#+", '#').unwrap();
        assert_eq!(program.ops(), &[Op::Increment, Op::Comment, Op::Increment]);
        assert!(Program::parse("+#+", DEFAULT_COMMENT).is_err());
    }

    #[test]
    fn empty_source_yields_empty_stream() {
        let program = Program::parse("", DEFAULT_COMMENT).unwrap();
        assert!(program.is_empty());
    }
}
