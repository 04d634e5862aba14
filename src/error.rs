//! Error types that cross an actual `Result`-returning boundary.
//!
//! Nothing inside the pipeline core itself returns `Result`: unknown
//! opcodes, divide-by-zero, and out-of-range addresses are all handled
//! by substitution plus a `tracing::warn!`, not by propagating an
//! error. The one boundary that does fail loudly is assembly: a
//! malformed program is a fatal, pre-simulation condition.

use thiserror::Error;

/// A malformed assembly line, reported with enough context to act on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssembleError {
    #[error("line {line}: unknown mnemonic `{text}`")]
    UnknownMnemonic { line: usize, text: String },

    #[error("line {line}: `{opcode}` expects {expected} operand(s), got {got}")]
    WrongOperandCount {
        line: usize,
        opcode: String,
        expected: usize,
        got: usize,
    },

    #[error("line {line}: malformed register operand `{text}` (expected `Rn`, 0 <= n <= 31)")]
    BadRegister { line: usize, text: String },

    #[error("line {line}: malformed immediate `{text}` (expected `#k`)")]
    BadImmediate { line: usize, text: String },

    #[error("line {line}: expected a register operand, found `{text}`")]
    ExpectedRegister { line: usize, text: String },

    #[error("line {line}: expected an immediate operand, found `{text}`")]
    ExpectedImmediate { line: usize, text: String },

    #[error("program is empty")]
    EmptyProgram,
}
