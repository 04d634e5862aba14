//! The APEX instruction set: opcode tags, the instruction record, and the
//! per-opcode operand table that `cpu::control` drives Decode from.
//!
//! This module owns only the *shape* of an instruction. Turning assembly
//! text into a `Vec<Instruction>` is `isa::parser`'s job; turning an
//! `Instruction` into register reads/writes and ALU behavior is
//! `cpu::control` and `cpu::stages::execute`'s job.

pub mod instruction;
pub mod parser;

pub use instruction::{Instruction, NO_REG};

/// Register operand a stage needs to read from an instruction record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    Rs1,
    Rs2,
    Rs3,
}

/// The APEX opcode set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    Add,
    Addl,
    Sub,
    Subl,
    Mul,
    Div,
    And,
    Or,
    Xor,
    Movc,
    Load,
    Ldr,
    Store,
    Str,
    Bz,
    Bnz,
    Halt,
    Nop,
    Cmp,
}

impl Opcode {
    /// Mnemonic text, for the parser and for diagnostics. Case-insensitive
    /// on input; this is the canonical uppercase spelling.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Add => "ADD",
            Opcode::Addl => "ADDL",
            Opcode::Sub => "SUB",
            Opcode::Subl => "SUBL",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Xor => "XOR",
            Opcode::Movc => "MOVC",
            Opcode::Load => "LOAD",
            Opcode::Ldr => "LDR",
            Opcode::Store => "STORE",
            Opcode::Str => "STR",
            Opcode::Bz => "BZ",
            Opcode::Bnz => "BNZ",
            Opcode::Halt => "HALT",
            Opcode::Nop => "NOP",
            Opcode::Cmp => "CMP",
        }
    }

    pub fn from_mnemonic(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "ADD" => Opcode::Add,
            "ADDL" => Opcode::Addl,
            "SUB" => Opcode::Sub,
            "SUBL" => Opcode::Subl,
            "MUL" => Opcode::Mul,
            "DIV" => Opcode::Div,
            "AND" => Opcode::And,
            "OR" => Opcode::Or,
            "XOR" => Opcode::Xor,
            "MOVC" => Opcode::Movc,
            "LOAD" => Opcode::Load,
            "LDR" => Opcode::Ldr,
            "STORE" => Opcode::Store,
            "STR" => Opcode::Str,
            "BZ" => Opcode::Bz,
            "BNZ" => Opcode::Bnz,
            "HALT" => Opcode::Halt,
            "NOP" => Opcode::Nop,
            "CMP" => Opcode::Cmp,
            _ => return None,
        })
    }

    /// Source registers this opcode reads.
    pub fn sources(self) -> &'static [Operand] {
        use Operand::{Rs1, Rs2, Rs3};
        match self {
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div | Opcode::And | Opcode::Or
            | Opcode::Xor => &[Rs1, Rs2],
            Opcode::Addl | Opcode::Subl => &[Rs1],
            Opcode::Load => &[Rs1],
            Opcode::Ldr => &[Rs1, Rs2],
            Opcode::Store => &[Rs1, Rs2],
            Opcode::Str => &[Rs1, Rs2, Rs3],
            Opcode::Cmp => &[Rs1, Rs2],
            Opcode::Movc | Opcode::Bz | Opcode::Bnz | Opcode::Halt | Opcode::Nop => &[],
        }
    }

    /// Whether this opcode writes `rd` at Writeback.
    pub fn writes_register(self) -> bool {
        matches!(
            self,
            Opcode::Add
                | Opcode::Addl
                | Opcode::Sub
                | Opcode::Subl
                | Opcode::Mul
                | Opcode::Div
                | Opcode::And
                | Opcode::Or
                | Opcode::Xor
                | Opcode::Movc
                | Opcode::Load
                | Opcode::Ldr
        )
    }

    /// Whether this opcode is an address-forming memory access.
    pub fn is_memory_access(self) -> bool {
        matches!(self, Opcode::Load | Opcode::Ldr | Opcode::Store | Opcode::Str)
    }

    pub fn is_branch(self) -> bool {
        matches!(self, Opcode::Bz | Opcode::Bnz)
    }
}
