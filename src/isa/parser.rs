//! Assembly text -> `Vec<Instruction>`.
//!
//! One instruction per line, comma *and* whitespace separated operands,
//! `Rn` registers, `#k` signed-decimal immediates, and `;` end-of-line
//! comments.

use crate::error::AssembleError;
use crate::isa::instruction::{Instruction, NO_REG};
use crate::isa::Opcode;

/// What a single operand slot in an instruction's textual syntax holds.
#[derive(Clone, Copy)]
enum Slot {
    Rd,
    Rs1,
    Rs2,
    Rs3,
    Imm,
}

/// The fixed operand syntax for each opcode, in source order. This is
/// independent of `Opcode::sources` (which describes what Decode must
/// *read*, not how the assembler spells the line) — e.g. STORE's
/// operand order is `rs1, rs2, #imm` even though the address it forms
/// is `rs2 + imm`.
fn syntax(op: Opcode) -> &'static [Slot] {
    use Slot::{Imm, Rd, Rs1, Rs2, Rs3};
    match op {
        Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div | Opcode::And | Opcode::Or
        | Opcode::Xor => &[Rd, Rs1, Rs2],
        Opcode::Addl | Opcode::Subl => &[Rd, Rs1, Imm],
        Opcode::Movc => &[Rd, Imm],
        Opcode::Load => &[Rd, Rs1, Imm],
        Opcode::Ldr => &[Rd, Rs1, Rs2],
        Opcode::Store => &[Rs1, Rs2, Imm],
        Opcode::Str => &[Rs1, Rs2, Rs3],
        Opcode::Cmp => &[Rs1, Rs2],
        Opcode::Bz | Opcode::Bnz => &[Imm],
        Opcode::Halt | Opcode::Nop => &[],
    }
}

/// Parse a complete assembly program into its instruction sequence.
pub fn parse(source: &str) -> Result<Vec<Instruction>, AssembleError> {
    let mut program = Vec::new();
    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx + 1;
        let Some(line) = strip_comment_and_trim(raw_line) else {
            continue;
        };
        program.push(parse_line(line_no, line)?);
    }
    if program.is_empty() {
        return Err(AssembleError::EmptyProgram);
    }
    Ok(program)
}

fn strip_comment_and_trim(raw: &str) -> Option<&str> {
    let without_comment = match raw.find(';') {
        Some(pos) => &raw[..pos],
        None => raw,
    };
    let trimmed = without_comment.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_line(line_no: usize, line: &str) -> Result<Instruction, AssembleError> {
    let normalized = line.replace(',', " ");
    let mut tokens = normalized.split_whitespace();

    let mnemonic = tokens.next().expect("strip_comment_and_trim guarantees a non-empty line");
    let opcode = Opcode::from_mnemonic(mnemonic).ok_or_else(|| AssembleError::UnknownMnemonic {
        line: line_no,
        text: mnemonic.to_string(),
    })?;

    let operands: Vec<&str> = tokens.collect();
    let slots = syntax(opcode);
    if operands.len() != slots.len() {
        return Err(AssembleError::WrongOperandCount {
            line: line_no,
            opcode: opcode.mnemonic().to_string(),
            expected: slots.len(),
            got: operands.len(),
        });
    }

    let mut insn = Instruction::new(opcode);
    for (slot, text) in slots.iter().zip(operands.iter()) {
        match slot {
            Slot::Rd => insn.rd = parse_register(line_no, text)?,
            Slot::Rs1 => insn.rs1 = parse_register(line_no, text)?,
            Slot::Rs2 => insn.rs2 = parse_register(line_no, text)?,
            Slot::Rs3 => insn.rs3 = parse_register(line_no, text)?,
            Slot::Imm => insn.imm = parse_immediate(line_no, text)?,
        }
    }
    Ok(insn)
}

fn parse_register(line_no: usize, text: &str) -> Result<i32, AssembleError> {
    if text.is_empty() || !matches!(text.as_bytes()[0], b'R' | b'r') {
        return Err(AssembleError::ExpectedRegister {
            line: line_no,
            text: text.to_string(),
        });
    }
    let digits = &text[1..];
    let n: i32 = digits.parse().map_err(|_| AssembleError::BadRegister {
        line: line_no,
        text: text.to_string(),
    })?;
    if !(0..=31).contains(&n) {
        return Err(AssembleError::BadRegister {
            line: line_no,
            text: text.to_string(),
        });
    }
    Ok(n)
}

fn parse_immediate(line_no: usize, text: &str) -> Result<i32, AssembleError> {
    if !text.starts_with('#') {
        return Err(AssembleError::ExpectedImmediate {
            line: line_no,
            text: text.to_string(),
        });
    }
    text[1..].parse().map_err(|_| AssembleError::BadImmediate {
        line: line_no,
        text: text.to_string(),
    })
}
