//! The four inter-stage latches.
//!
//! `has_insn` is the validity bit; `stalled` is the back-pressure flag a
//! stage sets on its *input* latch to tell the stage feeding it to hold.
//! A latch with `has_insn == false` is a bubble: no opcode, no side effects.

use crate::isa::Instruction;

/// Fetch -> Decode.
#[derive(Clone, Debug, Default)]
pub struct IfId {
    pub pc: i32,
    pub instruction: Instruction,
    pub has_insn: bool,
    pub stalled: bool,
}

/// Decode -> Execute. Operand values are resolved (read or forwarded)
/// by the time this latch is populated.
#[derive(Clone, Debug, Default)]
pub struct IdEx {
    pub pc: i32,
    pub instruction: Instruction,
    pub rs1_val: i32,
    pub rs2_val: i32,
    pub rs3_val: i32,
    pub has_insn: bool,
    pub stalled: bool,
}

/// Execute -> Memory. `result` is the ALU/CMP result or the value to store
/// for STORE/STR; `memory_address` is the computed effective address for
/// LOAD/LDR/STORE/STR.
#[derive(Clone, Debug, Default)]
pub struct ExMem {
    pub pc: i32,
    pub instruction: Instruction,
    pub memory_address: i32,
    pub result: i32,
    pub has_insn: bool,
    pub stalled: bool,
}

/// Memory -> Writeback. `result` is the final value to commit: the ALU
/// result carried through for non-memory opcodes, or the loaded word for
/// LOAD/LDR.
#[derive(Clone, Debug, Default)]
pub struct MemWb {
    pub pc: i32,
    pub instruction: Instruction,
    pub result: i32,
    pub has_insn: bool,
    pub stalled: bool,
}
