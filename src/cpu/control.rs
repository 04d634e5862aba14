//! Operand resolution: the scoreboarding and forwarding ladder.
//!
//! One routine drives every opcode's operand requirements from the
//! declarative `Opcode::sources` table (`isa::mod`), instead of a
//! switch arm with a copy-pasted resolution block per opcode.

use crate::cpu::pipeline::{ExMem, MemWb};
use crate::cpu::scoreboard::Scoreboard;
use crate::isa::{Instruction, Opcode, Operand};
use crate::register_file::RegisterFile;

/// The register field `operand` names on `insn`.
fn operand_register(operand: Operand, insn: &Instruction) -> i32 {
    match operand {
        Operand::Rs1 => insn.rs1,
        Operand::Rs2 => insn.rs2,
        Operand::Rs3 => insn.rs3,
    }
}

/// Resolution ladder for a single source register: a direct register
/// read, a forward from Execute, a forward from Memory, or a stall.
/// Returns `None` to signal "stall".
fn resolve_operand(
    reg: i32,
    regs: &RegisterFile,
    scoreboard: &Scoreboard,
    ex_mem: &ExMem,
    mem_wb: &MemWb,
) -> Option<i32> {
    if !scoreboard.is_busy(reg) {
        return Some(regs.read(reg));
    }
    let forwards_from_execute = ex_mem.has_insn
        && ex_mem.instruction.rd == reg
        && !matches!(ex_mem.instruction.opcode, Opcode::Load | Opcode::Ldr);
    if forwards_from_execute {
        return Some(ex_mem.result);
    }
    if mem_wb.has_insn && mem_wb.instruction.rd == reg {
        return Some(mem_wb.result);
    }
    None
}

/// Resolve every source register `insn`'s opcode requires (`Opcode::sources`),
/// in `(rs1_val, rs2_val, rs3_val)` order (unused slots are 0). `None` means
/// at least one operand could not be resolved this cycle — Decode must stall.
pub fn resolve_operands(
    insn: &Instruction,
    regs: &RegisterFile,
    scoreboard: &Scoreboard,
    ex_mem: &ExMem,
    mem_wb: &MemWb,
) -> Option<(i32, i32, i32)> {
    let mut values = (0, 0, 0);
    for &operand in insn.opcode.sources() {
        let reg = operand_register(operand, insn);
        let value = resolve_operand(reg, regs, scoreboard, ex_mem, mem_wb)?;
        match operand {
            Operand::Rs1 => values.0 = value,
            Operand::Rs2 => values.1 = value,
            Operand::Rs3 => values.2 = value,
        }
    }
    Some(values)
}
