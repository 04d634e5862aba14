//! Decode / Register Read — the scoreboarding and forwarding heart.
//! Operand resolution itself lives in `cpu::control`; this stage drives
//! that routine and handles the scoreboard claim / stall bookkeeping.

use crate::cpu::control::resolve_operands;
use crate::cpu::pipeline::IdEx;
use crate::cpu::Cpu;

pub fn decode_stage(cpu: &mut Cpu) {
    if !cpu.if_id.has_insn {
        // Execute already cleared id_ex this tick when it consumed last
        // cycle's latch; nothing to advance, so leave it untouched.
        return;
    }

    let insn = cpu.if_id.instruction.clone();
    let pc = cpu.if_id.pc;

    match resolve_operands(&insn, &cpu.regs, &cpu.scoreboard, &cpu.ex_mem, &cpu.mem_wb) {
        Some((rs1_val, rs2_val, rs3_val)) => {
            if insn.opcode.writes_register() {
                cpu.scoreboard.claim(insn.rd);
            }
            tracing::debug!(pc, mnemonic = insn.opcode_str(), "Decode");
            cpu.id_ex = IdEx {
                pc,
                instruction: insn,
                rs1_val,
                rs2_val,
                rs3_val,
                has_insn: true,
                stalled: false,
            };
            cpu.if_id.stalled = false;
        }
        None => {
            tracing::debug!(pc, mnemonic = insn.opcode_str(), "Decode: stalling on operand");
            cpu.if_id.stalled = true;
        }
    }
}
