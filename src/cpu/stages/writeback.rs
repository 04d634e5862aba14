//! Writeback: retirement plus the multi-writer scoreboard arbitration
//! rule.

use crate::cpu::Cpu;
use crate::isa::Opcode;

/// Retires `cpu.mem_wb`. Returns `true` if the retired instruction was
/// HALT, signalling the driver to stop.
pub fn writeback_stage(cpu: &mut Cpu) -> bool {
    let wb = std::mem::take(&mut cpu.mem_wb);

    if !wb.has_insn {
        return false;
    }

    tracing::debug!(pc = wb.pc, mnemonic = wb.instruction.opcode_str(), "Writeback");

    if wb.instruction.opcode.writes_register() {
        cpu.regs.write(wb.instruction.rd, wb.result);
    }

    if wb.instruction.rd >= 0 {
        // A later in-flight instruction (still in Execute's output or
        // Memory's input — i.e. the current `ex_mem`/`id_ex` occupants,
        // since this tick's mem/execute stages haven't run yet) may have
        // re-claimed the same destination; if so it, not this retiring
        // instruction, owns the busy bit now.
        let contested = (cpu.ex_mem.has_insn && cpu.ex_mem.instruction.rd == wb.instruction.rd)
            || (cpu.id_ex.has_insn && cpu.id_ex.instruction.rd == wb.instruction.rd);
        let released = !contested;
        cpu.scoreboard
            .release_unless_contested(wb.instruction.rd, contested);
        if released {
            cpu.if_id.stalled = false;
        }
    }

    cpu.retired += 1;
    wb.instruction.opcode == Opcode::Halt
}
