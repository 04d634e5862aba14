//! Fetch: produces the Fetch->Decode latch each cycle.

use crate::cpu::pipeline::IfId;
use crate::cpu::Cpu;

pub fn fetch_stage(cpu: &mut Cpu) {
    if cpu.if_id.stalled {
        tracing::debug!("Fetch: holding (Decode stalled)");
        return;
    }

    if cpu.fetch_from_next_cycle {
        cpu.fetch_from_next_cycle = false;
        cpu.if_id = IfId::default();
        tracing::debug!("Fetch: skipped (branch redirect armed last cycle)");
        return;
    }

    let pc = cpu.pc;
    let index = (pc - crate::cpu::BASE) / 4;
    if index < 0 || index as usize >= cpu.code_memory.len() {
        cpu.if_id = IfId {
            pc,
            has_insn: false,
            ..IfId::default()
        };
        tracing::debug!(pc, "Fetch: pc out of range, idling");
        return;
    }

    let instruction = cpu.code_memory[index as usize].clone();
    tracing::debug!(pc, mnemonic = instruction.opcode_str(), "Fetch");
    cpu.if_id = IfId {
        pc,
        instruction,
        has_insn: true,
        stalled: false,
    };
    cpu.pc = pc.wrapping_add(4);
}
