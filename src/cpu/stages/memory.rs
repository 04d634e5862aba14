//! Memory: resolves data-memory accesses for LOAD/LDR/STORE/STR.

use crate::cpu::pipeline::MemWb;
use crate::cpu::Cpu;
use crate::isa::Opcode;

pub fn memory_stage(cpu: &mut Cpu) {
    let ex_mem = std::mem::take(&mut cpu.ex_mem);

    if !ex_mem.has_insn {
        cpu.mem_wb = MemWb::default();
        return;
    }

    tracing::debug!(
        pc = ex_mem.pc,
        mnemonic = ex_mem.instruction.opcode_str(),
        "Memory"
    );

    let result = match ex_mem.instruction.opcode {
        Opcode::Load | Opcode::Ldr => cpu.data_memory.read(ex_mem.memory_address),
        Opcode::Store | Opcode::Str => {
            cpu.data_memory.write(ex_mem.memory_address, ex_mem.result);
            ex_mem.result
        }
        _ => ex_mem.result,
    };

    cpu.mem_wb = MemWb {
        pc: ex_mem.pc,
        instruction: ex_mem.instruction,
        result,
        has_insn: true,
        stalled: false,
    };
}
