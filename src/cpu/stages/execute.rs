//! Execute — ALU/CMP results, address formation, and branch resolution.
//! BZ and BNZ share one `resolve_branch` helper parameterized only by
//! the taken-condition, so the two opcodes can't drift out of sync with
//! each other.

use crate::cpu::pipeline::ExMem;
use crate::cpu::Cpu;
use crate::isa::Opcode;

/// Opcodes whose numeric `result` also updates the zero flag.
fn sets_zero_flag(opcode: Opcode) -> bool {
    matches!(
        opcode,
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
            | Opcode::Cmp
    )
}

/// ALU/CMP/address-formation result for opcodes that don't need a branch
/// decision. Returns `(result, memory_address)`.
fn compute(opcode: Opcode, rs1: i32, rs2: i32, rs3: i32, imm: i32) -> (i32, i32) {
    match opcode {
        Opcode::Add => (rs1.wrapping_add(rs2), 0),
        Opcode::Addl => (rs1.wrapping_add(imm), 0),
        Opcode::Sub => (rs1.wrapping_sub(rs2), 0),
        Opcode::Subl => (rs1.wrapping_sub(imm), 0),
        Opcode::Mul => (rs1.wrapping_mul(rs2), 0),
        Opcode::Div => {
            if rs2 == 0 {
                tracing::warn!("DIV by zero, substituting 0");
                (0, 0)
            } else {
                (rs1.wrapping_div(rs2), 0)
            }
        }
        Opcode::And => (rs1 & rs2, 0),
        Opcode::Or => (rs1 | rs2, 0),
        Opcode::Xor => (rs1 ^ rs2, 0),
        Opcode::Movc => (imm, 0),
        Opcode::Cmp => (rs1.wrapping_sub(rs2), 0),
        Opcode::Load => (0, rs1.wrapping_add(imm)),
        Opcode::Ldr => (0, rs1.wrapping_add(rs2)),
        Opcode::Store => (rs1, rs2.wrapping_add(imm)),
        Opcode::Str => (rs1, rs2.wrapping_add(rs3)),
        Opcode::Bz | Opcode::Bnz | Opcode::Halt | Opcode::Nop => (0, 0),
    }
}

/// Resolves a taken/not-taken branch. `taken` is `zero_flag` for BZ and
/// `!zero_flag` for BNZ — the only difference between the two opcodes.
fn resolve_branch(cpu: &mut Cpu, branch_pc: i32, imm: i32, taken: bool) {
    if !taken {
        return;
    }
    cpu.pc = branch_pc.wrapping_add(imm);
    cpu.if_id.has_insn = false;
    cpu.if_id.stalled = false;
    cpu.fetch_from_next_cycle = true;
    tracing::debug!(target = cpu.pc, "Execute: branch taken, flushing Decode");
}

pub fn execute_stage(cpu: &mut Cpu) {
    let id_ex = std::mem::take(&mut cpu.id_ex);

    if !id_ex.has_insn {
        cpu.ex_mem = ExMem::default();
        return;
    }

    let insn = &id_ex.instruction;
    tracing::debug!(pc = id_ex.pc, mnemonic = insn.opcode_str(), "Execute");

    let (result, memory_address) = compute(
        insn.opcode,
        id_ex.rs1_val,
        id_ex.rs2_val,
        id_ex.rs3_val,
        insn.imm,
    );

    if sets_zero_flag(insn.opcode) {
        cpu.zero_flag = result == 0;
    }

    match insn.opcode {
        Opcode::Bz => resolve_branch(cpu, id_ex.pc, insn.imm, cpu.zero_flag),
        Opcode::Bnz => resolve_branch(cpu, id_ex.pc, insn.imm, !cpu.zero_flag),
        _ => {}
    }

    cpu.ex_mem = ExMem {
        pc: id_ex.pc,
        instruction: id_ex.instruction,
        memory_address,
        result,
        has_insn: true,
        stalled: false,
    };
}
