//! Property tests for the pipeline's universally-quantified invariants.
//!
//! Each invariant is checked against the live latch/scoreboard state while
//! stepping `Cpu::tick()` by hand, rather than only against final register
//! values — the scenarios in `tests/scenarios.rs` already cover end states.

use apex_sim::cpu::pipeline::{ExMem, IdEx, MemWb};
use apex_sim::cpu::Cpu;
use apex_sim::isa::parser;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// A small, branch-free instruction vocabulary. Kept branch-free so every
/// fetched instruction has a distinct `pc` — that distinctness is what lets
/// `no_instruction_occupies_two_latches_at_once` use `pc` as an identity.
#[derive(Clone, Copy, Debug)]
enum Gen {
    Movc(u8, i16),
    Add(u8, u8, u8),
    Sub(u8, u8, u8),
    Load(u8, u8),
    Store(u8, u8),
}

fn gen_strategy() -> impl Strategy<Value = Gen> {
    prop_oneof![
        (0u8..4, -50i16..50).prop_map(|(r, k)| Gen::Movc(r, k)),
        (0u8..4, 0u8..4, 0u8..4).prop_map(|(d, a, b)| Gen::Add(d, a, b)),
        (0u8..4, 0u8..4, 0u8..4).prop_map(|(d, a, b)| Gen::Sub(d, a, b)),
        (0u8..4, 0u8..4).prop_map(|(d, a)| Gen::Load(d, a)),
        (0u8..4, 0u8..4).prop_map(|(a, b)| Gen::Store(a, b)),
    ]
}

fn render(insns: &[Gen]) -> String {
    let mut text = String::new();
    for insn in insns {
        let line = match insn {
            Gen::Movc(r, k) => format!("MOVC R{r},#{k}"),
            Gen::Add(d, a, b) => format!("ADD R{d},R{a},R{b}"),
            Gen::Sub(d, a, b) => format!("SUB R{d},R{a},R{b}"),
            Gen::Load(d, a) => format!("LOAD R{d},R{a},#0"),
            Gen::Store(a, b) => format!("STORE R{a},R{b},#0"),
        };
        text.push_str(&line);
        text.push('\n');
    }
    text.push_str("HALT\n");
    text
}

fn cpu_for(insns: &[Gen]) -> Cpu {
    Cpu::new(parser::parse(&render(insns)).unwrap())
}

/// Scoreboard soundness: `busy[r]` is true iff some latch at
/// or past Execute (`id_ex`, `ex_mem`, or `mem_wb`) holds a valid,
/// register-writing instruction with that `rd`.
fn assert_scoreboard_sound(cpu: &Cpu) {
    for r in 0..32i32 {
        let claimed_by_id_ex = cpu.id_ex.has_insn
            && cpu.id_ex.instruction.opcode.writes_register()
            && cpu.id_ex.instruction.rd == r;
        let claimed_by_ex_mem = cpu.ex_mem.has_insn
            && cpu.ex_mem.instruction.opcode.writes_register()
            && cpu.ex_mem.instruction.rd == r;
        let claimed_by_mem_wb = cpu.mem_wb.has_insn
            && cpu.mem_wb.instruction.opcode.writes_register()
            && cpu.mem_wb.instruction.rd == r;
        let claimed = claimed_by_id_ex || claimed_by_ex_mem || claimed_by_mem_wb;
        assert_eq!(
            cpu.scoreboard.is_busy(r),
            claimed,
            "register {r} busy={} but claimed-by-a-latch={claimed} (id_ex={:?} ex_mem={:?} mem_wb={:?})",
            cpu.scoreboard.is_busy(r),
            describe(&cpu.id_ex),
            describe_ex_mem(&cpu.ex_mem),
            describe_mem_wb(&cpu.mem_wb),
        );
    }
}

fn describe(l: &IdEx) -> Option<(i32, i32)> {
    l.has_insn.then_some((l.instruction.rd, l.pc))
}
fn describe_ex_mem(l: &ExMem) -> Option<(i32, i32)> {
    l.has_insn.then_some((l.instruction.rd, l.pc))
}
fn describe_mem_wb(l: &MemWb) -> Option<(i32, i32)> {
    l.has_insn.then_some((l.instruction.rd, l.pc))
}

/// No instruction occupies two latches at once. Every
/// fetched instruction in these branch-free programs has a unique `pc`, so
/// two valid latches sharing a `pc` would mean the same fetched instruction
/// was double-issued.
fn assert_no_double_issue(cpu: &Cpu) {
    let mut pcs = Vec::new();
    if cpu.if_id.has_insn {
        pcs.push(cpu.if_id.pc);
    }
    if cpu.id_ex.has_insn {
        pcs.push(cpu.id_ex.pc);
    }
    if cpu.ex_mem.has_insn {
        pcs.push(cpu.ex_mem.pc);
    }
    if cpu.mem_wb.has_insn {
        pcs.push(cpu.mem_wb.pc);
    }
    let mut seen = std::collections::HashSet::new();
    for pc in pcs {
        assert!(seen.insert(pc), "pc {pc} occupies more than one latch at once");
    }
}

proptest! {
    #[test]
    fn scoreboard_stays_sound_every_cycle(insns in prop::collection::vec(gen_strategy(), 0..12)) {
        let mut cpu = cpu_for(&insns);
        for _ in 0..400 {
            if cpu.halted {
                break;
            }
            cpu.tick();
            assert_scoreboard_sound(&cpu);
        }
    }

    #[test]
    fn no_instruction_occupies_two_latches_at_once(insns in prop::collection::vec(gen_strategy(), 0..12)) {
        let mut cpu = cpu_for(&insns);
        for _ in 0..400 {
            if cpu.halted {
                break;
            }
            cpu.tick();
            assert_no_double_issue(&cpu);
        }
    }

    /// Determinism: two fresh runs of the same program reach
    /// identical final register contents, data memory contents, retirement
    /// counts, and cycle counts.
    #[test]
    fn identical_programs_produce_identical_final_state(insns in prop::collection::vec(gen_strategy(), 0..12)) {
        let src = render(&insns);
        let mut a = Cpu::new(parser::parse(&src).unwrap());
        let mut b = Cpu::new(parser::parse(&src).unwrap());
        a.run(Some(400));
        b.run(Some(400));
        prop_assert_eq!(a.regs.dump(), b.regs.dump());
        prop_assert_eq!(a.data_memory.dump(), b.data_memory.dump());
        prop_assert_eq!(a.retired, b.retired);
        prop_assert_eq!(a.clock, b.clock);
        prop_assert_eq!(a.halted, b.halted);
    }
}

/// Load-use stall: the instruction right after a LOAD that
/// reads the loaded register stalls in Decode for exactly one cycle.
#[test]
fn load_use_hazard_stalls_decode_for_exactly_one_cycle() {
    let mut cpu = cpu_for(&[Gen::Movc(1, 16), Gen::Load(2, 1), Gen::Add(3, 2, 1)]);

    // Tick until the ADD reaches Decode's input latch (if_id) and observe
    // exactly one cycle where if_id is stalled before it clears.
    let mut stalled_cycles = 0;
    let mut saw_add_in_if_id = false;
    for _ in 0..20 {
        cpu.tick();
        let add_is_pending = cpu.if_id.has_insn && cpu.if_id.instruction.rs1 == 2;
        if add_is_pending {
            saw_add_in_if_id = true;
            if cpu.if_id.stalled {
                stalled_cycles += 1;
            }
        }
        if cpu.halted {
            break;
        }
    }
    assert!(saw_add_in_if_id, "ADD never reached Decode's input latch");
    assert_eq!(stalled_cycles, 1, "load-use hazard must stall Decode for exactly one cycle");
}

/// Branch flush: a taken branch resolved in Execute at cycle
/// C invalidates Decode's input latch that same cycle and arms a one-shot
/// skip so Fetch (which runs later in the same tick) produces nothing;
/// the branch target is therefore fetched on the very next tick, C+1.
#[test]
fn taken_branch_flushes_decode_and_refetches_on_the_next_cycle() {
    let src = "MOVC R1,#0\nMOVC R2,#0\nBZ #8\nMOVC R3,#999\nMOVC R3,#7\nHALT";
    let mut cpu = Cpu::new(parser::parse(src).unwrap());

    let mut branch_execute_cycle = None;
    let mut target_fetch_cycle = None;
    for _ in 0..20 {
        cpu.tick();
        if cpu.ex_mem.has_insn && cpu.ex_mem.instruction.opcode == apex_sim::isa::Opcode::Bz {
            branch_execute_cycle = Some(cpu.clock);
        }
        if cpu.if_id.has_insn && cpu.if_id.pc == 4016 {
            target_fetch_cycle.get_or_insert(cpu.clock);
        }
        if cpu.halted {
            break;
        }
    }

    let c = branch_execute_cycle.expect("BZ never reached Execute's output latch");
    let fetched_at = target_fetch_cycle.expect("branch target (pc=4016) was never fetched");
    assert_eq!(fetched_at, c + 1, "branch target must be fetched on the tick right after Execute resolves it");
}

/// Forwarding consistency: the value Decode reads forwarded
/// from the Execute latch for a register is the same value that register
/// holds once the producing instruction retires.
#[test]
fn forwarded_execute_value_matches_the_value_eventually_written_back() {
    let mut cpu = cpu_for(&[Gen::Movc(1, 5), Gen::Movc(2, 7), Gen::Add(3, 1, 2)]);

    let mut forwarded_rs1 = None;
    for _ in 0..20 {
        cpu.tick();
        // Whatever value Decode resolved for rs1 (R1 is still busy at this
        // point, so it came from forwarding, not a direct register read)
        // gets latched into id_ex the instant ADD clears Decode.
        if cpu.id_ex.has_insn && cpu.id_ex.instruction.opcode == apex_sim::isa::Opcode::Add {
            forwarded_rs1 = Some(cpu.id_ex.rs1_val);
        }
        if cpu.halted {
            break;
        }
    }

    assert_eq!(forwarded_rs1, Some(5), "ADD must have forwarded R1's value from Execute");
    assert_eq!(cpu.regs.read(1), 5, "the forwarded value must match what eventually lands in the register file");
}

/// Halt drain: HALT is fetched at most once, and the
/// simulator only reports `halted` once that HALT retires from Writeback.
#[test]
fn halt_is_fetched_once_and_terminates_only_on_retirement() {
    let mut cpu = Cpu::new(parser::parse("MOVC R1,#1\nMOVC R2,#2\nHALT").unwrap());
    let mut halt_fetch_count = 0;
    for _ in 0..20 {
        cpu.tick();
        if cpu.if_id.has_insn && cpu.if_id.instruction.opcode == apex_sim::isa::Opcode::Halt {
            halt_fetch_count += 1;
        }
        if cpu.halted {
            break;
        }
    }
    assert!(cpu.halted);
    assert_eq!(halt_fetch_count, 1, "HALT must be fetched exactly once");
}
