//! `Cpu`: the pipeline state aggregate and its reverse-order per-cycle
//! driver.
//!
//! Each cycle runs the five stages in reverse pipeline order —
//! Writeback, Memory, Execute, Decode, Fetch — so every stage reads the
//! latch its predecessor wrote last cycle and writes its own output for
//! the next one, without aliasing. `Cpu` owns the five inter-stage
//! latches, the scoreboard, and the one-shot `fetch_from_next_cycle`
//! flag that lets a taken branch skip exactly one Fetch cycle before
//! the redirected PC lands.

pub mod control;
pub mod pipeline;
pub mod scoreboard;
pub mod stages;

use pipeline::{ExMem, IdEx, IfId, MemWb};
use scoreboard::Scoreboard;
use stages::{decode_stage, execute_stage, fetch_stage, memory_stage, writeback_stage};

use crate::data_memory::DataMemory;
use crate::isa::Instruction;
use crate::register_file::RegisterFile;
use crate::stats::SimStats;

/// Code memory's base address: `index = (pc - BASE) / 4`.
pub const BASE: i32 = 4000;

pub struct Cpu {
    pub pc: i32,
    pub code_memory: Vec<Instruction>,

    pub regs: RegisterFile,
    pub scoreboard: Scoreboard,
    pub data_memory: DataMemory,
    pub zero_flag: bool,

    /// One-shot flag: a taken branch resolved in Execute this cycle, so
    /// Fetch (which runs after Execute in the reverse-callback order, this
    /// same tick) must skip fetching, letting the redirected PC land on
    /// the next tick instead.
    pub fetch_from_next_cycle: bool,

    pub if_id: IfId,
    pub id_ex: IdEx,
    pub ex_mem: ExMem,
    pub mem_wb: MemWb,

    pub clock: u64,
    pub retired: u64,
    pub halted: bool,

    pub stats: SimStats,
}

impl Cpu {
    pub fn new(code_memory: Vec<Instruction>) -> Self {
        Self {
            pc: BASE,
            code_memory,
            regs: RegisterFile::new(),
            scoreboard: Scoreboard::new(),
            data_memory: DataMemory::new(),
            zero_flag: false,
            fetch_from_next_cycle: false,
            if_id: IfId::default(),
            id_ex: IdEx::default(),
            ex_mem: ExMem::default(),
            mem_wb: MemWb::default(),
            clock: 0,
            retired: 0,
            halted: false,
            stats: SimStats::default(),
        }
    }

    /// Advance the machine by one clock cycle, running every stage in
    /// reverse pipeline order: Writeback, Memory, Execute, Decode, Fetch.
    /// Each stage therefore reads the latch the previous stage wrote last
    /// cycle and writes its own output for the next one, without aliasing.
    pub fn tick(&mut self) {
        let _cycle = tracing::debug_span!("cycle", n = self.clock).entered();
        self.clock += 1;

        if writeback_stage(self) {
            self.halted = true;
            self.stats.halted_at_cycle = Some(self.clock);
            return;
        }

        memory_stage(self);
        execute_stage(self);

        if self.if_id.stalled {
            self.stats.decode_stalls += 1;
        }
        decode_stage(self);
        fetch_stage(self);

        self.stats.cycles = self.clock;
        self.stats.retired = self.retired;
    }

    /// Run until HALT retires or `cycle_cap` cycles have elapsed (whichever
    /// comes first). Returns `true` if HALT retired.
    pub fn run(&mut self, cycle_cap: Option<u64>) -> bool {
        loop {
            if self.halted {
                return true;
            }
            if let Some(cap) = cycle_cap {
                if self.clock >= cap {
                    return false;
                }
            }
            self.tick();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::parser;

    fn cpu_for(src: &str) -> Cpu {
        Cpu::new(parser::parse(src).unwrap())
    }

    #[test]
    fn s1_forwarding_no_extra_stalls() {
        let mut cpu = cpu_for("MOVC R1,#5\nMOVC R2,#7\nADD R3,R1,R2\nHALT");
        assert!(cpu.run(Some(1000)));
        assert_eq!(cpu.regs.read(1), 5);
        assert_eq!(cpu.regs.read(2), 7);
        assert_eq!(cpu.regs.read(3), 12);
        assert!(!cpu.zero_flag);
        assert_eq!(cpu.retired, 4);
    }

    #[test]
    fn s2_load_use_hazard_stalls_one_cycle() {
        let mut cpu = cpu_for("MOVC R1,#16\nLOAD R2,R1,#0\nADD R3,R2,R1\nHALT");
        assert!(cpu.run(Some(1000)));
        assert_eq!(cpu.regs.read(1), 16);
        assert_eq!(cpu.regs.read(2), 0);
        assert_eq!(cpu.regs.read(3), 16);
    }

    #[test]
    fn s3_taken_branch_flushes_one_instruction() {
        let mut cpu = cpu_for(
            "MOVC R1,#0\nMOVC R2,#0\nBZ #8\nMOVC R3,#999\nMOVC R3,#7\nHALT",
        );
        assert!(cpu.run(Some(1000)));
        assert_eq!(cpu.regs.read(3), 7);
        assert_eq!(cpu.retired, 5);
    }

    #[test]
    fn s4_double_write_same_register() {
        let mut cpu = cpu_for("MOVC R1,#1\nMOVC R1,#2\nHALT");
        assert!(cpu.run(Some(1000)));
        assert_eq!(cpu.regs.read(1), 2);
        assert!(!cpu.scoreboard.is_busy(1));
    }

    #[test]
    fn s5_div_by_zero_substitutes_zero() {
        let mut cpu = cpu_for("MOVC R1,#10\nMOVC R2,#0\nDIV R3,R1,R2\nHALT");
        assert!(cpu.run(Some(1000)));
        assert_eq!(cpu.regs.read(3), 0);
        assert!(cpu.zero_flag);
    }

    #[test]
    fn s6_store_load_round_trip() {
        let mut cpu = cpu_for(
            "MOVC R1,#42\nMOVC R2,#100\nSTORE R1,R2,#0\nLOAD R3,R2,#0\nHALT",
        );
        assert!(cpu.run(Some(1000)));
        assert_eq!(cpu.regs.read(3), 42);
        assert_eq!(cpu.data_memory.read(100), 42);
    }

    #[test]
    fn pc_out_of_range_drains_without_halt() {
        let mut cpu = cpu_for("MOVC R1,#1");
        assert!(!cpu.run(Some(20)));
        assert_eq!(cpu.regs.read(1), 1);
    }
}
