//! Per-run counters and the final human-readable summary.

#[derive(Default, Debug)]
pub struct SimStats {
    pub cycles: u64,
    pub retired: u64,
    /// Cycles in which Decode could not resolve an operand and stalled
    /// (covers both the load-use hazard and any other scoreboard wait).
    pub decode_stalls: u64,
    /// Cycle on which HALT retired, if it did before the run ended.
    pub halted_at_cycle: Option<u64>,
}

impl SimStats {
    pub fn print(&self) {
        println!("\n=========================================================");
        println!("[General]");
        println!("  Cycles:               {}", self.cycles);
        println!("  Instructions Retired: {}", self.retired);

        let ipc = if self.cycles > 0 {
            self.retired as f64 / self.cycles as f64
        } else {
            0.0
        };
        println!("  IPC:                  {ipc:.4}");

        println!("\n[Pipeline Stalls]");
        println!("  Decode/Scoreboard Stalls: {}", self.decode_stalls);

        match self.halted_at_cycle {
            Some(c) => println!("\nHALT retired at cycle {c}."),
            None => println!("\nRun ended without HALT retiring (cycle cap reached)."),
        }
        println!("=========================================================\n");
    }
}
