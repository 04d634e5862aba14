//! APEX simulator CLI: load an assembly program, run it, and report final
//! state. The pipeline core it drives lives in `apex_sim::cpu`.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use apex_sim::cpu::Cpu;
use apex_sim::isa;

#[derive(Parser, Debug)]
#[command(
    name = "apex-sim",
    author,
    version,
    about = "Cycle-accurate simulator for the APEX five-stage in-order pipeline"
)]
struct Cli {
    /// Assembly source file.
    input_file: PathBuf,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Run `n` cycles, then drop into an interactive step prompt.
    Simulate { n: u64 },

    /// Run `n` cycles, then print final state and exit. Honors the
    /// caller-supplied `n` rather than a hardcoded cycle count.
    Display { n: u64 },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let source = match std::fs::read_to_string(&cli.input_file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("apex-sim: cannot read {}: {e}", cli.input_file.display());
            return ExitCode::FAILURE;
        }
    };

    let program = match isa::parser::parse(&source) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("apex-sim: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut cpu = Cpu::new(program);

    match cli.mode {
        None => {
            cpu.run(None);
            report(&cpu);
        }
        Some(Mode::Display { n }) => {
            cpu.run(Some(n));
            report(&cpu);
        }
        Some(Mode::Simulate { n }) => {
            cpu.run(Some(n));
            interactive_step(&mut cpu);
            report(&cpu);
        }
    }

    ExitCode::SUCCESS
}

/// After the bounded run, step one cycle per blank `Enter`, `q`/EOF quits.
fn interactive_step(cpu: &mut Cpu) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        if cpu.halted {
            println!("HALT retired at cycle {}.", cpu.clock);
            return;
        }
        print!("apex-sim [cycle {}] (Enter = step, q = quit) > ", cpu.clock);
        let _ = stdout.flush();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            return; // EOF
        }
        if line.trim().eq_ignore_ascii_case("q") {
            return;
        }
        cpu.tick();
    }
}

fn report(cpu: &Cpu) {
    println!("\nPC = {}", cpu.pc);
    println!("ZF = {}", cpu.zero_flag);

    println!("\n[Registers]");
    for (r, value) in cpu.regs.dump().iter().enumerate() {
        println!("R{r:<2} = {value}");
    }

    println!("\n[Data Memory] (first 32 non-zero words)");
    let mut shown = 0;
    for (addr, value) in cpu.data_memory.dump().iter().enumerate() {
        if *value != 0 {
            println!("  [{addr}] = {value}");
            shown += 1;
            if shown >= 32 {
                break;
            }
        }
    }

    cpu.stats.print();
}
