mod config;
mod driver;

use std::{env, process};

use config::{Command, Config};
use driver::{Process, SimulatedOs};

const PID: usize = 1;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("simulator");

    let config = match config::parse_args(args.get(1..).unwrap_or_default()) {
        Ok(Command::Run(config)) => config,
        Ok(Command::Help) => {
            config::print_help(program);
            return;
        }
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(&config) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(config: &Config) -> vm::error::Result<()> {
    let os = SimulatedOs::new(config.policy);
    let mut process = Process::new(PID, config.frames, config.pages, config.seed);

    println!(
        "simulator: policy={} frames={} pages={} references={}",
        config.policy,
        config.frames,
        process.page_count(),
        config.references.len()
    );

    for access in &config.references {
        let faults_before = process.stats().page_faults;
        let frame_idx = process.access(&os, access.vpn, access.write)?;

        if config.verbose {
            let kind = if access.write { "write" } else { "read" };
            let outcome = if process.stats().page_faults > faults_before { "fault" } else { "hit" };
            let resident: Vec<usize> = process.page_table().resident_pages().collect();

            println!(
                "simulator: {} page {:#04X} -> frame {} ({}) resident={:?}",
                kind, access.vpn, frame_idx, outcome, resident
            );
        }
    }

    let stats = process.stats();
    println!("simulator: accesses={}", stats.accesses);
    println!("simulator: page faults={}", stats.page_faults);
    println!("simulator: evictions={}", stats.evictions);
    println!("simulator: write-backs={}", stats.write_backs);

    Ok(())
}
