//! Prints the facts discovered about the processor hardware and checks whether the system
//! is suitable for running performance measurements.

use cpu_facts::CpuInfo;
use cpu_facts::diagnostics::{verify_performance_governor, verify_turbo_disabled};

fn main() {
    let cpu_info = CpuInfo::init();

    print!("{cpu_info}");

    match cpu_info.enforce_minimum_requirements() {
        Ok(()) => println!("The hardware meets the minimum requirements."),
        Err(e) => println!("{e}"),
    }

    // Warnings are logged via `tracing`, so we only report the totals here.
    let slow_cores = verify_performance_governor(cpu_info);
    println!("Cores not using the 'performance' frequency scaling governor: {slow_cores}");

    if verify_turbo_disabled(cpu_info) {
        println!("Turbo boost is enabled, performance measurements may be unreliable.");
    }
}
