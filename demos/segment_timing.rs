//! Segment timing example
//!
//! Times the steps of a simulated job. The job is only logged when it takes
//! at least `record_min_ms`.
//!
//! Run with: cargo run --example segment_timing

use rust_log_spooler::prelude::*;
use std::thread;
use std::time::Duration;

fn run_job(spooler: &LogSpooler, name: &str, step_ms: u64) -> bool {
    let mut timer = spooler.segment(name);
    thread::sleep(Duration::from_millis(step_ms));
    timer.commit("fetched input");
    thread::sleep(Duration::from_millis(step_ms));
    timer.commit_fmt("transformed {0} rows", &[&1200]);
    thread::sleep(Duration::from_millis(step_ms));
    timer.commit("stored output");
    timer.flush()
}

fn main() -> Result<()> {
    println!("=== Rust Log Spooler - Segment Timing Example ===\n");

    let log_dir = std::env::temp_dir().join("rust_log_spooler_segments");
    let mut spooler = LogSpooler::builder()
        .log_dir(&log_dir)
        .record_min_ms(50)
        .build()?;

    let fast = run_job(&spooler, "fast job", 2);
    let slow = run_job(&spooler, "slow job", 30);
    println!("fast job logged: {}", fast);
    println!("slow job logged: {}", slow);

    spooler.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
    println!("\nCheck '{}' for the slow job's timing", log_dir.display());

    Ok(())
}
