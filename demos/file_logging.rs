//! File logging example
//!
//! Demonstrates day files, repeated-error suppression and log maintenance,
//! driving drain cycles by hand.
//!
//! Run with: cargo run --example file_logging

use rust_log_spooler::prelude::*;

fn main() -> Result<()> {
    println!("=== Rust Log Spooler - File Logging Example ===\n");

    let log_dir = std::env::temp_dir().join("rust_log_spooler_files");
    let spooler = LogSpooler::builder()
        .log_dir(&log_dir)
        .appender(ConsoleAppender::new())
        .manual_drain()
        .build()?;

    println!("1. Logging a burst of identical failures:");
    let error = std::io::Error::new(std::io::ErrorKind::TimedOut, "upstream timed out");
    for attempt in 1..=5 {
        spooler.write_error_with(&error, "Health check failed");
        spooler.write_normal("Retry {0} scheduled", &[&attempt]);
    }

    let report = spooler.drain_cycle()?;
    println!(
        "\n   drained {}, written {}, suppressed {}",
        report.drained, report.written, report.suppressed
    );

    println!("\n2. Log files older than 30 days:");
    for file in spooler.list_log_files(30)? {
        println!("   {} ({} bytes)", file.path.display(), file.size);
    }

    let deleted = spooler.delete_logs(30)?;
    println!("   deleted {} file(s)", deleted);

    println!("\n=== Example completed successfully! ===");
    println!("Check '{}' for today's log file", log_dir.display());

    Ok(())
}
