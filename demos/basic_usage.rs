//! Basic usage example
//!
//! Demonstrates the producer API, the skip mask and the write observer.
//!
//! Run with: cargo run --example basic_usage

use rust_log_spooler::prelude::*;
use rust_log_spooler::{normal, warn};
use std::sync::Arc;

fn main() -> Result<()> {
    println!("=== Rust Log Spooler - Basic Usage Example ===\n");

    let log_dir = std::env::temp_dir().join("rust_log_spooler_basic");
    let mut spooler = LogSpooler::builder()
        .log_dir(&log_dir)
        .on_write(Arc::new(|kind: LogKind, body: &str| println!("  [{}] {}", kind, body)))
        .build()?;

    println!("1. Runtime templates:");
    spooler.write_normal("Application started, pid {0}", &[&std::process::id()]);
    spooler.write_warn("{0} of {1} workers idle", &[&3, &8]);

    println!("2. Compile-time formatting macros:");
    normal!(spooler, "Loaded {} plugins", 4);
    warn!(spooler, "Config key '{}' is deprecated", "max_conn");

    println!("3. Skipping Normal records:");
    spooler.set_skip_mask(LogKind::None | LogKind::Normal);
    spooler.write_normal("This line is filtered out", &[]);
    spooler.write_exception("But exceptions still get through", &[]);

    println!("4. Errors with their source chain:");
    let error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "cannot open cache");
    spooler.write_error_with(&error, "Cache warmup failed");

    spooler.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);

    let metrics = spooler.metrics();
    println!(
        "\nWritten: {}, skipped: {}, suppressed: {}",
        metrics.written(),
        metrics.skipped(),
        metrics.suppressed()
    );
    println!("Log files are in {}", log_dir.display());
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
