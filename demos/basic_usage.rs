//! Basic usage example for stamplog.
//!
//! Demonstrates:
//! - Routing stamps to standard output and an in-memory sink
//! - Switching stamps off and on
//! - Reserving the output for one context while other threads wait
//!
//! Run with: `cargo run --example basic_usage`

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use stamplog::{CallScope, Flags, LogError, Logger, MemorySink, DEFAULT_OUTPUT_HANDLE};

fn main() -> Result<(), LogError> {
    println!("=== stamplog: Basic Usage ===\n");

    let logger = Arc::new(
        Logger::builder()
            .prefix("demo")
            .flags(Flags::STD | Flags::SHORT_FILE)
            .build(),
    );

    // -------------------------------------------------------------------------
    // 1. Stamps and handles
    // -------------------------------------------------------------------------
    println!("1. Registering stamps...");

    let audit = MemorySink::new();
    logger.register_output_handle("audit", audit.clone())?;
    logger.register_stamp("DB", &[DEFAULT_OUTPUT_HANDLE])?;
    logger.register_stamp("AUDIT", &[DEFAULT_OUTPUT_HANDLE, "audit"])?;

    logger.log_default("default stamp")?;
    logger.log_to("DB", "connected")?;
    logger.log_to("AUDIT", "user alice logged in")?;

    println!("   Audit sink holds {} line(s)\n", audit.lines().len());

    // -------------------------------------------------------------------------
    // 2. Switching stamps
    // -------------------------------------------------------------------------
    println!("2. Deactivating DB...");

    logger.deactivate_stamps(&["DB"])?;
    match logger.log_to("DB", "not shown") {
        Err(err) => println!("   {}", err),
        Ok(()) => println!("   unexpected success"),
    }
    logger.activate_stamps(&["DB"])?;
    println!();

    // -------------------------------------------------------------------------
    // 3. Context exclusivity
    // -------------------------------------------------------------------------
    println!("3. Holding the output for request req-1...");

    let guard = logger.lock_context("req-1");
    let other = {
        let logger = logger.clone();
        thread::spawn(move || {
            let scope = CallScope::with_id("req-2");
            logger.scoped(&scope).log_to("DB", "req-2 query")
        })
    };

    let scope = CallScope::with_id("req-1");
    let request = logger.scoped(&scope);
    request.log_to("DB", "req-1 begin")?;
    thread::sleep(Duration::from_millis(20));
    request.log_to("DB", "req-1 commit")?;
    drop(guard);

    other.join().expect("request thread panicked")?;

    println!("\n=== Done ===");
    Ok(())
}
