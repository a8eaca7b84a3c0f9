//! # Stamplog
//!
//! A thread-safe logging façade routing named channels ("stamps") to named
//! destinations ("output handles"), with a context lock that keeps the lines of one
//! unit of work from interleaving with lines of another.
//!
//! ## Quick Start
//!
//! ```rust
//! use stamplog::{Flags, Logger, MemorySink};
//!
//! let logger = Logger::builder().flags(Flags::empty()).build();
//!
//! // Route a stamp to an in-memory sink
//! let sink = MemorySink::new();
//! logger.register_output_handle("mem", sink.clone()).unwrap();
//! logger.register_stamp("DB", &["mem"]).unwrap();
//!
//! logger.log_to("DB", "connected").unwrap();
//! assert_eq!(sink.contents(), "DB: connected\n");
//! ```
//!
//! ## Features
//!
//! - **Thread-safe**: Registration and dispatch can run concurrently from any thread
//! - **Per-stamp switches**: Stamps are activated and deactivated in all-or-nothing batches
//! - **Context exclusivity**: [`Logger::lock_context`] reserves the output for one context
//! - **Tracing support**: Optional callback receiving a [`LogEvent`] per operation
//!
//! ## Main Types
//!
//! - [`Logger`] - The façade: settings, registry, context lock and dispatch
//! - [`Registry`] - Stamps and output handles
//! - [`ContextLock`] - Single-holder lock keyed by context tokens
//! - [`CallScope`] - Values of the unit of work a line is logged for
//! - [`define_logger!`] - A lazily-initialized process-wide logger

mod config;
mod context_lock;
mod flags;
mod format;
mod log_error;
mod log_event;
mod logger;
mod macros;
mod registry;
mod scope;
mod sink;
mod token;

// Re-export the main public API
pub use config::{LoggerBuilder, LoggerConfig};
pub use context_lock::{ContextGuard, ContextLock};
pub use flags::{Flags, LogOptions};
pub use log_error::{LogError, NameKind};
pub use log_event::LogEvent;
pub use logger::{
    Logger, ProcessExit, ScopedLogger, Terminate, DEFAULT_OUTPUT_HANDLE, DEFAULT_STAMP,
    FATAL_EXIT_CODE,
};
pub use registry::{Registry, Stamp, TraceCallback};
pub use scope::{CallScope, SourceLocation, CONTEXT_ID_KEY};
pub use sink::{MemorySink, SharedSink};
pub use token::{EscalationPolicy, RandomTokenSource, TokenSource};
