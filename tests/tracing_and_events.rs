//! Integration tests for tracing and event monitoring.
//!
//! The trace callback sees every registry change and every dispatched line, which is
//! useful for debugging routing setups.

use stamplog::{Flags, LogOptions, Logger, MemorySink};
use std::sync::Arc;

fn traced_logger() -> (Logger, Arc<std::sync::Mutex<Vec<String>>>) {
    let logger = Logger::builder()
        .flags(Flags::empty())
        .without_default_route()
        .build();

    let events = Arc::new(std::sync::Mutex::new(Vec::new()));
    let events_clone = events.clone();
    logger.set_trace_callback(move |event| {
        events_clone.lock().unwrap().push(format!("{}", event));
    });
    (logger, events)
}

#[test]
fn test_basic_tracing() {
    let (logger, events) = traced_logger();

    logger.register_output_handle("out", MemorySink::new()).unwrap();
    logger.register_stamp("S", &["out"]).unwrap();
    logger.log_to("S", "hello").unwrap();

    let captured = events.lock().unwrap();
    assert_eq!(captured.len(), 3);
    assert!(captured[0].contains("handle registered"));
    assert!(captured[1].contains("stamp registered"));
    assert_eq!(captured[2], "dispatched { stamp: S, handles: 1 }");
}

#[test]
fn test_failed_operations_emit_nothing() {
    let (logger, events) = traced_logger();

    logger.register_stamp("S", &["missing"]).unwrap();
    let _ = logger.register_stamp("S", &[]);
    let _ = logger.activate_stamps(&["S", "ghost"]);
    let _ = logger.activate_stamps(&[]);
    let _ = logger.append_handles("ghost", &["x"]);
    let _ = logger.log_to("S", "unrouted");

    let captured = events.lock().unwrap();
    assert_eq!(*captured, vec!["stamp registered { name: S }"]);
}

#[test]
fn test_skipped_calls_emit_nothing() {
    let (logger, events) = traced_logger();
    logger.register_stamp("S", &[]).unwrap();
    events.lock().unwrap().clear();

    logger.log(false, "S", "skipped", LogOptions::NONE).unwrap();
    logger.set_active(false);
    logger.log_to("S", "skipped").unwrap();

    assert!(events.lock().unwrap().is_empty());
}

#[test]
fn test_toggle_events() {
    let (logger, events) = traced_logger();
    logger.register_stamp("a", &[]).unwrap();
    logger.register_stamp("b", &[]).unwrap();

    logger.deactivate_stamps(&["a", "b"]).unwrap();
    logger.activate_stamps(&["b"]).unwrap();

    let captured = events.lock().unwrap();
    assert_eq!(captured[2], "stamps toggled { names: [a, b], active: false }");
    assert_eq!(captured[3], "stamps toggled { names: [b], active: true }");
}

#[test]
fn test_clear_trace_callback() {
    let (logger, events) = traced_logger();

    logger.register_stamp("before", &[]).unwrap();
    logger.clear_trace_callback();
    logger.register_stamp("after", &[]).unwrap();

    let captured = events.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert!(captured[0].contains("before"));
}

#[test]
fn test_replace_trace_callback() {
    let (logger, first) = traced_logger();

    let second = Arc::new(std::sync::Mutex::new(Vec::new()));
    let second_clone = second.clone();
    logger.set_trace_callback(move |event| {
        second_clone.lock().unwrap().push(event.clone());
    });

    logger.register_output_handle("h", MemorySink::new()).unwrap();

    assert!(first.lock().unwrap().is_empty());
    assert_eq!(
        *second.lock().unwrap(),
        vec![stamplog::LogEvent::HandleRegistered {
            name: "h".to_string()
        }]
    );
}
