//! Write sinks wrapped by output handles.
//!
//! A sink is anything implementing [`std::io::Write`] + `Send`. The logger never reads
//! from a sink and never closes it; the resource behind it stays owned by the caller.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Type-erased sink shared between the registry and in-flight dispatch calls.
pub type SharedSink = Arc<Mutex<dyn Write + Send>>;

/// Wraps a writer so it can be stored behind an output handle.
pub(crate) fn share(sink: impl Write + Send + 'static) -> SharedSink {
    Arc::new(Mutex::new(sink))
}

/// Writes one fully rendered line to a sink.
///
/// The line goes out in a single `write_all` so concurrent writers to the same sink
/// never split it; the sink is flushed afterwards so lines are visible even when the
/// process terminates right after.
///
/// # Lock Poisoning Recovery
///
/// A sink whose lock was poisoned by a panicking writer is still written to.
pub(crate) fn write_line(sink: &SharedSink, line: &str) -> io::Result<()> {
    let mut writer = sink.lock().unwrap_or_else(|p| p.into_inner());
    writer.write_all(line.as_bytes())?;
    writer.flush()
}

/// In-memory sink whose clones share one buffer.
///
/// Register one clone with the logger and keep another to inspect what was written.
///
/// # Examples
///
/// ```rust
/// use std::io::Write;
/// use stamplog::MemorySink;
///
/// let sink = MemorySink::new();
/// let mut writer = sink.clone();
/// writer.write_all(b"first\nsecond\n").unwrap();
///
/// assert_eq!(sink.lines(), vec!["first", "second"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, decoded lossily as UTF-8.
    pub fn contents(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(|p| p.into_inner());
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Written text split into lines, without terminators.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .is_empty()
    }

    pub fn clear(&self) {
        self.buffer
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clear();
    }
}

impl Write for MemorySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
