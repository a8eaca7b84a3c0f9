//! Trace events reported through the logger's callback.

/// Events emitted by a logger while it manages its registry and context lock.
///
/// These events are passed to the tracing callback set via
/// [`Logger::set_trace_callback`](crate::Logger::set_trace_callback).
/// The `Clone` derive allows callbacks to store or forward events if needed.
///
/// # Examples
///
/// ```rust
/// use stamplog::LogEvent;
///
/// let event = LogEvent::StampRegistered { name: "audit".to_string() };
/// assert_eq!(event.to_string(), "stamp registered { name: audit }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    /// A stamp was added to the registry.
    StampRegistered { name: String },

    /// An output handle was added to the registry.
    HandleRegistered { name: String },

    /// Handle keys were appended to an existing stamp.
    HandlesAppended {
        stamp: String,
        /// Number of keys appended by this call
        count: usize,
    },

    /// A batch of stamps was switched on or off.
    StampsToggled { names: Vec<String>, active: bool },

    /// A dispatch call found another context holding the output lock and took it
    /// itself before writing.
    LockEscalated {
        /// Context token of the caller (empty when anonymous)
        caller: String,
        /// Token the lock was acquired with
        token: String,
    },

    /// A line was written to every handle of a stamp.
    Dispatched {
        stamp: String,
        /// Number of handles that received the line
        handles: usize,
    },
}

impl std::fmt::Display for LogEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogEvent::StampRegistered { name } => {
                write!(f, "stamp registered {{ name: {name} }}")
            }
            LogEvent::HandleRegistered { name } => {
                write!(f, "handle registered {{ name: {name} }}")
            }
            LogEvent::HandlesAppended { stamp, count } => {
                write!(f, "handles appended {{ stamp: {stamp}, count: {count} }}")
            }
            LogEvent::StampsToggled { names, active } => {
                let names = names.join(", ");
                write!(f, "stamps toggled {{ names: [{names}], active: {active} }}")
            }
            LogEvent::LockEscalated { caller, token } => {
                write!(f, "lock escalated {{ caller: {caller}, token: {token} }}")
            }
            LogEvent::Dispatched { stamp, handles } => {
                write!(f, "dispatched {{ stamp: {stamp}, handles: {handles} }}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event_display() {
        let event = LogEvent::HandleRegistered {
            name: "out".to_string(),
        };
        assert_eq!(event.to_string(), "handle registered { name: out }");

        let event = LogEvent::StampsToggled {
            names: vec!["a".to_string(), "b".to_string()],
            active: false,
        };
        assert_eq!(
            event.to_string(),
            "stamps toggled { names: [a, b], active: false }"
        );

        let event = LogEvent::Dispatched {
            stamp: "S".to_string(),
            handles: 2,
        };
        assert_eq!(event.to_string(), "dispatched { stamp: S, handles: 2 }");
    }

    #[test]
    fn test_log_event_clone() {
        let event = LogEvent::LockEscalated {
            caller: "req-1".to_string(),
            token: "1700000000-abcde".to_string(),
        };
        let cloned = event.clone();
        assert_eq!(event, cloned);
    }
}
