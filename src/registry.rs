//! Named stamps and output handles.
//!
//! The registry maps stamp names to [`Stamp`]s and handle names to output handles.
//! Stamps reference handles by name only; whether a referenced handle exists is checked
//! when a line is dispatched, not when the stamp is set up.
//!
//! Both maps live behind one mutex, so registration, activation and dispatch lookups
//! can run from any number of threads. The mutex is never held while a sink is written.

use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::log_error::{LogError, NameKind};
use crate::log_event::LogEvent;
use crate::sink::{share, SharedSink};

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives a reference to a `LogEvent` every time the registry is
/// changed or a line is dispatched. It must be thread-safe because the logger is shared.
pub type TraceCallback = dyn Fn(&LogEvent) + Send + Sync + 'static;

/// A named logging channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    name: String,
    active: bool,
    message_prefix: String,
    handle_keys: Vec<String>,
}

impl Stamp {
    fn new(name: &str, handle_keys: &[&str]) -> Self {
        Self {
            name: name.to_owned(),
            active: true,
            message_prefix: name.to_owned(),
            handle_keys: handle_keys.iter().map(|key| (*key).to_owned()).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Text rendered in front of every message on this stamp. Defaults to the name.
    pub fn message_prefix(&self) -> &str {
        &self.message_prefix
    }

    /// Output handle names in write order. May contain duplicates.
    pub fn handle_keys(&self) -> &[String] {
        &self.handle_keys
    }
}

struct OutputHandle {
    sink: SharedSink,
}

impl fmt::Debug for OutputHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputHandle").finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    stamps: HashMap<String, Stamp>,
    handles: HashMap<String, OutputHandle>,
}

/// Thread-safe store of stamps and output handles.
#[derive(Default)]
pub struct Registry {
    state: Mutex<RegistryState>,
    trace: Mutex<Option<Arc<TraceCallback>>>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("state", &*self.state())
            .finish_non_exhaustive()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // Lock poisoning is recovered everywhere: every mutation below either completes
    // or leaves the maps untouched, so a panic elsewhere cannot leave them half-written.
    fn state(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    // -------------------------------------------------------------------------------------------------
    // Tracing
    // -------------------------------------------------------------------------------------------------

    /// Set a tracing callback for registry and dispatch operations.
    ///
    /// # Safety Restrictions
    ///
    /// The callback must NOT call back into the same registry or logger, as it is
    /// invoked while holding the trace lock.
    pub fn set_trace_callback(&self, callback: impl Fn(&LogEvent) + Send + Sync + 'static) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(Arc::new(callback));
    }

    /// Clear the tracing callback.
    pub fn clear_trace_callback(&self) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    /// Invokes the tracing callback, if one is set.
    pub(crate) fn emit_event(&self, event: LogEvent) {
        let guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(callback) = guard.as_ref() {
            callback(&event);
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------------------------------

    /// Registers an active stamp routing to `handle_keys`, in order.
    ///
    /// The message prefix defaults to `name`. The handles need not exist yet.
    ///
    /// # Errors
    ///
    /// [`LogError::DuplicateName`] if a stamp called `name` already exists.
    pub fn register_stamp(&self, name: &str, handle_keys: &[&str]) -> Result<(), LogError> {
        {
            let mut state = self.state();
            if state.stamps.contains_key(name) {
                return Err(LogError::DuplicateName {
                    kind: NameKind::Stamp,
                    name: name.to_owned(),
                });
            }
            state
                .stamps
                .insert(name.to_owned(), Stamp::new(name, handle_keys));
        }

        self.emit_event(LogEvent::StampRegistered {
            name: name.to_owned(),
        });
        Ok(())
    }

    /// Registers an output handle wrapping `sink`.
    ///
    /// The handle is immutable afterwards. The sink is written to but never closed.
    ///
    /// # Errors
    ///
    /// [`LogError::DuplicateName`] if a handle called `name` already exists.
    pub fn register_output_handle(
        &self,
        name: &str,
        sink: impl Write + Send + 'static,
    ) -> Result<(), LogError> {
        {
            let mut state = self.state();
            if state.handles.contains_key(name) {
                return Err(LogError::DuplicateName {
                    kind: NameKind::OutputHandle,
                    name: name.to_owned(),
                });
            }
            state.handles.insert(
                name.to_owned(),
                OutputHandle {
                    sink: share(sink),
                },
            );
        }

        self.emit_event(LogEvent::HandleRegistered {
            name: name.to_owned(),
        });
        Ok(())
    }

    /// Appends handle names to a stamp's list, without deduplication.
    ///
    /// # Errors
    ///
    /// [`LogError::UnknownStamp`] if the stamp does not exist.
    pub fn append_handles(&self, name: &str, handle_keys: &[&str]) -> Result<(), LogError> {
        {
            let mut state = self.state();
            let stamp = state
                .stamps
                .get_mut(name)
                .ok_or_else(|| LogError::UnknownStamp {
                    name: name.to_owned(),
                })?;
            stamp
                .handle_keys
                .extend(handle_keys.iter().map(|key| (*key).to_owned()));
        }

        self.emit_event(LogEvent::HandlesAppended {
            stamp: name.to_owned(),
            count: handle_keys.len(),
        });
        Ok(())
    }

    /// Replaces the text rendered in front of messages on a stamp.
    ///
    /// An empty prefix makes dispatch render the caller location instead, when one is
    /// available.
    ///
    /// # Errors
    ///
    /// [`LogError::UnknownStamp`] if the stamp does not exist.
    pub fn set_message_prefix(&self, name: &str, prefix: &str) -> Result<(), LogError> {
        let mut state = self.state();
        let stamp = state
            .stamps
            .get_mut(name)
            .ok_or_else(|| LogError::UnknownStamp {
                name: name.to_owned(),
            })?;
        stamp.message_prefix = prefix.to_owned();
        Ok(())
    }

    /// Switches every named stamp on or off, or none of them.
    ///
    /// All names are validated before any stamp is touched.
    ///
    /// # Errors
    ///
    /// - [`LogError::EmptyBatch`] if `names` is empty
    /// - [`LogError::PartialNameNotFound`] naming the first unknown stamp
    pub fn set_active(&self, names: &[&str], active: bool) -> Result<(), LogError> {
        if names.is_empty() {
            return Err(LogError::EmptyBatch);
        }

        {
            let mut state = self.state();
            if let Some(missing) = names.iter().find(|name| !state.stamps.contains_key(**name)) {
                return Err(LogError::PartialNameNotFound {
                    name: (*missing).to_owned(),
                });
            }
            for name in names {
                if let Some(stamp) = state.stamps.get_mut(*name) {
                    stamp.active = active;
                }
            }
        }

        self.emit_event(LogEvent::StampsToggled {
            names: names.iter().map(|name| (*name).to_owned()).collect(),
            active,
        });
        Ok(())
    }

    /// Forwards to [`set_active`](Self::set_active) with `true`.
    pub fn activate_stamps(&self, names: &[&str]) -> Result<(), LogError> {
        self.set_active(names, true)
    }

    /// Forwards to [`set_active`](Self::set_active) with `false`.
    pub fn deactivate_stamps(&self, names: &[&str]) -> Result<(), LogError> {
        self.set_active(names, false)
    }

    // -------------------------------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------------------------------

    /// A snapshot of the named stamp.
    pub fn stamp(&self, name: &str) -> Option<Stamp> {
        self.state().stamps.get(name).cloned()
    }

    pub fn contains_stamp(&self, name: &str) -> bool {
        self.state().stamps.contains_key(name)
    }

    pub fn contains_handle(&self, name: &str) -> bool {
        self.state().handles.contains_key(name)
    }

    /// Registered stamp names, sorted.
    pub fn stamp_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state().stamps.keys().cloned().collect();
        names.sort();
        names
    }

    /// Registered output handle names, sorted.
    pub fn handle_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state().handles.keys().cloned().collect();
        names.sort();
        names
    }

    /// The named stamp if it exists and is active.
    pub(crate) fn resolve_stamp(&self, name: &str) -> Result<Stamp, LogError> {
        let stamp = self.stamp(name).ok_or_else(|| LogError::UnknownStamp {
            name: name.to_owned(),
        })?;
        if !stamp.active {
            return Err(LogError::InactiveStamp {
                name: name.to_owned(),
            });
        }
        Ok(stamp)
    }

    pub(crate) fn resolve_handle(&self, name: &str) -> Result<SharedSink, LogError> {
        self.state()
            .handles
            .get(name)
            .map(|handle| handle.sink.clone())
            .ok_or_else(|| LogError::UnknownHandle {
                name: name.to_owned(),
            })
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
