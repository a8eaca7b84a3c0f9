//! The logging façade and its dispatch path.
//!
//! A [`Logger`] owns the registry of stamps and output handles, the line settings and
//! the context lock. Every dispatch call resolves its stamp and handles from the
//! registry afresh, renders one line and writes it to each handle in order.
//!
//! When another context holds the context lock, a dispatch call from a different
//! context takes the lock for the duration of its writes, so lines of the holding
//! context are never interleaved with foreign ones.

use std::fmt;
use std::io;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use crate::config::{LoggerBuilder, LoggerConfig};
use crate::context_lock::{ContextGuard, ContextLock};
use crate::flags::{Flags, LogOptions};
use crate::format::{self, LineParts};
use crate::log_error::LogError;
use crate::log_event::LogEvent;
use crate::registry::Registry;
use crate::scope::{CallScope, SourceLocation};
use crate::sink;
use crate::token::{EscalationPolicy, RandomTokenSource, TokenSource};

/// Stamp used by the entry points that take no stamp name.
pub const DEFAULT_STAMP: &str = "*STDOUT";

/// Output handle wrapping standard output in the default route.
pub const DEFAULT_OUTPUT_HANDLE: &str = "*STDOUT";

/// Status passed to the [`Terminate`] hook after a fatal line.
pub const FATAL_EXIT_CODE: i32 = -1;

/// Ends the process after a line logged with [`LogOptions::FATAL`].
pub trait Terminate: Send + Sync {
    fn terminate(&self, code: i32);
}

impl<F> Terminate for F
where
    F: Fn(i32) + Send + Sync,
{
    fn terminate(&self, code: i32) {
        self(code)
    }
}

/// Default hook: [`std::process::exit`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExit;

impl Terminate for ProcessExit {
    fn terminate(&self, code: i32) {
        std::process::exit(code)
    }
}

#[derive(Debug)]
struct Settings {
    prefix: String,
    flags: Flags,
    active: bool,
}

/// Logging façade routing stamps to output handles.
///
/// Construct one per application and share it by reference or `Arc`.
///
/// # Examples
///
/// ```rust
/// use stamplog::{Flags, Logger, MemorySink};
///
/// let logger = Logger::builder().flags(Flags::empty()).build();
/// let sink = MemorySink::new();
///
/// logger.register_output_handle("out", sink.clone()).unwrap();
/// logger.register_stamp("S", &["out"]).unwrap();
/// logger.log_to("S", "hello").unwrap();
///
/// assert_eq!(sink.contents(), "S: hello\n");
/// ```
pub struct Logger {
    settings: RwLock<Settings>,
    registry: Registry,
    context_lock: ContextLock,
    escalation: EscalationPolicy,
    tokens: Box<dyn TokenSource>,
    terminator: Box<dyn Terminate>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("settings", &*self.settings())
            .field("registry", &self.registry)
            .field("context_lock", &self.context_lock)
            .field("escalation", &self.escalation)
            .finish_non_exhaustive()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// A logger with default settings and the `*STDOUT` route.
    pub fn new() -> Self {
        LoggerConfig::default().build()
    }

    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::default()
    }

    pub(crate) fn from_parts(
        config: LoggerConfig,
        tokens: Box<dyn TokenSource>,
        terminator: Box<dyn Terminate>,
    ) -> Self {
        let registry = Registry::new();
        if config.default_route {
            // A fresh registry has no names to collide with.
            let _ = registry.register_output_handle(DEFAULT_OUTPUT_HANDLE, io::stdout());
            let _ = registry.register_stamp(DEFAULT_STAMP, &[DEFAULT_OUTPUT_HANDLE]);
        }

        Self {
            settings: RwLock::new(Settings {
                prefix: config.prefix,
                flags: config.flags,
                active: config.active,
            }),
            registry,
            context_lock: ContextLock::new(),
            escalation: config.escalation,
            tokens,
            terminator,
        }
    }

    fn settings(&self) -> RwLockReadGuard<'_, Settings> {
        self.settings.read().unwrap_or_else(|p| p.into_inner())
    }

    fn settings_mut(&self) -> RwLockWriteGuard<'_, Settings> {
        self.settings.write().unwrap_or_else(|p| p.into_inner())
    }

    // -------------------------------------------------------------------------------------------------
    // Settings
    // -------------------------------------------------------------------------------------------------

    pub fn prefix(&self) -> String {
        self.settings().prefix.clone()
    }

    pub fn set_prefix(&self, prefix: impl Into<String>) {
        self.settings_mut().prefix = prefix.into();
    }

    pub fn flags(&self) -> Flags {
        self.settings().flags
    }

    pub fn set_flags(&self, flags: Flags) {
        self.settings_mut().flags = flags;
    }

    /// Whether the master switch is on.
    pub fn is_active(&self) -> bool {
        self.settings().active
    }

    /// Turns every dispatch call into a no-op, or back.
    pub fn set_active(&self, active: bool) {
        self.settings_mut().active = active;
    }

    pub fn escalation_policy(&self) -> EscalationPolicy {
        self.escalation
    }

    // -------------------------------------------------------------------------------------------------
    // Registry
    // -------------------------------------------------------------------------------------------------

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// See [`Registry::register_stamp`].
    pub fn register_stamp(&self, name: &str, handle_keys: &[&str]) -> Result<(), LogError> {
        self.registry.register_stamp(name, handle_keys)
    }

    /// See [`Registry::register_output_handle`].
    pub fn register_output_handle(
        &self,
        name: &str,
        sink: impl io::Write + Send + 'static,
    ) -> Result<(), LogError> {
        self.registry.register_output_handle(name, sink)
    }

    /// See [`Registry::append_handles`].
    pub fn append_handles(&self, name: &str, handle_keys: &[&str]) -> Result<(), LogError> {
        self.registry.append_handles(name, handle_keys)
    }

    /// See [`Registry::set_message_prefix`].
    pub fn set_message_prefix(&self, name: &str, prefix: &str) -> Result<(), LogError> {
        self.registry.set_message_prefix(name, prefix)
    }

    /// See [`Registry::set_active`].
    pub fn activate_stamps(&self, names: &[&str]) -> Result<(), LogError> {
        self.registry.activate_stamps(names)
    }

    /// See [`Registry::set_active`].
    pub fn deactivate_stamps(&self, names: &[&str]) -> Result<(), LogError> {
        self.registry.deactivate_stamps(names)
    }

    /// See [`Registry::set_trace_callback`].
    pub fn set_trace_callback(&self, callback: impl Fn(&LogEvent) + Send + Sync + 'static) {
        self.registry.set_trace_callback(callback)
    }

    pub fn clear_trace_callback(&self) {
        self.registry.clear_trace_callback()
    }

    // -------------------------------------------------------------------------------------------------
    // Context lock
    // -------------------------------------------------------------------------------------------------

    pub fn context_lock(&self) -> &ContextLock {
        &self.context_lock
    }

    /// Reserves the output path for the context `token` until the guard is dropped.
    ///
    /// While held, lines logged with a matching call scope go straight through and lines
    /// from any other context wait. An empty token is replaced by a freshly minted one.
    ///
    /// The calling thread must not log under a different context while it holds the
    /// guard: that call would wait for the guard it holds itself.
    pub fn lock_context(&self, token: &str) -> ContextGuard<'_> {
        if token.is_empty() {
            self.context_lock.lock(self.mint_token())
        } else {
            self.context_lock.lock(token)
        }
    }

    /// Force-releases the context lock, whoever holds it.
    pub fn unlock_context(&self) -> Option<String> {
        self.context_lock.release()
    }

    /// A new token from the configured source. The empty token never holds the lock, so
    /// an empty result is replaced by a random one.
    fn mint_token(&self) -> String {
        let token = self.tokens.next_token();
        if token.is_empty() {
            tracing::warn!("token source returned an empty token, minting a random one");
            return RandomTokenSource.next_token();
        }
        token
    }

    // -------------------------------------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------------------------------------

    /// Writes `message` to every output handle of `stamp`.
    ///
    /// Nothing happens when the master switch is off or `condition` is false. The
    /// context token is read from `scope` (anonymous when `None`). With
    /// [`LogOptions::FATAL`] the message gets no newline of its own, so the line ends in
    /// exactly one `\n` even when the message already carries it. The terminate hook
    /// runs once all handles have been written, after the context lock has been released.
    ///
    /// # Errors
    ///
    /// - [`LogError::UnknownStamp`] / [`LogError::InactiveStamp`]
    /// - [`LogError::UnknownHandle`] for the first handle key that does not resolve;
    ///   handles after it are not written, handles before it keep their line
    /// - [`LogError::Write`] if a sink fails, with the same abort behavior
    pub fn log_at(
        &self,
        scope: Option<&CallScope>,
        condition: bool,
        stamp: &str,
        message: &str,
        options: LogOptions,
        location: Option<SourceLocation>,
    ) -> Result<(), LogError> {
        if !self.is_active() || !condition {
            return Ok(());
        }

        let caller = scope.map(CallScope::context_id).unwrap_or("");
        {
            let _guard = self.escalate(caller);
            self.write_stamp(caller, stamp, message, options, location.as_ref())?;
        }

        if options.contains(LogOptions::FATAL) {
            tracing::debug!(stamp, "fatal line written, terminating");
            self.terminator.terminate(FATAL_EXIT_CODE);
        }
        Ok(())
    }

    /// Takes the context lock if another context holds it.
    fn escalate(&self, caller: &str) -> Option<ContextGuard<'_>> {
        match self.context_lock.holder() {
            Some(holder) if holder != caller => {
                tracing::debug!(caller, holder = holder.as_str(), "waiting for context lock");
            }
            _ => return None,
        }

        let token = match self.escalation {
            EscalationPolicy::CallerToken if !caller.is_empty() => caller.to_owned(),
            _ => self.mint_token(),
        };
        let guard = self.context_lock.lock(token);

        self.registry.emit_event(LogEvent::LockEscalated {
            caller: caller.to_owned(),
            token: guard.token().to_owned(),
        });
        Some(guard)
    }

    fn write_stamp(
        &self,
        caller: &str,
        stamp_name: &str,
        message: &str,
        options: LogOptions,
        location: Option<&SourceLocation>,
    ) -> Result<(), LogError> {
        let stamp = self.registry.resolve_stamp(stamp_name)?;

        let line = {
            let settings = self.settings();
            format::render(
                &LineParts {
                    prefix: &settings.prefix,
                    flags: settings.flags,
                    stamp_prefix: stamp.message_prefix(),
                    context_id: caller,
                    message,
                    location,
                    newline: !options.contains(LogOptions::FATAL),
                },
                Utc::now(),
            )
        };

        for key in stamp.handle_keys() {
            let target = self.registry.resolve_handle(key)?;
            sink::write_line(&target, &line).map_err(|source| LogError::Write {
                handle: key.clone(),
                source,
            })?;
        }

        self.registry.emit_event(LogEvent::Dispatched {
            stamp: stamp_name.to_owned(),
            handles: stamp.handle_keys().len(),
        });
        Ok(())
    }

    /// [`log_at`](Self::log_at) without a call scope, recording the caller's location.
    #[track_caller]
    pub fn log(
        &self,
        condition: bool,
        stamp: &str,
        message: &str,
        options: LogOptions,
    ) -> Result<(), LogError> {
        self.log_at(
            None,
            condition,
            stamp,
            message,
            options,
            Some(SourceLocation::caller()),
        )
    }

    /// Logs to the default stamp.
    #[track_caller]
    pub fn log_default(&self, message: &str) -> Result<(), LogError> {
        self.log(true, DEFAULT_STAMP, message, LogOptions::NONE)
    }

    #[track_caller]
    pub fn log_to(&self, stamp: &str, message: &str) -> Result<(), LogError> {
        self.log(true, stamp, message, LogOptions::NONE)
    }

    #[track_caller]
    pub fn log_with(
        &self,
        stamp: &str,
        message: &str,
        options: LogOptions,
    ) -> Result<(), LogError> {
        self.log(true, stamp, message, options)
    }

    #[track_caller]
    pub fn log_if(&self, condition: bool, stamp: &str, message: &str) -> Result<(), LogError> {
        self.log(condition, stamp, message, LogOptions::NONE)
    }

    /// Entry points that log on behalf of the context carried by `scope`.
    pub fn scoped<'a>(&'a self, scope: &'a CallScope) -> ScopedLogger<'a> {
        ScopedLogger {
            logger: self,
            scope,
        }
    }
}

/// A [`Logger`] paired with the call scope of one unit of work.
///
/// # Examples
///
/// ```rust
/// use stamplog::{CallScope, Flags, Logger, MemorySink};
///
/// let logger = Logger::builder().flags(Flags::empty()).without_default_route().build();
/// let sink = MemorySink::new();
/// logger.register_output_handle("out", sink.clone()).unwrap();
/// logger.register_stamp("REQ", &["out"]).unwrap();
///
/// let scope = CallScope::with_id("req-9");
/// logger.scoped(&scope).log_to("REQ", "accepted").unwrap();
///
/// assert_eq!(sink.contents(), "REQ: (Context:req-9) accepted\n");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ScopedLogger<'a> {
    logger: &'a Logger,
    scope: &'a CallScope,
}

impl ScopedLogger<'_> {
    pub fn scope(&self) -> &CallScope {
        self.scope
    }

    #[track_caller]
    pub fn log(
        &self,
        condition: bool,
        stamp: &str,
        message: &str,
        options: LogOptions,
    ) -> Result<(), LogError> {
        self.logger.log_at(
            Some(self.scope),
            condition,
            stamp,
            message,
            options,
            Some(SourceLocation::caller()),
        )
    }

    #[track_caller]
    pub fn log_default(&self, message: &str) -> Result<(), LogError> {
        self.log(true, DEFAULT_STAMP, message, LogOptions::NONE)
    }

    #[track_caller]
    pub fn log_to(&self, stamp: &str, message: &str) -> Result<(), LogError> {
        self.log(true, stamp, message, LogOptions::NONE)
    }

    #[track_caller]
    pub fn log_with(
        &self,
        stamp: &str,
        message: &str,
        options: LogOptions,
    ) -> Result<(), LogError> {
        self.log(true, stamp, message, options)
    }

    #[track_caller]
    pub fn log_if(&self, condition: bool, stamp: &str, message: &str) -> Result<(), LogError> {
        self.log(condition, stamp, message, LogOptions::NONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemorySink;

    fn quiet_logger() -> Logger {
        Logger::builder()
            .flags(Flags::empty())
            .without_default_route()
            .build()
    }

    #[test]
    fn test_default_route() {
        let logger = Logger::new();
        let stamp = logger.registry().stamp(DEFAULT_STAMP).unwrap();
        assert_eq!(stamp.handle_keys(), [DEFAULT_OUTPUT_HANDLE]);
        assert!(logger.registry().contains_handle(DEFAULT_OUTPUT_HANDLE));
        assert_eq!(logger.flags(), Flags::STD);
        assert!(logger.is_active());
    }

    #[test]
    fn test_prefix_separator() {
        let logger = quiet_logger();
        let sink = MemorySink::new();
        logger.register_output_handle("out", sink.clone()).unwrap();
        logger.register_stamp("S", &["out"]).unwrap();

        logger.set_prefix("node-1");
        logger.log_to("S", "up").unwrap();

        assert_eq!(sink.contents(), "node-1 S: up\n");
    }

    #[test]
    fn test_short_file_uses_call_site() {
        let logger = quiet_logger();
        let sink = MemorySink::new();
        logger.register_output_handle("out", sink.clone()).unwrap();
        logger.register_stamp("S", &["out"]).unwrap();
        logger.set_flags(Flags::SHORT_FILE);

        let line = line!() + 1;
        logger.log_to("S", "here").unwrap();

        assert_eq!(sink.contents(), format!("logger.rs ({}) S: here\n", line));
    }

    #[test]
    fn test_anonymous_caller_waits_for_holder() {
        let logger = Logger::builder()
            .flags(Flags::empty())
            .without_default_route()
            .token_source(|| "minted".to_string())
            .build();
        logger.register_output_handle("out", MemorySink::new()).unwrap();
        logger.register_stamp("S", &["out"]).unwrap();

        assert!(logger.escalate("").is_none());

        assert!(logger.context_lock().try_acquire("holder"));
        let released = std::thread::scope(|s| {
            let waiting = s.spawn(|| logger.log_to("S", "queued"));
            std::thread::sleep(std::time::Duration::from_millis(50));
            assert!(!waiting.is_finished());
            logger.unlock_context();
            waiting.join().unwrap()
        });
        assert!(released.is_ok());
        assert!(!logger.context_lock().is_locked());
    }
}
