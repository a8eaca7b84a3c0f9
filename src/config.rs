//! Logger configuration and construction.

use serde::Deserialize;

use crate::flags::Flags;
use crate::logger::{Logger, ProcessExit, Terminate};
use crate::token::{EscalationPolicy, RandomTokenSource, TokenSource};

/// Settings a [`Logger`] starts with.
///
/// Deserializable from any serde format, so hosts can keep it next to the rest of their
/// configuration. Missing fields take their defaults.
///
/// # Examples
///
/// ```rust
/// use stamplog::{Flags, LoggerConfig};
///
/// let config = LoggerConfig {
///     prefix: "api".to_string(),
///     flags: Flags::STD | Flags::SHORT_FILE,
///     ..LoggerConfig::default()
/// };
/// let logger = config.build();
/// assert_eq!(logger.prefix(), "api");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Text written at the start of every line, followed by a space when non-empty.
    pub prefix: String,
    pub flags: Flags,
    /// Master switch. When off every dispatch call is a no-op.
    pub active: bool,
    pub escalation: EscalationPolicy,
    /// Register the `*STDOUT` stamp routed to the `*STDOUT` handle on construction.
    pub default_route: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            flags: Flags::STD,
            active: true,
            escalation: EscalationPolicy::default(),
            default_route: true,
        }
    }
}

impl LoggerConfig {
    /// Builds a logger with the default token source and process-exit hook.
    pub fn build(self) -> Logger {
        LoggerBuilder::from_config(self).build()
    }
}

/// Builder for a [`Logger`] with injected collaborators.
///
/// # Examples
///
/// ```rust
/// use std::sync::atomic::{AtomicI32, Ordering};
/// use std::sync::Arc;
/// use stamplog::{Flags, Logger};
///
/// let exit_code = Arc::new(AtomicI32::new(0));
/// let recorded = exit_code.clone();
///
/// let logger = Logger::builder()
///     .prefix("worker")
///     .flags(Flags::empty())
///     .terminator(move |code: i32| recorded.store(code, Ordering::SeqCst))
///     .token_source(|| "fixed-token".to_string())
///     .without_default_route()
///     .build();
///
/// assert!(logger.registry().stamp_names().is_empty());
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    tokens: Box<dyn TokenSource>,
    terminator: Box<dyn Terminate>,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::from_config(LoggerConfig::default())
    }
}

impl LoggerBuilder {
    pub fn from_config(config: LoggerConfig) -> Self {
        Self {
            config,
            tokens: Box::new(RandomTokenSource),
            terminator: Box::new(ProcessExit),
        }
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.prefix = prefix.into();
        self
    }

    pub fn flags(mut self, flags: Flags) -> Self {
        self.config.flags = flags;
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.config.active = active;
        self
    }

    pub fn escalation(mut self, policy: EscalationPolicy) -> Self {
        self.config.escalation = policy;
        self
    }

    /// Start with an empty registry instead of the `*STDOUT` route.
    pub fn without_default_route(mut self) -> Self {
        self.config.default_route = false;
        self
    }

    /// Source of the tokens minted when a call has to take the context lock.
    pub fn token_source(mut self, tokens: impl TokenSource + 'static) -> Self {
        self.tokens = Box::new(tokens);
        self
    }

    /// Hook invoked after a fatal line has been written. Defaults to [`ProcessExit`].
    pub fn terminator(mut self, terminator: impl Terminate + 'static) -> Self {
        self.terminator = Box::new(terminator);
        self
    }

    pub fn build(self) -> Logger {
        Logger::from_parts(self.config, self.tokens, self.terminator)
    }
}
