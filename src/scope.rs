//! Call-scoped values carried into a dispatch call.

use std::collections::HashMap;
use std::fmt;
use std::panic::Location;

/// Key under which a [`CallScope`] carries the context token.
pub const CONTEXT_ID_KEY: &str = "ID";

/// Values attached to the unit of work on whose behalf a line is logged.
///
/// The logger only reads the string stored under [`CONTEXT_ID_KEY`]; a scope without it
/// behaves like no scope at all (the anonymous context).
///
/// # Examples
///
/// ```rust
/// use stamplog::CallScope;
///
/// let scope = CallScope::with_id("req-42").with_value("user", "alice");
/// assert_eq!(scope.context_id(), "req-42");
/// assert_eq!(scope.get("user"), Some("alice"));
/// assert_eq!(CallScope::new().context_id(), "");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallScope {
    values: HashMap<String, String>,
}

impl CallScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope carrying only a context token.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self::new().with_value(CONTEXT_ID_KEY, id)
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// The context token, or the empty string when the scope carries none.
    pub fn context_id(&self) -> &str {
        self.get(CONTEXT_ID_KEY).unwrap_or("")
    }
}

/// A source position rendered when caller-location flags are set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// The location of whoever called the function this is invoked from.
    ///
    /// Only meaningful inside a `#[track_caller]` chain.
    #[track_caller]
    pub fn caller() -> Self {
        Location::caller().into()
    }

    /// Final path element of `file`.
    pub fn short_file(&self) -> &str {
        self.file
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.file.as_str())
    }
}

impl From<&Location<'_>> for SourceLocation {
    fn from(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}
