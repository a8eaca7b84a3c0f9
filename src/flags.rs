//! Rendering flags and per-call options.

use bitflags::bitflags;

bitflags! {
    /// Selects which parts of the line header and body get rendered.
    ///
    /// `LONG_FILE` and `SHORT_FILE` are mutually exclusive in effect; when both are
    /// set, `LONG_FILE` wins.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
    #[serde(transparent)]
    pub struct Flags: u32 {
        /// The date in the local time zone: `2009/01/23`.
        const DATE = 1 << 0;
        /// The time in the local time zone: `01:23:23`.
        const TIME = 1 << 1;
        /// Microsecond resolution: `01:23:23.123123`. Implies `TIME`.
        const MICROSECONDS = 1 << 2;
        /// Full source path and line number of the call site.
        const LONG_FILE = 1 << 3;
        /// Final path element and line number of the call site.
        const SHORT_FILE = 1 << 4;
        /// Use UTC rather than the local time zone.
        const UTC = 1 << 5;
        /// Initial values for the default logger.
        const STD = Self::DATE.bits() | Self::TIME.bits();
    }
}

impl Default for Flags {
    fn default() -> Self {
        Flags::STD
    }
}

impl Flags {
    /// Whether any caller-location rendering is selected.
    pub fn renders_location(self) -> bool {
        self.intersects(Flags::LONG_FILE | Flags::SHORT_FILE)
    }
}

bitflags! {
    /// Per-call options accepted by the dispatch entry points.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LogOptions: u32 {
        /// Terminate the process after the line has been written to every handle.
        const FATAL = 1 << 1;
    }
}

impl LogOptions {
    /// No special behavior.
    pub const NONE: LogOptions = LogOptions::empty();
}
