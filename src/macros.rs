//! Macros for creating process-wide loggers.
//!
//! A [`Logger`](crate::Logger) is an ordinary value, but hosts that prefer one shared
//! instance for the whole process can generate it together with forwarding functions.

/// Creates a module holding a lazily-initialized global logger.
///
/// The generated module contains:
/// - A hidden `LazyLock<Logger>` static, built on first use
/// - `logger()` returning the `&'static Logger`
/// - Forwarding functions `log`, `log_default`, `log_to`, `log_with`, `log_if` and `scoped`
///
/// # Examples
///
/// ```rust
/// use stamplog::define_logger;
///
/// define_logger!(app);
///
/// // Default route: the `*STDOUT` stamp writes to standard output
/// app::log_default("service started").unwrap();
/// assert!(app::logger().registry().contains_stamp("*STDOUT"));
/// ```
///
/// # Custom Configuration
///
/// A second argument supplies the [`LoggerConfig`](crate::LoggerConfig). It is
/// evaluated inside the generated module, which glob-imports its parent module, so
/// names imported inside a function body are not visible to it.
///
/// ```rust
/// use stamplog::{define_logger, MemorySink};
///
/// define_logger!(audit, stamplog::LoggerConfig {
///     prefix: "audit".to_string(),
///     flags: stamplog::Flags::empty(),
///     default_route: false,
///     ..stamplog::LoggerConfig::default()
/// });
///
/// let sink = MemorySink::new();
/// audit::logger().register_output_handle("mem", sink.clone()).unwrap();
/// audit::logger().register_stamp("LOGIN", &["mem"]).unwrap();
/// audit::log_to("LOGIN", "alice").unwrap();
///
/// assert_eq!(sink.contents(), "audit LOGIN: alice\n");
/// ```
#[macro_export]
macro_rules! define_logger {
    ($name:ident) => {
        $crate::define_logger!($name, $crate::LoggerConfig::default());
    };
    ($name:ident, $config:expr) => {
        pub mod $name {
            #[allow(unused_imports)]
            use super::*;

            // Global logger (module-private)
            static LOGGER: std::sync::LazyLock<$crate::Logger> =
                std::sync::LazyLock::new(|| $crate::LoggerConfig::build($config));

            /// The process-wide logger of this module.
            pub fn logger() -> &'static $crate::Logger {
                &LOGGER
            }

            /// Forwards to [`Logger::log`]($crate::Logger::log).
            #[track_caller]
            pub fn log(
                condition: bool,
                stamp: &str,
                message: &str,
                options: $crate::LogOptions,
            ) -> Result<(), $crate::LogError> {
                LOGGER.log(condition, stamp, message, options)
            }

            /// Log to the default stamp.
            #[track_caller]
            pub fn log_default(message: &str) -> Result<(), $crate::LogError> {
                LOGGER.log_default(message)
            }

            /// Log to a named stamp.
            #[track_caller]
            pub fn log_to(stamp: &str, message: &str) -> Result<(), $crate::LogError> {
                LOGGER.log_to(stamp, message)
            }

            /// Log to a named stamp with options.
            #[track_caller]
            pub fn log_with(
                stamp: &str,
                message: &str,
                options: $crate::LogOptions,
            ) -> Result<(), $crate::LogError> {
                LOGGER.log_with(stamp, message, options)
            }

            /// Log to a named stamp if `condition` holds.
            #[track_caller]
            pub fn log_if(
                condition: bool,
                stamp: &str,
                message: &str,
            ) -> Result<(), $crate::LogError> {
                LOGGER.log_if(condition, stamp, message)
            }

            /// Entry points carrying a call scope.
            pub fn scoped(scope: &$crate::CallScope) -> $crate::ScopedLogger<'_> {
                LOGGER.scoped(scope)
            }
        }
    };
}
