//! Formatting macros for the spooler.
//!
//! These expand with `format!` at compile time and enqueue the result
//! through [`SpoolerHandle::log`](crate::SpoolerHandle::log), so argument
//! mistakes are compile errors instead of runtime fallbacks.
//!
//! # Examples
//!
//! ```
//! use rust_log_spooler::prelude::*;
//! use rust_log_spooler::{normal, warn};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let spooler = LogSpooler::builder().log_dir(dir.path()).manual_drain().build().unwrap();
//!
//! normal!(spooler, "Server started");
//!
//! let free_mb = 512;
//! warn!(spooler, "Only {} MB free on {}", free_mb, "/var");
//! assert_eq!(spooler.pending(), 2);
//! ```

/// Enqueue a formatted message of the given kind.
///
/// # Examples
///
/// ```
/// # use rust_log_spooler::prelude::*;
/// # let dir = tempfile::tempdir().unwrap();
/// # let spooler = LogSpooler::builder().log_dir(dir.path()).manual_drain().build().unwrap();
/// use rust_log_spooler::write_log;
/// write_log!(spooler, LogKind::Normal, "Simple message");
/// write_log!(spooler, LogKind::Exception, "Status code: {}", 500);
/// ```
#[macro_export]
macro_rules! write_log {
    ($spooler:expr, $kind:expr, $($arg:tt)+) => {
        $spooler.log($kind, format!($($arg)+))
    };
}

/// Enqueue a `Normal` message.
#[macro_export]
macro_rules! normal {
    ($spooler:expr, $($arg:tt)+) => {
        $crate::write_log!($spooler, $crate::LogKind::Normal, $($arg)+)
    };
}

/// Enqueue a `Warn` message.
#[macro_export]
macro_rules! warn {
    ($spooler:expr, $($arg:tt)+) => {
        $crate::write_log!($spooler, $crate::LogKind::Warn, $($arg)+)
    };
}

/// Enqueue an `Exception` message.
///
/// For an actual error value use
/// [`SpoolerHandle::write_error`](crate::SpoolerHandle::write_error), which
/// keeps the source chain and takes part in repeated-error suppression.
#[macro_export]
macro_rules! exception {
    ($spooler:expr, $($arg:tt)+) => {
        $crate::write_log!($spooler, $crate::LogKind::Exception, $($arg)+)
    };
}
