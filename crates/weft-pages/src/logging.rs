//! Logging abstraction layer for weft-pages
//!
//! This module provides logging macros used throughout the crate. They forward
//! to the [`tracing`] crate so the host application decides where events go
//! (install any `tracing-subscriber` layer). All macros are no-ops in release
//! builds.
//!
//! ## Macro Overview
//!
//! | Macro | Debug Assertions | Feature Required | Level |
//! |-------|------------------|------------------|-------|
//! | `debug_log!` | Required | `debug-hooks` | `DEBUG` |
//! | `info_log!` | Required | None | `INFO` |
//! | `warn_log!` | Required | None | `WARN` |
//! | `error_log!` | Required | None | `ERROR` |
//!
//! ## Example
//!
//! ```ignore
//! use weft_pages::{debug_log, info_log, warn_log, error_log};
//!
//! // Only logged when both `debug-hooks` feature and `debug_assertions` are enabled
//! debug_log!("Patch stats: {:?}", stats);
//!
//! info_log!("Component mounted");
//! warn_log!("Unknown store key: {}", key);
//! error_log!("Render failed: {}", error);
//! ```

/// Logs a debug message (requires `debug-hooks` feature + `debug_assertions`)
///
/// Used for per-patch and per-subscription tracing. It compiles to a no-op
/// when conditions are not met.
///
/// # Example
///
/// ```ignore
/// debug_log!("Debug value: {:?}", value);
/// ```
#[macro_export]
#[cfg(all(debug_assertions, feature = "debug-hooks"))]
macro_rules! debug_log {
	($($arg:tt)*) => {{
		$crate::__tracing::debug!(target: "weft_pages", $($arg)*);
	}};
}

/// No-op debug_log when conditions are not met
#[macro_export]
#[cfg(not(all(debug_assertions, feature = "debug-hooks")))]
macro_rules! debug_log {
	($($arg:tt)*) => {{}};
}

/// Logs an info message (requires `debug_assertions`)
///
/// # Example
///
/// ```ignore
/// info_log!("Navigated to {}", path);
/// ```
#[macro_export]
#[cfg(debug_assertions)]
macro_rules! info_log {
	($($arg:tt)*) => {{
		$crate::__tracing::info!(target: "weft_pages", $($arg)*);
	}};
}

/// No-op info_log in release builds
#[macro_export]
#[cfg(not(debug_assertions))]
macro_rules! info_log {
	($($arg:tt)*) => {{}};
}

/// Logs a warning message (requires `debug_assertions`)
///
/// # Example
///
/// ```ignore
/// warn_log!("Observed key `{}` is not registered", key);
/// ```
#[macro_export]
#[cfg(debug_assertions)]
macro_rules! warn_log {
	($($arg:tt)*) => {{
		$crate::__tracing::warn!(target: "weft_pages", $($arg)*);
	}};
}

/// No-op warn_log in release builds
#[macro_export]
#[cfg(not(debug_assertions))]
macro_rules! warn_log {
	($($arg:tt)*) => {{}};
}

/// Logs an error message (requires `debug_assertions`)
///
/// # Example
///
/// ```ignore
/// error_log!("Store-driven render of {} failed: {}", name, error);
/// ```
#[macro_export]
#[cfg(debug_assertions)]
macro_rules! error_log {
	($($arg:tt)*) => {{
		$crate::__tracing::error!(target: "weft_pages", $($arg)*);
	}};
}

/// No-op error_log in release builds
#[macro_export]
#[cfg(not(debug_assertions))]
macro_rules! error_log {
	($($arg:tt)*) => {{}};
}
