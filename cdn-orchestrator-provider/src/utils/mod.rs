//! Utility modules.

/// Timestamp formatting and parsing shared by signing and response types.
pub mod datetime;

/// Log sanitization utilities to prevent sensitive data exposure.
pub mod log_sanitizer;
