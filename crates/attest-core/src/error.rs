//! # Error Types
//!
//! Errors raised while constructing core primitives. Assertion-level
//! failures (missing headers, key validity violations) live in
//! `attest-asserts` and wrap these where a primitive is involved.

use thiserror::Error;

/// Error constructing a core primitive from untrusted input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The value is not a valid RFC 3339 date-time.
    #[error("invalid RFC 3339 timestamp {value:?}: {reason}")]
    InvalidTimestamp {
        /// The offending input.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// An identifier failed format validation.
    #[error("invalid {namespace} identifier {value:?}: {reason}")]
    InvalidIdentifier {
        /// Identifier namespace (`signer`, `kind`).
        namespace: &'static str,
        /// The offending input.
        value: String,
        /// Why the value was rejected.
        reason: &'static str,
    },
}
