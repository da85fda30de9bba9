//! # Assertion Errors
//!
//! Every way an envelope can fail to become an admitted assertion. Each
//! variant describes exactly one problem; builders stop at the first failing
//! field rather than collecting several.
//!
//! ## Stages
//!
//! | Variant                 | Stage       | Retryable |
//! |-------------------------|-------------|-----------|
//! | `MissingField`          | structural  | no        |
//! | `InvalidInteger`        | structural  | no        |
//! | `InvalidTimestamp`      | structural  | no        |
//! | `UnknownKind`           | structural  | yes, after a registry/version update |
//! | `KindMismatch`          | structural  | no        |
//! | `KeyValidityViolation`  | consistency | no, needs a new signature |
//! | `SigningKeyMismatch`    | consistency | no        |
//! | `UnknownSigningKey`     | consistency | yes, once the key reaches the trust database |

use attest_core::{KindId, SignerId, Timestamp};
use thiserror::Error;

use crate::consistency::ValidityWindow;

/// The validation stage an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Header presence and typing.
    Structural,
    /// Semantic checks against trust state.
    Consistency,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Structural => "structural",
            Self::Consistency => "consistency",
        };
        f.write_str(s)
    }
}

/// Rejection of an assertion envelope.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssertionError {
    /// A mandatory header is absent or empty.
    #[error("{field:?} header is mandatory and must not be empty")]
    MissingField {
        /// Header name.
        field: String,
    },

    /// A header is present but not an unsigned integer of the requested width.
    #[error("{field:?} header is not an unsigned {bits}-bit integer: {value:?}")]
    InvalidInteger {
        /// Header name.
        field: String,
        /// The offending value.
        value: String,
        /// Requested bit width.
        bits: u32,
    },

    /// A header is present but not a valid RFC 3339 date-time.
    #[error("{field:?} header is not a RFC 3339 date: {reason}")]
    InvalidTimestamp {
        /// Header name.
        field: String,
        /// The offending value.
        value: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// No builder is registered for the envelope's kind.
    #[error("unknown assertion kind: {kind}")]
    UnknownKind {
        /// The unregistered kind.
        kind: KindId,
    },

    /// A builder was handed an envelope of a different kind.
    #[error("builder for {expected} cannot build a {actual} assertion")]
    KindMismatch {
        /// Kind the builder produces.
        expected: KindId,
        /// Kind carried by the envelope.
        actual: KindId,
    },

    /// The assertion timestamp falls outside the signing key's validity.
    #[error("{kind} timestamp {timestamp} outside of signing key validity {window}")]
    KeyValidityViolation {
        /// Kind of the rejected assertion.
        kind: KindId,
        /// The assertion's timestamp.
        timestamp: Timestamp,
        /// The signing key's validity window.
        window: ValidityWindow,
    },

    /// The signing key belongs to an account other than the signer.
    #[error("signing key {key_id:?} belongs to {key_signer}, not to signer {signer}")]
    SigningKeyMismatch {
        /// Signer of the assertion.
        signer: SignerId,
        /// Account the key is recorded under.
        key_signer: SignerId,
        /// Key identifier.
        key_id: String,
    },

    /// The trust database holds no key matching the envelope's signature.
    #[error("no account key {key_id:?} for signer {signer}")]
    UnknownSigningKey {
        /// Signer named by the envelope.
        signer: SignerId,
        /// Key identifier from the signature provenance.
        key_id: String,
    },
}

impl AssertionError {
    /// The stage this error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            Self::MissingField { .. }
            | Self::InvalidInteger { .. }
            | Self::InvalidTimestamp { .. }
            | Self::UnknownKind { .. }
            | Self::KindMismatch { .. } => Stage::Structural,
            Self::KeyValidityViolation { .. }
            | Self::SigningKeyMismatch { .. }
            | Self::UnknownSigningKey { .. } => Stage::Consistency,
        }
    }

    /// Whether re-presenting the same envelope could succeed later.
    ///
    /// Only failures caused by the validator's own state (registry contents,
    /// trust database contents) are retryable. Malformed or mis-signed input
    /// never is.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::UnknownKind { .. } | Self::UnknownSigningKey { .. }
        )
    }
}

/// Error assembling the kind registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A second builder was registered for an existing kind.
    #[error("assertion kind {0} is already registered")]
    DuplicateKind(KindId),

    /// A kind identifier failed validation.
    #[error("invalid kind identifier: {0}")]
    InvalidKind(#[from] attest_core::CoreError),

    /// The configuration enables a kind this build does not provide.
    #[error("configured kind {0} has no builder")]
    UnknownConfiguredKind(KindId),

    /// The process-wide registry was already initialized.
    #[error("process-wide registry is already initialized")]
    AlreadyInstalled,
}
