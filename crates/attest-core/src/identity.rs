//! # Identity Newtypes
//!
//! Identifiers that name who signed an assertion and which schema it follows.
//! Each is a distinct type: a [`SignerId`] cannot be passed where a
//! [`KindId`] is expected.
//!
//! ## Validation
//!
//! Both [`SignerId`] and [`KindId`] must be non-empty and free of whitespace
//! and control characters. Neither enforces a naming convention: a kind the
//! registry does not know, whatever its spelling, is reported at dispatch
//! rather than when the envelope is decoded. Built-in kinds use lowercase
//! kebab-case (`build-record`, `revision-record`).
//!
//! Both validate at construction and at deserialization.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Implements `Deserialize` for string newtypes by routing through `new()`,
/// so invalid values are rejected at deserialization time.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Implements the shared string accessors and `Display`.
macro_rules! impl_str_newtype {
    ($ty:ident) => {
        impl $ty {
            /// Access the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

/// The identity of the account that signed an assertion.
///
/// The signing layer has already verified the signature by the time a
/// `SignerId` reaches the core; this type only guards its shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SignerId(String);

impl SignerId {
    /// Create a validated signer identifier.
    pub fn new(value: impl Into<String>) -> Result<Self, CoreError> {
        validate_token("signer", value.into()).map(Self)
    }
}

impl_str_newtype!(SignerId);
impl_validating_deserialize!(SignerId);

/// The discriminator selecting which assertion schema applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct KindId(String);

impl KindId {
    /// Create a validated kind identifier.
    pub fn new(value: impl Into<String>) -> Result<Self, CoreError> {
        validate_token("kind", value.into()).map(Self)
    }

    /// Wrap a compile-time kind constant without re-validating it.
    ///
    /// Intended for the `KIND` constants of built-in kinds; debug builds
    /// still assert the shape.
    pub fn from_static(value: &'static str) -> Self {
        debug_assert!(is_token(value), "invalid kind constant {value:?}");
        Self(value.to_string())
    }
}

impl_str_newtype!(KindId);
impl_validating_deserialize!(KindId);

fn is_token(s: &str) -> bool {
    !s.is_empty() && !s.chars().any(|c| c.is_whitespace() || c.is_control())
}

fn validate_token(namespace: &'static str, value: String) -> Result<String, CoreError> {
    if value.is_empty() {
        return Err(CoreError::InvalidIdentifier {
            namespace,
            value,
            reason: "must not be empty",
        });
    }
    if !is_token(&value) {
        return Err(CoreError::InvalidIdentifier {
            namespace,
            value,
            reason: "must not contain whitespace or control characters",
        });
    }
    Ok(value)
}
