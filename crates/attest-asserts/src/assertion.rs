//! # Typed Assertions
//!
//! [`AssertionBase`] holds the attributes every kind shares: kind, signer,
//! the raw headers, and the raw body. Each concrete kind embeds a base and
//! adds the typed fields it derives during build.
//!
//! ## Invariants
//!
//! - A typed assertion is immutable. Fields are private and only readable.
//! - Typed fields are derived from the retained headers exactly once, at
//!   build time, and never diverge from them.
//! - Headers beyond a kind's declared set are kept in the base and remain
//!   readable through [`AssertionBase::header()`].
//!
//! Kinds plug in through the [`TypedAssertion`] trait; the registry and the
//! consistency protocol only ever see `dyn TypedAssertion`.

use std::any::Any;
use std::fmt;

use attest_core::{HeaderMap, KindId, SignerId, Timestamp};

use crate::config::{TimestampProfile, ValidatorConfig};
use crate::consistency::{AccountKey, TrustDatabase};
use crate::envelope::Envelope;
use crate::error::AssertionError;

/// Attributes shared by every assertion kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionBase {
    kind: KindId,
    signer: SignerId,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl AssertionBase {
    /// Take the generic attributes from an envelope.
    pub fn from_envelope(envelope: &Envelope) -> Self {
        Self {
            kind: envelope.kind().clone(),
            signer: envelope.signer().clone(),
            headers: envelope.headers().clone(),
            body: envelope.body().to_vec(),
        }
    }

    /// The assertion kind.
    pub fn kind(&self) -> &KindId {
        &self.kind
    }

    /// The verified signer.
    pub fn signer(&self) -> &SignerId {
        &self.signer
    }

    /// A raw header value, including headers no builder declared.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// All raw headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The raw body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Header value for a field the builder already proved present.
    ///
    /// Returns `""` for an absent header, which a successfully built
    /// assertion never has for its mandatory fields.
    pub(crate) fn mandatory(&self, name: &str) -> &str {
        self.headers.get(name).unwrap_or_default()
    }

    /// Fail with `KindMismatch` unless this base carries `expected`.
    pub(crate) fn expect_kind(&self, expected: &'static str) -> Result<(), AssertionError> {
        if self.kind.as_str() == expected {
            return Ok(());
        }
        Err(AssertionError::KindMismatch {
            expected: KindId::from_static(expected),
            actual: self.kind.clone(),
        })
    }
}

/// Settings every builder receives, derived from [`ValidatorConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildContext {
    /// Profile for timestamp headers.
    pub timestamp_profile: TimestampProfile,
}

impl From<&ValidatorConfig> for BuildContext {
    fn from(config: &ValidatorConfig) -> Self {
        Self {
            timestamp_profile: config.timestamp_profile,
        }
    }
}

/// A structurally valid assertion of some registered kind.
pub trait TypedAssertion: fmt::Debug + Send + Sync + 'static {
    /// Shared attributes.
    fn base(&self) -> &AssertionBase;

    /// The instant the assertion claims, compared against key validity.
    fn timestamp(&self) -> Timestamp;

    /// Kind-specific semantic rules.
    ///
    /// Only reads from `db`. Called after a successful build.
    fn check_consistency(
        &self,
        db: &dyn TrustDatabase,
        signing_key: &AccountKey,
    ) -> Result<(), AssertionError>;

    /// Upcast backing `downcast_ref()` on `dyn TypedAssertion`.
    fn as_any(&self) -> &dyn Any;

    /// The assertion kind.
    fn kind(&self) -> &KindId {
        self.base().kind()
    }

    /// The verified signer.
    fn signer(&self) -> &SignerId {
        self.base().signer()
    }

    /// A raw header value.
    fn header(&self, name: &str) -> Option<&str> {
        self.base().header(name)
    }
}

impl dyn TypedAssertion {
    /// Borrow as the concrete kind, if it is one.
    pub fn downcast_ref<T: TypedAssertion>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Whether this is the concrete kind `T`.
    pub fn is<T: TypedAssertion>(&self) -> bool {
        self.as_any().is::<T>()
    }
}
