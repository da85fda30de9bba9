//! # Consistency Protocol
//!
//! Semantic checks that cannot be decided from headers alone. They run only
//! after a successful structural build and consult external trust state: the
//! signing key record resolved for the assertion's signer and a read-only
//! handle to the trust database.
//!
//! ## Rules Applied to Every Kind
//!
//! The signing key must be recorded under the assertion's own signer;
//! otherwise [`check_consistency()`] fails with
//! [`AssertionError::SigningKeyMismatch`] before any kind rule runs.
//!
//! ## Rule Shared by the Built-in Kinds
//!
//! The assertion's timestamp must fall inside the signing key's validity
//! window: inclusive `since`, and either open-ended or inclusive `until`.
//! Violations fail with [`AssertionError::KeyValidityViolation`].
//!
//! Kinds may add further rules in their `check_consistency()`. Checkers never
//! mutate the trust database.

use attest_core::{KindId, SignerId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::assertion::TypedAssertion;
use crate::error::AssertionError;

/// The interval during which a signing key is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidityWindow {
    since: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    until: Option<Timestamp>,
}

impl ValidityWindow {
    /// A window starting at `since`, ending at `until` if given.
    pub fn new(since: Timestamp, until: Option<Timestamp>) -> Self {
        Self { since, until }
    }

    /// A window with no end.
    pub fn open_ended(since: Timestamp) -> Self {
        Self { since, until: None }
    }

    /// Inclusive start.
    pub fn since(&self) -> Timestamp {
        self.since
    }

    /// Inclusive end, if any.
    pub fn until(&self) -> Option<Timestamp> {
        self.until
    }

    /// Whether `at` lies in `[since, until]` (or `[since, ∞)`).
    pub fn contains(&self, at: &Timestamp) -> bool {
        if *at < self.since {
            return false;
        }
        match self.until {
            Some(until) => *at <= until,
            None => true,
        }
    }
}

impl std::fmt::Display for ValidityWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.until {
            Some(until) => write!(f, "[{}, {}]", self.since, until),
            None => write!(f, "[{}, open)", self.since),
        }
    }
}

/// A signer's account key as recorded in the trust database.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountKey {
    /// Account the key belongs to.
    pub signer: SignerId,
    /// Key identifier referenced by signature provenance.
    pub key_id: String,
    /// When the key may be used.
    pub validity: ValidityWindow,
}

impl AccountKey {
    /// Create a key record.
    pub fn new(signer: SignerId, key_id: impl Into<String>, validity: ValidityWindow) -> Self {
        Self {
            signer,
            key_id: key_id.into(),
            validity,
        }
    }

    /// Whether the key was valid at `at`.
    pub fn is_valid_at(&self, at: &Timestamp) -> bool {
        self.validity.contains(at)
    }
}

/// Read-only view of the trust database consumed by the validation core.
///
/// Implementations must be safe to query concurrently and may be backed by a
/// store that is updated while queries run.
pub trait TrustDatabase: Send + Sync {
    /// Resolve a signer's account key by identifier.
    fn account_key(&self, signer: &SignerId, key_id: &str) -> Option<AccountKey>;

    /// Whether any key of `signer` is valid at `at`.
    fn key_valid_at(&self, signer: &SignerId, at: &Timestamp) -> bool;
}

/// Run the kind-specific consistency rules for a built assertion.
///
/// This is the second of the two calls a caller makes, after
/// `Registry::build()`.
pub fn check_consistency(
    assertion: &dyn TypedAssertion,
    db: &dyn TrustDatabase,
    signing_key: &AccountKey,
) -> Result<(), AssertionError> {
    let result = require_own_key(assertion.signer(), signing_key)
        .and_then(|()| assertion.check_consistency(db, signing_key));
    match &result {
        Ok(()) => tracing::debug!(
            kind = %assertion.kind(),
            signer = %assertion.signer(),
            key_id = %signing_key.key_id,
            "assertion consistent"
        ),
        Err(err) => tracing::warn!(
            kind = %assertion.kind(),
            signer = %assertion.signer(),
            key_id = %signing_key.key_id,
            error = %err,
            "assertion rejected by consistency check"
        ),
    }
    result
}

fn require_own_key(signer: &SignerId, signing_key: &AccountKey) -> Result<(), AssertionError> {
    if signing_key.signer == *signer {
        return Ok(());
    }
    Err(AssertionError::SigningKeyMismatch {
        signer: signer.clone(),
        key_signer: signing_key.signer.clone(),
        key_id: signing_key.key_id.clone(),
    })
}

/// Fail unless `timestamp` lies in the signing key's validity window.
pub fn require_within_key_validity(
    kind: &KindId,
    timestamp: Timestamp,
    signing_key: &AccountKey,
) -> Result<(), AssertionError> {
    if signing_key.is_valid_at(&timestamp) {
        return Ok(());
    }
    Err(AssertionError::KeyValidityViolation {
        kind: kind.clone(),
        timestamp,
        window: signing_key.validity,
    })
}
