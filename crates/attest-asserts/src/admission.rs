//! # Admission Pipeline
//!
//! Runs both validation stages in order and only then hands the assertion
//! back:
//!
//! ```text
//! Received ──build──▶ StructurallyValid ──consistency──▶ Admitted
//!     │                       │
//!     └───────────────────────┴──────────▶ Rejected (AssertionError)
//! ```
//!
//! [`Admitted`] has no public constructor, so holding one proves both stages
//! passed. Both terminal states are final; retry policy belongs to the
//! caller. Validations of unrelated envelopes are independent and may run
//! concurrently against the same [`Validator`].

use std::ops::Deref;

use crate::assertion::TypedAssertion;
use crate::consistency::{check_consistency, AccountKey, TrustDatabase};
use crate::envelope::Envelope;
use crate::error::AssertionError;
use crate::registry::{self, Registry};

/// An assertion that passed structural build and consistency checks.
#[derive(Debug)]
pub struct Admitted {
    assertion: Box<dyn TypedAssertion>,
    signing_key: AccountKey,
}

impl Admitted {
    /// The admitted assertion.
    pub fn assertion(&self) -> &(dyn TypedAssertion + 'static) {
        self.assertion.as_ref()
    }

    /// The key the assertion was checked against.
    pub fn signing_key(&self) -> &AccountKey {
        &self.signing_key
    }

    /// Borrow as the concrete kind, if it is one.
    pub fn downcast_ref<T: TypedAssertion>(&self) -> Option<&T> {
        self.assertion.downcast_ref::<T>()
    }

    /// Release the assertion, e.g. for indexing by the trust database.
    pub fn into_inner(self) -> Box<dyn TypedAssertion> {
        self.assertion
    }
}

impl Deref for Admitted {
    type Target = dyn TypedAssertion;

    fn deref(&self) -> &Self::Target {
        self.assertion.as_ref()
    }
}

/// Drives envelopes through registry dispatch and consistency checks.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'r> {
    registry: &'r Registry,
}

impl Validator<'static> {
    /// A validator over the process-wide registry.
    pub fn global() -> Self {
        Self::new(registry::global())
    }
}

impl<'r> Validator<'r> {
    /// A validator over `registry`.
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// The registry used for dispatch.
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Validate `envelope`, resolving its signing key from `db`.
    ///
    /// The key is looked up by the envelope's signer and the key id in its
    /// signature provenance.
    ///
    /// # Errors
    ///
    /// Any structural error from [`Registry::build()`],
    /// [`AssertionError::UnknownSigningKey`] if `db` holds no matching key,
    /// or a consistency error from the kind's rules.
    pub fn admit(
        &self,
        envelope: &Envelope,
        db: &dyn TrustDatabase,
    ) -> Result<Admitted, AssertionError> {
        // Structural errors take precedence over key resolution.
        let assertion = self.registry.build(envelope)?;

        let key_id = &envelope.provenance().key_id;
        let Some(signing_key) = db.account_key(envelope.signer(), key_id) else {
            tracing::warn!(
                kind = %envelope.kind(),
                signer = %envelope.signer(),
                key_id = %key_id,
                "assertion rejected: signing key not found"
            );
            return Err(AssertionError::UnknownSigningKey {
                signer: envelope.signer().clone(),
                key_id: key_id.clone(),
            });
        };
        self.admit_built(assertion, db, signing_key)
    }

    /// Run the consistency stage on an already built assertion.
    ///
    /// # Errors
    ///
    /// [`AssertionError::SigningKeyMismatch`] if `signing_key` is not recorded
    /// under the assertion's signer, or a consistency error from the kind's
    /// rules.
    pub fn admit_built(
        &self,
        assertion: Box<dyn TypedAssertion>,
        db: &dyn TrustDatabase,
        signing_key: AccountKey,
    ) -> Result<Admitted, AssertionError> {
        check_consistency(assertion.as_ref(), db, &signing_key)?;
        tracing::debug!(
            kind = %assertion.kind(),
            signer = %assertion.signer(),
            "assertion admitted"
        );
        Ok(Admitted {
            assertion,
            signing_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use attest_core::{HeaderMap, KindId, SignerId, Timestamp};

    use super::*;
    use crate::build_record::BuildRecord;
    use crate::consistency::ValidityWindow;
    use crate::envelope::SignatureProvenance;
    use crate::memory_db::MemoryTrustDb;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn envelope(headers: HeaderMap, key_id: &str) -> Envelope {
        Envelope::new(
            KindId::new("build-record").unwrap(),
            SignerId::new("builder").unwrap(),
            headers,
            Vec::new(),
            SignatureProvenance {
                key_id: key_id.into(),
                algorithm: "ed25519".into(),
            },
        )
    }

    fn headers(timestamp: &str) -> HeaderMap {
        HeaderMap::new()
            .with("subject-id", "s1")
            .with("content-digest", "d1")
            .with("grade", "stable")
            .with("size", "1024")
            .with("timestamp", timestamp)
    }

    fn db() -> MemoryTrustDb {
        [AccountKey::new(
            SignerId::new("builder").unwrap(),
            "k1",
            ValidityWindow::new(ts("2024-01-01T00:00:00Z"), Some(ts("2024-12-31T00:00:00Z"))),
        )]
        .into_iter()
        .collect()
    }

    #[test]
    fn admits_inside_window() {
        let registry = Registry::standard().unwrap();
        let admitted = Validator::new(&registry)
            .admit(&envelope(headers("2024-06-15T00:00:00Z"), "k1"), &db())
            .unwrap();
        assert_eq!(admitted.kind().as_str(), "build-record");
        assert_eq!(admitted.signing_key().key_id, "k1");
        assert_eq!(admitted.downcast_ref::<BuildRecord>().unwrap().size(), 1024);
    }

    #[test]
    fn rejects_outside_window() {
        let registry = Registry::standard().unwrap();
        let err = Validator::new(&registry)
            .admit(&envelope(headers("2025-01-01T00:00:00Z"), "k1"), &db())
            .unwrap_err();
        assert!(matches!(err, AssertionError::KeyValidityViolation { .. }));
    }

    #[test]
    fn unknown_key_is_retryable() {
        let registry = Registry::standard().unwrap();
        let err = Validator::new(&registry)
            .admit(&envelope(headers("2024-06-15T00:00:00Z"), "k2"), &db())
            .unwrap_err();
        assert_eq!(
            err,
            AssertionError::UnknownSigningKey {
                signer: SignerId::new("builder").unwrap(),
                key_id: "k2".into(),
            }
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn structural_error_wins_over_missing_key() {
        let registry = Registry::standard().unwrap();
        let mut bad = headers("2024-06-15T00:00:00Z");
        bad.remove("grade");
        let err = Validator::new(&registry)
            .admit(&envelope(bad, "k2"), &db())
            .unwrap_err();
        assert_eq!(err, AssertionError::MissingField { field: "grade".into() });
    }

    #[test]
    fn key_of_another_signer_is_rejected() {
        let registry = Registry::standard().unwrap();
        let forged = Envelope::new(
            KindId::new("build-record").unwrap(),
            SignerId::new("mallory").unwrap(),
            headers("2024-06-15T00:00:00Z"),
            Vec::new(),
            SignatureProvenance {
                key_id: "k1".into(),
                algorithm: "ed25519".into(),
            },
        );
        let built = registry.build(&forged).unwrap();
        let builder_key = db().account_key(&SignerId::new("builder").unwrap(), "k1").unwrap();

        let err = Validator::new(&registry)
            .admit_built(built, &db(), builder_key)
            .unwrap_err();
        assert_eq!(
            err,
            AssertionError::SigningKeyMismatch {
                signer: SignerId::new("mallory").unwrap(),
                key_signer: SignerId::new("builder").unwrap(),
                key_id: "k1".into(),
            }
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn global_validator_uses_standard_kinds() {
        let admitted = Validator::global()
            .admit(&envelope(headers("2024-01-01T00:00:00Z"), "k1"), &db())
            .unwrap();
        assert!(admitted.assertion().is::<BuildRecord>());
        assert!(admitted.into_inner().downcast_ref::<BuildRecord>().is_some());
    }
}
