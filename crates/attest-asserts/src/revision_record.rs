//! # Revision Record
//!
//! A `revision-record` asserts that a built artifact was released as a
//! numbered revision of its subject by a store authority.
//!
//! | Header            | Type    | Check      |
//! |-------------------|---------|------------|
//! | `subject-id`      | string  | mandatory  |
//! | `content-digest`  | string  | mandatory  |
//! | `sequence`        | uint64  | integer    |
//! | `build-reference` | string  | mandatory  |
//! | `developer-id`    | string  | mandatory  |
//! | `timestamp`       | instant | RFC 3339   |
//!
//! Primary key: (`subject-id`, `content-digest`).
//!
//! ## Known Limitations
//!
//! Consistency only enforces the signing-key window. Cross-assertion rules
//! are deferred: the referenced build record is not looked up, its digest is
//! not compared, and the developer's account key is not required to exist.

use std::any::Any;

use attest_core::Timestamp;

use crate::assertion::{AssertionBase, BuildContext, TypedAssertion};
use crate::checks::{check_mandatory, check_timestamp, check_uint, BitWidth};
use crate::consistency::{require_within_key_validity, AccountKey, TrustDatabase};
use crate::error::{AssertionError, RegistryError};
use crate::registry::RegistryBuilder;

/// Kind identifier.
pub const KIND: &str = "revision-record";

/// Header fields identifying a revision record within its kind.
pub const PRIMARY_KEY: &[&str] = &["subject-id", "content-digest"];

/// A structurally valid `revision-record` assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionRecord {
    base: AssertionBase,
    sequence: u64,
    timestamp: Timestamp,
}

impl RevisionRecord {
    /// The subject this revision belongs to.
    pub fn subject_id(&self) -> &str {
        self.base.mandatory("subject-id")
    }

    /// The digest of the released artifact.
    pub fn content_digest(&self) -> &str {
        self.base.mandatory("content-digest")
    }

    /// The revision sequence number.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Digest of the associated build record.
    pub fn build_reference(&self) -> &str {
        self.base.mandatory("build-reference")
    }

    /// The developer's account identifier.
    pub fn developer_id(&self) -> &str {
        self.base.mandatory("developer-id")
    }

    /// When the revision was made.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

impl TypedAssertion for RevisionRecord {
    fn base(&self) -> &AssertionBase {
        &self.base
    }

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    fn check_consistency(
        &self,
        _db: &dyn TrustDatabase,
        signing_key: &AccountKey,
    ) -> Result<(), AssertionError> {
        // TODO: look up the build record named by build-reference and compare its digest.
        // TODO: require an account key for developer-id.
        require_within_key_validity(self.base.kind(), self.timestamp, signing_key)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Build a [`RevisionRecord`] from its generic attributes.
pub fn build(
    base: AssertionBase,
    ctx: &BuildContext,
) -> Result<Box<dyn TypedAssertion>, AssertionError> {
    base.expect_kind(KIND)?;
    let headers = base.headers();

    check_mandatory(headers, "subject-id")?;
    check_mandatory(headers, "content-digest")?;
    let sequence = check_uint(headers, "sequence", BitWidth::U64)?;
    check_mandatory(headers, "build-reference")?;
    check_mandatory(headers, "developer-id")?;
    let timestamp = check_timestamp(headers, "timestamp", ctx.timestamp_profile)?;

    Ok(Box::new(RevisionRecord {
        base,
        sequence,
        timestamp,
    }))
}

/// Register the `revision-record` kind.
pub fn register(registry: &mut RegistryBuilder) -> Result<(), RegistryError> {
    registry.register(KIND, build, PRIMARY_KEY)
}
