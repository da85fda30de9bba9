//! # Build Record
//!
//! A `build-record` asserts the properties of a built artifact: which
//! subject it belongs to, its content digest and size, its grade, and when
//! it was built.
//!
//! | Header           | Type    | Check      |
//! |------------------|---------|------------|
//! | `subject-id`     | string  | mandatory  |
//! | `content-digest` | string  | mandatory  |
//! | `grade`          | string  | mandatory  |
//! | `size`           | uint64  | integer    |
//! | `timestamp`      | instant | RFC 3339   |
//!
//! Primary key: (`subject-id`, `content-digest`).

use std::any::Any;

use attest_core::Timestamp;

use crate::assertion::{AssertionBase, BuildContext, TypedAssertion};
use crate::checks::{check_mandatory, check_timestamp, check_uint, BitWidth};
use crate::consistency::{require_within_key_validity, AccountKey, TrustDatabase};
use crate::error::{AssertionError, RegistryError};
use crate::registry::RegistryBuilder;

/// Kind identifier.
pub const KIND: &str = "build-record";

/// Header fields identifying a build record within its kind.
pub const PRIMARY_KEY: &[&str] = &["subject-id", "content-digest"];

/// A structurally valid `build-record` assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRecord {
    base: AssertionBase,
    size: u64,
    timestamp: Timestamp,
}

impl BuildRecord {
    /// The subject the artifact was built for.
    pub fn subject_id(&self) -> &str {
        self.base.mandatory("subject-id")
    }

    /// The digest of the built artifact.
    pub fn content_digest(&self) -> &str {
        self.base.mandatory("content-digest")
    }

    /// The artifact size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The artifact grade (e.g. `devel`, `stable`).
    pub fn grade(&self) -> &str {
        self.base.mandatory("grade")
    }

    /// When the artifact was built.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

impl TypedAssertion for BuildRecord {
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
        require_within_key_validity(self.base.kind(), self.timestamp, signing_key)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Build a [`BuildRecord`] from its generic attributes.
///
/// Extra headers and a non-empty body are kept but otherwise ignored, so
/// documents from newer protocol versions still validate.
pub fn build(
    base: AssertionBase,
    ctx: &BuildContext,
) -> Result<Box<dyn TypedAssertion>, AssertionError> {
    base.expect_kind(KIND)?;
    let headers = base.headers();

    check_mandatory(headers, "subject-id")?;
    check_mandatory(headers, "content-digest")?;
    check_mandatory(headers, "grade")?;
    let size = check_uint(headers, "size", BitWidth::U64)?;
    let timestamp = check_timestamp(headers, "timestamp", ctx.timestamp_profile)?;

    Ok(Box::new(BuildRecord {
        base,
        size,
        timestamp,
    }))
}

/// Register the `build-record` kind.
pub fn register(registry: &mut RegistryBuilder) -> Result<(), RegistryError> {
    registry.register(KIND, build, PRIMARY_KEY)
}
