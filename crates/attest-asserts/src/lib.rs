//! # attest-asserts: Typed Assertion Validation
//!
//! Turns generic, already-signature-verified assertion envelopes into typed,
//! trustworthy assertions:
//!
//! - **Field checks** (`checks.rs`): mandatory strings, width-bounded
//!   unsigned integers, and RFC 3339 timestamps. Each fails on the first bad
//!   field with a message naming it.
//!
//! - **Kinds** (`build_record.rs`, `revision_record.rs`): one builder per
//!   assertion kind, each declaring its primary key.
//!
//! - **Registry** (`registry.rs`): maps kind identifiers to builders. A new
//!   kind is added by registering it; dispatch never changes.
//!
//! - **Consistency** (`consistency.rs`): semantic rules checked against the
//!   trust database after a successful build, starting with signing-key
//!   validity.
//!
//! - **Admission** (`admission.rs`): runs both stages and resolves the
//!   signing key from the envelope's signature provenance.
//!
//! ## Usage
//!
//! ```ignore
//! let validator = Validator::global();
//! let admitted = validator.admit(&envelope, &trust_db)?;
//! if let Some(build) = admitted.downcast_ref::<BuildRecord>() {
//!     index(build.subject_id(), build.content_digest());
//! }
//! ```
//!
//! ## Crate Policy
//!
//! - Depends on `attest-core` internally.
//! - Signature verification and wire decoding happen upstream; envelopes
//!   arrive with a trusted signer.
//! - Validation never mutates the trust database.

pub mod admission;
pub mod assertion;
pub mod build_record;
pub mod checks;
pub mod config;
pub mod consistency;
pub mod envelope;
pub mod error;
pub mod memory_db;
pub mod registry;
pub mod revision_record;

pub use admission::{Admitted, Validator};
pub use assertion::{AssertionBase, BuildContext, TypedAssertion};
pub use build_record::BuildRecord;
pub use checks::BitWidth;
pub use config::{ConfigError, TimestampProfile, ValidatorConfig};
pub use consistency::{check_consistency, AccountKey, TrustDatabase, ValidityWindow};
pub use envelope::{Envelope, SignatureProvenance};
pub use error::{AssertionError, RegistryError, Stage};
pub use memory_db::MemoryTrustDb;
pub use registry::{Registry, RegistryBuilder};
pub use revision_record::RevisionRecord;
