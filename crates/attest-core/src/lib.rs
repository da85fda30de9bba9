//! # attest-core: Foundational Types for Assertion Validation
//!
//! This crate is the leaf of the workspace. It defines the primitives every
//! assertion kind is built from: the raw [`HeaderMap`] handed over by the
//! signing layer, the identifiers that name signers and assertion kinds, and
//! the timezone-aware [`Timestamp`] that consistency checks compare against
//! signing-key validity windows.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `SignerId` and `KindId` are
//!    distinct types with validated constructors. A signer identity can never
//!    be passed where a kind discriminator is expected.
//!
//! 2. **Headers stay strings.** The `HeaderMap` is the untyped body of a
//!    document. Typing happens exactly once, in `attest-asserts`, and the map
//!    is retained afterwards for forward-compatible header access.
//!
//! 3. **Timestamps keep their offset.** `Timestamp` wraps an RFC 3339 instant
//!    together with the offset it was written in. Ordering and equality are
//!    by instant.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `attest-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod header;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use error::CoreError;
pub use header::HeaderMap;
pub use identity::{KindId, SignerId};
pub use temporal::Timestamp;
