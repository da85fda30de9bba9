//! # Assertion Envelope
//!
//! The generic, already-signature-verified form of an assertion as delivered
//! by the signing/transport layer: a kind discriminator, the signer, the raw
//! headers, the raw body, and the provenance of the verified signature.
//!
//! The core trusts the signer identity and the raw headers it receives, but
//! not their semantic content. An envelope is immutable once constructed.

use attest_core::{HeaderMap, KindId, SignerId};
use serde::{Deserialize, Serialize};

/// Provenance of the signature the signing layer already verified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignatureProvenance {
    /// Identifier of the account key that produced the signature.
    pub key_id: String,
    /// Signature algorithm (e.g. `ed25519`).
    pub algorithm: String,
}

/// An untyped assertion as received from the signing layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    kind: KindId,
    signer: SignerId,
    headers: HeaderMap,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    body: Vec<u8>,
    provenance: SignatureProvenance,
}

impl Envelope {
    /// Assemble an envelope from its verified parts.
    pub fn new(
        kind: KindId,
        signer: SignerId,
        headers: HeaderMap,
        body: Vec<u8>,
        provenance: SignatureProvenance,
    ) -> Self {
        Self {
            kind,
            signer,
            headers,
            body,
            provenance,
        }
    }

    /// The kind discriminator used for registry dispatch.
    pub fn kind(&self) -> &KindId {
        &self.kind
    }

    /// The verified signer.
    pub fn signer(&self) -> &SignerId {
        &self.signer
    }

    /// The raw headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The raw body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Provenance of the verified signature.
    pub fn provenance(&self) -> &SignatureProvenance {
        &self.provenance
    }
}
