//! # In-Memory Trust Database
//!
//! A [`TrustDatabase`] backed by a lock-guarded map of account keys. Useful
//! for embedding and tests. Keys may be added while validations run; readers
//! take a shared lock and never observe a half-written entry. The lock does
//! not poison, so a panicking writer leaves the map usable.

use std::collections::HashMap;

use attest_core::{SignerId, Timestamp};
use parking_lot::RwLock;

use crate::consistency::{AccountKey, TrustDatabase};

/// Account keys grouped by signer.
#[derive(Debug, Default)]
pub struct MemoryTrustDb {
    keys: RwLock<HashMap<SignerId, Vec<AccountKey>>>,
}

impl MemoryTrustDb {
    /// An empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an account key. A key with the same signer and id is replaced.
    pub fn add_key(&self, key: AccountKey) {
        let mut keys = self.keys.write();
        let entries = keys.entry(key.signer.clone()).or_default();
        entries.retain(|k| k.key_id != key.key_id);
        entries.push(key);
    }

    /// Number of keys across all signers.
    pub fn len(&self) -> usize {
        let keys = self.keys.read();
        keys.values().map(Vec::len).sum()
    }

    /// Returns true if no keys are recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<AccountKey> for MemoryTrustDb {
    fn from_iter<I: IntoIterator<Item = AccountKey>>(iter: I) -> Self {
        let db = Self::new();
        for key in iter {
            db.add_key(key);
        }
        db
    }
}

impl TrustDatabase for MemoryTrustDb {
    fn account_key(&self, signer: &SignerId, key_id: &str) -> Option<AccountKey> {
        let keys = self.keys.read();
        keys.get(signer)?.iter().find(|k| k.key_id == key_id).cloned()
    }

    fn key_valid_at(&self, signer: &SignerId, at: &Timestamp) -> bool {
        let keys = self.keys.read();
        keys.get(signer)
            .is_some_and(|entries| entries.iter().any(|k| k.is_valid_at(at)))
    }
}
