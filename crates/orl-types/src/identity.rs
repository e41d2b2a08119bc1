use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Material used to derive an [`OwnerId`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityMaterial {
    /// A raw 32-byte seed (e.g. an account secret hash).
    Seed([u8; 32]),
    /// An ed25519 public key (32 bytes).
    PublicKey([u8; 32]),
    /// Derived identity from a parent owner and a label.
    Derived { parent: [u8; 32], label: String },
}

/// Persistent identity of a record owner.
///
/// An `OwnerId` is derived deterministically from [`IdentityMaterial`] using
/// BLAKE3. The same material always produces the same identity. Owners are
/// opaque to the ledger: it compares them for equality and nothing else.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnerId {
    hash: [u8; 32],
}

impl OwnerId {
    /// Derive an `OwnerId` from identity material.
    pub fn derive(material: &IdentityMaterial) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"orl-owner-v1:");
        match material {
            IdentityMaterial::Seed(s) => {
                hasher.update(b"seed:");
                hasher.update(s);
            }
            IdentityMaterial::PublicKey(pk) => {
                hasher.update(b"pubkey:");
                hasher.update(pk);
            }
            IdentityMaterial::Derived { parent, label } => {
                hasher.update(b"derived:");
                hasher.update(parent);
                hasher.update(b":");
                hasher.update(label.as_bytes());
            }
        }
        Self {
            hash: *hasher.finalize().as_bytes(),
        }
    }

    /// Derive an `OwnerId` from a human-readable label.
    ///
    /// Convenience for tools and tests that address owners by name rather
    /// than by key material.
    pub fn from_label(label: &str) -> Self {
        Self::derive(&IdentityMaterial::Derived {
            parent: [0u8; 32],
            label: label.to_string(),
        })
    }

    /// Create an ephemeral (random) OwnerId for tests and demos.
    pub fn ephemeral() -> Self {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        Self::derive(&IdentityMaterial::Seed(bytes))
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.hash
    }

    /// Full hex-encoded string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// Short identifier (first 8 hex characters).
    pub fn short_id(&self) -> String {
        format!("own:{}", hex::encode(&self.hash[..4]))
    }

    /// Parse from a hex string (64 hex characters, `own:` prefix optional).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let s = s.strip_prefix("own:").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        let hash = <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| TypeError::InvalidLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        Ok(Self { hash })
    }
}

impl fmt::Debug for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OwnerId({})", self.short_id())
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_id())
    }
}
