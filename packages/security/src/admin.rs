// ABOUTME: Administrator credential verification
// ABOUTME: Constant-time comparison of a presented admin token against the configured secret

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Configured administrator secret, held only as a SHA-256 digest
#[derive(Clone)]
pub struct AdminSecret {
    digest: [u8; 32],
}

impl AdminSecret {
    pub fn new(secret: &str) -> Self {
        Self {
            digest: Self::hash(secret),
        }
    }

    /// Compare digests in constant time so response timing reveals nothing about the secret
    pub fn verify(&self, presented: &str) -> bool {
        let presented = Self::hash(presented);
        presented.as_slice().ct_eq(self.digest.as_slice()).into()
    }

    fn hash(value: &str) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(value.as_bytes());
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&hasher.finalize());
        digest
    }
}

impl std::fmt::Debug for AdminSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AdminSecret(..)")
    }
}
