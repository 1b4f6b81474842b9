//! Password-derived seed.

use std::fmt::{Display, Formatter};

use sha2::{Digest, Sha256};

/// SHA-256 digest of a password.
///
/// The raw digest keys position selection. [`Display`] renders the
/// canonical 64 character lowercase hex form.
#[derive(Clone, PartialEq, Eq)]
pub struct Seed([u8; 32]);

impl Seed {
    pub const LEN: usize = 32;

    /// Hashes the UTF-8 bytes of `password`.
    pub fn from_password(password: &str) -> Self {
        Self(Sha256::digest(password.as_bytes()).into())
    }

    pub fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Display for Seed {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// The digest stands in for the password; keep it out of debug logs.
impl std::fmt::Debug for Seed {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Seed(..)")
    }
}

#[test]
fn password_digest() {
    let seed = Seed::from_password("tests");
    let hex = seed.to_string();

    assert_eq!(
        hex,
        "59830ebc3a4184110566bf1a290d08473dfdcbd492ce498b14cd1a5e2fa2e441"
    );
    assert_eq!(hex.len(), 64);
    assert_eq!(seed.as_bytes()[0], 0x59);
    assert_eq!(format!("{seed:?}"), "Seed(..)");
}
