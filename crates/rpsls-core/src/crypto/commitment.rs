//! Commitment and Salt for the commit-reveal scheme.

use crate::games::Move;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Secret salt mixed into a commitment.
///
/// The salt must stay with the committing player until reveal; losing it
/// forfeits the ability to reveal.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salt(#[serde(with = "hex32")] [u8; 32]);

impl Salt {
    /// Create a new random salt
    pub fn random() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Small numeric salts are encoded as a big-endian 256-bit integer.
impl From<u64> for Salt {
    fn from(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salt({}..)", hex::encode(&self.0[..4]))
    }
}

/// Commitment = SHA256(move_index || salt)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commitment(#[serde(with = "hex32")] [u8; 32]);

impl Commitment {
    /// Commit to a move under the given salt
    pub fn new(mv: Move, salt: &Salt) -> Self {
        Self::digest(mv.index(), salt)
    }

    fn digest(move_index: u8, salt: &Salt) -> Self {
        let mut hasher = Sha256::new();
        hasher.update([move_index]);
        hasher.update(salt.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Verify that the given move and salt produce exactly this commitment
    pub fn verify(&self, mv: Move, salt: &Salt) -> bool {
        *self == Self::new(mv, salt)
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

mod hex32 {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], s: S) -> Result<S::Ok, S::Error> {
        hex::encode(bytes).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 32], D::Error> {
        let raw = String::deserialize(d)?;
        let digits = raw.strip_prefix("0x").unwrap_or(&raw);
        let bytes = hex::decode(digits).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 32 bytes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commitment_verification() {
        let salt = Salt::random();
        let commitment = Commitment::new(Move::Rock, &salt);

        assert!(commitment.verify(Move::Rock, &salt));
    }

    #[test]
    fn test_verify_holds_for_every_move() {
        for mv in Move::ALL {
            let salt = Salt::random();
            assert!(Commitment::new(mv, &salt).verify(mv, &salt));
        }
    }

    #[test]
    fn test_commitment_is_deterministic() {
        let salt = Salt::from(42);
        assert_eq!(
            Commitment::new(Move::Spock, &salt),
            Commitment::new(Move::Spock, &salt)
        );
    }

    #[test]
    fn test_wrong_move_fails_verification() {
        let salt = Salt::random();
        let commitment = Commitment::new(Move::Rock, &salt);

        for mv in Move::ALL.into_iter().filter(|m| *m != Move::Rock) {
            assert!(!commitment.verify(mv, &salt));
        }
    }

    #[test]
    fn test_wrong_salt_fails_verification() {
        let commitment = Commitment::new(Move::Paper, &Salt::from(7));

        assert!(!commitment.verify(Move::Paper, &Salt::from(8)));
        assert!(!commitment.verify(Move::Paper, &Salt::random()));
    }

    #[test]
    fn test_altered_digest_fails_verification() {
        let salt = Salt::from(1);
        let mut bytes = *Commitment::new(Move::Lizard, &salt).as_bytes();
        bytes[31] ^= 0x01;

        assert!(!Commitment::from_bytes(bytes).verify(Move::Lizard, &salt));
    }

    #[test]
    fn test_numeric_salt_is_big_endian() {
        let salt = Salt::from(42);
        assert_eq!(salt.as_bytes()[31], 42);
        assert!(salt.as_bytes()[..31].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_commitment_hex_serialization() {
        let commitment = Commitment::new(Move::Scissors, &Salt::from(3));
        let json = serde_json::to_string(&commitment).unwrap();

        assert_eq!(json, format!("\"{}\"", commitment));

        let prefixed = format!("\"0x{}\"", commitment);
        let parsed: Commitment = serde_json::from_str(&prefixed).unwrap();
        assert_eq!(parsed, commitment);
    }

    #[test]
    fn test_salt_rejects_short_hex() {
        let result: Result<Salt, _> = serde_json::from_str("\"abcd\"");
        assert!(result.is_err());
    }
}
