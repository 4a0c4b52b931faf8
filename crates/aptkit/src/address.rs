//! Account addresses.

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Sha3_256};
use std::fmt;
use std::str::FromStr;

use crate::error::{AptosError, Result};

/// Scheme byte appended to the public key for single-key ed25519 accounts.
const ED25519_SCHEME: u8 = 0x00;

/// Aptos account address (32 bytes, displayed as 0x + 64 hex chars).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountAddress([u8; 32]);

impl AccountAddress {
    /// The framework address `0x1`.
    pub const ONE: Self = Self({
        let mut b = [0u8; 32];
        b[31] = 1;
        b
    });

    /// Creates an address from bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the address bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parses an address from hex, with or without `0x`.
    ///
    /// Short forms such as `0x1` are left-padded with zeros.
    pub fn from_hex(input: &str) -> Result<Self> {
        let digits = input.strip_prefix("0x").unwrap_or(input);
        if digits.is_empty() {
            return Err(AptosError::InvalidAddress {
                address: input.to_string(),
                reason: "empty address".to_string(),
            });
        }
        if digits.len() > 64 {
            return Err(AptosError::InvalidAddress {
                address: input.to_string(),
                reason: "address must be at most 64 hex characters".to_string(),
            });
        }

        let padded = format!("{:0>64}", digits);
        let bytes = hex::decode(&padded).map_err(|e| AptosError::InvalidAddress {
            address: input.to_string(),
            reason: e.to_string(),
        })?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Returns the address as lowercase hex with 0x prefix
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Returns the short form address (without leading zeros)
    pub fn to_short_hex(&self) -> String {
        let hex = hex::encode(self.0);
        let trimmed = hex.trim_start_matches('0');
        if trimmed.is_empty() {
            "0x0".to_string()
        } else {
            format!("0x{}", trimmed)
        }
    }

    /// Derives the address of a single-key ed25519 account:
    /// `SHA3-256(pubkey || 0x00)`.
    pub fn from_ed25519_pubkey(pubkey: &VerifyingKey) -> Self {
        let mut hasher = Sha3_256::new();
        hasher.update(pubkey.as_bytes());
        hasher.update([ED25519_SCHEME]);
        let hash = hasher.finalize();

        let mut addr = [0u8; 32];
        addr.copy_from_slice(&hash[..32]);
        Self(addr)
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for AccountAddress {
    type Err = AptosError;
    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for AccountAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for AccountAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
