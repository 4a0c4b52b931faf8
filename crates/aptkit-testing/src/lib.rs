//! # aptkit Testing Infrastructure
//!
//! Shared test utilities for aptkit:
//! - [`MockLedgerClient`], a scripted ledger that records every call
//! - Edge case keys, mnemonics and coin types
//! - Property-based testing strategies
//!
//! ## Usage
//!
//! ```rust,ignore
//! use aptkit_testing::*;
//!
//! let mock = MockLedgerClient::new().with_sequence_number(5);
//! let workflows = aptkit::Workflows::new(&mock);
//!
//! proptest! {
//!     #[test]
//!     fn test_import_roundtrip(key in private_key_bytes()) {
//!         // ...
//!     }
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod mock;

pub use mock::{Call, MockLedgerClient, Op};

use aptkit::{AccountAddress, MoveType};
use proptest::prelude::*;

// ============================================================================
// Edge Case Key Material
// ============================================================================

/// Edge case ed25519 secret keys. Every 32-byte string is a valid secret.
pub struct EdgeCaseKeys;

impl EdgeCaseKeys {
    /// All zeros
    pub const ALL_ZEROS: [u8; 32] = [0u8; 32];

    /// All ones
    pub const ALL_ONES: [u8; 32] = [0xFF; 32];

    /// Lowest byte set
    pub const MIN: [u8; 32] = {
        let mut k = [0u8; 32];
        k[31] = 1;
        k
    };

    /// Alternating bits
    pub const ALTERNATING: [u8; 32] = [0xAA; 32];

    /// Ed25519 group order (L), little endian
    pub const ED25519_ORDER: [u8; 32] = [
        0xED, 0xD3, 0xF5, 0x5C, 0x1A, 0x63, 0x12, 0x58,
        0xD6, 0x9C, 0xF7, 0xA2, 0xDE, 0xF9, 0xDE, 0x14,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10,
    ];

    /// Returns every edge case key
    pub fn all() -> Vec<[u8; 32]> {
        vec![
            Self::ALL_ZEROS,
            Self::ALL_ONES,
            Self::MIN,
            Self::ALTERNATING,
            Self::ED25519_ORDER,
        ]
    }

    /// Private key strings that must be rejected on import
    pub fn malformed_hex() -> Vec<String> {
        vec![
            String::new(),
            "0x".to_string(),
            "0xzz".to_string(),
            "abc".to_string(),
            hex::encode([1u8; 31]),
            hex::encode([1u8; 33]),
            format!("0x{}", "g".repeat(64)),
        ]
    }
}

// ============================================================================
// Edge Case Mnemonics
// ============================================================================

/// Edge case mnemonic phrases
pub struct EdgeCaseMnemonics;

impl EdgeCaseMnemonics {
    /// Standard 12-word test mnemonic
    pub const STANDARD_12: &'static str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    /// Standard 24-word test mnemonic
    pub const STANDARD_24: &'static str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon art";

    /// `STANDARD_12` in mixed case
    pub const MIXED_CASE: &'static str =
        "ABANDON abandon ABANDON abandon ABANDON abandon ABANDON abandon ABANDON abandon ABANDON about";

    /// `STANDARD_12` with extra whitespace
    pub const EXTRA_WHITESPACE: &'static str =
        "  abandon   abandon  abandon abandon abandon abandon abandon abandon abandon abandon abandon   about  ";

    /// Returns valid mnemonics
    pub fn valid() -> Vec<&'static str> {
        vec![Self::STANDARD_12, Self::STANDARD_24]
    }

    /// Spellings of `STANDARD_12` that normalize to it
    pub fn equivalent_to_standard_12() -> Vec<&'static str> {
        vec![Self::MIXED_CASE, Self::EXTRA_WHITESPACE]
    }

    /// Returns malformed mnemonics
    pub fn invalid() -> Vec<&'static str> {
        vec![
            "",
            "abandon",
            "abandon abandon abandon",
            "invalid words here",
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon",
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon wrong",
        ]
    }
}

// ============================================================================
// Edge Case Coin Types
// ============================================================================

/// Coin and resource type strings
pub struct EdgeCaseCoinTypes;

impl EdgeCaseCoinTypes {
    /// Native coin
    pub const APTOS_COIN: &'static str = "0x1::aptos_coin::AptosCoin";

    /// A coin published by a user account
    pub const MOON_COIN: &'static str =
        "0x39edef225b4d840416209012f7553d216f9ad62eed04f428059a1e1215df4d2f::moon_coin::MoonCoin";

    /// The publisher of [`Self::MOON_COIN`]
    pub fn moon_publisher() -> AccountAddress {
        Self::moon_coin().address()
    }

    /// [`Self::MOON_COIN`] parsed
    pub fn moon_coin() -> MoveType {
        Self::MOON_COIN
            .parse()
            .unwrap_or_else(|e| panic!("fixture does not parse: {e}"))
    }

    /// Well-formed types, rendered back unchanged
    pub fn valid() -> Vec<&'static str> {
        vec![
            Self::APTOS_COIN,
            Self::MOON_COIN,
            "0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin>",
            "0x1::coin::CoinInfo<0x1::aptos_coin::AptosCoin>",
            "0xcafe::lp::LP<0x1::aptos_coin::AptosCoin, 0xcafe::usdc::USDC>",
            "0xcafe::vault::Vault<vector<u8>>",
        ]
    }

    /// Malformed types
    pub fn invalid() -> Vec<&'static str> {
        vec![
            "",
            "AptosCoin",
            "0x1::aptos_coin",
            "1::aptos_coin::AptosCoin",
            "0xzz::coin::Coin",
            "0x1::1coin::Coin",
            "0x1::coin::Coin<",
            "0x1::coin::Coin<>",
            "0x1::coin::Coin<u64>>",
            "0x1::coin::Coin::Extra",
        ]
    }
}

// ============================================================================
// Property-Based Testing Strategies
// ============================================================================

/// Arbitrary 32-byte ed25519 secret keys
pub fn private_key_bytes() -> impl Strategy<Value = [u8; 32]> {
    prop::array::uniform32(any::<u8>())
}

/// Hex private keys, with or without `0x`
pub fn private_key_hex() -> impl Strategy<Value = String> {
    (private_key_bytes(), any::<bool>()).prop_map(|(bytes, prefixed)| {
        if prefixed {
            format!("0x{}", hex::encode(bytes))
        } else {
            hex::encode(bytes)
        }
    })
}

/// 128-bit mnemonic entropy
pub fn entropy_128() -> impl Strategy<Value = [u8; 16]> {
    prop::array::uniform16(any::<u8>())
}

/// Arbitrary messages to sign
pub fn message() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..256)
}

/// Ledger timestamps that leave room for the expiration offset
pub fn ledger_timestamp() -> impl Strategy<Value = u64> {
    0u64..=u64::MAX / 2
}

/// Account addresses
pub fn account_address() -> impl Strategy<Value = AccountAddress> {
    prop::array::uniform32(any::<u8>()).prop_map(AccountAddress::from_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aptkit::Account;

    #[test]
    fn test_edge_case_keys_import() {
        for key in EdgeCaseKeys::all() {
            let account = Account::from_private_key_bytes(&key).unwrap();
            assert_eq!(account.address().to_hex().len(), 66);
        }
    }

    #[test]
    fn test_malformed_keys_rejected() {
        for key in EdgeCaseKeys::malformed_hex() {
            assert!(Account::from_private_key_hex(&key).is_err(), "{key}");
        }
    }

    #[test]
    fn test_mnemonic_fixtures() {
        for phrase in EdgeCaseMnemonics::valid() {
            assert!(Account::from_mnemonic(phrase).is_ok());
        }
        let standard = Account::from_mnemonic(EdgeCaseMnemonics::STANDARD_12).unwrap();
        for phrase in EdgeCaseMnemonics::equivalent_to_standard_12() {
            assert_eq!(Account::from_mnemonic(phrase).unwrap().address(), standard.address());
        }
        for phrase in EdgeCaseMnemonics::invalid() {
            assert!(Account::from_mnemonic(phrase).is_err(), "{phrase}");
        }
    }

    #[test]
    fn test_coin_type_fixtures() {
        for s in EdgeCaseCoinTypes::valid() {
            assert_eq!(s.parse::<MoveType>().unwrap().to_string(), s);
        }
        for s in EdgeCaseCoinTypes::invalid() {
            assert!(s.parse::<MoveType>().is_err(), "{s}");
        }
    }

    proptest! {
        #[test]
        fn test_private_key_hex_strategy_imports(key in private_key_hex()) {
            prop_assert!(Account::from_private_key_hex(&key).is_ok());
        }
    }
}
