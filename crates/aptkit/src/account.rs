//! Account key material.
//!
//! An [`Account`] is an ed25519 keypair plus the address derived from it.
//! Accounts come either from a BIP-39 mnemonic walked down the Aptos
//! derivation path (`m/44'/637'/account'/0'/address_index'`) or from a raw
//! 32-byte private key.

use bip39::{Language, Mnemonic, Seed};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::RngCore;
use std::fmt;

use crate::address::AccountAddress;
use crate::error::{AptosError, Result};

/// BIP-44 coin type registered for Aptos.
pub const COIN_TYPE: u32 = 637;

/// Entropy size for generated mnemonics (128 bits, 12 words).
pub const ENTROPY_BYTES: usize = 16;

const HARDENED: u32 = 0x8000_0000;

/// Returns the derivation path string for an account/address index pair.
pub fn derivation_path(account: u32, address_index: u32) -> String {
    format!("m/44'/{}'/{}'/0'/{}'", COIN_TYPE, account, address_index)
}

/// An account created from fresh entropy, together with its recovery phrase.
pub struct CreatedAccount {
    /// BIP-39 recovery phrase
    pub mnemonic: String,
    /// Derivation path the keys were taken from
    pub path: String,
    /// The derived account
    pub account: Account,
}

impl fmt::Debug for CreatedAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreatedAccount")
            .field("path", &self.path)
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

/// Aptos account: signing key, verifying key and address.
pub struct Account {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
    address: AccountAddress,
}

impl Account {
    /// Generates 128 bits of entropy and derives the first account of the
    /// resulting mnemonic.
    pub fn generate() -> Result<CreatedAccount> {
        let mut entropy = [0u8; ENTROPY_BYTES];
        rand::rngs::OsRng
            .try_fill_bytes(&mut entropy)
            .map_err(|e| AptosError::KeyDerivation(format!("entropy source failed: {e}")))?;
        Self::from_entropy(&entropy)
    }

    /// Derives the first account of the mnemonic encoding `entropy`.
    pub fn from_entropy(entropy: &[u8]) -> Result<CreatedAccount> {
        let mnemonic = Mnemonic::from_entropy(entropy, Language::English)
            .map_err(|e| AptosError::KeyDerivation(e.to_string()))?;
        let account = Self::from_seed(&Seed::new(&mnemonic, ""), 0, 0);

        Ok(CreatedAccount {
            mnemonic: mnemonic.phrase().to_string(),
            path: derivation_path(0, 0),
            account,
        })
    }

    /// Restores the first account (`m/44'/637'/0'/0'/0'`) of a mnemonic.
    pub fn from_mnemonic(phrase: &str) -> Result<Self> {
        Self::from_mnemonic_with_path(phrase, 0, 0)
    }

    /// Restores an account at `m/44'/637'/account'/0'/address_index'`.
    pub fn from_mnemonic_with_path(phrase: &str, account: u32, address_index: u32) -> Result<Self> {
        if account >= HARDENED || address_index >= HARDENED {
            return Err(AptosError::KeyDerivation(format!(
                "path indices must be below 2^31, got account {} and address index {}",
                account, address_index
            )));
        }
        let normalized = phrase.split_whitespace().collect::<Vec<_>>().join(" ");
        let mnemonic = Mnemonic::from_phrase(&normalized.to_lowercase(), Language::English)
            .map_err(|e| AptosError::InvalidMnemonic(e.to_string()))?;

        Ok(Self::from_seed(&Seed::new(&mnemonic, ""), account, address_index))
    }

    fn from_seed(seed: &Seed, account: u32, address_index: u32) -> Self {
        // SLIP-10 ed25519 only supports hardened children
        let indices: [u32; 5] = [
            44 | HARDENED,
            COIN_TYPE | HARDENED,
            account | HARDENED,
            HARDENED,
            address_index | HARDENED,
        ];
        let key = slip10_ed25519::derive_ed25519_private_key(seed.as_bytes(), &indices);
        Self::from_signing_key(SigningKey::from_bytes(&key))
    }

    /// Imports an account from a raw 32-byte private key.
    pub fn from_private_key_bytes(bytes: &[u8]) -> Result<Self> {
        let key: [u8; 32] = bytes.try_into().map_err(|_| {
            AptosError::InvalidPrivateKey(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self::from_signing_key(SigningKey::from_bytes(&key)))
    }

    /// Imports an account from a hex private key, with or without `0x`.
    pub fn from_private_key_hex(input: &str) -> Result<Self> {
        let digits = input.trim();
        let digits = digits.strip_prefix("0x").unwrap_or(digits);
        let bytes = hex::decode(digits).map_err(|e| AptosError::InvalidPrivateKey(e.to_string()))?;
        Self::from_private_key_bytes(&bytes)
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let verifying_key = signing_key.verifying_key();
        let address = AccountAddress::from_ed25519_pubkey(&verifying_key);
        Self {
            signing_key,
            verifying_key,
            address,
        }
    }

    /// Returns the account address
    pub fn address(&self) -> AccountAddress {
        self.address
    }

    /// Returns the authentication key.
    ///
    /// For a fresh single-key account the auth key and the address coincide.
    pub fn auth_key(&self) -> [u8; 32] {
        *AccountAddress::from_ed25519_pubkey(&self.verifying_key).as_bytes()
    }

    /// Returns the public key bytes
    pub fn public_key(&self) -> &[u8; 32] {
        self.verifying_key.as_bytes()
    }

    /// Returns the public key as 0x-prefixed hex
    pub fn public_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.verifying_key.as_bytes()))
    }

    /// Returns the private key as 0x-prefixed hex.
    /// ⚠️ Handle with care!
    pub fn private_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.signing_key.as_bytes()))
    }

    /// Signs arbitrary bytes
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message)
    }

    /// Verifies a signature made by this account
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.verifying_key.verify(message, signature).is_ok()
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address.to_hex())
            .field("public_key", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}
