//! Error types for aptkit.
//!
//! Every fallible operation in the crate returns [`AptosError`]. Variants are
//! grouped by where the failure originates: local decoding, key derivation,
//! the transport, or the remote node.

use thiserror::Error;

/// The error type for all aptkit operations.
#[derive(Error, Debug)]
pub enum AptosError {
    // ============ Decoding Errors ============
    /// Invalid mnemonic phrase (unknown word, bad checksum, wrong length)
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// Private key is not valid hex or not 32 bytes
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Invalid account address
    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress {
        /// The rejected input
        address: String,
        /// Reason for rejection
        reason: String,
    },

    /// Invalid fully-qualified Move type or function identifier
    #[error("Invalid Move identifier '{input}': {reason}")]
    InvalidMoveType {
        /// The rejected input
        input: String,
        /// Reason for rejection
        reason: String,
    },

    /// A node response did not match the expected schema
    #[error("Failed to decode {context}: {reason}")]
    Decode {
        /// What was being decoded
        context: String,
        /// Underlying reason
        reason: String,
    },

    /// Hex decode error
    #[error("Hex decode error: {0}")]
    Hex(String),

    // ============ Key Errors ============
    /// Entropy, seed or path derivation failed
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    /// Transaction could not be signed
    #[error("Failed to sign transaction: {0}")]
    Signing(String),

    // ============ Network Errors ============
    /// The node could not be reached
    #[error("Connection to {url} failed: {reason}")]
    Connection {
        /// Request URL
        url: String,
        /// Transport error
        reason: String,
    },

    /// Account or resource does not exist on chain
    #[error("Not found: {0}")]
    NotFound(String),

    /// Non-success response from a read endpoint
    #[error("Node API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message reported by the node
        message: String,
    },

    /// The node refused to encode or accept a transaction
    #[error("Transaction rejected (HTTP {status}): {message}")]
    RemoteRejection {
        /// HTTP status code
        status: u16,
        /// Message reported by the node
        message: String,
        /// Move VM status code, when the node reports one
        vm_error_code: Option<u64>,
    },

    // ============ Workflow Errors ============
    /// Account has no `CoinStore` for the coin type
    #[error("Account {account} is not registered for {coin_type}")]
    CoinNotRegistered {
        /// Account address
        account: String,
        /// Fully-qualified coin type
        coin_type: String,
    },

    /// Transaction could not be assembled
    #[error("Failed to build transaction: {0}")]
    TransactionBuild(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenient Result type using AptosError
pub type Result<T> = std::result::Result<T, AptosError>;

impl From<hex::FromHexError> for AptosError {
    fn from(err: hex::FromHexError) -> Self {
        AptosError::Hex(err.to_string())
    }
}

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ErrorCode {
    /// Unknown error
    Unknown = 0,
    /// Malformed local input or node response
    Decoding = 1001,
    /// Key derivation error
    KeyDerivation = 2001,
    /// Signing error
    Signing = 2002,
    /// Connection error
    Connection = 3001,
    /// Account or resource absent
    NotFound = 3002,
    /// Node API error
    Api = 3003,
    /// Transaction rejected by the node
    RemoteRejection = 4001,
    /// Coin not registered
    CoinNotRegistered = 4002,
    /// Transaction build error
    TransactionBuild = 4003,
    /// Configuration error
    Config = 9001,
}

impl AptosError {
    /// Returns the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AptosError::InvalidMnemonic(_)
            | AptosError::InvalidPrivateKey(_)
            | AptosError::InvalidAddress { .. }
            | AptosError::InvalidMoveType { .. }
            | AptosError::Decode { .. }
            | AptosError::Hex(_) => ErrorCode::Decoding,
            AptosError::KeyDerivation(_) => ErrorCode::KeyDerivation,
            AptosError::Signing(_) => ErrorCode::Signing,
            AptosError::Connection { .. } => ErrorCode::Connection,
            AptosError::NotFound(_) => ErrorCode::NotFound,
            AptosError::Api { .. } => ErrorCode::Api,
            AptosError::RemoteRejection { .. } => ErrorCode::RemoteRejection,
            AptosError::CoinNotRegistered { .. } => ErrorCode::CoinNotRegistered,
            AptosError::TransactionBuild(_) => ErrorCode::TransactionBuild,
            AptosError::Config(_) => ErrorCode::Config,
        }
    }

    /// Returns true if repeating the same read could succeed.
    ///
    /// Rejections are never retryable: resubmitting a refused transaction
    /// gives the same answer.
    pub fn is_retryable(&self) -> bool {
        match self {
            AptosError::Connection { .. } => true,
            AptosError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Shorthand for a [`AptosError::Decode`] error
    pub fn decode(context: impl Into<String>, reason: impl ToString) -> Self {
        AptosError::Decode {
            context: context.into(),
            reason: reason.to_string(),
        }
    }
}
