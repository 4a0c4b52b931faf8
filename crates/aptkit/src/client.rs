//! The ledger client contract.
//!
//! [`LedgerClient`] is everything the workflows need from a node. The
//! production implementation is [`RestClient`](crate::rest::RestClient);
//! tests substitute an in-memory mock.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::address::AccountAddress;
use crate::error::Result;
use crate::move_types::MoveType;
use crate::transaction::{SignedTransaction, SubmissionResult, UnsignedTransaction};

/// On-chain account state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountData {
    /// Next sequence number the account will use
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub sequence_number: u64,
    /// Authentication key (0x-prefixed hex)
    pub authentication_key: String,
}

/// A Move resource stored under an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountResource {
    /// Fully-qualified resource type
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Decoded resource fields
    pub data: serde_json::Value,
}

/// Ledger metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerInfo {
    /// Chain identifier
    pub chain_id: u8,
    /// Latest committed ledger version
    pub ledger_version: u64,
    /// Timestamp of the latest ledger version, in seconds
    pub ledger_timestamp: u64,
}

/// Connection to a ledger node.
///
/// Every method is one remote call. Implementations decide whether reads
/// are retried; `signing_message` and `submit_transaction` must not be.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Looks up an account's sequence number and auth key.
    async fn account(&self, address: &AccountAddress) -> Result<AccountData>;

    /// Fetches one resource. `None` reads the latest ledger version.
    async fn account_resource(
        &self,
        address: &AccountAddress,
        resource_type: &MoveType,
        ledger_version: Option<u64>,
    ) -> Result<AccountResource>;

    /// Returns the current ledger metadata.
    async fn ledger_info(&self) -> Result<LedgerInfo>;

    /// Returns the node's gas unit price estimate.
    async fn estimate_gas_price(&self) -> Result<u64>;

    /// Returns the canonical bytes to sign for `txn`.
    async fn signing_message(&self, txn: &UnsignedTransaction) -> Result<Vec<u8>>;

    /// Submits a signed transaction.
    async fn submit_transaction(&self, txn: &SignedTransaction) -> Result<SubmissionResult>;

    /// Returns the raw balance of `coin_type` held by `address`.
    async fn balance_of(&self, address: &AccountAddress, coin_type: &MoveType) -> Result<u64>;
}
