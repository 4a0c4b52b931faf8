//! In-memory [`LedgerClient`] that records every call.

use aptkit::{
    AccountAddress, AccountData, AccountResource, AptosError, LedgerClient, LedgerInfo, MoveType, Result,
    SignedTransaction, SubmissionResult, UnsignedTransaction,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

/// One [`LedgerClient`] method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// `account`
    Account,
    /// `account_resource`
    AccountResource,
    /// `ledger_info`
    LedgerInfo,
    /// `estimate_gas_price`
    EstimateGasPrice,
    /// `signing_message`
    SigningMessage,
    /// `submit_transaction`
    SubmitTransaction,
    /// `balance_of`
    BalanceOf,
}

/// A recorded call with its arguments
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    /// `account(address)`
    Account(AccountAddress),
    /// `account_resource(address, type, version)`
    AccountResource {
        /// Account queried
        address: AccountAddress,
        /// Resource type string
        resource_type: String,
        /// Requested ledger version
        ledger_version: Option<u64>,
    },
    /// `ledger_info()`
    LedgerInfo,
    /// `estimate_gas_price()`
    EstimateGasPrice,
    /// `signing_message(txn)`
    SigningMessage(UnsignedTransaction),
    /// `submit_transaction(txn)`
    SubmitTransaction(SignedTransaction),
    /// `balance_of(address, coin)`
    BalanceOf {
        /// Account queried
        address: AccountAddress,
        /// Coin type string
        coin_type: String,
    },
}

impl Call {
    /// The method this call went to
    pub fn op(&self) -> Op {
        match self {
            Call::Account(_) => Op::Account,
            Call::AccountResource { .. } => Op::AccountResource,
            Call::LedgerInfo => Op::LedgerInfo,
            Call::EstimateGasPrice => Op::EstimateGasPrice,
            Call::SigningMessage(_) => Op::SigningMessage,
            Call::SubmitTransaction(_) => Op::SubmitTransaction,
            Call::BalanceOf { .. } => Op::BalanceOf,
        }
    }
}

type ErrorFactory = Box<dyn Fn() -> AptosError + Send + Sync>;

/// Scripted ledger state plus a call log.
///
/// Defaults: sequence number 0, ledger timestamp 1000s, gas price 100,
/// signing message `b"msg"`, hash `0xhash`, no resources.
pub struct MockLedgerClient {
    sequence_number: u64,
    chain_id: u8,
    ledger_timestamp: u64,
    gas_price: u64,
    signing_message: Vec<u8>,
    hash: String,
    resources: HashMap<(AccountAddress, String), Value>,
    failures: HashMap<Op, ErrorFactory>,
    calls: Mutex<Vec<Call>>,
}

impl Default for MockLedgerClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedgerClient {
    /// Creates a mock with default state
    pub fn new() -> Self {
        Self {
            sequence_number: 0,
            chain_id: 4,
            ledger_timestamp: 1000,
            gas_price: 100,
            signing_message: b"msg".to_vec(),
            hash: "0xhash".to_string(),
            resources: HashMap::new(),
            failures: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Sequence number reported for every account
    pub fn with_sequence_number(mut self, n: u64) -> Self {
        self.sequence_number = n;
        self
    }

    /// Ledger timestamp in seconds
    pub fn with_ledger_timestamp(mut self, secs: u64) -> Self {
        self.ledger_timestamp = secs;
        self
    }

    /// Gas unit price estimate
    pub fn with_gas_price(mut self, price: u64) -> Self {
        self.gas_price = price;
        self
    }

    /// Bytes returned by `signing_message`
    pub fn with_signing_message(mut self, message: impl Into<Vec<u8>>) -> Self {
        self.signing_message = message.into();
        self
    }

    /// Hash returned by `submit_transaction`
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = hash.into();
        self
    }

    /// Stores a resource under `address`
    pub fn with_resource(mut self, address: AccountAddress, resource_type: &MoveType, data: Value) -> Self {
        self.resources.insert((address, resource_type.to_string()), data);
        self
    }

    /// Publishes `CoinInfo` for `coin_type` under its module address
    pub fn with_coin_info(self, coin_type: &MoveType, name: &str, symbol: &str, decimals: u8) -> Self {
        let data = json!({
            "name": name,
            "symbol": symbol,
            "decimals": decimals,
            "supply": {"vec": []},
        });
        self.with_resource(coin_type.address(), &MoveType::coin_info(coin_type), data)
    }

    /// Registers `address` for `coin_type` with `value` units
    pub fn with_balance(self, address: AccountAddress, coin_type: &MoveType, value: u64) -> Self {
        let data = json!({
            "coin": {"value": value.to_string()},
            "frozen": false,
        });
        self.with_resource(address, &MoveType::coin_store(coin_type), data)
    }

    /// Makes every call to `op` fail with the error `make` produces
    pub fn failing<F>(mut self, op: Op, make: F) -> Self
    where
        F: Fn() -> AptosError + Send + Sync + 'static,
    {
        self.failures.insert(op, Box::new(make));
        self
    }

    /// Every call so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of calls to `op`
    pub fn count(&self, op: Op) -> usize {
        self.calls().iter().filter(|c| c.op() == op).count()
    }

    /// Signed transactions passed to `submit_transaction`
    pub fn submitted(&self) -> Vec<SignedTransaction> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SubmitTransaction(txn) => Some(txn),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) -> Result<()> {
        let op = call.op();
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        match self.failures.get(&op) {
            Some(make) => Err(make()),
            None => Ok(()),
        }
    }

    fn resource(&self, address: &AccountAddress, resource_type: &str) -> Result<Value> {
        self.resources
            .get(&(*address, resource_type.to_string()))
            .cloned()
            .ok_or_else(|| AptosError::NotFound(format!("resource {} under {}", resource_type, address)))
    }
}

#[async_trait]
impl LedgerClient for MockLedgerClient {
    async fn account(&self, address: &AccountAddress) -> Result<AccountData> {
        self.record(Call::Account(*address))?;
        Ok(AccountData {
            sequence_number: self.sequence_number,
            authentication_key: address.to_hex(),
        })
    }

    async fn account_resource(
        &self,
        address: &AccountAddress,
        resource_type: &MoveType,
        ledger_version: Option<u64>,
    ) -> Result<AccountResource> {
        let resource_type = resource_type.to_string();
        self.record(Call::AccountResource {
            address: *address,
            resource_type: resource_type.clone(),
            ledger_version,
        })?;
        let data = self.resource(address, &resource_type)?;
        Ok(AccountResource { resource_type, data })
    }

    async fn ledger_info(&self) -> Result<LedgerInfo> {
        self.record(Call::LedgerInfo)?;
        Ok(LedgerInfo {
            chain_id: self.chain_id,
            ledger_version: 1,
            ledger_timestamp: self.ledger_timestamp,
        })
    }

    async fn estimate_gas_price(&self) -> Result<u64> {
        self.record(Call::EstimateGasPrice)?;
        Ok(self.gas_price)
    }

    async fn signing_message(&self, txn: &UnsignedTransaction) -> Result<Vec<u8>> {
        self.record(Call::SigningMessage(txn.clone()))?;
        Ok(self.signing_message.clone())
    }

    async fn submit_transaction(&self, txn: &SignedTransaction) -> Result<SubmissionResult> {
        self.record(Call::SubmitTransaction(txn.clone()))?;
        Ok(SubmissionResult { hash: self.hash.clone() })
    }

    async fn balance_of(&self, address: &AccountAddress, coin_type: &MoveType) -> Result<u64> {
        self.record(Call::BalanceOf {
            address: *address,
            coin_type: coin_type.to_string(),
        })?;
        let store_type = MoveType::coin_store(coin_type).to_string();
        let store = self.resource(address, &store_type)?;
        store["coin"]["value"]
            .as_str()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| AptosError::decode(store_type, "missing coin.value"))
    }
}
