//! Transaction construction, signing and submission.
//!
//! ```text
//! payload ──► TransactionBuilder ──► TransactionSigner ──► TransactionSubmitter ──► hash
//!              account / ledger /     signing message
//!              gas estimate           from the node
//! ```
//!
//! [`TransactionPipeline`] runs all three stages for one payload.

use serde::{Deserialize, Serialize, Serializer};
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::account::Account;
use crate::address::AccountAddress;
use crate::client::LedgerClient;
use crate::error::{AptosError, Result};
use crate::payload::TransactionPayload;

/// Gas ceiling used when the caller does not pick one.
pub const DEFAULT_MAX_GAS_AMOUNT: u64 = 2000;

/// Seconds past the ledger timestamp after which a transaction expires.
pub const DEFAULT_EXPIRATION_OFFSET_SECS: u64 = 600;

fn serialize_u64_as_string<S: Serializer>(value: &u64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// A transaction ready to be signed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    /// Sending account
    pub sender: AccountAddress,
    /// Sender's sequence number at build time
    #[serde(serialize_with = "serialize_u64_as_string", deserialize_with = "deserialize_number_from_string")]
    pub sequence_number: u64,
    /// Gas ceiling
    #[serde(serialize_with = "serialize_u64_as_string", deserialize_with = "deserialize_number_from_string")]
    pub max_gas_amount: u64,
    /// Price per gas unit
    #[serde(serialize_with = "serialize_u64_as_string", deserialize_with = "deserialize_number_from_string")]
    pub gas_unit_price: u64,
    /// What to execute
    pub payload: TransactionPayload,
    /// Deadline in seconds since the epoch
    #[serde(serialize_with = "serialize_u64_as_string", deserialize_with = "deserialize_number_from_string")]
    pub expiration_timestamp_secs: u64,
}

impl UnsignedTransaction {
    /// Assembles a transaction from already-fetched chain state.
    ///
    /// The deadline is `ledger_timestamp + expiration_offset_secs` and must
    /// lie strictly after the ledger timestamp.
    pub fn compose(
        sender: AccountAddress,
        sequence_number: u64,
        max_gas_amount: u64,
        gas_unit_price: u64,
        payload: TransactionPayload,
        ledger_timestamp: u64,
        expiration_offset_secs: u64,
    ) -> Result<Self> {
        if max_gas_amount == 0 {
            return Err(AptosError::TransactionBuild("max gas amount must be positive".into()));
        }
        if expiration_offset_secs == 0 {
            return Err(AptosError::TransactionBuild("expiration offset must be positive".into()));
        }
        let expiration_timestamp_secs = ledger_timestamp
            .checked_add(expiration_offset_secs)
            .ok_or_else(|| {
                AptosError::TransactionBuild(format!(
                    "expiration overflows: {} + {}",
                    ledger_timestamp, expiration_offset_secs
                ))
            })?;

        Ok(Self {
            sender,
            sequence_number,
            max_gas_amount,
            gas_unit_price,
            payload,
            expiration_timestamp_secs,
        })
    }
}

/// Signature scheme tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureScheme {
    /// Single-key ed25519
    #[serde(rename = "ed25519_signature")]
    Ed25519,
}

/// Signature attached to a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureEnvelope {
    /// Scheme tag
    #[serde(rename = "type")]
    pub scheme: SignatureScheme,
    /// Signer public key, 0x-prefixed hex
    pub public_key: String,
    /// Signature, 0x-prefixed hex
    pub signature: String,
}

impl SignatureEnvelope {
    /// Returns the raw signature bytes
    pub fn signature_bytes(&self) -> Result<Vec<u8>> {
        let digits = self.signature.strip_prefix("0x").unwrap_or(&self.signature);
        Ok(hex::decode(digits)?)
    }
}

/// A transaction plus its signature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// The signed transaction body
    #[serde(flatten)]
    pub raw: UnsignedTransaction,
    /// Signature over the node-provided signing message
    pub signature: SignatureEnvelope,
}

/// Outcome of a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    /// Transaction hash
    pub hash: String,
}

/// Gas and expiration policy applied by [`TransactionBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionOptions {
    /// Gas ceiling
    pub max_gas_amount: u64,
    /// Seconds added to the ledger timestamp
    pub expiration_offset_secs: u64,
}

impl Default for TransactionOptions {
    fn default() -> Self {
        Self {
            max_gas_amount: DEFAULT_MAX_GAS_AMOUNT,
            expiration_offset_secs: DEFAULT_EXPIRATION_OFFSET_SECS,
        }
    }
}

/// Reads sender and ledger state and assembles an [`UnsignedTransaction`].
pub struct TransactionBuilder<'a, C: ?Sized> {
    client: &'a C,
    options: TransactionOptions,
}

impl<'a, C: LedgerClient + ?Sized> TransactionBuilder<'a, C> {
    /// Creates a builder with default options
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            options: TransactionOptions::default(),
        }
    }

    /// Replaces all options
    pub fn with_options(mut self, options: TransactionOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the gas ceiling
    pub fn with_max_gas_amount(mut self, max_gas_amount: u64) -> Self {
        self.options.max_gas_amount = max_gas_amount;
        self
    }

    /// Sets the expiration offset
    pub fn with_expiration_offset(mut self, secs: u64) -> Self {
        self.options.expiration_offset_secs = secs;
        self
    }

    /// Fetches the sequence number, ledger timestamp and gas estimate, then
    /// composes the transaction.
    pub async fn build(&self, sender: &AccountAddress, payload: TransactionPayload) -> Result<UnsignedTransaction> {
        let account = self.client.account(sender).await?;
        let ledger = self.client.ledger_info().await?;
        let gas_unit_price = self.client.estimate_gas_price().await?;

        let txn = UnsignedTransaction::compose(
            *sender,
            account.sequence_number,
            self.options.max_gas_amount,
            gas_unit_price,
            payload,
            ledger.ledger_timestamp,
            self.options.expiration_offset_secs,
        )?;

        tracing::debug!(
            sender = %txn.sender,
            function = %txn.payload.function(),
            sequence_number = txn.sequence_number,
            gas_unit_price = txn.gas_unit_price,
            expiration = txn.expiration_timestamp_secs,
            "Built transaction"
        );
        Ok(txn)
    }
}

/// Obtains the signing message from the node and signs it.
pub struct TransactionSigner<'a, C: ?Sized> {
    client: &'a C,
}

impl<'a, C: LedgerClient + ?Sized> TransactionSigner<'a, C> {
    /// Creates a signer
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Signs `txn` with `account`, which must be the transaction's sender.
    pub async fn sign(&self, account: &Account, txn: UnsignedTransaction) -> Result<SignedTransaction> {
        if account.address() != txn.sender {
            return Err(AptosError::Signing(format!(
                "signer {} is not the sender {}",
                account.address(),
                txn.sender
            )));
        }

        let message = self.client.signing_message(&txn).await?;
        let signature = account.sign(&message);
        tracing::debug!(sender = %txn.sender, message_len = message.len(), "Signed transaction");

        Ok(SignedTransaction {
            raw: txn,
            signature: SignatureEnvelope {
                scheme: SignatureScheme::Ed25519,
                public_key: account.public_key_hex(),
                signature: format!("0x{}", hex::encode(signature.to_bytes())),
            },
        })
    }
}

/// Submits signed transactions. Never retries.
pub struct TransactionSubmitter<'a, C: ?Sized> {
    client: &'a C,
}

impl<'a, C: LedgerClient + ?Sized> TransactionSubmitter<'a, C> {
    /// Creates a submitter
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Submits `txn` once and returns its hash.
    pub async fn submit(&self, txn: &SignedTransaction) -> Result<SubmissionResult> {
        let result = self.client.submit_transaction(txn).await?;
        tracing::info!(
            sender = %txn.raw.sender,
            function = %txn.raw.payload.function(),
            hash = %result.hash,
            "Submitted transaction"
        );
        Ok(result)
    }
}

/// Build, sign and submit in one call.
pub struct TransactionPipeline<'a, C: ?Sized> {
    client: &'a C,
    options: TransactionOptions,
}

impl<'a, C: LedgerClient + ?Sized> TransactionPipeline<'a, C> {
    /// Creates a pipeline
    pub fn new(client: &'a C, options: TransactionOptions) -> Self {
        Self { client, options }
    }

    /// Runs build, sign and submit for `payload` sent by `account`.
    pub async fn execute(&self, account: &Account, payload: TransactionPayload) -> Result<SubmissionResult> {
        let unsigned = TransactionBuilder::new(self.client)
            .with_options(self.options)
            .build(&account.address(), payload)
            .await?;
        let signed = TransactionSigner::new(self.client).sign(account, unsigned).await?;
        TransactionSubmitter::new(self.client).submit(&signed).await
    }
}
