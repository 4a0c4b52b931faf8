//! # aptkit
//!
//! Aptos account, coin and transaction workflows over the fullnode REST API.
//!
//! ## Features
//!
//! - Ed25519 accounts from BIP-39 mnemonics (m/44'/637'/0'/0'/0') or raw keys
//! - Typed `CoinInfo` / `CoinStore` reads
//! - One build, sign and submit pipeline shared by every transaction workflow
//! - Native transfer, coin transfer, and managed coin register/mint/burn
//! - REST client with bounded retry on idempotent reads
//!
//! ## Example
//!
//! ```no_run
//! use aptkit::{Account, AccountAddress, ClientConfig, Network, RestClient, Workflows};
//!
//! # async fn run() -> aptkit::Result<()> {
//! let config = ClientConfig::new(Network::Testnet);
//! let client = RestClient::dial(&config).await?;
//!
//! let sender = Account::from_private_key_hex(&std::env::var("APTOS_PRIVATE_KEY").unwrap_or_default())?;
//! let to: AccountAddress = "0x8bdc".parse()?;
//!
//! let result = Workflows::with_options(&client, config.transaction_options())
//!     .transfer_apt(&sender, &to, 10_000)
//!     .await?;
//! println!("hash: {}", result.hash);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod account;
pub mod address;
pub mod client;
pub mod config;
pub mod error;
pub mod move_types;
pub mod payload;
pub mod resource;
pub mod rest;
pub mod retry;
pub mod transaction;
pub mod workflow;

pub use account::{derivation_path, Account, CreatedAccount};
pub use address::AccountAddress;
pub use client::{AccountData, AccountResource, LedgerClient, LedgerInfo};
pub use config::{ClientConfig, Network};
pub use error::{AptosError, ErrorCode, Result};
pub use move_types::{EntryFunctionId, MoveType, TypeTag, APTOS_COIN};
pub use payload::{EntryFunctionPayload, TransactionPayload};
pub use resource::{CoinBalance, CoinMetadata, ResourceInspector};
pub use rest::RestClient;
pub use retry::RetryPolicy;
pub use transaction::{
    SignatureEnvelope, SignatureScheme, SignedTransaction, SubmissionResult, TransactionBuilder,
    TransactionOptions, TransactionPipeline, TransactionSigner, TransactionSubmitter, UnsignedTransaction,
};
pub use workflow::{create_account, import_account, sign_message, RegisterOutcome, Workflows};
