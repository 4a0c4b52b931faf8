//! End-to-end account and coin operations.
//!
//! Transaction workflows differ only in their payload; each one picks a
//! factory from [`crate::payload`] and hands it to a [`TransactionPipeline`].

use crate::account::{Account, CreatedAccount};
use crate::address::AccountAddress;
use crate::client::LedgerClient;
use crate::error::{AptosError, Result};
use crate::move_types::MoveType;
use crate::payload;
use crate::resource::{CoinBalance, ResourceInspector};
use crate::transaction::{SubmissionResult, TransactionOptions, TransactionPipeline};

/// Result of [`Workflows::register_coin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// A `CoinStore` already existed; nothing was submitted
    AlreadyRegistered,
    /// The registration transaction was submitted
    Submitted(SubmissionResult),
}

/// Creates a fresh account from 128 bits of entropy.
pub fn create_account() -> Result<CreatedAccount> {
    let created = Account::generate()?;
    tracing::info!(address = %created.account.address(), path = %created.path, "Created account");
    Ok(created)
}

/// Imports an account from a hex private key.
pub fn import_account(private_key_hex: &str) -> Result<Account> {
    let account = Account::from_private_key_hex(private_key_hex)?;
    tracing::debug!(address = %account.address(), "Imported account");
    Ok(account)
}

/// Signs `message` and returns the signature as 0x-prefixed hex.
pub fn sign_message(account: &Account, message: &[u8]) -> String {
    format!("0x{}", hex::encode(account.sign(message).to_bytes()))
}

/// Workflows bound to one ledger client.
pub struct Workflows<'a, C: ?Sized> {
    client: &'a C,
    options: TransactionOptions,
}

impl<'a, C: LedgerClient + ?Sized> Workflows<'a, C> {
    /// Creates workflows with default gas and expiration policy
    pub fn new(client: &'a C) -> Self {
        Self::with_options(client, TransactionOptions::default())
    }

    /// Creates workflows with explicit gas and expiration policy
    pub fn with_options(client: &'a C, options: TransactionOptions) -> Self {
        Self { client, options }
    }

    fn pipeline(&self) -> TransactionPipeline<'a, C> {
        TransactionPipeline::new(self.client, self.options)
    }

    fn inspector(&self) -> ResourceInspector<'a, C> {
        ResourceInspector::new(self.client)
    }

    async fn require_registered(&self, account: &AccountAddress, coin_type: &MoveType) -> Result<()> {
        if self.inspector().is_coin_registered(account, coin_type).await? {
            Ok(())
        } else {
            Err(AptosError::CoinNotRegistered {
                account: account.to_hex(),
                coin_type: coin_type.to_string(),
            })
        }
    }

    /// Balance of each coin type, in order, with decimals taken from that
    /// coin's own `CoinInfo`.
    pub async fn balances(&self, account: &AccountAddress, coin_types: &[MoveType]) -> Result<Vec<CoinBalance>> {
        let inspector = self.inspector();
        let mut balances = Vec::with_capacity(coin_types.len());
        for coin_type in coin_types {
            balances.push(inspector.balance(account, coin_type).await?);
        }
        Ok(balances)
    }

    /// Sends native coin. The recipient is created and registered on demand.
    pub async fn transfer_apt(&self, from: &Account, to: &AccountAddress, amount: u64) -> Result<SubmissionResult> {
        self.pipeline()
            .execute(from, payload::aptos_account_transfer(to, amount))
            .await
    }

    /// Sends a published coin. The recipient must already be registered.
    pub async fn transfer_token(
        &self,
        from: &Account,
        coin_type: &MoveType,
        to: &AccountAddress,
        amount: u64,
    ) -> Result<SubmissionResult> {
        self.pipeline()
            .execute(from, payload::coin_transfer(coin_type, to, amount))
            .await
    }

    /// Registers `account` for `coin_type` unless it already is.
    pub async fn register_coin(&self, account: &Account, coin_type: &MoveType) -> Result<RegisterOutcome> {
        if self.inspector().is_coin_registered(&account.address(), coin_type).await? {
            tracing::info!(account = %account.address(), coin_type = %coin_type, "Already registered");
            return Ok(RegisterOutcome::AlreadyRegistered);
        }

        let result = self
            .pipeline()
            .execute(account, payload::managed_coin_register(coin_type))
            .await?;
        Ok(RegisterOutcome::Submitted(result))
    }

    /// Mints `amount` of `coin_type` to `to`. The minter must hold the mint
    /// capability, which only the node checks.
    pub async fn mint_coin(
        &self,
        minter: &Account,
        coin_type: &MoveType,
        to: &AccountAddress,
        amount: u64,
    ) -> Result<SubmissionResult> {
        self.require_registered(&minter.address(), coin_type).await?;
        self.pipeline()
            .execute(minter, payload::managed_coin_mint(coin_type, to, amount))
            .await
    }

    /// Burns `amount` of `coin_type` held by `owner`.
    pub async fn burn_coin(&self, owner: &Account, coin_type: &MoveType, amount: u64) -> Result<SubmissionResult> {
        self.require_registered(&owner.address(), coin_type).await?;
        self.pipeline()
            .execute(owner, payload::managed_coin_burn(coin_type, amount))
            .await
    }
}
