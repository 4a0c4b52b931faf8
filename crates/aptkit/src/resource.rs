//! Typed reads of coin resources.

use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use std::fmt;

use crate::address::AccountAddress;
use crate::client::LedgerClient;
use crate::error::{AptosError, Result};
use crate::move_types::MoveType;

/// Name, symbol and precision of a published coin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinMetadata {
    /// Display name
    pub name: String,
    /// Ticker symbol
    pub symbol: String,
    /// Number of fractional digits
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub decimals: u8,
}

/// Raw balance of one coin together with its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinBalance {
    /// Coin type queried
    pub coin_type: MoveType,
    /// Amount in the coin's smallest unit
    pub value: u64,
    /// Metadata of `coin_type`
    pub metadata: CoinMetadata,
}

impl CoinBalance {
    /// Renders `value / 10^decimals` with exactly `decimals` fractional digits.
    pub fn formatted(&self) -> String {
        let decimals = usize::from(self.metadata.decimals);
        if decimals == 0 {
            return self.value.to_string();
        }
        let digits = format!("{:0>width$}", self.value, width = decimals + 1);
        let (whole, fraction) = digits.split_at(digits.len() - decimals);
        format!("{}.{}", whole, fraction)
    }
}

impl fmt::Display for CoinBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.formatted(), self.metadata.symbol)
    }
}

/// Reads `CoinInfo` and `CoinStore` resources through a [`LedgerClient`].
pub struct ResourceInspector<'a, C: ?Sized> {
    client: &'a C,
}

impl<'a, C: LedgerClient + ?Sized> ResourceInspector<'a, C> {
    /// Creates an inspector
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Fetches `0x1::coin::CoinInfo<coin_type>` from the account that
    /// published the coin.
    pub async fn coin_info(&self, coin_type: &MoveType) -> Result<CoinMetadata> {
        let resource_type = MoveType::coin_info(coin_type);
        let resource = self
            .client
            .account_resource(&coin_type.address(), &resource_type, None)
            .await?;

        serde_json::from_value(resource.data).map_err(|e| AptosError::decode(resource_type.to_string(), e))
    }

    /// Returns whether `account` holds a `CoinStore` for `coin_type`.
    ///
    /// An absent resource means "not registered"; every other failure is
    /// returned as an error.
    pub async fn is_coin_registered(&self, account: &AccountAddress, coin_type: &MoveType) -> Result<bool> {
        let resource_type = MoveType::coin_store(coin_type);
        match self.client.account_resource(account, &resource_type, None).await {
            Ok(resource) => Ok(resource.data.get("coin").is_some()),
            Err(AptosError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Raw balance plus metadata for the same coin type.
    pub async fn balance(&self, account: &AccountAddress, coin_type: &MoveType) -> Result<CoinBalance> {
        let value = self.client.balance_of(account, coin_type).await?;
        let metadata = self.coin_info(coin_type).await?;
        Ok(CoinBalance {
            coin_type: coin_type.clone(),
            value,
            metadata,
        })
    }
}
