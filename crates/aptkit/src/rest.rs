//! [`LedgerClient`] over the node REST API.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use url::Url;

use crate::address::AccountAddress;
use crate::client::{AccountData, AccountResource, LedgerClient, LedgerInfo};
use crate::config::ClientConfig;
use crate::error::{AptosError, Result};
use crate::move_types::MoveType;
use crate::retry::{with_retry, RetryPolicy};
use crate::transaction::{SignedTransaction, SubmissionResult, UnsignedTransaction};

const MICROS_PER_SEC: u64 = 1_000_000;

#[derive(Deserialize)]
struct LedgerInfoBody {
    chain_id: u8,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    ledger_version: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    ledger_timestamp: u64,
}

#[derive(Deserialize)]
struct GasEstimateBody {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    gas_estimate: u64,
}

#[derive(Deserialize)]
struct CoinStoreData {
    coin: CoinValue,
}

#[derive(Deserialize)]
struct CoinValue {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    value: u64,
}

#[derive(Deserialize)]
struct NodeErrorBody {
    message: String,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    vm_error_code: Option<u64>,
}

struct Failure {
    status: StatusCode,
    message: String,
    vm_error_code: Option<u64>,
}

impl Failure {
    async fn read(response: Response) -> Self {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<NodeErrorBody>(&body) {
            Ok(err) => Self {
                status,
                message: match err.error_code {
                    Some(code) => format!("{} ({})", err.message, code),
                    None => err.message,
                },
                vm_error_code: err.vm_error_code,
            },
            Err(_) => Self {
                status,
                message: if body.is_empty() {
                    status.canonical_reason().unwrap_or("unknown").to_string()
                } else {
                    body
                },
                vm_error_code: None,
            },
        }
    }
}

/// HTTP client for an Aptos fullnode.
///
/// Reads go through the configured [`RetryPolicy`]; transaction encoding
/// and submission are sent exactly once.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl RestClient {
    /// Builds a client without contacting the node.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let base_url = Url::parse(config.rest_url()).map_err(|e| AptosError::Config(e.to_string()))?;

        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.timeout())
            .pool_max_idle_per_host(4)
            .user_agent(format!("aptkit/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AptosError::Connection {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url,
            retry: config.retry_policy(),
        })
    }

    /// Builds a client and checks that the node answers with ledger info.
    pub async fn dial(config: &ClientConfig) -> Result<Self> {
        let client = Self::new(config)?;
        let info = client.ledger_info().await?;
        tracing::info!(
            url = %client.base_url,
            chain_id = info.chain_id,
            ledger_version = info.ledger_version,
            "Connected to node"
        );
        Ok(client)
    }

    /// REST base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn connection_error(url: &Url, err: reqwest::Error) -> AptosError {
        AptosError::Connection {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }

    async fn decode<T: DeserializeOwned>(url: &Url, response: Response, what: &str) -> Result<T> {
        let body = response.text().await.map_err(|e| Self::connection_error(url, e))?;
        serde_json::from_str(&body).map_err(|e| AptosError::decode(what, e))
    }

    async fn get_once<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T> {
        tracing::debug!(%url, "GET");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Self::connection_error(&url, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AptosError::NotFound(what.to_string()));
        }
        if !status.is_success() {
            let failure = Failure::read(response).await;
            return Err(AptosError::Api {
                status: failure.status.as_u16(),
                message: failure.message,
            });
        }
        Self::decode(&url, response, what).await
    }

    async fn get<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T> {
        with_retry(&self.retry, what, move || self.get_once(url.clone(), what)).await
    }

    async fn post<B, T>(&self, url: Url, body: &B, what: &str) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        tracing::debug!(%url, "POST");
        let response = self
            .client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| Self::connection_error(&url, e))?;

        if !response.status().is_success() {
            let failure = Failure::read(response).await;
            return Err(AptosError::RemoteRejection {
                status: failure.status.as_u16(),
                message: failure.message,
                vm_error_code: failure.vm_error_code,
            });
        }
        Self::decode(&url, response, what).await
    }
}

#[async_trait]
impl LedgerClient for RestClient {
    async fn account(&self, address: &AccountAddress) -> Result<AccountData> {
        let hex = address.to_hex();
        let url = self.endpoint(&["accounts", &hex]);
        self.get(url, &format!("account {}", hex)).await
    }

    async fn account_resource(
        &self,
        address: &AccountAddress,
        resource_type: &MoveType,
        ledger_version: Option<u64>,
    ) -> Result<AccountResource> {
        let hex = address.to_hex();
        let type_str = resource_type.to_string();
        let mut url = self.endpoint(&["accounts", &hex, "resource", &type_str]);
        if let Some(version) = ledger_version {
            url.query_pairs_mut().append_pair("ledger_version", &version.to_string());
        }
        self.get(url, &format!("resource {} under {}", type_str, hex)).await
    }

    async fn ledger_info(&self) -> Result<LedgerInfo> {
        let body: LedgerInfoBody = self.get(self.endpoint(&[]), "ledger info").await?;
        Ok(LedgerInfo {
            chain_id: body.chain_id,
            ledger_version: body.ledger_version,
            ledger_timestamp: body.ledger_timestamp / MICROS_PER_SEC,
        })
    }

    async fn estimate_gas_price(&self) -> Result<u64> {
        let body: GasEstimateBody = self.get(self.endpoint(&["estimate_gas_price"]), "gas estimate").await?;
        Ok(body.gas_estimate)
    }

    async fn signing_message(&self, txn: &UnsignedTransaction) -> Result<Vec<u8>> {
        let url = self.endpoint(&["transactions", "encode_submission"]);
        let encoded: String = self.post(url, txn, "signing message").await?;
        let digits = encoded.strip_prefix("0x").unwrap_or(&encoded);
        hex::decode(digits).map_err(|e| AptosError::decode("signing message", e))
    }

    async fn submit_transaction(&self, txn: &SignedTransaction) -> Result<SubmissionResult> {
        self.post(self.endpoint(&["transactions"]), txn, "submission result")
            .await
    }

    async fn balance_of(&self, address: &AccountAddress, coin_type: &MoveType) -> Result<u64> {
        let resource_type = MoveType::coin_store(coin_type);
        let resource = self.account_resource(address, &resource_type, None).await?;
        let store: CoinStoreData =
            serde_json::from_value(resource.data).map_err(|e| AptosError::decode(resource_type.to_string(), e))?;
        Ok(store.coin.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Network;

    #[test]
    fn test_endpoint_joins_segments() {
        let client = RestClient::new(&ClientConfig::new(Network::Localnet)).unwrap();
        assert_eq!(
            client.endpoint(&["accounts", "0x1"]).as_str(),
            "http://127.0.0.1:8080/v1/accounts/0x1"
        );
        assert_eq!(client.endpoint(&[]).as_str(), "http://127.0.0.1:8080/v1");
    }

    #[test]
    fn test_endpoint_with_trailing_slash() {
        let config = ClientConfig::default().with_node_url("http://localhost:8080/v1/");
        let client = RestClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint(&["estimate_gas_price"]).as_str(),
            "http://localhost:8080/v1/estimate_gas_price"
        );
    }

    #[test]
    fn test_resource_type_is_one_segment() {
        let client = RestClient::new(&ClientConfig::new(Network::Localnet)).unwrap();
        let store = MoveType::coin_store(&MoveType::aptos_coin()).to_string();
        let url = client.endpoint(&["accounts", "0x1", "resource", &store]);
        assert_eq!(url.path_segments().unwrap().count(), 5);
        assert!(url.as_str().ends_with("0x1::coin::CoinStore%3C0x1::aptos_coin::AptosCoin%3E"));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ClientConfig::default().with_node_url("nope");
        assert!(matches!(RestClient::new(&config).unwrap_err(), AptosError::Config(_)));
    }
}
