//! REST client tests against a local wiremock node.
//!
//! Run with: `cargo test -p aptkit --test rest_client`

use aptkit::payload::aptos_account_transfer;
use aptkit::*;
use aptkit_testing::EdgeCaseMnemonics;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LEDGER_INFO: &str = r#"{
    "chain_id": 2,
    "epoch": "8127",
    "ledger_version": "912345",
    "oldest_ledger_version": "0",
    "ledger_timestamp": "1700000000123456",
    "node_role": "full_node",
    "oldest_block_height": "0",
    "block_height": "40000"
}"#;

fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::new(Network::Localnet)
        .with_node_url(format!("{}/v1", server.uri()))
        .with_max_retries(2)
        .with_retry_delay(1)
}

fn client(server: &MockServer) -> RestClient {
    RestClient::new(&config(server)).unwrap()
}

fn account() -> Account {
    Account::from_mnemonic(EdgeCaseMnemonics::STANDARD_12).unwrap()
}

fn unsigned(sender: AccountAddress) -> UnsignedTransaction {
    UnsignedTransaction::compose(
        sender,
        5,
        2000,
        100,
        aptos_account_transfer(&AccountAddress::ONE, 10_000),
        1000,
        600,
    )
    .unwrap()
}

fn signed(sender: AccountAddress) -> SignedTransaction {
    SignedTransaction {
        raw: unsigned(sender),
        signature: SignatureEnvelope {
            scheme: SignatureScheme::Ed25519,
            public_key: "0xaa".into(),
            signature: "0xbb".into(),
        },
    }
}

#[cfg(test)]
mod read_tests {
    use super::*;

    #[tokio::test]
    async fn test_account() {
        let server = MockServer::start().await;
        let address = account().address();
        Mock::given(method("GET"))
            .and(path(format!("/v1/accounts/{}", address.to_hex())))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sequence_number": "17",
                "authentication_key": address.to_hex(),
            })))
            .expect(1)
            .mount(&server)
            .await;

        let data = client(&server).account(&address).await.unwrap();
        assert_eq!(data.sequence_number, 17);
        assert_eq!(data.authentication_key, address.to_hex());
    }

    #[tokio::test]
    async fn test_missing_account_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/v1/accounts/0x[0-9a-f]{64}$"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "Account not found",
                "error_code": "account_not_found",
                "vm_error_code": null,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server).account(&AccountAddress::ONE).await.unwrap_err();
        assert!(matches!(err, AptosError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_ledger_info_converts_microseconds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(LEDGER_INFO, "application/json"))
            .mount(&server)
            .await;

        let info = client(&server).ledger_info().await.unwrap();
        assert_eq!(info.chain_id, 2);
        assert_eq!(info.ledger_version, 912_345);
        assert_eq!(info.ledger_timestamp, 1_700_000_000);
    }

    #[tokio::test]
    async fn test_estimate_gas_price() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/estimate_gas_price"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "deprioritized_gas_estimate": 100,
                "gas_estimate": 150,
                "prioritized_gas_estimate": 200,
            })))
            .mount(&server)
            .await;

        assert_eq!(client(&server).estimate_gas_price().await.unwrap(), 150);
    }

    #[tokio::test]
    async fn test_resource_at_version() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"/resource/0x1::coin::CoinInfo%3C0x1::aptos_coin::AptosCoin%3E$"))
            .and(query_param("ledger_version", "7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "0x1::coin::CoinInfo<0x1::aptos_coin::AptosCoin>",
                "data": {"name": "Aptos Coin", "symbol": "APT", "decimals": 8},
            })))
            .expect(1)
            .mount(&server)
            .await;

        let coin_info = MoveType::coin_info(&MoveType::aptos_coin());
        let resource = client(&server)
            .account_resource(&AccountAddress::ONE, &coin_info, Some(7))
            .await
            .unwrap();
        assert_eq!(resource.resource_type, coin_info.to_string());
        assert_eq!(resource.data["decimals"], 8);
    }

    #[tokio::test]
    async fn test_balance_of() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"/resource/0x1::coin::CoinStore%3C0x1::aptos_coin::AptosCoin%3E$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin>",
                "data": {"coin": {"value": "123456789"}, "frozen": false},
            })))
            .mount(&server)
            .await;

        let balance = client(&server)
            .balance_of(&account().address(), &MoveType::aptos_coin())
            .await
            .unwrap();
        assert_eq!(balance, 123_456_789);
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/estimate_gas_price"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"gas": "lots"})))
            .mount(&server)
            .await;

        let err = client(&server).estimate_gas_price().await.unwrap_err();
        assert!(matches!(err, AptosError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_read_retries_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/estimate_gas_price"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .with_priority(1)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/estimate_gas_price"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"gas_estimate": 100})))
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(client(&server).estimate_gas_price().await.unwrap(), 100);
    }

    #[tokio::test]
    async fn test_read_gives_up_after_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/estimate_gas_price"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "message": "internal error",
                "error_code": "internal_error",
            })))
            .expect(3)
            .mount(&server)
            .await;

        let err = client(&server).estimate_gas_price().await.unwrap_err();
        match err {
            AptosError::Api { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("internal error"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/estimate_gas_price"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "bad request"})))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server).estimate_gas_price().await.unwrap_err();
        assert!(matches!(err, AptosError::Api { status: 400, .. }));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_unreachable_node_is_connection_error() {
        let config = ClientConfig::new(Network::Localnet)
            .with_node_url("http://127.0.0.1:1/v1")
            .with_max_retries(0);
        let err = RestClient::dial(&config).await.unwrap_err();
        assert!(matches!(err, AptosError::Connection { .. }));
        assert_eq!(err.code(), ErrorCode::Connection);
    }
}

#[cfg(test)]
mod write_tests {
    use super::*;

    #[tokio::test]
    async fn test_signing_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/transactions/encode_submission"))
            .and(body_partial_json(json!({
                "sequence_number": "5",
                "gas_unit_price": "100",
                "expiration_timestamp_secs": "1600",
                "payload": {"type": "entry_function_payload", "function": "0x1::aptos_account::transfer"},
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!("0xb5e97db07fa0bd0e5598aa3643a9bc6f")))
            .expect(1)
            .mount(&server)
            .await;

        let message = client(&server)
            .signing_message(&unsigned(account().address()))
            .await
            .unwrap();
        assert_eq!(hex::encode(message), "b5e97db07fa0bd0e5598aa3643a9bc6f");
    }

    #[tokio::test]
    async fn test_submit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/transactions"))
            .and(body_partial_json(json!({
                "signature": {"type": "ed25519_signature", "public_key": "0xaa", "signature": "0xbb"},
            })))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({
                "hash": "0x3e5f",
                "sender": account().address().to_hex(),
                "sequence_number": "5",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = client(&server)
            .submit_transaction(&signed(account().address()))
            .await
            .unwrap();
        assert_eq!(result.hash, "0x3e5f");
    }

    #[tokio::test]
    async fn test_submit_rejection_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/transactions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "message": "Invalid transaction: INSUFFICIENT_BALANCE_FOR_TRANSACTION_FEE",
                "error_code": "vm_error",
                "vm_error_code": 5,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server)
            .submit_transaction(&signed(account().address()))
            .await
            .unwrap_err();
        match err {
            AptosError::RemoteRejection {
                status,
                message,
                vm_error_code,
            } => {
                assert_eq!(status, 400);
                assert!(message.contains("INSUFFICIENT_BALANCE"));
                assert_eq!(vm_error_code, Some(5));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_submit_server_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/transactions"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server)
            .submit_transaction(&signed(account().address()))
            .await
            .unwrap_err();
        assert!(matches!(err, AptosError::RemoteRejection { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_transfer_end_to_end() {
        let server = MockServer::start().await;
        let sender = account();

        Mock::given(method("GET"))
            .and(path("/v1"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(LEDGER_INFO, "application/json"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/v1/accounts/{}", sender.address().to_hex())))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sequence_number": "3",
                "authentication_key": sender.address().to_hex(),
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/estimate_gas_price"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"gas_estimate": 100})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/transactions/encode_submission"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!("0x6d7367")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/transactions"))
            .and(body_partial_json(json!({
                "sender": sender.address().to_hex(),
                "sequence_number": "3",
                "expiration_timestamp_secs": "1700000600",
            })))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({"hash": "0xdone"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = RestClient::dial(&config(&server)).await.unwrap();
        let result = Workflows::new(&client)
            .transfer_apt(&sender, &AccountAddress::ONE, 10_000)
            .await
            .unwrap();
        assert_eq!(result.hash, "0xdone");
    }
}
