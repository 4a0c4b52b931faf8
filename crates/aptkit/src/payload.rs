//! Transaction payloads.
//!
//! Each workflow differs from the others only in the entry function it calls,
//! so the workflows reduce to the factories in this module.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::address::AccountAddress;
use crate::move_types::{EntryFunctionId, MoveType, TypeTag};

/// What a transaction executes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TransactionPayload {
    /// Call to a public entry function
    #[serde(rename = "entry_function_payload")]
    EntryFunction(EntryFunctionPayload),
}

/// Entry function, its generic type arguments and its runtime arguments.
///
/// Arguments are passed through untouched: arity and types are checked by the
/// node, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryFunctionPayload {
    /// Function to call
    pub function: EntryFunctionId,
    /// Generic type arguments, in order
    pub type_arguments: Vec<TypeTag>,
    /// Runtime arguments, in order
    pub arguments: Vec<Value>,
}

impl TransactionPayload {
    /// Builds an entry function payload.
    pub fn entry_function(
        function: EntryFunctionId,
        type_arguments: Vec<TypeTag>,
        arguments: Vec<Value>,
    ) -> Self {
        TransactionPayload::EntryFunction(EntryFunctionPayload {
            function,
            type_arguments,
            arguments,
        })
    }

    /// Returns the called function
    pub fn function(&self) -> &EntryFunctionId {
        match self {
            TransactionPayload::EntryFunction(p) => &p.function,
        }
    }
}

fn address_arg(address: &AccountAddress) -> Value {
    Value::String(address.to_hex())
}

// u64 arguments travel as decimal strings
fn amount_arg(amount: u64) -> Value {
    Value::String(amount.to_string())
}

fn coin_arg(coin_type: &MoveType) -> Vec<TypeTag> {
    vec![TypeTag::Struct(coin_type.clone())]
}

/// `0x1::aptos_account::transfer(to, amount)`.
///
/// Creates the recipient account and registers it for the native coin when
/// needed.
pub fn aptos_account_transfer(to: &AccountAddress, amount: u64) -> TransactionPayload {
    TransactionPayload::entry_function(
        EntryFunctionId::framework("aptos_account", "transfer"),
        Vec::new(),
        vec![address_arg(to), amount_arg(amount)],
    )
}

/// `0x1::coin::transfer<CoinType>(to, amount)`.
///
/// The recipient must already hold a `CoinStore` for the coin.
pub fn coin_transfer(coin_type: &MoveType, to: &AccountAddress, amount: u64) -> TransactionPayload {
    TransactionPayload::entry_function(
        EntryFunctionId::framework("coin", "transfer"),
        coin_arg(coin_type),
        vec![address_arg(to), amount_arg(amount)],
    )
}

/// `0x1::managed_coin::register<CoinType>()`
pub fn managed_coin_register(coin_type: &MoveType) -> TransactionPayload {
    TransactionPayload::entry_function(
        EntryFunctionId::framework("managed_coin", "register"),
        coin_arg(coin_type),
        Vec::new(),
    )
}

/// `0x1::managed_coin::mint<CoinType>(to, amount)`
pub fn managed_coin_mint(coin_type: &MoveType, to: &AccountAddress, amount: u64) -> TransactionPayload {
    TransactionPayload::entry_function(
        EntryFunctionId::framework("managed_coin", "mint"),
        coin_arg(coin_type),
        vec![address_arg(to), amount_arg(amount)],
    )
}

/// `0x1::managed_coin::burn<CoinType>(amount)`
pub fn managed_coin_burn(coin_type: &MoveType, amount: u64) -> TransactionPayload {
    TransactionPayload::entry_function(
        EntryFunctionId::framework("managed_coin", "burn"),
        coin_arg(coin_type),
        vec![amount_arg(amount)],
    )
}
