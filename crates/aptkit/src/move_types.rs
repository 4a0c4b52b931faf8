//! Fully-qualified Move identifiers.
//!
//! Resources, coin types and entry functions are all named
//! `<address>::<module>::<name>`, optionally followed by generic type
//! arguments, e.g. `0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin>`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::address::AccountAddress;
use crate::error::{AptosError, Result};

/// The native coin type.
pub const APTOS_COIN: &str = "0x1::aptos_coin::AptosCoin";

const PRIMITIVES: &[&str] = &[
    "bool", "u8", "u16", "u32", "u64", "u128", "u256", "address", "signer",
];

fn invalid(input: &str, reason: impl Into<String>) -> AptosError {
    AptosError::InvalidMoveType {
        input: input.to_string(),
        reason: reason.into(),
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Splits `<address>::<module>::<name>` and validates each part.
fn parse_path(input: &str, head: &str) -> Result<(AccountAddress, String, String, String)> {
    let parts: Vec<&str> = head.split("::").collect();
    if parts.len() != 3 {
        return Err(invalid(input, "expected <address>::<module>::<name>"));
    }
    let address_literal = parts[0].trim();
    if !address_literal.starts_with("0x") {
        return Err(invalid(input, "address must start with 0x"));
    }
    let address = AccountAddress::from_hex(address_literal)
        .map_err(|e| invalid(input, e.to_string()))?;
    if !is_identifier(parts[1]) {
        return Err(invalid(input, format!("invalid module name '{}'", parts[1])));
    }
    if !is_identifier(parts[2]) {
        return Err(invalid(input, format!("invalid item name '{}'", parts[2])));
    }
    Ok((
        address,
        address_literal.to_lowercase(),
        parts[1].to_string(),
        parts[2].to_string(),
    ))
}

/// Splits a generic argument list on top-level commas.
fn split_type_args(input: &str, args: &str) -> Result<Vec<TypeTag>> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in args.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| invalid(input, "unbalanced '>'"))?;
            }
            ',' if depth == 0 => {
                out.push(args[start..i].trim().parse()?);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(invalid(input, "unbalanced '<'"));
    }
    out.push(args[start..].trim().parse()?);
    Ok(out)
}

/// A type argument: primitive, vector, or struct type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// `u64`, `address`, ...
    Primitive(String),
    /// `vector<T>`
    Vector(Box<TypeTag>),
    /// `<address>::<module>::<name><...>`
    Struct(MoveType),
}

impl FromStr for TypeTag {
    type Err = AptosError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if PRIMITIVES.contains(&s) {
            return Ok(TypeTag::Primitive(s.to_string()));
        }
        if let Some(inner) = s.strip_prefix("vector<").and_then(|r| r.strip_suffix('>')) {
            return Ok(TypeTag::Vector(Box::new(inner.parse()?)));
        }
        if s.contains("::") {
            return Ok(TypeTag::Struct(s.parse()?));
        }
        Err(invalid(s, "unknown type"))
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Primitive(p) => write!(f, "{}", p),
            TypeTag::Vector(inner) => write!(f, "vector<{}>", inner),
            TypeTag::Struct(t) => write!(f, "{}", t),
        }
    }
}

impl Serialize for TypeTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypeTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A fully-qualified Move struct type such as a coin type or a resource type.
///
/// Equality and hashing use the parsed address; the literal as written is
/// kept for display only.
#[derive(Debug, Clone)]
pub struct MoveType {
    address: AccountAddress,
    address_literal: String,
    module: String,
    name: String,
    type_args: Vec<TypeTag>,
}

impl MoveType {
    /// The native coin `0x1::aptos_coin::AptosCoin`.
    pub fn aptos_coin() -> Self {
        Self::framework("aptos_coin", "AptosCoin", Vec::new())
    }

    /// A type published under the framework address `0x1`.
    pub fn framework(module: &str, name: &str, type_args: Vec<TypeTag>) -> Self {
        Self {
            address: AccountAddress::ONE,
            address_literal: "0x1".to_string(),
            module: module.to_string(),
            name: name.to_string(),
            type_args,
        }
    }

    /// `0x1::coin::CoinInfo<coin_type>`
    pub fn coin_info(coin_type: &MoveType) -> Self {
        Self::framework("coin", "CoinInfo", vec![TypeTag::Struct(coin_type.clone())])
    }

    /// `0x1::coin::CoinStore<coin_type>`
    pub fn coin_store(coin_type: &MoveType) -> Self {
        Self::framework("coin", "CoinStore", vec![TypeTag::Struct(coin_type.clone())])
    }

    /// The account that published the module (text before the first `::`).
    pub fn address(&self) -> AccountAddress {
        self.address
    }

    /// Module name
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Struct name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Generic type arguments
    pub fn type_args(&self) -> &[TypeTag] {
        &self.type_args
    }

    /// True for `0x1::aptos_coin::AptosCoin`.
    pub fn is_aptos_coin(&self) -> bool {
        self.address == AccountAddress::ONE
            && self.module == "aptos_coin"
            && self.name == "AptosCoin"
            && self.type_args.is_empty()
    }
}

impl PartialEq for MoveType {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
            && self.module == other.module
            && self.name == other.name
            && self.type_args == other.type_args
    }
}

impl Eq for MoveType {}

impl Hash for MoveType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address.hash(state);
        self.module.hash(state);
        self.name.hash(state);
        self.type_args.hash(state);
    }
}

impl FromStr for MoveType {
    type Err = AptosError;

    fn from_str(s: &str) -> Result<Self> {
        let input = s.trim();
        let (head, type_args) = match input.find('<') {
            Some(open) => {
                let inner = input[open + 1..]
                    .strip_suffix('>')
                    .ok_or_else(|| invalid(input, "missing closing '>'"))?;
                if inner.trim().is_empty() {
                    return Err(invalid(input, "empty type argument list"));
                }
                (&input[..open], split_type_args(input, inner)?)
            }
            None => (input, Vec::new()),
        };
        let (address, address_literal, module, name) = parse_path(input, head)?;
        Ok(Self {
            address,
            address_literal,
            module,
            name,
            type_args,
        })
    }
}

impl fmt::Display for MoveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.address_literal, self.module, self.name)?;
        if !self.type_args.is_empty() {
            let args: Vec<String> = self.type_args.iter().map(|t| t.to_string()).collect();
            write!(f, "<{}>", args.join(", "))?;
        }
        Ok(())
    }
}

impl Serialize for MoveType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MoveType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A callable entry function, `<address>::<module>::<function>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryFunctionId {
    address_literal: String,
    module: String,
    function: String,
}

impl EntryFunctionId {
    /// A function of the framework at `0x1`.
    pub fn framework(module: &str, function: &str) -> Self {
        Self {
            address_literal: "0x1".to_string(),
            module: module.to_string(),
            function: function.to_string(),
        }
    }

    /// Module name
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Function name
    pub fn function(&self) -> &str {
        &self.function
    }
}

impl FromStr for EntryFunctionId {
    type Err = AptosError;

    fn from_str(s: &str) -> Result<Self> {
        let input = s.trim();
        if input.contains('<') {
            return Err(invalid(input, "type arguments belong in the payload, not the function id"));
        }
        let (_, address_literal, module, function) = parse_path(input, input)?;
        Ok(Self {
            address_literal,
            module,
            function,
        })
    }
}

impl fmt::Display for EntryFunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.address_literal, self.module, self.function)
    }
}

impl Serialize for EntryFunctionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntryFunctionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
