//! Data models for the address registry

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Script kind of a wallet account, using the node's account type names
///
/// Names the node reports that are not listed here are kept verbatim in
/// `Other`, so they round-trip through the registry unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AddressType {
    WitnessPubkeyHash,
    NestedWitnessPubkeyHash,
    HybridNestedWitnessPubkeyHash,
    TaprootPubkey,
    Other(String),
}

impl AddressType {
    pub fn as_str(&self) -> &str {
        match self {
            AddressType::WitnessPubkeyHash => "WITNESS_PUBKEY_HASH",
            AddressType::NestedWitnessPubkeyHash => "NESTED_WITNESS_PUBKEY_HASH",
            AddressType::HybridNestedWitnessPubkeyHash => "HYBRID_NESTED_WITNESS_PUBKEY_HASH",
            AddressType::TaprootPubkey => "TAPROOT_PUBKEY",
            AddressType::Other(name) => name,
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for AddressType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "WITNESS_PUBKEY_HASH" => AddressType::WitnessPubkeyHash,
            "NESTED_WITNESS_PUBKEY_HASH" => AddressType::NestedWitnessPubkeyHash,
            "HYBRID_NESTED_WITNESS_PUBKEY_HASH" => AddressType::HybridNestedWitnessPubkeyHash,
            "TAPROOT_PUBKEY" => AddressType::TaprootPubkey,
            _ => AddressType::Other(name),
        }
    }
}

impl From<&str> for AddressType {
    fn from(name: &str) -> Self {
        Self::from(name.to_string())
    }
}

impl From<AddressType> for String {
    fn from(kind: AddressType) -> Self {
        match kind {
            AddressType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for AddressType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

/// One persisted address, keyed by `address`
///
/// Always written whole; there are no partial updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// Account label
    pub name: String,
    pub address: String,
    /// Balance in satoshis
    pub balance: i64,
    pub address_type: AddressType,
    pub derivation_path: String,
    /// Change/internal address
    pub is_internal: bool,
}
