/// Remote response types
///
/// Node listings use the wallet node's JSON field names; transaction and
/// address types match the Esplora API format.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::storage::AddressType;

// ============================================================================
// Accounts and addresses
// ============================================================================

/// Wallet account as reported by "list accounts"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDescriptor {
    pub name: String,
    pub address_type: AddressType,
    pub extended_public_key: String,
    pub derivation_path: String,
}

/// One account with its addresses, from "list addresses by account"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountWithAddresses {
    pub name: String,
    pub address_type: AddressType,
    pub derivation_path: String,
    #[serde(default)]
    pub addresses: Vec<RemoteAddressEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAddressEntry {
    pub address: String,
    #[serde(default)]
    pub is_internal: bool,
    /// Balance in satoshis
    #[serde(default)]
    pub balance: i64,
}

// ============================================================================
// Wallet balance
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    #[serde(default)]
    pub confirmed_balance: i64,
    #[serde(default)]
    pub unconfirmed_balance: i64,
}

/// Wallet-level balance summary with the per-account breakdown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletBalance {
    pub total_balance: i64,
    pub confirmed_balance: i64,
    pub unconfirmed_balance: i64,
    #[serde(default)]
    pub locked_balance: i64,
    #[serde(default)]
    pub account_balance: BTreeMap<String, AccountBalance>,
}

// ============================================================================
// Channels
// ============================================================================

/// Open channel descriptor from "list channels"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenChannel {
    pub channel_point: String,
    pub active: bool,
    #[serde(default)]
    pub remote_pubkey: String,
    #[serde(default)]
    pub chan_id: u64,
    #[serde(default)]
    pub capacity: i64,
    #[serde(default)]
    pub local_balance: i64,
    #[serde(default)]
    pub remote_balance: i64,
    #[serde(default)]
    pub total_satoshis_sent: i64,
    #[serde(default)]
    pub total_satoshis_received: i64,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub initiator: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingChannel {
    pub channel_point: String,
    #[serde(default)]
    pub remote_node_pub: String,
    #[serde(default)]
    pub capacity: i64,
    #[serde(default)]
    pub local_balance: i64,
    #[serde(default)]
    pub remote_balance: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOpenChannel {
    pub channel: PendingChannel,
    #[serde(default)]
    pub commit_fee: i64,
    #[serde(default)]
    pub funding_expiry_blocks: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingCloseChannel {
    pub channel: PendingChannel,
    #[serde(default)]
    pub limbo_balance: i64,
    #[serde(default)]
    pub closing_txid: String,
}

/// Result of "pending channels": both sublists from one call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingChannels {
    #[serde(default)]
    pub total_limbo_balance: i64,
    #[serde(default)]
    pub pending_open_channels: Vec<PendingOpenChannel>,
    #[serde(default)]
    pub waiting_close_channels: Vec<WaitingCloseChannel>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedChannel {
    pub channel_point: String,
    #[serde(default)]
    pub chan_id: u64,
    #[serde(default)]
    pub remote_pubkey: String,
    #[serde(default)]
    pub capacity: i64,
    #[serde(default)]
    pub close_height: u32,
    #[serde(default)]
    pub settled_balance: i64,
    #[serde(default)]
    pub closing_tx_hash: String,
    #[serde(default)]
    pub close_type: String,
}

// ============================================================================
// Esplora transactions and address statistics
// ============================================================================

/// Transaction from /address/{address}/txs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub txid: String,
    #[serde(default)]
    pub version: i32,
    #[serde(default)]
    pub locktime: u32,
    pub vin: Vec<TxInput>,
    pub vout: Vec<TxOutput>,
    #[serde(default)]
    pub size: u64,
    pub weight: u64,
    pub fee: u64,
    pub status: TxStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxInput {
    pub txid: String,
    pub vout: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prevout: Option<TxOutput>,
    #[serde(default)]
    pub scriptsig: String,
    #[serde(default)]
    pub scriptsig_asm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub witness: Option<Vec<String>>,
    #[serde(default)]
    pub is_coinbase: bool,
    #[serde(default)]
    pub sequence: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxOutput {
    #[serde(default)]
    pub scriptpubkey: String,
    #[serde(default)]
    pub scriptpubkey_asm: String,
    #[serde(default)]
    pub scriptpubkey_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scriptpubkey_address: Option<String>,
    pub value: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TxStatus {
    pub confirmed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_height: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_time: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxoStats {
    pub funded_txo_count: u64,
    pub funded_txo_sum: u64,
    pub spent_txo_count: u64,
    pub spent_txo_sum: u64,
    pub tx_count: u64,
}

/// Address summary from /address/{address}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressStats {
    pub address: String,
    pub chain_stats: TxoStats,
    pub mempool_stats: TxoStats,
}

impl AddressStats {
    pub fn confirmed_balance(&self) -> u64 {
        self.chain_stats
            .funded_txo_sum
            .saturating_sub(self.chain_stats.spent_txo_sum)
    }

    pub fn unconfirmed_balance(&self) -> u64 {
        self.mempool_stats
            .funded_txo_sum
            .saturating_sub(self.mempool_stats.spent_txo_sum)
    }
}
