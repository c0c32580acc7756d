//! Remote collaborators
//!
//! - `WalletNode`: the Lightning/wallet node listings the engine reconciles against
//! - `ChainSource`: transaction history and chain tip (Esplora)
//!
//! Every call is a blocking request/response. Transport failures surface as
//! `LedgerError::Transport` and are never retried here.

pub mod esplora;
pub mod types;

pub use esplora::EsploraClient;
pub use types::*;

use crate::error::LedgerError;

/// Wallet node listings consumed by the ledger
pub trait WalletNode {
    /// Accounts in the order the node reports them
    fn list_accounts(&self) -> Result<Vec<AccountDescriptor>, LedgerError>;

    /// Every account with its addresses and balances
    fn list_addresses(&self) -> Result<Vec<AccountWithAddresses>, LedgerError>;

    fn wallet_balance(&self) -> Result<WalletBalance, LedgerError>;

    fn list_channels(&self) -> Result<Vec<OpenChannel>, LedgerError>;

    /// Pending-open and waiting-close channels from a single call
    fn pending_channels(&self) -> Result<PendingChannels, LedgerError>;

    fn closed_channels(&self) -> Result<Vec<ClosedChannel>, LedgerError>;
}

/// Chain data for a single address
pub trait ChainSource {
    fn address_transactions(&self, address: &str) -> Result<Vec<TransactionRecord>, LedgerError>;

    /// Current tip height; `0` means unknown
    fn tip_height(&self) -> Result<u64, LedgerError>;

    fn address_stats(&self, address: &str) -> Result<AddressStats, LedgerError>;
}
