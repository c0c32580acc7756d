//! Wallet Ledger: local address registry reconciled against a wallet node
//!
//! This crate keeps a persistent registry of wallet addresses and balances,
//! reconciles it against the Lightning/wallet node's address listing, and
//! derives channel state and per-address transaction summaries from the
//! node and an Esplora chain source.
//!
//! # Architecture
//!
//! - **Address Registry**: JSON bucket store guarded by an exclusive file lock
//! - **Wallet Node**: account, address, balance and channel listings
//! - **Chain Source**: Esplora transaction history and chain tip
//! - **Ledger Engine**: every operation, reported through an `Envelope`
//!
//! # Example
//!
//! ```ignore
//! use wallet_ledger::{LedgerConfig, LedgerEngine};
//!
//! let config = LedgerConfig::from_env();
//! let engine = LedgerEngine::with_esplora(config, node);
//!
//! let report = engine.sync_addresses();
//! println!("{}", report.to_json()?);
//! ```

// Public modules
pub mod config;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod ledger;
pub mod remote;
pub mod storage;

// Re-exports for convenience
pub use config::LedgerConfig;
pub use engine::{LedgerEngine, SyncReport};
pub use envelope::Envelope;
pub use error::{ErrorCode, LedgerError, StorageError};
pub use ledger::{BalanceSummary, ChannelState, TransactionSummary, TxFlow};
pub use remote::{ChainSource, EsploraClient, WalletNode};
pub use storage::{AddressRecord, AddressRegistry, AddressType, RecordStore};

// Common result type
pub type Result<T> = std::result::Result<T, LedgerError>;
