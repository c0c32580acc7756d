//! Reconciliation and derived-metrics components
//!
//! - `derivation` - address type to derivation path
//! - `reconcile` - registry balance passes and locked-balance reclassification
//! - `channels` - channel lifecycle state
//! - `transactions` - per-address transaction summaries

pub mod channels;
pub mod derivation;
pub mod reconcile;
pub mod transactions;

pub use channels::{ChannelState, ChannelStateResolver};
pub use derivation::DerivationPathResolver;
pub use reconcile::{non_zero_balances, reclassify_imported, BalanceReconciler, BalanceSummary};
pub use transactions::{TransactionSummarizer, TransactionSummary, TxFlow};
