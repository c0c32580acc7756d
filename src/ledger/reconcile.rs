//! Balance reconciliation against the node's address listing
//!
//! Two passes with different scopes write into the registry:
//!
//! - `reconcile_existing` only updates balances of addresses already stored
//! - `refresh_non_zero` writes full records for every nonzero address of the
//!   default account, creating unseen ones
//!
//! Each upsert commits on its own. A failure part way leaves earlier writes
//! in place.
//!
//! `non_zero_balances` and `reclassify_imported` are read-only projections.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::LedgerError;
use crate::remote::{AccountWithAddresses, RemoteAddressEntry, WalletBalance};
use crate::storage::{AddressRecord, RecordStore};

/// Account whose addresses are mirrored into the registry
pub const DEFAULT_ACCOUNT: &str = "default";
/// Account holding externally originated funds
pub const IMPORTED_ACCOUNT: &str = "imported";

pub struct BalanceReconciler<'a, S: RecordStore + ?Sized> {
    registry: &'a S,
}

impl<'a, S: RecordStore + ?Sized> BalanceReconciler<'a, S> {
    pub fn new(registry: &'a S) -> Self {
        Self { registry }
    }

    /// Overwrite balances of locally known default-account addresses
    ///
    /// Addresses missing from the registry are skipped. An empty or
    /// unreadable registry fails the pass before any write. Returns the
    /// number of records rewritten; the first registry write failure aborts.
    pub fn reconcile_existing(&self, listing: &[AccountWithAddresses]) -> Result<usize, LedgerError> {
        log::info!("Updating registry balances from {} account(s)", listing.len());

        // Own each record so every key maps to its own entry
        let mut known: HashMap<String, AddressRecord> = self
            .registry
            .list_all()
            .map_err(|e| {
                log::warn!("Registry addresses unavailable: {}", e);
                e
            })?
            .into_iter()
            .map(|record| (record.address.clone(), record))
            .collect();

        let mut updated = 0;
        for account in default_accounts(listing) {
            for entry in &account.addresses {
                let Some(record) = known.get_mut(&entry.address) else {
                    continue;
                };
                record.balance = entry.balance;
                self.registry.upsert(record)?;
                updated += 1;
            }
        }

        log::info!(
            "Updated {} of {} registry address balance(s)",
            updated,
            known.len()
        );
        Ok(updated)
    }

    /// Store a full record for every nonzero default-account address
    ///
    /// Stops at the first write that cannot be confirmed and reports which
    /// address it was.
    pub fn refresh_non_zero(&self, listing: &[AccountWithAddresses]) -> Result<usize, LedgerError> {
        log::info!("Refreshing nonzero addresses from {} account(s)", listing.len());

        let mut written = 0;
        for account in default_accounts(listing) {
            for entry in account.addresses.iter().filter(|e| e.balance != 0) {
                let record = to_record(account, entry);
                self.registry.upsert(&record).map_err(|e| {
                    log::error!("Store address {} failed: {}", record.address, e);
                    LedgerError::reconciliation(
                        format!("store address {}", record.address),
                        e.to_string(),
                    )
                })?;
                written += 1;
            }
        }

        log::info!("Refreshed {} nonzero address(es)", written);
        Ok(written)
    }
}

fn default_accounts(listing: &[AccountWithAddresses]) -> impl Iterator<Item = &AccountWithAddresses> {
    listing.iter().filter(|account| account.name == DEFAULT_ACCOUNT)
}

fn to_record(account: &AccountWithAddresses, entry: &RemoteAddressEntry) -> AddressRecord {
    AddressRecord {
        name: account.name.clone(),
        address: entry.address.clone(),
        balance: entry.balance,
        address_type: account.address_type.clone(),
        derivation_path: account.derivation_path.clone(),
        is_internal: entry.is_internal,
    }
}

/// Every nonzero address across all accounts, annotated with its account
pub fn non_zero_balances(listing: &[AccountWithAddresses]) -> Vec<AddressRecord> {
    listing
        .iter()
        .flat_map(|account| {
            account
                .addresses
                .iter()
                .filter(|entry| entry.balance != 0)
                .map(move |entry| to_record(account, entry))
        })
        .collect()
}

/// Move the imported account's confirmed funds from confirmed to locked
pub fn reclassify_imported(mut balance: WalletBalance) -> WalletBalance {
    let imported = balance
        .account_balance
        .get(IMPORTED_ACCOUNT)
        .map(|account| account.confirmed_balance)
        .unwrap_or(0);

    if imported != 0 {
        log::debug!("Reclassifying {} sat imported balance as locked", imported);
        balance.confirmed_balance -= imported;
        balance.locked_balance += imported;
    }
    balance
}

/// Wallet balance as reported to callers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub total_balance: i64,
    pub confirmed_balance: i64,
    pub unconfirmed_balance: i64,
    pub locked_balance: i64,
}

impl From<&WalletBalance> for BalanceSummary {
    fn from(balance: &WalletBalance) -> Self {
        Self {
            total_balance: balance.total_balance,
            confirmed_balance: balance.confirmed_balance,
            unconfirmed_balance: balance.unconfirmed_balance,
            locked_balance: balance.locked_balance,
        }
    }
}
