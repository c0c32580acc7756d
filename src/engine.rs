/// Ledger engine
///
/// Orchestrates the registry, the wallet node and the chain source. Every
/// public operation returns an `Envelope`; this is the only way failures
/// leave the crate.
use bitcoin::address::NetworkUnchecked;
use bitcoin::Address;
use serde::{Deserialize, Serialize};

use crate::config::LedgerConfig;
use crate::envelope::Envelope;
use crate::error::LedgerError;
use crate::ledger::channels::NO_FIND_CHANNEL;
use crate::ledger::{
    non_zero_balances, reclassify_imported, BalanceReconciler, BalanceSummary, ChannelState,
    ChannelStateResolver, DerivationPathResolver, TransactionSummarizer, TransactionSummary,
};
use crate::remote::{
    AccountDescriptor, AccountWithAddresses, AddressStats, ChainSource, EsploraClient,
    OpenChannel, WalletNode,
};
use crate::storage::{AddressRecord, AddressRegistry};

/// Outcome of a combined address sync
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Existing records whose balance was rewritten
    pub updated: usize,
    /// Nonzero default-account records written
    pub refreshed: usize,
}

pub struct LedgerEngine<N, C> {
    config: LedgerConfig,
    registry: AddressRegistry,
    node: N,
    chain: C,
}

impl<N: WalletNode> LedgerEngine<N, EsploraClient> {
    /// Engine reading chain data from the configured Esplora endpoint
    pub fn with_esplora(config: LedgerConfig, node: N) -> Self {
        let chain = EsploraClient::from_config(&config);
        Self::new(config, node, chain)
    }
}

impl<N: WalletNode, C: ChainSource> LedgerEngine<N, C> {
    pub fn new(config: LedgerConfig, node: N, chain: C) -> Self {
        let registry = AddressRegistry::from_config(&config);
        Self::with_registry(config, registry, node, chain)
    }

    pub fn with_registry(config: LedgerConfig, registry: AddressRegistry, node: N, chain: C) -> Self {
        log::debug!(
            "Ledger engine on {} with registry {:?}",
            config.network,
            registry.path()
        );
        Self {
            config,
            registry,
            node,
            chain,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn registry(&self) -> &AddressRegistry {
        &self.registry
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn chain(&self) -> &C {
        &self.chain
    }

    // ========================================================================
    // Registry
    // ========================================================================

    /// Store (or overwrite) an address record; returns the address
    pub fn store_address(&self, record: AddressRecord) -> Envelope<String> {
        self.registry
            .upsert(&record)
            .map(|()| record.address)
            .map_err(LedgerError::from)
            .into()
    }

    /// Remove a stored address; returns the address
    pub fn remove_address(&self, address: &str) -> Envelope<String> {
        self.registry
            .delete(address)
            .map(|()| address.to_string())
            .map_err(LedgerError::from)
            .into()
    }

    pub fn query_address(&self, address: &str) -> Envelope<AddressRecord> {
        self.registry.get(address).map_err(LedgerError::from).into()
    }

    pub fn query_all_addresses(&self) -> Envelope<Vec<AddressRecord>> {
        self.registry.list_all().map_err(LedgerError::from).into()
    }

    // ========================================================================
    // Accounts and reconciliation
    // ========================================================================

    pub fn list_accounts(&self) -> Envelope<Vec<AccountDescriptor>> {
        self.accounts().into()
    }

    fn accounts(&self) -> Result<Vec<AccountDescriptor>, LedgerError> {
        let accounts = self.node.list_accounts()?;
        if accounts.is_empty() {
            return Err(LedgerError::EmptyResult("get all accounts fail.".to_string()));
        }
        Ok(accounts)
    }

    /// Derivation path for an address type label
    pub fn derivation_path(&self, address_type: &str) -> Envelope<String> {
        DerivationPathResolver::new(&self.node)
            .resolve(address_type)
            .into()
    }

    /// Nonzero addresses across every account
    pub fn non_zero_balances(&self) -> Envelope<Vec<AddressRecord>> {
        self.address_listing()
            .map(|listing| non_zero_balances(&listing))
            .into()
    }

    /// Update balances of addresses already in the registry; returns the count
    pub fn reconcile_existing(&self) -> Envelope<usize> {
        self.address_listing()
            .and_then(|listing| BalanceReconciler::new(&self.registry).reconcile_existing(&listing))
            .into()
    }

    /// Write every nonzero default-account address; returns the count
    pub fn refresh_non_zero(&self) -> Envelope<usize> {
        self.address_listing()
            .and_then(|listing| BalanceReconciler::new(&self.registry).refresh_non_zero(&listing))
            .into()
    }

    /// Run both passes against one listing
    ///
    /// An empty registry fails Pass A, so nothing is written.
    pub fn sync_addresses(&self) -> Envelope<SyncReport> {
        self.sync().into()
    }

    fn sync(&self) -> Result<SyncReport, LedgerError> {
        let listing = self.address_listing()?;
        let reconciler = BalanceReconciler::new(&self.registry);

        log::info!("Syncing registry against {} account(s)", listing.len());
        let updated = reconciler.reconcile_existing(&listing)?;
        let refreshed = reconciler.refresh_non_zero(&listing)?;

        Ok(SyncReport { updated, refreshed })
    }

    fn address_listing(&self) -> Result<Vec<AccountWithAddresses>, LedgerError> {
        let listing = self.node.list_addresses()?;
        if listing.is_empty() {
            return Err(LedgerError::EmptyResult(
                "Queried non-zero balance addresses NULL.".to_string(),
            ));
        }
        Ok(listing)
    }

    /// Wallet balance with imported funds reported as locked
    pub fn wallet_balance(&self) -> Envelope<BalanceSummary> {
        self.node
            .wallet_balance()
            .map(|balance| BalanceSummary::from(&reclassify_imported(balance)))
            .into()
    }

    // ========================================================================
    // Channels
    // ========================================================================

    /// Channel lifecycle state; an unknown channel is a `NotFound` failure
    pub fn channel_state(&self, channel_point: &str) -> Envelope<ChannelState> {
        ChannelStateResolver::new(&self.node)
            .resolve(channel_point)
            .and_then(|state| match state {
                ChannelState::NotFound => Err(LedgerError::NotFound(NO_FIND_CHANNEL.to_string())),
                found => Ok(found),
            })
            .into()
    }

    pub fn channel_info(&self, channel_point: &str) -> Envelope<OpenChannel> {
        ChannelStateResolver::new(&self.node)
            .info(channel_point)
            .into()
    }

    // ========================================================================
    // Chain data
    // ========================================================================

    pub fn address_transactions(&self, address: &str) -> Envelope<Vec<TransactionSummary>> {
        self.validate_address(address)
            .and_then(|()| TransactionSummarizer::for_address(&self.chain, address))
            .into()
    }

    pub fn address_info(&self, address: &str) -> Envelope<AddressStats> {
        self.validate_address(address)
            .and_then(|()| self.chain.address_stats(address))
            .into()
    }

    /// Accept a fee rate (sat/vB) no higher than the configured cap
    pub fn check_fee_rate(&self, sat_per_vbyte: u64) -> Envelope<u64> {
        let checked = if sat_per_vbyte > self.config.max_fee_rate {
            Err(LedgerError::Validation(format!(
                "fee rate exceeds max({})",
                self.config.max_fee_rate
            )))
        } else {
            Ok(sat_per_vbyte)
        };
        checked.into()
    }

    fn validate_address(&self, address: &str) -> Result<(), LedgerError> {
        let unchecked: Address<NetworkUnchecked> = address
            .parse()
            .map_err(|e| LedgerError::Validation(format!("invalid address {}: {}", address, e)))?;
        unchecked.require_network(self.config.network).map_err(|e| {
            LedgerError::Validation(format!(
                "address {} is not valid on {}: {}",
                address, self.config.network, e
            ))
        })?;
        Ok(())
    }
}
