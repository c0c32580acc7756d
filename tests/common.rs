//! Common test utilities for ledger integration tests
//!
//! - In-memory wallet node and chain source with call counters
//! - Per-call failure injection, including a registry that fails its n-th write
//! - Temp-dir backed registry and engine setup
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::io;
use std::time::Duration;

use bitcoin::Network;
use tempfile::TempDir;
use wallet_ledger::remote::{
    AccountDescriptor, AccountWithAddresses, AddressStats, ClosedChannel, OpenChannel,
    PendingChannel, PendingChannels, PendingOpenChannel, RemoteAddressEntry, TransactionRecord,
    TxOutput, TxStatus, WaitingCloseChannel, WalletBalance,
};
use wallet_ledger::{
    AddressRecord, AddressRegistry, AddressType, ChainSource, LedgerConfig, LedgerEngine,
    LedgerError, RecordStore, StorageError, WalletNode,
};

pub fn init_logging() {
    env_logger::builder().is_test(true).try_init().ok();
}

// ============================================================================
// Wallet node
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCall {
    ListAccounts,
    ListAddresses,
    WalletBalance,
    ListChannels,
    PendingChannels,
    ClosedChannels,
}

#[derive(Default)]
pub struct FakeNode {
    pub accounts: Vec<AccountDescriptor>,
    pub listing: Vec<AccountWithAddresses>,
    pub balance: WalletBalance,
    pub open: Vec<OpenChannel>,
    pub pending: PendingChannels,
    pub closed: Vec<ClosedChannel>,
    failing: HashSet<NodeCall>,
    calls: RefCell<HashMap<NodeCall, usize>>,
}

impl FakeNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `call` fail with a transport error
    pub fn failing_on(mut self, call: NodeCall) -> Self {
        self.failing.insert(call);
        self
    }

    pub fn calls(&self, call: NodeCall) -> usize {
        self.calls.borrow().get(&call).copied().unwrap_or(0)
    }

    fn enter(&self, call: NodeCall) -> Result<(), LedgerError> {
        *self.calls.borrow_mut().entry(call).or_default() += 1;
        if self.failing.contains(&call) {
            return Err(LedgerError::transport(format!("{:?} unavailable", call)));
        }
        Ok(())
    }
}

impl WalletNode for FakeNode {
    fn list_accounts(&self) -> Result<Vec<AccountDescriptor>, LedgerError> {
        self.enter(NodeCall::ListAccounts)?;
        Ok(self.accounts.clone())
    }

    fn list_addresses(&self) -> Result<Vec<AccountWithAddresses>, LedgerError> {
        self.enter(NodeCall::ListAddresses)?;
        Ok(self.listing.clone())
    }

    fn wallet_balance(&self) -> Result<WalletBalance, LedgerError> {
        self.enter(NodeCall::WalletBalance)?;
        Ok(self.balance.clone())
    }

    fn list_channels(&self) -> Result<Vec<OpenChannel>, LedgerError> {
        self.enter(NodeCall::ListChannels)?;
        Ok(self.open.clone())
    }

    fn pending_channels(&self) -> Result<PendingChannels, LedgerError> {
        self.enter(NodeCall::PendingChannels)?;
        Ok(self.pending.clone())
    }

    fn closed_channels(&self) -> Result<Vec<ClosedChannel>, LedgerError> {
        self.enter(NodeCall::ClosedChannels)?;
        Ok(self.closed.clone())
    }
}

// ============================================================================
// Chain source
// ============================================================================

#[derive(Default)]
pub struct FakeChain {
    pub transactions: Vec<TransactionRecord>,
    /// `None` makes the tip lookup fail
    pub tip: Option<u64>,
    pub stats: Option<AddressStats>,
    pub fail_transactions: bool,
    requested: RefCell<Vec<String>>,
}

impl FakeChain {
    pub fn with_tip(tip: u64) -> Self {
        Self {
            tip: Some(tip),
            ..Default::default()
        }
    }

    /// Addresses the chain was asked about, in order
    pub fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

impl ChainSource for FakeChain {
    fn address_transactions(&self, address: &str) -> Result<Vec<TransactionRecord>, LedgerError> {
        self.requested.borrow_mut().push(address.to_string());
        if self.fail_transactions {
            return Err(LedgerError::transport("explorer returned 503"));
        }
        Ok(self.transactions.clone())
    }

    fn tip_height(&self) -> Result<u64, LedgerError> {
        self.tip
            .ok_or_else(|| LedgerError::transport("tip height unavailable"))
    }

    fn address_stats(&self, address: &str) -> Result<AddressStats, LedgerError> {
        self.requested.borrow_mut().push(address.to_string());
        self.stats
            .clone()
            .ok_or_else(|| LedgerError::transport("address stats unavailable"))
    }
}

// ============================================================================
// Registry with an injected write failure
// ============================================================================

/// Registry wrapper whose `fail_at`-th upsert (1-based) fails
pub struct FailingStore<'a> {
    inner: &'a AddressRegistry,
    fail_at: usize,
    attempts: Cell<usize>,
}

impl<'a> FailingStore<'a> {
    pub fn new(inner: &'a AddressRegistry, fail_at: usize) -> Self {
        Self {
            inner,
            fail_at,
            attempts: Cell::new(0),
        }
    }

    /// Upserts attempted so far, including the failed one
    pub fn attempts(&self) -> usize {
        self.attempts.get()
    }
}

impl RecordStore for FailingStore<'_> {
    fn upsert(&self, record: &AddressRecord) -> Result<(), StorageError> {
        let attempt = self.attempts.get() + 1;
        self.attempts.set(attempt);
        if attempt == self.fail_at {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::Other,
                "no space left on device",
            )));
        }
        self.inner.upsert(record)
    }

    fn list_all(&self) -> Result<Vec<AddressRecord>, StorageError> {
        self.inner.list_all()
    }
}

// ============================================================================
// Environment
// ============================================================================

/// Temp-dir registry location, removed on drop
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub config: LedgerConfig,
}

impl TestEnvironment {
    pub fn new() -> anyhow::Result<Self> {
        Self::for_network(Network::Regtest)
    }

    pub fn for_network(network: Network) -> anyhow::Result<Self> {
        init_logging();
        let temp_dir = TempDir::new()?;
        log::info!("Test directory: {:?}", temp_dir.path());

        let mut config = LedgerConfig::for_network(network);
        config.db_path = temp_dir.path().join("ledger").join("addresses.db");
        config.store_lock_timeout = Duration::from_millis(200);

        Ok(Self { temp_dir, config })
    }

    pub fn registry(&self) -> AddressRegistry {
        AddressRegistry::from_config(&self.config)
    }

    pub fn engine(&self, node: FakeNode, chain: FakeChain) -> LedgerEngine<FakeNode, FakeChain> {
        LedgerEngine::new(self.config.clone(), node, chain)
    }
}

// ============================================================================
// Builders
// ============================================================================

pub fn record(name: &str, address: &str, balance: i64) -> AddressRecord {
    AddressRecord {
        name: name.to_string(),
        address: address.to_string(),
        balance,
        address_type: AddressType::TaprootPubkey,
        derivation_path: "m/86'/1'/0'".to_string(),
        is_internal: false,
    }
}

pub fn descriptor(name: &str, address_type: AddressType, derivation_path: &str) -> AccountDescriptor {
    AccountDescriptor {
        name: name.to_string(),
        address_type,
        extended_public_key: format!("tpub-{}", name),
        derivation_path: derivation_path.to_string(),
    }
}

pub fn account(
    name: &str,
    address_type: AddressType,
    derivation_path: &str,
    addresses: &[(&str, i64)],
) -> AccountWithAddresses {
    AccountWithAddresses {
        name: name.to_string(),
        address_type,
        derivation_path: derivation_path.to_string(),
        addresses: addresses
            .iter()
            .map(|(address, balance)| RemoteAddressEntry {
                address: address.to_string(),
                is_internal: false,
                balance: *balance,
            })
            .collect(),
    }
}

pub fn open_channel(channel_point: &str, active: bool) -> OpenChannel {
    OpenChannel {
        channel_point: channel_point.to_string(),
        active,
        capacity: 1_000_000,
        local_balance: 600_000,
        remote_balance: 400_000,
        ..Default::default()
    }
}

pub fn pending_open(channel_point: &str) -> PendingOpenChannel {
    PendingOpenChannel {
        channel: PendingChannel {
            channel_point: channel_point.to_string(),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn waiting_close(channel_point: &str) -> WaitingCloseChannel {
    WaitingCloseChannel {
        channel: PendingChannel {
            channel_point: channel_point.to_string(),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn closed_channel(channel_point: &str) -> ClosedChannel {
    ClosedChannel {
        channel_point: channel_point.to_string(),
        ..Default::default()
    }
}

pub fn output(address: &str, value: u64) -> TxOutput {
    TxOutput {
        scriptpubkey: String::new(),
        scriptpubkey_asm: String::new(),
        scriptpubkey_type: "v0_p2wpkh".to_string(),
        scriptpubkey_address: Some(address.to_string()),
        value,
    }
}

/// Transaction paying `outputs`, spending `inputs` (as prevouts)
pub fn transaction(
    txid: &str,
    inputs: &[(&str, u64)],
    outputs: &[(&str, u64)],
    fee: u64,
    weight: u64,
    block_height: Option<u64>,
) -> TransactionRecord {
    TransactionRecord {
        txid: txid.to_string(),
        version: 2,
        locktime: 0,
        vin: inputs
            .iter()
            .enumerate()
            .map(|(n, (address, value))| wallet_ledger::remote::TxInput {
                txid: format!("{:064x}", n),
                vout: n as u32,
                prevout: Some(output(address, *value)),
                scriptsig: String::new(),
                scriptsig_asm: String::new(),
                witness: None,
                is_coinbase: false,
                sequence: 0xffff_fffd,
            })
            .collect(),
        vout: outputs
            .iter()
            .map(|(address, value)| output(address, *value))
            .collect(),
        size: weight / 4,
        weight,
        fee,
        status: TxStatus {
            confirmed: block_height.is_some(),
            block_height,
            block_hash: None,
            block_time: block_height.map(|_| 1_700_000_000),
        },
    }
}
