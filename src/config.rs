/// Ledger configuration from environment variables
///
/// Controls the Bitcoin network context, registry location and the Esplora
/// endpoint used for transaction history. Defaults to Regtest.
use bitcoin::Network;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_DB_PATH: &str = "./ledger/addresses.db";
const DEFAULT_LOCK_TIMEOUT_MS: u64 = 1000;
const DEFAULT_MAX_FEE_RATE: u64 = 500;

#[derive(Clone, Debug)]
pub struct LedgerConfig {
    /// Network every operation is evaluated against
    pub network: Network,
    /// Address registry file
    pub db_path: PathBuf,
    /// Esplora API base URL
    pub esplora_url: String,
    /// Bounded wait for the registry's exclusive lock
    pub store_lock_timeout: Duration,
    /// Highest accepted fee rate in sat/vB
    pub max_fee_rate: u64,
}

impl LedgerConfig {
    /// Load configuration from environment variables (and `.env` if present)
    ///
    /// Environment variables:
    /// - `BITCOIN_NETWORK`: "mainnet", "testnet", "signet" or "regtest" (default)
    /// - `LEDGER_DB_PATH`: registry file (default `./ledger/addresses.db`)
    /// - `ESPLORA_URL`: Esplora API endpoint (optional, has per-network defaults)
    /// - `STORE_LOCK_TIMEOUT_MS`: registry lock wait (default 1000)
    /// - `MAX_FEE_RATE`: fee rate cap in sat/vB (default 500)
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let network = match env::var("BITCOIN_NETWORK") {
            Ok(value) => parse_network(&value).unwrap_or_else(|| {
                log::warn!("Unknown network '{}', defaulting to regtest", value);
                Network::Regtest
            }),
            Err(_) => Network::Regtest,
        };
        log::info!("Using {} network", network);

        let db_path = env::var("LEDGER_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DB_PATH));

        let esplora_url = env::var("ESPLORA_URL").unwrap_or_else(|_| default_esplora_url(network));
        log::info!("Esplora URL: {}", esplora_url);

        let store_lock_timeout = Duration::from_millis(parse_or(
            "STORE_LOCK_TIMEOUT_MS",
            DEFAULT_LOCK_TIMEOUT_MS,
        ));
        let max_fee_rate = parse_or("MAX_FEE_RATE", DEFAULT_MAX_FEE_RATE);

        Self {
            network,
            db_path,
            esplora_url,
            store_lock_timeout,
            max_fee_rate,
        }
    }

    /// Configuration for a given network with every other field defaulted
    pub fn for_network(network: Network) -> Self {
        Self {
            network,
            esplora_url: default_esplora_url(network),
            ..Default::default()
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            network: Network::Regtest,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            esplora_url: default_esplora_url(Network::Regtest),
            store_lock_timeout: Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS),
            max_fee_rate: DEFAULT_MAX_FEE_RATE,
        }
    }
}

/// Parse a network name as used in deployment configs
pub fn parse_network(value: &str) -> Option<Network> {
    match value.trim().to_lowercase().as_str() {
        "mainnet" | "bitcoin" => Some(Network::Bitcoin),
        "testnet" => Some(Network::Testnet),
        "signet" => Some(Network::Signet),
        "regtest" => Some(Network::Regtest),
        _ => None,
    }
}

/// Default Esplora endpoint for a network
pub fn default_esplora_url(network: Network) -> String {
    match network {
        Network::Bitcoin => "https://mempool.space/api".to_string(),
        Network::Testnet => "https://mempool.space/testnet/api".to_string(),
        Network::Signet => "https://mempool.space/signet/api".to_string(),
        _ => "http://localhost:3000".to_string(),
    }
}

fn parse_or(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Invalid {}='{}', using {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
