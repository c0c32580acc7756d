use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

use super::types::{AddressStats, TransactionRecord};
use super::ChainSource;
use crate::config::LedgerConfig;
use crate::error::LedgerError;

/// Blocking Esplora API client
pub struct EsploraClient {
    client: Client,
    base_url: String,
}

impl EsploraClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
        }
    }

    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::new(config.esplora_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get_text(&self, path: &str) -> Result<String, LedgerError> {
        let url = self.url(path);
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| LedgerError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LedgerError::transport(format!("{} returned {}", url, status)));
        }

        response
            .text()
            .map_err(|e| LedgerError::transport(e.to_string()))
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, LedgerError> {
        let body = self.get_text(path)?;
        decode(&body)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, LedgerError> {
    serde_json::from_str(body)
        .map_err(|e| LedgerError::transport(format!("Unmarshal response body fail: {}", e)))
}

fn parse_height(body: &str) -> Result<u64, LedgerError> {
    body.trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| LedgerError::transport(e.to_string()))
}

impl ChainSource for EsploraClient {
    fn address_transactions(&self, address: &str) -> Result<Vec<TransactionRecord>, LedgerError> {
        self.get_json(&format!("address/{}/txs", address))
    }

    fn tip_height(&self) -> Result<u64, LedgerError> {
        let body = self.get_text("blocks/tip/height")?;
        parse_height(&body)
    }

    fn address_stats(&self, address: &str) -> Result<AddressStats, LedgerError> {
        self.get_json(&format!("address/{}", address))
    }
}
