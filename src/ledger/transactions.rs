/// Per-address transaction summaries
///
/// Reduces Esplora transaction history to net balance effect, fee rate
/// (sat/vB) and confirmation depth for one address.
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::remote::{ChainSource, TransactionRecord, TxOutput};

/// Address and value of one input or output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxFlow {
    #[serde(rename = "scriptpubkey_address")]
    pub address: String,
    pub value: u64,
}

impl From<&TxOutput> for TxFlow {
    fn from(output: &TxOutput) -> Self {
        Self {
            address: output.scriptpubkey_address.clone().unwrap_or_default(),
            value: output.value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub txid: String,
    pub vin: Vec<TxFlow>,
    pub vout: Vec<TxFlow>,
    pub block_time: u64,
    /// Net effect on the address: positive received, negative spent
    #[serde(rename = "balance_result")]
    pub balance_effect: i64,
    pub fee_rate: f64,
    pub fee: u64,
    pub confirmed_blocks: u64,
}

pub struct TransactionSummarizer {
    tip_height: u64,
}

impl TransactionSummarizer {
    /// `tip_height` of `0` means the tip is unknown
    pub fn new(tip_height: u64) -> Self {
        Self { tip_height }
    }

    /// Fetch and summarize the history of `address`
    ///
    /// A failed tip lookup is logged and treated as unknown.
    pub fn for_address<C: ChainSource + ?Sized>(
        chain: &C,
        address: &str,
    ) -> Result<Vec<TransactionSummary>, LedgerError> {
        let transactions = chain.address_transactions(address)?;
        let tip_height = chain.tip_height().unwrap_or_else(|e| {
            log::warn!("Tip height lookup failed, reporting zero confirmations: {}", e);
            0
        });
        Ok(Self::new(tip_height).summarize(address, &transactions))
    }

    pub fn summarize(&self, address: &str, transactions: &[TransactionRecord]) -> Vec<TransactionSummary> {
        if self.tip_height == 0 {
            log::warn!("block height is zero");
        }
        transactions
            .iter()
            .map(|tx| self.summarize_one(address, tx))
            .collect()
    }

    fn summarize_one(&self, address: &str, tx: &TransactionRecord) -> TransactionSummary {
        let vin: Vec<TxFlow> = tx
            .vin
            .iter()
            .map(|input| input.prevout.as_ref().map(TxFlow::from).unwrap_or(TxFlow {
                address: String::new(),
                value: 0,
            }))
            .collect();
        let vout: Vec<TxFlow> = tx.vout.iter().map(TxFlow::from).collect();

        let received: i64 = vout
            .iter()
            .filter(|flow| flow.address == address)
            .map(|flow| flow.value as i64)
            .sum();
        let spent: i64 = vin
            .iter()
            .filter(|flow| flow.address == address)
            .map(|flow| flow.value as i64)
            .sum();

        TransactionSummary {
            txid: tx.txid.clone(),
            vin,
            vout,
            block_time: tx.status.block_time.unwrap_or(0),
            balance_effect: received - spent,
            fee_rate: fee_rate(tx.fee, tx.weight),
            fee: tx.fee,
            confirmed_blocks: confirmed_blocks(self.tip_height, tx.status.block_height),
        }
    }
}

/// Fee per virtual byte (weight / 4), rounded to two decimals
pub fn fee_rate(fee: u64, weight: u64) -> f64 {
    if weight == 0 {
        return 0.0;
    }
    round_to(fee as f64 / (weight as f64 / 4.0), 2)
}

/// Blocks between the tip and the transaction's block; `0` when either is unknown
pub fn confirmed_blocks(tip_height: u64, block_height: Option<u64>) -> u64 {
    match block_height {
        Some(height) if tip_height != 0 => tip_height.saturating_sub(height),
        _ => 0,
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
