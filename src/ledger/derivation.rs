/// Address type -> derivation path lookup
///
/// Always answered from a fresh account listing, never from stored paths.
use crate::error::LedgerError;
use crate::remote::WalletNode;

/// Name used by callers for nested segwit
pub const NESTED_PUBKEY_HASH: &str = "NESTED_PUBKEY_HASH";
/// The node's account type name for nested segwit
pub const HYBRID_NESTED_WITNESS_PUBKEY_HASH: &str = "HYBRID_NESTED_WITNESS_PUBKEY_HASH";

pub struct DerivationPathResolver<'a, N: WalletNode + ?Sized> {
    node: &'a N,
}

impl<'a, N: WalletNode + ?Sized> DerivationPathResolver<'a, N> {
    pub fn new(node: &'a N) -> Self {
        Self { node }
    }

    /// Derivation path of the first account whose type matches `label`
    pub fn resolve(&self, label: &str) -> Result<String, LedgerError> {
        let accounts = self.node.list_accounts()?;
        let wanted = normalize_label(label);

        accounts
            .iter()
            .find(|account| account.address_type.as_str() == wanted)
            .map(|account| account.derivation_path.clone())
            .ok_or_else(|| {
                log::warn!("{} is not a valid address type", wanted);
                LedgerError::UnknownAddressType(wanted)
            })
    }
}

/// Uppercase the label and map the nested segwit alias
pub fn normalize_label(label: &str) -> String {
    let upper = label.to_uppercase();
    if upper == NESTED_PUBKEY_HASH {
        HYBRID_NESTED_WITNESS_PUBKEY_HASH.to_string()
    } else {
        upper
    }
}
