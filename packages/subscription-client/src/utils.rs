//! Presentation helpers. Nothing here feeds back into a transaction.

use alloy_primitives::{utils, Address, U256};

use crate::types::errors::{ClientError, Result};

/// Wei to a trimmed decimal ether string ("1.5", "0.0"). Display only.
pub fn format_ether(amount: U256) -> String {
    let formatted = utils::format_ether(amount);
    match formatted.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                format!("{whole}.0")
            } else {
                format!("{whole}.{fraction}")
            }
        }
        None => formatted,
    }
}

/// Decimal ether string (user input) to wei.
pub fn parse_ether(amount: &str) -> Result<U256> {
    utils::parse_ether(amount.trim())
        .map_err(|e| ClientError::InvalidInput(format!("invalid ether amount {amount:?}: {e}")))
}

/// `0x1234...abcd`
pub fn shorten_address(address: &Address) -> String {
    let full = address.to_string();
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// URI under which uploaded content is referenced on chain.
pub fn ipfs_uri(cid: &str) -> String {
    format!("ipfs://{}", cid.trim_start_matches("ipfs://"))
}

/// Rewrites content-addressed URIs onto an HTTP gateway. HTTP(S) URIs pass
/// through; anything else is treated as a bare CID.
pub fn gateway_url(uri: &str, gateway: &str) -> String {
    let uri = uri.trim();
    if uri.starts_with("http://") || uri.starts_with("https://") {
        return uri.to_string();
    }
    let cid = uri
        .strip_prefix("ipfs://")
        .map(|rest| rest.trim_start_matches("ipfs/"))
        .unwrap_or(uri);
    format!("{}/{}", gateway.trim_end_matches('/'), cid)
}
