use std::time::Duration;

use alloy_sol_types::{Revert, SolError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// EIP-1193 "user rejected request".
pub const USER_REJECTED_CODE: i64 = 4001;
/// JSON-RPC code nodes use for `execution reverted`.
pub const EXECUTION_REVERTED_CODE: i64 = 3;
/// JSON-RPC internal error, also used for transport failures.
pub const INTERNAL_ERROR_CODE: i64 = -32603;
/// JSON-RPC method not found.
pub const METHOD_NOT_FOUND_CODE: i64 = -32601;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("no wallet provider available")]
    WalletNotFound,

    #[error("wallet request rejected by user")]
    UserRejected,

    #[error("chain {chain_id} is not supported")]
    UnsupportedChain { chain_id: u64 },

    #[error("rejected by chain: {reason}")]
    ChainRejected { reason: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("metadata unavailable for {uri}: {message}")]
    MetadataUnavailable { uri: String, message: String },

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("wallet not connected")]
    NotConnected,

    #[error("provider error {code}: {message}")]
    Provider { code: i64, message: String },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = core::result::Result<T, ClientError>;

impl ClientError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        ClientError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Transient failures a read may be retried on. Reverts, rejections and
    /// missing entities are final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Provider { .. } | ClientError::Timeout(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }

    /// Session-level failures are shown as a banner rather than per action.
    pub fn is_session_level(&self) -> bool {
        matches!(
            self,
            ClientError::WalletNotFound
                | ClientError::UserRejected
                | ClientError::UnsupportedChain { .. }
        )
    }
}

/// Error object returned by a wallet provider or JSON-RPC node.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ProviderError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(INTERNAL_ERROR_CODE, message)
    }

    pub fn user_rejected() -> Self {
        Self::new(USER_REJECTED_CODE, "User rejected the request.")
    }

    pub fn is_revert(&self) -> bool {
        self.code == EXECUTION_REVERTED_CODE || self.message.contains("revert")
    }

    /// Best effort revert reason: the ABI-encoded `Error(string)` payload if
    /// the node returned one, otherwise the node's message.
    pub fn revert_reason(&self) -> String {
        if let Some(bytes) = self.revert_data() {
            if let Ok(revert) = Revert::abi_decode(&bytes, true) {
                return revert.reason;
            }
            if let Some(reason) = alloy_sol_types::decode_revert_reason(&bytes) {
                return reason;
            }
        }
        self.message
            .strip_prefix("execution reverted: ")
            .unwrap_or(&self.message)
            .to_string()
    }

    fn revert_data(&self) -> Option<Vec<u8>> {
        let raw = match self.data.as_ref()? {
            Value::String(s) => s.as_str(),
            Value::Object(map) => map.get("data")?.as_str()?,
            _ => return None,
        };
        hex::decode(raw.trim_start_matches("0x")).ok()
    }
}

impl From<ProviderError> for ClientError {
    fn from(err: ProviderError) -> Self {
        if err.code == USER_REJECTED_CODE {
            ClientError::UserRejected
        } else if err.is_revert() {
            ClientError::ChainRejected {
                reason: err.revert_reason(),
            }
        } else {
            ClientError::Provider {
                code: err.code,
                message: err.message,
            }
        }
    }
}

pub fn require_valid_input(condition: bool, message: &str) -> Result<()> {
    if !condition {
        Err(ClientError::InvalidInput(message.to_string()))
    } else {
        Ok(())
    }
}
