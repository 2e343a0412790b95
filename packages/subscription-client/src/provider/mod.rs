//! Wallet provider boundary.
//!
//! A provider brokers the user's account and signing capability. The shape
//! follows EIP-1193: one `request` entry point plus push notifications for
//! account and chain changes.

use std::future::Future;

use alloy_primitives::Address;
use serde_json::{json, Value};

use crate::types::errors::ProviderError;
use crate::types::events::{WalletEvent, WalletEventKind};

pub mod http;

pub use http::HttpProvider;

pub type WalletEventHandler = Box<dyn Fn(WalletEvent) + Send + Sync>;

pub trait WalletProvider: Send + Sync + 'static {
    /// Raw EIP-1193 request.
    fn request(
        &self,
        method: &str,
        params: Value,
    ) -> impl Future<Output = Result<Value, ProviderError>> + Send;

    /// Registers `handler` for `kind`. Handlers stay registered for the
    /// provider's lifetime.
    fn subscribe(&self, kind: WalletEventKind, handler: WalletEventHandler);

    /// Prompts the user for account access.
    fn request_accounts(&self) -> impl Future<Output = Result<Vec<Address>, ProviderError>> + Send {
        async move {
            let value = self.request("eth_requestAccounts", json!([])).await?;
            parse_accounts(value)
        }
    }

    /// Accounts already authorized for this origin. Never prompts.
    fn authorized_accounts(
        &self,
    ) -> impl Future<Output = Result<Vec<Address>, ProviderError>> + Send {
        async move {
            let value = self.request("eth_accounts", json!([])).await?;
            parse_accounts(value)
        }
    }

    fn chain_id(&self) -> impl Future<Output = Result<u64, ProviderError>> + Send {
        async move {
            let value = self.request("eth_chainId", json!([])).await?;
            parse_quantity(&value)
        }
    }

    fn send(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> impl Future<Output = Result<Value, ProviderError>> + Send {
        self.request(method, Value::Array(params))
    }
}

pub fn parse_accounts(value: Value) -> Result<Vec<Address>, ProviderError> {
    serde_json::from_value(value)
        .map_err(|e| ProviderError::transport(format!("malformed account list: {e}")))
}

/// Parses a JSON-RPC quantity, either `"0x..."` hex or a plain number.
pub fn parse_quantity(value: &Value) -> Result<u64, ProviderError> {
    match value {
        Value::String(s) => {
            let digits = s.trim_start_matches("0x");
            u64::from_str_radix(digits, 16)
                .map_err(|e| ProviderError::transport(format!("malformed quantity {s}: {e}")))
        }
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| ProviderError::transport(format!("malformed quantity {n}"))),
        other => Err(ProviderError::transport(format!(
            "expected quantity, got {other}"
        ))),
    }
}
