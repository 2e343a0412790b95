use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_primitives::Address;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{WalletEventHandler, WalletProvider};
use crate::types::errors::{ProviderError, METHOD_NOT_FOUND_CODE};
use crate::types::events::{WalletEvent, WalletEventKind};

/// JSON-RPC 2.0 provider talking to a node that holds unlocked accounts
/// (a local hardhat or anvil node). Push events are synthesized by
/// [`HttpProvider::spawn_watcher`].
pub struct HttpProvider {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
    listeners: Mutex<Vec<(WalletEventKind, WalletEventHandler)>>,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ProviderError>,
}

impl HttpProvider {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::transport(format!("http client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
            listeners: Mutex::new(Vec::new()),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn rpc(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(method, id, "rpc request");

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::transport(format!("{method}: {e}")))?;
        let response: RpcResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::transport(format!("{method}: malformed response: {e}")))?;

        match (response.result, response.error) {
            (_, Some(err)) => Err(err),
            (Some(result), None) => Ok(result),
            (None, None) => Ok(Value::Null),
        }
    }

    fn emit(&self, event: WalletEvent) {
        let Ok(listeners) = self.listeners.lock() else {
            warn!("listener registry poisoned, dropping event");
            return;
        };
        for (kind, handler) in listeners.iter() {
            if *kind == event.kind() {
                handler(event.clone());
            }
        }
    }

    /// Polls the node for account and chain drift and emits the matching
    /// wallet events. Stops once the provider is dropped.
    pub fn spawn_watcher(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut last_accounts: Option<Vec<Address>> = None;
            let mut last_chain: Option<u64> = None;
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let Some(provider) = weak.upgrade() else {
                    break;
                };

                match provider.authorized_accounts().await {
                    Ok(accounts) => {
                        if last_accounts.as_ref().is_some_and(|prev| *prev != accounts) {
                            info!(count = accounts.len(), "node accounts changed");
                            provider.emit(WalletEvent::AccountsChanged(accounts.clone()));
                        }
                        last_accounts = Some(accounts);
                    }
                    Err(err) => debug!(error = %err, "account poll failed"),
                }

                match provider.chain_id().await {
                    Ok(chain_id) => {
                        if last_chain.is_some_and(|prev| prev != chain_id) {
                            info!(chain_id, "node chain changed");
                            provider.emit(WalletEvent::ChainChanged(chain_id));
                        }
                        last_chain = Some(chain_id);
                    }
                    Err(err) => debug!(error = %err, "chain poll failed"),
                }
            }
        })
    }
}

impl WalletProvider for HttpProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        match self.rpc(method, params.clone()).await {
            // Nodes have no user to prompt; unlocked accounts are the grant.
            Err(err) if method == "eth_requestAccounts" && err.code == METHOD_NOT_FOUND_CODE => {
                self.rpc("eth_accounts", params).await
            }
            other => other,
        }
    }

    fn subscribe(&self, kind: WalletEventKind, handler: WalletEventHandler) {
        match self.listeners.lock() {
            Ok(mut listeners) => listeners.push((kind, handler)),
            Err(_) => warn!(event = kind.as_str(), "listener registry poisoned"),
        }
    }
}
