use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolCall;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::provider::WalletProvider;
use crate::retry::{retry_read, RetryPolicy};
use crate::types::errors::{ClientError, ProviderError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSettings {
    pub call_timeout: Duration,
    /// One deadline shared by the wallet prompt for a submission and
    /// mining.
    pub tx_timeout: Duration,
    pub receipt_poll_interval: Duration,
    pub retry: RetryPolicy,
}

impl CallSettings {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            call_timeout: config.call_timeout(),
            tx_timeout: config.tx_timeout(),
            receipt_poll_interval: config.receipt_poll_interval(),
            retry: config.retry.policy(),
        }
    }
}

/// Outcome of a mined, successful transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: B256,
    pub block_number: u64,
    pub gas_used: U256,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: B256,
    #[serde(default)]
    block_number: Option<U256>,
    #[serde(default)]
    status: Option<U256>,
    #[serde(default)]
    gas_used: Option<U256>,
}

/// One contract address bound to one signer. Encodes calls with the pinned
/// ABI, bounds every round trip, and decodes results into typed values.
pub struct ContractCaller<P> {
    provider: Arc<P>,
    address: Address,
    signer: Address,
    settings: CallSettings,
}

impl<P> Clone for ContractCaller<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            address: self.address,
            signer: self.signer,
            settings: self.settings.clone(),
        }
    }
}

impl<P: WalletProvider> ContractCaller<P> {
    pub fn new(provider: Arc<P>, address: Address, signer: Address, settings: CallSettings) -> Self {
        Self {
            provider,
            address,
            signer,
            settings,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn signer(&self) -> Address {
        self.signer
    }

    /// Read-only call at the latest block, retried on transient failures.
    pub async fn call<C: SolCall>(&self, call: &C) -> Result<C::Return> {
        let data = Bytes::from(call.abi_encode());
        let raw = retry_read(&self.settings.retry, C::SIGNATURE, || {
            self.eth_call(&data, U256::ZERO)
        })
        .await?;
        C::abi_decode_returns(&raw, true)
            .map_err(|e| ClientError::Decode(format!("{}: {e}", C::SIGNATURE)))
    }

    /// Submits a state-changing call and waits for it to be mined. Never
    /// retried: a failure is reported and the user decides.
    pub async fn send<C: SolCall>(&self, call: &C, value: U256) -> Result<TxReceipt> {
        let data = Bytes::from(call.abi_encode());

        // A revert in simulation means the transaction would revert on chain.
        if let Err(err) = self.eth_call(&data, value).await {
            warn!(method = C::SIGNATURE, error = %err, "preflight rejected");
            return Err(err);
        }

        let deadline = Instant::now() + self.settings.tx_timeout;
        let tx = self.tx_object(&data, value);
        let submitted = tokio::time::timeout_at(
            deadline,
            self.provider.request("eth_sendTransaction", json!([tx])),
        )
        .await
        .map_err(|_| ClientError::Timeout(self.settings.tx_timeout))?;
        let tx_hash: B256 = serde_json::from_value(submitted?)
            .map_err(|e| ClientError::Decode(format!("transaction hash: {e}")))?;
        info!(method = C::SIGNATURE, %tx_hash, %value, "transaction submitted");

        let receipt = self.wait_for_receipt(tx_hash, deadline).await?;
        info!(%tx_hash, block = receipt.block_number, "transaction mined");
        Ok(receipt)
    }

    async fn eth_call(&self, data: &Bytes, value: U256) -> Result<Bytes> {
        let tx = self.tx_object(data, value);
        let result = bounded(
            self.settings.call_timeout,
            self.provider.request("eth_call", json!([tx, "latest"])),
        )
        .await?;
        serde_json::from_value(result).map_err(|e| ClientError::Decode(format!("eth_call result: {e}")))
    }

    fn tx_object(&self, data: &Bytes, value: U256) -> Value {
        let mut tx = json!({
            "from": self.signer,
            "to": self.address,
            "data": data,
        });
        if !value.is_zero() {
            tx["value"] = json!(value);
        }
        tx
    }

    async fn wait_for_receipt(&self, tx_hash: B256, deadline: Instant) -> Result<TxReceipt> {
        let poll = async {
            loop {
                match self
                    .provider
                    .request("eth_getTransactionReceipt", json!([tx_hash]))
                    .await
                {
                    Ok(Value::Null) => {}
                    Ok(value) => return parse_receipt(value),
                    Err(err) => debug!(%tx_hash, error = %err, "receipt poll failed"),
                }
                tokio::time::sleep(self.settings.receipt_poll_interval).await;
            }
        };
        tokio::time::timeout_at(deadline, poll).await.map_err(|_| {
            warn!(%tx_hash, "transaction not mined before deadline");
            ClientError::Timeout(self.settings.tx_timeout)
        })?
    }
}

async fn bounded<F>(limit: Duration, request: F) -> Result<Value>
where
    F: Future<Output = core::result::Result<Value, ProviderError>>,
{
    match tokio::time::timeout(limit, request).await {
        Ok(result) => result.map_err(ClientError::from),
        Err(_) => Err(ClientError::Timeout(limit)),
    }
}

fn parse_receipt(value: Value) -> Result<TxReceipt> {
    let raw: RawReceipt = serde_json::from_value(value)
        .map_err(|e| ClientError::Decode(format!("transaction receipt: {e}")))?;
    if raw.status.is_some_and(|status| status.is_zero()) {
        return Err(ClientError::ChainRejected {
            reason: format!("transaction {} reverted", raw.transaction_hash),
        });
    }
    Ok(TxReceipt {
        tx_hash: raw.transaction_hash,
        block_number: raw.block_number.unwrap_or_default().saturating_to(),
        gas_used: raw.gas_used.unwrap_or_default(),
    })
}
