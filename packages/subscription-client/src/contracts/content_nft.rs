use alloy_primitives::{Address, U256};

use super::caller::{ContractCaller, TxReceipt};
use super::not_found_on_revert;
use crate::provider::WalletProvider;
use crate::types::errors::{require_valid_input, ClientError, Result};
use crate::types::interfaces::IContentNFT;
use crate::types::{ContentRecord, TierRecord};

/// Tiers, access passes and gated content tokens.
pub struct ContentNft<P> {
    caller: ContractCaller<P>,
}

impl<P: WalletProvider> ContentNft<P> {
    pub fn new(caller: ContractCaller<P>) -> Self {
        Self { caller }
    }

    pub fn address(&self) -> Address {
        self.caller.address()
    }

    pub async fn get_tier(&self, creator_id: U256, tier_id: U256) -> Result<TierRecord> {
        let ret = self
            .caller
            .call(&IContentNFT::getTierCall { creator_id, tier_id })
            .await
            .map_err(|e| not_found_on_revert(e, "tier", format!("{creator_id}/{tier_id}")))?;
        if ret.tier.id.is_zero() {
            return Err(ClientError::not_found("tier", format!("{creator_id}/{tier_id}")));
        }
        Ok(ret.tier.into())
    }

    pub async fn tier_count(&self, creator_id: U256) -> Result<u64> {
        let ret = self
            .caller
            .call(&IContentNFT::getTierCountCall { creator_id })
            .await?;
        Ok(ret.count.saturating_to())
    }

    pub async fn has_access(&self, account: Address, tier_id: U256) -> Result<bool> {
        let ret = self
            .caller
            .call(&IContentNFT::hasAccessCall { account, tier_id })
            .await?;
        Ok(ret.granted)
    }

    pub async fn uri(&self, id: U256) -> Result<String> {
        let ret = self.caller.call(&IContentNFT::uriCall { id }).await?;
        Ok(ret.token_uri)
    }

    pub async fn content_count(&self, creator_id: U256) -> Result<u64> {
        let ret = self
            .caller
            .call(&IContentNFT::getContentCountCall { creator_id })
            .await?;
        Ok(ret.count.saturating_to())
    }

    /// Content `index` (1-based) of `creator_id`.
    pub async fn get_content(&self, creator_id: U256, index: U256) -> Result<ContentRecord> {
        let ret = self
            .caller
            .call(&IContentNFT::getContentCall { creator_id, index })
            .await
            .map_err(|e| not_found_on_revert(e, "content", format!("{creator_id}/{index}")))?;
        if ret.content.id.is_zero() {
            return Err(ClientError::not_found("content", format!("{creator_id}/{index}")));
        }
        Ok(ret.content.into())
    }

    pub async fn token_tier(&self, token_id: U256) -> Result<U256> {
        let ret = self
            .caller
            .call(&IContentNFT::getTokenTierCall { token_id })
            .await
            .map_err(|e| not_found_on_revert(e, "content", token_id))?;
        Ok(ret.tier_id)
    }

    /// Raw URI of the token's file. Callers gate display on `has_access`.
    pub async fn content_uri(&self, token_id: U256) -> Result<String> {
        let ret = self
            .caller
            .call(&IContentNFT::getContentURICall { token_id })
            .await
            .map_err(|e| not_found_on_revert(e, "content", token_id))?;
        Ok(ret.content_uri)
    }

    pub async fn tier_subscriber_count(&self, creator_id: U256, tier_id: U256) -> Result<u64> {
        let ret = self
            .caller
            .call(&IContentNFT::getTierSubscriberCountCall { creator_id, tier_id })
            .await?;
        Ok(ret.count.saturating_to())
    }

    /// `price` is the monthly price in wei.
    pub async fn create_tier(
        &self,
        name: &str,
        metadata_uri: &str,
        price: U256,
    ) -> Result<TxReceipt> {
        require_valid_input(!name.trim().is_empty(), "tier name is required")?;
        require_valid_input(!metadata_uri.trim().is_empty(), "metadata URI is required")?;
        self.caller
            .send(
                &IContentNFT::createTierCall {
                    name: name.to_string(),
                    metadata_uri: metadata_uri.to_string(),
                    price,
                },
                U256::ZERO,
            )
            .await
    }

    /// Mints a content token gated by one of the signer's tiers.
    /// `content_uri` is usually the `ipfs://` URI of an upload.
    pub async fn mint_content(&self, tier_id: U256, content_uri: &str) -> Result<TxReceipt> {
        require_valid_input(!tier_id.is_zero(), "tier id is required")?;
        require_valid_input(!content_uri.trim().is_empty(), "content URI is required")?;
        self.caller
            .send(
                &IContentNFT::mintContentCall {
                    tier_id,
                    content_uri: content_uri.to_string(),
                },
                U256::ZERO,
            )
            .await
    }
}
