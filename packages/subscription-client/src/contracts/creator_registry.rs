use alloy_primitives::{Address, U256};

use super::caller::{ContractCaller, TxReceipt};
use super::not_found_on_revert;
use crate::provider::WalletProvider;
use crate::types::errors::{require_valid_input, ClientError, Result};
use crate::types::interfaces::ICreatorRegistry;
use crate::types::CreatorRecord;

pub struct CreatorRegistry<P> {
    caller: ContractCaller<P>,
}

impl<P: WalletProvider> CreatorRegistry<P> {
    pub fn new(caller: ContractCaller<P>) -> Self {
        Self { caller }
    }

    pub fn address(&self) -> Address {
        self.caller.address()
    }

    pub async fn get_creator(&self, creator_id: U256) -> Result<CreatorRecord> {
        let ret = self
            .caller
            .call(&ICreatorRegistry::getCreatorCall { creator_id })
            .await
            .map_err(|e| not_found_on_revert(e, "creator", creator_id))?;
        // Unset mapping slots decode as an all-zero record.
        if ret.creator.id.is_zero() {
            return Err(ClientError::not_found("creator", creator_id));
        }
        Ok(ret.creator.into())
    }

    /// `None` when `wallet` has never registered.
    pub async fn get_creator_id_by_wallet(&self, wallet: Address) -> Result<Option<U256>> {
        let ret = self
            .caller
            .call(&ICreatorRegistry::getCreatorIdByWalletCall { wallet })
            .await?;
        Ok((!ret.creator_id.is_zero()).then_some(ret.creator_id))
    }

    pub async fn is_verified_creator(&self, wallet: Address) -> Result<bool> {
        let ret = self
            .caller
            .call(&ICreatorRegistry::isVerifiedCreatorCall { wallet })
            .await?;
        Ok(ret.verified)
    }

    pub async fn total_creators(&self) -> Result<u64> {
        let ret = self
            .caller
            .call(&ICreatorRegistry::getTotalCreatorsCall {})
            .await?;
        Ok(ret.total.saturating_to())
    }

    pub async fn register_creator(&self, metadata_uri: &str) -> Result<TxReceipt> {
        require_valid_input(!metadata_uri.trim().is_empty(), "metadata URI is required")?;
        self.caller
            .send(
                &ICreatorRegistry::registerCreatorCall {
                    metadata_uri: metadata_uri.to_string(),
                },
                U256::ZERO,
            )
            .await
    }

    pub async fn update_creator(&self, metadata_uri: &str) -> Result<TxReceipt> {
        require_valid_input(!metadata_uri.trim().is_empty(), "metadata URI is required")?;
        self.caller
            .send(
                &ICreatorRegistry::updateCreatorCall {
                    metadata_uri: metadata_uri.to_string(),
                },
                U256::ZERO,
            )
            .await
    }
}
