use alloy_primitives::{Address, U256};

use super::caller::{ContractCaller, TxReceipt};
use super::not_found_on_revert;
use crate::provider::WalletProvider;
use crate::types::errors::{require_valid_input, ClientError, Result};
use crate::types::interfaces::ISubscriptionManager;
use crate::types::SubscriptionRecord;

pub struct SubscriptionManager<P> {
    caller: ContractCaller<P>,
}

/// Payment for `months` at `price_per_month`, in wei.
pub fn subscription_cost(price_per_month: U256, months: u64) -> Result<U256> {
    require_valid_input(months > 0, "subscription needs at least one month")?;
    price_per_month
        .checked_mul(U256::from(months))
        .ok_or_else(|| ClientError::InvalidInput("subscription cost overflows".to_string()))
}

impl<P: WalletProvider> SubscriptionManager<P> {
    pub fn new(caller: ContractCaller<P>) -> Self {
        Self { caller }
    }

    pub fn address(&self) -> Address {
        self.caller.address()
    }

    pub async fn get_subscription(&self, subscription_id: U256) -> Result<SubscriptionRecord> {
        let ret = self
            .caller
            .call(&ISubscriptionManager::getSubscriptionCall { subscription_id })
            .await
            .map_err(|e| not_found_on_revert(e, "subscription", subscription_id))?;
        if ret.subscription.id.is_zero() {
            return Err(ClientError::not_found("subscription", subscription_id));
        }
        SubscriptionRecord::try_from(ret.subscription)
    }

    pub async fn is_subscription_active(&self, subscription_id: U256) -> Result<bool> {
        let ret = self
            .caller
            .call(&ISubscriptionManager::isSubscriptionActiveCall { subscription_id })
            .await?;
        Ok(ret.active)
    }

    pub async fn subscriptions_of(&self, subscriber: Address) -> Result<Vec<U256>> {
        let ret = self
            .caller
            .call(&ISubscriptionManager::getSubscriptionsBySubscriberCall { subscriber })
            .await?;
        Ok(ret.ids)
    }

    /// Every subscription ever taken out on `creator_id`.
    pub async fn subscriptions_by_creator(&self, creator_id: U256) -> Result<Vec<U256>> {
        let ret = self
            .caller
            .call(&ISubscriptionManager::getSubscriptionsByCreatorCall { creator_id })
            .await?;
        Ok(ret.ids)
    }

    pub async fn subscriptions_to_creator(
        &self,
        subscriber: Address,
        creator_id: U256,
    ) -> Result<Vec<U256>> {
        let ret = self
            .caller
            .call(&ISubscriptionManager::getSubscriberSubscriptionsCall {
                subscriber,
                creator_id,
            })
            .await?;
        Ok(ret.ids)
    }

    /// Pays `price_per_month * months` from the signer.
    pub async fn subscribe(
        &self,
        creator_id: U256,
        tier_id: U256,
        months: u64,
        price_per_month: U256,
    ) -> Result<TxReceipt> {
        let value = subscription_cost(price_per_month, months)?;
        self.caller
            .send(
                &ISubscriptionManager::subscribeCall {
                    creator_id,
                    tier_id,
                    months: U256::from(months),
                },
                value,
            )
            .await
    }

    pub async fn renew_subscription(
        &self,
        subscription_id: U256,
        months: u64,
        price_per_month: U256,
    ) -> Result<TxReceipt> {
        let value = subscription_cost(price_per_month, months)?;
        self.caller
            .send(
                &ISubscriptionManager::renewSubscriptionCall {
                    subscription_id,
                    months: U256::from(months),
                },
                value,
            )
            .await
    }

    pub async fn cancel_subscription(&self, subscription_id: U256) -> Result<TxReceipt> {
        self.caller
            .send(
                &ISubscriptionManager::cancelSubscriptionCall { subscription_id },
                U256::ZERO,
            )
            .await
    }
}
