use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

pub mod errors;
pub mod events;
pub mod interfaces;

use errors::{ClientError, Result};
use interfaces::{ContentData, CreatorData, SubscriptionData, TierData};

pub const DEFAULT_PROBE_BOUND: u64 = 20;
pub const DEFAULT_COUNT_BOUND: u64 = 1000;
pub const DEFAULT_IPFS_GATEWAY: &str = "https://ipfs.io/ipfs/";
pub const DEFAULT_FALLBACK_IMAGE: &str = "/default-avatar.png";
pub const DEFAULT_SUPPORTED_CHAINS: [u64; 3] = [1, 5, 11155111]; // Mainnet, Goerli, Sepolia

/// Read-only mirror of a registry entry. Lives for a single page load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorRecord {
    pub id: U256,
    pub wallet: Address,
    pub metadata_uri: String,
    pub total_subscribers: U256,
    pub total_earnings: U256,
    pub is_verified: bool,
    pub created_at: u64,
    pub updated_at: u64,
}

impl From<CreatorData> for CreatorRecord {
    fn from(data: CreatorData) -> Self {
        Self {
            id: data.id,
            wallet: data.wallet,
            metadata_uri: data.metadata_uri,
            total_subscribers: data.total_subscribers,
            total_earnings: data.total_earnings,
            is_verified: data.is_verified,
            created_at: data.created_at.saturating_to(),
            updated_at: data.updated_at.saturating_to(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRecord {
    pub id: U256,
    pub creator_id: U256,
    pub name: String,
    pub metadata_uri: String,
    /// Monthly price in wei.
    pub price: U256,
    pub created_at: u64,
}

impl From<TierData> for TierRecord {
    fn from(data: TierData) -> Self {
        Self {
            id: data.id,
            creator_id: data.creator_id,
            name: data.name,
            metadata_uri: data.metadata_uri,
            price: data.price,
            created_at: data.created_at.saturating_to(),
        }
    }
}

/// A minted content token. `content_uri` points at the uploaded file and
/// is only shown to accounts holding the tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub token_id: U256,
    pub creator_id: U256,
    pub tier_id: U256,
    pub content_uri: String,
    pub created_at: u64,
}

impl From<ContentData> for ContentRecord {
    fn from(data: ContentData) -> Self {
        Self {
            token_id: data.id,
            creator_id: data.creator_id,
            tier_id: data.tier_id,
            content_uri: data.content_uri,
            created_at: data.created_at.saturating_to(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubscriptionStatus {
    Active,
    Expired,
    Cancelled,
}

impl TryFrom<u8> for SubscriptionStatus {
    type Error = ClientError;

    fn try_from(raw: u8) -> Result<Self> {
        match raw {
            0 => Ok(SubscriptionStatus::Active),
            1 => Ok(SubscriptionStatus::Expired),
            2 => Ok(SubscriptionStatus::Cancelled),
            other => Err(ClientError::Decode(format!(
                "unknown subscription status {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentType {
    Native,
    Erc20,
}

impl TryFrom<u8> for PaymentType {
    type Error = ClientError;

    fn try_from(raw: u8) -> Result<Self> {
        match raw {
            0 => Ok(PaymentType::Native),
            1 => Ok(PaymentType::Erc20),
            other => Err(ClientError::Decode(format!("unknown payment type {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub id: U256,
    pub creator_id: U256,
    pub tier_id: U256,
    pub subscriber: Address,
    pub start_time: u64,
    pub end_time: u64,
    pub amount_paid: U256,
    pub status: SubscriptionStatus,
    pub payment_type: PaymentType,
    pub token_address: Address,
}

impl SubscriptionRecord {
    /// Status as of `now` (unix seconds). The contract only flips a record to
    /// `Expired` when touched, so an `Active` record past its end is expired.
    pub fn effective_status(&self, now: u64) -> SubscriptionStatus {
        match self.status {
            SubscriptionStatus::Active if now >= self.end_time => SubscriptionStatus::Expired,
            status => status,
        }
    }

    pub fn is_active_at(&self, now: u64) -> bool {
        self.effective_status(now) == SubscriptionStatus::Active
    }
}

impl TryFrom<SubscriptionData> for SubscriptionRecord {
    type Error = ClientError;

    fn try_from(data: SubscriptionData) -> Result<Self> {
        Ok(Self {
            id: data.id,
            creator_id: data.creator_id,
            tier_id: data.tier_id,
            subscriber: data.subscriber,
            start_time: data.start_time.saturating_to(),
            end_time: data.end_time.saturating_to(),
            amount_paid: data.amount,
            status: SubscriptionStatus::try_from(data.status)?,
            payment_type: PaymentType::try_from(data.payment_type)?,
            token_address: data.token_address,
        })
    }
}
