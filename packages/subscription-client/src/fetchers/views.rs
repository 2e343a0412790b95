use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use super::metadata::ResolvedMetadata;
use crate::types::{ContentRecord, CreatorRecord, SubscriptionRecord, SubscriptionStatus, TierRecord};
use crate::utils::{format_ether, gateway_url};

/// Placeholder display name for a creator without usable metadata.
pub fn creator_fallback_name(id: U256) -> String {
    format!("Creator {id}")
}

pub fn tier_fallback_name(tier: &TierRecord) -> String {
    if tier.name.trim().is_empty() {
        format!("Tier {}", tier.id)
    } else {
        tier.name.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorView {
    pub id: U256,
    pub wallet: Address,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub total_subscribers: U256,
    pub total_earnings: U256,
    pub earnings_display: String,
    pub is_verified: bool,
    /// True when the display fields are the placeholder.
    pub metadata_fallback: bool,
}

impl CreatorView {
    pub fn new(record: &CreatorRecord, resolved: ResolvedMetadata) -> Self {
        Self {
            id: record.id,
            wallet: record.wallet,
            name: resolved.metadata.name,
            description: resolved.metadata.description,
            image_url: resolved.metadata.image_url,
            total_subscribers: record.total_subscribers,
            total_earnings: record.total_earnings,
            earnings_display: format_ether(record.total_earnings),
            is_verified: record.is_verified,
            metadata_fallback: resolved.fallback,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierView {
    pub id: U256,
    pub creator_id: U256,
    pub name: String,
    pub description: String,
    pub features: Vec<String>,
    pub price: U256,
    pub price_display: String,
    /// `None` when access was not checked for this view.
    pub has_access: Option<bool>,
}

impl TierView {
    /// The on-chain name wins over the metadata name.
    pub fn new(record: &TierRecord, resolved: ResolvedMetadata, has_access: Option<bool>) -> Self {
        let name = if record.name.trim().is_empty() {
            resolved.metadata.name
        } else {
            record.name.clone()
        };
        Self {
            id: record.id,
            creator_id: record.creator_id,
            name,
            description: resolved.metadata.description,
            features: resolved.metadata.features,
            price: record.price,
            price_display: format_ether(record.price),
            has_access,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionView {
    pub id: U256,
    pub creator_id: U256,
    pub tier_id: U256,
    pub creator_name: String,
    pub creator_image: String,
    pub status: SubscriptionStatus,
    pub start_time: u64,
    pub end_time: u64,
    pub amount_paid: U256,
    pub amount_display: String,
}

impl SubscriptionView {
    pub fn new(record: &SubscriptionRecord, creator: &CreatorView, now: u64) -> Self {
        Self {
            id: record.id,
            creator_id: record.creator_id,
            tier_id: record.tier_id,
            creator_name: creator.name.clone(),
            creator_image: creator.image_url.clone(),
            status: record.effective_status(now),
            start_time: record.start_time,
            end_time: record.end_time,
            amount_paid: record.amount_paid,
            amount_display: format_ether(record.amount_paid),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorPageView {
    pub creator: CreatorView,
    /// Ascending by tier id.
    pub tiers: Vec<TierView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardView {
    pub account: Address,
    pub subscriptions: Vec<SubscriptionView>,
    /// Set when the account is itself a registered creator.
    pub creator_profile: Option<CreatorView>,
}

impl DashboardView {
    pub fn active_count(&self) -> usize {
        self.subscriptions.iter().filter(|s| s.is_active()).count()
    }
}

/// Whether the viewer may open a content token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ContentAccess {
    Unlocked { content_uri: String, url: String },
    Locked,
}

impl ContentAccess {
    pub fn unlocked(content_uri: String, gateway: &str) -> Self {
        let url = gateway_url(&content_uri, gateway);
        ContentAccess::Unlocked { content_uri, url }
    }

    pub fn is_unlocked(&self) -> bool {
        matches!(self, ContentAccess::Unlocked { .. })
    }
}

/// One row of a creator's feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentView {
    pub token_id: U256,
    pub creator_id: U256,
    pub tier_id: U256,
    pub created_at: u64,
    pub access: ContentAccess,
}

impl ContentView {
    /// The URI is dropped unless `granted`.
    pub fn new(record: &ContentRecord, granted: bool, gateway: &str) -> Self {
        let access = if granted {
            ContentAccess::unlocked(record.content_uri.clone(), gateway)
        } else {
            ContentAccess::Locked
        };
        Self {
            token_id: record.token_id,
            creator_id: record.creator_id,
            tier_id: record.tier_id,
            created_at: record.created_at,
            access,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFeedView {
    pub creator: CreatorView,
    /// Newest first.
    pub items: Vec<ContentView>,
}

impl ContentFeedView {
    pub fn unlocked_count(&self) -> usize {
        self.items.iter().filter(|item| item.access.is_unlocked()).count()
    }
}

/// A single token opened by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPageView {
    pub token_id: U256,
    pub tier_id: U256,
    pub access: ContentAccess,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierStats {
    pub tier_id: U256,
    pub name: String,
    pub price: U256,
    pub price_display: String,
    /// `None` when the count could not be read.
    pub subscriber_count: Option<u64>,
}

impl TierStats {
    pub fn new(record: &TierRecord, subscriber_count: Option<u64>) -> Self {
        Self {
            tier_id: record.id,
            name: tier_fallback_name(record),
            price: record.price,
            price_display: format_ether(record.price),
            subscriber_count,
        }
    }
}

/// One subscription as seen from the creator's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenuePoint {
    pub subscription_id: U256,
    pub tier_id: U256,
    pub start_time: u64,
    pub amount_paid: U256,
    pub amount_display: String,
}

impl From<&SubscriptionRecord> for RevenuePoint {
    fn from(record: &SubscriptionRecord) -> Self {
        Self {
            subscription_id: record.id,
            tier_id: record.tier_id,
            start_time: record.start_time,
            amount_paid: record.amount_paid,
            amount_display: format_ether(record.amount_paid),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorAnalyticsView {
    pub creator: CreatorView,
    pub active_subscriptions: usize,
    /// Subscriptions started in the trailing 30 days.
    pub recent_subscriptions: usize,
    pub tiers: Vec<TierStats>,
    /// Ascending by start time.
    pub history: Vec<RevenuePoint>,
}

impl CreatorAnalyticsView {
    /// Recent subscriptions as a percentage of all subscribers.
    pub fn growth_rate(&self) -> f64 {
        let total: u64 = self.creator.total_subscribers.saturating_to();
        if total == 0 {
            0.0
        } else {
            self.recent_subscriptions as f64 / total as f64 * 100.0
        }
    }
}
