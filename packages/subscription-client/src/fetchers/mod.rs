//! Page-shaped reads: enumerate records, attach display metadata, and build
//! the view models the pages render.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use alloy_primitives::U256;
use tokio::task::JoinSet;
use tracing::{debug, warn};

pub mod listing;
pub mod metadata;
pub mod scope;
pub mod views;

pub use listing::{list_content, list_creators, list_tiers, probe_ids, ListingStrategy};
pub use metadata::{Metadata, MetadataResolver, ResolvedMetadata};
pub use scope::ViewScope;
pub use views::{
    ContentAccess, ContentFeedView, ContentPageView, ContentView, CreatorAnalyticsView,
    CreatorPageView, CreatorView, DashboardView, RevenuePoint, SubscriptionView, TierStats,
    TierView,
};

use crate::config::ClientConfig;
use crate::contracts::ContractHandleSet;
use crate::provider::WalletProvider;
use crate::types::errors::{ClientError, Result};
use crate::types::{CreatorRecord, SubscriptionRecord, TierRecord};
use views::{creator_fallback_name, tier_fallback_name};

/// Loads views through one handle set. Build a new fetcher after every
/// session change; a fetcher never outlives the identity it was built for.
pub struct Fetcher<P> {
    contracts: Arc<ContractHandleSet<P>>,
    metadata: MetadataResolver,
    strategy: ListingStrategy,
}

impl<P: WalletProvider> Fetcher<P> {
    pub fn new(
        contracts: Arc<ContractHandleSet<P>>,
        metadata: MetadataResolver,
        strategy: ListingStrategy,
    ) -> Self {
        Self {
            contracts,
            metadata,
            strategy,
        }
    }

    pub fn from_config(contracts: Arc<ContractHandleSet<P>>, config: &ClientConfig) -> Result<Self> {
        Ok(Self::new(
            contracts,
            MetadataResolver::new(&config.metadata)?,
            ListingStrategy::from(&config.listing),
        ))
    }

    pub fn contracts(&self) -> &ContractHandleSet<P> {
        &self.contracts
    }

    /// Every registered creator, most subscribed first.
    pub async fn load_creators(&self) -> Result<Vec<CreatorView>> {
        let mut records = list_creators(&self.contracts.creator_registry, self.strategy).await?;
        records.sort_by(|a, b| b.total_subscribers.cmp(&a.total_subscribers));
        debug!(count = records.len(), "creators listed");
        Ok(self.resolve_creators(records).await)
    }

    pub async fn load_creator_page(&self, creator_id: U256) -> Result<CreatorPageView> {
        let record = self.contracts.creator_registry.get_creator(creator_id).await?;
        let tiers = list_tiers(&self.contracts.content_nft, creator_id, self.strategy).await?;

        let creator = self
            .metadata
            .resolve(&record.metadata_uri, &creator_fallback_name(record.id))
            .await;
        let creator = CreatorView::new(&record, creator);
        let tiers = self.resolve_tiers(tiers, true).await;
        Ok(CreatorPageView { creator, tiers })
    }

    /// Tiers of the connected account's own creator profile.
    pub async fn load_my_tiers(&self) -> Result<Vec<TierView>> {
        let creator_id = self.own_creator_id().await?;
        let tiers = list_tiers(&self.contracts.content_nft, creator_id, self.strategy).await?;
        Ok(self.resolve_tiers(tiers, false).await)
    }

    pub async fn load_dashboard(&self) -> Result<DashboardView> {
        self.load_dashboard_at(unix_now()).await
    }

    /// Dashboard with subscription status evaluated at `now` (unix seconds).
    /// Rows whose subscription or creator cannot be read are left out.
    pub async fn load_dashboard_at(&self, now: u64) -> Result<DashboardView> {
        let account = self.contracts.signer();
        let manager = &self.contracts.subscription_manager;
        let registry = &self.contracts.creator_registry;

        let ids = manager.subscriptions_of(account).await?;
        let mut subscriptions = Vec::with_capacity(ids.len());
        let mut creators: BTreeMap<U256, CreatorRecord> = BTreeMap::new();
        for id in ids {
            let subscription = match manager.get_subscription(id).await {
                Ok(subscription) => subscription,
                Err(err) => {
                    warn!(subscription = %id, error = %err, "skipping dashboard row");
                    continue;
                }
            };
            if !creators.contains_key(&subscription.creator_id) {
                match registry.get_creator(subscription.creator_id).await {
                    Ok(creator) => {
                        creators.insert(creator.id, creator);
                    }
                    Err(err) => {
                        warn!(subscription = %id, error = %err, "skipping dashboard row");
                        continue;
                    }
                }
            }
            subscriptions.push(subscription);
        }

        let creator_views: BTreeMap<U256, CreatorView> = self
            .resolve_creators(creators.into_values().collect())
            .await
            .into_iter()
            .map(|view| (view.id, view))
            .collect();
        let subscriptions = subscriptions
            .iter()
            .filter_map(|subscription| {
                creator_views
                    .get(&subscription.creator_id)
                    .map(|creator| SubscriptionView::new(subscription, creator, now))
            })
            .collect();

        let creator_profile = match registry.get_creator_id_by_wallet(account).await? {
            Some(creator_id) => {
                let record = registry.get_creator(creator_id).await?;
                let resolved = self
                    .metadata
                    .resolve(&record.metadata_uri, &creator_fallback_name(record.id))
                    .await;
                Some(CreatorView::new(&record, resolved))
            }
            None => None,
        };

        Ok(DashboardView {
            account,
            subscriptions,
            creator_profile,
        })
    }

    /// A creator's content, newest first. Items whose tier the viewer does
    /// not hold come back locked, without their URI.
    pub async fn load_content_feed(&self, creator_id: U256) -> Result<ContentFeedView> {
        let record = self.contracts.creator_registry.get_creator(creator_id).await?;
        let mut items = list_content(&self.contracts.content_nft, creator_id, self.strategy).await?;
        items.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.token_id.cmp(&a.token_id))
        });

        let resolved = self
            .metadata
            .resolve(&record.metadata_uri, &creator_fallback_name(record.id))
            .await;
        let creator = CreatorView::new(&record, resolved);

        // One access check per tier.
        let mut access: BTreeMap<U256, bool> = BTreeMap::new();
        let mut views = Vec::with_capacity(items.len());
        for item in &items {
            let granted = match access.get(&item.tier_id) {
                Some(granted) => *granted,
                None => {
                    let granted = self.viewer_holds(item.tier_id).await;
                    access.insert(item.tier_id, granted);
                    granted
                }
            };
            views.push(ContentView::new(item, granted, self.metadata.gateway()));
        }
        debug!(creator = %creator_id, count = views.len(), "content feed loaded");
        Ok(ContentFeedView {
            creator,
            items: views,
        })
    }

    /// Opens one token. The URI is only read once access is confirmed.
    pub async fn load_content(&self, token_id: U256) -> Result<ContentPageView> {
        let content_nft = &self.contracts.content_nft;
        let tier_id = content_nft.token_tier(token_id).await?;
        let access = if content_nft.has_access(self.contracts.signer(), tier_id).await? {
            let content_uri = content_nft.content_uri(token_id).await?;
            ContentAccess::unlocked(content_uri, self.metadata.gateway())
        } else {
            debug!(token = %token_id, tier = %tier_id, "content locked for viewer");
            ContentAccess::Locked
        };
        Ok(ContentPageView {
            token_id,
            tier_id,
            access,
        })
    }

    pub async fn load_creator_analytics(&self) -> Result<CreatorAnalyticsView> {
        self.load_creator_analytics_at(unix_now()).await
    }

    /// Analytics for the connected creator, evaluated at `now`. Unreadable
    /// subscriptions are left out; unreadable tier counts stay `None`.
    pub async fn load_creator_analytics_at(&self, now: u64) -> Result<CreatorAnalyticsView> {
        const WINDOW: u64 = 30 * 24 * 60 * 60;

        let creator_id = self.own_creator_id().await?;
        let registry = &self.contracts.creator_registry;
        let manager = &self.contracts.subscription_manager;
        let content_nft = &self.contracts.content_nft;

        let record = registry.get_creator(creator_id).await?;
        let ids = manager.subscriptions_by_creator(creator_id).await?;
        let mut subscriptions: Vec<SubscriptionRecord> = Vec::with_capacity(ids.len());
        for id in ids {
            match manager.get_subscription(id).await {
                Ok(subscription) => subscriptions.push(subscription),
                Err(err) => warn!(subscription = %id, error = %err, "skipping analytics row"),
            }
        }
        subscriptions.sort_by_key(|s| (s.start_time, s.id));

        let tiers = list_tiers(content_nft, creator_id, self.strategy).await?;
        let mut tier_stats = Vec::with_capacity(tiers.len());
        for tier in &tiers {
            let count = match content_nft.tier_subscriber_count(creator_id, tier.id).await {
                Ok(count) => Some(count),
                Err(err) => {
                    warn!(tier = %tier.id, error = %err, "tier subscriber count unavailable");
                    None
                }
            };
            tier_stats.push(TierStats::new(tier, count));
        }

        let resolved = self
            .metadata
            .resolve(&record.metadata_uri, &creator_fallback_name(record.id))
            .await;
        Ok(CreatorAnalyticsView {
            creator: CreatorView::new(&record, resolved),
            active_subscriptions: subscriptions.iter().filter(|s| s.is_active_at(now)).count(),
            recent_subscriptions: subscriptions
                .iter()
                .filter(|s| s.start_time > now.saturating_sub(WINDOW))
                .count(),
            tiers: tier_stats,
            history: subscriptions.iter().map(RevenuePoint::from).collect(),
        })
    }

    /// Failed checks count as no access.
    async fn viewer_holds(&self, tier_id: U256) -> bool {
        let signer = self.contracts.signer();
        match self.contracts.content_nft.has_access(signer, tier_id).await {
            Ok(granted) => granted,
            Err(err) => {
                warn!(tier = %tier_id, error = %err, "access check failed, content stays locked");
                false
            }
        }
    }

    async fn own_creator_id(&self) -> Result<U256> {
        let signer = self.contracts.signer();
        self.contracts
            .creator_registry
            .get_creator_id_by_wallet(signer)
            .await?
            .ok_or_else(|| ClientError::not_found("creator", signer))
    }

    /// Resolves metadata for every row concurrently and keeps row order.
    async fn resolve_creators(&self, records: Vec<CreatorRecord>) -> Vec<CreatorView> {
        let uris = records
            .iter()
            .map(|record| (record.metadata_uri.clone(), creator_fallback_name(record.id)))
            .collect();
        let resolved = self.resolve_all(uris).await;
        records
            .iter()
            .zip(resolved)
            .map(|(record, metadata)| CreatorView::new(record, metadata))
            .collect()
    }

    async fn resolve_tiers(&self, tiers: Vec<TierRecord>, check_access: bool) -> Vec<TierView> {
        let uris = tiers
            .iter()
            .map(|tier| (tier.metadata_uri.clone(), tier_fallback_name(tier)))
            .collect();
        let resolved = self.resolve_all(uris).await;

        let signer = self.contracts.signer();
        let mut views = Vec::with_capacity(tiers.len());
        for (tier, metadata) in tiers.iter().zip(resolved) {
            let has_access = if check_access {
                match self.contracts.content_nft.has_access(signer, tier.id).await {
                    Ok(granted) => Some(granted),
                    Err(err) => {
                        warn!(tier = %tier.id, error = %err, "access check failed");
                        None
                    }
                }
            } else {
                None
            };
            views.push(TierView::new(tier, metadata, has_access));
        }
        views
    }

    async fn resolve_all(&self, uris: Vec<(String, String)>) -> Vec<ResolvedMetadata> {
        let mut tasks = JoinSet::new();
        for (index, (uri, fallback_name)) in uris.iter().cloned().enumerate() {
            let resolver = self.metadata.clone();
            tasks.spawn(async move { (index, resolver.resolve(&uri, &fallback_name).await) });
        }

        let mut resolved: Vec<Option<ResolvedMetadata>> = vec![None; uris.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, metadata)) => resolved[index] = Some(metadata),
                Err(err) => warn!(error = %err, "metadata task failed"),
            }
        }

        uris.iter()
            .zip(resolved)
            .map(|((_, fallback_name), metadata)| {
                metadata.unwrap_or_else(|| ResolvedMetadata {
                    metadata: self.metadata.placeholder(fallback_name),
                    fallback: true,
                })
            })
            .collect()
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}
