use std::future::Future;

use alloy_primitives::U256;
use tracing::{debug, warn};

use crate::config::{ListingConfig, ListingStrategyKind};
use crate::contracts::{ContentNft, CreatorRegistry};
use crate::provider::WalletProvider;
use crate::types::errors::Result;
use crate::types::{ContentRecord, CreatorRecord, TierRecord};

/// How list-shaped data is enumerated. The contracts have no paginated
/// listing, so either ids are probed from 1 until one is missing, or a
/// count getter says how many ids exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingStrategy {
    Probe { max_probe: u64 },
    Count { max_count: u64 },
}

impl From<&ListingConfig> for ListingStrategy {
    fn from(config: &ListingConfig) -> Self {
        match config.strategy {
            ListingStrategyKind::Probe => ListingStrategy::Probe {
                max_probe: config.max_probe,
            },
            ListingStrategyKind::Count => ListingStrategy::Count {
                max_count: config.max_count,
            },
        }
    }
}

/// Fetches ids `1..=max_probe` in order, stopping at the first `NotFound`.
/// Any other error aborts the listing.
pub async fn probe_ids<T, F, Fut>(max_probe: u64, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(U256) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut items = Vec::new();
    for id in 1..=max_probe {
        match fetch(U256::from(id)).await {
            Ok(item) => items.push(item),
            Err(err) if err.is_not_found() => {
                debug!(id, "probe reached end of list");
                break;
            }
            Err(err) => return Err(err),
        }
    }
    Ok(items)
}

/// Fetches ids `1..=count`; ids reported missing are skipped. The count
/// comes from the contract, so it is clamped to `max_count`.
pub async fn fetch_counted<T, F, Fut>(count: u64, max_count: u64, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(U256) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let bounded = count.min(max_count);
    if bounded < count {
        warn!(count, max_count, "reported count exceeds listing bound, truncating");
    }
    let mut items = Vec::new();
    for id in 1..=bounded {
        match fetch(U256::from(id)).await {
            Ok(item) => items.push(item),
            Err(err) if err.is_not_found() => debug!(id, "counted id missing, skipping"),
            Err(err) => return Err(err),
        }
    }
    Ok(items)
}

pub async fn list_creators<P: WalletProvider>(
    registry: &CreatorRegistry<P>,
    strategy: ListingStrategy,
) -> Result<Vec<CreatorRecord>> {
    match strategy {
        ListingStrategy::Probe { max_probe } => {
            probe_ids(max_probe, |id| registry.get_creator(id)).await
        }
        ListingStrategy::Count { max_count } => {
            let total = registry.total_creators().await?;
            fetch_counted(total, max_count, |id| registry.get_creator(id)).await
        }
    }
}

pub async fn list_tiers<P: WalletProvider>(
    content_nft: &ContentNft<P>,
    creator_id: U256,
    strategy: ListingStrategy,
) -> Result<Vec<TierRecord>> {
    match strategy {
        ListingStrategy::Probe { max_probe } => {
            probe_ids(max_probe, |tier_id| content_nft.get_tier(creator_id, tier_id)).await
        }
        ListingStrategy::Count { max_count } => {
            let count = content_nft.tier_count(creator_id).await?;
            fetch_counted(count, max_count, |tier_id| {
                content_nft.get_tier(creator_id, tier_id)
            })
            .await
        }
    }
}

/// Content of one creator, in mint order.
pub async fn list_content<P: WalletProvider>(
    content_nft: &ContentNft<P>,
    creator_id: U256,
    strategy: ListingStrategy,
) -> Result<Vec<ContentRecord>> {
    match strategy {
        ListingStrategy::Probe { max_probe } => {
            probe_ids(max_probe, |index| content_nft.get_content(creator_id, index)).await
        }
        ListingStrategy::Count { max_count } => {
            let count = content_nft.content_count(creator_id).await?;
            fetch_counted(count, max_count, |index| {
                content_nft.get_content(creator_id, index)
            })
            .await
        }
    }
}
