//! Typed wrappers over the three deployed contracts.
//!
//! Nothing here caches: after a successful write the caller re-fetches
//! whatever it displays.

use std::fmt::Display;
use std::sync::Arc;

use alloy_primitives::Address;

pub mod caller;
pub mod content_nft;
pub mod creator_registry;
pub mod subscription_manager;

pub use caller::{CallSettings, ContractCaller, TxReceipt};
pub use content_nft::ContentNft;
pub use creator_registry::CreatorRegistry;
pub use subscription_manager::{subscription_cost, SubscriptionManager};

use crate::config::Deployment;
use crate::provider::WalletProvider;
use crate::types::errors::ClientError;

/// The three handles for one identity. Built together and replaced together;
/// a set is never patched in place.
pub struct ContractHandleSet<P> {
    pub creator_registry: CreatorRegistry<P>,
    pub content_nft: ContentNft<P>,
    pub subscription_manager: SubscriptionManager<P>,
    signer: Address,
    chain_id: u64,
    generation: u64,
}

impl<P: WalletProvider> ContractHandleSet<P> {
    pub fn build(
        provider: Arc<P>,
        deployment: &Deployment,
        signer: Address,
        chain_id: u64,
        settings: CallSettings,
        generation: u64,
    ) -> Self {
        let caller = |address| {
            ContractCaller::new(Arc::clone(&provider), address, signer, settings.clone())
        };
        Self {
            creator_registry: CreatorRegistry::new(caller(deployment.creator_registry)),
            content_nft: ContentNft::new(caller(deployment.content_nft)),
            subscription_manager: SubscriptionManager::new(caller(deployment.subscription_manager)),
            signer,
            chain_id,
            generation,
        }
    }
}

impl<P> ContractHandleSet<P> {
    pub fn signer(&self) -> Address {
        self.signer
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Session generation this set was built for.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Lower-cased revert reasons that mean "no such id".
const MISSING_ID_REASONS: [&str; 6] = [
    "not found",
    "does not exist",
    "nonexistent",
    "invalid",
    "out-of-bounds",
    "out of bounds",
];

/// Getters by id revert when the id was never assigned. Only a bare revert
/// or one of the reasons above counts as missing; anything else (a paused
/// contract, say) stays a chain rejection.
pub(crate) fn not_found_on_revert(err: ClientError, entity: &'static str, id: impl Display) -> ClientError {
    match err {
        ClientError::ChainRejected { reason } if is_missing_id_reason(&reason) => {
            ClientError::not_found(entity, id)
        }
        other => other,
    }
}

fn is_missing_id_reason(reason: &str) -> bool {
    let reason = reason.trim().to_ascii_lowercase();
    reason.is_empty()
        || reason == "execution reverted"
        || MISSING_ID_REASONS.iter().any(|pattern| reason.contains(pattern))
}
