pub mod types;
pub mod provider;
pub mod contracts;
pub mod session;
pub mod fetchers;
pub mod config;
pub mod retry;
pub mod utils;

// Re-export the main entry points
pub use config::ClientConfig;
pub use contracts::{ContentNft, ContractHandleSet, CreatorRegistry, SubscriptionManager, TxReceipt};
pub use fetchers::{Fetcher, ViewScope};
pub use provider::{HttpProvider, WalletProvider};
pub use session::{ConnectionState, Session, SessionManager};
pub use types::errors::{ClientError, ProviderError, Result};
