use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use alloy_primitives::Address;
use tokio::sync::{mpsc, watch, RwLock};
use tracing::{debug, info, warn};

use super::{ConnectionState, Session};
use crate::config::ClientConfig;
use crate::contracts::{CallSettings, ContractHandleSet};
use crate::fetchers::ViewScope;
use crate::provider::WalletProvider;
use crate::types::errors::{ClientError, Result};
use crate::types::events::{WalletEvent, WalletEventKind};

struct SessionState<P> {
    session: Session,
    contracts: Option<Arc<ContractHandleSet<P>>>,
}

/// Owns the wallet connection for the whole application. Construct one at
/// the root and hand out the `Arc`; it is the only writer of session state
/// and the only place wallet listeners are registered.
pub struct SessionManager<P: WalletProvider> {
    provider: Option<Arc<P>>,
    config: Arc<ClientConfig>,
    state: RwLock<SessionState<P>>,
    generation: Arc<AtomicU64>,
    listeners_registered: AtomicBool,
    changes: watch::Sender<Session>,
}

impl<P: WalletProvider> SessionManager<P> {
    /// `provider` is `None` when no wallet is installed; every connection
    /// attempt then fails with `WalletNotFound`.
    pub fn new(provider: Option<Arc<P>>, config: Arc<ClientConfig>) -> Arc<Self> {
        let (changes, _) = watch::channel(Session::default());
        Arc::new(Self {
            provider,
            config,
            state: RwLock::new(SessionState {
                session: Session::default(),
                contracts: None,
            }),
            generation: Arc::new(AtomicU64::new(0)),
            listeners_registered: AtomicBool::new(false),
            changes,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn session(&self) -> Session {
        self.state.read().await.session.clone()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Snapshots pushed on every session change.
    pub fn subscribe_changes(&self) -> watch::Receiver<Session> {
        self.changes.subscribe()
    }

    /// Staleness guard for a view started now.
    pub fn scope(&self) -> ViewScope {
        ViewScope::new(Arc::clone(&self.generation))
    }

    pub async fn contracts(&self) -> Result<Arc<ContractHandleSet<P>>> {
        self.state
            .read()
            .await
            .contracts
            .clone()
            .ok_or(ClientError::NotConnected)
    }

    /// Picks up an existing authorization without prompting.
    pub async fn try_restore_session(self: &Arc<Self>) -> Result<Session> {
        let provider = self.require_provider().await?;
        self.register_listeners(&provider);

        let current = self.session().await;
        if current.is_connected() {
            return Ok(current);
        }

        let expected = self.generation();
        let accounts = match provider.authorized_accounts().await {
            Ok(accounts) => accounts,
            Err(err) => return Err(self.fail_at(expected, err.into()).await),
        };
        match accounts.first().copied() {
            Some(address) => {
                info!(%address, "restoring authorized session");
                let Some(expected) = self.mark_connecting(expected).await else {
                    return Ok(self.session().await);
                };
                self.establish(&provider, address, None, expected).await
            }
            None => {
                debug!("no authorized accounts");
                Ok(self.session().await)
            }
        }
    }

    /// Prompts the wallet for account access.
    pub async fn connect(self: &Arc<Self>) -> Result<Session> {
        let provider = self.require_provider().await?;
        self.register_listeners(&provider);

        let current = self.session().await;
        if current.is_connected() {
            return Ok(current);
        }

        let Some(expected) = self.mark_connecting(self.generation()).await else {
            return Ok(self.session().await);
        };
        let accounts = match provider.request_accounts().await {
            Ok(accounts) => accounts,
            Err(err) => return Err(self.fail_at(expected, err.into()).await),
        };
        let Some(address) = accounts.first().copied() else {
            return Err(self.fail_at(expected, ClientError::UserRejected).await);
        };
        self.establish(&provider, address, None, expected).await
    }

    /// Local reset. The wallet keeps its own authorization.
    pub async fn disconnect(&self) -> Session {
        let mut state = self.state.write().await;
        let generation = self.next_generation();
        state.session = Session::disconnected(generation, None);
        state.contracts = None;
        info!(generation, "session disconnected");
        self.publish(&state.session);
        state.session.clone()
    }

    pub async fn on_accounts_changed(&self, accounts: Vec<Address>) -> Result<Session> {
        let Some(address) = accounts.first().copied() else {
            return Ok(self.disconnect().await);
        };
        let provider = self.require_provider().await?;

        let expected = self.generation();
        let current = self.session().await;
        if current.is_connected() && current.address == Some(address) {
            return Ok(current);
        }
        info!(%address, "wallet account changed");
        self.establish(&provider, address, current.chain_id, expected).await
    }

    /// Contract addresses are per chain, so nothing survives a chain switch:
    /// tear down, then restore on the new chain.
    pub async fn on_chain_changed(&self, chain_id: u64) -> Result<Session> {
        info!(chain_id, "wallet chain changed, rebuilding session");
        let expected = self.disconnect().await.generation;
        let provider = self.require_provider().await?;

        let accounts = match provider.authorized_accounts().await {
            Ok(accounts) => accounts,
            Err(err) => return Err(self.fail_at(expected, err.into()).await),
        };
        match accounts.first().copied() {
            Some(address) => {
                let Some(expected) = self.mark_connecting(expected).await else {
                    return Ok(self.session().await);
                };
                self.establish(&provider, address, Some(chain_id), expected)
                    .await
            }
            None => Ok(self.session().await),
        }
    }

    pub async fn handle_wallet_event(&self, event: WalletEvent) -> Result<Session> {
        match event {
            WalletEvent::AccountsChanged(accounts) => self.on_accounts_changed(accounts).await,
            WalletEvent::ChainChanged(chain_id) => self.on_chain_changed(chain_id).await,
        }
    }

    /// Registers both wallet listeners once per manager. Events are queued
    /// and applied by a single task, in arrival order.
    fn register_listeners(self: &Arc<Self>, provider: &Arc<P>) {
        if self.listeners_registered.swap(true, Ordering::SeqCst) {
            return;
        }

        let (tx, mut rx) = mpsc::unbounded_channel::<WalletEvent>();
        for kind in [WalletEventKind::AccountsChanged, WalletEventKind::ChainChanged] {
            let tx = tx.clone();
            provider.subscribe(
                kind,
                Box::new(move |event| {
                    let _ = tx.send(event);
                }),
            );
        }

        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let Some(manager) = weak.upgrade() else {
                    break;
                };
                let kind = event.kind();
                if let Err(err) = manager.handle_wallet_event(event).await {
                    warn!(event = kind.as_str(), error = %err, "wallet event not applied");
                }
            }
        });
        debug!("wallet listeners registered");
    }

    /// Connects `address` unless the session moved past `expected` while
    /// the wallet was being queried. A superseded attempt leaves the newer
    /// session in place and returns it.
    async fn establish(
        &self,
        provider: &Arc<P>,
        address: Address,
        known_chain: Option<u64>,
        expected: u64,
    ) -> Result<Session> {
        let chain_id = match known_chain {
            Some(chain_id) => chain_id,
            None => match provider.chain_id().await {
                Ok(chain_id) => chain_id,
                Err(err) => return Err(self.fail_at(expected, err.into()).await),
            },
        };

        // Unsupported chains are a warning, not a block.
        let warning = if self.config.is_supported(chain_id) {
            None
        } else {
            let err = ClientError::UnsupportedChain { chain_id };
            warn!(chain_id, "connected to an unsupported chain");
            Some(err.to_string())
        };

        let deployment = match self.config.deployment_for(chain_id) {
            Ok(deployment) => deployment,
            Err(err) => return Err(self.fail_at(expected, err).await),
        };

        let mut state = self.state.write().await;
        if self.generation() != expected {
            debug!(
                %address,
                expected,
                current = self.generation(),
                "superseded connection attempt discarded"
            );
            return Ok(state.session.clone());
        }
        let generation = self.next_generation();
        let contracts = ContractHandleSet::build(
            Arc::clone(provider),
            &deployment,
            address,
            chain_id,
            CallSettings::from_config(&self.config),
            generation,
        );
        state.contracts = Some(Arc::new(contracts));
        state.session = Session {
            address: Some(address),
            chain_id: Some(chain_id),
            state: ConnectionState::Connected,
            last_error: warning,
            generation,
        };
        info!(%address, chain_id, generation, "session connected");
        self.publish(&state.session);
        Ok(state.session.clone())
    }

    /// Starts a connection attempt. Returns the attempt's generation, or
    /// `None` when the session already moved past `expected`.
    async fn mark_connecting(&self, expected: u64) -> Option<u64> {
        let mut state = self.state.write().await;
        if self.generation() != expected {
            debug!(expected, current = self.generation(), "connection attempt superseded");
            return None;
        }
        let generation = self.next_generation();
        state.contracts = None;
        state.session.state = ConnectionState::Connecting;
        state.session.last_error = None;
        state.session.generation = generation;
        self.publish(&state.session);
        Some(generation)
    }

    /// Records `err` as the session error and drops back to Disconnected.
    async fn fail(&self, err: ClientError) -> ClientError {
        let mut state = self.state.write().await;
        self.record_failure(&mut state, &err);
        err
    }

    /// Like `fail`, but a failure from a superseded attempt is only
    /// returned to its caller.
    async fn fail_at(&self, expected: u64, err: ClientError) -> ClientError {
        let mut state = self.state.write().await;
        if self.generation() == expected {
            self.record_failure(&mut state, &err);
        } else {
            debug!(error = %err, expected, "failure from superseded attempt not recorded");
        }
        err
    }

    fn record_failure(&self, state: &mut SessionState<P>, err: &ClientError) {
        let generation = if state.session.address.is_some() || state.contracts.is_some() {
            self.next_generation()
        } else {
            self.generation()
        };
        state.session = Session::disconnected(generation, Some(err.to_string()));
        state.contracts = None;
        warn!(error = %err, "session error");
        self.publish(&state.session);
    }

    async fn require_provider(&self) -> Result<Arc<P>> {
        match &self.provider {
            Some(provider) => Ok(Arc::clone(provider)),
            None => Err(self.fail(ClientError::WalletNotFound).await),
        }
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn publish(&self, session: &Session) {
        self.changes.send_replace(session.clone());
    }
}
