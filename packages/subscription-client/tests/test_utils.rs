#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::{Revert, SolCall, SolError, SolInterface};
use serde_json::{json, Value};
use subscription_client::provider::{WalletEventHandler, WalletProvider};
use subscription_client::types::errors::{
    ProviderError, EXECUTION_REVERTED_CODE, INTERNAL_ERROR_CODE, METHOD_NOT_FOUND_CODE,
};
use subscription_client::types::events::{WalletEvent, WalletEventKind};
use subscription_client::types::interfaces::{
    ContentData, CreatorData, IContentNFT, ICreatorRegistry, ISubscriptionManager,
    SubscriptionData, TierData,
};
use subscription_client::{ClientConfig, Session, SessionManager};

pub const TEST_CHAIN_ID: u64 = 31337;
pub const MONTH: u64 = 30 * 24 * 60 * 60;
pub const GENESIS_TIME: u64 = 1_700_000_000;

pub fn registry_address() -> Address {
    Address::repeat_byte(0x01)
}

pub fn content_nft_address() -> Address {
    Address::repeat_byte(0x02)
}

pub fn subscription_manager_address() -> Address {
    Address::repeat_byte(0x03)
}

pub fn generate_test_accounts(count: usize) -> Vec<Address> {
    (0..count)
        .map(|i| {
            let mut bytes = [0u8; 20];
            bytes[0] = 0xaa;
            bytes[19] = i as u8;
            Address::from(bytes)
        })
        .collect()
}

pub fn milli_ether(amount: u64) -> U256 {
    U256::from(amount) * U256::from(10u64).pow(U256::from(15))
}

/// Config pointing at the mock's contract addresses, with short timeouts
/// and retry delays.
pub fn test_config(gateway: &str) -> ClientConfig {
    let content = format!(
        r#"
supported_chains = [1, 11155111, {TEST_CHAIN_ID}]

[contracts]
creator_registry = "{registry}"
content_nft = "{nft}"
subscription_manager = "{manager}"

[calls]
timeout_ms = 2000
tx_timeout_ms = 2000
receipt_poll_ms = 10

[retry]
max_attempts = 3
delay_ms = 5

[listing]
max_probe = 20

[metadata]
gateway = "{gateway}"
timeout_ms = 200
"#,
        registry = registry_address(),
        nft = content_nft_address(),
        manager = subscription_manager_address(),
    );
    ClientConfig::from_toml_str(&content).expect("test config")
}

/// A gateway nothing listens on.
pub const UNREACHABLE_GATEWAY: &str = "http://127.0.0.1:9/ipfs/";

fn revert(reason: &str) -> ProviderError {
    let payload = Revert {
        reason: reason.to_string(),
    }
    .abi_encode();
    ProviderError {
        code: EXECUTION_REVERTED_CODE,
        message: "execution reverted".to_string(),
        data: Some(json!(format!("0x{}", hex::encode(payload)))),
    }
}

/// In-memory contract state mirroring the three deployed contracts.
#[derive(Clone, Default)]
pub struct ChainState {
    pub now: u64,
    pub creators: Vec<CreatorData>,
    pub creator_by_wallet: HashMap<Address, U256>,
    pub tiers: HashMap<U256, Vec<TierData>>,
    pub access: BTreeSet<(Address, U256)>,
    pub subscriptions: Vec<SubscriptionData>,
    /// Content tokens in mint order; token id is the position plus one.
    pub contents: Vec<ContentData>,
    /// Every call reverts while set.
    pub paused: bool,
}

impl ChainState {
    fn creator_mut(&mut self, id: U256) -> Option<&mut CreatorData> {
        let index: usize = id.saturating_to();
        index.checked_sub(1).and_then(|i| self.creators.get_mut(i))
    }

    fn creator(&self, id: U256) -> Option<&CreatorData> {
        let index: usize = id.saturating_to();
        index.checked_sub(1).and_then(|i| self.creators.get(i))
    }

    fn tier(&self, creator_id: U256, tier_id: U256) -> Option<&TierData> {
        let index: usize = tier_id.saturating_to();
        let tiers = self.tiers.get(&creator_id)?;
        index.checked_sub(1).and_then(|i| tiers.get(i))
    }

    fn subscription_mut(&mut self, id: U256) -> Option<&mut SubscriptionData> {
        let index: usize = id.saturating_to();
        index.checked_sub(1).and_then(|i| self.subscriptions.get_mut(i))
    }

    pub fn add_creator(&mut self, wallet: Address, metadata_uri: &str) -> U256 {
        let id = U256::from(self.creators.len() + 1);
        self.creators.push(CreatorData {
            id,
            wallet,
            metadata_uri: metadata_uri.to_string(),
            total_subscribers: U256::ZERO,
            total_earnings: U256::ZERO,
            is_verified: false,
            created_at: U256::from(self.now),
            updated_at: U256::from(self.now),
        });
        self.creator_by_wallet.insert(wallet, id);
        id
    }

    pub fn add_tier(&mut self, creator_id: U256, name: &str, metadata_uri: &str, price: U256) -> U256 {
        let now = self.now;
        let tiers = self.tiers.entry(creator_id).or_default();
        let id = U256::from(tiers.len() + 1);
        tiers.push(TierData {
            id,
            creator_id,
            name: name.to_string(),
            metadata_uri: metadata_uri.to_string(),
            price,
            created_at: U256::from(now),
        });
        id
    }

    pub fn add_subscription(
        &mut self,
        subscriber: Address,
        creator_id: U256,
        tier_id: U256,
        months: u64,
        amount: U256,
    ) -> U256 {
        let id = U256::from(self.subscriptions.len() + 1);
        self.subscriptions.push(SubscriptionData {
            id,
            subscriber,
            creator_id,
            tier_id,
            amount,
            start_time: U256::from(self.now),
            end_time: U256::from(self.now + months * MONTH),
            status: 0,
            payment_type: 0,
            token_address: Address::ZERO,
        });
        if let Some(creator) = self.creator_mut(creator_id) {
            creator.total_subscribers += U256::from(1);
            creator.total_earnings += amount;
        }
        self.access.insert((subscriber, tier_id));
        id
    }

    pub fn add_content(&mut self, creator_id: U256, tier_id: U256, content_uri: &str) -> U256 {
        let id = U256::from(self.contents.len() + 1);
        self.contents.push(ContentData {
            id,
            creator_id,
            tier_id,
            content_uri: content_uri.to_string(),
            created_at: U256::from(self.now),
        });
        id
    }

    fn content(&self, token_id: U256) -> Option<&ContentData> {
        let index: usize = token_id.saturating_to();
        index.checked_sub(1).and_then(|i| self.contents.get(i))
    }

    /// Executes one call from `from`. Mutations land on `self`; callers
    /// simulate by running against a clone.
    fn execute(
        &mut self,
        from: Address,
        to: Address,
        data: &[u8],
        value: U256,
    ) -> Result<Vec<u8>, ProviderError> {
        let malformed = |e: alloy_sol_types::Error| ProviderError::new(EXECUTION_REVERTED_CODE, e.to_string());
        if self.paused {
            return Err(revert("Pausable: paused"));
        }
        if to == registry_address() {
            let call = ICreatorRegistry::ICreatorRegistryCalls::abi_decode(data, true).map_err(malformed)?;
            self.execute_registry(from, call)
        } else if to == content_nft_address() {
            let call = IContentNFT::IContentNFTCalls::abi_decode(data, true).map_err(malformed)?;
            self.execute_content_nft(from, call)
        } else if to == subscription_manager_address() {
            let call = ISubscriptionManager::ISubscriptionManagerCalls::abi_decode(data, true)
                .map_err(malformed)?;
            self.execute_subscription_manager(from, value, call)
        } else {
            Ok(Vec::new())
        }
    }

    fn execute_registry(
        &mut self,
        from: Address,
        call: ICreatorRegistry::ICreatorRegistryCalls,
    ) -> Result<Vec<u8>, ProviderError> {
        use ICreatorRegistry::*;
        match call {
            ICreatorRegistryCalls::registerCreator(c) => {
                if self.creator_by_wallet.contains_key(&from) {
                    return Err(revert("Creator already registered"));
                }
                self.add_creator(from, &c.metadata_uri);
                Ok(registerCreatorCall::abi_encode_returns(&()))
            }
            ICreatorRegistryCalls::updateCreator(c) => {
                let now = self.now;
                let id = *self.creator_by_wallet.get(&from).ok_or_else(|| revert("Not a creator"))?;
                if let Some(creator) = self.creator_mut(id) {
                    creator.metadata_uri = c.metadata_uri;
                    creator.updated_at = U256::from(now);
                }
                Ok(updateCreatorCall::abi_encode_returns(&()))
            }
            ICreatorRegistryCalls::getCreator(c) => {
                let creator = self
                    .creator(c.creator_id)
                    .cloned()
                    .ok_or_else(|| revert("Creator not found"))?;
                Ok(getCreatorCall::abi_encode_returns(&(creator,)))
            }
            ICreatorRegistryCalls::getCreatorIdByWallet(c) => {
                let id = self.creator_by_wallet.get(&c.wallet).copied().unwrap_or_default();
                Ok(getCreatorIdByWalletCall::abi_encode_returns(&(id,)))
            }
            ICreatorRegistryCalls::isVerifiedCreator(c) => {
                let verified = self
                    .creator_by_wallet
                    .get(&c.wallet)
                    .and_then(|id| self.creator(*id))
                    .is_some_and(|creator| creator.is_verified);
                Ok(isVerifiedCreatorCall::abi_encode_returns(&(verified,)))
            }
            ICreatorRegistryCalls::getTotalCreators(_) => {
                let total = U256::from(self.creators.len());
                Ok(getTotalCreatorsCall::abi_encode_returns(&(total,)))
            }
        }
    }

    fn execute_content_nft(
        &mut self,
        from: Address,
        call: IContentNFT::IContentNFTCalls,
    ) -> Result<Vec<u8>, ProviderError> {
        use IContentNFT::*;
        match call {
            IContentNFTCalls::createTier(c) => {
                let creator_id = *self.creator_by_wallet.get(&from).ok_or_else(|| revert("Not a creator"))?;
                if c.price.is_zero() {
                    return Err(revert("Price must be positive"));
                }
                let id = self.add_tier(creator_id, &c.name, &c.metadata_uri, c.price);
                Ok(createTierCall::abi_encode_returns(&(id,)))
            }
            IContentNFTCalls::getTier(c) => {
                let tier = self
                    .tier(c.creator_id, c.tier_id)
                    .cloned()
                    .ok_or_else(|| revert("Tier not found"))?;
                Ok(getTierCall::abi_encode_returns(&(tier,)))
            }
            IContentNFTCalls::getTierCount(c) => {
                let count = U256::from(self.tiers.get(&c.creator_id).map_or(0, Vec::len));
                Ok(getTierCountCall::abi_encode_returns(&(count,)))
            }
            IContentNFTCalls::hasAccess(c) => {
                let granted = self.access.contains(&(c.account, c.tier_id));
                Ok(hasAccessCall::abi_encode_returns(&(granted,)))
            }
            IContentNFTCalls::uri(c) => {
                let token_uri = format!("ipfs://pass-{}", c.id);
                Ok(uriCall::abi_encode_returns(&(token_uri,)))
            }
            IContentNFTCalls::mintContent(c) => {
                let creator_id = *self.creator_by_wallet.get(&from).ok_or_else(|| revert("Not a creator"))?;
                if self.tier(creator_id, c.tier_id).is_none() {
                    return Err(revert("Tier not found"));
                }
                let id = self.add_content(creator_id, c.tier_id, &c.content_uri);
                self.access.insert((from, c.tier_id));
                Ok(mintContentCall::abi_encode_returns(&(id,)))
            }
            IContentNFTCalls::getContentCount(c) => {
                let count = self.contents.iter().filter(|item| item.creator_id == c.creator_id).count();
                Ok(getContentCountCall::abi_encode_returns(&(U256::from(count),)))
            }
            IContentNFTCalls::getContent(c) => {
                let index: usize = c.index.saturating_to();
                let content = index
                    .checked_sub(1)
                    .and_then(|i| {
                        self.contents
                            .iter()
                            .filter(|item| item.creator_id == c.creator_id)
                            .nth(i)
                    })
                    .cloned()
                    .ok_or_else(|| revert("Content not found"))?;
                Ok(getContentCall::abi_encode_returns(&(content,)))
            }
            IContentNFTCalls::getTokenTier(c) => {
                let tier_id = self
                    .content(c.token_id)
                    .map(|item| item.tier_id)
                    .ok_or_else(|| revert("Content not found"))?;
                Ok(getTokenTierCall::abi_encode_returns(&(tier_id,)))
            }
            IContentNFTCalls::getContentURI(c) => {
                let content_uri = self
                    .content(c.token_id)
                    .map(|item| item.content_uri.clone())
                    .ok_or_else(|| revert("Content not found"))?;
                Ok(getContentURICall::abi_encode_returns(&(content_uri,)))
            }
            IContentNFTCalls::getTierSubscriberCount(c) => {
                let count = self
                    .subscriptions
                    .iter()
                    .filter(|s| s.creator_id == c.creator_id && s.tier_id == c.tier_id && s.status == 0)
                    .count();
                Ok(getTierSubscriberCountCall::abi_encode_returns(&(U256::from(count),)))
            }
        }
    }

    fn execute_subscription_manager(
        &mut self,
        from: Address,
        value: U256,
        call: ISubscriptionManager::ISubscriptionManagerCalls,
    ) -> Result<Vec<u8>, ProviderError> {
        use ISubscriptionManager::*;
        match call {
            ISubscriptionManagerCalls::subscribe(c) => {
                let price = self
                    .tier(c.creator_id, c.tier_id)
                    .map(|tier| tier.price)
                    .ok_or_else(|| revert("Tier not found"))?;
                if c.months.is_zero() {
                    return Err(revert("Invalid duration"));
                }
                if value < price * c.months {
                    return Err(revert("Insufficient payment"));
                }
                let months: u64 = c.months.saturating_to();
                let id = self.add_subscription(from, c.creator_id, c.tier_id, months, value);
                Ok(subscribeCall::abi_encode_returns(&(id,)))
            }
            ISubscriptionManagerCalls::renewSubscription(c) => {
                let subscription = self
                    .subscription_mut(c.subscription_id)
                    .ok_or_else(|| revert("Subscription not found"))?;
                if subscription.subscriber != from {
                    return Err(revert("Not subscription owner"));
                }
                let months: u64 = c.months.saturating_to();
                subscription.end_time += U256::from(months * MONTH);
                subscription.amount += value;
                Ok(renewSubscriptionCall::abi_encode_returns(&()))
            }
            ISubscriptionManagerCalls::cancelSubscription(c) => {
                let subscription = self
                    .subscription_mut(c.subscription_id)
                    .ok_or_else(|| revert("Subscription not found"))?;
                if subscription.subscriber != from {
                    return Err(revert("Not subscription owner"));
                }
                subscription.status = 2;
                Ok(cancelSubscriptionCall::abi_encode_returns(&()))
            }
            ISubscriptionManagerCalls::isSubscriptionActive(c) => {
                let now = self.now;
                let active = self
                    .subscription_mut(c.subscription_id)
                    .is_some_and(|s| s.status == 0 && U256::from(now) < s.end_time);
                Ok(isSubscriptionActiveCall::abi_encode_returns(&(active,)))
            }
            ISubscriptionManagerCalls::getSubscription(c) => {
                let subscription = self
                    .subscription_mut(c.subscription_id)
                    .cloned()
                    .ok_or_else(|| revert("Subscription not found"))?;
                Ok(getSubscriptionCall::abi_encode_returns(&(subscription,)))
            }
            ISubscriptionManagerCalls::getSubscriptionsBySubscriber(c) => {
                let ids: Vec<U256> = self
                    .subscriptions
                    .iter()
                    .filter(|s| s.subscriber == c.subscriber)
                    .map(|s| s.id)
                    .collect();
                Ok(getSubscriptionsBySubscriberCall::abi_encode_returns(&(ids,)))
            }
            ISubscriptionManagerCalls::getSubscriberSubscriptions(c) => {
                let ids: Vec<U256> = self
                    .subscriptions
                    .iter()
                    .filter(|s| s.subscriber == c.subscriber && s.creator_id == c.creator_id)
                    .map(|s| s.id)
                    .collect();
                Ok(getSubscriberSubscriptionsCall::abi_encode_returns(&(ids,)))
            }
            ISubscriptionManagerCalls::getSubscriptionsByCreator(c) => {
                let ids: Vec<U256> = self
                    .subscriptions
                    .iter()
                    .filter(|s| s.creator_id == c.creator_id)
                    .map(|s| s.id)
                    .collect();
                Ok(getSubscriptionsByCreatorCall::abi_encode_returns(&(ids,)))
            }
        }
    }
}

struct WalletState {
    accounts: Vec<Address>,
    authorized: bool,
    chain_id: u64,
    reject_requests: bool,
    chain: ChainState,
    receipts: HashMap<B256, u64>,
    block_number: u64,
    sent: Vec<Value>,
    methods: Vec<String>,
    send_delay: Option<Duration>,
    withhold_receipts: bool,
}

/// In-memory EIP-1193 wallet backed by [`ChainState`].
pub struct MockWallet {
    state: Mutex<WalletState>,
    listeners: Mutex<Vec<(WalletEventKind, WalletEventHandler)>>,
    failing_reads: AtomicU32,
    failing_sends: AtomicU32,
    eth_calls: AtomicUsize,
}

impl MockWallet {
    pub fn new(accounts: Vec<Address>, chain_id: u64) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(WalletState {
                accounts,
                authorized: false,
                chain_id,
                reject_requests: false,
                chain: ChainState {
                    now: GENESIS_TIME,
                    ..ChainState::default()
                },
                receipts: HashMap::new(),
                block_number: 1,
                sent: Vec::new(),
                methods: Vec::new(),
                send_delay: None,
                withhold_receipts: false,
            }),
            listeners: Mutex::new(Vec::new()),
            failing_reads: AtomicU32::new(0),
            failing_sends: AtomicU32::new(0),
            eth_calls: AtomicUsize::new(0),
        })
    }

    /// A wallet that already granted access to `accounts`.
    pub fn authorized(accounts: Vec<Address>, chain_id: u64) -> Arc<Self> {
        let wallet = Self::new(accounts, chain_id);
        wallet.set_authorized(true);
        wallet
    }

    pub fn set_authorized(&self, authorized: bool) {
        self.state.lock().unwrap().authorized = authorized;
    }

    pub fn set_accounts(&self, accounts: Vec<Address>) {
        self.state.lock().unwrap().accounts = accounts;
    }

    pub fn set_chain_id(&self, chain_id: u64) {
        self.state.lock().unwrap().chain_id = chain_id;
    }

    pub fn reject_requests(&self, reject: bool) {
        self.state.lock().unwrap().reject_requests = reject;
    }

    /// The next `count` `eth_call`s fail with a transport error.
    pub fn fail_next_reads(&self, count: u32) {
        self.failing_reads.store(count, Ordering::SeqCst);
    }

    pub fn fail_next_sends(&self, count: u32) {
        self.failing_sends.store(count, Ordering::SeqCst);
    }

    /// The wallet takes `delay` to hand back a transaction hash.
    pub fn delay_sends(&self, delay: Duration) {
        self.state.lock().unwrap().send_delay = Some(delay);
    }

    /// Submitted transactions never show up as mined.
    pub fn withhold_receipts(&self, withhold: bool) {
        self.state.lock().unwrap().withhold_receipts = withhold;
    }

    pub fn with_chain<R>(&self, f: impl FnOnce(&mut ChainState) -> R) -> R {
        f(&mut self.state.lock().unwrap().chain)
    }

    pub fn eth_call_count(&self) -> usize {
        self.eth_calls.load(Ordering::SeqCst)
    }

    pub fn sent_transactions(&self) -> Vec<Value> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn method_count(&self, method: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .methods
            .iter()
            .filter(|m| m.as_str() == method)
            .count()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    /// Delivers `event` to every handler registered for its kind.
    pub fn emit(&self, event: WalletEvent) {
        let listeners = self.listeners.lock().unwrap();
        for (kind, handler) in listeners.iter() {
            if *kind == event.kind() {
                handler(event.clone());
            }
        }
    }

    fn handle(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.methods.push(method.to_string());
        match method {
            "eth_requestAccounts" => {
                if state.reject_requests {
                    return Err(ProviderError::user_rejected());
                }
                state.authorized = true;
                Ok(json!(state.accounts))
            }
            "eth_accounts" => {
                if state.authorized {
                    Ok(json!(state.accounts))
                } else {
                    Ok(json!([]))
                }
            }
            "eth_chainId" => Ok(json!(format!("{:#x}", state.chain_id))),
            "eth_call" => {
                self.eth_calls.fetch_add(1, Ordering::SeqCst);
                if take_one(&self.failing_reads) {
                    return Err(ProviderError::new(INTERNAL_ERROR_CODE, "connection reset"));
                }
                let (from, to, data, value) = parse_tx(&params)?;
                let mut simulated = state.chain.clone();
                let output = simulated.execute(from, to, &data, value)?;
                Ok(json!(Bytes::from(output)))
            }
            "eth_sendTransaction" => {
                if take_one(&self.failing_sends) {
                    return Err(ProviderError::new(INTERNAL_ERROR_CODE, "connection reset"));
                }
                if state.reject_requests {
                    return Err(ProviderError::user_rejected());
                }
                let tx = params.get(0).cloned().unwrap_or(Value::Null);
                let (from, to, data, value) = parse_tx(&params)?;
                state.chain.execute(from, to, &data, value)?;
                state.sent.push(tx);
                state.block_number += 1;
                let hash = B256::with_last_byte(state.sent.len() as u8);
                let block = state.block_number;
                state.receipts.insert(hash, block);
                Ok(json!(hash))
            }
            "eth_getTransactionReceipt" => {
                let hash: B256 = params
                    .get(0)
                    .cloned()
                    .and_then(|v| serde_json::from_value(v).ok())
                    .ok_or_else(|| ProviderError::new(-32602, "invalid params"))?;
                if state.withhold_receipts {
                    return Ok(Value::Null);
                }
                match state.receipts.get(&hash) {
                    Some(block) => Ok(json!({
                        "transactionHash": hash,
                        "blockNumber": format!("{block:#x}"),
                        "status": "0x1",
                        "gasUsed": "0x5208",
                    })),
                    None => Ok(Value::Null),
                }
            }
            other => Err(ProviderError::new(
                METHOD_NOT_FOUND_CODE,
                format!("method {other} not supported"),
            )),
        }
    }
}

fn take_one(counter: &AtomicU32) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

fn parse_tx(params: &Value) -> Result<(Address, Address, Bytes, U256), ProviderError> {
    let invalid = |field: &str| ProviderError::new(-32602, format!("invalid {field}"));
    let tx = params.get(0).ok_or_else(|| invalid("transaction"))?;
    let from: Address = tx
        .get("from")
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .ok_or_else(|| invalid("from"))?;
    let to: Address = tx
        .get("to")
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .ok_or_else(|| invalid("to"))?;
    let data: Bytes = tx
        .get("data")
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .ok_or_else(|| invalid("data"))?;
    let value: U256 = match tx.get("value") {
        Some(v) => serde_json::from_value(v.clone()).map_err(|_| invalid("value"))?,
        None => U256::ZERO,
    };
    Ok((from, to, data, value))
}

impl WalletProvider for MockWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        if method == "eth_sendTransaction" {
            let delay = self.state.lock().unwrap().send_delay;
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
        }
        self.handle(method, params)
    }

    fn subscribe(&self, kind: WalletEventKind, handler: WalletEventHandler) {
        self.listeners.lock().unwrap().push((kind, handler));
    }
}

pub struct TestContext {
    pub wallet: Arc<MockWallet>,
    pub manager: Arc<SessionManager<MockWallet>>,
    pub test_accounts: Vec<Address>,
}

impl TestContext {
    /// Wallet with ten accounts (the first one active), already authorized,
    /// on the test chain.
    pub fn new() -> Self {
        Self::with_gateway(UNREACHABLE_GATEWAY)
    }

    pub fn with_gateway(gateway: &str) -> Self {
        let test_accounts = generate_test_accounts(10);
        let wallet = MockWallet::authorized(test_accounts.clone(), TEST_CHAIN_ID);
        let manager = SessionManager::new(Some(Arc::clone(&wallet)), Arc::new(test_config(gateway)));
        Self {
            wallet,
            manager,
            test_accounts,
        }
    }

    pub fn user(&self) -> Address {
        self.test_accounts[0]
    }

    pub fn creator(&self) -> Address {
        self.test_accounts[1]
    }

    pub fn subscriber(&self) -> Address {
        self.test_accounts[2]
    }

    /// Sessions for `account`, restored from the wallet's authorization.
    pub async fn connect_as(&self, account: Address) -> Session {
        self.wallet.set_accounts(vec![account]);
        self.manager.disconnect().await;
        self.manager
            .try_restore_session()
            .await
            .expect("session restore")
    }
}

/// Waits until the published session satisfies `predicate`.
pub async fn wait_for_session(
    manager: &SessionManager<MockWallet>,
    predicate: impl FnMut(&Session) -> bool,
) -> Session {
    let mut changes = manager.subscribe_changes();
    let session = tokio::time::timeout(Duration::from_secs(2), changes.wait_for(predicate))
        .await
        .expect("session change timed out")
        .expect("session channel closed")
        .clone();
    session
}
