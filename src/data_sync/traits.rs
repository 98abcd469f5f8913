use crate::error::Result;
use crate::logic::types::{BlockTag, MarketContext, Network, RateUpdate, Synth, SynthExchange, UniToken};
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use std::sync::Arc;

/// Trading-protocol registry for one network.
#[async_trait]
pub trait SynthRegistry: Send + Sync {
    fn network(&self) -> Network;

    fn synths(&self) -> Vec<Synth>;

    fn find_synth(&self, name: &str) -> Option<Synth> {
        self.synths().into_iter().find(|s| s.name == name)
    }

    /// ERC-20 address of the token with the given symbol, if registered.
    fn token_address(&self, symbol: &str) -> Option<Address>;

    /// Raw 18-decimal `totalSupply` of the synth's contract.
    async fn total_supply(&self, synth: &Synth, block: BlockTag) -> Result<U256>;
}

/// Indexer serving synth rate history.
#[async_trait]
pub trait SynthRateIndexer: Send + Sync {
    /// Latest rate as an 18-decimal fixed-point string.
    async fn latest_rate(&self, synth_name: &str) -> Result<String>;

    /// Newest-first rate updates at or before `block`. An empty list means
    /// no data exists for that point.
    async fn rate_updates_at_or_before(&self, synth_name: &str, block: u64) -> Result<Vec<RateUpdate>>;

    async fn exchanges_since(&self, min_timestamp: u64) -> Result<Vec<SynthExchange>>;
}

/// Uniswap subgraph.
#[async_trait]
pub trait UniswapSubgraph: Send + Sync {
    async fn tokens_by_id(&self, ids: &[String]) -> Result<Vec<UniToken>>;

    async fn tokens_by_id_at_block(&self, ids: &[String], block: u64) -> Result<Vec<UniToken>>;

    /// ETH/USD reference price, latest when `block` is `None`. Reads `None`
    /// when the subgraph has no price bundle at that point.
    async fn eth_price(&self, block: Option<u64>) -> Result<Option<f64>>;
}

/// A connected wallet able to report on-chain balances.
#[async_trait]
pub trait WalletSession: Send + Sync {
    fn address(&self) -> Address;

    /// Decimal-normalized ERC-20 balance held at `contract`.
    async fn token_balance(&self, contract: Address) -> Result<f64>;
}

pub trait SessionProvider: Send + Sync {
    fn connected_wallet(&self) -> Option<Arc<dyn WalletSession>>;
}

/// Read-only view of the ambient "current ETH price / daily block" pair.
#[async_trait]
pub trait MarketStateProvider: Send + Sync {
    async fn snapshot(&self) -> Result<MarketContext>;
}

/// Session provider holding at most one wallet.
#[derive(Clone, Default)]
pub struct StaticSession {
    wallet: Option<Arc<dyn WalletSession>>,
}

impl StaticSession {
    pub fn connected(wallet: Arc<dyn WalletSession>) -> Self {
        Self { wallet: Some(wallet) }
    }

    pub fn disconnected() -> Self {
        Self { wallet: None }
    }
}

impl SessionProvider for StaticSession {
    fn connected_wallet(&self) -> Option<Arc<dyn WalletSession>> {
        self.wallet.clone()
    }
}
