//! In-memory collaborators for tests. Each mock can delay individual
//! items to force out-of-order completion and counts the calls that
//! matter for freshness checks.

use crate::data_sync::traits::{SynthRateIndexer, SynthRegistry, UniswapSubgraph, WalletSession};
use crate::error::{FetchError, Result, WatchlistError};
use crate::logic::types::{BlockTag, DataSource, Network, RateUpdate, Synth, SynthExchange, UniToken};
use ahash::{AHashMap, AHashSet};
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// 18-decimal fixed-point string for a value with at most 6 decimals.
pub fn wei(value: f64) -> String {
    let micros = U256::from((value * 1e6).round() as u128);
    (micros * U256::from(10u64.pow(12))).to_string()
}

pub fn uni_token(id: &str, symbol: &str, derived_eth: &str) -> UniToken {
    UniToken {
        id: id.to_lowercase(),
        symbol: Some(symbol.to_string()),
        name: Some(format!("{symbol} Token")),
        decimals: Some("18".to_string()),
        derived_eth: derived_eth.to_string(),
    }
}

fn unavailable(what: &str) -> WatchlistError {
    FetchError::GraphQl(format!("{what} unavailable")).into()
}

async fn maybe_sleep(delays: &AHashMap<String, Duration>, key: &str) {
    if let Some(delay) = delays.get(key) {
        tokio::time::sleep(*delay).await;
    }
}

#[derive(Default)]
pub struct MockRegistry {
    pub network: Network,
    pub synths: Vec<Synth>,
    pub addresses: AHashMap<String, Address>,
    pub supplies: AHashMap<String, U256>,
}

impl MockRegistry {
    pub fn with_synth(mut self, synth: Synth, address: Option<Address>) -> Self {
        if let Some(address) = address {
            self.addresses.insert(synth.name.clone(), address);
        }
        self.synths.push(synth);
        self
    }

    pub fn with_supply(mut self, name: &str, supply: U256) -> Self {
        self.supplies.insert(name.to_string(), supply);
        self
    }
}

#[async_trait]
impl SynthRegistry for MockRegistry {
    fn network(&self) -> Network {
        self.network
    }

    fn synths(&self) -> Vec<Synth> {
        self.synths.clone()
    }

    fn token_address(&self, symbol: &str) -> Option<Address> {
        self.addresses.get(symbol).copied()
    }

    async fn total_supply(&self, synth: &Synth, _block: BlockTag) -> Result<U256> {
        self.supplies
            .get(&synth.name)
            .copied()
            .ok_or_else(|| WatchlistError::not_found(synth.name.clone(), DataSource::Synth))
    }
}

#[derive(Default)]
pub struct MockIndexer {
    latest: AHashMap<String, String>,
    history: AHashMap<String, Vec<(u64, String)>>,
    exchanges: Vec<SynthExchange>,
    delays: AHashMap<String, Duration>,
    failing_names: AHashSet<String>,
    fail_all: bool,
    pub latest_calls: AtomicUsize,
    pub history_calls: AtomicUsize,
}

impl MockIndexer {
    pub fn with_latest(mut self, name: &str, rate: f64) -> Self {
        self.latest.insert(name.to_string(), wei(rate));
        self
    }

    pub fn with_history(mut self, name: &str, points: &[(u64, f64)]) -> Self {
        let mut records: Vec<(u64, String)> = points.iter().map(|(block, rate)| (*block, wei(*rate))).collect();
        records.sort_by_key(|(block, _)| *block);
        self.history.insert(name.to_string(), records);
        self
    }

    pub fn with_exchange(mut self, from: &str, to: &str, amount_usd: f64) -> Self {
        self.exchanges.push(SynthExchange {
            from_currency_key: from.to_string(),
            to_currency_key: to.to_string(),
            from_amount_in_usd: amount_usd,
        });
        self
    }

    pub fn with_delay(mut self, name: &str, delay: Duration) -> Self {
        self.delays.insert(name.to_string(), delay);
        self
    }

    pub fn failing_for(mut self, name: &str) -> Self {
        self.failing_names.insert(name.to_string());
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_all = true;
        self
    }

    fn check(&self, name: &str) -> Result<()> {
        if self.fail_all || self.failing_names.contains(name) {
            return Err(unavailable("indexer"));
        }
        Ok(())
    }
}

#[async_trait]
impl SynthRateIndexer for MockIndexer {
    async fn latest_rate(&self, synth_name: &str) -> Result<String> {
        self.latest_calls.fetch_add(1, Ordering::SeqCst);
        maybe_sleep(&self.delays, synth_name).await;
        self.check(synth_name)?;
        self.latest
            .get(synth_name)
            .cloned()
            .ok_or_else(|| WatchlistError::not_found(synth_name, DataSource::Synth))
    }

    async fn rate_updates_at_or_before(&self, synth_name: &str, block: u64) -> Result<Vec<RateUpdate>> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        maybe_sleep(&self.delays, synth_name).await;
        self.check(synth_name)?;
        let update = self
            .history
            .get(synth_name)
            .and_then(|records| records.iter().rev().find(|(b, _)| *b <= block))
            .map(|(b, rate)| RateUpdate { rate: rate.clone(), block: Some(b.to_string()) });
        Ok(update.into_iter().collect())
    }

    async fn exchanges_since(&self, _min_timestamp: u64) -> Result<Vec<SynthExchange>> {
        if self.fail_all {
            return Err(unavailable("indexer"));
        }
        Ok(self.exchanges.clone())
    }
}

#[derive(Default)]
pub struct MockSubgraph {
    tokens: AHashMap<String, UniToken>,
    tokens_at: AHashMap<(u64, String), UniToken>,
    eth_price: Option<f64>,
    eth_price_at: AHashMap<u64, f64>,
    delays: AHashMap<String, Duration>,
    fail_all: bool,
    pub latest_eth_price_calls: AtomicUsize,
    pub latest_token_calls: AtomicUsize,
}

impl MockSubgraph {
    pub fn with_token(mut self, token: UniToken) -> Self {
        self.tokens.insert(token.id.clone(), token);
        self
    }

    pub fn with_token_at(mut self, block: u64, token: UniToken) -> Self {
        self.tokens_at.insert((block, token.id.clone()), token);
        self
    }

    pub fn with_eth_price(mut self, price: f64) -> Self {
        self.eth_price = Some(price);
        self
    }

    pub fn with_eth_price_at(mut self, block: u64, price: f64) -> Self {
        self.eth_price_at.insert(block, price);
        self
    }

    pub fn with_delay(mut self, id: &str, delay: Duration) -> Self {
        self.delays.insert(id.to_lowercase(), delay);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_all = true;
        self
    }
}

#[async_trait]
impl UniswapSubgraph for MockSubgraph {
    async fn tokens_by_id(&self, ids: &[String]) -> Result<Vec<UniToken>> {
        self.latest_token_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_all {
            return Err(unavailable("subgraph"));
        }
        let mut found = Vec::new();
        for id in ids {
            let id = id.to_lowercase();
            maybe_sleep(&self.delays, &id).await;
            found.extend(self.tokens.get(&id).cloned());
        }
        Ok(found)
    }

    async fn tokens_by_id_at_block(&self, ids: &[String], block: u64) -> Result<Vec<UniToken>> {
        if self.fail_all {
            return Err(unavailable("subgraph"));
        }
        let mut found = Vec::new();
        for id in ids {
            let id = id.to_lowercase();
            maybe_sleep(&self.delays, &id).await;
            found.extend(self.tokens_at.get(&(block, id)).cloned());
        }
        Ok(found)
    }

    async fn eth_price(&self, block: Option<u64>) -> Result<Option<f64>> {
        if self.fail_all {
            return Err(unavailable("subgraph"));
        }
        match block {
            None => {
                self.latest_eth_price_calls.fetch_add(1, Ordering::SeqCst);
                Ok(self.eth_price)
            }
            Some(block) => Ok(self.eth_price_at.get(&block).copied()),
        }
    }
}

pub struct MockWallet {
    address: Address,
    balances: AHashMap<Address, f64>,
    delays: AHashMap<Address, Duration>,
    failing: AHashSet<Address>,
    pub calls: AtomicUsize,
}

impl MockWallet {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            balances: AHashMap::new(),
            delays: AHashMap::new(),
            failing: AHashSet::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_balance(mut self, contract: Address, balance: f64) -> Self {
        self.balances.insert(contract, balance);
        self
    }

    pub fn with_delay(mut self, contract: Address, delay: Duration) -> Self {
        self.delays.insert(contract, delay);
        self
    }

    pub fn failing_for(mut self, contract: Address) -> Self {
        self.failing.insert(contract);
        self
    }
}

#[async_trait]
impl WalletSession for MockWallet {
    fn address(&self) -> Address {
        self.address
    }

    async fn token_balance(&self, contract: Address) -> Result<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(&contract) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(&contract) {
            return Err(FetchError::Rpc("execution reverted".to_string()).into());
        }
        Ok(self.balances.get(&contract).copied().unwrap_or_default())
    }
}
