use crate::data_sync::config::WatchlistConfig;
use crate::data_sync::graphql::GraphQlClient;
use crate::data_sync::indexer::SynthIndexerClient;
use crate::data_sync::subgraph::UniswapSubgraphClient;
use crate::data_sync::traits::{MarketStateProvider, SessionProvider, SynthRegistry, WalletSession};
use crate::error::{Result, WatchlistError};
use crate::logic::price_history::PriceHistoryAssembler;
use crate::logic::rates::RateSources;
use crate::logic::resolver::EntryResolver;
use crate::logic::synths::list_all_synths;
use crate::logic::types::{Block, DataSource, MarketContext, PriceChartEntry, TokenListEntry, WatchlistEntry};
use futures::future::try_join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Outcome for one watchlist slot.
#[derive(Clone, Debug, PartialEq)]
pub enum EntryResolution {
    Resolved(TokenListEntry),
    /// The entry names an asset the registry or subgraph does not know.
    NotFound(WatchlistEntry),
}

impl EntryResolution {
    pub fn resolved(&self) -> Option<&TokenListEntry> {
        match self {
            EntryResolution::Resolved(entry) => Some(entry),
            EntryResolution::NotFound(_) => None,
        }
    }
}

/// Resolved watchlist, one slot per input entry in input order.
#[derive(Clone, Debug, PartialEq)]
pub struct WatchlistReport {
    pub entries: Vec<EntryResolution>,
    /// Snapshot every entry was priced against.
    pub context: MarketContext,
}

impl WatchlistReport {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn resolved(&self) -> impl Iterator<Item = &TokenListEntry> {
        self.entries.iter().filter_map(EntryResolution::resolved)
    }

    pub fn not_found(&self) -> impl Iterator<Item = &WatchlistEntry> {
        self.entries.iter().filter_map(|e| match e {
            EntryResolution::NotFound(entry) => Some(entry),
            EntryResolution::Resolved(_) => None,
        })
    }

    pub fn into_resolved(self) -> Vec<TokenListEntry> {
        self.entries
            .into_iter()
            .filter_map(|e| match e {
                EntryResolution::Resolved(entry) => Some(entry),
                EntryResolution::NotFound(_) => None,
            })
            .collect()
    }
}

/// Attach live wallet balances as `quantity`, preserving order.
///
/// Entries without an address get `quantity = 0`. The first failing balance
/// read fails the whole batch.
pub async fn attach_balances(entries: Vec<TokenListEntry>, wallet: &dyn WalletSession) -> Result<Vec<TokenListEntry>> {
    let start_time = Instant::now();
    let count = entries.len();

    let entries = try_join_all(entries.into_iter().map(|mut entry| async move {
        entry.quantity = Some(match entry.token.address {
            Some(contract) => wallet.token_balance(contract).await?,
            None => {
                debug!("No address for {}, balance reads as zero", entry.token.symbol);
                0.0
            }
        });
        Ok::<_, WatchlistError>(entry)
    }))
    .await?;

    info!("Attached {} balances for {} in {:?}", count, wallet.address(), start_time.elapsed());
    Ok(entries)
}

/// Fan-out/fan-in orchestration over the watchlist collaborators.
///
/// Every batch is a single future over unspawned per-item futures:
/// dropping it cancels all in-flight reads.
pub struct WatchlistPipeline {
    resolver: EntryResolver,
    history: PriceHistoryAssembler,
    sessions: Arc<dyn SessionProvider>,
    market_state: Arc<dyn MarketStateProvider>,
}

impl WatchlistPipeline {
    pub fn new(
        resolver: EntryResolver,
        sessions: Arc<dyn SessionProvider>,
        market_state: Arc<dyn MarketStateProvider>,
    ) -> Self {
        let history = PriceHistoryAssembler::new(resolver.rates().clone());
        Self { resolver, history, sessions, market_state }
    }

    pub fn resolver(&self) -> &EntryResolver {
        &self.resolver
    }

    /// One SYNTH entry per registered synth, in registry order.
    pub fn registry_watchlist(&self) -> Vec<WatchlistEntry> {
        list_all_synths(self.resolver.registry().as_ref())
            .into_iter()
            .map(|synth| WatchlistEntry::synth(synth.name))
            .collect()
    }

    /// Resolve every entry concurrently against one market snapshot.
    ///
    /// Requires a connected wallet. Unknown assets are tagged
    /// [`EntryResolution::NotFound`]; any other failure aborts the batch.
    pub async fn resolve_watchlist(&self, entries: &[WatchlistEntry]) -> Result<WatchlistReport> {
        if self.sessions.connected_wallet().is_none() {
            return Err(WatchlistError::NoWalletConnected);
        }

        let ctx = self.market_state.snapshot().await?;
        self.resolve_watchlist_with(entries, ctx).await
    }

    /// Resolve against an explicit snapshot.
    pub async fn resolve_watchlist_with(&self, entries: &[WatchlistEntry], ctx: MarketContext) -> Result<WatchlistReport> {
        let start_time = Instant::now();
        info!(
            "Resolving {} watchlist entries at daily block {} (ETH ${:.2})",
            entries.len(),
            ctx.daily_block,
            ctx.eth_price_usd
        );

        let resolver = &self.resolver;
        let ctx_ref = &ctx;
        let resolutions = try_join_all(entries.iter().map(|entry| async move {
            match resolver.resolve_entry(entry, ctx_ref).await {
                Ok(resolved) => Ok(EntryResolution::Resolved(resolved)),
                Err(WatchlistError::EntryNotFound { .. }) => {
                    warn!("{} entry {} not found, tagging slot", entry.data_source, entry.id);
                    Ok(EntryResolution::NotFound(entry.clone()))
                }
                Err(e) => Err(e),
            }
        }))
        .await?;

        let report = WatchlistReport { entries: resolutions, context: ctx };
        info!(
            "Resolved watchlist in {:?}: {} priced, {} not found",
            start_time.elapsed(),
            report.resolved().count(),
            report.not_found().count()
        );
        Ok(report)
    }

    /// Attach balances of the connected wallet.
    pub async fn attach_connected_balances(&self, entries: Vec<TokenListEntry>) -> Result<Vec<TokenListEntry>> {
        let wallet = self.sessions.connected_wallet().ok_or(WatchlistError::NoWalletConnected)?;
        attach_balances(entries, wallet.as_ref()).await
    }

    pub async fn price_history(&self, blocks: &[Block], asset_id: &str, data_source: DataSource) -> Result<Vec<PriceChartEntry>> {
        self.history.build_price_history(blocks, asset_id, data_source).await
    }
}

/// Builder wiring the pipeline either from explicit collaborators or from
/// a [`WatchlistConfig`].
pub struct WatchlistPipelineBuilder {
    config: Option<WatchlistConfig>,
    registry: Option<Arc<dyn SynthRegistry>>,
    rates: Option<RateSources>,
    sessions: Option<Arc<dyn SessionProvider>>,
    market_state: Option<Arc<dyn MarketStateProvider>>,
}

impl WatchlistPipelineBuilder {
    pub fn new() -> Self {
        Self { config: None, registry: None, rates: None, sessions: None, market_state: None }
    }

    pub fn with_config(mut self, config: WatchlistConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_registry(mut self, registry: Arc<dyn SynthRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_rate_sources(mut self, rates: RateSources) -> Self {
        self.rates = Some(rates);
        self
    }

    pub fn with_sessions(mut self, sessions: Arc<dyn SessionProvider>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    pub fn with_market_state(mut self, market_state: Arc<dyn MarketStateProvider>) -> Self {
        self.market_state = Some(market_state);
        self
    }

    pub fn build(self) -> eyre::Result<WatchlistPipeline> {
        let registry = self.registry.ok_or_else(|| eyre::eyre!("synth registry is required"))?;
        let sessions = self.sessions.ok_or_else(|| eyre::eyre!("session provider is required"))?;
        let market_state = self.market_state.ok_or_else(|| eyre::eyre!("market state provider is required"))?;

        let rates = match self.rates {
            Some(rates) => rates,
            None => {
                let config = match self.config {
                    Some(config) => config,
                    None => WatchlistConfig::from_env()?,
                };
                config.validate()?;
                if config.network != registry.network() {
                    warn!("Config network {} differs from registry network {}", config.network, registry.network());
                }

                let indexer = GraphQlClient::new(config.indexer_url.clone(), config.http_timeout())?;
                let subgraph = GraphQlClient::new(config.uniswap_subgraph_url.clone(), config.http_timeout())?;
                RateSources::new(
                    Arc::new(SynthIndexerClient::new(indexer)),
                    Arc::new(UniswapSubgraphClient::new(subgraph)),
                )
            }
        };

        Ok(WatchlistPipeline::new(EntryResolver::new(registry, rates), sessions, market_state))
    }
}

impl Default for WatchlistPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
