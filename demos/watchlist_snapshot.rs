/// Watchlist Snapshot Example
///
/// Resolves a watchlist against the live indexer, subgraph and RPC endpoints
/// configured through the environment, then prints each entry with the
/// connected wallet's balance.
///
///   cargo run --example watchlist_snapshot -- --wallet 0x... --daily-block 11006000 \
///       --entry SYNTH:sETH --entry UNI:0x1f9840a85d5af5bf1d1762f925bdaddc4201f984
use alloy_primitives::Address;
use clap::Parser;
use eyre::Result;
use std::str::FromStr;
use std::sync::Arc;
use synth_watch::data_sync::{
    GraphQlClient, JsonRpcClient, RegistryConfigSection, RpcWallet, StaticSession, StaticSynthRegistry,
    UniswapSubgraph, UniswapSubgraphClient, WatchlistConfig,
};
use synth_watch::logic::{
    DataSource, EntryResolution, MarketContext, Period, WatchlistEntry, WatchlistPipelineBuilder, synth_volume_in_usd,
};
use synth_watch::utils::{ConfigLoader, MarketStateCache};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(version, about = "Resolve a synth/Uniswap watchlist and print current positions")]
struct Args {
    /// Registry TOML with synth descriptors and token addresses
    #[arg(long, default_value = "demos/registry.toml")]
    registry: String,

    /// Wallet whose balances are attached
    #[arg(long)]
    wallet: String,

    /// Block used as the 24h reference point
    #[arg(long)]
    daily_block: u64,

    /// Watchlist entry as SOURCE:ID, e.g. SYNTH:sETH; every registered synth when omitted
    #[arg(long = "entry")]
    entries: Vec<String>,
}

fn parse_entry(raw: &str) -> Result<WatchlistEntry> {
    let (source, id) = raw.split_once(':').ok_or_else(|| eyre::eyre!("entry must be SOURCE:ID, got {}", raw))?;
    let data_source = DataSource::from_str(&source.to_uppercase())?;
    Ok(WatchlistEntry::new(id, data_source))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let config = WatchlistConfig::from_env().unwrap_or_else(|e| {
        warn!("Failed to load config from environment ({}), using defaults", e);
        WatchlistConfig::default()
    });
    info!("Configuration loaded: indexer={}, subgraph={}, rpc={}", config.indexer_url, config.uniswap_subgraph_url, config.rpc_http_url);

    let entries = args.entries.iter().map(|raw| parse_entry(raw)).collect::<Result<Vec<_>>>()?;
    let wallet_address = Address::from_str(&args.wallet)?;

    let section = RegistryConfigSection::load_section_from_file(args.registry.clone()).await?;
    let rpc = JsonRpcClient::new(config.rpc_http_url.clone(), config.http_timeout())?;
    let registry = StaticSynthRegistry::new(section, rpc.clone());

    let subgraph = UniswapSubgraphClient::new(GraphQlClient::new(config.uniswap_subgraph_url.clone(), config.http_timeout())?);
    let eth_price = subgraph.eth_price(None).await?.ok_or_else(|| eyre::eyre!("subgraph has no ETH price bundle"))?;
    let market_state = Arc::new(MarketStateCache::with_context(
        MarketContext::new(args.daily_block, eth_price),
        config.market_state_ttl(),
    ));

    let wallet = Arc::new(RpcWallet::new(rpc, wallet_address));
    let pipeline = WatchlistPipelineBuilder::new()
        .with_config(config)
        .with_registry(Arc::new(registry))
        .with_sessions(Arc::new(StaticSession::connected(wallet)))
        .with_market_state(market_state)
        .build()?;

    let entries = if entries.is_empty() { pipeline.registry_watchlist() } else { entries };
    let report = pipeline.resolve_watchlist(&entries).await?;
    for missing in report.not_found() {
        warn!("Skipping unknown {} entry {}", missing.data_source, missing.id);
    }
    info!("Priced against daily block {} at ETH ${:.2}", report.context.daily_block, report.context.eth_price_usd);

    let resolved: Vec<_> = report
        .entries
        .into_iter()
        .filter_map(|e| match e {
            EntryResolution::Resolved(entry) => Some(entry),
            EntryResolution::NotFound(_) => None,
        })
        .collect();
    let positions = pipeline.attach_connected_balances(resolved).await?;

    for entry in &positions {
        let change = entry
            .daily_change_percent()
            .map(|p| format!("{p:+.2}%"))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "{:<8} {:<6} ${:>14.4}  24h {:>8}  qty {:>14.4}  value ${:>14.2}",
            entry.symbol(),
            entry.data_source,
            entry.formatted_rate,
            change,
            entry.quantity.unwrap_or_default(),
            entry.holding_value().unwrap_or_default()
        );
    }

    let indexer = pipeline.resolver().rates().indexer();
    let volume = synth_volume_in_usd(indexer.as_ref(), "sETH", "sUSD", Period::OneDay).await;
    info!("sETH/sUSD 24h volume: ${:.2}", volume);

    Ok(())
}
