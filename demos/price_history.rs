/// Price History Example
///
/// Builds a chart series for one asset from evenly spaced block checkpoints.
/// The last checkpoint is replaced by the live rate.
///
///   cargo run --example price_history -- --source SYNTH --id sETH --to-block 11012000
use clap::Parser;
use eyre::Result;
use std::str::FromStr;
use std::sync::Arc;
use synth_watch::data_sync::{GraphQlClient, SynthIndexerClient, UniswapSubgraphClient, WatchlistConfig};
use synth_watch::logic::{Block, DataSource, PriceHistoryAssembler, RateSources};
use synth_watch::utils::SECONDS_PER_DAY;
use tracing::{info, warn};

/// Mainnet blocks per day at ~13s block time.
const BLOCKS_PER_DAY: u64 = SECONDS_PER_DAY / 13;

#[derive(Parser, Debug)]
#[command(version, about = "Print a daily price series for a synth or Uniswap token")]
struct Args {
    /// SYNTH or UNI
    #[arg(long, default_value = "SYNTH")]
    source: String,

    /// Synth name or token address
    #[arg(long)]
    id: String,

    /// Newest checkpoint block
    #[arg(long)]
    to_block: u64,

    #[arg(long, default_value = "7")]
    days: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let config = WatchlistConfig::from_env().unwrap_or_else(|e| {
        warn!("Failed to load config from environment ({}), using defaults", e);
        WatchlistConfig::default()
    });
    let data_source = DataSource::from_str(&args.source.to_uppercase())?;

    let indexer = GraphQlClient::new(config.indexer_url.clone(), config.http_timeout())?;
    let subgraph = GraphQlClient::new(config.uniswap_subgraph_url.clone(), config.http_timeout())?;
    let rates = RateSources::new(
        Arc::new(SynthIndexerClient::new(indexer)),
        Arc::new(UniswapSubgraphClient::new(subgraph)),
    );

    let blocks: Vec<Block> = (0..=args.days)
        .rev()
        .map(|day| Block::new(args.to_block.saturating_sub(day * BLOCKS_PER_DAY)))
        .collect();
    info!("Requesting {} checkpoints for {} {}", blocks.len(), data_source, args.id);

    let points = PriceHistoryAssembler::new(rates).build_price_history(&blocks, &args.id, data_source).await?;
    for (block, point) in blocks.iter().zip(&points) {
        let marker = if point.is_missing() { " (no data)" } else { "" };
        println!("{:?} ${:.4}{}", block.number, point.formatted_rate, marker);
    }

    Ok(())
}
