/// Logic Layer - Watchlist Aggregation
///
/// This layer is responsible for:
/// - Normalizing per-source rates into comparable USD values
/// - Resolving watchlist entries against one market snapshot
/// - Concurrent, order-preserving batch resolution and balance attachment
/// - Price history series ending on the live rate

pub mod types;
pub mod rates;
pub mod resolver;
pub mod pipeline;
pub mod price_history;
pub mod synths;

// Re-export key components from the logic layer
pub use types::{
    Block, BlockNumber, BlockTag, DataSource, MarketContext, Network, PriceChartEntry, RateOrigin, RatePoint,
    RateUpdate, Synth, SynthData, SynthExchange, TokenListEntry, UniToken, WatchlistEntry,
};
pub use rates::{RateSources, eth_to_usd};
pub use resolver::{EntryResolver, uni_quotes_to_entries};
pub use pipeline::{EntryResolution, WatchlistPipeline, WatchlistPipelineBuilder, WatchlistReport, attach_balances};
pub use price_history::PriceHistoryAssembler;
pub use synths::{
    Period, latest_synth_datas, list_all_synths, supply_in_usd, synth_supply, synth_volume_in_usd,
    total_volume_for_pair,
};
