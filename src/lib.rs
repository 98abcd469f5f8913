// Two-Layer Architecture
pub mod data_sync; // Data Layer: indexer, subgraph and RPC clients
pub mod logic; // Logic Layer: rate normalization, watchlist resolution, price history

// Common utilities and types
pub mod error;
pub mod utils;

// Re-export key components from each layer
pub use data_sync::{
    GraphQlClient, JsonRpcClient, MarketStateProvider, RpcWallet, SessionProvider, StaticSession, StaticSynthRegistry,
    SynthIndexerClient, SynthRateIndexer, SynthRegistry, UniswapSubgraph, UniswapSubgraphClient, WalletSession,
    WatchlistConfig,
};
pub use error::{FetchError, Result, WatchlistError};
pub use logic::{
    Block, DataSource, EntryResolution, EntryResolver, MarketContext, Network, PriceChartEntry, PriceHistoryAssembler,
    RateSources, TokenListEntry, WatchlistEntry, WatchlistPipeline, WatchlistPipelineBuilder, WatchlistReport,
};
pub use utils::{MarketStateCache, Token};
