/// Data Layer
///
/// Read-only clients for the external collaborators:
///
/// - Synth rate indexer (GraphQL)
/// - Uniswap subgraph (GraphQL)
/// - Ethereum JSON-RPC for ERC-20 balances and supplies
/// - Static synth registry loaded from TOML
///
/// Every client is a thin network adapter behind a trait in [`traits`], so
/// the logic layer never depends on a concrete transport.

pub mod config;
pub mod traits;
pub mod graphql;
pub mod indexer;
pub mod subgraph;
pub mod rpc;
pub mod registry;

#[cfg(test)]
pub mod mock;


pub use config::{WatchlistConfig, WatchlistConfigRoot};
pub use traits::{
    MarketStateProvider, SessionProvider, StaticSession, SynthRateIndexer, SynthRegistry, UniswapSubgraph,
    WalletSession,
};
pub use graphql::GraphQlClient;
pub use indexer::SynthIndexerClient;
pub use subgraph::UniswapSubgraphClient;
pub use rpc::{JsonRpcClient, RpcWallet};
pub use registry::{RegistryConfigRoot, RegistryConfigSection, StaticSynthRegistry, SynthConfig};
