use crate::logic::types::Network;
use crate::utils::config_loader::{ConfigLoader, ConfigLoaderSync, LoadConfigError, load_from_file, load_from_file_sync};
use crate::utils::constants::DefaultEndpoints;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Configuration for the data collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchlistConfig {
    /// GraphQL endpoint of the synth rates indexer
    pub indexer_url: String,
    /// GraphQL endpoint of the Uniswap subgraph
    pub uniswap_subgraph_url: String,
    /// HTTP RPC URL for balance and supply reads
    pub rpc_http_url: String,
    pub network: Network,
    /// Timeout for every HTTP request in seconds
    pub http_timeout_secs: u64,
    /// Age after which the ambient price/block snapshot is reported stale
    pub market_state_ttl_secs: u64,
}

impl Default for WatchlistConfig {
    fn default() -> Self {
        Self {
            indexer_url: DefaultEndpoints::SYNTH_RATES_INDEXER.to_string(),
            uniswap_subgraph_url: DefaultEndpoints::UNISWAP_V2_SUBGRAPH.to_string(),
            rpc_http_url: DefaultEndpoints::RPC_HTTP.to_string(),
            network: Network::Mainnet,
            http_timeout_secs: 10,
            market_state_ttl_secs: 300,
        }
    }
}

impl WatchlistConfig {
    /// Defaults for a network, pointing the indexer at that network's deployment.
    pub fn for_network(network: Network) -> Self {
        let indexer_url = match network {
            Network::Mainnet => DefaultEndpoints::SYNTH_RATES_INDEXER,
            Network::Kovan => DefaultEndpoints::SYNTH_RATES_INDEXER_KOVAN,
        };
        Self { indexer_url: indexer_url.to_string(), network, ..Self::default() }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> eyre::Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = match std::env::var("SYNTH_NETWORK") {
            Ok(network) => {
                let network = Network::from_str(&network).map_err(|e| eyre::eyre!("Invalid SYNTH_NETWORK: {}", e))?;
                Self::for_network(network)
            }
            Err(_) => Self::default(),
        };

        if let Ok(indexer_url) = std::env::var("SYNTH_INDEXER_URL") {
            Url::parse(&indexer_url).map_err(|e| eyre::eyre!("Invalid SYNTH_INDEXER_URL: {}", e))?;
            config.indexer_url = indexer_url;
        }

        if let Ok(subgraph_url) = std::env::var("UNISWAP_SUBGRAPH_URL") {
            Url::parse(&subgraph_url).map_err(|e| eyre::eyre!("Invalid UNISWAP_SUBGRAPH_URL: {}", e))?;
            config.uniswap_subgraph_url = subgraph_url;
        }

        if let Ok(rpc_http_url) = std::env::var("RPC_HTTP_URL") {
            Url::parse(&rpc_http_url).map_err(|e| eyre::eyre!("Invalid RPC_HTTP_URL: {}", e))?;
            config.rpc_http_url = rpc_http_url;
        }

        if let Ok(timeout_str) = std::env::var("HTTP_TIMEOUT_SECS") {
            config.http_timeout_secs =
                timeout_str.parse().map_err(|e| eyre::eyre!("Invalid HTTP_TIMEOUT_SECS: {}", e))?;
        }

        if let Ok(ttl_str) = std::env::var("MARKET_STATE_TTL_SECS") {
            config.market_state_ttl_secs =
                ttl_str.parse().map_err(|e| eyre::eyre!("Invalid MARKET_STATE_TTL_SECS: {}", e))?;
        }

        Ok(config)
    }

    pub fn validate(&self) -> eyre::Result<()> {
        for (name, value) in [
            ("indexer_url", &self.indexer_url),
            ("uniswap_subgraph_url", &self.uniswap_subgraph_url),
            ("rpc_http_url", &self.rpc_http_url),
        ] {
            Url::parse(value).map_err(|e| eyre::eyre!("Invalid {}: {}", name, e))?;
        }
        if self.http_timeout_secs == 0 {
            return Err(eyre::eyre!("http_timeout_secs must be positive"));
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn market_state_ttl(&self) -> Duration {
        Duration::from_secs(self.market_state_ttl_secs)
    }
}

#[derive(Clone, Deserialize, Debug)]
pub struct WatchlistConfigRoot {
    pub watchlist: WatchlistConfig,
}

#[async_trait]
impl ConfigLoader for WatchlistConfig {
    type SectionType = WatchlistConfig;

    async fn load_section_from_file(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        let root: WatchlistConfigRoot = load_from_file(file_name).await?;
        Ok(root.watchlist)
    }
}

impl ConfigLoaderSync for WatchlistConfig {
    type SectionType = WatchlistConfig;

    fn load_section_from_file_sync(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        let root: WatchlistConfigRoot = load_from_file_sync(file_name)?;
        Ok(root.watchlist)
    }
}
