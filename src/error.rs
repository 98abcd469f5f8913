use crate::logic::types::DataSource;
use crate::utils::config_loader::LoadConfigError;
use eyre::Report;

/// Failure of a single collaborator read (indexer, subgraph or RPC).
///
/// Never retried inside the crate; the caller owns the retry policy.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("graphql error: {0}")]
    GraphQl(String),
    #[error("rpc error: {0}")]
    Rpc(String),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error(transparent)]
    InternalEyre(Report),
}

#[derive(Debug, thiserror::Error)]
pub enum WatchlistError {
    #[error("{data_source} entry not found: {id}")]
    EntryNotFound { id: String, data_source: DataSource },
    #[error("no wallet session connected")]
    NoWalletConnected,
    #[error("fetch failed: {0}")]
    TransientFetchFailure(#[from] FetchError),
    #[error("invalid block number: {0}")]
    InvalidBlock(String),
    #[error("market state has not been populated")]
    MarketStateUnavailable,
    #[error("invalid fixed-point value: {0}")]
    InvalidFixedPoint(String),
    #[error(transparent)]
    Config(#[from] LoadConfigError),
}

impl WatchlistError {
    pub fn not_found(id: impl Into<String>, data_source: DataSource) -> Self {
        Self::EntryNotFound { id: id.into(), data_source }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::EntryNotFound { .. })
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientFetchFailure(_))
    }
}

impl From<reqwest::Error> for WatchlistError {
    fn from(error: reqwest::Error) -> Self {
        Self::TransientFetchFailure(FetchError::Http(error))
    }
}

impl From<Report> for WatchlistError {
    fn from(error: Report) -> Self {
        Self::TransientFetchFailure(FetchError::InternalEyre(error))
    }
}

impl From<alloy_sol_types::Error> for WatchlistError {
    fn from(error: alloy_sol_types::Error) -> Self {
        Self::TransientFetchFailure(FetchError::Decode(error.to_string()))
    }
}

pub type Result<T, E = WatchlistError> = std::result::Result<T, E>;
