use crate::data_sync::subgraph::parse_decimal;
use crate::data_sync::traits::{SynthRateIndexer, UniswapSubgraph};
use crate::error::{FetchError, Result, WatchlistError};
use crate::logic::types::{DataSource, RatePoint, UniToken};
use crate::utils::token::parse_fixed_point;
use std::sync::Arc;
use tracing::debug;

/// Convert a token's ETH-denominated price into USD.
///
/// Shared by every latest and historical UNI rate so they stay comparable.
pub fn eth_to_usd(derived_eth: &str, eth_price_usd: f64) -> Result<f64> {
    Ok(parse_decimal(derived_eth)? * eth_price_usd)
}

fn find_token<'a>(tokens: &'a [UniToken], id: &str) -> Option<&'a UniToken> {
    tokens.iter().find(|t| t.id.eq_ignore_ascii_case(id))
}

/// Per-source rate fetchers returning normalized [`RatePoint`]s.
///
/// Pure network reads; failures propagate and nothing is retried here.
#[derive(Clone)]
pub struct RateSources {
    indexer: Arc<dyn SynthRateIndexer>,
    subgraph: Arc<dyn UniswapSubgraph>,
}

impl RateSources {
    pub fn new(indexer: Arc<dyn SynthRateIndexer>, subgraph: Arc<dyn UniswapSubgraph>) -> Self {
        Self { indexer, subgraph }
    }

    pub fn indexer(&self) -> &Arc<dyn SynthRateIndexer> {
        &self.indexer
    }

    pub fn subgraph(&self) -> &Arc<dyn UniswapSubgraph> {
        &self.subgraph
    }

    /// Latest rate of an asset.
    ///
    /// UNI rates read a fresh token snapshot and a fresh ETH price, never a
    /// cached reference.
    pub async fn rate(&self, asset_id: &str, data_source: DataSource) -> Result<RatePoint> {
        match data_source {
            DataSource::Synth => self.latest_synth_rate(asset_id).await,
            DataSource::Uni => {
                let ids = [asset_id.to_string()];
                let (tokens, eth_price) = futures::try_join!(self.subgraph.tokens_by_id(&ids), self.latest_eth_price())?;
                let token = find_token(&tokens, asset_id).ok_or_else(|| WatchlistError::not_found(asset_id, DataSource::Uni))?;
                Ok(RatePoint::recorded(eth_to_usd(&token.derived_eth, eth_price)?))
            }
        }
    }

    /// Rate of an asset at or before `block`; a missing record reads as zero.
    pub async fn rate_at_block(&self, asset_id: &str, data_source: DataSource, block: u64) -> Result<RatePoint> {
        match data_source {
            DataSource::Synth => self.synth_rate_at_block(asset_id, block).await,
            DataSource::Uni => self.uni_rate_at_block(asset_id, block).await,
        }
    }

    /// Latest ETH/USD price. A subgraph without a price bundle is a fetch failure.
    pub async fn latest_eth_price(&self) -> Result<f64> {
        self.subgraph
            .eth_price(None)
            .await?
            .ok_or_else(|| FetchError::Decode("missing ETH price bundle".to_string()).into())
    }

    pub async fn latest_synth_rate(&self, synth_name: &str) -> Result<RatePoint> {
        let raw = self.indexer.latest_rate(synth_name).await?;
        Ok(RatePoint::recorded(parse_fixed_point(&raw)?))
    }

    pub async fn synth_rate_at_block(&self, synth_name: &str, block: u64) -> Result<RatePoint> {
        let updates = self.indexer.rate_updates_at_or_before(synth_name, block).await?;
        match updates.first() {
            Some(update) => Ok(RatePoint::recorded(parse_fixed_point(&update.rate)?)),
            None => {
                debug!("No {} rate at or before block {}, reading as zero", synth_name, block);
                Ok(RatePoint::missing())
            }
        }
    }

    /// The token is looked up first; the block's ETH price is only read
    /// for a token that existed, and a block without a price bundle also
    /// reads as zero.
    async fn uni_rate_at_block(&self, token_id: &str, block: u64) -> Result<RatePoint> {
        let ids = [token_id.to_string()];
        let tokens = self.subgraph.tokens_by_id_at_block(&ids, block).await?;
        let Some(token) = find_token(&tokens, token_id) else {
            debug!("Token {} absent at block {}, reading as zero", token_id, block);
            return Ok(RatePoint::missing());
        };

        match self.subgraph.eth_price(Some(block)).await? {
            Some(eth_price) => Ok(RatePoint::recorded(eth_to_usd(&token.derived_eth, eth_price)?)),
            None => {
                debug!("No ETH price bundle at block {}, reading {} as zero", block, token_id);
                Ok(RatePoint::missing())
            }
        }
    }
}
