use crate::data_sync::traits::{SynthRegistry, UniswapSubgraph};
use crate::error::{Result, WatchlistError};
use crate::logic::rates::{RateSources, eth_to_usd};
use crate::logic::types::{DataSource, MarketContext, RatePoint, TokenListEntry, UniToken, WatchlistEntry};
use crate::utils::token::Token;
use ahash::AHashMap;
use alloy_primitives::Address;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Turns abstract watchlist entries into priced [`TokenListEntry`] records.
#[derive(Clone)]
pub struct EntryResolver {
    registry: Arc<dyn SynthRegistry>,
    rates: RateSources,
}

impl EntryResolver {
    pub fn new(registry: Arc<dyn SynthRegistry>, rates: RateSources) -> Self {
        Self { registry, rates }
    }

    pub fn registry(&self) -> &Arc<dyn SynthRegistry> {
        &self.registry
    }

    pub fn rates(&self) -> &RateSources {
        &self.rates
    }

    /// Resolve one entry against a fixed market snapshot.
    ///
    /// Returns [`WatchlistError::EntryNotFound`] when the synth is not in the
    /// registry or the token is not indexed; the result's `data_source`
    /// always matches the entry's.
    pub async fn resolve_entry(&self, entry: &WatchlistEntry, ctx: &MarketContext) -> Result<TokenListEntry> {
        match entry.data_source {
            DataSource::Synth => self.resolve_synth(&entry.id, ctx.daily_block).await,
            DataSource::Uni => self.resolve_uni(&entry.id, ctx).await,
        }
    }

    async fn resolve_synth(&self, name: &str, daily_block: u64) -> Result<TokenListEntry> {
        let synth = self.registry.find_synth(name).ok_or_else(|| WatchlistError::not_found(name, DataSource::Synth))?;

        let (current, daily) =
            futures::try_join!(self.rates.latest_synth_rate(&synth.name), self.rates.synth_rate_at_block(&synth.name, daily_block))?;

        let address = self.registry.token_address(&synth.name);
        if address.is_none() {
            debug!("Synth {} has no registered token address", synth.name);
        }

        let token = Token::new_with_data(synth.name.clone(), synth.description.clone(), address, None);
        Ok(TokenListEntry::new(token, current, daily, DataSource::Synth))
    }

    async fn resolve_uni(&self, id: &str, ctx: &MarketContext) -> Result<TokenListEntry> {
        let ids = [id.to_string()];
        let subgraph: &dyn UniswapSubgraph = self.rates.subgraph().as_ref();
        let (current, daily) =
            futures::try_join!(subgraph.tokens_by_id(&ids), subgraph.tokens_by_id_at_block(&ids, ctx.daily_block))?;

        uni_quotes_to_entries(&current, &daily, ctx.eth_price_usd)?
            .into_iter()
            .next()
            .ok_or_else(|| WatchlistError::not_found(id, DataSource::Uni))
    }
}

/// Merge current and daily subgraph snapshots into entries, one per current
/// token, pricing both through the same ETH reference.
pub fn uni_quotes_to_entries(current: &[UniToken], daily: &[UniToken], eth_price_usd: f64) -> Result<Vec<TokenListEntry>> {
    let daily_by_id: AHashMap<String, &UniToken> = daily.iter().map(|t| (t.id.to_lowercase(), t)).collect();

    current
        .iter()
        .map(|token| -> Result<TokenListEntry> {
            let rate = RatePoint::recorded(eth_to_usd(&token.derived_eth, eth_price_usd)?);
            let daily_rate = match daily_by_id.get(&token.id.to_lowercase()) {
                Some(daily) => RatePoint::recorded(eth_to_usd(&daily.derived_eth, eth_price_usd)?),
                None => RatePoint::missing(),
            };

            let decimals = token.decimals.as_deref().and_then(|d| d.parse::<u8>().ok());
            let symbol = token.symbol.clone().unwrap_or_else(|| token.id.clone());
            let asset = Token::new_with_data(symbol, token.name.clone(), Address::from_str(&token.id).ok(), decimals);

            Ok(TokenListEntry::new(asset, rate, daily_rate, DataSource::Uni))
        })
        .collect()
}
