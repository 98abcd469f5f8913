use crate::data_sync::traits::{SynthRateIndexer, SynthRegistry};
use crate::error::{Result, WatchlistError};
use crate::logic::rates::RateSources;
use crate::logic::types::{BlockTag, Synth, SynthData, SynthExchange};
use crate::utils::constants::{RATE_DECIMALS, SECONDS_PER_DAY};
use crate::utils::token::to_float;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use strum_macros::{Display, EnumString};
use tracing::{debug, warn};

/// Look-back window for exchange volume.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Period {
    #[default]
    CurrentDay,
    OneDay,
    TwoDays,
}

impl Period {
    /// Earliest exchange timestamp (seconds) included in the window ending at `now`.
    pub fn min_timestamp(&self, now: u64) -> u64 {
        match self {
            Period::CurrentDay => now,
            Period::OneDay => now.saturating_sub(SECONDS_PER_DAY),
            Period::TwoDays => now.saturating_sub(2 * SECONDS_PER_DAY),
        }
    }
}

pub fn now_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default()
}

pub fn list_all_synths(registry: &dyn SynthRegistry) -> Vec<Synth> {
    registry.synths()
}

/// Latest rate for every synth, in input order.
pub async fn latest_synth_datas(rates: &RateSources, synths: &[Synth]) -> Result<Vec<SynthData>> {
    try_join_all(synths.iter().map(|synth| async move {
        let rate = rates.latest_synth_rate(&synth.name).await?;
        Ok::<_, WatchlistError>(SynthData { synth: synth.clone(), formatted_rate: rate.formatted_rate })
    }))
    .await
}

/// USD volume traded between `base` and `quote`, in either direction.
pub fn total_volume_for_pair(base: &str, quote: &str, exchanges: &[SynthExchange]) -> f64 {
    exchanges
        .iter()
        .filter(|e| {
            (e.from_currency_key == quote && e.to_currency_key == base)
                || (e.from_currency_key == base && e.to_currency_key == quote)
        })
        .map(|e| e.from_amount_in_usd)
        .sum()
}

/// Pair volume over `period`. A failed exchange fetch reads as zero volume.
pub async fn synth_volume_in_usd(indexer: &dyn SynthRateIndexer, base: &str, quote: &str, period: Period) -> f64 {
    let min_timestamp = period.min_timestamp(now_secs());
    match indexer.exchanges_since(min_timestamp).await {
        Ok(exchanges) => {
            debug!("Fetched {} exchanges since {} ({})", exchanges.len(), min_timestamp, period);
            total_volume_for_pair(base, quote, &exchanges)
        }
        Err(e) => {
            warn!("Failed to fetch {}/{} exchanges for {}: {}", base, quote, period, e);
            0.0
        }
    }
}

pub async fn synth_supply(registry: &dyn SynthRegistry, synth: &Synth, block: BlockTag) -> Result<f64> {
    let raw = registry.total_supply(synth, block).await?;
    to_float(raw, RATE_DECIMALS)
}

pub fn supply_in_usd(supply: f64, rate: f64) -> f64 {
    supply * rate
}
