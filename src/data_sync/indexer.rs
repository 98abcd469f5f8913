use crate::data_sync::graphql::GraphQlClient;
use crate::data_sync::traits::SynthRateIndexer;
use crate::error::{FetchError, Result, WatchlistError};
use crate::logic::types::{DataSource, RateUpdate, SynthExchange};
use crate::utils::token::parse_fixed_point;
use async_trait::async_trait;
use serde::Deserialize;
use std::future::Future;
use tracing::debug;

pub const GET_LATEST_RATE: &str = r#"
query GetLatestRate($synthName: String!) {
  latestRate(id: $synthName) {
    id
    rate
  }
}"#;

pub const GET_RATE_BY_BLOCK: &str = r#"
query GetRateByBlock($synthName: String!, $blockNumber: BigInt!) {
  rateUpdates(
    first: 1
    orderBy: block
    orderDirection: desc
    where: { synth: $synthName, block_lte: $blockNumber }
  ) {
    rate
    block
  }
}"#;

pub const GET_EXCHANGES_SINCE: &str = r#"
query GetExchangesSince($minTimestamp: BigInt!, $lastId: ID!, $first: Int!) {
  synthExchanges(
    first: $first
    orderBy: id
    orderDirection: asc
    where: { timestamp_gt: $minTimestamp, id_gt: $lastId }
  ) {
    id
    fromCurrencyKey
    toCurrencyKey
    fromAmountInUSD
  }
}"#;

const MAX_EXCHANGES_PER_QUERY: usize = 1000;

#[derive(Debug, Deserialize)]
struct LatestRateRecord {
    rate: String,
}

#[derive(Debug, Deserialize)]
struct LatestRateData {
    #[serde(rename = "latestRate")]
    latest_rate: Option<LatestRateRecord>,
}

#[derive(Debug, Deserialize)]
struct RateUpdatesData {
    #[serde(rename = "rateUpdates")]
    rate_updates: Vec<RateUpdate>,
}

#[derive(Debug, Deserialize)]
struct ExchangeRecord {
    id: String,
    #[serde(rename = "fromCurrencyKey")]
    from_currency_key: String,
    #[serde(rename = "toCurrencyKey")]
    to_currency_key: String,
    #[serde(rename = "fromAmountInUSD")]
    from_amount_in_usd: String,
}

#[derive(Debug, Deserialize)]
struct ExchangesData {
    #[serde(rename = "synthExchanges")]
    synth_exchanges: Vec<ExchangeRecord>,
}

/// Synth rates indexer reached over GraphQL.
#[derive(Debug, Clone)]
pub struct SynthIndexerClient {
    client: GraphQlClient,
}

impl SynthIndexerClient {
    pub fn new(client: GraphQlClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SynthRateIndexer for SynthIndexerClient {
    async fn latest_rate(&self, synth_name: &str) -> Result<String> {
        let data: LatestRateData = self.client.query(GET_LATEST_RATE, serde_json::json!({ "synthName": synth_name })).await?;

        data.latest_rate
            .map(|record| record.rate)
            .ok_or_else(|| WatchlistError::not_found(synth_name, DataSource::Synth))
    }

    async fn rate_updates_at_or_before(&self, synth_name: &str, block: u64) -> Result<Vec<RateUpdate>> {
        let variables = serde_json::json!({
            "synthName": synth_name,
            "blockNumber": block.to_string(),
        });
        let data: RateUpdatesData = self.client.query(GET_RATE_BY_BLOCK, variables).await?;
        Ok(data.rate_updates)
    }

    async fn exchanges_since(&self, min_timestamp: u64) -> Result<Vec<SynthExchange>> {
        let records = collect_exchange_pages(MAX_EXCHANGES_PER_QUERY, |last_id| async move {
            let variables = serde_json::json!({
                "minTimestamp": min_timestamp.to_string(),
                "lastId": last_id,
                "first": MAX_EXCHANGES_PER_QUERY,
            });
            let data: ExchangesData = self.client.query(GET_EXCHANGES_SINCE, variables).await?;
            Ok::<_, WatchlistError>(data.synth_exchanges)
        })
        .await?;

        records
            .into_iter()
            .map(|record| -> Result<SynthExchange> {
                Ok(SynthExchange {
                    from_currency_key: decode_currency_key(&record.from_currency_key)?,
                    to_currency_key: decode_currency_key(&record.to_currency_key)?,
                    from_amount_in_usd: parse_fixed_point(&record.from_amount_in_usd)?,
                })
            })
            .collect()
    }
}

/// Walks `id`-ordered pages until one comes back short. Each request
/// resumes after the last id of the previous page.
async fn collect_exchange_pages<F, Fut>(page_size: usize, mut fetch_page: F) -> Result<Vec<ExchangeRecord>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Vec<ExchangeRecord>>>,
{
    let mut records: Vec<ExchangeRecord> = Vec::new();
    let mut last_id = String::new();
    loop {
        let page = fetch_page(last_id.clone()).await?;
        let page_len = page.len();
        records.extend(page);
        if page_len < page_size {
            break;
        }
        match records.last() {
            Some(record) => last_id = record.id.clone(),
            None => break,
        }
        debug!("Exchange page full at {} records, continuing after {}", records.len(), last_id);
    }
    Ok(records)
}

/// Currency keys are indexed as right-zero-padded `bytes32`; plain strings
/// pass through.
pub fn decode_currency_key(raw: &str) -> Result<String> {
    let Some(hex_str) = raw.strip_prefix("0x") else {
        return Ok(raw.to_string());
    };

    let bytes = hex::decode(hex_str).map_err(|e| FetchError::Decode(format!("currency key {raw}: {e}")))?;
    let end = bytes.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);

    String::from_utf8(bytes[..end].to_vec())
        .map_err(|e| FetchError::Decode(format!("currency key {raw}: {e}")).into())
}
