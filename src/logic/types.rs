use crate::error::{Result, WatchlistError};
use crate::utils::token::Token;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Where an asset's market data comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum DataSource {
    Synth,
    Uni,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Network {
    #[default]
    Mainnet,
    Kovan,
}

/// A trackable asset without resolved market data.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    pub id: String,
    pub data_source: DataSource,
}

impl WatchlistEntry {
    pub fn new(id: impl Into<String>, data_source: DataSource) -> Self {
        Self { id: id.into(), data_source }
    }

    pub fn synth(id: impl Into<String>) -> Self {
        Self::new(id, DataSource::Synth)
    }

    pub fn uni(id: impl Into<String>) -> Self {
        Self::new(id, DataSource::Uni)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RateOrigin {
    #[default]
    Recorded,
    /// No record existed at or before the requested block; the rate reads as zero.
    MissingHistorical,
}

/// A single point-in-time price, already decimal-normalized.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatePoint {
    pub formatted_rate: f64,
    #[serde(default)]
    pub origin: RateOrigin,
}

impl RatePoint {
    pub fn recorded(formatted_rate: f64) -> Self {
        Self { formatted_rate, origin: RateOrigin::Recorded }
    }

    pub fn missing() -> Self {
        Self { formatted_rate: 0.0, origin: RateOrigin::MissingHistorical }
    }

    pub fn is_missing(&self) -> bool {
        self.origin == RateOrigin::MissingHistorical
    }
}

/// One point of a rendered price history.
pub type PriceChartEntry = RatePoint;

/// Synth registry descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Synth {
    pub name: String,
    #[serde(default)]
    pub asset: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sign: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Synth {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthData {
    #[serde(flatten)]
    pub synth: Synth,
    pub formatted_rate: f64,
}

/// Resolved asset record.
///
/// `data_source` always equals the originating [`WatchlistEntry`]'s, and
/// `quantity` is only set by a balance pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenListEntry {
    #[serde(flatten)]
    pub token: Token,
    pub formatted_rate: f64,
    pub formatted_rate_daily: f64,
    #[serde(default)]
    pub daily_rate_origin: RateOrigin,
    pub data_source: DataSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
}

impl TokenListEntry {
    pub fn new(token: Token, rate: RatePoint, daily: RatePoint, data_source: DataSource) -> Self {
        Self {
            token,
            formatted_rate: rate.formatted_rate,
            formatted_rate_daily: daily.formatted_rate,
            daily_rate_origin: daily.origin,
            data_source,
            quantity: None,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.token.symbol
    }

    pub fn daily_change(&self) -> Option<f64> {
        if self.daily_rate_origin == RateOrigin::MissingHistorical {
            return None;
        }
        Some(self.formatted_rate - self.formatted_rate_daily)
    }

    pub fn daily_change_percent(&self) -> Option<f64> {
        let change = self.daily_change()?;
        if self.formatted_rate_daily == 0.0 {
            return None;
        }
        Some(change / self.formatted_rate_daily * 100.0)
    }

    /// USD value of the attached balance, if a balance pass ran.
    pub fn holding_value(&self) -> Option<f64> {
        self.quantity.map(|q| q * self.formatted_rate)
    }
}

/// Block number as served by indexers: either a JSON number or a
/// decimal/hex string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockNumber {
    Number(u64),
    Text(String),
}

/// A checkpoint used to query historical rates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub number: BlockNumber,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

impl Block {
    pub fn new(number: u64) -> Self {
        Self { number: BlockNumber::Number(number), timestamp: None }
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn block_number(&self) -> Result<u64> {
        match &self.number {
            BlockNumber::Number(n) => Ok(*n),
            BlockNumber::Text(raw) => {
                let raw = raw.trim();
                let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
                    Some(hex) => u64::from_str_radix(hex, 16),
                    None => raw.parse::<u64>(),
                };
                parsed.map_err(|e| WatchlistError::InvalidBlock(format!("{raw}: {e}")))
            }
        }
    }
}

/// Block tag for contract reads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlockTag {
    #[default]
    Latest,
    Number(u64),
}

impl BlockTag {
    pub fn to_rpc_param(&self) -> String {
        match self {
            BlockTag::Latest => "latest".to_string(),
            BlockTag::Number(num) => format!("0x{num:x}"),
        }
    }
}

/// Consistent read of the ambient price/block state, taken once per
/// top-level call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarketContext {
    /// Block number representing "~24h ago".
    pub daily_block: u64,
    pub eth_price_usd: f64,
}

impl MarketContext {
    pub fn new(daily_block: u64, eth_price_usd: f64) -> Self {
        Self { daily_block, eth_price_usd }
    }
}

/// Historical synth rate record from the indexer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateUpdate {
    pub rate: String,
    #[serde(default)]
    pub block: Option<String>,
}

/// Uniswap subgraph token snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniToken {
    pub id: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub decimals: Option<String>,
    #[serde(rename = "derivedETH")]
    pub derived_eth: String,
}

/// A decoded synth exchange event.
#[derive(Clone, Debug, PartialEq)]
pub struct SynthExchange {
    pub from_currency_key: String,
    pub to_currency_key: String,
    pub from_amount_in_usd: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_watchlist_entry_wire_format() {
        let entry: WatchlistEntry = serde_json::from_str(r#"{"id":"sUSD","dataSource":"SYNTH"}"#).unwrap();
        assert_eq!(entry, WatchlistEntry::synth("sUSD"));
        assert_eq!(serde_json::to_string(&WatchlistEntry::uni("0xabc")).unwrap(), r#"{"id":"0xabc","dataSource":"UNI"}"#);
    }

    #[test]
    fn test_data_source_strings() {
        assert_eq!(DataSource::Synth.to_string(), "SYNTH");
        assert_eq!(DataSource::from_str("UNI").unwrap(), DataSource::Uni);
        assert_eq!(Network::from_str("Kovan").unwrap(), Network::Kovan);
    }

    #[test]
    fn test_block_number_parsing() {
        let blocks: Vec<Block> = serde_json::from_str(r#"[{"number":12},{"number":"13"},{"number":"0x0e","timestamp":1}]"#).unwrap();
        let numbers: Vec<u64> = blocks.iter().map(|b| b.block_number().unwrap()).collect();
        assert_eq!(numbers, vec![12, 13, 14]);
        assert_eq!(blocks[2].timestamp, Some(1));

        let upper = Block { number: BlockNumber::Text("0X1A".to_string()), timestamp: None };
        assert_eq!(upper.block_number().unwrap(), 26);
        let padded = Block { number: BlockNumber::Text(" 0xff ".to_string()), timestamp: None };
        assert_eq!(padded.block_number().unwrap(), 255);
    }

    #[test]
    fn test_invalid_block_number() {
        let block = Block { number: BlockNumber::Text("latest".to_string()), timestamp: None };
        assert!(matches!(block.block_number(), Err(WatchlistError::InvalidBlock(_))));
    }

    #[test]
    fn test_block_tag_param() {
        assert_eq!(BlockTag::Latest.to_rpc_param(), "latest");
        assert_eq!(BlockTag::Number(255).to_rpc_param(), "0xff");
    }

    #[test]
    fn test_missing_rate_is_zero_but_tagged() {
        let missing = RatePoint::missing();
        assert_eq!(missing.formatted_rate, 0.0);
        assert!(missing.is_missing());
        assert!(!RatePoint::recorded(0.0).is_missing());
    }

    #[test]
    fn test_daily_change() {
        let token = Token::new("sETH");
        let entry = TokenListEntry::new(token.clone(), RatePoint::recorded(110.0), RatePoint::recorded(100.0), DataSource::Synth);
        assert_eq!(entry.daily_change(), Some(10.0));
        assert_eq!(entry.daily_change_percent(), Some(10.0));
        assert_eq!(entry.holding_value(), None);

        let degraded = TokenListEntry::new(token, RatePoint::recorded(110.0), RatePoint::missing(), DataSource::Synth);
        assert_eq!(degraded.formatted_rate_daily, 0.0);
        assert_eq!(degraded.daily_change(), None);
        assert_eq!(degraded.daily_change_percent(), None);
    }

    #[test]
    fn test_token_list_entry_serialization_flattens_token() {
        let mut entry = TokenListEntry::new(Token::new("sBTC"), RatePoint::recorded(1.0), RatePoint::recorded(1.0), DataSource::Synth);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["symbol"], "sBTC");
        assert_eq!(json["dataSource"], "SYNTH");
        assert!(json.get("quantity").is_none());

        entry.quantity = Some(2.0);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["quantity"], 2.0);
    }
}
