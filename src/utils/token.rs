use crate::error::{Result, WatchlistError};
use crate::utils::constants::RATE_DECIMALS;
use alloy_primitives::utils::format_units;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Base asset descriptor shared by synths and Uniswap tokens.
///
/// `address` is `None` when the asset is not present in the token registry;
/// consumers treat that as "balance unavailable".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub symbol: String,
    pub name: String,
    pub address: Option<Address>,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

fn default_decimals() -> u8 {
    RATE_DECIMALS
}

impl Token {
    pub fn new(symbol: impl Into<String>) -> Token {
        let symbol = symbol.into();
        Token { name: symbol.clone(), symbol, address: None, decimals: RATE_DECIMALS }
    }

    pub fn new_with_data(symbol: impl Into<String>, name: Option<String>, address: Option<Address>, decimals: Option<u8>) -> Token {
        let symbol = symbol.into();
        Token {
            name: name.unwrap_or_else(|| symbol.clone()),
            symbol,
            address,
            decimals: decimals.unwrap_or(RATE_DECIMALS),
        }
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn to_float(&self, value: U256) -> Result<f64> {
        to_float(value, self.decimals)
    }
}

/// Convert a raw on-chain integer into its display value.
pub fn to_float(value: U256, decimals: u8) -> Result<f64> {
    let formatted = format_units(value, decimals).map_err(|e| WatchlistError::InvalidFixedPoint(e.to_string()))?;
    formatted.parse::<f64>().map_err(|e| WatchlistError::InvalidFixedPoint(format!("{formatted}: {e}")))
}

/// Parse an 18-decimal fixed-point string as served by the indexer
/// (decimal or `0x`-prefixed) into a float.
pub fn parse_fixed_point(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    let digits_ok = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        Some(hex) => !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()),
        None => !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()),
    };
    if !digits_ok {
        return Err(WatchlistError::InvalidFixedPoint(format!("{raw:?} is not an unsigned integer")));
    }

    let value = U256::from_str(trimmed).map_err(|e| WatchlistError::InvalidFixedPoint(format!("{raw}: {e}")))?;
    to_float(value, RATE_DECIMALS)
}
