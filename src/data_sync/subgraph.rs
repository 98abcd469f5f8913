use crate::data_sync::graphql::GraphQlClient;
use crate::data_sync::traits::UniswapSubgraph;
use crate::error::{FetchError, Result};
use crate::logic::types::UniToken;
use crate::utils::constants::UNISWAP_BUNDLE_ID;
use async_trait::async_trait;
use serde::Deserialize;

pub const GET_TOKENS: &str = r#"
query GetTokens($ids: [ID!]!) {
  tokens(where: { id_in: $ids }) {
    id
    symbol
    name
    decimals
    derivedETH
  }
}"#;

pub const GET_TOKENS_AT_BLOCK: &str = r#"
query GetTokensAtBlock($ids: [ID!]!, $block: Int!) {
  tokens(block: { number: $block }, where: { id_in: $ids }) {
    id
    symbol
    name
    decimals
    derivedETH
  }
}"#;

pub const GET_ETH_PRICE: &str = r#"
query GetEthPrice($id: ID!) {
  bundle(id: $id) {
    ethPrice
  }
}"#;

pub const GET_ETH_PRICE_AT_BLOCK: &str = r#"
query GetEthPriceAtBlock($id: ID!, $block: Int!) {
  bundle(id: $id, block: { number: $block }) {
    ethPrice
  }
}"#;

#[derive(Debug, Deserialize)]
struct TokensData {
    tokens: Vec<UniToken>,
}

#[derive(Debug, Deserialize)]
struct BundleRecord {
    #[serde(rename = "ethPrice")]
    eth_price: String,
}

#[derive(Debug, Deserialize)]
struct BundleData {
    bundle: Option<BundleRecord>,
}

/// Uniswap V2 subgraph reached over GraphQL.
#[derive(Debug, Clone)]
pub struct UniswapSubgraphClient {
    client: GraphQlClient,
}

impl UniswapSubgraphClient {
    pub fn new(client: GraphQlClient) -> Self {
        Self { client }
    }
}

/// Subgraph token ids are lowercase addresses.
fn normalize_ids(ids: &[String]) -> Vec<String> {
    ids.iter().map(|id| id.to_lowercase()).collect()
}

#[async_trait]
impl UniswapSubgraph for UniswapSubgraphClient {
    async fn tokens_by_id(&self, ids: &[String]) -> Result<Vec<UniToken>> {
        let data: TokensData = self.client.query(GET_TOKENS, serde_json::json!({ "ids": normalize_ids(ids) })).await?;
        Ok(data.tokens)
    }

    async fn tokens_by_id_at_block(&self, ids: &[String], block: u64) -> Result<Vec<UniToken>> {
        let variables = serde_json::json!({ "ids": normalize_ids(ids), "block": block });
        let data: TokensData = self.client.query(GET_TOKENS_AT_BLOCK, variables).await?;
        Ok(data.tokens)
    }

    async fn eth_price(&self, block: Option<u64>) -> Result<Option<f64>> {
        let data: BundleData = match block {
            Some(block) => {
                self.client
                    .query(GET_ETH_PRICE_AT_BLOCK, serde_json::json!({ "id": UNISWAP_BUNDLE_ID, "block": block }))
                    .await?
            }
            None => self.client.query(GET_ETH_PRICE, serde_json::json!({ "id": UNISWAP_BUNDLE_ID })).await?,
        };

        bundle_price(data)
    }
}

/// A `null` bundle means the subgraph had not indexed a price yet.
fn bundle_price(data: BundleData) -> Result<Option<f64>> {
    data.bundle.map(|bundle| parse_decimal(&bundle.eth_price)).transpose()
}

/// Subgraph `BigDecimal` values arrive as decimal strings.
pub fn parse_decimal(raw: &str) -> Result<f64> {
    raw.trim().parse::<f64>().map_err(|e| FetchError::Decode(format!("decimal {raw}: {e}")).into())
}
