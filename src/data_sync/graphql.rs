use crate::error::{FetchError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<GraphQlErrorMessage>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorMessage {
    message: String,
}

/// Minimal GraphQL-over-HTTP client shared by the indexer and subgraph adapters.
#[derive(Debug, Clone)]
pub struct GraphQlClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl GraphQlClient {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { http_client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn query<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        debug!("GraphQL query to {} with {}", self.endpoint, variables);

        let request_body = serde_json::json!({
            "query": query,
            "variables": variables,
        });

        let response = self.http_client.post(&self.endpoint).json(&request_body).send().await?.error_for_status()?;

        let body: Value = response.json().await?;
        decode_response(body)
    }
}

fn decode_response<T: DeserializeOwned>(body: Value) -> Result<T> {
    let parsed: GraphQlResponse<T> =
        serde_json::from_value(body).map_err(|e| FetchError::Decode(format!("graphql envelope: {e}")))?;

    if let Some(errors) = parsed.errors.filter(|errors| !errors.is_empty()) {
        let message = errors.into_iter().map(|e| e.message).collect::<Vec<_>>().join("; ");
        return Err(FetchError::GraphQl(message).into());
    }

    parsed.data.ok_or_else(|| FetchError::Decode("missing data in graphql response".to_string()).into())
}
