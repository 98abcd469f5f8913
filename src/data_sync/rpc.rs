use crate::data_sync::traits::WalletSession;
use crate::error::{FetchError, Result};
use crate::logic::types::BlockTag;
use crate::utils::token::to_float;
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, sol};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

sol! {
    /// ERC-20 read surface used for balances and synth supply
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
    }
}

/// JSON-RPC client for read-only contract calls.
#[derive(Debug, Clone)]
pub struct JsonRpcClient {
    http_client: reqwest::Client,
    rpc_url: String,
}

impl JsonRpcClient {
    pub fn new(rpc_url: String, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { http_client, rpc_url })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    pub fn prepare_balance_of_call(account: Address) -> Bytes {
        IERC20::balanceOfCall { account }.abi_encode().into()
    }

    pub async fn balance_of(&self, contract: Address, account: Address, block: BlockTag) -> Result<U256> {
        let response = self.call_contract(contract, Self::prepare_balance_of_call(account), block).await?;
        Ok(IERC20::balanceOfCall::abi_decode_returns(&response)?)
    }

    pub async fn decimals(&self, contract: Address) -> Result<u8> {
        let response = self.call_contract(contract, IERC20::decimalsCall {}.abi_encode().into(), BlockTag::Latest).await?;
        Ok(IERC20::decimalsCall::abi_decode_returns(&response)?)
    }

    pub async fn total_supply(&self, contract: Address, block: BlockTag) -> Result<U256> {
        let response = self.call_contract(contract, IERC20::totalSupplyCall {}.abi_encode().into(), block).await?;
        Ok(IERC20::totalSupplyCall::abi_decode_returns(&response)?)
    }

    /// Make a contract call via RPC
    async fn call_contract(&self, to: Address, data: Bytes, block: BlockTag) -> Result<Bytes> {
        let request_body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "eth_call",
            "params": [
                {
                    "to": format!("{:#x}", to),
                    "data": format!("{:#x}", data)
                },
                block.to_rpc_param()
            ],
            "id": 1
        });

        let response = self
            .http_client
            .post(&self.rpc_url)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let response_json: Value = response.json().await?;
        decode_call_result(&response_json)
    }
}

fn decode_call_result(response_json: &Value) -> Result<Bytes> {
    if let Some(error) = response_json.get("error") {
        return Err(FetchError::Rpc(error.to_string()).into());
    }

    let result = response_json
        .get("result")
        .and_then(|r| r.as_str())
        .ok_or_else(|| FetchError::Decode("missing result in RPC response".to_string()))?;

    let bytes = hex::decode(result.trim_start_matches("0x")).map_err(|e| FetchError::Decode(e.to_string()))?;
    Ok(bytes.into())
}

/// Wallet session backed by a JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct RpcWallet {
    rpc: JsonRpcClient,
    address: Address,
}

impl RpcWallet {
    pub fn new(rpc: JsonRpcClient, address: Address) -> Self {
        Self { rpc, address }
    }
}

#[async_trait]
impl WalletSession for RpcWallet {
    fn address(&self) -> Address {
        self.address
    }

    async fn token_balance(&self, contract: Address) -> Result<f64> {
        let (raw, decimals) =
            futures::try_join!(self.rpc.balance_of(contract, self.address, BlockTag::Latest), self.rpc.decimals(contract))?;
        debug!("Balance of {} at {}: {} (decimals {})", self.address, contract, raw, decimals);
        to_float(raw, decimals)
    }
}
