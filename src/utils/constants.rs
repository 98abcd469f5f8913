/// Decimals of on-chain rate and supply values.
pub const RATE_DECIMALS: u8 = 18;

pub const SECONDS_PER_DAY: u64 = 86_400;

/// Uniswap subgraph singleton holding the ETH/USD reference price.
pub const UNISWAP_BUNDLE_ID: &str = "1";

#[non_exhaustive]
pub struct DefaultEndpoints;

impl DefaultEndpoints {
    pub const SYNTH_RATES_INDEXER: &'static str = "https://api.thegraph.com/subgraphs/name/synthetixio-team/synthetix-rates";
    pub const SYNTH_RATES_INDEXER_KOVAN: &'static str = "https://api.thegraph.com/subgraphs/name/synthetixio-team/synthetix-rates-kovan";
    pub const UNISWAP_V2_SUBGRAPH: &'static str = "https://api.thegraph.com/subgraphs/name/uniswap/uniswap-v2";
    pub const RPC_HTTP: &'static str = "https://cloudflare-eth.com";
}
