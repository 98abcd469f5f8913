use crate::data_sync::rpc::JsonRpcClient;
use crate::data_sync::traits::SynthRegistry;
use crate::error::{Result, WatchlistError};
use crate::logic::types::{BlockTag, DataSource, Network, Synth};
use crate::utils::config_loader::{ConfigLoader, ConfigLoaderSync, LoadConfigError, load_from_file, load_from_file_sync};
use ahash::AHashMap;
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug)]
pub struct RegistryConfigRoot {
    pub registry: RegistryConfigSection,
}

#[derive(Clone, Deserialize, Debug, Default)]
pub struct RegistryConfigSection {
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub synths: Vec<SynthConfig>,
    /// Non-synth ERC-20 tokens, keyed by symbol.
    #[serde(default)]
    pub tokens: AHashMap<String, Address>,
}

#[derive(Clone, Deserialize, Debug)]
pub struct SynthConfig {
    #[serde(flatten)]
    pub synth: Synth,
    #[serde(default)]
    pub address: Option<Address>,
}

#[async_trait]
impl ConfigLoader for RegistryConfigSection {
    type SectionType = RegistryConfigSection;

    async fn load_section_from_file(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        let root: RegistryConfigRoot = load_from_file(file_name).await?;
        Ok(root.registry)
    }
}

impl ConfigLoaderSync for RegistryConfigSection {
    type SectionType = RegistryConfigSection;

    fn load_section_from_file_sync(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        let root: RegistryConfigRoot = load_from_file_sync(file_name)?;
        Ok(root.registry)
    }
}

/// Synth registry built from configuration; supply reads go through RPC.
#[derive(Debug, Clone)]
pub struct StaticSynthRegistry {
    network: Network,
    synths: Vec<Synth>,
    token_addresses: AHashMap<String, Address>,
    rpc: JsonRpcClient,
}

impl StaticSynthRegistry {
    pub fn new(section: RegistryConfigSection, rpc: JsonRpcClient) -> Self {
        let mut token_addresses = section.tokens;
        let mut synths = Vec::with_capacity(section.synths.len());

        for entry in section.synths {
            if let Some(address) = entry.address {
                token_addresses.insert(entry.synth.name.clone(), address);
            }
            synths.push(entry.synth);
        }

        Self { network: section.network, synths, token_addresses, rpc }
    }
}

#[async_trait]
impl SynthRegistry for StaticSynthRegistry {
    fn network(&self) -> Network {
        self.network
    }

    fn synths(&self) -> Vec<Synth> {
        self.synths.clone()
    }

    fn find_synth(&self, name: &str) -> Option<Synth> {
        self.synths.iter().find(|s| s.name == name).cloned()
    }

    fn token_address(&self, symbol: &str) -> Option<Address> {
        self.token_addresses.get(symbol).copied()
    }

    async fn total_supply(&self, synth: &Synth, block: BlockTag) -> Result<U256> {
        let contract = self
            .token_address(&synth.name)
            .ok_or_else(|| WatchlistError::not_found(synth.name.clone(), DataSource::Synth))?;
        self.rpc.total_supply(contract, block).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config_loader::load_from_str;
    use std::time::Duration;

    const REGISTRY_TOML: &str = r#"
[registry]
network = "kovan"

[[registry.synths]]
name = "sUSD"
asset = "USD"
sign = "$"
description = "US Dollars"
address = "0x57ab1ec28d129707052df4df418d58a2d46d5f51"

[[registry.synths]]
name = "sDEFI"
description = "DeFi Index"

[registry.tokens]
SNX = "0xc011a73ee8576fb46f5e1c5751ca3b9fe0af2a6f"
"#;

    fn registry() -> StaticSynthRegistry {
        let root: RegistryConfigRoot = load_from_str(REGISTRY_TOML).unwrap();
        let rpc = JsonRpcClient::new("https://rpc.test".to_string(), Duration::from_secs(1)).unwrap();
        StaticSynthRegistry::new(root.registry, rpc)
    }

    #[test]
    fn test_registry_from_toml() {
        let registry = registry();
        assert_eq!(registry.network(), Network::Kovan);
        assert_eq!(registry.synths().len(), 2);

        let susd = registry.find_synth("sUSD").unwrap();
        assert_eq!(susd.sign.as_deref(), Some("$"));
        assert!(registry.token_address("sUSD").is_some());
        assert!(registry.token_address("SNX").is_some());
    }

    #[test]
    fn test_synth_without_address() {
        let registry = registry();
        assert!(registry.find_synth("sDEFI").is_some());
        assert_eq!(registry.token_address("sDEFI"), None);
        assert!(registry.find_synth("sFOO").is_none());
    }

    #[tokio::test]
    async fn test_total_supply_without_address_is_not_found() {
        let registry = registry();
        let err = registry.total_supply(&Synth::new("sDEFI"), BlockTag::Latest).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
