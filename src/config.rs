use alloy_primitives::Address;
use std::env;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_PUBLIC_ORIGIN: &str = "http://localhost:8000";
pub const DEFAULT_INDEXER_URL: &str = "https://ponder.farbarter.com";
pub const DEFAULT_PROFILE_API_URL: &str = "https://farcaster.anky.bot/farcaster";
pub const DEFAULT_IPFS_GATEWAY_URL: &str = "https://anky.mypinata.cloud";
pub const DEFAULT_PAYMENT_API_URL: &str = "https://farcaster.anky.bot/farbarter";
pub const DEFAULT_RPC_URL: &str = "https://rpc.degen.tips";
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x8d59e8ef33fb819979ad09fb444a26792970fb6f";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("CONTRACT_ADDRESS must be 0x followed by 40 hex digits, got `{0}`")]
    InvalidContractAddress(String),
}

#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    pub port: u16,
    /// Absolute origin used in frame embeds and share links.
    pub public_origin: String,
    pub endpoints: Endpoints,
    pub contract_address: Address,
    pub http: HttpSettings,
    pub metrics_key: Option<String>,
    pub openapi_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Endpoints {
    pub indexer: String,
    pub profiles: String,
    pub ipfs_gateway: String,
    pub payments: String,
    pub rpc: String,
}

#[derive(Debug, Clone, Copy)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            connect_timeout_secs: 5,
        }
    }
}

impl StorefrontConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str, default: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let base_url = |key: &str, default: &str| read(key, default).trim_end_matches('/').to_string();
        let number = |key: &str| lookup(key).and_then(|value| value.trim().parse::<u64>().ok());

        let contract_address = parse_contract_address(&read("CONTRACT_ADDRESS", DEFAULT_CONTRACT_ADDRESS))?;
        let defaults = HttpSettings::default();

        Ok(Self {
            port: lookup("PORT")
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(DEFAULT_PORT),
            public_origin: base_url("PUBLIC_ORIGIN", DEFAULT_PUBLIC_ORIGIN),
            endpoints: Endpoints {
                indexer: base_url("INDEXER_URL", DEFAULT_INDEXER_URL),
                profiles: base_url("PROFILE_API_URL", DEFAULT_PROFILE_API_URL),
                ipfs_gateway: base_url("IPFS_GATEWAY_URL", DEFAULT_IPFS_GATEWAY_URL),
                payments: base_url("PAYMENT_API_URL", DEFAULT_PAYMENT_API_URL),
                rpc: base_url("RPC_URL", DEFAULT_RPC_URL),
            },
            contract_address,
            http: HttpSettings {
                timeout_secs: number("HTTP_TIMEOUT_SECS")
                    .filter(|v| *v > 0)
                    .unwrap_or(defaults.timeout_secs),
                connect_timeout_secs: number("HTTP_CONNECT_TIMEOUT_SECS")
                    .filter(|v| *v > 0)
                    .unwrap_or(defaults.connect_timeout_secs),
            },
            metrics_key: lookup("METRICS_KEY").filter(|v| !v.is_empty()),
            openapi_key: lookup("OPENAPI_KEY").filter(|v| !v.is_empty()),
        })
    }
}

/// Requires the `0x` prefix; checksum casing is not enforced.
fn parse_contract_address(raw: &str) -> Result<Address, ConfigError> {
    let invalid = || ConfigError::InvalidContractAddress(raw.to_string());
    if !raw.starts_with("0x") && !raw.starts_with("0X") {
        return Err(invalid());
    }
    raw.parse::<Address>().map_err(|_| invalid())
}
