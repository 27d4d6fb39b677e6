//! Process-wide configuration. The chain is fixed at compile time; only the
//! endpoints and the tag key slot come from the environment.

use crate::prelude::Result;
use crate::Error;
use log::debug;
use std::env;

/// Sepolia.
pub const CHAIN_ID: u64 = 11_155_111;

pub const DEFAULT_GATEWAY_URL: &str = "wss://s1.halo-gateway.arx.org";

/// Key slot used for both address retrieval and signing.
pub const DEFAULT_KEY_NO: u8 = 1;

pub const EXPLORER_TX_URL: &str = "https://sepolia.etherscan.io/tx/";

pub const RPC_URL_VAR: &str = "HALO_RPC_URL";
pub const GATEWAY_URL_VAR: &str = "HALO_GATEWAY_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub rpc_url: String,
    pub gateway_url: String,
    pub key_no: u8,
}

impl Config {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Config {
            rpc_url: rpc_url.into(),
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            key_no: DEFAULT_KEY_NO,
        }
    }

    pub fn with_gateway_url(mut self, gateway_url: impl Into<String>) -> Self {
        self.gateway_url = gateway_url.into();
        self
    }

    /// Reads `HALO_RPC_URL` (required) and `HALO_GATEWAY_URL` (optional),
    /// loading a `.env` file first if one exists.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let rpc_url = env::var(RPC_URL_VAR)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "{RPC_URL_VAR} environment variable not found. Please set it in your .env file or environment."
                ))
            })?;

        let mut config = Config::new(rpc_url);
        if let Ok(gateway_url) = env::var(GATEWAY_URL_VAR) {
            if !gateway_url.trim().is_empty() {
                config.gateway_url = gateway_url;
            }
        }
        debug!("Loaded config: {config:?}");
        Ok(config)
    }

    pub fn explorer_url(&self, tx_hash: &str) -> String {
        format!("{EXPLORER_TX_URL}{tx_hash}")
    }
}
