use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::wallet::signer::StubResponse;

/// Chain used when neither the connection nor the config supplies one
/// (Base Sepolia).
pub const DEFAULT_CHAIN_ID: u64 = 84532;

/// Connector id the harness looks up when connecting.
pub const DEFAULT_CONNECTOR_ID: &str = "xyz.ithaca.porto";

/* =======================
CLI ARGS
======================= */

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// Connect, sign once and exit instead of reading commands
    #[arg(long)]
    pub auto: bool,
}

/* =======================
MAIN CONFIG
======================= */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub wallet: WalletConfig,
    pub chains: Vec<ChainConfig>,
}

/* =======================
SITE CONFIG
======================= */

/// What the sign-in statement claims about the requesting site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub domain: String,
    pub uri: String,
    pub statement: String,
}

/* =======================
WALLET CONFIG
======================= */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    pub connector_id: String,

    // Only used by `local` connectors; SIGNER_PRIVATE_KEY overrides it
    pub private_key: Option<String>,

    pub connectors: Vec<ConnectorConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorConfig {
    pub id: String,
    pub name: String,
    pub kind: ConnectorKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConnectorKind {
    /// Signs with an in-process ethers `LocalWallet`.
    Local,
    /// Replays a scripted signer response.
    Stub {
        address: String,
        /// Chain the stub reports; omitted means the wallet reports none.
        #[serde(default)]
        chain_id: Option<u64>,
        response: StubResponse,
        #[serde(default)]
        delay_ms: u64,
    },
}

/* =======================
CHAIN CONFIG
======================= */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub id: u64,
    pub name: String,
}

/* =======================
DEFAULT CONFIG
======================= */

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteConfig {
                domain: "localhost:5173".to_string(),
                uri: "http://localhost:5173".to_string(),
                statement: "Sign in to test Porto signing".to_string(),
            },
            wallet: WalletConfig {
                connector_id: DEFAULT_CONNECTOR_ID.to_string(),
                private_key: None,
                connectors: vec![ConnectorConfig {
                    id: DEFAULT_CONNECTOR_ID.to_string(),
                    name: "Porto".to_string(),
                    kind: ConnectorKind::Local,
                }],
            },
            chains: vec![ChainConfig {
                id: DEFAULT_CHAIN_ID,
                name: "Base Sepolia".to_string(),
            }],
        }
    }
}

/* =======================
LOAD / CREATE CONFIG
======================= */

impl Config {
    pub fn load(path: &PathBuf) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            let config = Config::default();
            let content = serde_json::to_string_pretty(&config)?;
            std::fs::write(path, content)?;
            config
        };

        if let Ok(key) = std::env::var("SIGNER_PRIVATE_KEY") {
            if !key.trim().is_empty() {
                config.wallet.private_key = Some(key);
            }
        }

        Ok(config)
    }

    pub fn fallback_chain_id(&self) -> u64 {
        self.chains
            .first()
            .map(|c| c.id)
            .unwrap_or(DEFAULT_CHAIN_ID)
    }

    pub fn chain_name(&self, chain_id: u64) -> Option<String> {
        self.chains
            .iter()
            .find(|c| c.id == chain_id)
            .map(|c| c.name.clone())
    }
}
