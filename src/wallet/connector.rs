use async_trait::async_trait;
use ethers::types::Address;
use log::warn;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, ConnectorKind};
use crate::error::ConnectorError;
use crate::wallet::signer::{LocalTypedDataSigner, StubSigner, TypedDataSigner};

/// Account reported by a connector once connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Account {
    pub address: Address,
    /// `None` when the wallet does not report a chain.
    pub chain_id: Option<u64>,
}

/// Uniform connect/disconnect surface over a specific wallet backend.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    async fn connect(&self) -> Result<Account, ConnectorError>;

    async fn disconnect(&self);

    /// Signing capability bound to this connector's account.
    fn signer(&self) -> Arc<dyn TypedDataSigner>;
}

/* =======================
REGISTRY
======================= */

#[derive(Clone, Default)]
pub struct ConnectorRegistry {
    connectors: Vec<Arc<dyn WalletConnector>>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, connector: Arc<dyn WalletConnector>) {
        self.connectors.push(connector);
    }

    pub fn find(&self, id: &str) -> Option<Arc<dyn WalletConnector>> {
        self.connectors.iter().find(|c| c.id() == id).cloned()
    }

    pub fn ids(&self) -> Vec<String> {
        self.connectors.iter().map(|c| c.id().to_string()).collect()
    }

    pub fn from_config(config: &Config) -> Result<Self, ConnectorError> {
        let chain_id = config.fallback_chain_id();
        let mut registry = Self::new();

        for entry in &config.wallet.connectors {
            let connector: Arc<dyn WalletConnector> = match &entry.kind {
                ConnectorKind::Local => {
                    let signer = match &config.wallet.private_key {
                        Some(pk) => LocalTypedDataSigner::from_private_key(pk, chain_id)
                            .map_err(|e| ConnectorError::Config(e.to_string()))?,
                        None => {
                            warn!("⚠️ No private key configured for {}, using a random key", entry.id);
                            LocalTypedDataSigner::random(chain_id)
                        }
                    };
                    Arc::new(LocalWalletConnector::new(&entry.id, &entry.name, signer, chain_id))
                }
                ConnectorKind::Stub {
                    address,
                    chain_id: stub_chain,
                    response,
                    delay_ms,
                } => {
                    let address = Address::from_str(address)
                        .map_err(|e| ConnectorError::Config(format!("{}: {}", address, e)))?;
                    let signer = StubSigner::new(response.clone())
                        .with_delay(Duration::from_millis(*delay_ms));
                    Arc::new(StubConnector::new(
                        &entry.id,
                        &entry.name,
                        Account {
                            address,
                            chain_id: *stub_chain,
                        },
                        signer,
                    ))
                }
            };

            registry.register(connector);
        }

        Ok(registry)
    }
}

/* =======================
LOCAL WALLET CONNECTOR
======================= */

pub struct LocalWalletConnector {
    id: String,
    name: String,
    signer: Arc<LocalTypedDataSigner>,
    chain_id: u64,
}

impl LocalWalletConnector {
    pub fn new(id: &str, name: &str, signer: LocalTypedDataSigner, chain_id: u64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            signer: Arc::new(signer),
            chain_id,
        }
    }
}

#[async_trait]
impl WalletConnector for LocalWalletConnector {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn connect(&self) -> Result<Account, ConnectorError> {
        Ok(Account {
            address: self.signer.address(),
            chain_id: Some(self.chain_id),
        })
    }

    async fn disconnect(&self) {}

    fn signer(&self) -> Arc<dyn TypedDataSigner> {
        self.signer.clone()
    }
}

/* =======================
STUB CONNECTOR
======================= */

/// Connector with a fixed account and a scripted signer.
pub struct StubConnector {
    id: String,
    name: String,
    account: Account,
    signer: Arc<dyn TypedDataSigner>,
    refuse: Option<String>,
}

impl StubConnector {
    pub fn new(id: &str, name: &str, account: Account, signer: impl TypedDataSigner + 'static) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            account,
            signer: Arc::new(signer),
            refuse: None,
        }
    }

    /// Make `connect` fail with `message`.
    pub fn refusing(mut self, message: &str) -> Self {
        self.refuse = Some(message.to_string());
        self
    }
}

#[async_trait]
impl WalletConnector for StubConnector {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn connect(&self) -> Result<Account, ConnectorError> {
        match &self.refuse {
            Some(message) => Err(ConnectorError::Rejected(message.clone())),
            None => Ok(self.account),
        }
    }

    async fn disconnect(&self) {}

    fn signer(&self) -> Arc<dyn TypedDataSigner> {
        self.signer.clone()
    }
}
