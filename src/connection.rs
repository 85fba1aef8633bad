use ethers::types::Address;
use ethers::utils::to_checksum;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::HarnessError;
use crate::event_log::EventLog;
use crate::wallet::connector::{ConnectorRegistry, WalletConnector};
use crate::wallet::signer::TypedDataSigner;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionState {
    pub is_connected: bool,
    pub address: Option<Address>,
    pub chain_id: Option<u64>,
    pub chain_name: Option<String>,
}

impl ConnectionState {
    pub fn checksum_address(&self) -> Option<String> {
        self.address.as_ref().map(|a| to_checksum(a, None))
    }
}

#[derive(Default)]
struct Inner {
    state: ConnectionState,
    active: Option<Arc<dyn WalletConnector>>,
}

/// Tracks the wallet connection made through one configured connector id.
#[derive(Clone)]
pub struct ConnectionManager {
    registry: ConnectorRegistry,
    connector_id: String,
    chain_names: Arc<dyn Fn(u64) -> Option<String> + Send + Sync>,
    inner: Arc<RwLock<Inner>>,
    log: EventLog,
}

impl ConnectionManager {
    pub fn new(
        registry: ConnectorRegistry,
        connector_id: &str,
        chain_names: impl Fn(u64) -> Option<String> + Send + Sync + 'static,
        log: EventLog,
    ) -> Self {
        Self {
            registry,
            connector_id: connector_id.to_string(),
            chain_names: Arc::new(chain_names),
            inner: Arc::new(RwLock::new(Inner::default())),
            log,
        }
    }

    pub async fn state(&self) -> ConnectionState {
        self.inner.read().await.state.clone()
    }

    pub async fn active_signer(&self) -> Option<Arc<dyn TypedDataSigner>> {
        let inner = self.inner.read().await;
        if !inner.state.is_connected {
            return None;
        }
        inner.active.as_ref().map(|c| c.signer())
    }

    /// Connect through the configured connector. Connector-unavailable and
    /// connector failures are logged and leave the state untouched.
    pub async fn connect(&self) {
        let Some(connector) = self.registry.find(&self.connector_id) else {
            let err = HarnessError::ConnectorUnavailable(self.connector_id.clone());
            self.log.append(format!("❌ {}", err)).await;
            return;
        };

        self.log
            .append(format!("🔌 Connecting to {}...", connector.name()))
            .await;

        match connector.connect().await {
            Ok(account) => {
                let state = ConnectionState {
                    is_connected: true,
                    address: Some(account.address),
                    chain_id: account.chain_id,
                    chain_name: account.chain_id.and_then(|id| (self.chain_names)(id)),
                };

                {
                    let mut inner = self.inner.write().await;
                    inner.state = state;
                    inner.active = Some(connector.clone());
                }

                let chain = match account.chain_id {
                    Some(id) => format!("on chain {}", id),
                    None => "(no chain reported)".to_string(),
                };
                self.log
                    .append(format!(
                        "✅ Connected {} {}",
                        to_checksum(&account.address, None),
                        chain
                    ))
                    .await;
            }
            Err(e) => {
                self.log.append(format!("❌ Connection failed: {}", e)).await;
            }
        }
    }

    pub async fn disconnect(&self) {
        self.log.append("👋 Disconnecting...").await;

        let active = {
            let mut inner = self.inner.write().await;
            inner.state = ConnectionState::default();
            inner.active.take()
        };

        if let Some(connector) = active {
            connector.disconnect().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::connector::{Account, StubConnector};
    use crate::wallet::signer::StubSigner;
    use std::str::FromStr;

    const ADDRESS: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";

    fn manager(connector: StubConnector, id: &str) -> (ConnectionManager, EventLog) {
        let mut registry = ConnectorRegistry::new();
        registry.register(Arc::new(connector));
        let log = EventLog::new();
        let names = |id: u64| (id == 84532).then(|| "Base Sepolia".to_string());
        (ConnectionManager::new(registry, id, names, log.clone()), log)
    }

    fn stub() -> StubConnector {
        StubConnector::new(
            "xyz.ithaca.porto",
            "Porto",
            Account {
                address: Address::from_str(ADDRESS).unwrap(),
                chain_id: Some(84532),
            },
            StubSigner::empty(),
        )
    }

    #[tokio::test]
    async fn connect_then_disconnect() {
        let (manager, log) = manager(stub(), "xyz.ithaca.porto");
        assert_eq!(manager.state().await, ConnectionState::default());

        manager.connect().await;
        let state = manager.state().await;
        assert!(state.is_connected);
        assert_eq!(
            state.checksum_address().as_deref(),
            Some("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed")
        );
        assert_eq!(state.chain_id, Some(84532));
        assert_eq!(state.chain_name.as_deref(), Some("Base Sepolia"));
        assert!(manager.active_signer().await.is_some());

        manager.disconnect().await;
        assert_eq!(manager.state().await, ConnectionState::default());
        assert!(manager.active_signer().await.is_none());

        let texts: Vec<_> = log.entries().await.into_iter().map(|e| e.text).collect();
        assert_eq!(texts[0], "🔌 Connecting to Porto...");
        assert!(texts[1].starts_with("✅ Connected 0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
        assert_eq!(texts[2], "👋 Disconnecting...");
    }

    #[tokio::test]
    async fn connect_without_reported_chain() {
        let connector = StubConnector::new(
            "xyz.ithaca.porto",
            "Porto",
            Account {
                address: Address::from_str(ADDRESS).unwrap(),
                chain_id: None,
            },
            StubSigner::empty(),
        );
        let (manager, log) = manager(connector, "xyz.ithaca.porto");
        manager.connect().await;

        let state = manager.state().await;
        assert!(state.is_connected);
        assert_eq!(state.chain_id, None);
        assert_eq!(state.chain_name, None);
        assert_eq!(log.matching("(no chain reported)").await.len(), 1);
    }

    #[tokio::test]
    async fn missing_connector_is_a_logged_no_op() {
        let (manager, log) = manager(stub(), "io.metamask");
        manager.connect().await;

        assert!(!manager.state().await.is_connected);
        let entries = log.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, "❌ Wallet connector io.metamask not found");
    }

    #[tokio::test]
    async fn connector_failure_keeps_disconnected() {
        let (manager, log) = manager(stub().refusing("User closed the dialog"), "xyz.ithaca.porto");
        manager.connect().await;

        assert!(!manager.state().await.is_connected);
        assert_eq!(log.matching("❌ Connection failed").await.len(), 1);
    }

    #[tokio::test]
    async fn disconnect_when_idle_still_clears() {
        let (manager, log) = manager(stub(), "xyz.ithaca.porto");
        manager.disconnect().await;
        assert_eq!(manager.state().await, ConnectionState::default());
        assert_eq!(log.len().await, 1);
    }
}
