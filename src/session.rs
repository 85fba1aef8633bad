use log::debug;
use std::fmt;

use crate::config::Config;
use crate::connection::{ConnectionManager, ConnectionState};
use crate::error::{ConnectorError, HarnessError};
use crate::event_log::EventLog;
use crate::invoker::{SignOutcome, SigningInvoker};
use crate::message::{self, SiteContext};
use crate::wallet::connector::ConnectorRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Connect,
    Sign,
    Disconnect,
    ClearLogs,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Connect => "connect",
            Action::Sign => "sign",
            Action::Disconnect => "disconnect",
            Action::ClearLogs => "clear",
        };
        f.write_str(label)
    }
}

/// One harness session: the UI action handlers over explicitly passed-in
/// connection, signing and log state.
#[derive(Clone)]
pub struct Session {
    site: SiteContext,
    fallback_chain_id: u64,
    connection: ConnectionManager,
    invoker: SigningInvoker,
    log: EventLog,
}

impl Session {
    pub fn new(site: SiteContext, fallback_chain_id: u64, connection: ConnectionManager, log: EventLog) -> Self {
        Self {
            site,
            fallback_chain_id,
            invoker: SigningInvoker::new(log.clone()),
            connection,
            log,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConnectorError> {
        let registry = ConnectorRegistry::from_config(config)?;
        let log = EventLog::new();

        let chains = config.clone();
        let connection = ConnectionManager::new(
            registry,
            &config.wallet.connector_id,
            move |id| chains.chain_name(id),
            log.clone(),
        );

        Ok(Self::new(
            SiteContext::from(&config.site),
            config.fallback_chain_id(),
            connection,
            log,
        ))
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub async fn state(&self) -> ConnectionState {
        self.connection.state().await
    }

    pub async fn handle_connect(&self) {
        self.connection.connect().await;
    }

    pub async fn handle_disconnect(&self) {
        self.connection.disconnect().await;
    }

    pub async fn handle_clear(&self) {
        self.log.clear().await;
    }

    /// Build a sign-in request for the connected account and run it through
    /// the signer. Returns `None` when nothing was sent to a signer.
    pub async fn handle_sign(&self) -> Option<SignOutcome> {
        let state = self.connection.state().await;
        let address = state.checksum_address();

        let signer = match (address.as_ref(), self.connection.active_signer().await) {
            (Some(_), Some(signer)) => signer,
            _ => {
                self.log.append(format!("❌ {}", HarnessError::NoAccount)).await;
                return None;
            }
        };

        self.log.append("📝 Creating SIWE message...").await;

        let statement = match message::build(
            &self.site,
            address.as_deref(),
            state.chain_id,
            self.fallback_chain_id,
        ) {
            Ok(s) => s,
            Err(e) => {
                self.log.append(format!("❌ {}", e)).await;
                return None;
            }
        };

        self.log
            .append(format!("✅ SIWE message created for chain {}", statement.chain_id))
            .await;
        debug!("SIWE message:\n{}", statement.to_siwe_text());

        let request = statement.to_typed_data();
        if let Ok(json) = request.to_json() {
            debug!("typed data request:\n{}", json);
        }

        Some(self.invoker.sign(signer.as_ref(), request).await)
    }

    pub async fn available_actions(&self) -> Vec<Action> {
        let mut actions = if self.connection.state().await.is_connected {
            if self.invoker.is_signing() {
                vec![Action::Disconnect]
            } else {
                vec![Action::Sign, Action::Disconnect]
            }
        } else {
            vec![Action::Connect]
        };

        if !self.log.is_empty().await {
            actions.push(Action::ClearLogs);
        }
        actions
    }

    pub async fn render_status(&self) -> String {
        let state = self.connection.state().await;
        let mut out = format!(
            "Connected: {}",
            if state.is_connected { "✅ Yes" } else { "❌ No" }
        );

        if let Some(address) = state.checksum_address() {
            out.push_str(&format!("\nAddress: {}", address));
            out.push_str(&format!(
                "\nChain ID: {}",
                state.chain_id.map(|c| c.to_string()).unwrap_or_default()
            ));
            out.push_str(&format!(
                "\nChain Name: {}",
                state.chain_name.unwrap_or_default()
            ));
        }
        out
    }
}
