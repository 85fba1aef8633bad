#![allow(dead_code)]

use ethers::types::Address;
use siwe_sign_repro::wallet::{Account, ConnectorRegistry, StubConnector, TypedDataSigner};
use siwe_sign_repro::{ConnectionManager, EventLog, Session, SiteContext};
use std::str::FromStr;
use std::sync::Arc;

pub const ADDRESS: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
pub const CHECKSUM_ADDRESS: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
pub const CONNECTOR_ID: &str = "xyz.ithaca.porto";

pub fn site() -> SiteContext {
    SiteContext {
        domain: "localhost:5173".to_string(),
        uri: "http://localhost:5173".to_string(),
        statement: "Sign in to test Porto signing".to_string(),
    }
}

/// Session whose only connector is a stub on Base Sepolia backed by `signer`.
pub fn session_with(signer: impl TypedDataSigner + 'static) -> Session {
    session_on_chain(signer, Some(84532))
}

/// Like [`session_with`], but the stub reports `chain_id` as its chain.
pub fn session_on_chain(signer: impl TypedDataSigner + 'static, chain_id: Option<u64>) -> Session {
    let account = Account {
        address: Address::from_str(ADDRESS).unwrap(),
        chain_id,
    };

    let mut registry = ConnectorRegistry::new();
    registry.register(Arc::new(StubConnector::new(CONNECTOR_ID, "Porto", account, signer)));

    let log = EventLog::new();
    let connection = ConnectionManager::new(
        registry,
        CONNECTOR_ID,
        |id| (id == 84532).then(|| "Base Sepolia".to_string()),
        log.clone(),
    );

    Session::new(site(), 84532, connection, log)
}
