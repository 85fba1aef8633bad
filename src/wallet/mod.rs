pub mod connector;
pub mod signer;

pub use connector::{Account, ConnectorRegistry, LocalWalletConnector, StubConnector, WalletConnector};
pub use signer::{LocalTypedDataSigner, StubResponse, StubSigner, TypedDataSigner};
