use thiserror::Error;

/// Failures surfaced by the UI action handlers. None of them are fatal;
/// each terminates only the action that raised it.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Wallet connector {0} not found")]
    ConnectorUnavailable(String),

    #[error("No account connected")]
    NoAccount,

    #[error("Invalid address {0}")]
    InvalidAddress(String),
}

/// Error reported by a wallet connector while connecting or disconnecting.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Connection rejected: {0}")]
    Rejected(String),

    #[error("Invalid connector configuration: {0}")]
    Config(String),
}

/// Error raised by a signing capability.
#[derive(Debug, Error)]
pub enum SignerError {
    /// The user declined the request in the wallet UI.
    #[error("{0}")]
    Rejected(String),

    #[error("Failed to sign typed data: {0}")]
    Signing(String),
}
