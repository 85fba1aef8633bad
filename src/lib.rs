//! Harness for reproducing EIP-712 sign-in requests whose signer resolves
//! without returning a signature.
//!
//! Flow: [`session::Session`] connects through a [`wallet::WalletConnector`],
//! builds a [`message::SignInStatement`], turns it into a
//! [`message::TypedDataRequest`] and hands it to the
//! [`invoker::SigningInvoker`], which records every step in the
//! [`event_log::EventLog`].

pub mod config;
pub mod connection;
pub mod error;
pub mod event_log;
pub mod invoker;
pub mod message;
pub mod session;
pub mod wallet;

pub use config::{Config, DEFAULT_CHAIN_ID};
pub use connection::{ConnectionManager, ConnectionState};
pub use error::{ConnectorError, HarnessError, SignerError};
pub use event_log::{EventLog, LogEntry};
pub use invoker::{SignOutcome, SigningInvoker};
pub use message::{SignInStatement, SiteContext, TypedDataRequest};
pub use session::{Action, Session};
