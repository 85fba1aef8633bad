use ethers::types::{Address, Signature, H256};
use log::{debug, warn};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::SignerError;
use crate::event_log::EventLog;
use crate::message::TypedDataRequest;
use crate::wallet::signer::TypedDataSigner;

pub const SUCCESS_PREFIX: &str = "✅ Signature received:";
pub const ANOMALY_TEXT: &str = "❌ BUG: Signature is empty despite successful completion!";

/// How one signing attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignOutcome {
    Signed(String),
    /// Resolved without error but carried no usable signature. Holds the
    /// raw value when there was one (e.g. the text `undefined`).
    Empty(Option<String>),
    Rejected(String),
    /// Another attempt was still waiting on the signer.
    Busy,
}

impl SignOutcome {
    pub fn is_anomaly(&self) -> bool {
        matches!(self, SignOutcome::Empty(_))
    }
}

pub fn classify(result: Result<Option<String>, SignerError>) -> SignOutcome {
    match result {
        Err(e) => SignOutcome::Rejected(e.to_string()),
        Ok(None) => SignOutcome::Empty(None),
        Ok(Some(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed == "undefined" {
                SignOutcome::Empty(Some(raw))
            } else {
                SignOutcome::Signed(raw)
            }
        }
    }
}

fn signature_kind(raw: Option<&str>) -> &'static str {
    match raw {
        None => "undefined",
        Some(s) if s.trim() == "undefined" => "undefined",
        Some(s) if s.is_empty() => "empty string",
        Some(s) => {
            let hex = s.strip_prefix("0x").unwrap_or(s);
            if s.starts_with("0x") && hex.chars().all(|c| c.is_ascii_hexdigit()) {
                "hex string"
            } else {
                "string"
            }
        }
    }
}

/// Calls the signing capability and records the classified outcome.
#[derive(Clone)]
pub struct SigningInvoker {
    log: EventLog,
    in_flight: Arc<AtomicBool>,
}

struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SigningInvoker {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_signing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Waits on the signer with no timeout; the signer may be blocked on
    /// the user for as long as they like. Errors are logged, never returned.
    pub async fn sign(&self, signer: &dyn TypedDataSigner, request: TypedDataRequest) -> SignOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            self.log.append("⚠️ Signing already in progress").await;
            return SignOutcome::Busy;
        }
        let _guard = InFlightGuard(self.in_flight.clone());

        self.log.append("🔐 Calling sign_typed_data...").await;
        self.log.append("⏳ Please complete signing in the wallet UI...").await;

        let outcome = classify(signer.sign_typed_data(request.as_typed_data()).await);

        match &outcome {
            SignOutcome::Signed(signature) => {
                self.log.append(format!("{} {}", SUCCESS_PREFIX, signature)).await;
                self.log_shape(Some(signature)).await;
                self.check_recovery(signature, &request).await;
            }
            SignOutcome::Empty(raw) => {
                self.log_shape(raw.as_deref()).await;
                self.log.append(ANOMALY_TEXT).await;
            }
            SignOutcome::Rejected(message) => {
                warn!("sign_typed_data failed for {}", request.address());
                self.log.append(format!("❌ Error: {}", message)).await;
            }
            SignOutcome::Busy => {}
        }

        outcome
    }

    async fn log_shape(&self, raw: Option<&str>) {
        self.log
            .append(format!("📏 Signature length: {}", raw.map(str::len).unwrap_or(0)))
            .await;
        self.log
            .append(format!("🔍 Signature type: {}", signature_kind(raw)))
            .await;
    }

    /// Signatures that are not plain 65-byte ECDSA (smart accounts, ERC-1271)
    /// cannot be recovered locally; that is noted, not treated as failure.
    async fn check_recovery(&self, signature: &str, request: &TypedDataRequest) {
        let Ok(parsed) = Signature::from_str(signature) else {
            self.log
                .append("ℹ️ Signature is not a 65-byte ECDSA signature, skipping recovery")
                .await;
            return;
        };

        let digest = match request.digest() {
            Ok(d) => H256::from(d),
            Err(e) => {
                debug!("typed data digest failed: {}", e);
                return;
            }
        };

        let expected = Address::from_str(request.address()).ok();
        match parsed.recover(digest) {
            Ok(recovered) if Some(recovered) == expected => {
                self.log.append(format!("🔑 Recovered signer matches {}", request.address())).await;
            }
            Ok(recovered) => {
                self.log
                    .append(format!(
                        "⚠️ Recovered signer {} differs from {}",
                        ethers::utils::to_checksum(&recovered, None),
                        request.address()
                    ))
                    .await;
            }
            Err(e) => {
                self.log.append(format!("⚠️ Signature recovery failed: {}", e)).await;
            }
        }
    }
}
