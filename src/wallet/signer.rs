use async_trait::async_trait;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip712::TypedData;
use ethers::types::Address;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::SignerError;

/// Asynchronous typed-data signing capability.
///
/// `Ok(None)` means the capability resolved without producing a value,
/// which is distinct from both a signature and an error.
#[async_trait]
pub trait TypedDataSigner: Send + Sync {
    async fn sign_typed_data(&self, request: &TypedData) -> Result<Option<String>, SignerError>;
}

/* =======================
LOCAL WALLET
======================= */

#[derive(Debug, Clone)]
pub struct LocalTypedDataSigner {
    wallet: LocalWallet,
}

impl LocalTypedDataSigner {
    pub fn new(wallet: LocalWallet) -> Self {
        Self { wallet }
    }

    pub fn from_private_key(private_key: &str, chain_id: u64) -> Result<Self, SignerError> {
        let key = private_key.trim();
        let key = key.strip_prefix("0x").unwrap_or(key);
        let wallet = key
            .parse::<LocalWallet>()
            .map_err(|e| SignerError::Signing(format!("invalid private key: {}", e)))?;
        Ok(Self::new(wallet.with_chain_id(chain_id)))
    }

    pub fn random(chain_id: u64) -> Self {
        let mut rng = rand::rng();
        loop {
            // Out-of-range scalars are astronomically rare; draw again
            let bytes: [u8; 32] = rng.random();
            if let Ok(wallet) = LocalWallet::from_bytes(&bytes) {
                return Self::new(wallet.with_chain_id(chain_id));
            }
        }
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }
}

#[async_trait]
impl TypedDataSigner for LocalTypedDataSigner {
    async fn sign_typed_data(&self, request: &TypedData) -> Result<Option<String>, SignerError> {
        let signature = self
            .wallet
            .sign_typed_data(request)
            .await
            .map_err(|e| SignerError::Signing(e.to_string()))?;

        Ok(Some(format!("0x{}", hex::encode(signature.to_vec()))))
    }
}

/* =======================
SCRIPTED STUB
======================= */

/// What a [`StubSigner`] resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StubResponse {
    Signature(String),
    /// Resolves with no value at all.
    Empty,
    /// Resolves with the literal text `undefined`.
    Undefined,
    Reject(String),
}

/// Signer that replays a fixed response, optionally after a delay that
/// stands in for the user working through an external wallet UI.
#[derive(Debug, Clone)]
pub struct StubSigner {
    response: StubResponse,
    delay: Duration,
}

impl StubSigner {
    pub fn new(response: StubResponse) -> Self {
        Self {
            response,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn signature(signature: &str) -> Self {
        Self::new(StubResponse::Signature(signature.to_string()))
    }

    pub fn empty() -> Self {
        Self::new(StubResponse::Empty)
    }

    pub fn rejecting(message: &str) -> Self {
        Self::new(StubResponse::Reject(message.to_string()))
    }
}

#[async_trait]
impl TypedDataSigner for StubSigner {
    async fn sign_typed_data(&self, _request: &TypedData) -> Result<Option<String>, SignerError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.response {
            StubResponse::Signature(sig) => Ok(Some(sig.clone())),
            StubResponse::Empty => Ok(None),
            StubResponse::Undefined => Ok(Some("undefined".to_string())),
            StubResponse::Reject(message) => Err(SignerError::Rejected(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{build, SiteContext};
    use ethers::types::transaction::eip712::Eip712;
    use ethers::types::{Signature, H256};
    use std::str::FromStr;

    const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn site() -> SiteContext {
        SiteContext {
            domain: "localhost:5173".to_string(),
            uri: "http://localhost:5173".to_string(),
            statement: "Sign in to test Porto signing".to_string(),
        }
    }

    #[test]
    fn private_key_with_and_without_prefix() {
        let a = LocalTypedDataSigner::from_private_key(ANVIL_KEY, 84532).unwrap();
        let b = LocalTypedDataSigner::from_private_key(&ANVIL_KEY[2..], 84532).unwrap();

        assert_eq!(a.address(), b.address());
        assert_eq!(
            ethers::utils::to_checksum(&a.address(), None),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
    }

    #[test]
    fn random_keys_differ() {
        let a = LocalTypedDataSigner::random(84532);
        let b = LocalTypedDataSigner::random(84532);
        assert_ne!(a.address(), b.address());
        assert_ne!(a.address(), Address::zero());
    }

    #[test]
    fn invalid_private_key_is_rejected() {
        assert!(LocalTypedDataSigner::from_private_key("0x1234", 1).is_err());
    }

    #[tokio::test]
    async fn local_signature_recovers_to_signer() {
        let signer = LocalTypedDataSigner::from_private_key(ANVIL_KEY, 84532).unwrap();
        let address = format!("{:?}", signer.address());
        let request = build(&site(), Some(&address), Some(84532), 84532)
            .unwrap()
            .to_typed_data();

        let raw = signer
            .sign_typed_data(request.as_typed_data())
            .await
            .unwrap()
            .unwrap();
        assert!(raw.starts_with("0x"));
        assert_eq!(raw.len(), 132);

        let digest = request.as_typed_data().encode_eip712().unwrap();
        let signature = Signature::from_str(&raw).unwrap();
        let recovered = signature.recover(H256::from(digest)).unwrap();
        assert_eq!(recovered, signer.address());
    }

    #[tokio::test]
    async fn stub_responses() {
        let request = build(
            &site(),
            Some("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"),
            None,
            84532,
        )
        .unwrap()
        .to_typed_data();
        let typed = request.as_typed_data();

        let signed = StubSigner::signature("0xabcdef").sign_typed_data(typed).await;
        assert_eq!(signed.unwrap().as_deref(), Some("0xabcdef"));

        assert_eq!(StubSigner::empty().sign_typed_data(typed).await.unwrap(), None);

        let undefined = StubSigner::new(StubResponse::Undefined)
            .sign_typed_data(typed)
            .await
            .unwrap();
        assert_eq!(undefined.as_deref(), Some("undefined"));

        let err = StubSigner::rejecting("User rejected")
            .sign_typed_data(typed)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "User rejected");
    }

    #[test]
    fn stub_response_json_shape() {
        let json = serde_json::to_value(StubResponse::Reject("nope".into())).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "reject", "value": "nope" }));

        let empty: StubResponse = serde_json::from_str(r#"{ "kind": "undefined" }"#).unwrap();
        assert_eq!(empty, StubResponse::Undefined);
    }
}
