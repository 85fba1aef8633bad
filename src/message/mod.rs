use ethers::types::transaction::eip712::{EIP712Domain, Eip712, Eip712DomainType, TypedData};
use ethers::types::{Address, U256};
use ethers::utils::to_checksum;
use rand::Rng;
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::config::SiteConfig;
use crate::error::HarnessError;
use crate::event_log::now_iso;

pub const DOMAIN_NAME: &str = "Sign in with Ethereum";
pub const PRIMARY_TYPE: &str = "Message";
pub const SIWE_VERSION: &str = "1";

/// Longest nonce `generate_nonce` produces.
pub const NONCE_MAX_LEN: usize = 13;

/// `Message` schema in hashing order. Reordering changes the type hash.
pub const MESSAGE_FIELDS: [(&str, &str); 8] = [
    ("domain", "string"),
    ("address", "address"),
    ("statement", "string"),
    ("uri", "string"),
    ("version", "string"),
    ("chainId", "uint256"),
    ("nonce", "string"),
    ("issuedAt", "string"),
];

/// The requesting site as it appears in the sign-in statement.
#[derive(Debug, Clone)]
pub struct SiteContext {
    pub domain: String,
    pub uri: String,
    pub statement: String,
}

impl From<&SiteConfig> for SiteContext {
    fn from(site: &SiteConfig) -> Self {
        Self {
            domain: site.domain.clone(),
            uri: site.uri.clone(),
            statement: site.statement.clone(),
        }
    }
}

/* =======================
SIGN-IN STATEMENT
======================= */

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInStatement {
    pub domain: String,
    /// EIP-55 checksum form.
    pub address: String,
    pub statement: String,
    pub uri: String,
    pub version: String,
    pub chain_id: U256,
    pub nonce: String,
    pub issued_at: String,
}

/// Build a sign-in statement for `address`.
///
/// The address is normalised to its checksum encoding regardless of the
/// casing it arrives in. `chain_id` falls back to `fallback_chain_id` when
/// the connection did not report one.
pub fn build(
    site: &SiteContext,
    address: Option<&str>,
    chain_id: Option<u64>,
    fallback_chain_id: u64,
) -> Result<SignInStatement, HarnessError> {
    let raw = address
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or(HarnessError::NoAccount)?;

    let parsed = Address::from_str(raw).map_err(|_| HarnessError::InvalidAddress(raw.to_string()))?;

    Ok(SignInStatement {
        domain: site.domain.clone(),
        address: to_checksum(&parsed, None),
        statement: site.statement.clone(),
        uri: site.uri.clone(),
        version: SIWE_VERSION.to_string(),
        chain_id: U256::from(chain_id.unwrap_or(fallback_chain_id)),
        nonce: generate_nonce(),
        issued_at: now_iso(),
    })
}

/// Random base-36 nonce: the fractional digits of a random float, at most
/// [`NONCE_MAX_LEN`] of them, without trailing zeros. Not suitable as an
/// authentication nonce outside this harness.
pub fn generate_nonce() -> String {
    let mut rng = rand::rng();
    let mut fraction: f64 = rng.random();
    let mut digits = String::with_capacity(NONCE_MAX_LEN);

    while digits.len() < NONCE_MAX_LEN && fraction > 0.0 {
        fraction *= 36.0;
        let digit = fraction.floor();
        fraction -= digit;
        digits.push(std::char::from_digit(digit as u32, 36).unwrap_or('0'));
    }

    let trimmed = digits.trim_end_matches('0');
    if trimmed.is_empty() {
        // A zero fraction renders no digits
        return "0".to_string();
    }
    trimmed.to_string()
}

impl SignInStatement {
    pub fn to_typed_data(&self) -> TypedDataRequest {
        let verifying_contract = Address::from_str(&self.address).ok();

        let domain = EIP712Domain {
            name: Some(DOMAIN_NAME.to_string()),
            version: Some(self.version.clone()),
            chain_id: Some(self.chain_id),
            verifying_contract,
            salt: None,
        };

        let mut types = BTreeMap::new();
        types.insert(PRIMARY_TYPE.to_string(), message_schema());

        // JSON has no big integers, so chainId travels as a decimal string
        let mut message = BTreeMap::new();
        message.insert("domain".to_string(), Value::String(self.domain.clone()));
        message.insert("address".to_string(), Value::String(self.address.clone()));
        message.insert("statement".to_string(), Value::String(self.statement.clone()));
        message.insert("uri".to_string(), Value::String(self.uri.clone()));
        message.insert("version".to_string(), Value::String(self.version.clone()));
        message.insert("chainId".to_string(), Value::String(self.chain_id.to_string()));
        message.insert("nonce".to_string(), Value::String(self.nonce.clone()));
        message.insert("issuedAt".to_string(), Value::String(self.issued_at.clone()));

        TypedDataRequest {
            address: self.address.clone(),
            inner: TypedData {
                domain,
                types,
                primary_type: PRIMARY_TYPE.to_string(),
                message,
            },
        }
    }

    /// EIP-4361 text form of the statement.
    pub fn to_siwe_text(&self) -> String {
        format!(
            "{domain} wants you to sign in with your Ethereum account:\n{address}\n\n{statement}\n\nURI: {uri}\nVersion: {version}\nChain ID: {chain_id}\nNonce: {nonce}\nIssued At: {issued_at}",
            domain = self.domain,
            address = self.address,
            statement = self.statement,
            uri = self.uri,
            version = self.version,
            chain_id = self.chain_id,
            nonce = self.nonce,
            issued_at = self.issued_at,
        )
    }
}

pub fn message_schema() -> Vec<Eip712DomainType> {
    MESSAGE_FIELDS
        .iter()
        .map(|(name, ty)| Eip712DomainType {
            name: name.to_string(),
            r#type: ty.to_string(),
        })
        .collect()
}

/* =======================
TYPED-DATA REQUEST
======================= */

/// Typed-data payload handed to a signer exactly once.
#[derive(Debug, Clone)]
pub struct TypedDataRequest {
    address: String,
    inner: TypedData,
}

impl TypedDataRequest {
    /// Checksum address embedded in the message.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn as_typed_data(&self) -> &TypedData {
        &self.inner
    }

    pub fn digest(&self) -> anyhow::Result<[u8; 32]> {
        Ok(self.inner.encode_eip712()?)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.inner)
    }
}
