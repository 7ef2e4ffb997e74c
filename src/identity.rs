use std::fmt;

use bech32::{Bech32, Hrp};
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use rand_core::OsRng;
use sha2::{Digest, Sha256};

use crate::error::{AgentverseError, Result};
use crate::interfaces::identity::Identity;

pub const ADDRESS_PREFIX: &str = "agent";
pub const SIGNATURE_PREFIX: &str = "sig";

#[derive(Clone)]
pub struct AgentIdentity {
    signing_key: SigningKey,
    address: String,
}

impl AgentIdentity {
    pub fn from_seed(seed: &str, index: u64) -> Result<Self> {
        let key = derive_key_from_seed(seed, ADDRESS_PREFIX, index);
        let signing_key = SigningKey::from_slice(&key)
            .map_err(|e| AgentverseError::Config(format!("invalid seed key: {e}")))?;
        Self::from_signing_key(signing_key)
    }

    pub fn generate() -> Result<Self> {
        Self::from_signing_key(SigningKey::random(&mut OsRng))
    }

    fn from_signing_key(signing_key: SigningKey) -> Result<Self> {
        let public_key = signing_key.verifying_key().to_encoded_point(true);
        let address = encode_bech32(ADDRESS_PREFIX, public_key.as_bytes())?;
        Ok(Self {
            signing_key,
            address,
        })
    }
}

impl fmt::Debug for AgentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentIdentity")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl Identity for AgentIdentity {
    fn address(&self) -> &str {
        &self.address
    }

    fn sign_digest(&self, digest: &[u8]) -> Result<String> {
        let signature: Signature = self
            .signing_key
            .sign_prehash(digest)
            .map_err(|e| AgentverseError::Signing(e.to_string()))?;
        let signature = signature.normalize_s().unwrap_or(signature);
        encode_bech32(SIGNATURE_PREFIX, &signature.to_bytes())
            .map_err(|e| AgentverseError::Signing(e.to_string()))
    }

    fn verify_digest(address: &str, digest: &[u8], signature: &str) -> bool {
        let Some(public_key) = decode_bech32(ADDRESS_PREFIX, address) else {
            return false;
        };
        let Some(signature) = decode_bech32(SIGNATURE_PREFIX, signature) else {
            return false;
        };
        let Ok(verifying_key) = VerifyingKey::from_sec1_bytes(&public_key) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(&signature) else {
            return false;
        };
        verifying_key.verify_prehash(digest, &signature).is_ok()
    }
}

fn length_prefixed(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + bytes.len());
    out.extend_from_slice(&(bytes.len() as u64).to_be_bytes());
    out.extend_from_slice(bytes);
    out
}

fn derive_key_from_seed(seed: &str, prefix: &str, index: u64) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(length_prefixed(prefix.as_bytes()));
    hasher.update(length_prefixed(seed.as_bytes()));
    hasher.update(length_prefixed(&index.to_be_bytes()));
    hasher.finalize().into()
}

fn encode_bech32(prefix: &str, data: &[u8]) -> Result<String> {
    let hrp = Hrp::parse(prefix).map_err(|e| AgentverseError::Config(e.to_string()))?;
    bech32::encode::<Bech32>(hrp, data).map_err(|e| AgentverseError::Serialization(e.to_string()))
}

fn decode_bech32(prefix: &str, value: &str) -> Option<Vec<u8>> {
    let (hrp, data) = bech32::decode(value).ok()?;
    if hrp.to_lowercase() != prefix {
        return None;
    }
    Some(data)
}
