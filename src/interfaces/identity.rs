use crate::error::Result;

pub trait Identity: Send + Sync {
    fn address(&self) -> &str;

    fn sign_digest(&self, digest: &[u8]) -> Result<String>;

    fn verify_digest(address: &str, digest: &[u8], signature: &str) -> bool
    where
        Self: Sized;
}
