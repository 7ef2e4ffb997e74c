pub mod attestation;
pub mod canonical;
pub mod envelope;
pub mod message;
