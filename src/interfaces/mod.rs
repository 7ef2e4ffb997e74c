pub mod handler;
pub mod identity;
