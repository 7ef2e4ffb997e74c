pub mod almanac;
pub mod dispatcher;
mod http;
pub mod inbox;
pub mod mailbox;
pub mod registration;
