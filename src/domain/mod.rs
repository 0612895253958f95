//! Framework-free domain entities and the rules for constructing them.

pub mod auth;
pub mod customer;
pub mod document;
pub mod inquiry;
pub mod invoice;
pub mod settings;
pub mod transaction;
pub mod types;
pub mod user;
pub mod vehicle;
pub mod vendor;
