//! Diesel row types and their conversions to and from the domain entities.

#[cfg(feature = "server")]
pub mod config;
pub mod customer;
pub mod document;
pub mod inquiry;
pub mod invoice;
pub mod settings;
pub mod transaction;
pub mod user;
pub mod vehicle;
pub mod vendor;
