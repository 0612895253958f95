use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

pub mod auth;
pub mod customer;
pub mod invoice;
pub mod kanban;
pub mod settings;
pub mod team;
pub mod vehicle;
pub mod vendors;

/// Browsers submit empty strings for blank optional inputs; typed fields
/// need those mapped to `None` before parsing.
pub(crate) fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}
