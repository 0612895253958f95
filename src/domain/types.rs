//! Value-level rules shared by the domain entities.
//!
//! Normalization and validation live here so that once a value reaches the
//! domain layer it can be treated as trusted: emails are lower-cased and
//! checked, phone numbers are E.164, free text is sanitized, and money is
//! integer minor units tagged with a [`Currency`].

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use phonenumber::{Mode, parse};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{ValidateEmail, ValidateUrl};

/// Errors produced when attempting to construct a constrained value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// Provided email failed format validation.
    #[error("invalid email address")]
    InvalidEmail,
    /// Provided string contained no non-whitespace characters.
    #[error("value cannot be empty")]
    EmptyString,
    /// Phone number did not meet expected format.
    #[error("invalid phone number")]
    InvalidPhone,
    /// Provided url failed format validation.
    #[error("invalid url address")]
    InvalidUrl,
    /// Provided value failed custom validation.
    #[error("invalid value: {0}")]
    InvalidValue(String),
    /// Provided amount is zero or negative where a positive one is required.
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
}

/// Normalizes and validates an email string.
pub fn normalize_email<S: Into<String>>(email: S) -> Result<String, TypeConstraintError> {
    let normalized = email.into().trim().to_lowercase();
    if normalized.validate_email() {
        Ok(normalized)
    } else {
        Err(TypeConstraintError::InvalidEmail)
    }
}

/// Normalizes a phone number string to E.164 format.
pub fn normalize_phone_to_e164(value: &str) -> Result<String, TypeConstraintError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TypeConstraintError::EmptyString);
    }
    let parsed = parse(None, trimmed).map_err(|_| TypeConstraintError::InvalidPhone)?;
    Ok(parsed.format().mode(Mode::E164).to_string())
}

/// Strips markup from free text and trims it. Returns `None` when nothing
/// printable remains.
pub fn sanitize_text<S: Into<String>>(value: S) -> Option<String> {
    let cleaned = ammonia::clean(&value.into());
    let trimmed = cleaned.trim().to_string();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

/// Validates a trimmed, non-empty URL.
pub fn validate_url(value: &str) -> Result<String, TypeConstraintError> {
    let trimmed = value.trim().to_string();
    if trimmed.is_empty() {
        return Err(TypeConstraintError::EmptyString);
    }
    if trimmed.validate_url() {
        Ok(trimmed)
    } else {
        Err(TypeConstraintError::InvalidUrl)
    }
}

/// Currencies the brokerage invoices in. Amounts are stored as integer minor
/// units: whole yen for JPY, cents for USD.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Jpy,
    Usd,
}

impl Currency {
    /// ISO 4217 code.
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Jpy => "JPY",
            Currency::Usd => "USD",
        }
    }

    /// Number of minor-unit digits behind the decimal point.
    pub const fn minor_unit_scale(self) -> u32 {
        match self {
            Currency::Jpy => 0,
            Currency::Usd => 2,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Currency::Jpy => "¥",
            Currency::Usd => "$",
        }
    }

    /// Renders an amount of minor units for display, e.g. `¥1,234,567` or
    /// `$1,234.56`. Negative amounts carry a leading minus.
    pub fn format_minor(self, amount: i64) -> String {
        let negative = amount < 0;
        let abs = amount.unsigned_abs();
        let scale = self.minor_unit_scale();
        let divisor = 10u64.pow(scale);
        let major = abs / divisor;
        let sign = if negative { "-" } else { "" };
        if scale == 0 {
            format!("{}{}{}", sign, self.symbol(), group_thousands(major))
        } else {
            let minor = abs % divisor;
            format!(
                "{}{}{}.{:0width$}",
                sign,
                self.symbol(),
                group_thousands(major),
                minor,
                width = scale as usize
            )
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "JPY" => Ok(Currency::Jpy),
            "USD" => Ok(Currency::Usd),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown currency: {other}"
            ))),
        }
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
