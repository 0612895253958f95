use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{TypeConstraintError, normalize_email, normalize_phone_to_e164, sanitize_text};

/// A buyer the brokerage works with. Customers belong to one branch and may
/// own vehicles, invoices and a deposit wallet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub id: i32,
    pub branch_id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    /// Code the customer pairs with their email to enter the portal.
    pub portal_code: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payload for inserting a customer.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomer {
    pub branch_id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub portal_code: String,
}

impl NewCustomer {
    pub fn new(
        branch_id: i32,
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
        address: Option<&str>,
        country: Option<&str>,
        portal_code: String,
    ) -> Result<Self, TypeConstraintError> {
        let name = sanitize_text(name).ok_or(TypeConstraintError::EmptyString)?;
        let email = match email {
            Some(e) if !e.trim().is_empty() => Some(normalize_email(e)?),
            _ => None,
        };
        let phone = match phone {
            Some(p) if !p.trim().is_empty() => Some(normalize_phone_to_e164(p)?),
            _ => None,
        };
        Ok(Self {
            branch_id,
            name,
            email,
            phone,
            address: address.and_then(sanitize_text),
            country: country.and_then(sanitize_text),
            portal_code,
        })
    }
}

/// Payload for updating a customer in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateCustomer {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
}

impl UpdateCustomer {
    pub fn new(
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
        address: Option<&str>,
        country: Option<&str>,
    ) -> Result<Self, TypeConstraintError> {
        let name = sanitize_text(name).ok_or(TypeConstraintError::EmptyString)?;
        let email = match email {
            Some(e) if !e.trim().is_empty() => Some(normalize_email(e)?),
            _ => None,
        };
        let phone = match phone {
            Some(p) if !p.trim().is_empty() => Some(normalize_phone_to_e164(p)?),
            _ => None,
        };
        Ok(Self {
            name,
            email,
            phone,
            address: address.and_then(sanitize_text),
            country: country.and_then(sanitize_text),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_customer_normalizes_contact_fields() {
        let customer = NewCustomer::new(
            1,
            "  Sato Trading <b>Ltd</b> ",
            Some(" Info@Sato.JP "),
            Some("+81 3 1234 5678"),
            Some("Tokyo"),
            Some("JP"),
            "ABCD1234EFGH5678".to_string(),
        )
        .unwrap();
        assert_eq!(customer.name, "Sato Trading Ltd");
        assert_eq!(customer.email.as_deref(), Some("info@sato.jp"));
        assert_eq!(customer.phone.as_deref(), Some("+81312345678"));
    }

    #[test]
    fn new_customer_rejects_blank_name() {
        let err = NewCustomer::new(1, "  ", None, None, None, None, "x".to_string());
        assert_eq!(err.unwrap_err(), TypeConstraintError::EmptyString);
    }

    #[test]
    fn empty_optional_fields_become_none() {
        let customer =
            NewCustomer::new(1, "A", Some(" "), Some(""), Some("  "), None, "c".to_string())
                .unwrap();
        assert_eq!(customer.email, None);
        assert_eq!(customer.phone, None);
        assert_eq!(customer.address, None);
    }
}
