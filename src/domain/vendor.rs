use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::invoice::CostCategory;
use crate::domain::types::{TypeConstraintError, normalize_email, normalize_phone_to_e164, sanitize_text};

/// A supplier the branch pays: auction houses, carriers, repair shops,
/// freight forwarders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vendor {
    pub id: i32,
    pub branch_id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub category: CostCategory,
    pub created_at: NaiveDateTime,
}

/// Payload for inserting a vendor.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVendor {
    pub branch_id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub category: CostCategory,
}

impl NewVendor {
    pub fn new(
        branch_id: i32,
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
        category: CostCategory,
    ) -> Result<Self, TypeConstraintError> {
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
            name: sanitize_text(name).ok_or(TypeConstraintError::EmptyString)?,
            email,
            phone,
            category,
        })
    }
}
