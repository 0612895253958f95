use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{TypeConstraintError, sanitize_text, validate_url};

/// What a document is attached to. Every document hangs off exactly one
/// record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentOwner {
    Customer(i32),
    Vehicle(i32),
}

/// A named link to an externally stored file: export certificates, bills of
/// lading, inspection sheets, deregistration papers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: i32,
    pub branch_id: i32,
    pub customer_id: Option<i32>,
    pub vehicle_id: Option<i32>,
    pub name: String,
    pub url: String,
    pub uploaded_by: i32,
    pub created_at: NaiveDateTime,
}

/// Payload for attaching a document.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub branch_id: i32,
    pub customer_id: Option<i32>,
    pub vehicle_id: Option<i32>,
    pub name: String,
    pub url: String,
    pub uploaded_by: i32,
}

impl NewDocument {
    pub fn new(
        branch_id: i32,
        owner: DocumentOwner,
        name: &str,
        url: &str,
        uploaded_by: i32,
    ) -> Result<Self, TypeConstraintError> {
        let (customer_id, vehicle_id) = match owner {
            DocumentOwner::Customer(id) => (Some(id), None),
            DocumentOwner::Vehicle(id) => (None, Some(id)),
        };
        Ok(Self {
            branch_id,
            customer_id,
            vehicle_id,
            name: sanitize_text(name).ok_or(TypeConstraintError::EmptyString)?,
            url: validate_url(url)?,
            uploaded_by,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_maps_to_one_column() {
        let doc = NewDocument::new(
            1,
            DocumentOwner::Vehicle(9),
            "Export certificate",
            "https://files.example.com/cert.pdf",
            2,
        )
        .unwrap();
        assert_eq!(doc.customer_id, None);
        assert_eq!(doc.vehicle_id, Some(9));
    }

    #[test]
    fn url_must_validate() {
        let err = NewDocument::new(1, DocumentOwner::Customer(1), "BL", "not a url", 2);
        assert_eq!(err.unwrap_err(), TypeConstraintError::InvalidUrl);
    }
}
