use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::document::{Document as DomainDocument, NewDocument as DomainNewDocument};

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = crate::schema::documents)]
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

#[derive(Insertable)]
#[diesel(table_name = crate::schema::documents)]
pub struct NewDocument<'a> {
    pub branch_id: i32,
    pub customer_id: Option<i32>,
    pub vehicle_id: Option<i32>,
    pub name: &'a str,
    pub url: &'a str,
    pub uploaded_by: i32,
}

impl From<Document> for DomainDocument {
    fn from(document: Document) -> Self {
        Self {
            id: document.id,
            branch_id: document.branch_id,
            customer_id: document.customer_id,
            vehicle_id: document.vehicle_id,
            name: document.name,
            url: document.url,
            uploaded_by: document.uploaded_by,
            created_at: document.created_at,
        }
    }
}

impl<'a> From<&'a DomainNewDocument> for NewDocument<'a> {
    fn from(document: &'a DomainNewDocument) -> Self {
        Self {
            branch_id: document.branch_id,
            customer_id: document.customer_id,
            vehicle_id: document.vehicle_id,
            name: &document.name,
            url: &document.url,
            uploaded_by: document.uploaded_by,
        }
    }
}
