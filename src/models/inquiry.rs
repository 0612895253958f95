use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::inquiry::{
    Inquiry as DomainInquiry, NewInquiry as DomainNewInquiry,
    UpdateInquiry as DomainUpdateInquiry,
};
use crate::domain::types::TypeConstraintError;

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = crate::schema::inquiries)]
pub struct Inquiry {
    pub id: i32,
    pub branch_id: i32,
    pub customer_name: String,
    pub contact: Option<String>,
    pub vehicle_request: String,
    pub budget: Option<i64>,
    pub currency: String,
    pub stage: String,
    pub assigned_user_id: Option<i32>,
    pub source: Option<String>,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::inquiries)]
pub struct NewInquiry<'a> {
    pub branch_id: i32,
    pub customer_name: &'a str,
    pub contact: Option<&'a str>,
    pub vehicle_request: &'a str,
    pub budget: Option<i64>,
    pub currency: &'a str,
    pub assigned_user_id: Option<i32>,
    pub source: Option<&'a str>,
    pub note: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::inquiries)]
pub struct UpdateInquiry<'a> {
    pub customer_name: &'a str,
    pub contact: Option<&'a str>,
    pub vehicle_request: &'a str,
    pub budget: Option<i64>,
    pub currency: &'a str,
    pub source: Option<&'a str>,
    pub note: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Inquiry> for DomainInquiry {
    type Error = TypeConstraintError;

    fn try_from(inquiry: Inquiry) -> Result<Self, Self::Error> {
        Ok(Self {
            id: inquiry.id,
            branch_id: inquiry.branch_id,
            customer_name: inquiry.customer_name,
            contact: inquiry.contact,
            vehicle_request: inquiry.vehicle_request,
            budget: inquiry.budget,
            currency: inquiry.currency.parse()?,
            stage: inquiry.stage.parse()?,
            assigned_user_id: inquiry.assigned_user_id,
            source: inquiry.source,
            note: inquiry.note,
            created_at: inquiry.created_at,
            updated_at: inquiry.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewInquiry> for NewInquiry<'a> {
    fn from(inquiry: &'a DomainNewInquiry) -> Self {
        Self {
            branch_id: inquiry.branch_id,
            customer_name: &inquiry.customer_name,
            contact: inquiry.contact.as_deref(),
            vehicle_request: &inquiry.vehicle_request,
            budget: inquiry.budget,
            currency: inquiry.currency.code(),
            assigned_user_id: inquiry.assigned_user_id,
            source: inquiry.source.as_deref(),
            note: inquiry.note.as_deref(),
        }
    }
}

impl<'a> UpdateInquiry<'a> {
    pub fn new(update: &'a DomainUpdateInquiry, updated_at: NaiveDateTime) -> Self {
        Self {
            customer_name: &update.customer_name,
            contact: update.contact.as_deref(),
            vehicle_request: &update.vehicle_request,
            budget: update.budget,
            currency: update.currency.code(),
            source: update.source.as_deref(),
            note: update.note.as_deref(),
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::inquiry::KanbanStage;
    use crate::domain::types::Currency;
    use chrono::NaiveDate;

    #[test]
    fn row_parses_stage_and_currency() {
        let timestamp = NaiveDate::from_ymd_opt(2026, 2, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let row = Inquiry {
            id: 1,
            branch_id: 1,
            customer_name: "Tanaka".to_string(),
            contact: None,
            vehicle_request: "Skyline GT-R".to_string(),
            budget: Some(3_000_000),
            currency: "JPY".to_string(),
            stage: "negotiating".to_string(),
            assigned_user_id: Some(2),
            source: None,
            note: None,
            created_at: timestamp,
            updated_at: timestamp,
        };
        let domain = DomainInquiry::try_from(row).unwrap();
        assert_eq!(domain.stage, KanbanStage::Negotiating);
        assert_eq!(domain.currency, Currency::Jpy);
    }
}
