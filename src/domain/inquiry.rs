use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{Currency, TypeConstraintError, sanitize_text};

/// Columns of the sales kanban, in pipeline order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum KanbanStage {
    New,
    Contacted,
    Negotiating,
    Invoiced,
    Won,
    Lost,
}

impl KanbanStage {
    pub const ALL: [KanbanStage; 6] = [
        KanbanStage::New,
        KanbanStage::Contacted,
        KanbanStage::Negotiating,
        KanbanStage::Invoiced,
        KanbanStage::Won,
        KanbanStage::Lost,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            KanbanStage::New => "new",
            KanbanStage::Contacted => "contacted",
            KanbanStage::Negotiating => "negotiating",
            KanbanStage::Invoiced => "invoiced",
            KanbanStage::Won => "won",
            KanbanStage::Lost => "lost",
        }
    }

    /// Won and lost inquiries drop out of the active pipeline.
    pub fn is_closed(self) -> bool {
        matches!(self, KanbanStage::Won | KanbanStage::Lost)
    }
}

impl Display for KanbanStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for KanbanStage {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(KanbanStage::New),
            "contacted" => Ok(KanbanStage::Contacted),
            "negotiating" => Ok(KanbanStage::Negotiating),
            "invoiced" => Ok(KanbanStage::Invoiced),
            "won" => Ok(KanbanStage::Won),
            "lost" => Ok(KanbanStage::Lost),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown kanban stage: {other}"
            ))),
        }
    }
}

/// A sales lead: someone asked for a vehicle and has not yet become an
/// invoiced customer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Inquiry {
    pub id: i32,
    pub branch_id: i32,
    pub customer_name: String,
    pub contact: Option<String>,
    /// What they are after, free text, e.g. "Supra RZ, manual, under 80k km".
    pub vehicle_request: String,
    pub budget: Option<i64>,
    pub currency: Currency,
    pub stage: KanbanStage,
    pub assigned_user_id: Option<i32>,
    pub source: Option<String>,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payload for inserting an inquiry. New inquiries always start in
/// [`KanbanStage::New`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewInquiry {
    pub branch_id: i32,
    pub customer_name: String,
    pub contact: Option<String>,
    pub vehicle_request: String,
    pub budget: Option<i64>,
    pub currency: Currency,
    pub assigned_user_id: Option<i32>,
    pub source: Option<String>,
    pub note: Option<String>,
}

impl NewInquiry {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        branch_id: i32,
        customer_name: &str,
        contact: Option<&str>,
        vehicle_request: &str,
        budget: Option<i64>,
        currency: Currency,
        assigned_user_id: Option<i32>,
        source: Option<&str>,
        note: Option<&str>,
    ) -> Result<Self, TypeConstraintError> {
        Ok(Self {
            branch_id,
            customer_name: sanitize_text(customer_name).ok_or(TypeConstraintError::EmptyString)?,
            contact: contact.and_then(sanitize_text),
            vehicle_request: sanitize_text(vehicle_request)
                .ok_or(TypeConstraintError::EmptyString)?,
            budget: validate_budget(budget)?,
            currency,
            assigned_user_id,
            source: source.and_then(sanitize_text),
            note: note.and_then(sanitize_text),
        })
    }
}

/// Payload for updating an inquiry's descriptive fields. Stage moves go
/// through the kanban endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateInquiry {
    pub customer_name: String,
    pub contact: Option<String>,
    pub vehicle_request: String,
    pub budget: Option<i64>,
    pub currency: Currency,
    pub source: Option<String>,
    pub note: Option<String>,
}

impl UpdateInquiry {
    pub fn new(
        customer_name: &str,
        contact: Option<&str>,
        vehicle_request: &str,
        budget: Option<i64>,
        currency: Currency,
        source: Option<&str>,
        note: Option<&str>,
    ) -> Result<Self, TypeConstraintError> {
        Ok(Self {
            customer_name: sanitize_text(customer_name).ok_or(TypeConstraintError::EmptyString)?,
            contact: contact.and_then(sanitize_text),
            vehicle_request: sanitize_text(vehicle_request)
                .ok_or(TypeConstraintError::EmptyString)?,
            budget: validate_budget(budget)?,
            currency,
            source: source.and_then(sanitize_text),
            note: note.and_then(sanitize_text),
        })
    }
}

fn validate_budget(budget: Option<i64>) -> Result<Option<i64>, TypeConstraintError> {
    match budget {
        Some(b) if b <= 0 => Err(TypeConstraintError::NonPositiveAmount),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kanban_stage_round_trips_through_str() {
        for stage in KanbanStage::ALL {
            assert_eq!(stage.as_str().parse::<KanbanStage>().unwrap(), stage);
        }
        assert!("pending".parse::<KanbanStage>().is_err());
    }

    #[test]
    fn closed_stages_are_won_and_lost() {
        assert!(KanbanStage::Won.is_closed());
        assert!(KanbanStage::Lost.is_closed());
        assert!(!KanbanStage::Negotiating.is_closed());
    }

    #[test]
    fn new_inquiry_rejects_non_positive_budget() {
        let err = NewInquiry::new(
            1,
            "Tanaka",
            None,
            "Skyline GT-R",
            Some(0),
            Currency::Jpy,
            None,
            None,
            None,
        );
        assert_eq!(err.unwrap_err(), TypeConstraintError::NonPositiveAmount);
    }

    #[test]
    fn new_inquiry_sanitizes_text() {
        let inquiry = NewInquiry::new(
            1,
            " <i>Tanaka</i> ",
            Some("tanaka@example.com"),
            "Skyline GT-R",
            Some(3_000_000),
            Currency::Jpy,
            Some(7),
            Some("auction site"),
            None,
        )
        .unwrap();
        assert_eq!(inquiry.customer_name, "Tanaka");
        assert_eq!(inquiry.assigned_user_id, Some(7));
    }
}
