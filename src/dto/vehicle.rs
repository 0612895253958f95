use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::customer::Customer;
use crate::domain::document::Document;
use crate::domain::user::User;
use crate::domain::vehicle::{ShippingStage, StageEvent, Vehicle};
use crate::dto::invoice::InvoiceSummary;
use crate::pagination::Paginated;

/// Query parameters accepted by the vehicle list service.
#[derive(Debug, Default)]
pub struct VehiclesQuery {
    pub stage: Option<ShippingStage>,
    pub customer_id: Option<i32>,
    pub search: Option<String>,
    pub page: Option<usize>,
}

/// A vehicle with its pipeline position rendered for display.
#[derive(Debug, Clone, Serialize)]
pub struct VehicleProgress {
    pub vehicle: Vehicle,
    pub stage_label: String,
    pub progress: u32,
}

impl From<Vehicle> for VehicleProgress {
    fn from(vehicle: Vehicle) -> Self {
        let stage = vehicle.stage;
        Self {
            vehicle,
            stage_label: stage.as_str().to_string(),
            progress: stage.progress_percent(),
        }
    }
}

/// One row of the stage history timeline.
#[derive(Debug, Clone, Serialize)]
pub struct StageEventView {
    pub from: Option<String>,
    pub to: String,
    pub changed_by: String,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

impl StageEventView {
    pub fn new(event: StageEvent, user: &User) -> Self {
        Self {
            from: event.from_stage.map(|stage| stage.as_str().to_string()),
            to: event.to_stage.as_str().to_string(),
            changed_by: user.name.clone(),
            note: event.note,
            created_at: event.created_at,
        }
    }
}

/// Data required to render the vehicle list template.
pub struct VehiclesPageData {
    pub vehicles: Paginated<VehicleProgress>,
    pub stage_filter: Option<String>,
    pub search_query: Option<String>,
    /// Every stage name, for the filter dropdown.
    pub stages: Vec<&'static str>,
}

/// Data required to render the vehicle detail template.
pub struct VehiclePageData {
    pub vehicle: VehicleProgress,
    pub customer: Option<Customer>,
    pub history: Vec<StageEventView>,
    pub documents: Vec<Document>,
    pub invoices: Vec<InvoiceSummary>,
    pub stages: Vec<&'static str>,
}
