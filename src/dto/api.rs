use serde::Serialize;

use crate::dto::vehicle::StageEventView;

/// One hit in the customer picker search.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerSearchItem {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
}

/// JSON body of `GET /api/v1/customers`.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerSearchResponse {
    pub items: Vec<CustomerSearchItem>,
    pub total: usize,
}

/// JSON body of `GET /api/v1/vehicles/{id}/stages`.
#[derive(Debug, Clone, Serialize)]
pub struct VehicleStagesResponse {
    pub vehicle_id: i32,
    pub stage: String,
    pub progress: u32,
    pub history: Vec<StageEventView>,
}
