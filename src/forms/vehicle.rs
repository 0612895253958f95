use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use serde::Deserialize;
use validator::Validate;

use crate::forms::empty_string_as_none;

#[derive(Deserialize, Validate)]
/// Form data for registering a vehicle.
pub struct AddVehicleForm {
    /// Chassis or VIN code, uppercased on save.
    #[validate(length(min = 1))]
    pub vin: String,
    /// Manufacturer.
    #[validate(length(min = 1))]
    pub make: String,
    /// Model name.
    #[validate(length(min = 1))]
    pub model: String,
    /// Model year.
    pub year: i32,
    /// Exterior color.
    pub color: String,
    /// Odometer reading in kilometres.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub mileage_km: Option<i32>,
    /// Customer the vehicle is imported for, when already known.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub customer_id: Option<i32>,
}

#[derive(Deserialize, Validate)]
/// Form data for updating a vehicle's base fields.
pub struct SaveVehicleForm {
    /// Vehicle identifier.
    pub id: i32,
    /// Updated chassis or VIN code.
    #[validate(length(min = 1))]
    pub vin: String,
    /// Updated manufacturer.
    #[validate(length(min = 1))]
    pub make: String,
    /// Updated model name.
    #[validate(length(min = 1))]
    pub model: String,
    /// Updated model year.
    pub year: i32,
    /// Updated exterior color.
    pub color: String,
    /// Updated odometer reading.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub mileage_km: Option<i32>,
}

#[derive(Deserialize)]
/// Form data for linking a vehicle to a customer.
pub struct AssignVehicleForm {
    /// Target customer; empty clears the link.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub customer_id: Option<i32>,
}

#[derive(Deserialize, Validate)]
/// Form data for moving a vehicle to another shipping stage.
pub struct StageForm {
    /// Target stage name.
    #[validate(length(min = 1))]
    pub stage: String,
    /// Optional note shown in the history timeline.
    pub note: String,
}

#[derive(Deserialize, Validate)]
/// Form data for attaching a document link to a vehicle.
pub struct AddVehicleDocumentForm {
    /// Identifier of the vehicle that receives the document.
    pub id: i32,
    /// Document display name.
    #[validate(length(min = 1))]
    pub name: String,
    /// URL pointing to the stored document.
    #[validate(url)]
    pub url: String,
}

#[derive(MultipartForm)]
/// CSV upload with one vehicle per row.
pub struct UploadVehiclesForm {
    #[multipart(limit = "10MB")]
    pub csv: TempFile,
}

#[derive(Debug, Deserialize)]
/// One row of the vehicle import file. Headers: `vin`, `make`, `model`,
/// `year`, `color`, `mileage_km`; the last two may be empty.
pub struct VehicleCsvRow {
    pub vin: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: Option<String>,
    pub mileage_km: Option<i32>,
}

impl UploadVehiclesForm {
    /// Reads the uploaded file into typed rows. Row-level validation
    /// happens later against the domain constructors.
    pub fn parse_rows(&self) -> Result<Vec<VehicleCsvRow>, Box<dyn std::error::Error>> {
        let mut reader = csv::Reader::from_path(self.csv.file.path())?;

        let mut rows = Vec::new();
        for record in reader.deserialize() {
            rows.push(record?);
        }

        Ok(rows)
    }
}
