use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::TypeConstraintError;
use crate::domain::vehicle::{
    NewVehicle as DomainNewVehicle, StageEvent as DomainStageEvent,
    UpdateVehicle as DomainUpdateVehicle, Vehicle as DomainVehicle,
};

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = crate::schema::vehicles)]
pub struct Vehicle {
    pub id: i32,
    pub branch_id: i32,
    pub customer_id: Option<i32>,
    pub vin: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: Option<String>,
    pub mileage_km: Option<i32>,
    pub stage: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::vehicles)]
pub struct NewVehicle<'a> {
    pub branch_id: i32,
    pub customer_id: Option<i32>,
    pub vin: &'a str,
    pub make: &'a str,
    pub model: &'a str,
    pub year: i32,
    pub color: Option<&'a str>,
    pub mileage_km: Option<i32>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::vehicles)]
pub struct UpdateVehicle<'a> {
    pub vin: &'a str,
    pub make: &'a str,
    pub model: &'a str,
    pub year: i32,
    pub color: Option<&'a str>,
    pub mileage_km: Option<i32>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = crate::schema::stage_events)]
pub struct StageEvent {
    pub id: i32,
    pub vehicle_id: i32,
    pub from_stage: Option<String>,
    pub to_stage: String,
    pub changed_by: i32,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::stage_events)]
pub struct NewStageEvent<'a> {
    pub vehicle_id: i32,
    pub from_stage: Option<&'a str>,
    pub to_stage: &'a str,
    pub changed_by: i32,
    pub note: Option<&'a str>,
}

impl TryFrom<Vehicle> for DomainVehicle {
    type Error = TypeConstraintError;

    fn try_from(vehicle: Vehicle) -> Result<Self, Self::Error> {
        Ok(Self {
            id: vehicle.id,
            branch_id: vehicle.branch_id,
            customer_id: vehicle.customer_id,
            vin: vehicle.vin,
            make: vehicle.make,
            model: vehicle.model,
            year: vehicle.year,
            color: vehicle.color,
            mileage_km: vehicle.mileage_km,
            stage: vehicle.stage.parse()?,
            created_at: vehicle.created_at,
            updated_at: vehicle.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewVehicle> for NewVehicle<'a> {
    fn from(vehicle: &'a DomainNewVehicle) -> Self {
        Self {
            branch_id: vehicle.branch_id,
            customer_id: vehicle.customer_id,
            vin: &vehicle.vin,
            make: &vehicle.make,
            model: &vehicle.model,
            year: vehicle.year,
            color: vehicle.color.as_deref(),
            mileage_km: vehicle.mileage_km,
        }
    }
}

impl<'a> UpdateVehicle<'a> {
    pub fn new(update: &'a DomainUpdateVehicle, updated_at: NaiveDateTime) -> Self {
        Self {
            vin: &update.vin,
            make: &update.make,
            model: &update.model,
            year: update.year,
            color: update.color.as_deref(),
            mileage_km: update.mileage_km,
            updated_at,
        }
    }
}

impl TryFrom<StageEvent> for DomainStageEvent {
    type Error = TypeConstraintError;

    fn try_from(event: StageEvent) -> Result<Self, Self::Error> {
        Ok(Self {
            id: event.id,
            vehicle_id: event.vehicle_id,
            from_stage: event.from_stage.as_deref().map(str::parse).transpose()?,
            to_stage: event.to_stage.parse()?,
            changed_by: event.changed_by,
            note: event.note,
            created_at: event.created_at,
        })
    }
}
