use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{TypeConstraintError, sanitize_text};

/// Stages a vehicle passes through between purchase and delivery, in
/// pipeline order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ShippingStage {
    Purchase,
    Transport,
    Repair,
    Documents,
    Booking,
    Shipped,
    Completed,
}

impl ShippingStage {
    pub const ALL: [ShippingStage; 7] = [
        ShippingStage::Purchase,
        ShippingStage::Transport,
        ShippingStage::Repair,
        ShippingStage::Documents,
        ShippingStage::Booking,
        ShippingStage::Shipped,
        ShippingStage::Completed,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ShippingStage::Purchase => "purchase",
            ShippingStage::Transport => "transport",
            ShippingStage::Repair => "repair",
            ShippingStage::Documents => "documents",
            ShippingStage::Booking => "booking",
            ShippingStage::Shipped => "shipped",
            ShippingStage::Completed => "completed",
        }
    }

    /// Position in the pipeline, starting at zero.
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    /// Percentage of the pipeline covered so far. `Purchase` is 0,
    /// `Completed` is 100.
    pub fn progress_percent(self) -> u32 {
        (self.index() as u32 * 100) / (Self::ALL.len() as u32 - 1)
    }

    pub fn is_final(self) -> bool {
        self == ShippingStage::Completed
    }
}

impl Display for ShippingStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ShippingStage {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "purchase" => Ok(ShippingStage::Purchase),
            "transport" => Ok(ShippingStage::Transport),
            "repair" => Ok(ShippingStage::Repair),
            "documents" => Ok(ShippingStage::Documents),
            "booking" => Ok(ShippingStage::Booking),
            "shipped" => Ok(ShippingStage::Shipped),
            "completed" => Ok(ShippingStage::Completed),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown shipping stage: {other}"
            ))),
        }
    }
}

/// A vehicle being brokered. May start unassigned and gain an owner once a
/// customer commits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
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
    pub stage: ShippingStage,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payload for inserting a vehicle. New vehicles always start at
/// [`ShippingStage::Purchase`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewVehicle {
    pub branch_id: i32,
    pub customer_id: Option<i32>,
    pub vin: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: Option<String>,
    pub mileage_km: Option<i32>,
}

impl NewVehicle {
    pub fn new(
        branch_id: i32,
        customer_id: Option<i32>,
        vin: &str,
        make: &str,
        model: &str,
        year: i32,
        color: Option<&str>,
        mileage_km: Option<i32>,
    ) -> Result<Self, TypeConstraintError> {
        Ok(Self {
            branch_id,
            customer_id,
            vin: normalize_vin(vin)?,
            make: sanitize_text(make).ok_or(TypeConstraintError::EmptyString)?,
            model: sanitize_text(model).ok_or(TypeConstraintError::EmptyString)?,
            year: validate_year(year)?,
            color: color.and_then(sanitize_text),
            mileage_km: validate_mileage(mileage_km)?,
        })
    }
}

/// Payload for updating a vehicle's descriptive fields. Stage changes go
/// through stage transitions, not here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateVehicle {
    pub vin: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: Option<String>,
    pub mileage_km: Option<i32>,
}

impl UpdateVehicle {
    pub fn new(
        vin: &str,
        make: &str,
        model: &str,
        year: i32,
        color: Option<&str>,
        mileage_km: Option<i32>,
    ) -> Result<Self, TypeConstraintError> {
        Ok(Self {
            vin: normalize_vin(vin)?,
            make: sanitize_text(make).ok_or(TypeConstraintError::EmptyString)?,
            model: sanitize_text(model).ok_or(TypeConstraintError::EmptyString)?,
            year: validate_year(year)?,
            color: color.and_then(sanitize_text),
            mileage_km: validate_mileage(mileage_km)?,
        })
    }
}

/// One entry in a vehicle's stage history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageEvent {
    pub id: i32,
    pub vehicle_id: i32,
    pub from_stage: Option<ShippingStage>,
    pub to_stage: ShippingStage,
    pub changed_by: i32,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Chassis numbers and VINs: trimmed, upper-cased, alphanumeric with
/// hyphens allowed for JDM chassis codes.
fn normalize_vin(vin: &str) -> Result<String, TypeConstraintError> {
    let normalized = vin.trim().to_uppercase();
    if normalized.is_empty() {
        return Err(TypeConstraintError::EmptyString);
    }
    if normalized.len() > 17
        || !normalized.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(TypeConstraintError::InvalidValue(format!(
            "invalid vin: {normalized}"
        )));
    }
    Ok(normalized)
}

fn validate_year(year: i32) -> Result<i32, TypeConstraintError> {
    if (1950..=2100).contains(&year) {
        Ok(year)
    } else {
        Err(TypeConstraintError::InvalidValue(format!(
            "implausible model year: {year}"
        )))
    }
}

fn validate_mileage(mileage_km: Option<i32>) -> Result<Option<i32>, TypeConstraintError> {
    match mileage_km {
        Some(km) if km < 0 => Err(TypeConstraintError::InvalidValue(
            "mileage cannot be negative".to_string(),
        )),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_progress_from_zero_to_hundred() {
        assert_eq!(ShippingStage::Purchase.progress_percent(), 0);
        assert_eq!(ShippingStage::Transport.progress_percent(), 16);
        assert_eq!(ShippingStage::Documents.progress_percent(), 50);
        assert_eq!(ShippingStage::Shipped.progress_percent(), 83);
        assert_eq!(ShippingStage::Completed.progress_percent(), 100);
    }

    #[test]
    fn stage_round_trips_through_str() {
        for stage in ShippingStage::ALL {
            assert_eq!(stage.as_str().parse::<ShippingStage>().unwrap(), stage);
        }
        assert!("sold".parse::<ShippingStage>().is_err());
    }

    #[test]
    fn vin_is_uppercased() {
        let vehicle =
            NewVehicle::new(1, None, " jzx100-0012345 ", "Toyota", "Chaser", 1998, None, None)
                .unwrap();
        assert_eq!(vehicle.vin, "JZX100-0012345");
    }

    #[test]
    fn vin_rejects_garbage() {
        assert!(NewVehicle::new(1, None, "", "T", "C", 1998, None, None).is_err());
        assert!(NewVehicle::new(1, None, "A B C", "T", "C", 1998, None, None).is_err());
        assert!(
            NewVehicle::new(1, None, "X".repeat(18).as_str(), "T", "C", 1998, None, None).is_err()
        );
    }

    #[test]
    fn year_and_mileage_are_bounded() {
        assert!(NewVehicle::new(1, None, "VIN1", "T", "C", 1890, None, None).is_err());
        assert!(NewVehicle::new(1, None, "VIN1", "T", "C", 1998, None, Some(-5)).is_err());
    }
}
