use serde::Deserialize;
use validator::Validate;

use crate::forms::empty_string_as_none;

#[derive(Deserialize, Validate)]
/// Form data for logging a new sales inquiry.
pub struct AddInquiryForm {
    /// Name of the person or company asking.
    #[validate(length(min = 1))]
    pub customer_name: String,
    /// Email or phone to reach them at.
    pub contact: String,
    /// Free-text description of the requested vehicle.
    #[validate(length(min = 1))]
    pub vehicle_request: String,
    /// Stated budget in minor units of `currency`.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub budget: Option<i64>,
    /// Budget currency code.
    pub currency: String,
    /// Where the inquiry came from (auction sheet, referral, web form).
    pub source: String,
    /// Internal note.
    pub note: String,
}

#[derive(Deserialize, Validate)]
/// Form data for editing an inquiry and its assignment.
pub struct SaveInquiryForm {
    /// Inquiry identifier.
    pub id: i32,
    /// Updated requester name.
    #[validate(length(min = 1))]
    pub customer_name: String,
    /// Updated contact detail.
    pub contact: String,
    /// Updated vehicle request text.
    #[validate(length(min = 1))]
    pub vehicle_request: String,
    /// Updated budget.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub budget: Option<i64>,
    /// Updated budget currency code.
    pub currency: String,
    /// Sales rep the card is assigned to; empty unassigns.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub assigned_user_id: Option<i32>,
    /// Updated source.
    pub source: String,
    /// Updated internal note.
    pub note: String,
}
