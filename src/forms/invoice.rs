use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::domain::invoice::NewCharge;
use crate::domain::types::TypeConstraintError;
use crate::forms::empty_string_as_none;

#[derive(Deserialize, Validate)]
/// Form data for opening a draft invoice.
pub struct AddInvoiceForm {
    /// Customer being billed.
    pub customer_id: i32,
    /// Vehicle the invoice covers, when there is one.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub vehicle_id: Option<i32>,
    /// Billing currency code; empty falls back to the branch default.
    #[serde(default)]
    pub currency: String,
    /// Consumption tax rate in basis points; empty falls back to the
    /// branch default.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub tax_rate_bp: Option<i32>,
    /// Issue date; empty means today.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub issued_on: Option<NaiveDate>,
    /// Payment deadline.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub due_on: Option<NaiveDate>,
}

/// Charge rows arrive as aligned repeated keys, one entry per line. The
/// body is decoded with `serde_html_form` because `web::Form` cannot
/// collect repeated fields into vectors.
#[derive(Deserialize)]
pub struct ChargesForm {
    #[serde(default)]
    pub description: Vec<String>,
    #[serde(default)]
    pub quantity: Vec<i32>,
    #[serde(default)]
    pub unit_amount: Vec<i64>,
    #[serde(default)]
    pub taxable: Vec<String>,
}

impl ChargesForm {
    /// Builds validated charge rows, preserving submission order.
    pub fn into_charges(&self) -> Result<Vec<NewCharge>, TypeConstraintError> {
        let rows = self.description.len();
        if self.quantity.len() != rows
            || self.unit_amount.len() != rows
            || self.taxable.len() != rows
        {
            return Err(TypeConstraintError::InvalidValue(
                "charge rows are misaligned".to_string(),
            ));
        }

        self.description
            .iter()
            .enumerate()
            .map(|(index, description)| {
                let taxable = match self.taxable[index].as_str() {
                    "true" => true,
                    "false" => false,
                    other => {
                        return Err(TypeConstraintError::InvalidValue(format!(
                            "unknown taxable flag: {other}"
                        )));
                    }
                };
                NewCharge::new(
                    description,
                    self.quantity[index],
                    self.unit_amount[index],
                    taxable,
                    index as i32,
                )
            })
            .collect()
    }
}

#[derive(Deserialize, Validate)]
/// Form data for setting a draft invoice's discount.
pub struct DiscountForm {
    /// Discount in minor units of the invoice currency.
    #[validate(range(min = 0))]
    pub discount: i64,
}

#[derive(Deserialize, Validate)]
/// Form data for recording a direct payment against an invoice.
pub struct PaymentForm {
    /// Paid amount in minor units of the invoice currency.
    #[validate(range(min = 1))]
    pub amount: i64,
    /// Payment method: `wire`, `cash` or `refund`.
    #[validate(length(min = 1))]
    pub method: String,
    /// Optional bookkeeping note.
    pub note: String,
}

#[derive(Deserialize, Validate)]
/// Form data for paying part of an invoice from the deposit wallet.
pub struct WalletApplyForm {
    /// Amount to draw from the wallet, in yen.
    #[validate(range(min = 1))]
    pub amount: i64,
}

#[derive(Deserialize, Validate)]
/// Form data for adding a cost item to an invoice's cost invoice.
pub struct AddCostItemForm {
    /// Vendor the cost was paid to, when tracked.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub vendor_id: Option<i32>,
    /// Cost category name.
    #[validate(length(min = 1))]
    pub category: String,
    /// What the money was spent on.
    #[validate(length(min = 1))]
    pub description: String,
    /// Spent amount in minor units of the invoice currency.
    #[validate(range(min = 1))]
    pub amount: i64,
    /// Date the cost was incurred.
    pub incurred_on: NaiveDate,
}
