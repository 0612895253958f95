use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{Currency, TypeConstraintError, sanitize_text};

/// Lifecycle of an invoice. The path runs draft, pending, approved,
/// finalized, with a single back-edge from pending to draft on reject.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Pending,
    Approved,
    Finalized,
}

impl InvoiceStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Approved => "approved",
            InvoiceStatus::Finalized => "finalized",
        }
    }

    /// Finalized invoices refuse every mutation except payments.
    pub fn is_locked(self) -> bool {
        self == InvoiceStatus::Finalized
    }

    /// Charges and discount can only change while drafting.
    pub fn allows_charge_edits(self) -> bool {
        self == InvoiceStatus::Draft
    }

    /// Payments and wallet applications require an approved number.
    pub fn accepts_payments(self) -> bool {
        matches!(self, InvoiceStatus::Approved | InvoiceStatus::Finalized)
    }
}

/// Whether moving from `from` to `to` is a legal status move. Role checks
/// happen in the service layer; this is only the shape of the machine.
pub fn transition_allowed(from: InvoiceStatus, to: InvoiceStatus) -> bool {
    matches!(
        (from, to),
        (InvoiceStatus::Draft, InvoiceStatus::Pending)
            | (InvoiceStatus::Pending, InvoiceStatus::Approved)
            | (InvoiceStatus::Pending, InvoiceStatus::Draft)
            | (InvoiceStatus::Approved, InvoiceStatus::Finalized)
    )
}

impl Display for InvoiceStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(InvoiceStatus::Draft),
            "pending" => Ok(InvoiceStatus::Pending),
            "approved" => Ok(InvoiceStatus::Approved),
            "finalized" => Ok(InvoiceStatus::Finalized),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown invoice status: {other}"
            ))),
        }
    }
}

/// Settlement state derived from the invoice's transactions, never set by
/// hand.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Partial,
    Paid,
}

impl PaymentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Paid => "paid",
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unpaid" => Ok(PaymentStatus::Unpaid),
            "partial" => Ok(PaymentStatus::Partial),
            "paid" => Ok(PaymentStatus::Paid),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown payment status: {other}"
            ))),
        }
    }
}

/// Derives the payment status from the invoice total and the net paid
/// amount. A zero-total invoice stays unpaid until money actually moves.
pub fn derive_payment_status(total: i64, paid: i64) -> PaymentStatus {
    if paid >= total && paid > 0 {
        PaymentStatus::Paid
    } else if paid > 0 {
        PaymentStatus::Partial
    } else {
        PaymentStatus::Unpaid
    }
}

/// Amount still owed, clamped at zero for overpaid invoices.
pub fn balance_due(total: i64, paid: i64) -> i64 {
    (total - paid).max(0)
}

/// An invoice issued to a customer, optionally tied to a vehicle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    pub id: i32,
    pub branch_id: i32,
    pub customer_id: i32,
    pub vehicle_id: Option<i32>,
    /// Branch-scoped number, e.g. `INV-2026-0042`.
    pub number: String,
    pub status: InvoiceStatus,
    pub currency: Currency,
    /// Consumption tax rate in basis points: 1000 is 10%.
    pub tax_rate_bp: i32,
    /// Flat discount in minor units, applied after tax.
    pub discount: i64,
    pub payment_status: PaymentStatus,
    pub issued_on: NaiveDate,
    pub due_on: Option<NaiveDate>,
    pub approved_by: Option<i32>,
    pub finalized_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Invoice {
    /// True once the due date has passed without full settlement.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.payment_status != PaymentStatus::Paid
            && self.due_on.is_some_and(|due| due < today)
    }
}

/// Payload for creating a draft invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub branch_id: i32,
    pub customer_id: i32,
    pub vehicle_id: Option<i32>,
    pub currency: Currency,
    pub tax_rate_bp: i32,
    pub issued_on: NaiveDate,
    pub due_on: Option<NaiveDate>,
}

impl NewInvoice {
    pub fn new(
        branch_id: i32,
        customer_id: i32,
        vehicle_id: Option<i32>,
        currency: Currency,
        tax_rate_bp: i32,
        issued_on: NaiveDate,
        due_on: Option<NaiveDate>,
    ) -> Result<Self, TypeConstraintError> {
        if !(0..=10_000).contains(&tax_rate_bp) {
            return Err(TypeConstraintError::InvalidValue(format!(
                "tax rate out of range: {tax_rate_bp}bp"
            )));
        }
        if let Some(due) = due_on
            && due < issued_on
        {
            return Err(TypeConstraintError::InvalidValue(
                "due date precedes issue date".to_string(),
            ));
        }
        Ok(Self {
            branch_id,
            customer_id,
            vehicle_id,
            currency,
            tax_rate_bp,
            issued_on,
            due_on,
        })
    }
}

/// Formats a branch-year sequence number into the printed invoice number.
pub fn format_invoice_number(year: i32, sequence: i64) -> String {
    format!("INV-{year}-{sequence:04}")
}

/// One billable line on an invoice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Charge {
    pub id: i32,
    pub invoice_id: i32,
    pub description: String,
    pub quantity: i32,
    /// Price per unit in minor units of the invoice currency.
    pub unit_amount: i64,
    /// Consumption tax applies only to taxable lines; deposits forwarded
    /// at cost are typically exempt.
    pub taxable: bool,
    pub sort_order: i32,
}

impl Charge {
    pub fn amount(&self) -> i64 {
        i64::from(self.quantity) * self.unit_amount
    }
}

/// Payload for one charge row when replacing an invoice's charges.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCharge {
    pub description: String,
    pub quantity: i32,
    pub unit_amount: i64,
    pub taxable: bool,
    pub sort_order: i32,
}

impl NewCharge {
    pub fn new(
        description: &str,
        quantity: i32,
        unit_amount: i64,
        taxable: bool,
        sort_order: i32,
    ) -> Result<Self, TypeConstraintError> {
        if quantity < 1 {
            return Err(TypeConstraintError::InvalidValue(
                "quantity must be at least 1".to_string(),
            ));
        }
        if unit_amount < 0 {
            return Err(TypeConstraintError::InvalidValue(
                "unit amount cannot be negative".to_string(),
            ));
        }
        Ok(Self {
            description: sanitize_text(description).ok_or(TypeConstraintError::EmptyString)?,
            quantity,
            unit_amount,
            taxable,
            sort_order,
        })
    }

    pub fn amount(&self) -> i64 {
        i64::from(self.quantity) * self.unit_amount
    }
}

/// Derived money columns of an invoice.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub subtotal: i64,
    pub taxable_subtotal: i64,
    pub tax: i64,
    pub discount: i64,
    pub total: i64,
}

/// Computes subtotal, tax and total from the charge rows. Tax is floored,
/// matching consumption-tax rounding, and the discounted total clamps at
/// zero.
pub fn compute_totals(charges: &[Charge], tax_rate_bp: i32, discount: i64) -> InvoiceTotals {
    let subtotal: i64 = charges.iter().map(Charge::amount).sum();
    let taxable_subtotal: i64 = charges
        .iter()
        .filter(|c| c.taxable)
        .map(Charge::amount)
        .sum();
    let tax = (i128::from(taxable_subtotal) * i128::from(tax_rate_bp) / 10_000) as i64;
    InvoiceTotals {
        subtotal,
        taxable_subtotal,
        tax,
        discount,
        total: (subtotal + tax - discount).max(0),
    }
}

/// Categories for money spent getting a vehicle ready and shipped. Shared
/// by cost items and vendor records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CostCategory {
    Purchase,
    Transport,
    Repair,
    Inspection,
    Shipping,
    Customs,
    Other,
}

impl CostCategory {
    pub const ALL: [CostCategory; 7] = [
        CostCategory::Purchase,
        CostCategory::Transport,
        CostCategory::Repair,
        CostCategory::Inspection,
        CostCategory::Shipping,
        CostCategory::Customs,
        CostCategory::Other,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            CostCategory::Purchase => "purchase",
            CostCategory::Transport => "transport",
            CostCategory::Repair => "repair",
            CostCategory::Inspection => "inspection",
            CostCategory::Shipping => "shipping",
            CostCategory::Customs => "customs",
            CostCategory::Other => "other",
        }
    }
}

impl Display for CostCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CostCategory {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "purchase" => Ok(CostCategory::Purchase),
            "transport" => Ok(CostCategory::Transport),
            "repair" => Ok(CostCategory::Repair),
            "inspection" => Ok(CostCategory::Inspection),
            "shipping" => Ok(CostCategory::Shipping),
            "customs" => Ok(CostCategory::Customs),
            "other" => Ok(CostCategory::Other),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown cost category: {other}"
            ))),
        }
    }
}

/// Money the branch spent against an invoice: auction fees, inland
/// transport, repairs, freight. Internal only, never shown to customers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostItem {
    pub id: i32,
    pub invoice_id: i32,
    pub vendor_id: Option<i32>,
    pub category: CostCategory,
    pub description: String,
    /// Minor units of the owning invoice's currency. In practice domestic
    /// costs land on yen invoices.
    pub amount: i64,
    pub incurred_on: NaiveDate,
    pub created_at: NaiveDateTime,
}

/// Payload for recording a cost item.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCostItem {
    pub invoice_id: i32,
    pub vendor_id: Option<i32>,
    pub category: CostCategory,
    pub description: String,
    pub amount: i64,
    pub incurred_on: NaiveDate,
}

impl NewCostItem {
    pub fn new(
        invoice_id: i32,
        vendor_id: Option<i32>,
        category: CostCategory,
        description: &str,
        amount: i64,
        incurred_on: NaiveDate,
    ) -> Result<Self, TypeConstraintError> {
        if amount <= 0 {
            return Err(TypeConstraintError::NonPositiveAmount);
        }
        Ok(Self {
            invoice_id,
            vendor_id,
            category,
            description: sanitize_text(description).ok_or(TypeConstraintError::EmptyString)?,
            amount,
            incurred_on,
        })
    }
}

/// Profitability of one deal, derived from the invoice totals and its cost
/// items.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct CostSummary {
    /// Tax-exclusive revenue: the total minus collected tax.
    pub revenue: i64,
    pub costs: i64,
    pub profit: i64,
    /// Profit over revenue; `None` when there is no revenue.
    pub margin: Option<f64>,
    /// Profit over costs; `None` when nothing was spent.
    pub roi: Option<f64>,
}

pub fn compute_cost_summary(totals: &InvoiceTotals, cost_items: &[CostItem]) -> CostSummary {
    let revenue = totals.total - totals.tax;
    let costs: i64 = cost_items.iter().map(|c| c.amount).sum();
    let profit = revenue - costs;
    CostSummary {
        revenue,
        costs,
        profit,
        margin: (revenue != 0).then(|| profit as f64 / revenue as f64),
        roi: (costs != 0).then(|| profit as f64 / costs as f64),
    }
}
