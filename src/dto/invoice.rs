use serde::Serialize;

use crate::domain::customer::Customer;
use crate::domain::invoice::{
    Charge, CostItem, CostSummary, Invoice, InvoiceStatus, InvoiceTotals, PaymentStatus,
};
use crate::domain::types::Currency;
use crate::domain::vehicle::Vehicle;
use crate::domain::vendor::Vendor;
use crate::dto::customer::TransactionView;
use crate::pagination::Paginated;

/// Query parameters accepted by the invoice list service.
#[derive(Debug, Default)]
pub struct InvoicesQuery {
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub customer_id: Option<i32>,
    pub page: Option<usize>,
}

/// An invoice row rendered for list tables and the portal.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceSummary {
    pub invoice: Invoice,
    pub status_label: String,
    pub payment_label: String,
    pub overdue: bool,
}

impl InvoiceSummary {
    pub fn new(invoice: Invoice, today: chrono::NaiveDate) -> Self {
        let status_label = invoice.status.as_str().to_string();
        let payment_label = invoice.payment_status.as_str().to_string();
        let overdue = invoice.is_overdue(today);
        Self {
            invoice,
            status_label,
            payment_label,
            overdue,
        }
    }
}

/// A charge row with its extended amount rendered.
#[derive(Debug, Clone, Serialize)]
pub struct ChargeView {
    pub charge: Charge,
    pub amount_display: String,
}

impl ChargeView {
    pub fn new(charge: Charge, currency: Currency) -> Self {
        let amount_display = currency.format_minor(charge.amount());
        Self {
            charge,
            amount_display,
        }
    }
}

/// Invoice arithmetic rendered for display.
#[derive(Debug, Clone, Serialize)]
pub struct TotalsView {
    pub subtotal: String,
    pub tax: String,
    pub discount: String,
    pub total: String,
    pub paid: String,
    pub balance_due: String,
    /// Raw overpayment beyond the total, when any.
    pub overpaid: Option<String>,
}

impl TotalsView {
    pub fn new(totals: &InvoiceTotals, paid: i64, balance_due: i64, currency: Currency) -> Self {
        let overpaid = (paid > totals.total).then(|| currency.format_minor(paid - totals.total));
        Self {
            subtotal: currency.format_minor(totals.subtotal),
            tax: currency.format_minor(totals.tax),
            discount: currency.format_minor(totals.discount),
            total: currency.format_minor(totals.total),
            paid: currency.format_minor(paid),
            balance_due: currency.format_minor(balance_due),
            overpaid,
        }
    }
}

/// A cost item with vendor name and amount rendered.
#[derive(Debug, Clone, Serialize)]
pub struct CostItemView {
    pub item: CostItem,
    pub category_label: String,
    pub vendor_name: Option<String>,
    pub amount_display: String,
}

/// The cost invoice block: items plus derived profitability.
#[derive(Debug, Clone, Serialize)]
pub struct CostView {
    pub items: Vec<CostItemView>,
    pub revenue: String,
    pub costs: String,
    pub profit: String,
    pub margin_pct: Option<String>,
    pub roi_pct: Option<String>,
}

impl CostView {
    pub fn new(items: Vec<CostItemView>, summary: &CostSummary, currency: Currency) -> Self {
        Self {
            items,
            revenue: currency.format_minor(summary.revenue),
            costs: currency.format_minor(summary.costs),
            profit: currency.format_minor(summary.profit),
            margin_pct: summary.margin.map(|m| format!("{:.1}%", m * 100.0)),
            roi_pct: summary.roi.map(|r| format!("{:.1}%", r * 100.0)),
        }
    }
}

/// Data required to render the invoice list template.
pub struct InvoicesPageData {
    pub invoices: Paginated<InvoiceSummary>,
    pub status_filter: Option<String>,
    pub payment_filter: Option<String>,
    pub statuses: Vec<&'static str>,
    pub payment_statuses: Vec<&'static str>,
}

impl InvoicesPageData {
    pub fn status_names() -> Vec<&'static str> {
        [
            InvoiceStatus::Draft,
            InvoiceStatus::Pending,
            InvoiceStatus::Approved,
            InvoiceStatus::Finalized,
        ]
        .iter()
        .map(|status| status.as_str())
        .collect()
    }

    pub fn payment_status_names() -> Vec<&'static str> {
        [
            PaymentStatus::Unpaid,
            PaymentStatus::Partial,
            PaymentStatus::Paid,
        ]
        .iter()
        .map(|status| status.as_str())
        .collect()
    }
}

/// Data required to render the invoice detail template.
pub struct InvoicePageData {
    pub invoice: Invoice,
    pub customer: Customer,
    pub vehicle: Option<Vehicle>,
    pub status_label: String,
    pub payment_label: String,
    pub charges: Vec<ChargeView>,
    pub totals: TotalsView,
    pub transactions: Vec<TransactionView>,
    pub cost: CostView,
    pub wallet_display: String,
    pub wallet_balance: i64,
    /// Vendors for the cost item form.
    pub vendors: Vec<Vendor>,
    pub categories: Vec<&'static str>,
    pub can_edit: bool,
    pub can_submit: bool,
    pub can_approve: bool,
    pub can_reject: bool,
    pub can_finalize: bool,
    pub can_pay: bool,
}
