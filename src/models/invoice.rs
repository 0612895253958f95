use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::invoice::{
    Charge as DomainCharge, CostItem as DomainCostItem, Invoice as DomainInvoice,
    NewCharge as DomainNewCharge, NewCostItem as DomainNewCostItem,
};
use crate::domain::types::TypeConstraintError;

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = crate::schema::invoices)]
pub struct Invoice {
    pub id: i32,
    pub branch_id: i32,
    pub customer_id: i32,
    pub vehicle_id: Option<i32>,
    pub number: String,
    pub status: String,
    pub currency: String,
    pub tax_rate_bp: i32,
    pub discount: i64,
    pub payment_status: String,
    pub issued_on: NaiveDate,
    pub due_on: Option<NaiveDate>,
    pub approved_by: Option<i32>,
    pub finalized_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Status, payment status and discount come from column defaults; new
/// invoices always open as unpaid drafts.
#[derive(Insertable)]
#[diesel(table_name = crate::schema::invoices)]
pub struct NewInvoice<'a> {
    pub branch_id: i32,
    pub customer_id: i32,
    pub vehicle_id: Option<i32>,
    pub number: &'a str,
    pub currency: &'a str,
    pub tax_rate_bp: i32,
    pub issued_on: NaiveDate,
    pub due_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Associations)]
#[diesel(table_name = crate::schema::charges)]
#[diesel(belongs_to(Invoice))]
pub struct Charge {
    pub id: i32,
    pub invoice_id: i32,
    pub description: String,
    pub quantity: i32,
    pub unit_amount: i64,
    pub taxable: bool,
    pub sort_order: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::charges)]
pub struct NewCharge<'a> {
    pub invoice_id: i32,
    pub description: &'a str,
    pub quantity: i32,
    pub unit_amount: i64,
    pub taxable: bool,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = crate::schema::cost_items)]
pub struct CostItem {
    pub id: i32,
    pub invoice_id: i32,
    pub vendor_id: Option<i32>,
    pub category: String,
    pub description: String,
    pub amount: i64,
    pub incurred_on: NaiveDate,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::cost_items)]
pub struct NewCostItem<'a> {
    pub invoice_id: i32,
    pub vendor_id: Option<i32>,
    pub category: &'a str,
    pub description: &'a str,
    pub amount: i64,
    pub incurred_on: NaiveDate,
}

impl TryFrom<Invoice> for DomainInvoice {
    type Error = TypeConstraintError;

    fn try_from(invoice: Invoice) -> Result<Self, Self::Error> {
        Ok(Self {
            id: invoice.id,
            branch_id: invoice.branch_id,
            customer_id: invoice.customer_id,
            vehicle_id: invoice.vehicle_id,
            number: invoice.number,
            status: invoice.status.parse()?,
            currency: invoice.currency.parse()?,
            tax_rate_bp: invoice.tax_rate_bp,
            discount: invoice.discount,
            payment_status: invoice.payment_status.parse()?,
            issued_on: invoice.issued_on,
            due_on: invoice.due_on,
            approved_by: invoice.approved_by,
            finalized_at: invoice.finalized_at,
            created_at: invoice.created_at,
            updated_at: invoice.updated_at,
        })
    }
}

impl From<Charge> for DomainCharge {
    fn from(charge: Charge) -> Self {
        Self {
            id: charge.id,
            invoice_id: charge.invoice_id,
            description: charge.description,
            quantity: charge.quantity,
            unit_amount: charge.unit_amount,
            taxable: charge.taxable,
            sort_order: charge.sort_order,
        }
    }
}

impl<'a> NewCharge<'a> {
    pub fn new(invoice_id: i32, charge: &'a DomainNewCharge) -> Self {
        Self {
            invoice_id,
            description: &charge.description,
            quantity: charge.quantity,
            unit_amount: charge.unit_amount,
            taxable: charge.taxable,
            sort_order: charge.sort_order,
        }
    }
}

impl TryFrom<CostItem> for DomainCostItem {
    type Error = TypeConstraintError;

    fn try_from(item: CostItem) -> Result<Self, Self::Error> {
        Ok(Self {
            id: item.id,
            invoice_id: item.invoice_id,
            vendor_id: item.vendor_id,
            category: item.category.parse()?,
            description: item.description,
            amount: item.amount,
            incurred_on: item.incurred_on,
            created_at: item.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewCostItem> for NewCostItem<'a> {
    fn from(item: &'a DomainNewCostItem) -> Self {
        Self {
            invoice_id: item.invoice_id,
            vendor_id: item.vendor_id,
            category: item.category.as_str(),
            description: &item.description,
            amount: item.amount,
            incurred_on: item.incurred_on,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::invoice::{InvoiceStatus, PaymentStatus};
    use crate::domain::types::Currency;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn invoice_row(status: &str, payment_status: &str) -> Invoice {
        Invoice {
            id: 1,
            branch_id: 1,
            customer_id: 3,
            vehicle_id: None,
            number: "INV-2026-0001".to_string(),
            status: status.to_string(),
            currency: "JPY".to_string(),
            tax_rate_bp: 1000,
            discount: 0,
            payment_status: payment_status.to_string(),
            issued_on: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            due_on: None,
            approved_by: None,
            finalized_at: None,
            created_at: timestamp(),
            updated_at: timestamp(),
        }
    }

    #[test]
    fn row_parses_status_columns() {
        let domain = DomainInvoice::try_from(invoice_row("pending", "partial")).unwrap();
        assert_eq!(domain.status, InvoiceStatus::Pending);
        assert_eq!(domain.payment_status, PaymentStatus::Partial);
        assert_eq!(domain.currency, Currency::Jpy);
    }

    #[test]
    fn unknown_status_fails_conversion() {
        assert!(DomainInvoice::try_from(invoice_row("haggling", "unpaid")).is_err());
        assert!(DomainInvoice::try_from(invoice_row("draft", "maybe")).is_err());
    }
}
