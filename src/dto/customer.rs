use serde::Serialize;

use crate::domain::customer::Customer;
use crate::domain::document::Document;
use crate::domain::transaction::Transaction;
use crate::domain::user::User;
use crate::dto::invoice::InvoiceSummary;
use crate::dto::vehicle::VehicleProgress;

/// A ledger row rendered for display.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionView {
    pub transaction: Transaction,
    pub direction_label: String,
    pub method_label: String,
    pub amount_display: String,
}

impl From<Transaction> for TransactionView {
    fn from(transaction: Transaction) -> Self {
        let direction_label = transaction.direction.as_str().to_string();
        let method_label = transaction.method.as_str().to_string();
        let amount_display = transaction.currency.format_minor(transaction.amount);
        Self {
            transaction,
            direction_label,
            method_label,
            amount_display,
        }
    }
}

/// Data required to render the customer detail template.
pub struct CustomerPageData {
    pub customer: Customer,
    pub reps: Vec<User>,
    pub wallet_balance: i64,
    pub wallet_display: String,
    pub vehicles: Vec<VehicleProgress>,
    pub invoices: Vec<InvoiceSummary>,
    pub transactions: Vec<TransactionView>,
    pub documents: Vec<Document>,
}
