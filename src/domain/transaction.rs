use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::{Currency, TypeConstraintError, sanitize_text};

/// Direction of money relative to the branch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Direction {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "in" => Ok(Direction::In),
            "out" => Ok(Direction::Out),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown direction: {other}"
            ))),
        }
    }
}

/// How the money moved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Incoming wallet deposit, not tied to an invoice.
    Deposit,
    Wire,
    Cash,
    /// Wallet balance applied to an invoice; always written as a pair.
    Wallet,
    Refund,
}

impl PaymentMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Deposit => "deposit",
            PaymentMethod::Wire => "wire",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Wallet => "wallet",
            PaymentMethod::Refund => "refund",
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deposit" => Ok(PaymentMethod::Deposit),
            "wire" => Ok(PaymentMethod::Wire),
            "cash" => Ok(PaymentMethod::Cash),
            "wallet" => Ok(PaymentMethod::Wallet),
            "refund" => Ok(PaymentMethod::Refund),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown payment method: {other}"
            ))),
        }
    }
}

/// One immutable row in the money ledger. Rows without an invoice belong to
/// the customer's deposit wallet; rows with one settle that invoice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: i32,
    pub branch_id: i32,
    pub customer_id: i32,
    pub invoice_id: Option<i32>,
    pub direction: Direction,
    pub method: PaymentMethod,
    /// Always positive; `direction` carries the sign.
    pub amount: i64,
    pub currency: Currency,
    /// Unique reference for bank reconciliation.
    pub reference: String,
    pub note: Option<String>,
    pub created_by: i32,
    pub created_at: NaiveDateTime,
}

impl Transaction {
    /// Amount with the direction applied.
    pub fn signed_amount(&self) -> i64 {
        match self.direction {
            Direction::In => self.amount,
            Direction::Out => -self.amount,
        }
    }
}

/// Payload for appending a ledger row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub branch_id: i32,
    pub customer_id: i32,
    pub invoice_id: Option<i32>,
    pub direction: Direction,
    pub method: PaymentMethod,
    pub amount: i64,
    pub currency: Currency,
    pub reference: String,
    pub note: Option<String>,
    pub created_by: i32,
}

impl NewTransaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        branch_id: i32,
        customer_id: i32,
        invoice_id: Option<i32>,
        direction: Direction,
        method: PaymentMethod,
        amount: i64,
        currency: Currency,
        note: Option<&str>,
        created_by: i32,
    ) -> Result<Self, TypeConstraintError> {
        if amount <= 0 {
            return Err(TypeConstraintError::NonPositiveAmount);
        }
        Ok(Self {
            branch_id,
            customer_id,
            invoice_id,
            direction,
            method,
            amount,
            currency,
            reference: Uuid::new_v4().to_string(),
            note: note.and_then(sanitize_text),
            created_by,
        })
    }
}

/// Deposit wallet balance: net of unlinked JPY rows. Rows linked to an
/// invoice or in another currency never count.
pub fn wallet_balance(rows: &[Transaction]) -> i64 {
    rows.iter()
        .filter(|t| t.invoice_id.is_none() && t.currency == Currency::Jpy)
        .map(Transaction::signed_amount)
        .sum()
}

/// Net amount settled against one invoice. Refunds subtract.
pub fn paid_to_date(rows: &[Transaction], invoice_id: i32) -> i64 {
    rows.iter()
        .filter(|t| t.invoice_id == Some(invoice_id))
        .map(Transaction::signed_amount)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(
        invoice_id: Option<i32>,
        direction: Direction,
        method: PaymentMethod,
        amount: i64,
        currency: Currency,
    ) -> Transaction {
        Transaction {
            id: 0,
            branch_id: 1,
            customer_id: 1,
            invoice_id,
            direction,
            method,
            amount,
            currency,
            reference: "ref".to_string(),
            note: None,
            created_by: 1,
            created_at: NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn wallet_balance_nets_unlinked_jpy_rows() {
        let rows = vec![
            row(None, Direction::In, PaymentMethod::Deposit, 500_000, Currency::Jpy),
            row(None, Direction::Out, PaymentMethod::Wallet, 200_000, Currency::Jpy),
            // Linked row: settles an invoice, not part of the wallet.
            row(Some(3), Direction::In, PaymentMethod::Wallet, 200_000, Currency::Jpy),
            // Foreign-currency rows never join the wallet.
            row(None, Direction::In, PaymentMethod::Deposit, 9_999, Currency::Usd),
        ];
        assert_eq!(wallet_balance(&rows), 300_000);
    }

    #[test]
    fn paid_to_date_subtracts_refunds() {
        let rows = vec![
            row(Some(3), Direction::In, PaymentMethod::Wire, 800_000, Currency::Jpy),
            row(Some(3), Direction::Out, PaymentMethod::Refund, 100_000, Currency::Jpy),
            row(Some(4), Direction::In, PaymentMethod::Cash, 50_000, Currency::Jpy),
        ];
        assert_eq!(paid_to_date(&rows, 3), 700_000);
        assert_eq!(paid_to_date(&rows, 4), 50_000);
        assert_eq!(paid_to_date(&rows, 99), 0);
    }

    #[test]
    fn new_transaction_requires_positive_amount() {
        let err = NewTransaction::new(
            1,
            1,
            None,
            Direction::In,
            PaymentMethod::Deposit,
            0,
            Currency::Jpy,
            None,
            1,
        );
        assert_eq!(err.unwrap_err(), TypeConstraintError::NonPositiveAmount);
    }

    #[test]
    fn references_are_unique() {
        let a = NewTransaction::new(
            1, 1, None, Direction::In, PaymentMethod::Deposit, 100, Currency::Jpy, None, 1,
        )
        .unwrap();
        let b = NewTransaction::new(
            1, 1, None, Direction::In, PaymentMethod::Deposit, 100, Currency::Jpy, None, 1,
        )
        .unwrap();
        assert_ne!(a.reference, b.reference);
    }
}
