use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::transaction::{
    NewTransaction as DomainNewTransaction, Transaction as DomainTransaction,
};
use crate::domain::types::TypeConstraintError;

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = crate::schema::transactions)]
pub struct Transaction {
    pub id: i32,
    pub branch_id: i32,
    pub customer_id: i32,
    pub invoice_id: Option<i32>,
    pub direction: String,
    pub method: String,
    pub amount: i64,
    pub currency: String,
    pub reference: String,
    pub note: Option<String>,
    pub created_by: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::transactions)]
pub struct NewTransaction<'a> {
    pub branch_id: i32,
    pub customer_id: i32,
    pub invoice_id: Option<i32>,
    pub direction: &'a str,
    pub method: &'a str,
    pub amount: i64,
    pub currency: &'a str,
    pub reference: &'a str,
    pub note: Option<&'a str>,
    pub created_by: i32,
}

impl TryFrom<Transaction> for DomainTransaction {
    type Error = TypeConstraintError;

    fn try_from(tx: Transaction) -> Result<Self, Self::Error> {
        Ok(Self {
            id: tx.id,
            branch_id: tx.branch_id,
            customer_id: tx.customer_id,
            invoice_id: tx.invoice_id,
            direction: tx.direction.parse()?,
            method: tx.method.parse()?,
            amount: tx.amount,
            currency: tx.currency.parse()?,
            reference: tx.reference,
            note: tx.note,
            created_by: tx.created_by,
            created_at: tx.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewTransaction> for NewTransaction<'a> {
    fn from(tx: &'a DomainNewTransaction) -> Self {
        Self {
            branch_id: tx.branch_id,
            customer_id: tx.customer_id,
            invoice_id: tx.invoice_id,
            direction: tx.direction.as_str(),
            method: tx.method.as_str(),
            amount: tx.amount,
            currency: tx.currency.code(),
            reference: &tx.reference,
            note: tx.note.as_deref(),
            created_by: tx.created_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::{Direction, PaymentMethod};
    use crate::domain::types::Currency;
    use chrono::NaiveDate;

    #[test]
    fn row_parses_direction_and_method() {
        let row = Transaction {
            id: 1,
            branch_id: 1,
            customer_id: 3,
            invoice_id: Some(5),
            direction: "in".to_string(),
            method: "wire".to_string(),
            amount: 800_000,
            currency: "JPY".to_string(),
            reference: "ref-1".to_string(),
            note: None,
            created_by: 2,
            created_at: NaiveDate::from_ymd_opt(2026, 2, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        };
        let domain = DomainTransaction::try_from(row).unwrap();
        assert_eq!(domain.direction, Direction::In);
        assert_eq!(domain.method, PaymentMethod::Wire);
        assert_eq!(domain.currency, Currency::Jpy);
        assert_eq!(domain.signed_amount(), 800_000);
    }

    #[test]
    fn insert_row_borrows_reference() {
        let domain = DomainNewTransaction::new(
            1,
            3,
            None,
            Direction::In,
            PaymentMethod::Deposit,
            500_000,
            Currency::Jpy,
            Some("initial deposit"),
            2,
        )
        .unwrap();
        let row = NewTransaction::from(&domain);
        assert_eq!(row.direction, "in");
        assert_eq!(row.method, "deposit");
        assert_eq!(row.reference, domain.reference);
    }
}
