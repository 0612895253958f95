//! Repository implementation for the money ledger.

use diesel::prelude::*;

use crate::domain::transaction::{
    Direction, NewTransaction, PaymentMethod, Transaction, wallet_balance,
};
use crate::domain::types::Currency;
use crate::models::invoice::Invoice as DbInvoice;
use crate::models::transaction::{NewTransaction as DbNewTransaction, Transaction as DbTransaction};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::invoice::recompute_payment_status;
use crate::repository::{DieselRepository, TransactionReader, TransactionWriter};

fn load_unlinked(
    conn: &mut SqliteConnection,
    customer_id: i32,
) -> Result<Vec<Transaction>, RepositoryError> {
    use crate::schema::transactions;

    let rows = transactions::table
        .filter(transactions::customer_id.eq(customer_id))
        .filter(transactions::invoice_id.is_null())
        .load::<DbTransaction>(conn)?
        .into_iter()
        .map(Transaction::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

impl TransactionReader for DieselRepository {
    fn list_customer_transactions(&self, customer_id: i32) -> RepositoryResult<Vec<Transaction>> {
        use crate::schema::transactions;

        let mut conn = self.conn()?;
        transactions::table
            .filter(transactions::customer_id.eq(customer_id))
            .order(transactions::id.desc())
            .load::<DbTransaction>(&mut conn)?
            .into_iter()
            .map(Transaction::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)
    }

    fn list_invoice_transactions(&self, invoice_id: i32) -> RepositoryResult<Vec<Transaction>> {
        use crate::schema::transactions;

        let mut conn = self.conn()?;
        transactions::table
            .filter(transactions::invoice_id.eq(invoice_id))
            .order(transactions::id.asc())
            .load::<DbTransaction>(&mut conn)?
            .into_iter()
            .map(Transaction::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)
    }

    fn wallet_balance(&self, customer_id: i32) -> RepositoryResult<i64> {
        let mut conn = self.conn()?;
        let unlinked = load_unlinked(&mut conn, customer_id)?;
        Ok(wallet_balance(&unlinked))
    }
}

impl TransactionWriter for DieselRepository {
    fn record_payment(&self, new_transaction: &NewTransaction) -> RepositoryResult<Transaction> {
        use crate::schema::transactions;

        let mut conn = self.conn()?;

        conn.transaction::<Transaction, RepositoryError, _>(|conn| {
            let created = diesel::insert_into(transactions::table)
                .values(DbNewTransaction::from(new_transaction))
                .get_result::<DbTransaction>(conn)?;

            if let Some(invoice_id) = new_transaction.invoice_id {
                recompute_payment_status(conn, invoice_id)?;
            }

            Transaction::try_from(created).map_err(RepositoryError::from)
        })
    }

    fn apply_wallet(
        &self,
        customer_id: i32,
        invoice_id: i32,
        amount: i64,
        created_by: i32,
    ) -> RepositoryResult<(Transaction, Transaction)> {
        use crate::schema::{invoices, transactions};

        let mut conn = self.conn()?;

        conn.transaction::<(Transaction, Transaction), RepositoryError, _>(|conn| {
            let invoice = invoices::table
                .find(invoice_id)
                .first::<DbInvoice>(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;
            if invoice.customer_id != customer_id {
                return Err(RepositoryError::Conflict(
                    "invoice belongs to another customer".to_string(),
                ));
            }
            if invoice.currency != Currency::Jpy.code() {
                return Err(RepositoryError::Conflict(
                    "wallet funds are held in JPY".to_string(),
                ));
            }

            // The balance is re-read under the transaction so two
            // applications cannot both spend the same deposit.
            let unlinked = load_unlinked(conn, customer_id)?;
            let balance = wallet_balance(&unlinked);
            if amount > balance {
                return Err(RepositoryError::Conflict(format!(
                    "wallet balance {balance} is below {amount}"
                )));
            }

            let note = format!("applied to {}", invoice.number);
            let withdrawal = NewTransaction::new(
                invoice.branch_id,
                customer_id,
                None,
                Direction::Out,
                PaymentMethod::Wallet,
                amount,
                Currency::Jpy,
                Some(&note),
                created_by,
            )?;
            let withdrawal_row = diesel::insert_into(transactions::table)
                .values(DbNewTransaction::from(&withdrawal))
                .get_result::<DbTransaction>(conn)?;

            let settlement = NewTransaction::new(
                invoice.branch_id,
                customer_id,
                Some(invoice_id),
                Direction::In,
                PaymentMethod::Wallet,
                amount,
                Currency::Jpy,
                None,
                created_by,
            )?;
            let settlement_row = diesel::insert_into(transactions::table)
                .values(DbNewTransaction::from(&settlement))
                .get_result::<DbTransaction>(conn)?;

            recompute_payment_status(conn, invoice_id)?;

            Ok((
                Transaction::try_from(withdrawal_row)?,
                Transaction::try_from(settlement_row)?,
            ))
        })
    }

    fn record_deposit(&self, new_transaction: &NewTransaction) -> RepositoryResult<Transaction> {
        use crate::schema::transactions;

        let mut conn = self.conn()?;
        let created = diesel::insert_into(transactions::table)
            .values(DbNewTransaction::from(new_transaction))
            .get_result::<DbTransaction>(&mut conn)?;

        Transaction::try_from(created).map_err(RepositoryError::from)
    }
}
