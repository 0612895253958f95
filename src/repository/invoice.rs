//! Repository implementation for invoices, charges and cost items.

use chrono::{Datelike, Utc};
use diesel::prelude::*;

use crate::domain::invoice::{
    Charge, CostItem, Invoice, InvoiceStatus, NewCharge, NewCostItem, NewInvoice, PaymentStatus,
    compute_totals, derive_payment_status, format_invoice_number,
};
use crate::domain::transaction::{Transaction, paid_to_date};
use crate::models::invoice::{
    Charge as DbCharge, CostItem as DbCostItem, Invoice as DbInvoice, NewCharge as DbNewCharge,
    NewCostItem as DbNewCostItem, NewInvoice as DbNewInvoice,
};
use crate::models::transaction::Transaction as DbTransaction;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, InvoiceListQuery, InvoiceReader, InvoiceWriter};

/// Recomputes the derived payment status from the charge and transaction
/// rows and stores it. Callers run this inside the same transaction as the
/// write that changed the total or the paid amount.
pub(crate) fn recompute_payment_status(
    conn: &mut SqliteConnection,
    invoice_id: i32,
) -> Result<PaymentStatus, RepositoryError> {
    use crate::schema::{charges, invoices, transactions};

    let invoice = invoices::table
        .find(invoice_id)
        .first::<DbInvoice>(conn)
        .optional()?
        .ok_or(RepositoryError::NotFound)?;

    let charge_rows: Vec<Charge> = charges::table
        .filter(charges::invoice_id.eq(invoice_id))
        .load::<DbCharge>(conn)?
        .into_iter()
        .map(Into::into)
        .collect();
    let totals = compute_totals(&charge_rows, invoice.tax_rate_bp, invoice.discount);

    let settled: Vec<Transaction> = transactions::table
        .filter(transactions::invoice_id.eq(invoice_id))
        .load::<DbTransaction>(conn)?
        .into_iter()
        .map(Transaction::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    let paid = paid_to_date(&settled, invoice_id);

    let status = derive_payment_status(totals.total, paid);
    diesel::update(invoices::table.find(invoice_id))
        .set((
            invoices::payment_status.eq(status.as_str()),
            invoices::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(conn)?;

    Ok(status)
}

impl InvoiceReader for DieselRepository {
    fn get_invoice_by_id(&self, id: i32, branch_id: i32) -> RepositoryResult<Option<Invoice>> {
        use crate::schema::invoices;

        let mut conn = self.conn()?;
        let invoice = invoices::table
            .find(id)
            .filter(invoices::branch_id.eq(branch_id))
            .first::<DbInvoice>(&mut conn)
            .optional()?;

        invoice
            .map(Invoice::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn get_invoice_with_charges(
        &self,
        id: i32,
        branch_id: i32,
    ) -> RepositoryResult<Option<(Invoice, Vec<Charge>)>> {
        use crate::schema::{charges, invoices};

        let mut conn = self.conn()?;
        let Some(invoice) = invoices::table
            .find(id)
            .filter(invoices::branch_id.eq(branch_id))
            .first::<DbInvoice>(&mut conn)
            .optional()?
        else {
            return Ok(None);
        };

        let charge_rows = charges::table
            .filter(charges::invoice_id.eq(invoice.id))
            .order(charges::sort_order.asc())
            .load::<DbCharge>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        let invoice = Invoice::try_from(invoice).map_err(RepositoryError::from)?;
        Ok(Some((invoice, charge_rows)))
    }

    fn list_invoices(&self, query: InvoiceListQuery) -> RepositoryResult<(usize, Vec<Invoice>)> {
        use crate::schema::invoices;

        let mut conn = self.conn()?;

        let build_query = || {
            let mut q = invoices::table
                .into_boxed()
                .filter(invoices::branch_id.eq(query.branch_id));

            if let Some(status) = query.status {
                q = q.filter(invoices::status.eq(status.as_str()));
            }

            if let Some(payment_status) = query.payment_status {
                q = q.filter(invoices::payment_status.eq(payment_status.as_str()));
            }

            if let Some(customer_id) = query.customer_id {
                q = q.filter(invoices::customer_id.eq(customer_id));
            }

            if let Some(vehicle_id) = query.vehicle_id {
                q = q.filter(invoices::vehicle_id.eq(vehicle_id));
            }

            q
        };

        let total: i64 = build_query().count().get_result(&mut conn)?;

        let mut page_query = build_query().order(invoices::created_at.desc());
        if let Some(pagination) = &query.pagination {
            let page = pagination.page.max(1);
            page_query = page_query
                .limit(pagination.per_page as i64)
                .offset(((page - 1) * pagination.per_page) as i64);
        }

        let items = page_query
            .load::<DbInvoice>(&mut conn)?
            .into_iter()
            .map(Invoice::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)?;

        Ok((total as usize, items))
    }

    fn list_cost_items(&self, invoice_id: i32) -> RepositoryResult<Vec<CostItem>> {
        use crate::schema::cost_items;

        let mut conn = self.conn()?;
        cost_items::table
            .filter(cost_items::invoice_id.eq(invoice_id))
            .order(cost_items::incurred_on.asc())
            .load::<DbCostItem>(&mut conn)?
            .into_iter()
            .map(CostItem::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)
    }

    fn list_unsettled_invoices(&self) -> RepositoryResult<Vec<Invoice>> {
        use crate::schema::invoices;

        let mut conn = self.conn()?;
        invoices::table
            .filter(invoices::status.eq(InvoiceStatus::Finalized.as_str()))
            .filter(invoices::payment_status.ne(PaymentStatus::Paid.as_str()))
            .order(invoices::issued_on.asc())
            .load::<DbInvoice>(&mut conn)?
            .into_iter()
            .map(Invoice::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)
    }
}

impl InvoiceWriter for DieselRepository {
    fn create_invoice(&self, new_invoice: &NewInvoice) -> RepositoryResult<Invoice> {
        use crate::schema::invoices;

        let mut conn = self.conn()?;

        conn.transaction::<Invoice, RepositoryError, _>(|conn| {
            let year = new_invoice.issued_on.year();
            let year_prefix = format!("INV-{year}-%");
            let issued_this_year: i64 = invoices::table
                .filter(invoices::branch_id.eq(new_invoice.branch_id))
                .filter(invoices::number.like(&year_prefix))
                .count()
                .get_result(conn)?;
            let number = format_invoice_number(year, issued_this_year + 1);

            let created = diesel::insert_into(invoices::table)
                .values(DbNewInvoice {
                    branch_id: new_invoice.branch_id,
                    customer_id: new_invoice.customer_id,
                    vehicle_id: new_invoice.vehicle_id,
                    number: &number,
                    currency: new_invoice.currency.code(),
                    tax_rate_bp: new_invoice.tax_rate_bp,
                    issued_on: new_invoice.issued_on,
                    due_on: new_invoice.due_on,
                })
                .get_result::<DbInvoice>(conn)?;

            Invoice::try_from(created).map_err(RepositoryError::from)
        })
    }

    fn replace_charges(
        &self,
        invoice_id: i32,
        new_charges: &[NewCharge],
    ) -> RepositoryResult<Vec<Charge>> {
        use crate::schema::{charges, invoices};

        let mut conn = self.conn()?;

        conn.transaction::<Vec<Charge>, RepositoryError, _>(|conn| {
            let invoice = invoices::table
                .find(invoice_id)
                .first::<DbInvoice>(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;
            let status: InvoiceStatus = invoice.status.parse()?;
            if !status.allows_charge_edits() {
                return Err(RepositoryError::Conflict(
                    "charges can only change on draft invoices".to_string(),
                ));
            }

            diesel::delete(charges::table.filter(charges::invoice_id.eq(invoice_id)))
                .execute(conn)?;
            let insertables: Vec<DbNewCharge> = new_charges
                .iter()
                .map(|charge| DbNewCharge::new(invoice_id, charge))
                .collect();
            diesel::insert_into(charges::table)
                .values(&insertables)
                .execute(conn)?;

            recompute_payment_status(conn, invoice_id)?;

            let rows = charges::table
                .filter(charges::invoice_id.eq(invoice_id))
                .order(charges::sort_order.asc())
                .load::<DbCharge>(conn)?
                .into_iter()
                .map(Into::into)
                .collect();
            Ok(rows)
        })
    }

    fn set_discount(&self, invoice_id: i32, discount: i64) -> RepositoryResult<Invoice> {
        use crate::schema::invoices;

        let mut conn = self.conn()?;

        conn.transaction::<Invoice, RepositoryError, _>(|conn| {
            let invoice = invoices::table
                .find(invoice_id)
                .first::<DbInvoice>(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;
            let status: InvoiceStatus = invoice.status.parse()?;
            if !status.allows_charge_edits() {
                return Err(RepositoryError::Conflict(
                    "discount can only change on draft invoices".to_string(),
                ));
            }

            diesel::update(invoices::table.find(invoice_id))
                .set((
                    invoices::discount.eq(discount),
                    invoices::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)?;

            recompute_payment_status(conn, invoice_id)?;

            let updated = invoices::table.find(invoice_id).first::<DbInvoice>(conn)?;
            Invoice::try_from(updated).map_err(RepositoryError::from)
        })
    }

    fn set_invoice_status(
        &self,
        invoice_id: i32,
        from: InvoiceStatus,
        to: InvoiceStatus,
        actor: i32,
    ) -> RepositoryResult<Invoice> {
        use crate::schema::invoices;

        let mut conn = self.conn()?;

        conn.transaction::<Invoice, RepositoryError, _>(|conn| {
            let now = Utc::now().naive_utc();
            let guarded = invoices::table
                .find(invoice_id)
                .filter(invoices::status.eq(from.as_str()));

            let affected = match to {
                InvoiceStatus::Approved => diesel::update(guarded)
                    .set((
                        invoices::status.eq(to.as_str()),
                        invoices::approved_by.eq(Some(actor)),
                        invoices::updated_at.eq(now),
                    ))
                    .execute(conn)?,
                InvoiceStatus::Finalized => diesel::update(guarded)
                    .set((
                        invoices::status.eq(to.as_str()),
                        invoices::finalized_at.eq(Some(now)),
                        invoices::updated_at.eq(now),
                    ))
                    .execute(conn)?,
                _ => diesel::update(guarded)
                    .set((invoices::status.eq(to.as_str()), invoices::updated_at.eq(now)))
                    .execute(conn)?,
            };

            if affected == 0 {
                let exists: i64 = invoices::table
                    .find(invoice_id)
                    .count()
                    .get_result(conn)?;
                return Err(if exists == 0 {
                    RepositoryError::NotFound
                } else {
                    RepositoryError::Conflict(format!(
                        "invoice is no longer {}",
                        from.as_str()
                    ))
                });
            }

            let updated = invoices::table.find(invoice_id).first::<DbInvoice>(conn)?;
            Invoice::try_from(updated).map_err(RepositoryError::from)
        })
    }

    fn add_cost_item(&self, new_item: &NewCostItem) -> RepositoryResult<CostItem> {
        use crate::schema::cost_items;

        let mut conn = self.conn()?;
        let created = diesel::insert_into(cost_items::table)
            .values(DbNewCostItem::from(new_item))
            .get_result::<DbCostItem>(&mut conn)?;

        CostItem::try_from(created).map_err(RepositoryError::from)
    }

    fn delete_cost_item(&self, cost_item_id: i32, invoice_id: i32) -> RepositoryResult<()> {
        use crate::schema::cost_items;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            cost_items::table
                .find(cost_item_id)
                .filter(cost_items::invoice_id.eq(invoice_id)),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
