//! Invoice lifecycle: list and detail pages, the draft to finalized
//! state machine, charges, payments, wallet settlement, and the cost
//! side of each deal.

use std::collections::HashMap;

use validator::Validate;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::invoice::{
    CostCategory, Invoice, InvoiceStatus, NewCostItem, NewInvoice, balance_due,
    compute_cost_summary, compute_totals, transition_allowed,
};
use crate::domain::transaction::{
    Direction, NewTransaction, PaymentMethod, paid_to_date,
};
use crate::domain::types::Currency;
use crate::dto::customer::TransactionView;
use crate::dto::invoice::{
    ChargeView, CostItemView, CostView, InvoicePageData, InvoiceSummary, InvoicesPageData,
    InvoicesQuery, TotalsView,
};
use crate::forms::invoice::{
    AddCostItemForm, AddInvoiceForm, ChargesForm, DiscountForm, PaymentForm, WalletApplyForm,
};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    CustomerReader, InvoiceListQuery, InvoiceReader, InvoiceWriter, SettingsReader,
    TransactionReader, TransactionWriter, VehicleReader, VendorReader,
};
use crate::routes::ensure_role;
use crate::services::vendors::category_names;
use crate::services::{ServiceError, ServiceResult};
use crate::{SERVICE_ACCESS_ROLE, SERVICE_ADMIN_ROLE};

fn get_branch_invoice<R>(
    repo: &R,
    user: &AuthenticatedUser,
    invoice_id: i32,
) -> ServiceResult<Invoice>
where
    R: InvoiceReader + ?Sized,
{
    repo.get_invoice_by_id(invoice_id, user.branch_id)?
        .ok_or(ServiceError::NotFound)
}

/// Draft-only edits: a finalized invoice is locked outright, anything
/// else past draft refuses with a conflict.
fn guard_editable(invoice: &Invoice) -> ServiceResult<()> {
    if invoice.status == InvoiceStatus::Finalized {
        return Err(ServiceError::Locked);
    }
    if !invoice.status.allows_charge_edits() {
        return Err(ServiceError::Conflict(format!(
            "invoice {} is {}, not draft",
            invoice.number,
            invoice.status.as_str()
        )));
    }
    Ok(())
}

fn guard_transition(invoice: &Invoice, to: InvoiceStatus) -> ServiceResult<()> {
    if invoice.status == InvoiceStatus::Finalized {
        return Err(ServiceError::Locked);
    }
    if !transition_allowed(invoice.status, to) {
        return Err(ServiceError::Conflict(format!(
            "invoice {} cannot move from {} to {}",
            invoice.number,
            invoice.status.as_str(),
            to.as_str()
        )));
    }
    Ok(())
}

/// Loads the invoice list with status and payment filters.
pub fn load_invoices_page<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: InvoicesQuery,
) -> ServiceResult<InvoicesPageData>
where
    R: InvoiceReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let page = query.page.unwrap_or(1);
    let status_filter = query
        .status
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty());
    let payment_filter = query
        .payment_status
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty());

    let mut list_query =
        InvoiceListQuery::new(user.branch_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(raw) = &status_filter {
        list_query = list_query.status(raw.parse()?);
    }
    if let Some(raw) = &payment_filter {
        list_query = list_query.payment_status(raw.parse()?);
    }
    if let Some(customer_id) = query.customer_id {
        list_query = list_query.customer(customer_id);
    }

    let (total, invoices) = repo.list_invoices(list_query).map_err(|err| {
        log::error!("Failed to list invoices: {err}");
        err
    })?;

    let today = chrono::Utc::now().date_naive();
    let invoices = Paginated::new(
        invoices
            .into_iter()
            .map(|invoice| InvoiceSummary::new(invoice, today))
            .collect(),
        page,
        total.div_ceil(DEFAULT_ITEMS_PER_PAGE),
    );

    Ok(InvoicesPageData {
        invoices,
        status_filter,
        payment_filter,
        statuses: InvoicesPageData::status_names(),
        payment_statuses: InvoicesPageData::payment_status_names(),
    })
}

/// Loads the full invoice detail: charges with totals, transactions,
/// the cost block, wallet standing, and which actions the page may
/// offer.
pub fn load_invoice_page<R>(
    repo: &R,
    user: &AuthenticatedUser,
    invoice_id: i32,
) -> ServiceResult<InvoicePageData>
where
    R: InvoiceReader
        + CustomerReader
        + VehicleReader
        + TransactionReader
        + VendorReader
        + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let (invoice, charges) = repo
        .get_invoice_with_charges(invoice_id, user.branch_id)?
        .ok_or(ServiceError::NotFound)?;

    let customer = repo
        .get_customer_by_id(invoice.customer_id, user.branch_id)?
        .ok_or(ServiceError::NotFound)?;
    let vehicle = match invoice.vehicle_id {
        Some(vehicle_id) => repo.get_vehicle_by_id(vehicle_id, user.branch_id)?,
        None => None,
    };

    let transactions = repo.list_invoice_transactions(invoice.id)?;
    let cost_items = repo.list_cost_items(invoice.id)?;
    let vendors: Vec<_> = repo
        .list_vendors(user.branch_id)?
        .into_iter()
        .map(|(vendor, _)| vendor)
        .collect();
    let wallet_balance = repo.wallet_balance(invoice.customer_id)?;

    let currency = invoice.currency;
    let totals = compute_totals(&charges, invoice.tax_rate_bp, invoice.discount);
    let paid = paid_to_date(&transactions, invoice.id);
    let balance = balance_due(totals.total, paid);
    let summary = compute_cost_summary(&totals, &cost_items);

    let vendor_names: HashMap<i32, &str> = vendors
        .iter()
        .map(|vendor| (vendor.id, vendor.name.as_str()))
        .collect();
    let items = cost_items
        .into_iter()
        .map(|item| CostItemView {
            category_label: item.category.as_str().to_string(),
            vendor_name: item
                .vendor_id
                .and_then(|id| vendor_names.get(&id).map(|name| name.to_string())),
            amount_display: currency.format_minor(item.amount),
            item,
        })
        .collect();

    let is_admin = crate::routes::check_role(SERVICE_ADMIN_ROLE, &user.roles);
    let status = invoice.status;

    Ok(InvoicePageData {
        status_label: status.as_str().to_string(),
        payment_label: invoice.payment_status.as_str().to_string(),
        charges: charges
            .into_iter()
            .map(|charge| ChargeView::new(charge, currency))
            .collect(),
        totals: TotalsView::new(&totals, paid, balance, currency),
        transactions: transactions.into_iter().map(TransactionView::from).collect(),
        cost: CostView::new(items, &summary, currency),
        wallet_display: Currency::Jpy.format_minor(wallet_balance),
        wallet_balance,
        vendors,
        categories: category_names(),
        can_edit: status.allows_charge_edits(),
        can_submit: status == InvoiceStatus::Draft,
        can_approve: is_admin && status == InvoiceStatus::Pending,
        can_reject: is_admin && status == InvoiceStatus::Pending,
        can_finalize: is_admin && status == InvoiceStatus::Approved,
        can_pay: status.accepts_payments(),
        invoice,
        customer,
        vehicle,
    })
}

/// Creates a draft invoice, filling currency and tax rate from the
/// branch settings when the form leaves them blank.
pub fn add_invoice<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AddInvoiceForm,
) -> ServiceResult<Invoice>
where
    R: CustomerReader + VehicleReader + SettingsReader + InvoiceWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let customer = repo
        .get_customer_by_id(form.customer_id, user.branch_id)?
        .ok_or_else(|| ServiceError::Form("Unknown customer".to_string()))?;

    if let Some(vehicle_id) = form.vehicle_id
        && repo.get_vehicle_by_id(vehicle_id, user.branch_id)?.is_none()
    {
        return Err(ServiceError::Form("Unknown vehicle".to_string()));
    }

    let settings = repo.get_branch_settings(user.branch_id)?;
    let currency = if form.currency.trim().is_empty() {
        settings.default_currency
    } else {
        form.currency.parse()?
    };
    let tax_rate_bp = form.tax_rate_bp.unwrap_or(settings.default_tax_rate_bp);
    let issued_on = form
        .issued_on
        .unwrap_or_else(|| chrono::Utc::now().date_naive());

    let new_invoice = NewInvoice::new(
        user.branch_id,
        customer.id,
        form.vehicle_id,
        currency,
        tax_rate_bp,
        issued_on,
        form.due_on,
    )?;

    let invoice = repo.create_invoice(&new_invoice).map_err(|err| {
        log::error!("Failed to create invoice: {err}");
        err
    })?;

    Ok(invoice)
}

/// Replaces the charge rows of a draft invoice.
pub fn save_charges<R>(
    repo: &R,
    user: &AuthenticatedUser,
    invoice_id: i32,
    form: &ChargesForm,
) -> ServiceResult<()>
where
    R: InvoiceReader + InvoiceWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let invoice = get_branch_invoice(repo, user, invoice_id)?;
    guard_editable(&invoice)?;

    let charges = form.into_charges()?;

    repo.replace_charges(invoice.id, &charges).map_err(|err| {
        log::error!("Failed to replace charges: {err}");
        err
    })?;

    Ok(())
}

/// Sets the post-tax discount on a draft invoice.
pub fn save_discount<R>(
    repo: &R,
    user: &AuthenticatedUser,
    invoice_id: i32,
    form: DiscountForm,
) -> ServiceResult<()>
where
    R: InvoiceReader + InvoiceWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    if form.validate().is_err() {
        return Err(ServiceError::Form("Invalid form input".to_string()));
    }

    let invoice = get_branch_invoice(repo, user, invoice_id)?;
    guard_editable(&invoice)?;

    repo.set_discount(invoice.id, form.discount).map_err(|err| {
        log::error!("Failed to set discount: {err}");
        err
    })?;

    Ok(())
}

/// Submits a draft for review. An invoice with no charges cannot be
/// submitted.
pub fn submit_invoice<R>(repo: &R, user: &AuthenticatedUser, invoice_id: i32) -> ServiceResult<()>
where
    R: InvoiceReader + InvoiceWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let user_id = user.id().ok_or(ServiceError::Unauthorized)?;
    let (invoice, charges) = repo
        .get_invoice_with_charges(invoice_id, user.branch_id)?
        .ok_or(ServiceError::NotFound)?;

    guard_transition(&invoice, InvoiceStatus::Pending)?;
    if charges.is_empty() {
        return Err(ServiceError::Form(
            "An invoice needs at least one charge before submission".to_string(),
        ));
    }

    repo.set_invoice_status(
        invoice.id,
        InvoiceStatus::Draft,
        InvoiceStatus::Pending,
        user_id,
    )
    .map_err(|err| {
        log::error!("Failed to submit invoice: {err}");
        err
    })?;

    Ok(())
}

fn review_transition<R>(
    repo: &R,
    user: &AuthenticatedUser,
    invoice_id: i32,
    from: InvoiceStatus,
    to: InvoiceStatus,
) -> ServiceResult<()>
where
    R: InvoiceReader + InvoiceWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let user_id = user.id().ok_or(ServiceError::Unauthorized)?;
    let invoice = get_branch_invoice(repo, user, invoice_id)?;
    guard_transition(&invoice, to)?;

    repo.set_invoice_status(invoice.id, from, to, user_id)
        .map_err(|err| {
            log::error!("Failed to transition invoice: {err}");
            err
        })?;

    Ok(())
}

/// Approves a pending invoice, stamping the approver.
pub fn approve_invoice<R>(repo: &R, user: &AuthenticatedUser, invoice_id: i32) -> ServiceResult<()>
where
    R: InvoiceReader + InvoiceWriter + ?Sized,
{
    review_transition(
        repo,
        user,
        invoice_id,
        InvoiceStatus::Pending,
        InvoiceStatus::Approved,
    )
}

/// Sends a pending invoice back to draft for rework.
pub fn reject_invoice<R>(repo: &R, user: &AuthenticatedUser, invoice_id: i32) -> ServiceResult<()>
where
    R: InvoiceReader + InvoiceWriter + ?Sized,
{
    review_transition(
        repo,
        user,
        invoice_id,
        InvoiceStatus::Pending,
        InvoiceStatus::Draft,
    )
}

/// Finalizes an approved invoice, locking it permanently.
pub fn finalize_invoice<R>(repo: &R, user: &AuthenticatedUser, invoice_id: i32) -> ServiceResult<()>
where
    R: InvoiceReader + InvoiceWriter + ?Sized,
{
    review_transition(
        repo,
        user,
        invoice_id,
        InvoiceStatus::Approved,
        InvoiceStatus::Finalized,
    )
}

/// Records an incoming payment or an outgoing refund against the
/// invoice. Deposits and wallet moves have their own entry points.
pub fn add_payment<R>(
    repo: &R,
    user: &AuthenticatedUser,
    invoice_id: i32,
    form: PaymentForm,
) -> ServiceResult<()>
where
    R: InvoiceReader + TransactionWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    if form.validate().is_err() {
        return Err(ServiceError::Form("Invalid form input".to_string()));
    }

    let user_id = user.id().ok_or(ServiceError::Unauthorized)?;
    let invoice = get_branch_invoice(repo, user, invoice_id)?;
    if !invoice.status.accepts_payments() {
        return Err(ServiceError::Conflict(format!(
            "invoice {} is not approved for payment",
            invoice.number
        )));
    }

    let method: PaymentMethod = form.method.parse()?;
    let direction = match method {
        PaymentMethod::Wire | PaymentMethod::Cash => Direction::In,
        PaymentMethod::Refund => Direction::Out,
        PaymentMethod::Deposit | PaymentMethod::Wallet => {
            return Err(ServiceError::Form(
                "Deposits and wallet settlements are recorded elsewhere".to_string(),
            ));
        }
    };

    let note = form.note.trim();
    let note = (!note.is_empty()).then_some(note);
    let transaction = NewTransaction::new(
        user.branch_id,
        invoice.customer_id,
        Some(invoice.id),
        direction,
        method,
        form.amount,
        invoice.currency,
        note,
        user_id,
    )?;

    repo.record_payment(&transaction).map_err(|err| {
        log::error!("Failed to record payment: {err}");
        err
    })?;

    Ok(())
}

/// Settles part of the invoice from the customer's yen wallet. The
/// repository re-checks the balance inside its transaction; the check
/// here exists to give the user a readable message.
pub fn apply_wallet<R>(
    repo: &R,
    user: &AuthenticatedUser,
    invoice_id: i32,
    form: WalletApplyForm,
) -> ServiceResult<()>
where
    R: InvoiceReader + TransactionReader + TransactionWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    if form.validate().is_err() {
        return Err(ServiceError::Form("Invalid form input".to_string()));
    }

    let user_id = user.id().ok_or(ServiceError::Unauthorized)?;
    let invoice = get_branch_invoice(repo, user, invoice_id)?;
    if !invoice.status.accepts_payments() {
        return Err(ServiceError::Conflict(format!(
            "invoice {} is not approved for payment",
            invoice.number
        )));
    }
    if invoice.currency != Currency::Jpy {
        return Err(ServiceError::Form(
            "The wallet holds yen; this invoice is billed in another currency".to_string(),
        ));
    }

    let balance = repo.wallet_balance(invoice.customer_id)?;
    if form.amount > balance {
        return Err(ServiceError::Form(format!(
            "The wallet holds {}, less than the requested amount",
            Currency::Jpy.format_minor(balance)
        )));
    }

    repo.apply_wallet(invoice.customer_id, invoice.id, form.amount, user_id)
        .map_err(|err| {
            log::error!("Failed to apply wallet: {err}");
            err
        })?;

    Ok(())
}

/// Adds a cost item to the internal cost side of the deal. Costs track
/// spend, not billing, so the invoice status does not gate them.
pub fn add_cost_item<R>(
    repo: &R,
    user: &AuthenticatedUser,
    invoice_id: i32,
    form: AddCostItemForm,
) -> ServiceResult<()>
where
    R: InvoiceReader + VendorReader + InvoiceWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    if form.validate().is_err() {
        return Err(ServiceError::Form("Invalid form input".to_string()));
    }

    let invoice = get_branch_invoice(repo, user, invoice_id)?;

    if let Some(vendor_id) = form.vendor_id
        && repo.get_vendor_by_id(vendor_id, user.branch_id)?.is_none()
    {
        return Err(ServiceError::Form("Unknown vendor".to_string()));
    }

    let category: CostCategory = form.category.parse()?;
    let item = NewCostItem::new(
        invoice.id,
        form.vendor_id,
        category,
        &form.description,
        form.amount,
        form.incurred_on,
    )?;

    repo.add_cost_item(&item).map_err(|err| {
        log::error!("Failed to add cost item: {err}");
        err
    })?;

    Ok(())
}

pub fn delete_cost_item<R>(
    repo: &R,
    user: &AuthenticatedUser,
    invoice_id: i32,
    cost_item_id: i32,
) -> ServiceResult<()>
where
    R: InvoiceReader + InvoiceWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let invoice = get_branch_invoice(repo, user, invoice_id)?;

    repo.delete_cost_item(cost_item_id, invoice.id)
        .map_err(|err| {
            log::error!("Failed to delete cost item: {err}");
            err
        })?;

    Ok(())
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::invoice::PaymentStatus;
    use crate::repository::mock::MockRepository;

    fn staff_user() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "3".to_string(),
            email: "rep@example.com".to_string(),
            branch_id: 42,
            name: "Rep".to_string(),
            roles: vec![SERVICE_ACCESS_ROLE.to_string()],
            exp: 0,
        }
    }

    fn admin_user() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "1".to_string(),
            email: "admin@example.com".to_string(),
            branch_id: 42,
            name: "Admin".to_string(),
            roles: vec![
                SERVICE_ACCESS_ROLE.to_string(),
                SERVICE_ADMIN_ROLE.to_string(),
            ],
            exp: 0,
        }
    }

    fn build_invoice(id: i32, status: InvoiceStatus) -> Invoice {
        let now = NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Invoice {
            id,
            branch_id: 42,
            customer_id: 5,
            vehicle_id: None,
            number: format!("INV-2026-{id:04}"),
            status,
            payment_status: PaymentStatus::Unpaid,
            currency: Currency::Jpy,
            tax_rate_bp: 1000,
            discount: 0,
            issued_on: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            due_on: None,
            approved_by: None,
            finalized_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Charge edits are a draft-only operation.
    #[test]
    fn charges_refuse_a_pending_invoice() {
        let mut repo = MockRepository::new();
        repo.expect_get_invoice_by_id()
            .returning(|id, _| Ok(Some(build_invoice(id, InvoiceStatus::Pending))));
        repo.expect_replace_charges().times(0);

        let form = ChargesForm {
            description: vec!["Vehicle price".to_string()],
            quantity: vec![1],
            unit_amount: vec![1_200_000],
            taxable: vec!["true".to_string()],
        };

        let result = save_charges(&repo, &staff_user(), 1, &form);
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    /// A finalized invoice is locked, not merely conflicted.
    #[test]
    fn charges_report_finalized_as_locked() {
        let mut repo = MockRepository::new();
        repo.expect_get_invoice_by_id()
            .returning(|id, _| Ok(Some(build_invoice(id, InvoiceStatus::Finalized))));
        repo.expect_replace_charges().times(0);

        let form = ChargesForm {
            description: vec!["Vehicle price".to_string()],
            quantity: vec![1],
            unit_amount: vec![1_200_000],
            taxable: vec!["true".to_string()],
        };

        let result = save_charges(&repo, &staff_user(), 1, &form);
        assert!(matches!(result, Err(ServiceError::Locked)));
    }

    /// An empty draft cannot go out for review.
    #[test]
    fn submit_requires_at_least_one_charge() {
        let mut repo = MockRepository::new();
        repo.expect_get_invoice_with_charges()
            .returning(|id, _| Ok(Some((build_invoice(id, InvoiceStatus::Draft), vec![]))));
        repo.expect_set_invoice_status().times(0);

        let result = submit_invoice(&repo, &staff_user(), 1);
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    /// Approval is an admin action and runs as a compare-and-set from
    /// pending.
    #[test]
    fn approve_requires_admin() {
        let mut repo = MockRepository::new();
        repo.expect_get_invoice_by_id().times(0);
        repo.expect_set_invoice_status().times(0);

        let result = approve_invoice(&repo, &staff_user(), 1);
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn approve_moves_pending_to_approved() {
        let mut repo = MockRepository::new();
        repo.expect_get_invoice_by_id()
            .returning(|id, _| Ok(Some(build_invoice(id, InvoiceStatus::Pending))));
        repo.expect_set_invoice_status()
            .withf(|invoice_id, from, to, actor| {
                *invoice_id == 1
                    && *from == InvoiceStatus::Pending
                    && *to == InvoiceStatus::Approved
                    && *actor == 1
            })
            .times(1)
            .returning(|id, _, to, _| Ok(build_invoice(id, to)));

        approve_invoice(&repo, &admin_user(), 1).expect("should approve");
    }

    #[test]
    fn draft_cannot_be_finalized_directly() {
        let mut repo = MockRepository::new();
        repo.expect_get_invoice_by_id()
            .returning(|id, _| Ok(Some(build_invoice(id, InvoiceStatus::Draft))));
        repo.expect_set_invoice_status().times(0);

        let result = finalize_invoice(&repo, &admin_user(), 1);
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    /// Payments only land on approved or finalized invoices.
    #[test]
    fn payment_refuses_a_draft() {
        let mut repo = MockRepository::new();
        repo.expect_get_invoice_by_id()
            .returning(|id, _| Ok(Some(build_invoice(id, InvoiceStatus::Draft))));
        repo.expect_record_payment().times(0);

        let form = PaymentForm {
            amount: 100_000,
            method: "wire".to_string(),
            note: String::new(),
        };

        let result = add_payment(&repo, &staff_user(), 1, form);
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    /// A refund flows out; the method decides the direction.
    #[test]
    fn refund_is_recorded_outgoing() {
        let mut repo = MockRepository::new();
        repo.expect_get_invoice_by_id()
            .returning(|id, _| Ok(Some(build_invoice(id, InvoiceStatus::Finalized))));
        repo.expect_record_payment()
            .withf(|tx| {
                tx.direction == Direction::Out
                    && tx.method == PaymentMethod::Refund
                    && tx.invoice_id == Some(1)
            })
            .times(1)
            .returning(|tx| {
                Ok(crate::domain::transaction::Transaction {
                    id: 9,
                    branch_id: tx.branch_id,
                    customer_id: tx.customer_id,
                    invoice_id: tx.invoice_id,
                    direction: tx.direction,
                    method: tx.method,
                    amount: tx.amount,
                    currency: tx.currency,
                    reference: tx.reference.clone(),
                    note: tx.note.clone(),
                    created_by: tx.created_by,
                    created_at: NaiveDate::from_ymd_opt(2026, 1, 2)
                        .unwrap()
                        .and_hms_opt(0, 0, 0)
                        .unwrap(),
                })
            });

        let form = PaymentForm {
            amount: 50_000,
            method: "refund".to_string(),
            note: "overpayment returned".to_string(),
        };

        add_payment(&repo, &staff_user(), 1, form).expect("should record");
    }

    /// The deposit method cannot be smuggled through the payment form.
    #[test]
    fn payment_rejects_the_deposit_method() {
        let mut repo = MockRepository::new();
        repo.expect_get_invoice_by_id()
            .returning(|id, _| Ok(Some(build_invoice(id, InvoiceStatus::Approved))));
        repo.expect_record_payment().times(0);

        let form = PaymentForm {
            amount: 100_000,
            method: "deposit".to_string(),
            note: String::new(),
        };

        let result = add_payment(&repo, &staff_user(), 1, form);
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    /// Wallet settlement pre-checks the balance for a readable error.
    #[test]
    fn wallet_apply_refuses_to_overdraw() {
        let mut repo = MockRepository::new();
        repo.expect_get_invoice_by_id()
            .returning(|id, _| Ok(Some(build_invoice(id, InvoiceStatus::Approved))));
        repo.expect_wallet_balance()
            .times(1)
            .returning(|_| Ok(200_000));
        repo.expect_apply_wallet().times(0);

        let form = WalletApplyForm { amount: 300_000 };

        let result = apply_wallet(&repo, &staff_user(), 1, form);
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn wallet_apply_writes_the_pair() {
        let mut repo = MockRepository::new();
        repo.expect_get_invoice_by_id()
            .returning(|id, _| Ok(Some(build_invoice(id, InvoiceStatus::Approved))));
        repo.expect_wallet_balance()
            .times(1)
            .returning(|_| Ok(500_000));
        repo.expect_apply_wallet()
            .withf(|customer_id, invoice_id, amount, created_by| {
                *customer_id == 5 && *invoice_id == 1 && *amount == 300_000 && *created_by == 3
            })
            .times(1)
            .returning(|customer_id, invoice_id, amount, created_by| {
                let now = NaiveDate::from_ymd_opt(2026, 1, 2)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap();
                let out = crate::domain::transaction::Transaction {
                    id: 20,
                    branch_id: 42,
                    customer_id,
                    invoice_id: None,
                    direction: Direction::Out,
                    method: PaymentMethod::Wallet,
                    amount,
                    currency: Currency::Jpy,
                    reference: "ref-out".to_string(),
                    note: None,
                    created_by,
                    created_at: now,
                };
                let mut into = out.clone();
                into.id = 21;
                into.invoice_id = Some(invoice_id);
                into.direction = Direction::In;
                Ok((out, into))
            });

        let form = WalletApplyForm { amount: 300_000 };

        apply_wallet(&repo, &staff_user(), 1, form).expect("should settle");
    }
}
