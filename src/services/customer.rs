//! Customer management: detail page, CRUD, wallet deposits, documents,
//! and portal access codes.

use rand::RngExt;
use rand::distr::Alphanumeric;
use validator::Validate;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::customer::{NewCustomer, UpdateCustomer};
use crate::domain::document::{Document, DocumentOwner, NewDocument};
use crate::domain::transaction::{Direction, NewTransaction, PaymentMethod};
use crate::domain::types::Currency;
use crate::dto::customer::{CustomerPageData, TransactionView};
use crate::dto::invoice::InvoiceSummary;
use crate::dto::vehicle::VehicleProgress;
use crate::forms::customer::{
    AddCustomerDocumentForm, AddCustomerForm, DepositForm, SaveCustomerForm,
};
use crate::repository::{
    CustomerReader, CustomerWriter, DocumentReader, DocumentWriter, InvoiceListQuery,
    InvoiceReader, TransactionReader, TransactionWriter, VehicleListQuery, VehicleReader,
};
use crate::routes::{check_role, ensure_role};
use crate::services::{ServiceError, ServiceResult};
use crate::{SERVICE_ACCESS_ROLE, SERVICE_ADMIN_ROLE};

const PORTAL_CODE_LEN: usize = 8;

/// Generates the code a customer pairs with their email to enter the
/// portal. Uppercase so it survives being read over the phone.
pub(crate) fn generate_portal_code() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(PORTAL_CODE_LEN)
        .map(|byte| char::from(byte).to_ascii_uppercase())
        .collect()
}

/// Loads everything the customer detail page shows: profile, reps,
/// wallet, vehicles, invoices, transactions, and documents.
pub fn load_customer_page<R>(
    repo: &R,
    user: &AuthenticatedUser,
    customer_id: i32,
) -> ServiceResult<CustomerPageData>
where
    R: CustomerReader
        + VehicleReader
        + InvoiceReader
        + TransactionReader
        + DocumentReader
        + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let customer = repo
        .get_customer_by_id(customer_id, user.branch_id)?
        .ok_or(ServiceError::NotFound)?;

    let reps = repo.list_customer_reps(customer.id)?;
    let wallet_balance = repo.wallet_balance(customer.id)?;
    let (_, vehicles) =
        repo.list_vehicles(VehicleListQuery::new(user.branch_id).customer(customer.id))?;
    let (_, invoices) =
        repo.list_invoices(InvoiceListQuery::new(user.branch_id).customer(customer.id))?;
    let transactions = repo.list_customer_transactions(customer.id)?;
    let documents = repo.list_customer_documents(customer.id)?;

    let today = chrono::Utc::now().date_naive();

    Ok(CustomerPageData {
        customer,
        reps,
        wallet_balance,
        wallet_display: Currency::Jpy.format_minor(wallet_balance),
        vehicles: vehicles.into_iter().map(VehicleProgress::from).collect(),
        invoices: invoices
            .into_iter()
            .map(|invoice| InvoiceSummary::new(invoice, today))
            .collect(),
        transactions: transactions.into_iter().map(TransactionView::from).collect(),
        documents,
    })
}

/// Creates a customer with a freshly issued portal code.
pub fn add_customer<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AddCustomerForm,
) -> ServiceResult<()>
where
    R: CustomerWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    if form.validate().is_err() {
        return Err(ServiceError::Form("Invalid form input".to_string()));
    }

    let new_customer = NewCustomer::new(
        user.branch_id,
        &form.name,
        Some(form.email.as_str()),
        Some(form.phone.as_str()),
        Some(form.address.as_str()),
        Some(form.country.as_str()),
        generate_portal_code(),
    )?;

    repo.create_customers(&[new_customer]).map_err(|err| {
        log::error!("Failed to add a customer: {err}");
        err
    })?;

    Ok(())
}

/// Saves profile edits. Admins may edit anyone; reps only customers
/// assigned to them.
pub fn save_customer<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: SaveCustomerForm,
) -> ServiceResult<()>
where
    R: CustomerReader + CustomerWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    if form.validate().is_err() {
        return Err(ServiceError::Form("Invalid form input".to_string()));
    }

    let customer = repo
        .get_customer_by_id(form.id, user.branch_id)?
        .ok_or(ServiceError::NotFound)?;

    if !check_role(SERVICE_ADMIN_ROLE, &user.roles) {
        let user_id = user.id().ok_or(ServiceError::Unauthorized)?;
        if !repo.check_customer_assigned(customer.id, user_id)? {
            return Err(ServiceError::Unauthorized);
        }
    }

    let updates = UpdateCustomer::new(
        &form.name,
        Some(form.email.as_str()),
        Some(form.phone.as_str()),
        Some(form.address.as_str()),
        Some(form.country.as_str()),
    )?;

    repo.update_customer(customer.id, &updates).map_err(|err| {
        log::error!("Failed to update customer: {err}");
        err
    })?;

    Ok(())
}

/// Deletes a customer. The repository refuses while invoices still
/// reference them; that surfaces as a conflict the route can flash.
pub fn delete_customer<R>(repo: &R, user: &AuthenticatedUser, customer_id: i32) -> ServiceResult<()>
where
    R: CustomerReader + CustomerWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    repo.get_customer_by_id(customer_id, user.branch_id)?
        .ok_or(ServiceError::NotFound)?;

    repo.delete_customer(customer_id).map_err(|err| {
        log::error!("Failed to delete customer: {err}");
        err
    })?;

    Ok(())
}

/// Issues a new portal code, invalidating the old one. Returns the code
/// so it can be shown to the staff member once.
pub fn rotate_portal_code<R>(
    repo: &R,
    user: &AuthenticatedUser,
    customer_id: i32,
) -> ServiceResult<String>
where
    R: CustomerReader + CustomerWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    repo.get_customer_by_id(customer_id, user.branch_id)?
        .ok_or(ServiceError::NotFound)?;

    let code = generate_portal_code();
    repo.set_portal_code(customer_id, &code).map_err(|err| {
        log::error!("Failed to rotate portal code: {err}");
        err
    })?;

    Ok(code)
}

/// Records a yen deposit into the customer's wallet.
pub fn add_deposit<R>(
    repo: &R,
    user: &AuthenticatedUser,
    customer_id: i32,
    form: DepositForm,
) -> ServiceResult<()>
where
    R: CustomerReader + TransactionWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    if form.validate().is_err() {
        return Err(ServiceError::Form("Invalid form input".to_string()));
    }

    let customer = repo
        .get_customer_by_id(customer_id, user.branch_id)?
        .ok_or(ServiceError::NotFound)?;
    let user_id = user.id().ok_or(ServiceError::Unauthorized)?;

    let deposit = NewTransaction::new(
        user.branch_id,
        customer.id,
        None,
        Direction::In,
        PaymentMethod::Deposit,
        form.amount,
        Currency::Jpy,
        Some(form.note.as_str()),
        user_id,
    )?;

    repo.record_deposit(&deposit).map_err(|err| {
        log::error!("Failed to record deposit: {err}");
        err
    })?;

    Ok(())
}

/// Attaches a document link to a customer.
pub fn add_customer_document<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AddCustomerDocumentForm,
) -> ServiceResult<()>
where
    R: CustomerReader + DocumentWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    if form.validate().is_err() {
        return Err(ServiceError::Form("Invalid form input".to_string()));
    }

    let customer = repo
        .get_customer_by_id(form.id, user.branch_id)?
        .ok_or(ServiceError::NotFound)?;
    let user_id = user.id().ok_or(ServiceError::Unauthorized)?;

    let document = NewDocument::new(
        user.branch_id,
        DocumentOwner::Customer(customer.id),
        &form.name,
        &form.url,
        user_id,
    )?;

    repo.create_document(&document).map_err(|err| {
        log::error!("Failed to attach document: {err}");
        err
    })?;

    Ok(())
}

/// Removes a document link and returns the deleted row so the caller
/// can route back to whatever it was attached to.
pub fn delete_document<R>(
    repo: &R,
    user: &AuthenticatedUser,
    document_id: i32,
) -> ServiceResult<Document>
where
    R: DocumentWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let document = repo
        .delete_document(document_id, user.branch_id)
        .map_err(|err| {
            log::error!("Failed to delete document: {err}");
            err
        })?;

    Ok(document)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::customer::Customer;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;

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

    fn rep_user() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "3".to_string(),
            email: "rep@example.com".to_string(),
            branch_id: 42,
            name: "Rep".to_string(),
            roles: vec![SERVICE_ACCESS_ROLE.to_string()],
            exp: 0,
        }
    }

    fn build_customer(id: i32) -> Customer {
        let now = NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Customer {
            id,
            branch_id: 42,
            name: "Okoye Motors".to_string(),
            email: Some("okoye@example.com".to_string()),
            phone: None,
            address: None,
            country: Some("NG".to_string()),
            portal_code: "AAAABBBB".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn portal_codes_are_uppercase_alphanumeric() {
        let code = generate_portal_code();
        assert_eq!(code.len(), PORTAL_CODE_LEN);
        assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    /// Creating customers is reserved to admins.
    #[test]
    fn add_customer_requires_admin() {
        let mut repo = MockRepository::new();
        repo.expect_create_customers().times(0);

        let form = AddCustomerForm {
            name: "Okoye Motors".to_string(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            country: String::new(),
        };

        let result = add_customer(&repo, &rep_user(), form);
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn add_customer_issues_a_portal_code() {
        let mut repo = MockRepository::new();
        repo.expect_create_customers()
            .withf(|customers| {
                customers.len() == 1 && customers[0].portal_code.len() == PORTAL_CODE_LEN
            })
            .times(1)
            .returning(|_| Ok(1));

        let form = AddCustomerForm {
            name: "Okoye Motors".to_string(),
            email: "okoye@example.com".to_string(),
            phone: String::new(),
            address: String::new(),
            country: "NG".to_string(),
        };

        add_customer(&repo, &admin_user(), form).expect("should create");
    }

    /// A rep may only save customers assigned to them.
    #[test]
    fn save_customer_checks_assignment_for_reps() {
        let mut repo = MockRepository::new();
        repo.expect_get_customer_by_id()
            .returning(|id, _| Ok(Some(build_customer(id))));
        repo.expect_check_customer_assigned()
            .withf(|customer_id, user_id| *customer_id == 5 && *user_id == 3)
            .times(1)
            .returning(|_, _| Ok(false));
        repo.expect_update_customer().times(0);

        let form = SaveCustomerForm {
            id: 5,
            name: "Okoye Motors".to_string(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            country: String::new(),
        };

        let result = save_customer(&repo, &rep_user(), form);
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn save_customer_skips_the_assignment_check_for_admins() {
        let mut repo = MockRepository::new();
        repo.expect_get_customer_by_id()
            .returning(|id, _| Ok(Some(build_customer(id))));
        repo.expect_check_customer_assigned().times(0);
        repo.expect_update_customer()
            .withf(|customer_id, updates| *customer_id == 5 && updates.name == "Okoye Exports")
            .times(1)
            .returning(|id, _| Ok(build_customer(id)));

        let form = SaveCustomerForm {
            id: 5,
            name: "Okoye Exports".to_string(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            country: String::new(),
        };

        save_customer(&repo, &admin_user(), form).expect("should save");
    }

    /// The delete conflict from the repository reaches the caller intact.
    #[test]
    fn delete_customer_surfaces_the_invoice_conflict() {
        let mut repo = MockRepository::new();
        repo.expect_get_customer_by_id()
            .returning(|id, _| Ok(Some(build_customer(id))));
        repo.expect_delete_customer()
            .times(1)
            .returning(|_| Err(RepositoryError::Conflict("customer still has invoices".into())));

        let result = delete_customer(&repo, &admin_user(), 5);
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn rotate_returns_the_fresh_code() {
        let mut repo = MockRepository::new();
        repo.expect_get_customer_by_id()
            .returning(|id, _| Ok(Some(build_customer(id))));
        repo.expect_set_portal_code()
            .withf(|customer_id, code| *customer_id == 5 && code.len() == PORTAL_CODE_LEN)
            .times(1)
            .returning(|id, _| Ok(build_customer(id)));

        let code = rotate_portal_code(&repo, &admin_user(), 5).expect("should rotate");
        assert_eq!(code.len(), PORTAL_CODE_LEN);
    }

    /// Deposits land in the wallet: direction in, no invoice, yen.
    #[test]
    fn deposit_is_recorded_unlinked() {
        let mut repo = MockRepository::new();
        repo.expect_get_customer_by_id()
            .returning(|id, _| Ok(Some(build_customer(id))));
        repo.expect_record_deposit()
            .withf(|tx| {
                tx.customer_id == 5
                    && tx.invoice_id.is_none()
                    && tx.direction == Direction::In
                    && tx.method == PaymentMethod::Deposit
                    && tx.amount == 500_000
                    && tx.currency == Currency::Jpy
            })
            .times(1)
            .returning(|tx| {
                Ok(crate::domain::transaction::Transaction {
                    id: 1,
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
                    created_at: NaiveDate::from_ymd_opt(2026, 1, 1)
                        .unwrap()
                        .and_hms_opt(0, 0, 0)
                        .unwrap(),
                })
            });

        let form = DepositForm {
            amount: 500_000,
            note: "wire from Lagos".to_string(),
        };

        add_deposit(&repo, &rep_user(), 5, form).expect("should record");
    }

    #[test]
    fn deposit_rejects_non_positive_amounts() {
        let mut repo = MockRepository::new();
        repo.expect_get_customer_by_id().times(0);
        repo.expect_record_deposit().times(0);

        let form = DepositForm {
            amount: 0,
            note: String::new(),
        };

        let result = add_deposit(&repo, &rep_user(), 5, form);
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }
}
