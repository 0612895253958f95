//! Read-only customer portal. Every loader resolves the customer from
//! the portal claims and refuses rows that belong to anyone else.

use crate::domain::auth::PortalUser;
use crate::domain::customer::Customer;
use crate::domain::invoice::{InvoiceStatus, balance_due, compute_totals};
use crate::domain::transaction::paid_to_date;
use crate::domain::types::Currency;
use crate::dto::customer::TransactionView;
use crate::dto::invoice::{ChargeView, InvoiceSummary, TotalsView};
use crate::dto::portal::{PortalDashboard, PortalInvoicePage, PortalVehiclePage};
use crate::dto::vehicle::{StageEventView, VehicleProgress};
use crate::repository::{
    CustomerReader, DocumentReader, InvoiceListQuery, InvoiceReader, TransactionReader,
    VehicleListQuery, VehicleReader,
};
use crate::services::{ServiceError, ServiceResult};

/// Resolves the signed-in customer or refuses the token.
fn get_portal_customer<R>(repo: &R, portal_user: &PortalUser) -> ServiceResult<Customer>
where
    R: CustomerReader + ?Sized,
{
    let customer_id = portal_user
        .customer_id()
        .ok_or(ServiceError::Unauthorized)?;
    repo.get_customer_by_id(customer_id, portal_user.branch_id)?
        .ok_or(ServiceError::Unauthorized)
}

/// Drafts and pending invoices are internal; customers only see billing
/// that has been approved.
fn customer_visible(status: InvoiceStatus) -> bool {
    matches!(status, InvoiceStatus::Approved | InvoiceStatus::Finalized)
}

pub fn load_dashboard<R>(repo: &R, portal_user: &PortalUser) -> ServiceResult<PortalDashboard>
where
    R: CustomerReader + VehicleReader + InvoiceReader + TransactionReader + ?Sized,
{
    let customer = get_portal_customer(repo, portal_user)?;

    let wallet_balance = repo.wallet_balance(customer.id)?;
    let (_, vehicles) =
        repo.list_vehicles(VehicleListQuery::new(portal_user.branch_id).customer(customer.id))?;
    let (_, invoices) =
        repo.list_invoices(InvoiceListQuery::new(portal_user.branch_id).customer(customer.id))?;

    let today = chrono::Utc::now().date_naive();

    Ok(PortalDashboard {
        customer,
        wallet_display: Currency::Jpy.format_minor(wallet_balance),
        vehicles: vehicles.into_iter().map(VehicleProgress::from).collect(),
        invoices: invoices
            .into_iter()
            .filter(|invoice| customer_visible(invoice.status))
            .map(|invoice| InvoiceSummary::new(invoice, today))
            .collect(),
    })
}

/// A vehicle page, only for the customer the vehicle is assigned to.
pub fn load_vehicle<R>(
    repo: &R,
    portal_user: &PortalUser,
    vehicle_id: i32,
) -> ServiceResult<PortalVehiclePage>
where
    R: CustomerReader + VehicleReader + DocumentReader + ?Sized,
{
    let customer = get_portal_customer(repo, portal_user)?;

    let vehicle = repo
        .get_vehicle_by_id(vehicle_id, portal_user.branch_id)?
        .ok_or(ServiceError::NotFound)?;
    if vehicle.customer_id != Some(customer.id) {
        return Err(ServiceError::NotFound);
    }

    let history = repo
        .list_stage_events(vehicle.id)?
        .into_iter()
        .map(|(event, changed_by)| StageEventView::new(event, &changed_by))
        .collect();
    let documents = repo.list_vehicle_documents(vehicle.id)?;

    Ok(PortalVehiclePage {
        vehicle: VehicleProgress::from(vehicle),
        history,
        documents,
    })
}

/// An invoice page, only for the customer it is billed to.
pub fn load_invoice<R>(
    repo: &R,
    portal_user: &PortalUser,
    invoice_id: i32,
) -> ServiceResult<PortalInvoicePage>
where
    R: CustomerReader + InvoiceReader + TransactionReader + ?Sized,
{
    let customer = get_portal_customer(repo, portal_user)?;

    let (invoice, charges) = repo
        .get_invoice_with_charges(invoice_id, portal_user.branch_id)?
        .ok_or(ServiceError::NotFound)?;
    if invoice.customer_id != customer.id || !customer_visible(invoice.status) {
        return Err(ServiceError::NotFound);
    }

    let transactions = repo.list_invoice_transactions(invoice.id)?;

    let currency = invoice.currency;
    let totals = compute_totals(&charges, invoice.tax_rate_bp, invoice.discount);
    let paid = paid_to_date(&transactions, invoice.id);
    let balance = balance_due(totals.total, paid);

    let today = chrono::Utc::now().date_naive();

    Ok(PortalInvoicePage {
        invoice: InvoiceSummary::new(invoice, today),
        charges: charges
            .into_iter()
            .map(|charge| ChargeView::new(charge, currency))
            .collect(),
        totals: TotalsView::new(&totals, paid, balance, currency),
        transactions: transactions.into_iter().map(TransactionView::from).collect(),
    })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::PORTAL_ROLE;
    use crate::domain::vehicle::{ShippingStage, Vehicle};
    use crate::repository::mock::MockRepository;

    fn portal_user(customer_id: &str) -> PortalUser {
        PortalUser {
            sub: customer_id.to_string(),
            email: "tanaka@example.com".to_string(),
            branch_id: 42,
            name: "Tanaka".to_string(),
            role: PORTAL_ROLE.to_string(),
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
            name: "Tanaka".to_string(),
            email: Some("tanaka@example.com".to_string()),
            phone: None,
            address: None,
            country: None,
            portal_code: "K7KPXQ2M".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn build_invoice(id: i32, status: InvoiceStatus) -> crate::domain::invoice::Invoice {
        let now = NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        crate::domain::invoice::Invoice {
            id,
            branch_id: 42,
            customer_id: 5,
            vehicle_id: None,
            number: format!("INV-2026-{id:04}"),
            status,
            currency: crate::domain::types::Currency::Jpy,
            tax_rate_bp: 1000,
            discount: 0,
            payment_status: crate::domain::invoice::PaymentStatus::Unpaid,
            issued_on: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            due_on: None,
            approved_by: None,
            finalized_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn build_vehicle(id: i32, customer_id: Option<i32>) -> Vehicle {
        let now = NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Vehicle {
            id,
            branch_id: 42,
            customer_id,
            vin: "JT2BG22K123456789".to_string(),
            make: "Toyota".to_string(),
            model: "Corolla".to_string(),
            year: 2019,
            color: None,
            mileage_km: None,
            stage: ShippingStage::Shipped,
            created_at: now,
            updated_at: now,
        }
    }

    /// A token whose subject is not a number never reaches the store.
    #[test]
    fn garbled_subject_is_unauthorized() {
        let mut repo = MockRepository::new();
        repo.expect_get_customer_by_id().times(0);

        let result = load_dashboard(&repo, &portal_user("not-a-number"));
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    /// Another customer's vehicle reads as missing, not as forbidden.
    #[test]
    fn foreign_vehicle_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_customer_by_id()
            .returning(|id, _| Ok(Some(build_customer(id))));
        repo.expect_get_vehicle_by_id()
            .returning(|id, _| Ok(Some(build_vehicle(id, Some(99)))));
        repo.expect_list_stage_events().times(0);

        let result = load_vehicle(&repo, &portal_user("5"), 1);
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    /// An unassigned vehicle is invisible too.
    #[test]
    fn unassigned_vehicle_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_customer_by_id()
            .returning(|id, _| Ok(Some(build_customer(id))));
        repo.expect_get_vehicle_by_id()
            .returning(|id, _| Ok(Some(build_vehicle(id, None))));
        repo.expect_list_stage_events().times(0);

        let result = load_vehicle(&repo, &portal_user("5"), 1);
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    /// The dashboard queries are scoped to the signed-in customer.
    #[test]
    fn dashboard_is_scoped_to_the_customer() {
        let mut repo = MockRepository::new();
        repo.expect_get_customer_by_id()
            .withf(|id, branch_id| *id == 5 && *branch_id == 42)
            .times(1)
            .returning(|id, _| Ok(Some(build_customer(id))));
        repo.expect_wallet_balance()
            .withf(|customer_id| *customer_id == 5)
            .times(1)
            .returning(|_| Ok(250_000));
        repo.expect_list_vehicles()
            .withf(|query| query.customer_id == Some(5))
            .times(1)
            .returning(|_| Ok((1, vec![build_vehicle(1, Some(5))])));
        repo.expect_list_invoices()
            .withf(|query| query.customer_id == Some(5))
            .times(1)
            .returning(|_| Ok((0, vec![])));

        let page = load_dashboard(&repo, &portal_user("5")).expect("should load");

        assert_eq!(page.wallet_display, "¥250,000");
        assert_eq!(page.vehicles.len(), 1);
        assert!(page.invoices.is_empty());
    }

    /// Unapproved billing stays internal; the dashboard lists approved
    /// and finalized invoices only.
    #[test]
    fn dashboard_hides_draft_invoices() {
        let mut repo = MockRepository::new();
        repo.expect_get_customer_by_id()
            .returning(|id, _| Ok(Some(build_customer(id))));
        repo.expect_wallet_balance().returning(|_| Ok(0));
        repo.expect_list_vehicles().returning(|_| Ok((0, vec![])));
        repo.expect_list_invoices().returning(|_| {
            Ok((3, vec![
                build_invoice(1, InvoiceStatus::Draft),
                build_invoice(2, InvoiceStatus::Pending),
                build_invoice(3, InvoiceStatus::Approved),
            ]))
        });

        let page = load_dashboard(&repo, &portal_user("5")).expect("should load");

        assert_eq!(page.invoices.len(), 1);
        assert_eq!(page.invoices[0].invoice.id, 3);
    }

    /// A draft invoice cannot be opened through the portal even by the
    /// customer it belongs to.
    #[test]
    fn draft_invoice_page_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_customer_by_id()
            .returning(|id, _| Ok(Some(build_customer(id))));
        repo.expect_get_invoice_with_charges()
            .returning(|id, _| Ok(Some((build_invoice(id, InvoiceStatus::Draft), vec![]))));
        repo.expect_list_invoice_transactions().times(0);

        let result = load_invoice(&repo, &portal_user("5"), 1);
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }
}
