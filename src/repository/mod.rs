use crate::db::DbPool;
use crate::domain::customer::{Customer, NewCustomer, UpdateCustomer};
use crate::domain::document::{Document, NewDocument};
use crate::domain::inquiry::{Inquiry, KanbanStage, NewInquiry, UpdateInquiry};
use crate::domain::invoice::{
    Charge, CostItem, Invoice, InvoiceStatus, NewCharge, NewCostItem, NewInvoice, PaymentStatus,
};
use crate::domain::settings::BranchSettings;
use crate::domain::transaction::{NewTransaction, Transaction};
use crate::domain::user::{NewUser, User};
use crate::domain::vehicle::{NewVehicle, ShippingStage, StageEvent, UpdateVehicle, Vehicle};
use crate::domain::vendor::{NewVendor, Vendor};
use crate::repository::errors::{RepositoryError, RepositoryResult};

pub mod customer;
pub mod document;
pub mod errors;
pub mod inquiry;
pub mod invoice;
#[cfg(feature = "test-mocks")]
pub mod mock;
pub mod settings;
pub mod transaction;
pub mod user;
pub mod vehicle;
pub mod vendor;

/// Diesel-backed implementation of every repository trait, cloned freely
/// across workers since the pool is internally shared.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub(crate) fn conn(&self) -> Result<crate::db::DbConnection, RepositoryError> {
        self.pool.get().map_err(RepositoryError::from)
    }
}

#[derive(Debug, Clone)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

#[derive(Debug, Clone)]
pub struct CustomerListQuery {
    pub branch_id: i32,
    pub search: Option<String>,
    /// Restrict to customers assigned to this staff user.
    pub assigned_to: Option<i32>,
    pub pagination: Option<Pagination>,
}

impl CustomerListQuery {
    pub fn new(branch_id: i32) -> Self {
        Self {
            branch_id,
            search: None,
            assigned_to: None,
            pagination: None,
        }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn assigned_to(mut self, user_id: i32) -> Self {
        self.assigned_to = Some(user_id);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone)]
pub struct VehicleListQuery {
    pub branch_id: i32,
    pub stage: Option<ShippingStage>,
    pub customer_id: Option<i32>,
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl VehicleListQuery {
    pub fn new(branch_id: i32) -> Self {
        Self {
            branch_id,
            stage: None,
            customer_id: None,
            search: None,
            pagination: None,
        }
    }

    pub fn stage(mut self, stage: ShippingStage) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn customer(mut self, customer_id: i32) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone)]
pub struct InvoiceListQuery {
    pub branch_id: i32,
    pub status: Option<InvoiceStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub customer_id: Option<i32>,
    pub vehicle_id: Option<i32>,
    pub pagination: Option<Pagination>,
}

impl InvoiceListQuery {
    pub fn new(branch_id: i32) -> Self {
        Self {
            branch_id,
            status: None,
            payment_status: None,
            customer_id: None,
            vehicle_id: None,
            pagination: None,
        }
    }

    pub fn status(mut self, status: InvoiceStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn payment_status(mut self, payment_status: PaymentStatus) -> Self {
        self.payment_status = Some(payment_status);
        self
    }

    pub fn customer(mut self, customer_id: i32) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn vehicle(mut self, vehicle_id: i32) -> Self {
        self.vehicle_id = Some(vehicle_id);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

pub trait CustomerReader {
    fn get_customer_by_id(&self, id: i32, branch_id: i32) -> RepositoryResult<Option<Customer>>;
    fn get_customer_by_email(
        &self,
        email: &str,
        branch_id: i32,
    ) -> RepositoryResult<Option<Customer>>;
    /// Portal signin matches on email and access code together; the branch
    /// is not known until the customer is found.
    fn get_customer_by_portal_code(
        &self,
        email: &str,
        code: &str,
    ) -> RepositoryResult<Option<Customer>>;
    fn list_customers(&self, query: CustomerListQuery) -> RepositoryResult<(usize, Vec<Customer>)>;
    fn list_customer_reps(&self, customer_id: i32) -> RepositoryResult<Vec<User>>;
    fn check_customer_assigned(&self, customer_id: i32, user_id: i32) -> RepositoryResult<bool>;
}

pub trait CustomerWriter {
    fn create_customers(&self, new_customers: &[NewCustomer]) -> RepositoryResult<usize>;
    fn update_customer(
        &self,
        customer_id: i32,
        updates: &UpdateCustomer,
    ) -> RepositoryResult<Customer>;
    /// Refuses with a conflict while the customer still has invoices.
    fn delete_customer(&self, customer_id: i32) -> RepositoryResult<()>;
    fn set_portal_code(&self, customer_id: i32, code: &str) -> RepositoryResult<Customer>;
}

pub trait UserReader {
    fn get_user_by_id(&self, id: i32, branch_id: i32) -> RepositoryResult<Option<User>>;
    /// Emails are unique across branches; signin does not know the branch
    /// yet.
    fn get_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    fn list_users(&self, branch_id: i32) -> RepositoryResult<Vec<User>>;
    fn list_users_with_customers(
        &self,
        branch_id: i32,
    ) -> RepositoryResult<Vec<(User, Vec<Customer>)>>;
}

pub trait UserWriter {
    fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
    fn assign_customers_to_user(
        &self,
        user_id: i32,
        customer_ids: &[i32],
    ) -> RepositoryResult<usize>;
}

pub trait VehicleReader {
    fn get_vehicle_by_id(&self, id: i32, branch_id: i32) -> RepositoryResult<Option<Vehicle>>;
    fn list_vehicles(&self, query: VehicleListQuery) -> RepositoryResult<(usize, Vec<Vehicle>)>;
    /// Stage history newest first, with the user who made each change.
    fn list_stage_events(&self, vehicle_id: i32) -> RepositoryResult<Vec<(StageEvent, User)>>;
}

pub trait VehicleWriter {
    /// Inserts the vehicles and their initial stage events in one
    /// transaction.
    fn create_vehicles(
        &self,
        new_vehicles: &[NewVehicle],
        created_by: i32,
    ) -> RepositoryResult<usize>;
    fn update_vehicle(
        &self,
        vehicle_id: i32,
        updates: &UpdateVehicle,
    ) -> RepositoryResult<Vehicle>;
    fn assign_vehicle_to_customer(
        &self,
        vehicle_id: i32,
        customer_id: Option<i32>,
    ) -> RepositoryResult<Vehicle>;
    /// Moves the vehicle and appends the history event atomically.
    fn transition_stage(
        &self,
        vehicle_id: i32,
        to: ShippingStage,
        changed_by: i32,
        note: Option<&str>,
    ) -> RepositoryResult<Vehicle>;
}

pub trait InquiryReader {
    fn get_inquiry_by_id(&self, id: i32, branch_id: i32) -> RepositoryResult<Option<Inquiry>>;
    fn list_inquiries(&self, branch_id: i32) -> RepositoryResult<Vec<Inquiry>>;
}

pub trait InquiryWriter {
    fn create_inquiry(&self, new_inquiry: &NewInquiry) -> RepositoryResult<Inquiry>;
    fn update_inquiry(
        &self,
        inquiry_id: i32,
        updates: &UpdateInquiry,
    ) -> RepositoryResult<Inquiry>;
    /// Moves the card; `assign` of `None` leaves the assignment untouched,
    /// `Some(None)` clears it.
    fn move_inquiry(
        &self,
        inquiry_id: i32,
        stage: KanbanStage,
        assign: Option<Option<i32>>,
    ) -> RepositoryResult<Inquiry>;
}

pub trait InvoiceReader {
    fn get_invoice_by_id(&self, id: i32, branch_id: i32) -> RepositoryResult<Option<Invoice>>;
    fn get_invoice_with_charges(
        &self,
        id: i32,
        branch_id: i32,
    ) -> RepositoryResult<Option<(Invoice, Vec<Charge>)>>;
    fn list_invoices(&self, query: InvoiceListQuery) -> RepositoryResult<(usize, Vec<Invoice>)>;
    fn list_cost_items(&self, invoice_id: i32) -> RepositoryResult<Vec<CostItem>>;
    /// Finalized invoices not yet fully paid, across branches.
    fn list_unsettled_invoices(&self) -> RepositoryResult<Vec<Invoice>>;
}

pub trait InvoiceWriter {
    /// Assigns the per-branch, per-year number inside the insert
    /// transaction.
    fn create_invoice(&self, new_invoice: &NewInvoice) -> RepositoryResult<Invoice>;
    /// Replaces every charge row; conflicts unless the invoice is a draft.
    fn replace_charges(
        &self,
        invoice_id: i32,
        charges: &[NewCharge],
    ) -> RepositoryResult<Vec<Charge>>;
    fn set_discount(&self, invoice_id: i32, discount: i64) -> RepositoryResult<Invoice>;
    /// Compare-and-set transition; conflicts when the stored status is not
    /// `from`.
    fn set_invoice_status(
        &self,
        invoice_id: i32,
        from: InvoiceStatus,
        to: InvoiceStatus,
        actor: i32,
    ) -> RepositoryResult<Invoice>;
    fn add_cost_item(&self, new_item: &NewCostItem) -> RepositoryResult<CostItem>;
    fn delete_cost_item(&self, cost_item_id: i32, invoice_id: i32) -> RepositoryResult<()>;
}

pub trait TransactionReader {
    fn list_customer_transactions(&self, customer_id: i32) -> RepositoryResult<Vec<Transaction>>;
    fn list_invoice_transactions(&self, invoice_id: i32) -> RepositoryResult<Vec<Transaction>>;
    fn wallet_balance(&self, customer_id: i32) -> RepositoryResult<i64>;
}

pub trait TransactionWriter {
    /// Appends the row and, when it targets an invoice, recomputes that
    /// invoice's payment status in the same transaction.
    fn record_payment(&self, new_transaction: &NewTransaction) -> RepositoryResult<Transaction>;
    /// Writes the wallet-out and invoice-in pair atomically, re-checking the
    /// balance inside the transaction.
    fn apply_wallet(
        &self,
        customer_id: i32,
        invoice_id: i32,
        amount: i64,
        created_by: i32,
    ) -> RepositoryResult<(Transaction, Transaction)>;
    fn record_deposit(&self, new_transaction: &NewTransaction) -> RepositoryResult<Transaction>;
}

pub trait VendorReader {
    fn get_vendor_by_id(&self, id: i32, branch_id: i32) -> RepositoryResult<Option<Vendor>>;
    /// Vendors with the total cost amount billed through each.
    fn list_vendors(&self, branch_id: i32) -> RepositoryResult<Vec<(Vendor, i64)>>;
}

pub trait VendorWriter {
    fn create_vendor(&self, new_vendor: &NewVendor) -> RepositoryResult<Vendor>;
}

pub trait DocumentReader {
    fn list_customer_documents(&self, customer_id: i32) -> RepositoryResult<Vec<Document>>;
    fn list_vehicle_documents(&self, vehicle_id: i32) -> RepositoryResult<Vec<Document>>;
}

pub trait DocumentWriter {
    fn create_document(&self, new_document: &NewDocument) -> RepositoryResult<Document>;
    /// Removes the link and returns the deleted row so callers know what it
    /// was attached to.
    fn delete_document(&self, document_id: i32, branch_id: i32) -> RepositoryResult<Document>;
}

pub trait SettingsReader {
    /// Falls back to the defaults when the branch has no stored row.
    fn get_branch_settings(&self, branch_id: i32) -> RepositoryResult<BranchSettings>;
}

pub trait SettingsWriter {
    fn upsert_branch_settings(
        &self,
        settings: &BranchSettings,
    ) -> RepositoryResult<BranchSettings>;
}

