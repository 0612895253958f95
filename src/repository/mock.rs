//! Mock repository implementations for isolating services in tests.

use mockall::mock;

use crate::domain::customer::{Customer, NewCustomer, UpdateCustomer};
use crate::domain::document::{Document, NewDocument};
use crate::domain::inquiry::{Inquiry, KanbanStage, NewInquiry, UpdateInquiry};
use crate::domain::invoice::{
    Charge, CostItem, Invoice, InvoiceStatus, NewCharge, NewCostItem, NewInvoice,
};
use crate::domain::settings::BranchSettings;
use crate::domain::transaction::{NewTransaction, Transaction};
use crate::domain::user::{NewUser, User};
use crate::domain::vehicle::{NewVehicle, ShippingStage, StageEvent, UpdateVehicle, Vehicle};
use crate::domain::vendor::{NewVendor, Vendor};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    CustomerListQuery, CustomerReader, CustomerWriter, DocumentReader, DocumentWriter,
    InquiryReader, InquiryWriter, InvoiceListQuery, InvoiceReader, InvoiceWriter, SettingsReader,
    SettingsWriter, TransactionReader, TransactionWriter, UserReader, UserWriter,
    VehicleListQuery, VehicleReader, VehicleWriter, VendorReader, VendorWriter,
};

mock! {
    pub Repository {}

    impl CustomerReader for Repository {
        fn get_customer_by_id(&self, id: i32, branch_id: i32) -> RepositoryResult<Option<Customer>>;
        fn get_customer_by_email(
            &self,
            email: &str,
            branch_id: i32,
        ) -> RepositoryResult<Option<Customer>>;
        fn get_customer_by_portal_code(
            &self,
            email: &str,
            code: &str,
        ) -> RepositoryResult<Option<Customer>>;
        fn list_customers(&self, query: CustomerListQuery) -> RepositoryResult<(usize, Vec<Customer>)>;
        fn list_customer_reps(&self, customer_id: i32) -> RepositoryResult<Vec<User>>;
        fn check_customer_assigned(&self, customer_id: i32, user_id: i32) -> RepositoryResult<bool>;
    }

    impl CustomerWriter for Repository {
        fn create_customers(&self, new_customers: &[NewCustomer]) -> RepositoryResult<usize>;
        fn update_customer(
            &self,
            customer_id: i32,
            updates: &UpdateCustomer,
        ) -> RepositoryResult<Customer>;
        fn delete_customer(&self, customer_id: i32) -> RepositoryResult<()>;
        fn set_portal_code(&self, customer_id: i32, code: &str) -> RepositoryResult<Customer>;
    }

    impl UserReader for Repository {
        fn get_user_by_id(&self, id: i32, branch_id: i32) -> RepositoryResult<Option<User>>;
        fn get_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
        fn list_users(&self, branch_id: i32) -> RepositoryResult<Vec<User>>;
        fn list_users_with_customers(
            &self,
            branch_id: i32,
        ) -> RepositoryResult<Vec<(User, Vec<Customer>)>>;
    }

    impl UserWriter for Repository {
        fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
        fn assign_customers_to_user(
            &self,
            user_id: i32,
            customer_ids: &[i32],
        ) -> RepositoryResult<usize>;
    }

    impl VehicleReader for Repository {
        fn get_vehicle_by_id(&self, id: i32, branch_id: i32) -> RepositoryResult<Option<Vehicle>>;
        fn list_vehicles(&self, query: VehicleListQuery) -> RepositoryResult<(usize, Vec<Vehicle>)>;
        fn list_stage_events(&self, vehicle_id: i32) -> RepositoryResult<Vec<(StageEvent, User)>>;
    }

    impl VehicleWriter for Repository {
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
        fn transition_stage(
            &self,
            vehicle_id: i32,
            to: ShippingStage,
            changed_by: i32,
            note: Option<&str>,
        ) -> RepositoryResult<Vehicle>;
    }

    impl InquiryReader for Repository {
        fn get_inquiry_by_id(&self, id: i32, branch_id: i32) -> RepositoryResult<Option<Inquiry>>;
        fn list_inquiries(&self, branch_id: i32) -> RepositoryResult<Vec<Inquiry>>;
    }

    impl InquiryWriter for Repository {
        fn create_inquiry(&self, new_inquiry: &NewInquiry) -> RepositoryResult<Inquiry>;
        fn update_inquiry(
            &self,
            inquiry_id: i32,
            updates: &UpdateInquiry,
        ) -> RepositoryResult<Inquiry>;
        fn move_inquiry(
            &self,
            inquiry_id: i32,
            stage: KanbanStage,
            assign: Option<Option<i32>>,
        ) -> RepositoryResult<Inquiry>;
    }

    impl InvoiceReader for Repository {
        fn get_invoice_by_id(&self, id: i32, branch_id: i32) -> RepositoryResult<Option<Invoice>>;
        fn get_invoice_with_charges(
            &self,
            id: i32,
            branch_id: i32,
        ) -> RepositoryResult<Option<(Invoice, Vec<Charge>)>>;
        fn list_invoices(&self, query: InvoiceListQuery) -> RepositoryResult<(usize, Vec<Invoice>)>;
        fn list_cost_items(&self, invoice_id: i32) -> RepositoryResult<Vec<CostItem>>;
        fn list_unsettled_invoices(&self) -> RepositoryResult<Vec<Invoice>>;
    }

    impl InvoiceWriter for Repository {
        fn create_invoice(&self, new_invoice: &NewInvoice) -> RepositoryResult<Invoice>;
        fn replace_charges(
            &self,
            invoice_id: i32,
            charges: &[NewCharge],
        ) -> RepositoryResult<Vec<Charge>>;
        fn set_discount(&self, invoice_id: i32, discount: i64) -> RepositoryResult<Invoice>;
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

    impl TransactionReader for Repository {
        fn list_customer_transactions(&self, customer_id: i32) -> RepositoryResult<Vec<Transaction>>;
        fn list_invoice_transactions(&self, invoice_id: i32) -> RepositoryResult<Vec<Transaction>>;
        fn wallet_balance(&self, customer_id: i32) -> RepositoryResult<i64>;
    }

    impl TransactionWriter for Repository {
        fn record_payment(&self, new_transaction: &NewTransaction) -> RepositoryResult<Transaction>;
        fn apply_wallet(
            &self,
            customer_id: i32,
            invoice_id: i32,
            amount: i64,
            created_by: i32,
        ) -> RepositoryResult<(Transaction, Transaction)>;
        fn record_deposit(&self, new_transaction: &NewTransaction) -> RepositoryResult<Transaction>;
    }

    impl VendorReader for Repository {
        fn get_vendor_by_id(&self, id: i32, branch_id: i32) -> RepositoryResult<Option<Vendor>>;
        fn list_vendors(&self, branch_id: i32) -> RepositoryResult<Vec<(Vendor, i64)>>;
    }

    impl VendorWriter for Repository {
        fn create_vendor(&self, new_vendor: &NewVendor) -> RepositoryResult<Vendor>;
    }

    impl DocumentReader for Repository {
        fn list_customer_documents(&self, customer_id: i32) -> RepositoryResult<Vec<Document>>;
        fn list_vehicle_documents(&self, vehicle_id: i32) -> RepositoryResult<Vec<Document>>;
    }

    impl DocumentWriter for Repository {
        fn create_document(&self, new_document: &NewDocument) -> RepositoryResult<Document>;
        fn delete_document(&self, document_id: i32, branch_id: i32) -> RepositoryResult<Document>;
    }

    impl SettingsReader for Repository {
        fn get_branch_settings(&self, branch_id: i32) -> RepositoryResult<BranchSettings>;
    }

    impl SettingsWriter for Repository {
        fn upsert_branch_settings(
            &self,
            settings: &BranchSettings,
        ) -> RepositoryResult<BranchSettings>;
    }
}
