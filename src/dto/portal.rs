use crate::domain::customer::Customer;
use crate::domain::document::Document;
use crate::dto::customer::TransactionView;
use crate::dto::invoice::{ChargeView, InvoiceSummary, TotalsView};
use crate::dto::vehicle::{StageEventView, VehicleProgress};

/// Data required to render the customer portal dashboard.
pub struct PortalDashboard {
    pub customer: Customer,
    pub wallet_display: String,
    pub vehicles: Vec<VehicleProgress>,
    pub invoices: Vec<InvoiceSummary>,
}

/// Data required to render a vehicle inside the portal.
pub struct PortalVehiclePage {
    pub vehicle: VehicleProgress,
    pub history: Vec<StageEventView>,
    pub documents: Vec<Document>,
}

/// Data required to render an invoice inside the portal.
pub struct PortalInvoicePage {
    pub invoice: InvoiceSummary,
    pub charges: Vec<ChargeView>,
    pub totals: TotalsView,
    pub transactions: Vec<TransactionView>,
}
