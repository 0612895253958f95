use serde::Serialize;

use crate::domain::vendor::Vendor;

/// A vendor with its lifetime billed total. Vendor costs are local
/// services paid in yen.
#[derive(Debug, Clone, Serialize)]
pub struct VendorRow {
    pub vendor: Vendor,
    pub category_label: String,
    pub billed_display: String,
}

/// Data required to render the vendors page.
pub struct VendorsPageData {
    pub vendors: Vec<VendorRow>,
    pub categories: Vec<&'static str>,
}
