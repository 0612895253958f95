use serde::Deserialize;
use validator::Validate;

#[derive(Deserialize, Validate)]
/// Form data for registering a cost vendor.
pub struct AddVendorForm {
    /// Vendor display name.
    #[validate(length(min = 1))]
    pub name: String,
    /// Billing email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Cost category the vendor usually bills under.
    #[validate(length(min = 1))]
    pub category: String,
}
