use serde::Deserialize;
use validator::Validate;

#[derive(Deserialize, Validate)]
/// Form data for creating a customer.
pub struct AddCustomerForm {
    /// Display name, required.
    #[validate(length(min = 1))]
    pub name: String,
    /// Contact email, normalized on save.
    pub email: String,
    /// Contact phone, stored in E.164.
    pub phone: String,
    /// Mailing address.
    pub address: String,
    /// Destination country code or name.
    pub country: String,
}

#[derive(Deserialize, Validate)]
/// Form data for updating an existing customer.
pub struct SaveCustomerForm {
    /// Customer identifier.
    pub id: i32,
    /// Updated display name.
    #[validate(length(min = 1))]
    pub name: String,
    /// Updated email address.
    pub email: String,
    /// Updated contact phone number.
    pub phone: String,
    /// Updated mailing address.
    pub address: String,
    /// Updated country.
    pub country: String,
}

#[derive(Deserialize, Validate)]
/// Form data for recording a wallet deposit.
pub struct DepositForm {
    /// Deposited amount in yen.
    #[validate(range(min = 1))]
    pub amount: i64,
    /// Optional bookkeeping note.
    pub note: String,
}

#[derive(Deserialize, Validate)]
/// Form data for attaching a document link to a customer.
pub struct AddCustomerDocumentForm {
    /// Identifier of the customer that receives the document.
    pub id: i32,
    /// Document display name.
    #[validate(length(min = 1))]
    pub name: String,
    /// URL pointing to the stored document.
    #[validate(url)]
    pub url: String,
}
