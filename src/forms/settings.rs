use serde::Deserialize;
use validator::Validate;

#[derive(Deserialize, Validate)]
/// Form data for the branch defaults.
pub struct SaveSettingsForm {
    /// Default consumption tax rate in basis points.
    #[validate(range(min = 0, max = 10_000))]
    pub default_tax_rate_bp: i32,
    /// Default billing currency code.
    #[validate(length(min = 1))]
    pub default_currency: String,
    /// Days after issue before an invoice without a due date counts as
    /// overdue.
    #[validate(range(min = 1, max = 365))]
    pub overdue_after_days: i32,
}

#[derive(Deserialize, Validate)]
/// Form data for creating a staff user.
pub struct AddUserForm {
    /// Display name.
    #[validate(length(min = 1))]
    pub name: String,
    /// Sign-in email, unique across branches.
    #[validate(email)]
    pub email: String,
    /// Initial password, hashed with bcrypt before storage.
    #[validate(length(min = 8))]
    pub password: String,
    /// Role checkboxes.
    #[serde(default)]
    pub roles: Vec<String>,
}
