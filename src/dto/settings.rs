use crate::domain::settings::BranchSettings;
use crate::domain::user::User;

/// Data required to render the settings page.
pub struct SettingsPageData {
    pub settings: BranchSettings,
    pub users: Vec<User>,
    pub currencies: Vec<&'static str>,
    /// Assignable staff roles for the add-user checkboxes.
    pub roles: Vec<&'static str>,
}
