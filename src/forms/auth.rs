use serde::Deserialize;
use validator::Validate;

#[derive(Deserialize, Validate)]
/// Credentials submitted by the staff sign-in form.
pub struct SignInForm {
    /// Staff email address.
    #[validate(email)]
    pub email: String,
    /// Plain-text password, verified against the stored bcrypt hash.
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Deserialize, Validate)]
/// Email and access code submitted by the customer portal sign-in form.
pub struct PortalSignInForm {
    /// Email the customer is registered under.
    #[validate(email)]
    pub email: String,
    /// Portal access code handed out by the branch.
    #[validate(length(min = 1))]
    pub code: String,
}
