//! Sign-in flows for staff and portal customers.

use bcrypt::verify;

use crate::auth::{create_token, portal_claims, staff_claims};
use crate::domain::types::normalize_email;
use crate::forms::auth::{PortalSignInForm, SignInForm};
use crate::repository::{CustomerReader, UserReader};
use crate::services::{ServiceError, ServiceResult};

/// Verifies staff credentials and returns a signed session token.
/// Every failure mode collapses into `Unauthorized` so the signin page
/// never reveals which part was wrong.
pub fn signin<R>(repo: &R, form: &SignInForm, secret: &str, ttl_days: i64) -> ServiceResult<String>
where
    R: UserReader + ?Sized,
{
    let email = normalize_email(&form.email).map_err(|_| ServiceError::Unauthorized)?;

    let user = repo
        .get_user_by_email(&email)
        .map_err(|err| {
            log::error!("Failed to look up user: {err}");
            err
        })?
        .ok_or(ServiceError::Unauthorized)?;

    let password_matches = verify(&form.password, &user.password_hash)
        .map_err(|err| ServiceError::Internal(err.to_string()))?;
    if !password_matches {
        return Err(ServiceError::Unauthorized);
    }

    let claims = staff_claims(&user, ttl_days);
    create_token(&claims, secret).map_err(|err| ServiceError::Internal(err.to_string()))
}

/// Signs a customer into the portal with their email and access code.
pub fn portal_signin<R>(
    repo: &R,
    form: &PortalSignInForm,
    secret: &str,
    ttl_days: i64,
) -> ServiceResult<String>
where
    R: CustomerReader + ?Sized,
{
    let email = normalize_email(&form.email).map_err(|_| ServiceError::Unauthorized)?;
    // Codes are issued uppercase; accept however the customer typed it.
    let code = form.code.trim().to_uppercase();
    if code.is_empty() {
        return Err(ServiceError::Unauthorized);
    }

    let customer = repo
        .get_customer_by_portal_code(&email, &code)
        .map_err(|err| {
            log::error!("Failed to look up portal customer: {err}");
            err
        })?
        .ok_or(ServiceError::Unauthorized)?;

    let claims = portal_claims(&customer, ttl_days);
    create_token(&claims, secret).map_err(|err| ServiceError::Internal(err.to_string()))
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::customer::Customer;
    use crate::domain::user::User;
    use crate::repository::mock::MockRepository;

    fn timestamp() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn staff_user(password_hash: &str) -> User {
        User {
            id: 1,
            branch_id: 42,
            name: "Aiko".to_string(),
            email: "aiko@example.com".to_string(),
            password_hash: password_hash.to_string(),
            roles: vec!["crm".to_string()],
            created_at: timestamp(),
        }
    }

    fn portal_customer() -> Customer {
        Customer {
            id: 7,
            branch_id: 42,
            name: "Achterberg BV".to_string(),
            email: Some("fleet@achterberg.example".to_string()),
            phone: None,
            address: None,
            country: Some("NL".to_string()),
            portal_code: "K7KPXQ2M".to_string(),
            created_at: timestamp(),
            updated_at: timestamp(),
        }
    }

    /// A valid password must produce a token that carries the user.
    #[test]
    fn signin_accepts_valid_credentials() {
        let hash = bcrypt::hash("hunter2hunter2", bcrypt::DEFAULT_COST).expect("hash");
        let user = staff_user(&hash);

        let mut repo = MockRepository::new();
        repo.expect_get_user_by_email()
            .withf(|email| email == "aiko@example.com")
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let form = SignInForm {
            email: "Aiko@Example.com".to_string(),
            password: "hunter2hunter2".to_string(),
        };

        let token = signin(&repo, &form, "secret", 7).expect("should sign in");
        assert!(!token.is_empty());
    }

    /// A wrong password is indistinguishable from an unknown account.
    #[test]
    fn signin_rejects_wrong_password() {
        let hash = bcrypt::hash("correct-horse", bcrypt::DEFAULT_COST).expect("hash");
        let user = staff_user(&hash);

        let mut repo = MockRepository::new();
        repo.expect_get_user_by_email()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let form = SignInForm {
            email: "aiko@example.com".to_string(),
            password: "battery-staple".to_string(),
        };

        let result = signin(&repo, &form, "secret", 7);
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn signin_rejects_unknown_email() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_email().times(1).returning(|_| Ok(None));

        let form = SignInForm {
            email: "nobody@example.com".to_string(),
            password: "whatever".to_string(),
        };

        let result = signin(&repo, &form, "secret", 7);
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    /// The access code is matched case-insensitively against the stored
    /// uppercase form.
    #[test]
    fn portal_signin_uppercases_the_code() {
        let customer = portal_customer();

        let mut repo = MockRepository::new();
        repo.expect_get_customer_by_portal_code()
            .withf(|email, code| email == "fleet@achterberg.example" && code == "K7KPXQ2M")
            .times(1)
            .returning(move |_, _| Ok(Some(customer.clone())));

        let form = PortalSignInForm {
            email: "fleet@achterberg.example".to_string(),
            code: "k7kpxq2m".to_string(),
        };

        let token = portal_signin(&repo, &form, "secret", 7).expect("should sign in");
        assert!(!token.is_empty());
    }

    #[test]
    fn portal_signin_rejects_bad_code() {
        let mut repo = MockRepository::new();
        repo.expect_get_customer_by_portal_code()
            .times(1)
            .returning(|_, _| Ok(None));

        let form = PortalSignInForm {
            email: "fleet@achterberg.example".to_string(),
            code: "WRONG".to_string(),
        };

        let result = portal_signin(&repo, &form, "secret", 7);
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn portal_signin_rejects_empty_code() {
        let mut repo = MockRepository::new();
        repo.expect_get_customer_by_portal_code().times(0);

        let form = PortalSignInForm {
            email: "fleet@achterberg.example".to_string(),
            code: "   ".to_string(),
        };

        let result = portal_signin(&repo, &form, "secret", 7);
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }
}
