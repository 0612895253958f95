//! Branch defaults and staff account management.

use validator::Validate;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::settings::{BranchSettings, UpdateBranchSettings};
use crate::domain::types::Currency;
use crate::domain::user::NewUser;
use crate::dto::settings::SettingsPageData;
use crate::forms::settings::{AddUserForm, SaveSettingsForm};
use crate::repository::{SettingsReader, SettingsWriter, UserReader, UserWriter};
use crate::routes::ensure_role;
use crate::services::{ServiceError, ServiceResult};
use crate::{SERVICE_ACCESS_ROLE, SERVICE_ADMIN_ROLE, SERVICE_MANAGER_ROLE};

const STAFF_ROLES: [&str; 3] = [
    SERVICE_ACCESS_ROLE,
    SERVICE_ADMIN_ROLE,
    SERVICE_MANAGER_ROLE,
];

pub fn load_settings_page<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<SettingsPageData>
where
    R: SettingsReader + UserReader + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let settings = repo.get_branch_settings(user.branch_id).map_err(|err| {
        log::error!("Failed to load branch settings: {err}");
        err
    })?;
    let users = repo.list_users(user.branch_id).map_err(|err| {
        log::error!("Failed to list users: {err}");
        err
    })?;

    Ok(SettingsPageData {
        settings,
        users,
        currencies: vec![Currency::Jpy.code(), Currency::Usd.code()],
        roles: STAFF_ROLES.to_vec(),
    })
}

pub fn save_settings<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: SaveSettingsForm,
) -> ServiceResult<()>
where
    R: SettingsWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    if form.validate().is_err() {
        return Err(ServiceError::Form("Invalid form input".to_string()));
    }

    let update = UpdateBranchSettings::new(
        form.default_tax_rate_bp,
        form.default_currency.parse()?,
        form.overdue_after_days,
    )?;
    let settings = BranchSettings {
        branch_id: user.branch_id,
        default_tax_rate_bp: update.default_tax_rate_bp,
        default_currency: update.default_currency,
        overdue_after_days: update.overdue_after_days,
    };

    repo.upsert_branch_settings(&settings).map_err(|err| {
        log::error!("Failed to save branch settings: {err}");
        err
    })?;

    Ok(())
}

/// Creates a staff user. Unknown role names are dropped and every new
/// account gets the base access role.
pub fn add_user<R>(repo: &R, user: &AuthenticatedUser, form: AddUserForm) -> ServiceResult<()>
where
    R: UserReader + UserWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    if form.validate().is_err() {
        return Err(ServiceError::Form("Invalid form input".to_string()));
    }

    if repo.get_user_by_email(&form.email)?.is_some() {
        return Err(ServiceError::Form(
            "A user with this email already exists".to_string(),
        ));
    }

    let mut roles: Vec<String> = form
        .roles
        .into_iter()
        .filter(|role| STAFF_ROLES.contains(&role.as_str()))
        .collect();
    if !roles.iter().any(|role| role == SERVICE_ACCESS_ROLE) {
        roles.push(SERVICE_ACCESS_ROLE.to_string());
    }

    let password_hash = bcrypt::hash(&form.password, bcrypt::DEFAULT_COST)
        .map_err(|err| ServiceError::Internal(format!("Failed to hash password: {err}")))?;
    let new_user = NewUser::new(user.branch_id, &form.name, &form.email, password_hash, roles)?;

    repo.create_user(&new_user).map_err(|err| {
        log::error!("Failed to create user: {err}");
        err
    })?;

    Ok(())
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;

    use crate::domain::user::User;
    use crate::repository::mock::MockRepository;

    fn admin_user() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "1".to_string(),
            email: "admin@example.com".to_string(),
            branch_id: 42,
            name: "Admin".to_string(),
            roles: vec![
                SERVICE_ACCESS_ROLE.to_string(),
                SERVICE_ADMIN_ROLE.to_string(),
            ],
            exp: 0,
        }
    }

    fn staff_user() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "3".to_string(),
            email: "rep@example.com".to_string(),
            branch_id: 42,
            name: "Rep".to_string(),
            roles: vec![SERVICE_ACCESS_ROLE.to_string()],
            exp: 0,
        }
    }

    fn build_user(id: i32, email: &str) -> User {
        User {
            id,
            branch_id: 42,
            name: "Someone".to_string(),
            email: email.to_string(),
            password_hash: "$2b$hash".to_string(),
            roles: vec![SERVICE_ACCESS_ROLE.to_string()],
            created_at: chrono::NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    /// Settings are admin-only.
    #[test]
    fn settings_page_requires_admin() {
        let mut repo = MockRepository::new();
        repo.expect_get_branch_settings().times(0);
        repo.expect_list_users().times(0);

        let result = load_settings_page(&repo, &staff_user());
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    /// The upsert carries the admin's branch, never one from the form.
    #[test]
    fn save_settings_targets_the_admin_branch() {
        let mut repo = MockRepository::new();
        repo.expect_upsert_branch_settings()
            .withf(|settings| {
                settings.branch_id == 42
                    && settings.default_tax_rate_bp == 800
                    && settings.default_currency == Currency::Usd
                    && settings.overdue_after_days == 45
            })
            .times(1)
            .returning(|settings| Ok(settings.clone()));

        let form = SaveSettingsForm {
            default_tax_rate_bp: 800,
            default_currency: "usd".to_string(),
            overdue_after_days: 45,
        };

        save_settings(&repo, &admin_user(), form).expect("should save");
    }

    #[test]
    fn save_settings_rejects_unknown_currency() {
        let mut repo = MockRepository::new();
        repo.expect_upsert_branch_settings().times(0);

        let form = SaveSettingsForm {
            default_tax_rate_bp: 1000,
            default_currency: "gold".to_string(),
            overdue_after_days: 30,
        };

        let result = save_settings(&repo, &admin_user(), form);
        assert!(matches!(result, Err(ServiceError::TypeConstraint(_))));
    }

    /// Duplicate emails are caught before the insert.
    #[test]
    fn add_user_refuses_a_taken_email() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_email()
            .returning(|email| Ok(Some(build_user(9, email))));
        repo.expect_create_user().times(0);

        let form = AddUserForm {
            name: "Kenji".to_string(),
            email: "kenji@branch.jp".to_string(),
            password: "hunter2hunter2".to_string(),
            roles: vec![],
        };

        let result = add_user(&repo, &admin_user(), form);
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    /// Unknown roles are dropped and the access role is always present.
    #[test]
    fn add_user_normalizes_the_role_set() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_email().returning(|_| Ok(None));
        repo.expect_create_user()
            .withf(|new_user| {
                new_user.roles.contains(&SERVICE_ACCESS_ROLE.to_string())
                    && new_user.roles.contains(&SERVICE_MANAGER_ROLE.to_string())
                    && !new_user.roles.iter().any(|role| role == "superuser")
            })
            .times(1)
            .returning(|new_user| {
                let mut user = build_user(10, &new_user.email);
                user.roles = new_user.roles.clone();
                Ok(user)
            });

        let form = AddUserForm {
            name: "Kenji".to_string(),
            email: "kenji@branch.jp".to_string(),
            password: "hunter2hunter2".to_string(),
            roles: vec![
                SERVICE_MANAGER_ROLE.to_string(),
                "superuser".to_string(),
            ],
        };

        add_user(&repo, &admin_user(), form).expect("should create");
    }
}
