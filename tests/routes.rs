use actix_web::http::{StatusCode, header};
use actix_web_flash_messages::Level;

use autolane_crm::domain::auth::AuthenticatedUser;
use autolane_crm::routes::{alert_level_to_str, ensure_role, redirect};
use autolane_crm::services::ServiceError;

fn staff(roles: &[&str]) -> AuthenticatedUser {
    AuthenticatedUser {
        sub: "1".to_string(),
        email: "rep@branch.jp".to_string(),
        branch_id: 1,
        name: "Rep".to_string(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        exp: usize::MAX,
    }
}

#[test]
fn alert_levels_map_to_bootstrap_classes() {
    assert_eq!(alert_level_to_str(&Level::Error), "danger");
    assert_eq!(alert_level_to_str(&Level::Warning), "warning");
    assert_eq!(alert_level_to_str(&Level::Success), "success");
    assert_eq!(alert_level_to_str(&Level::Info), "info");
    assert_eq!(alert_level_to_str(&Level::Debug), "info");
}

#[test]
fn redirect_is_a_see_other_with_location() {
    let response = redirect("/vehicles");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok());
    assert_eq!(location, Some("/vehicles"));
}

#[test]
fn ensure_role_accepts_only_holders() {
    let admin = staff(&["crm", "crm_admin"]);
    assert!(ensure_role(&admin, "crm").is_ok());
    assert!(ensure_role(&admin, "crm_admin").is_ok());

    let rep = staff(&["crm"]);
    assert!(matches!(
        ensure_role(&rep, "crm_admin"),
        Err(ServiceError::Unauthorized)
    ));

    let stranger = staff(&[]);
    assert!(matches!(
        ensure_role(&stranger, "crm"),
        Err(ServiceError::Unauthorized)
    ));
}
