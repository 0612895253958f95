use serde::{Deserialize, Serialize};

/// Claims carried in the session token of a signed-in staff member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthenticatedUser {
    /// User id as a string.
    pub sub: String,
    pub email: String,
    pub branch_id: i32,
    pub name: String,
    pub roles: Vec<String>,
    pub exp: usize,
}

impl AuthenticatedUser {
    /// Numeric user id, when `sub` holds one.
    pub fn id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

/// Claims carried in the session token of a customer signed into the portal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortalUser {
    /// Customer id as a string.
    pub sub: String,
    pub email: String,
    pub branch_id: i32,
    pub name: String,
    /// Always `portal`. Staff tokens carry a `roles` list instead, so
    /// neither token decodes as the other.
    pub role: String,
    pub exp: usize,
}

impl PortalUser {
    pub fn customer_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

/// Returns true when `roles` contains `role`.
pub fn check_role(role: &str, roles: &[String]) -> bool {
    roles.iter().any(|r| r == role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_role_matches_exactly() {
        let roles = vec!["crm".to_string(), "crm_admin".to_string()];
        assert!(check_role("crm", &roles));
        assert!(check_role("crm_admin", &roles));
        assert!(!check_role("crm_manager", &roles));
        assert!(!check_role("admin", &roles));
    }

    #[test]
    fn user_id_parses_sub() {
        let user = AuthenticatedUser {
            sub: "42".to_string(),
            email: "a@b.c".to_string(),
            branch_id: 1,
            name: "A".to_string(),
            roles: vec![],
            exp: 0,
        };
        assert_eq!(user.id(), Some(42));
    }
}
