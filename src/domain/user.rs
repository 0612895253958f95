use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{TypeConstraintError, normalize_email, sanitize_text};

/// A staff member of a branch. Roles are stored as a comma-separated list in
/// the database and split on load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i32,
    pub branch_id: i32,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub roles: Vec<String>,
    pub created_at: NaiveDateTime,
}

/// Payload for inserting a staff user. `password_hash` must already be a
/// bcrypt hash.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub branch_id: i32,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<String>,
}

impl NewUser {
    pub fn new(
        branch_id: i32,
        name: &str,
        email: &str,
        password_hash: String,
        roles: Vec<String>,
    ) -> Result<Self, TypeConstraintError> {
        let name = sanitize_text(name).ok_or(TypeConstraintError::EmptyString)?;
        let email = normalize_email(email)?;
        let roles = roles
            .into_iter()
            .filter_map(|r| {
                let trimmed = r.trim().to_string();
                if trimmed.is_empty() { None } else { Some(trimmed) }
            })
            .collect();
        Ok(Self {
            branch_id,
            name,
            email,
            password_hash,
            roles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_normalizes_email_and_roles() {
        let user = NewUser::new(
            1,
            "Kenji",
            " Kenji@Branch.JP ",
            "$2b$hash".to_string(),
            vec!["crm".to_string(), " crm_manager ".to_string(), "".to_string()],
        )
        .unwrap();
        assert_eq!(user.email, "kenji@branch.jp");
        assert_eq!(user.roles, vec!["crm", "crm_manager"]);
    }

    #[test]
    fn new_user_rejects_bad_email() {
        let err = NewUser::new(1, "Kenji", "nope", "h".to_string(), vec![]);
        assert_eq!(err.unwrap_err(), TypeConstraintError::InvalidEmail);
    }
}
