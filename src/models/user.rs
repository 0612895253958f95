use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::user::{NewUser as DomainNewUser, User as DomainUser};

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = crate::schema::users)]
pub struct User {
    pub id: i32,
    pub branch_id: i32,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    /// Comma-separated role list.
    pub roles: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub branch_id: i32,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub roles: String,
}

impl From<User> for DomainUser {
    fn from(user: User) -> Self {
        let roles = user
            .roles
            .split(',')
            .filter_map(|r| {
                let trimmed = r.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect();
        Self {
            id: user.id,
            branch_id: user.branch_id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            roles,
            created_at: user.created_at,
        }
    }
}

impl<'a> From<&'a DomainNewUser> for NewUser<'a> {
    fn from(user: &'a DomainNewUser) -> Self {
        Self {
            branch_id: user.branch_id,
            name: &user.name,
            email: &user.email,
            password_hash: &user.password_hash,
            roles: user.roles.join(","),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn roles_split_on_commas() {
        let row = User {
            id: 1,
            branch_id: 1,
            name: "Kenji".to_string(),
            email: "kenji@branch.jp".to_string(),
            password_hash: "hash".to_string(),
            roles: "crm, crm_admin,,".to_string(),
            created_at: NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        };
        let domain = DomainUser::from(row);
        assert_eq!(domain.roles, vec!["crm", "crm_admin"]);
    }

    #[test]
    fn roles_join_on_insert() {
        let domain = DomainNewUser::new(
            1,
            "Kenji",
            "kenji@branch.jp",
            "hash".to_string(),
            vec!["crm".to_string(), "crm_manager".to_string()],
        )
        .unwrap();
        let row = NewUser::from(&domain);
        assert_eq!(row.roles, "crm,crm_manager");
    }
}
