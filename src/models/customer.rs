use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::customer::{
    Customer as DomainCustomer, NewCustomer as DomainNewCustomer,
    UpdateCustomer as DomainUpdateCustomer,
};

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = crate::schema::customers)]
pub struct Customer {
    pub id: i32,
    pub branch_id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub portal_code: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::customers)]
pub struct NewCustomer<'a> {
    pub branch_id: i32,
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
    pub country: Option<&'a str>,
    pub portal_code: &'a str,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::customers)]
pub struct UpdateCustomer<'a> {
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
    pub country: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = crate::schema::customer_user)]
pub struct CustomerUser {
    pub customer_id: i32,
    pub user_id: i32,
}

impl From<Customer> for DomainCustomer {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id,
            branch_id: customer.branch_id,
            name: customer.name,
            email: customer.email,
            phone: customer.phone,
            address: customer.address,
            country: customer.country,
            portal_code: customer.portal_code,
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewCustomer> for NewCustomer<'a> {
    fn from(customer: &'a DomainNewCustomer) -> Self {
        Self {
            branch_id: customer.branch_id,
            name: &customer.name,
            email: customer.email.as_deref(),
            phone: customer.phone.as_deref(),
            address: customer.address.as_deref(),
            country: customer.country.as_deref(),
            portal_code: &customer.portal_code,
        }
    }
}

impl<'a> UpdateCustomer<'a> {
    pub fn new(update: &'a DomainUpdateCustomer, updated_at: NaiveDateTime) -> Self {
        Self {
            name: &update.name,
            email: update.email.as_deref(),
            phone: update.phone.as_deref(),
            address: update.address.as_deref(),
            country: update.country.as_deref(),
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn row_converts_to_domain() {
        let row = Customer {
            id: 5,
            branch_id: 1,
            name: "Sato Trading".to_string(),
            email: Some("info@sato.jp".to_string()),
            phone: None,
            address: None,
            country: Some("JP".to_string()),
            portal_code: "CODE123".to_string(),
            created_at: timestamp(),
            updated_at: timestamp(),
        };
        let domain = DomainCustomer::from(row);
        assert_eq!(domain.id, 5);
        assert_eq!(domain.email.as_deref(), Some("info@sato.jp"));
        assert_eq!(domain.portal_code, "CODE123");
    }

    #[test]
    fn insert_row_borrows_from_domain() {
        let domain = DomainNewCustomer::new(
            1,
            "Sato Trading",
            Some("info@sato.jp"),
            None,
            None,
            Some("JP"),
            "CODE123".to_string(),
        )
        .unwrap();
        let row = NewCustomer::from(&domain);
        assert_eq!(row.branch_id, 1);
        assert_eq!(row.name, "Sato Trading");
        assert_eq!(row.email, Some("info@sato.jp"));
        assert_eq!(row.portal_code, "CODE123");
    }
}
