use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::TypeConstraintError;
use crate::domain::vendor::{NewVendor as DomainNewVendor, Vendor as DomainVendor};

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = crate::schema::vendors)]
pub struct Vendor {
    pub id: i32,
    pub branch_id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub category: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::vendors)]
pub struct NewVendor<'a> {
    pub branch_id: i32,
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub category: &'a str,
}

impl TryFrom<Vendor> for DomainVendor {
    type Error = TypeConstraintError;

    fn try_from(vendor: Vendor) -> Result<Self, Self::Error> {
        Ok(Self {
            id: vendor.id,
            branch_id: vendor.branch_id,
            name: vendor.name,
            email: vendor.email,
            phone: vendor.phone,
            category: vendor.category.parse()?,
            created_at: vendor.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewVendor> for NewVendor<'a> {
    fn from(vendor: &'a DomainNewVendor) -> Self {
        Self {
            branch_id: vendor.branch_id,
            name: &vendor.name,
            email: vendor.email.as_deref(),
            phone: vendor.phone.as_deref(),
            category: vendor.category.as_str(),
        }
    }
}
