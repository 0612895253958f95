//! Repository implementation for cost vendors.

use std::collections::HashMap;

use diesel::prelude::*;

use crate::domain::types::TypeConstraintError;
use crate::domain::vendor::{NewVendor, Vendor};
use crate::models::vendor::{NewVendor as DbNewVendor, Vendor as DbVendor};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, VendorReader, VendorWriter};

impl VendorReader for DieselRepository {
    fn get_vendor_by_id(&self, id: i32, branch_id: i32) -> RepositoryResult<Option<Vendor>> {
        use crate::schema::vendors;

        let mut conn = self.conn()?;
        let vendor = vendors::table
            .find(id)
            .filter(vendors::branch_id.eq(branch_id))
            .first::<DbVendor>(&mut conn)
            .optional()?;

        vendor
            .map(Vendor::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_vendors(&self, branch_id: i32) -> RepositoryResult<Vec<(Vendor, i64)>> {
        use crate::schema::{cost_items, vendors};

        let mut conn = self.conn()?;

        let vendor_rows = vendors::table
            .filter(vendors::branch_id.eq(branch_id))
            .order(vendors::name.asc())
            .load::<DbVendor>(&mut conn)?;

        let billed_pairs = cost_items::table
            .filter(cost_items::vendor_id.is_not_null())
            .select((cost_items::vendor_id, cost_items::amount))
            .load::<(Option<i32>, i64)>(&mut conn)?;

        let mut billed: HashMap<i32, i64> = HashMap::new();
        for (vendor_id, amount) in billed_pairs {
            if let Some(vendor_id) = vendor_id {
                *billed.entry(vendor_id).or_default() += amount;
            }
        }

        vendor_rows
            .into_iter()
            .map(|row| {
                let total = billed.get(&row.id).copied().unwrap_or_default();
                Ok((Vendor::try_from(row)?, total))
            })
            .collect::<Result<Vec<_>, TypeConstraintError>>()
            .map_err(RepositoryError::from)
    }
}

impl VendorWriter for DieselRepository {
    fn create_vendor(&self, new_vendor: &NewVendor) -> RepositoryResult<Vendor> {
        use crate::schema::vendors;

        let mut conn = self.conn()?;
        let created = diesel::insert_into(vendors::table)
            .values(DbNewVendor::from(new_vendor))
            .get_result::<DbVendor>(&mut conn)?;

        Vendor::try_from(created).map_err(RepositoryError::from)
    }
}
