//! Repository implementation for customers.

use chrono::Utc;
use diesel::prelude::*;

use crate::domain::customer::{Customer, NewCustomer, UpdateCustomer};
use crate::domain::user::User;
use crate::models::customer::{
    Customer as DbCustomer, NewCustomer as DbNewCustomer, UpdateCustomer as DbUpdateCustomer,
};
use crate::models::user::User as DbUser;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{CustomerListQuery, CustomerReader, CustomerWriter, DieselRepository};

impl CustomerReader for DieselRepository {
    fn get_customer_by_id(&self, id: i32, branch_id: i32) -> RepositoryResult<Option<Customer>> {
        use crate::schema::customers;

        let mut conn = self.conn()?;
        let customer = customers::table
            .find(id)
            .filter(customers::branch_id.eq(branch_id))
            .first::<DbCustomer>(&mut conn)
            .optional()?;

        Ok(customer.map(Into::into))
    }

    fn get_customer_by_email(
        &self,
        email: &str,
        branch_id: i32,
    ) -> RepositoryResult<Option<Customer>> {
        use crate::schema::customers;

        let mut conn = self.conn()?;
        let customer = customers::table
            .filter(customers::email.eq(email))
            .filter(customers::branch_id.eq(branch_id))
            .first::<DbCustomer>(&mut conn)
            .optional()?;

        Ok(customer.map(Into::into))
    }

    fn get_customer_by_portal_code(
        &self,
        email: &str,
        code: &str,
    ) -> RepositoryResult<Option<Customer>> {
        use crate::schema::customers;

        let mut conn = self.conn()?;
        let customer = customers::table
            .filter(customers::email.eq(email))
            .filter(customers::portal_code.eq(code))
            .first::<DbCustomer>(&mut conn)
            .optional()?;

        Ok(customer.map(Into::into))
    }

    fn list_customers(
        &self,
        query: CustomerListQuery,
    ) -> RepositoryResult<(usize, Vec<Customer>)> {
        use crate::schema::{customer_user, customers};

        let mut conn = self.conn()?;

        let build_query = || {
            let mut q = customers::table
                .into_boxed()
                .filter(customers::branch_id.eq(query.branch_id));

            if let Some(term) = &query.search {
                let pattern = format!("%{term}%");
                q = q.filter(
                    customers::name
                        .like(pattern.clone())
                        .or(customers::email.like(pattern.clone()))
                        .or(customers::phone.like(pattern.clone()))
                        .or(customers::country.like(pattern)),
                );
            }

            if let Some(user_id) = query.assigned_to {
                let assigned = customer_user::table
                    .filter(customer_user::user_id.eq(user_id))
                    .select(customer_user::customer_id);
                q = q.filter(customers::id.eq_any(assigned));
            }

            q
        };

        let total: i64 = build_query().count().get_result(&mut conn)?;

        let mut page_query = build_query().order(customers::name.asc());
        if let Some(pagination) = &query.pagination {
            let page = pagination.page.max(1);
            page_query = page_query
                .limit(pagination.per_page as i64)
                .offset(((page - 1) * pagination.per_page) as i64);
        }

        let items = page_query
            .load::<DbCustomer>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok((total as usize, items))
    }

    fn list_customer_reps(&self, customer_id: i32) -> RepositoryResult<Vec<User>> {
        use crate::schema::{customer_user, users};

        let mut conn = self.conn()?;
        let reps = users::table
            .inner_join(customer_user::table)
            .filter(customer_user::customer_id.eq(customer_id))
            .order(users::name.asc())
            .select(users::all_columns)
            .load::<DbUser>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(reps)
    }

    fn check_customer_assigned(&self, customer_id: i32, user_id: i32) -> RepositoryResult<bool> {
        use crate::schema::customer_user;

        let mut conn = self.conn()?;
        let count: i64 = customer_user::table
            .filter(customer_user::customer_id.eq(customer_id))
            .filter(customer_user::user_id.eq(user_id))
            .count()
            .get_result(&mut conn)?;

        Ok(count > 0)
    }
}

impl CustomerWriter for DieselRepository {
    fn create_customers(&self, new_customers: &[NewCustomer]) -> RepositoryResult<usize> {
        use crate::schema::customers;

        let mut conn = self.conn()?;
        let insertables: Vec<DbNewCustomer> = new_customers.iter().map(Into::into).collect();
        let affected = diesel::insert_into(customers::table)
            .values(&insertables)
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn update_customer(
        &self,
        customer_id: i32,
        updates: &UpdateCustomer,
    ) -> RepositoryResult<Customer> {
        use crate::schema::customers;

        let mut conn = self.conn()?;
        let db_updates = DbUpdateCustomer::new(updates, Utc::now().naive_utc());

        let updated = diesel::update(customers::table.find(customer_id))
            .set(&db_updates)
            .get_result::<DbCustomer>(&mut conn)?;

        Ok(updated.into())
    }

    fn delete_customer(&self, customer_id: i32) -> RepositoryResult<()> {
        use crate::schema::{customer_user, customers, invoices};

        let mut conn = self.conn()?;

        conn.transaction::<(), RepositoryError, _>(|conn| {
            let invoice_count: i64 = invoices::table
                .filter(invoices::customer_id.eq(customer_id))
                .count()
                .get_result(conn)?;
            if invoice_count > 0 {
                return Err(RepositoryError::Conflict(
                    "customer still has invoices".to_string(),
                ));
            }

            diesel::delete(
                customer_user::table.filter(customer_user::customer_id.eq(customer_id)),
            )
            .execute(conn)?;
            let deleted =
                diesel::delete(customers::table.find(customer_id)).execute(conn)?;
            if deleted == 0 {
                return Err(RepositoryError::NotFound);
            }
            Ok(())
        })
    }

    fn set_portal_code(&self, customer_id: i32, code: &str) -> RepositoryResult<Customer> {
        use crate::schema::customers;

        let mut conn = self.conn()?;
        let updated = diesel::update(customers::table.find(customer_id))
            .set((
                customers::portal_code.eq(code),
                customers::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<DbCustomer>(&mut conn)?;

        Ok(updated.into())
    }
}
