//! Repository implementation for staff users.

use std::collections::HashMap;

use diesel::prelude::*;

use crate::domain::customer::Customer;
use crate::domain::user::{NewUser, User};
use crate::models::customer::{Customer as DbCustomer, CustomerUser};
use crate::models::user::{NewUser as DbNewUser, User as DbUser};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, UserReader, UserWriter};

impl UserReader for DieselRepository {
    fn get_user_by_id(&self, id: i32, branch_id: i32) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let user = users::table
            .find(id)
            .filter(users::branch_id.eq(branch_id))
            .first::<DbUser>(&mut conn)
            .optional()?;

        Ok(user.map(Into::into))
    }

    fn get_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let user = users::table
            .filter(users::email.eq(email))
            .first::<DbUser>(&mut conn)
            .optional()?;

        Ok(user.map(Into::into))
    }

    fn list_users(&self, branch_id: i32) -> RepositoryResult<Vec<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let result = users::table
            .filter(users::branch_id.eq(branch_id))
            .order(users::name.asc())
            .load::<DbUser>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(result)
    }

    fn list_users_with_customers(
        &self,
        branch_id: i32,
    ) -> RepositoryResult<Vec<(User, Vec<Customer>)>> {
        use crate::schema::{customer_user, customers, users};

        let mut conn = self.conn()?;

        let staff = users::table
            .filter(users::branch_id.eq(branch_id))
            .order(users::name.asc())
            .load::<DbUser>(&mut conn)?;

        let staff_ids: Vec<i32> = staff.iter().map(|user| user.id).collect();
        let pairs = customer_user::table
            .inner_join(customers::table)
            .filter(customer_user::user_id.eq_any(&staff_ids))
            .select((customer_user::user_id, customers::all_columns))
            .load::<(i32, DbCustomer)>(&mut conn)?;

        let mut assigned: HashMap<i32, Vec<Customer>> = HashMap::new();
        for (user_id, customer) in pairs {
            assigned.entry(user_id).or_default().push(customer.into());
        }

        let result = staff
            .into_iter()
            .map(|user| {
                let customers = assigned.remove(&user.id).unwrap_or_default();
                (user.into(), customers)
            })
            .collect();

        Ok(result)
    }
}

impl UserWriter for DieselRepository {
    fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let created = diesel::insert_into(users::table)
            .values(DbNewUser::from(new_user))
            .get_result::<DbUser>(&mut conn)?;

        Ok(created.into())
    }

    fn assign_customers_to_user(
        &self,
        user_id: i32,
        customer_ids: &[i32],
    ) -> RepositoryResult<usize> {
        use crate::schema::customer_user;

        let mut conn = self.conn()?;

        conn.transaction::<usize, RepositoryError, _>(|conn| {
            diesel::delete(customer_user::table.filter(customer_user::user_id.eq(user_id)))
                .execute(conn)?;

            let rows: Vec<CustomerUser> = customer_ids
                .iter()
                .map(|&customer_id| CustomerUser {
                    customer_id,
                    user_id,
                })
                .collect();
            let inserted = diesel::insert_into(customer_user::table)
                .values(&rows)
                .execute(conn)?;

            Ok(inserted)
        })
    }
}
