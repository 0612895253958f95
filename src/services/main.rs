//! The customer index page.

use crate::domain::auth::AuthenticatedUser;
use crate::dto::main::{IndexPageData, IndexQuery};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{CustomerListQuery, CustomerReader};
use crate::routes::{check_role, ensure_role};
use crate::services::{ServiceError, ServiceResult};
use crate::{SERVICE_ACCESS_ROLE, SERVICE_ADMIN_ROLE, SERVICE_MANAGER_ROLE};

/// Loads the customer list for the index page. Admins see the whole
/// branch, sales reps only the customers assigned to them, and anyone
/// else an empty list.
pub fn load_index_page<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: IndexQuery,
) -> ServiceResult<IndexPageData>
where
    R: CustomerReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let page = query.page.unwrap_or(1);
    let search_query = query
        .search
        .map(|term| term.trim().to_string())
        .filter(|term| !term.is_empty());

    let mut list_query =
        CustomerListQuery::new(user.branch_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(term) = &search_query {
        list_query = list_query.search(term.as_str());
    }

    let (total, customers) = if check_role(SERVICE_ADMIN_ROLE, &user.roles) {
        repo.list_customers(list_query)
    } else if check_role(SERVICE_MANAGER_ROLE, &user.roles) {
        let user_id = user.id().ok_or(ServiceError::Unauthorized)?;
        repo.list_customers(list_query.assigned_to(user_id))
    } else {
        Ok((0, Vec::new()))
    }
    .map_err(|err| {
        log::error!("Failed to list customers: {err}");
        err
    })?;

    let customers = Paginated::new(customers, page, total.div_ceil(DEFAULT_ITEMS_PER_PAGE));

    Ok(IndexPageData {
        customers,
        search_query,
    })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::customer::Customer;
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

    fn rep_user() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "3".to_string(),
            email: "rep@example.com".to_string(),
            branch_id: 42,
            name: "Rep".to_string(),
            roles: vec![
                SERVICE_ACCESS_ROLE.to_string(),
                SERVICE_MANAGER_ROLE.to_string(),
            ],
            exp: 0,
        }
    }

    fn outsider_user() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "9".to_string(),
            email: "warehouse@example.com".to_string(),
            branch_id: 42,
            name: "Warehouse".to_string(),
            roles: vec!["wms".to_string()],
            exp: 0,
        }
    }

    fn build_customer(id: i32, name: &str) -> Customer {
        let now = NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Customer {
            id,
            branch_id: 42,
            name: name.to_string(),
            email: None,
            phone: None,
            address: None,
            country: None,
            portal_code: "AAAABBBB".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Staff without the access role never reach the repository.
    #[test]
    fn index_requires_access_role() {
        let mut repo = MockRepository::new();
        repo.expect_list_customers().times(0);

        let result = load_index_page(
            &repo,
            &outsider_user(),
            IndexQuery {
                search: None,
                page: None,
            },
        );

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn admin_sees_the_whole_branch() {
        let mut repo = MockRepository::new();
        repo.expect_list_customers()
            .withf(|query| query.branch_id == 42 && query.assigned_to.is_none())
            .times(1)
            .returning(|_| Ok((2, vec![build_customer(1, "A"), build_customer(2, "B")])));

        let data = load_index_page(
            &repo,
            &admin_user(),
            IndexQuery {
                search: None,
                page: None,
            },
        )
        .expect("should load");

        assert_eq!(data.customers.items.len(), 2);
    }

    /// Sales reps only see their assigned customers.
    #[test]
    fn rep_list_is_scoped_to_assignments() {
        let mut repo = MockRepository::new();
        repo.expect_list_customers()
            .withf(|query| query.assigned_to == Some(3))
            .times(1)
            .returning(|_| Ok((1, vec![build_customer(5, "Mine")])));

        let data = load_index_page(
            &repo,
            &rep_user(),
            IndexQuery {
                search: None,
                page: None,
            },
        )
        .expect("should load");

        assert_eq!(data.customers.items.len(), 1);
    }

    /// A search term is trimmed and carried into the query and page data.
    #[test]
    fn search_term_is_passed_through() {
        let mut repo = MockRepository::new();
        repo.expect_list_customers()
            .withf(|query| query.search.as_deref() == Some("corolla"))
            .times(1)
            .returning(|_| Ok((0, vec![])));

        let data = load_index_page(
            &repo,
            &admin_user(),
            IndexQuery {
                search: Some("  corolla  ".to_string()),
                page: None,
            },
        )
        .expect("should load");

        assert_eq!(data.search_query.as_deref(), Some("corolla"));
    }
}
