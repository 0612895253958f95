//! JSON endpoints used by the page scripts: the customer picker and
//! the vehicle stage timeline.

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::auth::AuthenticatedUser;
use crate::dto::api::{CustomerSearchItem, CustomerSearchResponse, VehicleStagesResponse};
use crate::dto::vehicle::StageEventView;
use crate::pagination::DEFAULT_ITEMS_PER_PAGE;
use crate::repository::{CustomerListQuery, CustomerReader, VehicleReader};
use crate::routes::ensure_role;
use crate::services::{ServiceError, ServiceResult};

/// Customer picker search, paginated like the index page.
pub fn search_customers<R>(
    repo: &R,
    user: &AuthenticatedUser,
    search: Option<&str>,
    page: usize,
) -> ServiceResult<CustomerSearchResponse>
where
    R: CustomerReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let mut query =
        CustomerListQuery::new(user.branch_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(term) = search.map(str::trim).filter(|term| !term.is_empty()) {
        query = query.search(term);
    }

    let (total, customers) = repo.list_customers(query).map_err(|err| {
        log::error!("Failed to search customers: {err}");
        err
    })?;

    Ok(CustomerSearchResponse {
        items: customers
            .into_iter()
            .map(|customer| CustomerSearchItem {
                id: customer.id,
                name: customer.name,
                email: customer.email,
            })
            .collect(),
        total,
    })
}

/// The stage timeline for one vehicle, newest move first.
pub fn vehicle_stages<R>(
    repo: &R,
    user: &AuthenticatedUser,
    vehicle_id: i32,
) -> ServiceResult<VehicleStagesResponse>
where
    R: VehicleReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let vehicle = repo
        .get_vehicle_by_id(vehicle_id, user.branch_id)?
        .ok_or(ServiceError::NotFound)?;

    let history = repo
        .list_stage_events(vehicle.id)?
        .into_iter()
        .map(|(event, changed_by)| StageEventView::new(event, &changed_by))
        .collect();

    Ok(VehicleStagesResponse {
        vehicle_id: vehicle.id,
        stage: vehicle.stage.as_str().to_string(),
        progress: vehicle.stage.progress_percent(),
        history,
    })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::customer::Customer;
    use crate::repository::mock::MockRepository;

    fn staff_user() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "3".to_string(),
            email: "rep@example.com".to_string(),
            branch_id: 42,
            name: "Rep".to_string(),
            roles: vec![SERVICE_ACCESS_ROLE.to_string()],
            exp: 0,
        }
    }

    fn build_customer(id: i32) -> Customer {
        let now = NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Customer {
            id,
            branch_id: 42,
            name: "Tanaka".to_string(),
            email: Some("tanaka@example.com".to_string()),
            phone: None,
            address: None,
            country: None,
            portal_code: "K7KPXQ2M".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The portal role cannot use the staff API.
    #[test]
    fn search_requires_the_access_role() {
        let mut repo = MockRepository::new();
        repo.expect_list_customers().times(0);

        let outsider = AuthenticatedUser {
            roles: vec!["wms".to_string()],
            ..staff_user()
        };

        let result = search_customers(&repo, &outsider, Some("tanaka"), 1);
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    /// Whitespace-only search terms are treated as no search.
    #[test]
    fn blank_search_lists_the_branch() {
        let mut repo = MockRepository::new();
        repo.expect_list_customers()
            .withf(|query| query.branch_id == 42 && query.search.is_none())
            .times(1)
            .returning(|_| Ok((1, vec![build_customer(5)])));

        let response =
            search_customers(&repo, &staff_user(), Some("   "), 1).expect("should search");

        assert_eq!(response.total, 1);
        assert_eq!(response.items[0].name, "Tanaka");
    }
}
