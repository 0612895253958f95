//! Sales team management: rep roster and customer assignment.

use crate::domain::auth::AuthenticatedUser;
use crate::dto::team::{AssignModalData, RepWithCustomers, TeamPageData};
use crate::forms::team::AssignCustomersForm;
use crate::repository::{CustomerListQuery, CustomerReader, UserReader, UserWriter};
use crate::routes::{check_role, ensure_role};
use crate::services::{ServiceError, ServiceResult};
use crate::{SERVICE_ADMIN_ROLE, SERVICE_MANAGER_ROLE};

/// Lists every sales rep in the branch with their assigned customers.
pub fn load_team_page<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<TeamPageData>
where
    R: UserReader + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let reps = repo
        .list_users_with_customers(user.branch_id)
        .map_err(|err| {
            log::error!("Failed to list the team: {err}");
            err
        })?
        .into_iter()
        .filter(|(rep, _)| check_role(SERVICE_MANAGER_ROLE, &rep.roles))
        .map(|(user, customers)| RepWithCustomers { user, customers })
        .collect();

    Ok(TeamPageData { reps })
}

/// Loads the assignment modal for one rep: every branch customer plus
/// the set already assigned to them.
pub fn load_assign_modal<R>(
    repo: &R,
    user: &AuthenticatedUser,
    rep_id: i32,
) -> ServiceResult<AssignModalData>
where
    R: UserReader + CustomerReader + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let rep = repo
        .get_user_by_id(rep_id, user.branch_id)?
        .ok_or(ServiceError::NotFound)?;

    let (_, customers) = repo.list_customers(CustomerListQuery::new(user.branch_id))?;
    let (_, assigned) =
        repo.list_customers(CustomerListQuery::new(user.branch_id).assigned_to(rep.id))?;
    let assigned_ids = assigned.into_iter().map(|customer| customer.id).collect();

    Ok(AssignModalData {
        rep,
        customers,
        assigned_ids,
    })
}

/// Replaces a rep's customer assignments with the submitted set.
pub fn assign_customers<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AssignCustomersForm,
) -> ServiceResult<()>
where
    R: UserReader + CustomerReader + UserWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let rep = repo
        .get_user_by_id(form.user_id, user.branch_id)?
        .ok_or(ServiceError::NotFound)?;

    for customer_id in &form.customer_id {
        if repo
            .get_customer_by_id(*customer_id, user.branch_id)?
            .is_none()
        {
            return Err(ServiceError::Form(
                "Unknown customer in the assignment list".to_string(),
            ));
        }
    }

    repo.assign_customers_to_user(rep.id, &form.customer_id)
        .map_err(|err| {
            log::error!("Failed to assign customers: {err}");
            err
        })?;

    Ok(())
}
