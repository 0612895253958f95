//! Vehicle pipeline: list and detail pages, registration, stage
//! transitions, CSV import, and document links.

use validator::Validate;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::document::{DocumentOwner, NewDocument};
use crate::domain::vehicle::{NewVehicle, ShippingStage, UpdateVehicle};
use crate::dto::invoice::InvoiceSummary;
use crate::dto::vehicle::{StageEventView, VehiclePageData, VehicleProgress, VehiclesPageData, VehiclesQuery};
use crate::forms::vehicle::{
    AddVehicleDocumentForm, AddVehicleForm, AssignVehicleForm, SaveVehicleForm, StageForm,
    UploadVehiclesForm,
};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    CustomerReader, DocumentReader, DocumentWriter, InvoiceListQuery, InvoiceReader,
    VehicleListQuery, VehicleReader, VehicleWriter,
};
use crate::routes::ensure_role;
use crate::services::{ServiceError, ServiceResult};
use crate::{SERVICE_ACCESS_ROLE, SERVICE_ADMIN_ROLE};

pub(crate) fn stage_names() -> Vec<&'static str> {
    ShippingStage::ALL.iter().map(|stage| stage.as_str()).collect()
}

/// Loads the vehicle list with stage, customer, and text filters.
pub fn load_vehicles_page<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: VehiclesQuery,
) -> ServiceResult<VehiclesPageData>
where
    R: VehicleReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let page = query.page.unwrap_or(1);
    let search_query = query
        .search
        .map(|term| term.trim().to_string())
        .filter(|term| !term.is_empty());

    let mut list_query =
        VehicleListQuery::new(user.branch_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(stage) = query.stage {
        list_query = list_query.stage(stage);
    }
    if let Some(customer_id) = query.customer_id {
        list_query = list_query.customer(customer_id);
    }
    if let Some(term) = &search_query {
        list_query = list_query.search(term.as_str());
    }

    let (total, vehicles) = repo.list_vehicles(list_query).map_err(|err| {
        log::error!("Failed to list vehicles: {err}");
        err
    })?;

    let vehicles = Paginated::new(
        vehicles.into_iter().map(VehicleProgress::from).collect(),
        page,
        total.div_ceil(DEFAULT_ITEMS_PER_PAGE),
    );

    Ok(VehiclesPageData {
        vehicles,
        stage_filter: query.stage.map(|stage| stage.as_str().to_string()),
        search_query,
        stages: stage_names(),
    })
}

/// Loads one vehicle with its customer, stage history, documents, and
/// the invoices that bill it.
pub fn load_vehicle_page<R>(
    repo: &R,
    user: &AuthenticatedUser,
    vehicle_id: i32,
) -> ServiceResult<VehiclePageData>
where
    R: VehicleReader + CustomerReader + InvoiceReader + DocumentReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let vehicle = repo
        .get_vehicle_by_id(vehicle_id, user.branch_id)?
        .ok_or(ServiceError::NotFound)?;

    let customer = match vehicle.customer_id {
        Some(customer_id) => repo.get_customer_by_id(customer_id, user.branch_id)?,
        None => None,
    };

    let history = repo
        .list_stage_events(vehicle.id)?
        .into_iter()
        .map(|(event, changed_by)| StageEventView::new(event, &changed_by))
        .collect();
    let documents = repo.list_vehicle_documents(vehicle.id)?;
    let (_, invoices) =
        repo.list_invoices(InvoiceListQuery::new(user.branch_id).vehicle(vehicle.id))?;

    let today = chrono::Utc::now().date_naive();

    Ok(VehiclePageData {
        vehicle: VehicleProgress::from(vehicle),
        customer,
        history,
        documents,
        invoices: invoices
            .into_iter()
            .map(|invoice| InvoiceSummary::new(invoice, today))
            .collect(),
        stages: stage_names(),
    })
}

/// Registers a vehicle; it enters the pipeline at the purchase stage.
pub fn add_vehicle<R>(repo: &R, user: &AuthenticatedUser, form: AddVehicleForm) -> ServiceResult<()>
where
    R: CustomerReader + VehicleWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    if form.validate().is_err() {
        return Err(ServiceError::Form("Invalid form input".to_string()));
    }

    if let Some(customer_id) = form.customer_id
        && repo
            .get_customer_by_id(customer_id, user.branch_id)?
            .is_none()
    {
        return Err(ServiceError::Form("Unknown customer".to_string()));
    }

    let user_id = user.id().ok_or(ServiceError::Unauthorized)?;
    let new_vehicle = NewVehicle::new(
        user.branch_id,
        form.customer_id,
        &form.vin,
        &form.make,
        &form.model,
        form.year,
        Some(form.color.as_str()),
        form.mileage_km,
    )?;

    repo.create_vehicles(&[new_vehicle], user_id).map_err(|err| {
        log::error!("Failed to add a vehicle: {err}");
        err
    })?;

    Ok(())
}

/// Saves edits to the vehicle's base fields.
pub fn save_vehicle<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: SaveVehicleForm,
) -> ServiceResult<()>
where
    R: VehicleReader + VehicleWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    if form.validate().is_err() {
        return Err(ServiceError::Form("Invalid form input".to_string()));
    }

    let vehicle = repo
        .get_vehicle_by_id(form.id, user.branch_id)?
        .ok_or(ServiceError::NotFound)?;

    let updates = UpdateVehicle::new(
        &form.vin,
        &form.make,
        &form.model,
        form.year,
        Some(form.color.as_str()),
        form.mileage_km,
    )?;

    repo.update_vehicle(vehicle.id, &updates).map_err(|err| {
        log::error!("Failed to update vehicle: {err}");
        err
    })?;

    Ok(())
}

/// Links the vehicle to a customer, or clears the link when the form
/// arrives empty.
pub fn assign_vehicle<R>(
    repo: &R,
    user: &AuthenticatedUser,
    vehicle_id: i32,
    form: AssignVehicleForm,
) -> ServiceResult<()>
where
    R: VehicleReader + CustomerReader + VehicleWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let vehicle = repo
        .get_vehicle_by_id(vehicle_id, user.branch_id)?
        .ok_or(ServiceError::NotFound)?;

    if let Some(customer_id) = form.customer_id
        && repo
            .get_customer_by_id(customer_id, user.branch_id)?
            .is_none()
    {
        return Err(ServiceError::Form("Unknown customer".to_string()));
    }

    repo.assign_vehicle_to_customer(vehicle.id, form.customer_id)
        .map_err(|err| {
            log::error!("Failed to assign vehicle: {err}");
            err
        })?;

    Ok(())
}

/// Moves the vehicle to another shipping stage and appends the history
/// event. Re-posting the current stage is refused.
pub fn change_stage<R>(
    repo: &R,
    user: &AuthenticatedUser,
    vehicle_id: i32,
    form: StageForm,
) -> ServiceResult<()>
where
    R: VehicleReader + VehicleWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let to: ShippingStage = form.stage.parse()?;

    let vehicle = repo
        .get_vehicle_by_id(vehicle_id, user.branch_id)?
        .ok_or(ServiceError::NotFound)?;

    if vehicle.stage == to {
        return Err(ServiceError::Form(format!(
            "Vehicle is already {}",
            to.as_str()
        )));
    }

    let user_id = user.id().ok_or(ServiceError::Unauthorized)?;
    let note = form.note.trim();
    let note = (!note.is_empty()).then_some(note);

    repo.transition_stage(vehicle.id, to, user_id, note)
        .map_err(|err| {
            log::error!("Failed to transition vehicle stage: {err}");
            err
        })?;

    Ok(())
}

/// Bulk-registers vehicles from an uploaded CSV file. The whole file is
/// validated before anything is written; one bad row rejects the batch.
pub fn upload_vehicles<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: &UploadVehiclesForm,
) -> ServiceResult<usize>
where
    R: VehicleWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let rows = form.parse_rows().map_err(|err| {
        log::error!("Failed to parse vehicles CSV: {err}");
        ServiceError::Form(format!("Could not read the CSV file: {err}"))
    })?;

    if rows.is_empty() {
        return Err(ServiceError::Form("The CSV file has no rows".to_string()));
    }

    let mut new_vehicles = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let vehicle = NewVehicle::new(
            user.branch_id,
            None,
            &row.vin,
            &row.make,
            &row.model,
            row.year,
            row.color.as_deref(),
            row.mileage_km,
        )
        .map_err(|err| ServiceError::Form(format!("Row {}: {err}", index + 1)))?;
        new_vehicles.push(vehicle);
    }

    let user_id = user.id().ok_or(ServiceError::Unauthorized)?;
    let created = repo
        .create_vehicles(&new_vehicles, user_id)
        .map_err(|err| {
            log::error!("Failed to import vehicles: {err}");
            err
        })?;

    Ok(created)
}

/// Attaches a document link to a vehicle.
pub fn add_vehicle_document<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AddVehicleDocumentForm,
) -> ServiceResult<()>
where
    R: VehicleReader + DocumentWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    if form.validate().is_err() {
        return Err(ServiceError::Form("Invalid form input".to_string()));
    }

    let vehicle = repo
        .get_vehicle_by_id(form.id, user.branch_id)?
        .ok_or(ServiceError::NotFound)?;
    let user_id = user.id().ok_or(ServiceError::Unauthorized)?;

    let document = NewDocument::new(
        user.branch_id,
        DocumentOwner::Vehicle(vehicle.id),
        &form.name,
        &form.url,
        user_id,
    )?;

    repo.create_document(&document).map_err(|err| {
        log::error!("Failed to attach document: {err}");
        err
    })?;

    Ok(())
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::vehicle::Vehicle;
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

    fn build_vehicle(id: i32, stage: ShippingStage) -> Vehicle {
        let now = NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Vehicle {
            id,
            branch_id: 42,
            customer_id: None,
            vin: "JT2AE91A8H0123456".to_string(),
            make: "Toyota".to_string(),
            model: "Corolla".to_string(),
            year: 2019,
            color: Some("Silver".to_string()),
            mileage_km: Some(41_000),
            stage,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn listing_requires_the_access_role() {
        let mut repo = MockRepository::new();
        repo.expect_list_vehicles().times(0);

        let query = VehiclesQuery {
            stage: None,
            customer_id: None,
            search: None,
            page: None,
        };

        let result = load_vehicles_page(&repo, &outsider_user(), query);
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn stage_filter_is_carried_into_the_query() {
        let mut repo = MockRepository::new();
        repo.expect_list_vehicles()
            .withf(|query| query.stage == Some(ShippingStage::Shipped))
            .times(1)
            .returning(|_| Ok((1, vec![build_vehicle(1, ShippingStage::Shipped)])));

        let query = VehiclesQuery {
            stage: Some(ShippingStage::Shipped),
            customer_id: None,
            search: None,
            page: None,
        };

        let data = load_vehicles_page(&repo, &staff_user(), query).expect("should load");
        assert_eq!(data.vehicles.items.len(), 1);
        assert_eq!(data.stage_filter.as_deref(), Some("shipped"));
    }

    /// An unknown stage name in the form is a type error, not a panic.
    #[test]
    fn change_stage_rejects_unknown_names() {
        let mut repo = MockRepository::new();
        repo.expect_get_vehicle_by_id().times(0);
        repo.expect_transition_stage().times(0);

        let form = StageForm {
            stage: "teleported".to_string(),
            note: String::new(),
        };

        let result = change_stage(&repo, &staff_user(), 1, form);
        assert!(matches!(result, Err(ServiceError::TypeConstraint(_))));
    }

    #[test]
    fn change_stage_refuses_the_current_stage() {
        let mut repo = MockRepository::new();
        repo.expect_get_vehicle_by_id()
            .returning(|id, _| Ok(Some(build_vehicle(id, ShippingStage::Repair))));
        repo.expect_transition_stage().times(0);

        let form = StageForm {
            stage: "repair".to_string(),
            note: String::new(),
        };

        let result = change_stage(&repo, &staff_user(), 1, form);
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn change_stage_records_the_note() {
        let mut repo = MockRepository::new();
        repo.expect_get_vehicle_by_id()
            .returning(|id, _| Ok(Some(build_vehicle(id, ShippingStage::Booking))));
        repo.expect_transition_stage()
            .withf(|vehicle_id, to, changed_by, note| {
                *vehicle_id == 1
                    && *to == ShippingStage::Shipped
                    && *changed_by == 3
                    && *note == Some("loaded at Yokohama")
            })
            .times(1)
            .returning(|id, to, _, _| Ok(build_vehicle(id, to)));

        let form = StageForm {
            stage: "shipped".to_string(),
            note: "  loaded at Yokohama  ".to_string(),
        };

        change_stage(&repo, &staff_user(), 1, form).expect("should transition");
    }

    #[test]
    fn assign_clears_the_link_when_empty() {
        let mut repo = MockRepository::new();
        repo.expect_get_vehicle_by_id()
            .returning(|id, _| Ok(Some(build_vehicle(id, ShippingStage::Purchase))));
        repo.expect_get_customer_by_id().times(0);
        repo.expect_assign_vehicle_to_customer()
            .withf(|vehicle_id, customer_id| *vehicle_id == 1 && customer_id.is_none())
            .times(1)
            .returning(|id, _| Ok(build_vehicle(id, ShippingStage::Purchase)));

        let form = AssignVehicleForm { customer_id: None };
        assign_vehicle(&repo, &staff_user(), 1, form).expect("should clear");
    }
}
