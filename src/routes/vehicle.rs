use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use serde::Deserialize;
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::dto::vehicle::VehiclesQuery;
use crate::forms::vehicle::{
    AddVehicleDocumentForm, AddVehicleForm, AssignVehicleForm, SaveVehicleForm, StageForm,
    UploadVehiclesForm,
};
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template};
use crate::services::{ServiceError, vehicle as vehicle_service};

#[derive(Deserialize)]
struct VehiclesQueryParams {
    stage: Option<String>,
    customer_id: Option<i32>,
    q: Option<String>,
    page: Option<usize>,
}

#[get("/vehicles")]
pub async fn show_vehicles(
    params: web::Query<VehiclesQueryParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let params = params.into_inner();
    let query = VehiclesQuery {
        // Unknown stage names fall back to the unfiltered list.
        stage: params.stage.as_deref().and_then(|raw| raw.parse().ok()),
        customer_id: params.customer_id,
        search: params.q,
        page: params.page,
    };

    match vehicle_service::load_vehicles_page(repo.get_ref(), &user, query) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "vehicles");
            context.insert("vehicles", &data.vehicles);
            context.insert("stages", &data.stages);
            if let Some(stage_filter) = &data.stage_filter {
                context.insert("stage_filter", stage_filter);
            }
            if let Some(search_query) = &data.search_query {
                context.insert("search_query", search_query);
            }

            render_template(&tera, "vehicles/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(err) => {
            log::error!("Failed to load vehicles: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/vehicle/{vehicle_id}")]
pub async fn show_vehicle(
    vehicle_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match vehicle_service::load_vehicle_page(repo.get_ref(), &user, vehicle_id.into_inner()) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "vehicles");
            context.insert("vehicle", &data.vehicle);
            context.insert("customer", &data.customer);
            context.insert("history", &data.history);
            context.insert("documents", &data.documents);
            context.insert("invoices", &data.invoices);
            context.insert("stages", &data.stages);

            render_template(&tera, "vehicles/detail.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Vehicle not found.").send();
            redirect("/vehicles")
        }
        Err(err) => {
            log::error!("Failed to load vehicle: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/vehicle/add")]
pub async fn add_vehicle(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AddVehicleForm>,
) -> impl Responder {
    match vehicle_service::add_vehicle(repo.get_ref(), &user, form) {
        Ok(()) => {
            FlashMessage::success("Vehicle added.").send();
            redirect("/vehicles")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::Form(message) | ServiceError::TypeConstraint(message)) => {
            FlashMessage::error(message).send();
            redirect("/vehicles")
        }
        Err(err) => {
            log::error!("Failed to add a vehicle: {err}");
            FlashMessage::error("Failed to add the vehicle.").send();
            redirect("/vehicles")
        }
    }
}

#[post("/vehicle/save")]
pub async fn save_vehicle(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<SaveVehicleForm>,
) -> impl Responder {
    let vehicle_id = form.id;
    match vehicle_service::save_vehicle(repo.get_ref(), &user, form) {
        Ok(()) => {
            FlashMessage::success("Vehicle updated.").send();
            redirect(&format!("/vehicle/{vehicle_id}"))
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Vehicle not found.").send();
            redirect("/vehicles")
        }
        Err(ServiceError::Form(message) | ServiceError::TypeConstraint(message)) => {
            FlashMessage::error(message).send();
            redirect(&format!("/vehicle/{vehicle_id}"))
        }
        Err(err) => {
            log::error!("Failed to update vehicle: {err}");
            FlashMessage::error("Failed to update the vehicle.").send();
            redirect(&format!("/vehicle/{vehicle_id}"))
        }
    }
}

#[post("/vehicle/{vehicle_id}/assign")]
pub async fn assign_vehicle(
    vehicle_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AssignVehicleForm>,
) -> impl Responder {
    let vehicle_id = vehicle_id.into_inner();
    match vehicle_service::assign_vehicle(repo.get_ref(), &user, vehicle_id, form) {
        Ok(()) => {
            FlashMessage::success("Vehicle assignment updated.").send();
            redirect(&format!("/vehicle/{vehicle_id}"))
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Vehicle not found.").send();
            redirect("/vehicles")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect(&format!("/vehicle/{vehicle_id}"))
        }
        Err(err) => {
            log::error!("Failed to assign vehicle: {err}");
            FlashMessage::error("Failed to assign the vehicle.").send();
            redirect(&format!("/vehicle/{vehicle_id}"))
        }
    }
}

#[post("/vehicle/{vehicle_id}/stage")]
pub async fn change_stage(
    vehicle_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<StageForm>,
) -> impl Responder {
    let vehicle_id = vehicle_id.into_inner();
    match vehicle_service::change_stage(repo.get_ref(), &user, vehicle_id, form) {
        Ok(()) => {
            FlashMessage::success("Stage updated.").send();
            redirect(&format!("/vehicle/{vehicle_id}"))
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Vehicle not found.").send();
            redirect("/vehicles")
        }
        Err(ServiceError::Form(message) | ServiceError::TypeConstraint(message)) => {
            FlashMessage::error(message).send();
            redirect(&format!("/vehicle/{vehicle_id}"))
        }
        Err(err) => {
            log::error!("Failed to change vehicle stage: {err}");
            FlashMessage::error("Failed to change the stage.").send();
            redirect(&format!("/vehicle/{vehicle_id}"))
        }
    }
}

#[post("/vehicles/upload")]
pub async fn upload_vehicles(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    MultipartForm(form): MultipartForm<UploadVehiclesForm>,
) -> impl Responder {
    match vehicle_service::upload_vehicles(repo.get_ref(), &user, &form) {
        Ok(created) => {
            FlashMessage::success(format!("Imported {created} vehicles.")).send();
            redirect("/vehicles")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/vehicles")
        }
        Err(err) => {
            log::error!("Failed to import vehicles: {err}");
            FlashMessage::error("Failed to import the vehicles.").send();
            redirect("/vehicles")
        }
    }
}

#[post("/vehicle/document")]
pub async fn add_vehicle_document(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AddVehicleDocumentForm>,
) -> impl Responder {
    let vehicle_id = form.id;
    match vehicle_service::add_vehicle_document(repo.get_ref(), &user, form) {
        Ok(()) => {
            FlashMessage::success("Document attached.").send();
            redirect(&format!("/vehicle/{vehicle_id}"))
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Vehicle not found.").send();
            redirect("/vehicles")
        }
        Err(ServiceError::Form(message) | ServiceError::TypeConstraint(message)) => {
            FlashMessage::error(message).send();
            redirect(&format!("/vehicle/{vehicle_id}"))
        }
        Err(err) => {
            log::error!("Failed to attach document: {err}");
            FlashMessage::error("Failed to attach the document.").send();
            redirect(&format!("/vehicle/{vehicle_id}"))
        }
    }
}
