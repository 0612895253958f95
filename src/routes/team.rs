use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::{Context, Tera};

use crate::domain::auth::AuthenticatedUser;
use crate::forms::team::AssignCustomersForm;
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template};
use crate::services::{ServiceError, team as team_service};

#[get("/team")]
pub async fn show_team(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match team_service::load_team_page(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "team");
            context.insert("reps", &data.reps);

            render_template(&tera, "team/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(err) => {
            log::error!("Failed to load the team page: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/team/modal/{user_id}")]
pub async fn team_modal(
    user_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match team_service::load_assign_modal(repo.get_ref(), &user, user_id.into_inner()) {
        Ok(data) => {
            let mut context = Context::new();
            context.insert("rep", &data.rep);
            context.insert("customers", &data.customers);
            context.insert("assigned_ids", &data.assigned_ids);

            render_template(&tera, "team/modal_body.html", &context)
        }
        Err(ServiceError::Unauthorized) => HttpResponse::Unauthorized().finish(),
        Err(ServiceError::NotFound) => HttpResponse::NotFound().finish(),
        Err(err) => {
            log::error!("Failed to load the assignment modal: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// The checkbox list posts repeated `customer_id` keys, which
/// `web::Form` cannot decode; the body is parsed by hand instead.
#[post("/team/assign")]
pub async fn assign_customers(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    body: web::Bytes,
) -> impl Responder {
    let form: AssignCustomersForm = match serde_html_form::from_bytes(&body) {
        Ok(form) => form,
        Err(err) => {
            log::error!("Failed to parse assignment form: {err}");
            FlashMessage::error("Invalid form input").send();
            return redirect("/team");
        }
    };

    match team_service::assign_customers(repo.get_ref(), &user, form) {
        Ok(()) => {
            FlashMessage::success("Assignments updated.").send();
            redirect("/team")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Sales rep not found.").send();
            redirect("/team")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/team")
        }
        Err(err) => {
            log::error!("Failed to assign customers: {err}");
            FlashMessage::error("Failed to update the assignments.").send();
            redirect("/team")
        }
    }
}
