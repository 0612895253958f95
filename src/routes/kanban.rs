use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::cache::KanbanCache;
use crate::domain::auth::AuthenticatedUser;
use crate::forms::kanban::{AddInquiryForm, SaveInquiryForm};
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template};
use crate::services::{ServiceError, kanban as kanban_service};

/// Board page shell; the card columns come from `GET /api/kanban`.
#[get("/inquiries")]
pub async fn show_inquiries(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match kanban_service::load_inquiries_page(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "inquiries");
            context.insert("users", &data.users);
            context.insert("stages", &data.stages);
            context.insert("unassigned", &data.unassigned);

            render_template(&tera, "kanban/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(err) => {
            log::error!("Failed to load the inquiry board: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/inquiry/add")]
pub async fn add_inquiry(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    cache: web::Data<KanbanCache>,
    web::Form(form): web::Form<AddInquiryForm>,
) -> impl Responder {
    match kanban_service::add_inquiry(repo.get_ref(), &user, form) {
        Ok(()) => {
            cache.invalidate(user.branch_id);
            FlashMessage::success("Inquiry added.").send();
            redirect("/inquiries")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::Form(message) | ServiceError::TypeConstraint(message)) => {
            FlashMessage::error(message).send();
            redirect("/inquiries")
        }
        Err(err) => {
            log::error!("Failed to add an inquiry: {err}");
            FlashMessage::error("Failed to add the inquiry.").send();
            redirect("/inquiries")
        }
    }
}

#[post("/inquiry/save")]
pub async fn save_inquiry(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    cache: web::Data<KanbanCache>,
    web::Form(form): web::Form<SaveInquiryForm>,
) -> impl Responder {
    match kanban_service::save_inquiry(repo.get_ref(), &user, form) {
        Ok(()) => {
            cache.invalidate(user.branch_id);
            FlashMessage::success("Inquiry updated.").send();
            redirect("/inquiries")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Inquiry not found.").send();
            redirect("/inquiries")
        }
        Err(ServiceError::Form(message) | ServiceError::TypeConstraint(message)) => {
            FlashMessage::error(message).send();
            redirect("/inquiries")
        }
        Err(err) => {
            log::error!("Failed to update inquiry: {err}");
            FlashMessage::error("Failed to update the inquiry.").send();
            redirect("/inquiries")
        }
    }
}

#[post("/inquiry/{inquiry_id}/convert")]
pub async fn convert_inquiry(
    inquiry_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    cache: web::Data<KanbanCache>,
) -> impl Responder {
    match kanban_service::convert_inquiry(repo.get_ref(), &user, inquiry_id.into_inner()) {
        Ok(()) => {
            cache.invalidate(user.branch_id);
            FlashMessage::success("Inquiry converted to a customer.").send();
            redirect("/inquiries")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Inquiry not found.").send();
            redirect("/inquiries")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/inquiries")
        }
        Err(err) => {
            log::error!("Failed to convert inquiry: {err}");
            FlashMessage::error("Failed to convert the inquiry.").send();
            redirect("/inquiries")
        }
    }
}
