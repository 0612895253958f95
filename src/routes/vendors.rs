use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::forms::vendors::AddVendorForm;
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template};
use crate::services::{ServiceError, vendors as vendors_service};

#[get("/vendors")]
pub async fn show_vendors(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match vendors_service::load_vendors_page(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "vendors");
            context.insert("vendors", &data.vendors);
            context.insert("categories", &data.categories);

            render_template(&tera, "vendors/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(err) => {
            log::error!("Failed to load vendors: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/vendors/add")]
pub async fn add_vendor(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AddVendorForm>,
) -> impl Responder {
    match vendors_service::add_vendor(repo.get_ref(), &user, form) {
        Ok(()) => {
            FlashMessage::success("Vendor added.").send();
            redirect("/vendors")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::Form(message) | ServiceError::TypeConstraint(message)) => {
            FlashMessage::error(message).send();
            redirect("/vendors")
        }
        Err(err) => {
            log::error!("Failed to add a vendor: {err}");
            FlashMessage::error("Failed to add the vendor.").send();
            redirect("/vendors")
        }
    }
}
