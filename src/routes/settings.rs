use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::forms::settings::{AddUserForm, SaveSettingsForm};
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template};
use crate::services::{ServiceError, settings as settings_service};

#[get("/settings")]
pub async fn show_settings(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match settings_service::load_settings_page(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "settings");
            context.insert("settings", &data.settings);
            context.insert("users", &data.users);
            context.insert("currencies", &data.currencies);
            context.insert("roles", &data.roles);

            render_template(&tera, "settings/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(err) => {
            log::error!("Failed to load settings: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/settings/save")]
pub async fn save_settings(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<SaveSettingsForm>,
) -> impl Responder {
    match settings_service::save_settings(repo.get_ref(), &user, form) {
        Ok(()) => {
            FlashMessage::success("Settings saved.").send();
            redirect("/settings")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::Form(message) | ServiceError::TypeConstraint(message)) => {
            FlashMessage::error(message).send();
            redirect("/settings")
        }
        Err(err) => {
            log::error!("Failed to save settings: {err}");
            FlashMessage::error("Failed to save the settings.").send();
            redirect("/settings")
        }
    }
}

/// Role checkboxes post repeated `roles` keys, which `web::Form`
/// cannot decode; the body is parsed by hand instead.
#[post("/users/add")]
pub async fn add_user(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    body: web::Bytes,
) -> impl Responder {
    let form: AddUserForm = match serde_html_form::from_bytes(&body) {
        Ok(form) => form,
        Err(err) => {
            log::error!("Failed to parse user form: {err}");
            FlashMessage::error("Invalid form input").send();
            return redirect("/settings");
        }
    };

    match settings_service::add_user(repo.get_ref(), &user, form) {
        Ok(()) => {
            FlashMessage::success("User created.").send();
            redirect("/settings")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::Form(message) | ServiceError::TypeConstraint(message)) => {
            FlashMessage::error(message).send();
            redirect("/settings")
        }
        Err(err) => {
            log::error!("Failed to create user: {err}");
            FlashMessage::error("Failed to create the user.").send();
            redirect("/settings")
        }
    }
}
