//! Customer-facing portal pages. All of them extract [`PortalUser`]
//! claims; staff tokens do not decode as those, so staff sessions land
//! on the portal sign-in page instead.

use actix_identity::Identity;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::{Context, Tera};

use crate::domain::auth::PortalUser;
use crate::forms::auth::PortalSignInForm;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{alert_level_to_str, redirect, render_template};
use crate::services::{ServiceError, auth as auth_service, portal as portal_service};

fn portal_context(flash_messages: &IncomingFlashMessages, user: &PortalUser) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("portal_user", user);
    context
}

#[get("/signin")]
pub async fn show_portal_signin(
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();
    let mut context = Context::new();
    context.insert("alerts", &alerts);

    render_template(&tera, "portal/signin.html", &context)
}

#[post("/signin")]
pub async fn portal_signin(
    req: HttpRequest,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    web::Form(form): web::Form<PortalSignInForm>,
) -> impl Responder {
    match auth_service::portal_signin(
        repo.get_ref(),
        &form,
        &server_config.secret,
        server_config.session_ttl_days,
    ) {
        Ok(token) => {
            if let Err(err) = Identity::login(&req.extensions(), token) {
                log::error!("Failed to attach identity: {err}");
                return HttpResponse::InternalServerError().finish();
            }
            redirect("/portal")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Invalid email or access code.").send();
            redirect("/portal/signin")
        }
        Err(err) => {
            log::error!("Failed to sign in to the portal: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/logout")]
pub async fn portal_logout(user: Identity) -> impl Responder {
    user.logout();
    redirect("/portal/signin")
}

#[get("")]
pub async fn portal_dashboard(
    user: PortalUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match portal_service::load_dashboard(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = portal_context(&flash_messages, &user);
            context.insert("customer", &data.customer);
            context.insert("wallet_display", &data.wallet_display);
            context.insert("vehicles", &data.vehicles);
            context.insert("invoices", &data.invoices);

            render_template(&tera, "portal/dashboard.html", &context)
        }
        Err(ServiceError::Unauthorized) => HttpResponse::Unauthorized().finish(),
        Err(err) => {
            log::error!("Failed to load the portal dashboard: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/vehicle/{vehicle_id}")]
pub async fn portal_vehicle(
    vehicle_id: web::Path<i32>,
    user: PortalUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match portal_service::load_vehicle(repo.get_ref(), &user, vehicle_id.into_inner()) {
        Ok(data) => {
            let mut context = portal_context(&flash_messages, &user);
            context.insert("vehicle", &data.vehicle);
            context.insert("history", &data.history);
            context.insert("documents", &data.documents);

            render_template(&tera, "portal/vehicle.html", &context)
        }
        Err(ServiceError::Unauthorized) => HttpResponse::Unauthorized().finish(),
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Vehicle not found.").send();
            redirect("/portal")
        }
        Err(err) => {
            log::error!("Failed to load the portal vehicle page: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/invoice/{invoice_id}")]
pub async fn portal_invoice(
    invoice_id: web::Path<i32>,
    user: PortalUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match portal_service::load_invoice(repo.get_ref(), &user, invoice_id.into_inner()) {
        Ok(data) => {
            let mut context = portal_context(&flash_messages, &user);
            context.insert("invoice", &data.invoice);
            context.insert("charges", &data.charges);
            context.insert("totals", &data.totals);
            context.insert("transactions", &data.transactions);

            render_template(&tera, "portal/invoice.html", &context)
        }
        Err(ServiceError::Unauthorized) => HttpResponse::Unauthorized().finish(),
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Invoice not found.").send();
            redirect("/portal")
        }
        Err(err) => {
            log::error!("Failed to load the portal invoice page: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
