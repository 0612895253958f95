#[cfg(feature = "server")]
use {
    actix_cors::Cors,
    actix_files::Files,
    actix_identity::IdentityMiddleware,
    actix_session::{SessionMiddleware, storage::CookieSessionStore},
    actix_web::cookie::Key,
    actix_web::{App, HttpServer, middleware as actix_middleware, web},
    actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore},
    tera::Tera,
};

#[cfg(feature = "server")]
use crate::cache::KanbanCache;
#[cfg(feature = "server")]
use crate::db::establish_connection_pool;
#[cfg(feature = "server")]
use crate::middleware::RedirectUnauthorized;
#[cfg(feature = "server")]
use crate::models::config::ServerConfig;
#[cfg(feature = "server")]
use crate::repository::DieselRepository;
#[cfg(feature = "server")]
use crate::routes::api::{api_v1_customers, api_v1_vehicle_stages, kanban_board, kanban_move};
#[cfg(feature = "server")]
use crate::routes::auth::{logout, show_signin, signin};
#[cfg(feature = "server")]
use crate::routes::customer::{
    add_customer, add_customer_document, add_deposit, delete_customer, delete_document,
    rotate_portal_code, save_customer, show_customer,
};
#[cfg(feature = "server")]
use crate::routes::invoice::{
    add_cost_item, add_invoice, add_payment, apply_wallet, approve_invoice, delete_cost_item,
    finalize_invoice, reject_invoice, save_charges, save_discount, show_invoice, show_invoices,
    submit_invoice,
};
#[cfg(feature = "server")]
use crate::routes::kanban::{add_inquiry, convert_inquiry, save_inquiry, show_inquiries};
#[cfg(feature = "server")]
use crate::routes::main::show_index;
#[cfg(feature = "server")]
use crate::routes::portal::{
    portal_dashboard, portal_invoice, portal_logout, portal_signin, portal_vehicle,
    show_portal_signin,
};
#[cfg(feature = "server")]
use crate::routes::settings::{add_user, save_settings, show_settings};
#[cfg(feature = "server")]
use crate::routes::team::{assign_customers, show_team, team_modal};
#[cfg(feature = "server")]
use crate::routes::vehicle::{
    add_vehicle, add_vehicle_document, assign_vehicle, change_stage, save_vehicle, show_vehicle,
    show_vehicles, upload_vehicles,
};
#[cfg(feature = "server")]
use crate::routes::vendors::{add_vendor, show_vendors};

#[cfg(feature = "server")]
pub mod auth;
#[cfg(feature = "server")]
pub mod cache;
pub mod db;
pub mod domain;
#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
pub mod schema;
#[cfg(feature = "server")]
pub mod services;

/// Role every staff member needs to see CRM pages.
pub const SERVICE_ACCESS_ROLE: &str = "crm";
/// Role for branch administration: approvals, team, settings, imports.
pub const SERVICE_ADMIN_ROLE: &str = "crm_admin";
/// Role marking a user as a sales rep with customer assignments.
pub const SERVICE_MANAGER_ROLE: &str = "crm_manager";
/// Pseudo-role carried by customer portal tokens.
pub const PORTAL_ROLE: &str = "portal";

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    // Establish Diesel connection pool for the SQLite database.
    let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
        std::io::Error::other(format!("Failed to establish database connection: {e}"))
    })?;

    let repo = DieselRepository::new(pool);

    // Keys and stores for identity, sessions, and flash messages.
    let secret_key = Key::from(server_config.secret.as_bytes());

    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let tera = Tera::new(&server_config.templates_dir)
        .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

    let kanban_cache = web::Data::new(KanbanCache::new());

    let bind_address = (server_config.bind_address.clone(), server_config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(message_framework.clone())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false) // set to true in prod
                    .build(),
            )
            .wrap(actix_middleware::Compress::default())
            .wrap(actix_middleware::Logger::default())
            .service(Files::new("/assets", "./assets"))
            .service(
                web::scope("/api")
                    .service(kanban_board)
                    .service(kanban_move)
                    .service(api_v1_customers)
                    .service(api_v1_vehicle_stages),
            )
            .service(
                web::scope("/portal")
                    .wrap(RedirectUnauthorized::to("/portal/signin"))
                    .service(show_portal_signin)
                    .service(portal_signin)
                    .service(portal_logout)
                    .service(portal_dashboard)
                    .service(portal_vehicle)
                    .service(portal_invoice),
            )
            .service(
                web::scope("")
                    .wrap(RedirectUnauthorized::default())
                    .service(show_signin)
                    .service(signin)
                    .service(logout)
                    .service(show_index)
                    .service(show_customer)
                    .service(add_customer)
                    .service(save_customer)
                    .service(delete_customer)
                    .service(rotate_portal_code)
                    .service(add_deposit)
                    .service(add_customer_document)
                    .service(delete_document)
                    .service(show_team)
                    .service(team_modal)
                    .service(assign_customers)
                    .service(show_vehicles)
                    .service(upload_vehicles)
                    .service(show_vehicle)
                    .service(add_vehicle)
                    .service(save_vehicle)
                    .service(assign_vehicle)
                    .service(change_stage)
                    .service(add_vehicle_document)
                    .service(show_inquiries)
                    .service(add_inquiry)
                    .service(save_inquiry)
                    .service(convert_inquiry)
                    .service(show_invoices)
                    .service(show_invoice)
                    .service(add_invoice)
                    .service(save_charges)
                    .service(save_discount)
                    .service(submit_invoice)
                    .service(approve_invoice)
                    .service(reject_invoice)
                    .service(finalize_invoice)
                    .service(add_payment)
                    .service(apply_wallet)
                    .service(add_cost_item)
                    .service(delete_cost_item)
                    .service(show_vendors)
                    .service(add_vendor)
                    .service(show_settings)
                    .service(save_settings)
                    .service(add_user),
            )
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(server_config.clone()))
            .app_data(kanban_cache.clone())
    })
    .bind(bind_address)?
    .run()
    .await
}
