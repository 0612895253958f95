//! JSON endpoints under `/api`. These return bare status codes; the
//! scope carries no sign-in redirect.

use actix_web::{HttpResponse, Responder, get, patch, web};
use serde::Deserialize;

use crate::cache::KanbanCache;
use crate::domain::auth::AuthenticatedUser;
use crate::dto::kanban::KanbanMove;
use crate::repository::DieselRepository;
use crate::services::{ServiceError, api as api_service, kanban as kanban_service};

/// Board reads go through the per-branch cache; a miss assembles the
/// board and stores it for the next 30 seconds of polling.
#[get("/kanban")]
pub async fn kanban_board(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    cache: web::Data<KanbanCache>,
) -> impl Responder {
    if let Some(board) = cache.get(user.branch_id) {
        return HttpResponse::Ok().json(board);
    }

    match kanban_service::load_board(repo.get_ref(), &user) {
        Ok(board) => {
            cache.store(user.branch_id, board.clone());
            HttpResponse::Ok().json(board)
        }
        Err(ServiceError::Unauthorized) => HttpResponse::Unauthorized().finish(),
        Err(err) => {
            log::error!("Failed to load the kanban board: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[patch("/kanban")]
pub async fn kanban_move(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    cache: web::Data<KanbanCache>,
    body: web::Json<KanbanMove>,
) -> impl Responder {
    match kanban_service::move_card(repo.get_ref(), &user, body.into_inner()) {
        Ok(()) => {
            cache.invalidate(user.branch_id);
            HttpResponse::NoContent().finish()
        }
        Err(ServiceError::Unauthorized) => HttpResponse::Unauthorized().finish(),
        Err(ServiceError::NotFound) => HttpResponse::NotFound().finish(),
        Err(ServiceError::Form(message) | ServiceError::TypeConstraint(message)) => {
            HttpResponse::BadRequest().json(serde_json::json!({ "error": message }))
        }
        Err(err) => {
            log::error!("Failed to move the kanban card: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[derive(Deserialize)]
struct ApiV1CustomersQueryParams {
    query: Option<String>,
    page: Option<usize>,
}

#[get("/v1/customers")]
pub async fn api_v1_customers(
    params: web::Query<ApiV1CustomersQueryParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match api_service::search_customers(
        repo.get_ref(),
        &user,
        params.query.as_deref(),
        params.page.unwrap_or(1),
    ) {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(ServiceError::Unauthorized) => HttpResponse::Unauthorized().finish(),
        Err(err) => {
            log::error!("Failed to search customers: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/v1/vehicles/{vehicle_id}/stages")]
pub async fn api_v1_vehicle_stages(
    vehicle_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match api_service::vehicle_stages(repo.get_ref(), &user, vehicle_id.into_inner()) {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(ServiceError::Unauthorized) => HttpResponse::Unauthorized().finish(),
        Err(ServiceError::NotFound) => HttpResponse::NotFound().finish(),
        Err(err) => {
            log::error!("Failed to load vehicle stages: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
