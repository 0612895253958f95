use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::forms::customer::{
    AddCustomerDocumentForm, AddCustomerForm, DepositForm, SaveCustomerForm,
};
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template};
use crate::services::{ServiceError, customer as customer_service};

#[get("/customer/{customer_id}")]
pub async fn show_customer(
    customer_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match customer_service::load_customer_page(repo.get_ref(), &user, customer_id.into_inner()) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "index");
            context.insert("customer", &data.customer);
            context.insert("reps", &data.reps);
            context.insert("wallet_balance", &data.wallet_balance);
            context.insert("wallet_display", &data.wallet_display);
            context.insert("vehicles", &data.vehicles);
            context.insert("invoices", &data.invoices);
            context.insert("transactions", &data.transactions);
            context.insert("documents", &data.documents);

            render_template(&tera, "customer/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Customer not found.").send();
            redirect("/")
        }
        Err(err) => {
            log::error!("Failed to load customer: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/customer/add")]
pub async fn add_customer(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AddCustomerForm>,
) -> impl Responder {
    match customer_service::add_customer(repo.get_ref(), &user, form) {
        Ok(()) => {
            FlashMessage::success("Customer added.").send();
            redirect("/")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::Form(message) | ServiceError::TypeConstraint(message)) => {
            FlashMessage::error(message).send();
            redirect("/")
        }
        Err(err) => {
            log::error!("Failed to add a customer: {err}");
            FlashMessage::error("Failed to add the customer.").send();
            redirect("/")
        }
    }
}

#[post("/customer/save")]
pub async fn save_customer(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<SaveCustomerForm>,
) -> impl Responder {
    let customer_id = form.id;
    match customer_service::save_customer(repo.get_ref(), &user, form) {
        Ok(()) => {
            FlashMessage::success("Customer updated.").send();
            redirect(&format!("/customer/{customer_id}"))
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("This customer is not assigned to you.").send();
            redirect("/")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Customer not found.").send();
            redirect("/")
        }
        Err(ServiceError::Form(message) | ServiceError::TypeConstraint(message)) => {
            FlashMessage::error(message).send();
            redirect(&format!("/customer/{customer_id}"))
        }
        Err(err) => {
            log::error!("Failed to update customer: {err}");
            FlashMessage::error("Failed to update the customer.").send();
            redirect(&format!("/customer/{customer_id}"))
        }
    }
}

#[post("/customer/{customer_id}/delete")]
pub async fn delete_customer(
    customer_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let customer_id = customer_id.into_inner();
    match customer_service::delete_customer(repo.get_ref(), &user, customer_id) {
        Ok(()) => {
            FlashMessage::success("Customer deleted.").send();
            redirect("/")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Customer not found.").send();
            redirect("/")
        }
        Err(ServiceError::Conflict(message)) => {
            FlashMessage::error(message).send();
            redirect(&format!("/customer/{customer_id}"))
        }
        Err(err) => {
            log::error!("Failed to delete customer: {err}");
            FlashMessage::error("Failed to delete the customer.").send();
            redirect(&format!("/customer/{customer_id}"))
        }
    }
}

#[post("/customer/{customer_id}/portal-code")]
pub async fn rotate_portal_code(
    customer_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let customer_id = customer_id.into_inner();
    match customer_service::rotate_portal_code(repo.get_ref(), &user, customer_id) {
        Ok(code) => {
            FlashMessage::success(format!("New portal access code: {code}")).send();
            redirect(&format!("/customer/{customer_id}"))
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Customer not found.").send();
            redirect("/")
        }
        Err(err) => {
            log::error!("Failed to rotate portal code: {err}");
            FlashMessage::error("Failed to rotate the portal code.").send();
            redirect(&format!("/customer/{customer_id}"))
        }
    }
}

#[post("/customer/{customer_id}/deposit")]
pub async fn add_deposit(
    customer_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<DepositForm>,
) -> impl Responder {
    let customer_id = customer_id.into_inner();
    match customer_service::add_deposit(repo.get_ref(), &user, customer_id, form) {
        Ok(()) => {
            FlashMessage::success("Deposit recorded.").send();
            redirect(&format!("/customer/{customer_id}"))
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Customer not found.").send();
            redirect("/")
        }
        Err(ServiceError::Form(message) | ServiceError::TypeConstraint(message)) => {
            FlashMessage::error(message).send();
            redirect(&format!("/customer/{customer_id}"))
        }
        Err(err) => {
            log::error!("Failed to record deposit: {err}");
            FlashMessage::error("Failed to record the deposit.").send();
            redirect(&format!("/customer/{customer_id}"))
        }
    }
}

#[post("/customer/document")]
pub async fn add_customer_document(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AddCustomerDocumentForm>,
) -> impl Responder {
    let customer_id = form.id;
    match customer_service::add_customer_document(repo.get_ref(), &user, form) {
        Ok(()) => {
            FlashMessage::success("Document attached.").send();
            redirect(&format!("/customer/{customer_id}"))
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Customer not found.").send();
            redirect("/")
        }
        Err(ServiceError::Form(message) | ServiceError::TypeConstraint(message)) => {
            FlashMessage::error(message).send();
            redirect(&format!("/customer/{customer_id}"))
        }
        Err(err) => {
            log::error!("Failed to attach document: {err}");
            FlashMessage::error("Failed to attach the document.").send();
            redirect(&format!("/customer/{customer_id}"))
        }
    }
}

#[post("/document/{document_id}/delete")]
pub async fn delete_document(
    document_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match customer_service::delete_document(repo.get_ref(), &user, document_id.into_inner()) {
        Ok(document) => {
            FlashMessage::success("Document removed.").send();
            match (document.customer_id, document.vehicle_id) {
                (Some(customer_id), _) => redirect(&format!("/customer/{customer_id}")),
                (_, Some(vehicle_id)) => redirect(&format!("/vehicle/{vehicle_id}")),
                _ => redirect("/"),
            }
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Document not found.").send();
            redirect("/")
        }
        Err(err) => {
            log::error!("Failed to delete document: {err}");
            FlashMessage::error("Failed to delete the document.").send();
            redirect("/")
        }
    }
}
