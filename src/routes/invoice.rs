use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use serde::Deserialize;
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::dto::invoice::InvoicesQuery;
use crate::forms::invoice::{
    AddCostItemForm, AddInvoiceForm, ChargesForm, DiscountForm, PaymentForm, WalletApplyForm,
};
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template};
use crate::services::{ServiceError, invoice as invoice_service};

#[derive(Deserialize)]
struct InvoicesQueryParams {
    status: Option<String>,
    payment_status: Option<String>,
    customer_id: Option<i32>,
    page: Option<usize>,
}

#[get("/invoices")]
pub async fn show_invoices(
    params: web::Query<InvoicesQueryParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let params = params.into_inner();
    let query = InvoicesQuery {
        status: params.status,
        payment_status: params.payment_status,
        customer_id: params.customer_id,
        page: params.page,
    };

    match invoice_service::load_invoices_page(repo.get_ref(), &user, query) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "invoices");
            context.insert("invoices", &data.invoices);
            context.insert("statuses", &data.statuses);
            context.insert("payment_statuses", &data.payment_statuses);
            if let Some(status_filter) = &data.status_filter {
                context.insert("status_filter", status_filter);
            }
            if let Some(payment_filter) = &data.payment_filter {
                context.insert("payment_filter", payment_filter);
            }

            render_template(&tera, "invoices/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::TypeConstraint(message)) => {
            FlashMessage::error(message).send();
            redirect("/invoices")
        }
        Err(err) => {
            log::error!("Failed to load invoices: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/invoice/{invoice_id}")]
pub async fn show_invoice(
    invoice_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match invoice_service::load_invoice_page(repo.get_ref(), &user, invoice_id.into_inner()) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "invoices");
            context.insert("invoice", &data.invoice);
            context.insert("customer", &data.customer);
            context.insert("vehicle", &data.vehicle);
            context.insert("status_label", &data.status_label);
            context.insert("payment_label", &data.payment_label);
            context.insert("charges", &data.charges);
            context.insert("totals", &data.totals);
            context.insert("transactions", &data.transactions);
            context.insert("cost", &data.cost);
            context.insert("wallet_display", &data.wallet_display);
            context.insert("wallet_balance", &data.wallet_balance);
            context.insert("vendors", &data.vendors);
            context.insert("categories", &data.categories);
            context.insert("can_edit", &data.can_edit);
            context.insert("can_submit", &data.can_submit);
            context.insert("can_approve", &data.can_approve);
            context.insert("can_reject", &data.can_reject);
            context.insert("can_finalize", &data.can_finalize);
            context.insert("can_pay", &data.can_pay);

            render_template(&tera, "invoices/detail.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Invoice not found.").send();
            redirect("/invoices")
        }
        Err(err) => {
            log::error!("Failed to load invoice: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/invoice/add")]
pub async fn add_invoice(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AddInvoiceForm>,
) -> impl Responder {
    match invoice_service::add_invoice(repo.get_ref(), &user, form) {
        Ok(invoice) => {
            FlashMessage::success(format!("Invoice {} created.", invoice.number)).send();
            redirect(&format!("/invoice/{}", invoice.id))
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::Form(message) | ServiceError::TypeConstraint(message)) => {
            FlashMessage::error(message).send();
            redirect("/invoices")
        }
        Err(err) => {
            log::error!("Failed to create invoice: {err}");
            FlashMessage::error("Failed to create the invoice.").send();
            redirect("/invoices")
        }
    }
}

/// Charge rows arrive as repeated `description`/`quantity`/`unit_amount`/
/// `taxable` keys, one set per row, so the body is parsed by hand.
#[post("/invoice/{invoice_id}/charges")]
pub async fn save_charges(
    invoice_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    body: web::Bytes,
) -> impl Responder {
    let invoice_id = invoice_id.into_inner();
    let form: ChargesForm = match serde_html_form::from_bytes(&body) {
        Ok(form) => form,
        Err(err) => {
            log::error!("Failed to parse charges form: {err}");
            FlashMessage::error("Invalid form input").send();
            return redirect(&format!("/invoice/{invoice_id}"));
        }
    };

    match invoice_service::save_charges(repo.get_ref(), &user, invoice_id, &form) {
        Ok(()) => {
            FlashMessage::success("Charges saved.").send();
            redirect(&format!("/invoice/{invoice_id}"))
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Invoice not found.").send();
            redirect("/invoices")
        }
        Err(ServiceError::Locked) => {
            FlashMessage::error("The invoice is finalized and cannot change.").send();
            redirect(&format!("/invoice/{invoice_id}"))
        }
        Err(
            ServiceError::Form(message)
            | ServiceError::Conflict(message)
            | ServiceError::TypeConstraint(message),
        ) => {
            FlashMessage::error(message).send();
            redirect(&format!("/invoice/{invoice_id}"))
        }
        Err(err) => {
            log::error!("Failed to save charges: {err}");
            FlashMessage::error("Failed to save the charges.").send();
            redirect(&format!("/invoice/{invoice_id}"))
        }
    }
}

#[post("/invoice/{invoice_id}/discount")]
pub async fn save_discount(
    invoice_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<DiscountForm>,
) -> impl Responder {
    let invoice_id = invoice_id.into_inner();
    match invoice_service::save_discount(repo.get_ref(), &user, invoice_id, form) {
        Ok(()) => {
            FlashMessage::success("Discount saved.").send();
            redirect(&format!("/invoice/{invoice_id}"))
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Invoice not found.").send();
            redirect("/invoices")
        }
        Err(ServiceError::Locked) => {
            FlashMessage::error("The invoice is finalized and cannot change.").send();
            redirect(&format!("/invoice/{invoice_id}"))
        }
        Err(ServiceError::Form(message) | ServiceError::Conflict(message)) => {
            FlashMessage::error(message).send();
            redirect(&format!("/invoice/{invoice_id}"))
        }
        Err(err) => {
            log::error!("Failed to save discount: {err}");
            FlashMessage::error("Failed to save the discount.").send();
            redirect(&format!("/invoice/{invoice_id}"))
        }
    }
}

#[post("/invoice/{invoice_id}/submit")]
pub async fn submit_invoice(
    invoice_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let invoice_id = invoice_id.into_inner();
    match invoice_service::submit_invoice(repo.get_ref(), &user, invoice_id) {
        Ok(()) => {
            FlashMessage::success("Invoice submitted for review.").send();
            redirect(&format!("/invoice/{invoice_id}"))
        }
        Err(err) => transition_error(err, invoice_id, "Failed to submit the invoice."),
    }
}

#[post("/invoice/{invoice_id}/approve")]
pub async fn approve_invoice(
    invoice_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let invoice_id = invoice_id.into_inner();
    match invoice_service::approve_invoice(repo.get_ref(), &user, invoice_id) {
        Ok(()) => {
            FlashMessage::success("Invoice approved.").send();
            redirect(&format!("/invoice/{invoice_id}"))
        }
        Err(err) => transition_error(err, invoice_id, "Failed to approve the invoice."),
    }
}

#[post("/invoice/{invoice_id}/reject")]
pub async fn reject_invoice(
    invoice_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let invoice_id = invoice_id.into_inner();
    match invoice_service::reject_invoice(repo.get_ref(), &user, invoice_id) {
        Ok(()) => {
            FlashMessage::success("Invoice sent back to draft.").send();
            redirect(&format!("/invoice/{invoice_id}"))
        }
        Err(err) => transition_error(err, invoice_id, "Failed to reject the invoice."),
    }
}

#[post("/invoice/{invoice_id}/finalize")]
pub async fn finalize_invoice(
    invoice_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let invoice_id = invoice_id.into_inner();
    match invoice_service::finalize_invoice(repo.get_ref(), &user, invoice_id) {
        Ok(()) => {
            FlashMessage::success("Invoice finalized.").send();
            redirect(&format!("/invoice/{invoice_id}"))
        }
        Err(err) => transition_error(err, invoice_id, "Failed to finalize the invoice."),
    }
}

/// Shared error arms for the four status transition handlers.
fn transition_error(err: ServiceError, invoice_id: i32, fallback: &str) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        ServiceError::NotFound => {
            FlashMessage::error("Invoice not found.").send();
            redirect("/invoices")
        }
        ServiceError::Locked => {
            FlashMessage::error("The invoice is finalized and cannot change.").send();
            redirect(&format!("/invoice/{invoice_id}"))
        }
        ServiceError::Form(message) | ServiceError::Conflict(message) => {
            FlashMessage::error(message).send();
            redirect(&format!("/invoice/{invoice_id}"))
        }
        err => {
            log::error!("Invoice transition failed: {err}");
            FlashMessage::error(fallback).send();
            redirect(&format!("/invoice/{invoice_id}"))
        }
    }
}

#[post("/invoice/{invoice_id}/payment")]
pub async fn add_payment(
    invoice_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<PaymentForm>,
) -> impl Responder {
    let invoice_id = invoice_id.into_inner();
    match invoice_service::add_payment(repo.get_ref(), &user, invoice_id, form) {
        Ok(()) => {
            FlashMessage::success("Payment recorded.").send();
            redirect(&format!("/invoice/{invoice_id}"))
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Invoice not found.").send();
            redirect("/invoices")
        }
        Err(
            ServiceError::Form(message)
            | ServiceError::Conflict(message)
            | ServiceError::TypeConstraint(message),
        ) => {
            FlashMessage::error(message).send();
            redirect(&format!("/invoice/{invoice_id}"))
        }
        Err(err) => {
            log::error!("Failed to record payment: {err}");
            FlashMessage::error("Failed to record the payment.").send();
            redirect(&format!("/invoice/{invoice_id}"))
        }
    }
}

#[post("/invoice/{invoice_id}/wallet-apply")]
pub async fn apply_wallet(
    invoice_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<WalletApplyForm>,
) -> impl Responder {
    let invoice_id = invoice_id.into_inner();
    match invoice_service::apply_wallet(repo.get_ref(), &user, invoice_id, form) {
        Ok(()) => {
            FlashMessage::success("Wallet balance applied.").send();
            redirect(&format!("/invoice/{invoice_id}"))
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Invoice not found.").send();
            redirect("/invoices")
        }
        Err(ServiceError::Form(message) | ServiceError::Conflict(message)) => {
            FlashMessage::error(message).send();
            redirect(&format!("/invoice/{invoice_id}"))
        }
        Err(err) => {
            log::error!("Failed to apply wallet: {err}");
            FlashMessage::error("Failed to apply the wallet balance.").send();
            redirect(&format!("/invoice/{invoice_id}"))
        }
    }
}

#[post("/invoice/{invoice_id}/costs")]
pub async fn add_cost_item(
    invoice_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AddCostItemForm>,
) -> impl Responder {
    let invoice_id = invoice_id.into_inner();
    match invoice_service::add_cost_item(repo.get_ref(), &user, invoice_id, form) {
        Ok(()) => {
            FlashMessage::success("Cost item added.").send();
            redirect(&format!("/invoice/{invoice_id}"))
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Invoice not found.").send();
            redirect("/invoices")
        }
        Err(ServiceError::Form(message) | ServiceError::TypeConstraint(message)) => {
            FlashMessage::error(message).send();
            redirect(&format!("/invoice/{invoice_id}"))
        }
        Err(err) => {
            log::error!("Failed to add cost item: {err}");
            FlashMessage::error("Failed to add the cost item.").send();
            redirect(&format!("/invoice/{invoice_id}"))
        }
    }
}

#[post("/invoice/{invoice_id}/costs/{cost_item_id}/delete")]
pub async fn delete_cost_item(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (invoice_id, cost_item_id) = path.into_inner();
    match invoice_service::delete_cost_item(repo.get_ref(), &user, invoice_id, cost_item_id) {
        Ok(()) => {
            FlashMessage::success("Cost item removed.").send();
            redirect(&format!("/invoice/{invoice_id}"))
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Cost item not found.").send();
            redirect(&format!("/invoice/{invoice_id}"))
        }
        Err(err) => {
            log::error!("Failed to delete cost item: {err}");
            FlashMessage::error("Failed to delete the cost item.").send();
            redirect(&format!("/invoice/{invoice_id}"))
        }
    }
}
