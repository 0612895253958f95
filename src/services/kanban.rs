//! Sales inquiry kanban: board assembly, card moves, and conversion of
//! won inquiries into customers.

use std::collections::HashMap;

use validator::Validate;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::customer::NewCustomer;
use crate::domain::inquiry::{KanbanStage, NewInquiry, UpdateInquiry};
use crate::domain::types::{Currency, normalize_phone_to_e164};
use crate::dto::kanban::{InquiriesPageData, KanbanBoard, KanbanCard, KanbanColumn, KanbanMove};
use crate::forms::kanban::{AddInquiryForm, SaveInquiryForm};
use crate::repository::{
    CustomerReader, CustomerWriter, InquiryReader, InquiryWriter, UserReader,
};
use crate::routes::ensure_role;
use crate::services::customer::generate_portal_code;
use crate::services::{ServiceError, ServiceResult};
use crate::SERVICE_ACCESS_ROLE;

fn stage_names() -> Vec<&'static str> {
    KanbanStage::ALL.iter().map(|stage| stage.as_str()).collect()
}

fn parse_currency(raw: &str) -> ServiceResult<Currency> {
    if raw.trim().is_empty() {
        Ok(Currency::default())
    } else {
        Ok(raw.parse()?)
    }
}

/// Assembles the board: one column per stage, cards newest first, plus
/// the count of inquiries nobody owns yet.
pub fn load_board<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<KanbanBoard>
where
    R: InquiryReader + UserReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let inquiries = repo.list_inquiries(user.branch_id).map_err(|err| {
        log::error!("Failed to list inquiries: {err}");
        err
    })?;
    let users = repo.list_users(user.branch_id)?;
    let names: HashMap<i32, &str> = users.iter().map(|u| (u.id, u.name.as_str())).collect();

    let mut columns: Vec<KanbanColumn> = KanbanStage::ALL
        .iter()
        .map(|stage| KanbanColumn {
            stage: stage.as_str().to_string(),
            cards: Vec::new(),
        })
        .collect();
    let mut unassigned = 0;

    for inquiry in inquiries {
        let Some(assigned_user_id) = inquiry.assigned_user_id else {
            unassigned += 1;
            continue;
        };

        let card = KanbanCard {
            id: inquiry.id,
            customer_name: inquiry.customer_name,
            vehicle_request: inquiry.vehicle_request,
            budget_display: inquiry
                .budget
                .map(|budget| inquiry.currency.format_minor(budget)),
            assigned_user_id,
            assigned_user_name: names
                .get(&assigned_user_id)
                .map(|name| name.to_string())
                .unwrap_or_default(),
            stage: inquiry.stage.as_str().to_string(),
        };

        if let Some(column) = columns.iter_mut().find(|column| column.stage == card.stage) {
            column.cards.push(card);
        }
    }

    Ok(KanbanBoard { columns, unassigned })
}

/// Loads the shell data for the inquiries page; the board itself comes
/// over the API. Unassigned inquiries are listed here so somebody can
/// claim them, since the board hides them.
pub fn load_inquiries_page<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<InquiriesPageData>
where
    R: InquiryReader + UserReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let users = repo.list_users(user.branch_id)?;
    let unassigned = repo
        .list_inquiries(user.branch_id)?
        .into_iter()
        .filter(|inquiry| inquiry.assigned_user_id.is_none())
        .collect();

    Ok(InquiriesPageData {
        users,
        stages: stage_names(),
        unassigned,
    })
}

/// Logs a new inquiry. It starts unassigned in the `new` column.
pub fn add_inquiry<R>(repo: &R, user: &AuthenticatedUser, form: AddInquiryForm) -> ServiceResult<()>
where
    R: InquiryWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    if form.validate().is_err() {
        return Err(ServiceError::Form("Invalid form input".to_string()));
    }

    let currency = parse_currency(&form.currency)?;
    let new_inquiry = NewInquiry::new(
        user.branch_id,
        &form.customer_name,
        Some(form.contact.as_str()),
        &form.vehicle_request,
        form.budget,
        currency,
        None,
        Some(form.source.as_str()),
        Some(form.note.as_str()),
    )?;

    repo.create_inquiry(&new_inquiry).map_err(|err| {
        log::error!("Failed to add inquiry: {err}");
        err
    })?;

    Ok(())
}

/// Saves inquiry edits and applies any assignment change.
pub fn save_inquiry<R>(repo: &R, user: &AuthenticatedUser, form: SaveInquiryForm) -> ServiceResult<()>
where
    R: InquiryReader + InquiryWriter + UserReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    if form.validate().is_err() {
        return Err(ServiceError::Form("Invalid form input".to_string()));
    }

    let inquiry = repo
        .get_inquiry_by_id(form.id, user.branch_id)?
        .ok_or(ServiceError::NotFound)?;

    if let Some(assigned_user_id) = form.assigned_user_id
        && repo
            .get_user_by_id(assigned_user_id, user.branch_id)?
            .is_none()
    {
        return Err(ServiceError::Form("Unknown sales rep".to_string()));
    }

    let currency = parse_currency(&form.currency)?;
    let updates = UpdateInquiry::new(
        &form.customer_name,
        Some(form.contact.as_str()),
        &form.vehicle_request,
        form.budget,
        currency,
        Some(form.source.as_str()),
        Some(form.note.as_str()),
    )?;

    repo.update_inquiry(inquiry.id, &updates).map_err(|err| {
        log::error!("Failed to update inquiry: {err}");
        err
    })?;

    if form.assigned_user_id != inquiry.assigned_user_id {
        repo.move_inquiry(inquiry.id, inquiry.stage, Some(form.assigned_user_id))
            .map_err(|err| {
                log::error!("Failed to reassign inquiry: {err}");
                err
            })?;
    }

    Ok(())
}

/// Moves a card to another stage, optionally reassigning it on the way.
/// An absent `assigned_user_id` leaves the assignment untouched.
pub fn move_card<R>(repo: &R, user: &AuthenticatedUser, body: KanbanMove) -> ServiceResult<()>
where
    R: InquiryReader + InquiryWriter + UserReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let stage: KanbanStage = body.stage.parse()?;

    let inquiry = repo
        .get_inquiry_by_id(body.inquiry_id, user.branch_id)?
        .ok_or(ServiceError::NotFound)?;

    if let Some(assigned_user_id) = body.assigned_user_id
        && repo
            .get_user_by_id(assigned_user_id, user.branch_id)?
            .is_none()
    {
        return Err(ServiceError::Form("Unknown sales rep".to_string()));
    }

    repo.move_inquiry(inquiry.id, stage, body.assigned_user_id.map(Some))
        .map_err(|err| {
            log::error!("Failed to move inquiry: {err}");
            err
        })?;

    Ok(())
}

/// Marks the inquiry won and creates a customer from its contact data,
/// unless one with the same email already exists in the branch.
pub fn convert_inquiry<R>(repo: &R, user: &AuthenticatedUser, inquiry_id: i32) -> ServiceResult<()>
where
    R: InquiryReader + InquiryWriter + CustomerReader + CustomerWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let inquiry = repo
        .get_inquiry_by_id(inquiry_id, user.branch_id)?
        .ok_or(ServiceError::NotFound)?;

    // The contact field holds either an email or a phone number. Junk
    // that parses as neither is dropped rather than blocking the
    // conversion.
    let (email, phone) = match inquiry.contact.as_deref() {
        Some(contact) if contact.contains('@') => (Some(contact), None),
        Some(contact) if normalize_phone_to_e164(contact).is_ok() => (None, Some(contact)),
        _ => (None, None),
    };

    let existing = match email {
        Some(email) => repo.get_customer_by_email(email, user.branch_id)?,
        None => None,
    };

    if existing.is_none() {
        let new_customer = NewCustomer::new(
            user.branch_id,
            &inquiry.customer_name,
            email,
            phone,
            None,
            None,
            generate_portal_code(),
        )?;
        repo.create_customers(&[new_customer]).map_err(|err| {
            log::error!("Failed to create customer from inquiry: {err}");
            err
        })?;
    }

    repo.move_inquiry(inquiry.id, KanbanStage::Won, None)
        .map_err(|err| {
            log::error!("Failed to close inquiry: {err}");
            err
        })?;

    Ok(())
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::customer::Customer;
    use crate::domain::inquiry::Inquiry;
    use crate::domain::user::User;
    use crate::repository::mock::MockRepository;

    fn staff_user() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "3".to_string(),
            email: "rep@example.com".to_string(),
            branch_id: 42,
            name: "Rep".to_string(),
            roles: vec![SERVICE_ACCESS_ROLE.to_string()],
            exp: 0,
        }
    }

    fn timestamp() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn build_user(id: i32, name: &str) -> User {
        User {
            id,
            branch_id: 42,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash: String::new(),
            roles: vec!["crm".to_string(), "crm_manager".to_string()],
            created_at: timestamp(),
        }
    }

    fn build_inquiry(
        id: i32,
        stage: KanbanStage,
        assigned_user_id: Option<i32>,
        contact: Option<&str>,
    ) -> Inquiry {
        Inquiry {
            id,
            branch_id: 42,
            customer_name: format!("Lead {id}"),
            contact: contact.map(|c| c.to_string()),
            vehicle_request: "Low-mileage Corolla".to_string(),
            budget: Some(800_000),
            currency: Currency::Jpy,
            stage,
            assigned_user_id,
            source: None,
            note: None,
            created_at: timestamp(),
            updated_at: timestamp(),
        }
    }

    /// Unassigned inquiries never become cards, only a counter.
    #[test]
    fn board_hides_unassigned_inquiries() {
        let mut repo = MockRepository::new();
        repo.expect_list_inquiries().times(1).returning(|_| {
            Ok(vec![
                build_inquiry(1, KanbanStage::New, Some(3), None),
                build_inquiry(2, KanbanStage::New, None, None),
                build_inquiry(3, KanbanStage::Won, Some(3), None),
            ])
        });
        repo.expect_list_users()
            .times(1)
            .returning(|_| Ok(vec![build_user(3, "Rep")]));

        let board = load_board(&repo, &staff_user()).expect("should build");

        assert_eq!(board.unassigned, 1);
        assert_eq!(board.columns.len(), KanbanStage::ALL.len());
        assert_eq!(board.columns[0].stage, "new");
        assert_eq!(board.columns[0].cards.len(), 1);
        let won = board
            .columns
            .iter()
            .find(|column| column.stage == "won")
            .expect("won column");
        assert_eq!(won.cards.len(), 1);
        assert_eq!(won.cards[0].assigned_user_name, "Rep");
    }

    #[test]
    fn board_formats_the_budget() {
        let mut repo = MockRepository::new();
        repo.expect_list_inquiries()
            .times(1)
            .returning(|_| Ok(vec![build_inquiry(1, KanbanStage::New, Some(3), None)]));
        repo.expect_list_users()
            .times(1)
            .returning(|_| Ok(vec![build_user(3, "Rep")]));

        let board = load_board(&repo, &staff_user()).expect("should build");

        assert_eq!(
            board.columns[0].cards[0].budget_display.as_deref(),
            Some("¥800,000")
        );
    }

    /// An unknown stage in the PATCH body is rejected before any lookup.
    #[test]
    fn move_rejects_unknown_stage() {
        let mut repo = MockRepository::new();
        repo.expect_get_inquiry_by_id().times(0);
        repo.expect_move_inquiry().times(0);

        let body = KanbanMove {
            inquiry_id: 1,
            stage: "parked".to_string(),
            assigned_user_id: None,
        };

        let result = move_card(&repo, &staff_user(), body);
        assert!(matches!(result, Err(ServiceError::TypeConstraint(_))));
    }

    /// Omitting the assignee in a move leaves the assignment untouched.
    #[test]
    fn move_without_assignee_keeps_the_owner() {
        let mut repo = MockRepository::new();
        repo.expect_get_inquiry_by_id()
            .returning(|id, _| Ok(Some(build_inquiry(id, KanbanStage::New, Some(3), None))));
        repo.expect_move_inquiry()
            .withf(|inquiry_id, stage, assign| {
                *inquiry_id == 1 && *stage == KanbanStage::Contacted && assign.is_none()
            })
            .times(1)
            .returning(|id, stage, _| Ok(build_inquiry(id, stage, Some(3), None)));

        let body = KanbanMove {
            inquiry_id: 1,
            stage: "contacted".to_string(),
            assigned_user_id: None,
        };

        move_card(&repo, &staff_user(), body).expect("should move");
    }

    /// Converting an inquiry with a fresh email creates the customer and
    /// closes the card as won.
    #[test]
    fn convert_creates_a_customer_and_wins_the_card() {
        let mut repo = MockRepository::new();
        repo.expect_get_inquiry_by_id().returning(|id, _| {
            Ok(Some(build_inquiry(
                id,
                KanbanStage::Negotiating,
                Some(3),
                Some("lead@example.com"),
            )))
        });
        repo.expect_get_customer_by_email()
            .withf(|email, _| email == "lead@example.com")
            .times(1)
            .returning(|_, _| Ok(None));
        repo.expect_create_customers()
            .withf(|customers| {
                customers.len() == 1 && customers[0].email.as_deref() == Some("lead@example.com")
            })
            .times(1)
            .returning(|_| Ok(1));
        repo.expect_move_inquiry()
            .withf(|_, stage, assign| *stage == KanbanStage::Won && assign.is_none())
            .times(1)
            .returning(|id, stage, _| Ok(build_inquiry(id, stage, Some(3), None)));

        convert_inquiry(&repo, &staff_user(), 7).expect("should convert");
    }

    /// A second conversion with the same email must not duplicate the
    /// customer.
    #[test]
    fn convert_reuses_an_existing_customer() {
        let mut repo = MockRepository::new();
        repo.expect_get_inquiry_by_id().returning(|id, _| {
            Ok(Some(build_inquiry(
                id,
                KanbanStage::Negotiating,
                Some(3),
                Some("lead@example.com"),
            )))
        });
        repo.expect_get_customer_by_email().times(1).returning(|_, _| {
            Ok(Some(Customer {
                id: 11,
                branch_id: 42,
                name: "Lead 7".to_string(),
                email: Some("lead@example.com".to_string()),
                phone: None,
                address: None,
                country: None,
                portal_code: "AAAABBBB".to_string(),
                created_at: timestamp(),
                updated_at: timestamp(),
            }))
        });
        repo.expect_create_customers().times(0);
        repo.expect_move_inquiry()
            .times(1)
            .returning(|id, stage, _| Ok(build_inquiry(id, stage, Some(3), None)));

        convert_inquiry(&repo, &staff_user(), 7).expect("should convert");
    }
}
