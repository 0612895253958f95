use serde::{Deserialize, Serialize};

use crate::domain::inquiry::Inquiry;
use crate::domain::user::User;

/// One inquiry card on the board. Only assigned inquiries become cards.
#[derive(Debug, Clone, Serialize)]
pub struct KanbanCard {
    pub id: i32,
    pub customer_name: String,
    pub vehicle_request: String,
    pub budget_display: Option<String>,
    pub assigned_user_id: i32,
    pub assigned_user_name: String,
    pub stage: String,
}

/// One column of the board, cards newest first.
#[derive(Debug, Clone, Serialize)]
pub struct KanbanColumn {
    pub stage: String,
    pub cards: Vec<KanbanCard>,
}

/// The board payload served by the kanban API and held in the cache.
#[derive(Debug, Clone, Serialize)]
pub struct KanbanBoard {
    pub columns: Vec<KanbanColumn>,
    /// Inquiries hidden from the board because nobody owns them yet.
    pub unassigned: usize,
}

/// PATCH body moving a card and optionally reassigning it.
#[derive(Debug, Deserialize)]
pub struct KanbanMove {
    pub inquiry_id: i32,
    pub stage: String,
    pub assigned_user_id: Option<i32>,
}

/// Data required to render the board page shell.
pub struct InquiriesPageData {
    /// Sales reps for the add/edit modals.
    pub users: Vec<User>,
    pub stages: Vec<&'static str>,
    /// Inquiries waiting for an owner; the board itself never shows them.
    pub unassigned: Vec<Inquiry>,
}
