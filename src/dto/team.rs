use serde::Serialize;

use crate::domain::customer::Customer;
use crate::domain::user::User;

/// A sales rep with the customers assigned to them.
#[derive(Debug, Clone, Serialize)]
pub struct RepWithCustomers {
    pub user: User,
    pub customers: Vec<Customer>,
}

/// Data required to render the team page.
pub struct TeamPageData {
    pub reps: Vec<RepWithCustomers>,
}

/// Data for the assignment modal: every branch customer with the current
/// assignment marked.
pub struct AssignModalData {
    pub rep: User,
    pub customers: Vec<Customer>,
    pub assigned_ids: Vec<i32>,
}
