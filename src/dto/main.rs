use crate::domain::customer::Customer;
use crate::pagination::Paginated;

/// Query parameters accepted by the customer index service.
#[derive(Debug, Default)]
pub struct IndexQuery {
    /// Optional search string entered by the user.
    pub search: Option<String>,
    /// Page number requested by the user interface.
    pub page: Option<usize>,
}

/// Data required to render the customer index template.
pub struct IndexPageData {
    /// Paginated list of customers to show in the table.
    pub customers: Paginated<Customer>,
    /// Search query echoed back to the template when present.
    pub search_query: Option<String>,
}
