use serde::Deserialize;

/// Assignment checkboxes arrive as repeated `customer_id` keys; the body
/// is decoded with `serde_html_form`.
#[derive(Deserialize)]
pub struct AssignCustomersForm {
    /// Sales rep whose assignments are being replaced.
    pub user_id: i32,
    #[serde(default)]
    pub customer_id: Vec<i32>,
}
