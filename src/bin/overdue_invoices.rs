//! Cron worker flagging finalized invoices that are past due. It only
//! reports; chasing the money stays with the branch staff.

use std::collections::HashMap;
use std::env;

use chrono::{Duration, NaiveDate, Utc};
use config::Config;
use dotenvy::dotenv;

use autolane_crm::db::establish_connection_pool;
use autolane_crm::domain::invoice::Invoice;
use autolane_crm::domain::settings::BranchSettings;
use autolane_crm::models::config::ServerConfig;
use autolane_crm::repository::{DieselRepository, InvoiceReader, SettingsReader};

/// Past due once `due_on` has passed; invoices without a due date get
/// the branch grace window counted from the issue date.
fn past_due(invoice: &Invoice, settings: &BranchSettings, today: NaiveDate) -> bool {
    if invoice.due_on.is_some() {
        return invoice.is_overdue(today);
    }
    invoice.issued_on + Duration::days(settings.overdue_after_days.into()) < today
}

fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // Select config profile (defaults to `local`).
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    let settings = Config::builder()
        // Add `./config/default.yaml`
        .add_source(config::File::with_name("config/default"))
        // Add environment-specific overrides
        .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
        // Add settings from the environment (with a prefix of APP)
        .add_source(config::Environment::with_prefix("APP"))
        .build();

    let settings = match settings {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("Error loading settings: {err}");
            std::process::exit(1);
        }
    };

    let server_config = match settings.try_deserialize::<ServerConfig>() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {err}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(err) => {
            log::error!("Failed to establish database connection: {err}");
            std::process::exit(1);
        }
    };
    let repo = DieselRepository::new(pool);

    let unsettled = match repo.list_unsettled_invoices() {
        Ok(unsettled) => unsettled,
        Err(err) => {
            log::error!("Failed to list unsettled invoices: {err}");
            std::process::exit(1);
        }
    };

    let today = Utc::now().date_naive();
    let mut branch_settings: HashMap<i32, BranchSettings> = HashMap::new();
    let mut overdue = 0usize;

    for invoice in &unsettled {
        let settings = match branch_settings.get(&invoice.branch_id) {
            Some(settings) => settings,
            None => match repo.get_branch_settings(invoice.branch_id) {
                Ok(settings) => branch_settings.entry(invoice.branch_id).or_insert(settings),
                Err(err) => {
                    log::error!(
                        "Failed to load settings for branch {}: {err}",
                        invoice.branch_id
                    );
                    continue;
                }
            },
        };

        if past_due(invoice, settings, today) {
            overdue += 1;
            log::warn!(
                "Invoice {} (branch {}, customer {}) issued {} is overdue; payment status: {}",
                invoice.number,
                invoice.branch_id,
                invoice.customer_id,
                invoice.issued_on,
                invoice.payment_status.as_str()
            );
        }
    }

    log::info!(
        "Checked {} unsettled invoices; {} overdue",
        unsettled.len(),
        overdue
    );
}
