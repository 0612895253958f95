use serde::Deserialize;

fn default_database_url() -> String {
    "autolane.db".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_session_ttl_days() -> i64 {
    7
}

fn default_templates_dir() -> String {
    "templates/**/*.html".to_string()
}

/// Server settings, deserialized from the environment in `main`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Secret for signing session tokens. No default on purpose.
    pub secret: String,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_session_ttl_days")]
    pub session_ttl_days: i64,
    /// Glob the Tera templates are loaded from.
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,
}
