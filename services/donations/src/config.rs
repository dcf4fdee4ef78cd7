use serde::Deserialize;

use charity_core::config::Config;

/// Donations service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct DonationsConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Redis connection URL (chart cache).
    pub redis_url: String,
    /// HMAC secret for signing session cookies.
    pub secret_key: String,
    /// Human-readable logs instead of JSON.
    #[serde(default)]
    pub debug: bool,
    /// Public host used in emailed links (e.g. "charity.example.com").
    pub site_domain: String,
    /// Sender address written into outbound emails.
    #[serde(default = "default_from_email")]
    pub default_from_email: String,
    /// TCP port to listen on (default 3120). Env var: `DONATIONS_PORT`.
    #[serde(default = "default_port")]
    pub donations_port: u16,
    /// Cookie domain attribute.
    pub cookie_domain: String,
}

impl Config for DonationsConfig {}

fn default_from_email() -> String {
    "noreply@charity.local".to_owned()
}

fn default_port() -> u16 {
    3120
}
