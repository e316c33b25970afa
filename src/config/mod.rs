use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

/// Configuration for the application, read from the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database connection URL
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Address the HTTP server binds to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Shared-admin credentials
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
    /// When true the invoice sequence restarts at 1 each calendar year
    #[serde(default = "default_true")]
    pub reset_sequence_each_year: bool,
    /// City preprinted on new invoices
    #[serde(default = "default_invoice_city")]
    pub invoice_city: String,
    /// Session inactivity timeout in minutes
    #[serde(default = "default_session_ttl_minutes")]
    pub session_ttl_minutes: u64,
}

fn default_database_url() -> String {
    "sqlite://fakturist.db?mode=rwc".to_string()
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_password() -> String {
    "admin123".to_string()
}

fn default_true() -> bool {
    true
}

fn default_invoice_city() -> String {
    "Wien".to_string()
}

fn default_session_ttl_minutes() -> u64 {
    120
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize environment variables into Config struct
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::from_env::<Config>()?;

        Ok(config)
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

/// Static issuer details used to seed the company row on first startup.
/// Editable in the database afterwards.
pub struct CompanySeed {
    pub name: &'static str,
    pub address: &'static str,
    pub uid: Option<&'static str>,
    pub employer_no: Option<&'static str>,
    pub email: Option<&'static str>,
    pub website: Option<&'static str>,
    pub reverse_charge_note: Option<&'static str>,
}

pub const COMPANY_SEED: CompanySeed = CompanySeed {
    name: "Sebastijan Alkesandar Kerculj e.U.",
    address: "Simmeringer Hauptstraße 24\nA - 1110 Wien",
    uid: Some("ATU78448967"),
    employer_no: Some("602379924"),
    email: Some("info@staffconnecting.at"),
    website: Some("www.staffconnecting.at"),
    reverse_charge_note: Some(
        "Übertrag der Steuerschuld für Bauleistungen gemäß § 19 Abs 1a UStG",
    ),
};

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    dotenv().ok();

    let config = Config::load()?;

    Ok(config)
}
