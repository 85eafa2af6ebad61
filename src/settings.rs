use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Postgres {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    #[serde(default = "default_listen")]
    pub listen: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Currency {
    pub symbol: String,
    /// `before` or `after` the amount.
    pub position: String,
    pub thousands_separator: String,
    pub decimal_separator: String,
    pub decimals: u32,
}

impl Default for Currency {
    fn default() -> Self {
        Self {
            symbol: "$".to_string(),
            position: "before".to_string(),
            thousands_separator: ",".to_string(),
            decimal_separator: ".".to_string(),
            decimals: 2,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Admin {
    /// Admin whose screen options the web pages read and store.
    pub user_id: i64,
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default)]
    pub currency: Currency,
}

#[derive(Debug, Deserialize)]
pub struct Gateway {
    pub url: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub postgres: Postgres,
    pub server: Server,
    pub admin: Admin,
    pub gateway: Gateway,
}

fn default_max_connections() -> u32 {
    5
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_date_format() -> String {
    "%B %-d, %Y".to_string()
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("PAYOUTS").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
