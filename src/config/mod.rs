//! Service configuration from environment variables (after `.env` is loaded).

use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
    /// `DATABASE_URL`
    pub database_url: String,
    /// `CUSTOMER_STORE`: `postgres` or `memory`.
    pub store: StoreKind,
    /// `DB_MAX_CONNECTIONS`
    pub max_connections: u32,
    /// `BIND_ADDR`
    pub bind_addr: String,
    /// `SEED_ON_STARTUP`: populate this many rows at startup when the table is empty.
    pub seed_on_startup: Option<u64>,
    /// `CREATE_DATABASE`: create the target database if it is missing.
    pub create_database: bool,
    /// `ENABLE_DEV_ROUTES`: mount `/api/dev/*`.
    pub dev_routes: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            database_url: "postgres://localhost/customers".into(),
            store: StoreKind::Postgres,
            max_connections: 5,
            bind_addr: "0.0.0.0:8000".into(),
            seed_on_startup: None,
            create_database: true,
            dev_routes: true,
        }
    }
}

impl ServiceConfig {
    /// Read `.env` (if any) and then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = ServiceConfig::default();
        if let Some(url) = lookup("DATABASE_URL") {
            cfg.database_url = url;
        }
        if let Some(kind) = lookup("CUSTOMER_STORE") {
            cfg.store = match kind.trim().to_ascii_lowercase().as_str() {
                "postgres" | "postgresql" => StoreKind::Postgres,
                "memory" => StoreKind::Memory,
                _ => return Err(ConfigError::UnknownStore(kind)),
            };
        }
        if let Some(v) = lookup("DB_MAX_CONNECTIONS") {
            cfg.max_connections = parse_number("DB_MAX_CONNECTIONS", &v)?;
        }
        if let Some(addr) = lookup("BIND_ADDR") {
            cfg.bind_addr = addr;
        }
        if let Some(v) = lookup("SEED_ON_STARTUP").filter(|v| !v.trim().is_empty()) {
            cfg.seed_on_startup = Some(parse_number("SEED_ON_STARTUP", &v)?);
        }
        if let Some(v) = lookup("CREATE_DATABASE") {
            cfg.create_database = parse_bool("CREATE_DATABASE", &v)?;
        }
        if let Some(v) = lookup("ENABLE_DEV_ROUTES") {
            cfg.dev_routes = parse_bool("ENABLE_DEV_ROUTES", &v)?;
        }
        Ok(cfg)
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}
