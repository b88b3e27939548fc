use std::{env, net::SocketAddr};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
}

impl Config {
    pub const DEFAULT_BIND_ADDR: &'static str = "0.0.0.0:3050";
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

    /// Read configuration from the process environment. Call `dotenvy::dotenv()` first
    /// to pick up a local `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let bind_addr = match lookup("BIND_ADDR") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid { name: "BIND_ADDR", value })?,
            None => SocketAddr::from(([0, 0, 0, 0], 3050)),
        };

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(value) => match value.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "DATABASE_MAX_CONNECTIONS",
                        value,
                    })
                }
            },
            None => Self::DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            bind_addr,
            max_connections,
        })
    }
}
