use std::net::SocketAddr;

use anyhow::Context;
use crate::users::password::HashingConfig;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Unset means the in-memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub hashing: HashingConfig,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(v) => v.parse::<T>().with_context(|| format!("invalid {}", key)),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = HashingConfig::default();
        let hashing = HashingConfig {
            memory_kib: env_or("PASSWORD_MEMORY_KIB", defaults.memory_kib)?,
            iterations: env_or("PASSWORD_ITERATIONS", defaults.iterations)?,
            parallelism: env_or("PASSWORD_PARALLELISM", defaults.parallelism)?,
        };
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 10)?,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("APP_PORT", 8080)?,
            hashing,
        })
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listen_addr_parses() {
        let cfg = AppConfig {
            database_url: None,
            db_max_connections: 10,
            host: "127.0.0.1".into(),
            port: 8080,
            hashing: HashingConfig::default(),
        };
        assert_eq!(cfg.listen_addr().unwrap().port(), 8080);

        let bad = AppConfig {
            host: "not a host".into(),
            ..cfg
        };
        assert!(bad.listen_addr().is_err());
    }

    #[test]
    fn env_or_falls_back_and_parses() {
        assert_eq!(env_or("USERSADMIN_TEST_UNSET_KEY", 7u32).unwrap(), 7);
        std::env::set_var("USERSADMIN_TEST_PORT", "9090");
        assert_eq!(env_or("USERSADMIN_TEST_PORT", 0u16).unwrap(), 9090);
        std::env::set_var("USERSADMIN_TEST_BAD", "nope");
        assert!(env_or("USERSADMIN_TEST_BAD", 0u16).is_err());
    }
}
