// Process settings - read once at startup and handed to whoever needs them

use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:///./sql_app.db";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
pub const DEFAULT_ENVIRONMENT: &str = "development";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("PORT must be a number between 0 and 65535, got `{0}`")]
    InvalidPort(String),

    #[error("unsupported DATABASE_URL `{0}`: only sqlite URLs or file paths are supported")]
    UnsupportedDatabase(String),
}

/// Where the SQLite database lives
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseLocation {
    File(PathBuf),
    Memory,
}

impl DatabaseLocation {
    /// Parse a `DATABASE_URL` value.
    ///
    /// Accepts `sqlite:///relative/or/abs`, `sqlite://path`, `sqlite::memory:`,
    /// `:memory:` and bare file paths.
    pub fn parse(url: &str) -> Result<Self, ConfigError> {
        let url = url.trim();

        if url == ":memory:" || url == "sqlite::memory:" || url == "sqlite://:memory:" {
            return Ok(DatabaseLocation::Memory);
        }

        if let Some(rest) = url.strip_prefix("sqlite:") {
            let path = rest
                .strip_prefix("///")
                .or_else(|| rest.strip_prefix("//"))
                .unwrap_or(rest);
            if path.is_empty() {
                return Err(ConfigError::UnsupportedDatabase(url.to_string()));
            }
            return Ok(DatabaseLocation::File(PathBuf::from(path)));
        }

        if url.is_empty() || url.contains("://") {
            return Err(ConfigError::UnsupportedDatabase(url.to_string()));
        }

        Ok(DatabaseLocation::File(PathBuf::from(url)))
    }
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct Settings {
    pub database: DatabaseLocation,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub environment: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database: DatabaseLocation::File(PathBuf::from("./sql_app.db")),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
        }
    }
}

impl Settings {
    /// Load `.env` (if present) and read settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => DEFAULT_PORT,
        };

        Ok(Settings {
            database: DatabaseLocation::parse(&database_url)?,
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            frontend_url: lookup("FRONTEND_URL").unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string()),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
        })
    }

    /// Settings for tests and throwaway runs
    pub fn in_memory() -> Self {
        Settings {
            database: DatabaseLocation::Memory,
            ..Default::default()
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let settings = Settings::from_lookup(|_| None).unwrap();

        assert_eq!(settings.database, DatabaseLocation::File(PathBuf::from("./sql_app.db")));
        assert_eq!(settings.bind_addr(), "0.0.0.0:8000");
        assert_eq!(settings.frontend_url, "http://localhost:3000");
        assert_eq!(settings.environment, "development");
        assert!(!settings.is_production());
    }

    #[test]
    fn test_overrides_from_lookup() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite:////var/lib/app/data.db"),
            ("HOST", "127.0.0.1"),
            ("PORT", "9090"),
            ("ENVIRONMENT", "production"),
        ]))
        .unwrap();

        assert_eq!(
            settings.database,
            DatabaseLocation::File(PathBuf::from("/var/lib/app/data.db"))
        );
        assert_eq!(settings.bind_addr(), "127.0.0.1:9090");
        assert!(settings.is_production());
    }

    #[test]
    fn test_invalid_port_rejected() {
        let err = Settings::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidPort("eighty".to_string()));
    }

    #[test]
    fn test_database_url_forms() {
        assert_eq!(DatabaseLocation::parse(":memory:").unwrap(), DatabaseLocation::Memory);
        assert_eq!(DatabaseLocation::parse("sqlite::memory:").unwrap(), DatabaseLocation::Memory);
        assert_eq!(
            DatabaseLocation::parse("sqlite://data.db").unwrap(),
            DatabaseLocation::File(PathBuf::from("data.db"))
        );
        assert_eq!(
            DatabaseLocation::parse("local.db").unwrap(),
            DatabaseLocation::File(PathBuf::from("local.db"))
        );
        assert!(matches!(
            DatabaseLocation::parse("postgresql://user:pw@host/db"),
            Err(ConfigError::UnsupportedDatabase(_))
        ));
    }
}
