//! Configuration management for Lambda functions.

use std::env;

use crate::lunar::VIETNAM_TZ;
use crate::{Error, Result};

/// Where database credentials come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseSource {
    /// A complete connection string (`DATABASE_URL`).
    Url(String),
    /// Host and database name, with credentials in Secrets Manager.
    Secret {
        host: String,
        name: String,
        secret_arn: String,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection source
    pub database: DatabaseSource,
    /// HS256 secret used to verify bearer tokens (`SUPABASE_JWT_SECRET`)
    pub jwt_secret: Option<String>,
    /// UTC offset in hours used for "today" and lunar conversion
    pub tz_offset_hours: f64,
    /// AWS region
    pub aws_region: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = match lookup("DATABASE_URL") {
            Some(url) => DatabaseSource::Url(url),
            None => DatabaseSource::Secret {
                host: lookup("DB_HOST")
                    .ok_or_else(|| Error::Config("DATABASE_URL or DB_HOST must be set".to_string()))?,
                name: lookup("DB_NAME").unwrap_or_else(|| "postgres".to_string()),
                secret_arn: lookup("DB_SECRET_ARN")
                    .ok_or_else(|| Error::Config("DB_SECRET_ARN not set".to_string()))?,
            },
        };

        let tz_offset_hours = tz_offset_from_lookup(&lookup)?;

        Ok(Self {
            database,
            jwt_secret: lookup("SUPABASE_JWT_SECRET"),
            tz_offset_hours,
            aws_region: lookup("AWS_REGION").unwrap_or_else(|| "ap-southeast-1".to_string()),
        })
    }
}

/// The `LUNAR_TZ_OFFSET` override, for functions that need no database.
pub fn tz_offset_from_env() -> Result<f64> {
    tz_offset_from_lookup(&|key: &str| env::var(key).ok())
}

fn tz_offset_from_lookup<F>(lookup: &F) -> Result<f64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup("LUNAR_TZ_OFFSET") {
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|h| (-12.0..=14.0).contains(h))
            .ok_or_else(|| Error::Config(format!("Invalid LUNAR_TZ_OFFSET: {}", raw))),
        None => Ok(VIETNAM_TZ),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_database_url_wins() {
        let config = load(&[
            ("DATABASE_URL", "postgres://u:p@localhost/db"),
            ("DB_HOST", "ignored"),
        ])
        .unwrap();
        assert_eq!(
            config.database,
            DatabaseSource::Url("postgres://u:p@localhost/db".to_string())
        );
        assert_eq!(config.tz_offset_hours, 7.0);
        assert_eq!(config.jwt_secret, None);
    }

    #[test]
    fn test_secret_source() {
        let config = load(&[
            ("DB_HOST", "db.example.com"),
            ("DB_SECRET_ARN", "arn:aws:secretsmanager:x"),
            ("LUNAR_TZ_OFFSET", "8"),
            ("SUPABASE_JWT_SECRET", "s3cret"),
        ])
        .unwrap();
        assert_eq!(
            config.database,
            DatabaseSource::Secret {
                host: "db.example.com".to_string(),
                name: "postgres".to_string(),
                secret_arn: "arn:aws:secretsmanager:x".to_string(),
            }
        );
        assert_eq!(config.tz_offset_hours, 8.0);
        assert_eq!(config.jwt_secret.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_missing_database() {
        assert!(matches!(load(&[]), Err(Error::Config(_))));
        assert!(matches!(load(&[("DB_HOST", "h")]), Err(Error::Config(_))));
    }

    #[test]
    fn test_bad_offset() {
        let result = load(&[("DATABASE_URL", "postgres://x"), ("LUNAR_TZ_OFFSET", "seven")]);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
