//! Database connection management.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::config::DatabaseSource;
use crate::secrets::SecretStore;
use crate::{Config, Error, Result};

/// Build the Postgres connection string for the configured source.
pub async fn database_url(config: &Config, secrets: Option<&SecretStore>) -> Result<String> {
    match &config.database {
        DatabaseSource::Url(url) => Ok(url.clone()),
        DatabaseSource::Secret {
            host,
            name,
            secret_arn,
        } => {
            let secrets = secrets
                .ok_or_else(|| Error::Config("Secrets Manager client required for DB_SECRET_ARN".to_string()))?;
            let creds = secrets.database_credentials(secret_arn).await?;
            Ok(format!(
                "postgres://{}:{}@{}:{}/{}",
                creds.username,
                creds.password,
                creds.host.as_deref().unwrap_or(host),
                creds.port.unwrap_or(5432),
                creds.dbname.as_deref().unwrap_or(name)
            ))
        }
    }
}

/// Create a database connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await
        .map_err(Error::Database)?;

    Ok(pool)
}
