//! Per-process state shared by every invocation of a Lambda.

use sqlx::PgPool;
use tracing::info;

use crate::config::DatabaseSource;
use crate::lunar::{self, LunarDate, SolarDate};
use crate::secrets::SecretStore;
use crate::{db, Config, Result};

/// Built once per cold start and handed to each handler call.
pub struct AppContext {
    pub config: Config,
    pub db_pool: PgPool,
}

impl AppContext {
    /// Load configuration from the environment and connect to the database.
    pub async fn from_env() -> Result<Self> {
        let config = Config::from_env()?;

        let secrets = match config.database {
            DatabaseSource::Secret { .. } => {
                let aws = aws_config::defaults(aws_config::BehaviorVersion::latest())
                    .region(aws_config::Region::new(config.aws_region.clone()))
                    .load()
                    .await;
                Some(SecretStore::new(aws_sdk_secretsmanager::Client::new(&aws)))
            }
            DatabaseSource::Url(_) => None,
        };

        let url = db::database_url(&config, secrets.as_ref()).await?;
        let db_pool = db::create_pool(&url).await?;
        info!(tz_offset_hours = config.tz_offset_hours, "Application context ready");

        Ok(Self { config, db_pool })
    }

    /// Today's date at the configured offset.
    pub fn today(&self) -> Result<SolarDate> {
        Ok(SolarDate::today(self.config.tz_offset_hours)?)
    }

    /// Convert at the configured offset.
    pub fn to_lunar(&self, date: SolarDate) -> Result<LunarDate> {
        Ok(lunar::solar_to_lunar_with_offset(date, self.config.tz_offset_hours)?)
    }

    /// Convert at the configured offset.
    pub fn to_solar(&self, date: LunarDate) -> Result<SolarDate> {
        Ok(lunar::lunar_to_solar_with_offset(date, self.config.tz_offset_hours)?)
    }
}
