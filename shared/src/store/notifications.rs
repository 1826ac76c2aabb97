//! `notification_settings` and `notification_logs` tables.

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    CreateNotificationSettingRequest, NotificationLog, NotificationSetting,
    UpdateNotificationSettingRequest,
};
use crate::{Error, Result};

const SETTING_COLUMNS: &str =
    "id, user_id, event_id, channel, advance_days, time_of_day, is_enabled, created_at";
const LOG_COLUMNS: &str = "id, user_id, event_id, sent_at, channel, message, status, response";

pub async fn create_setting(
    pool: &PgPool,
    user_id: Uuid,
    request: &CreateNotificationSettingRequest,
) -> Result<NotificationSetting> {
    request.validate()?;

    let setting = sqlx::query_as(&format!(
        r#"
        INSERT INTO notification_settings (
            user_id, event_id, channel, advance_days, time_of_day, is_enabled
        ) VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {SETTING_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(request.event_id)
    .bind(&request.channel)
    .bind(request.advance_days)
    .bind(request.time_of_day)
    .bind(request.is_enabled)
    .fetch_one(pool)
    .await?;

    Ok(setting)
}

pub async fn list_settings(pool: &PgPool, user_id: Uuid) -> Result<Vec<NotificationSetting>> {
    let settings = sqlx::query_as(&format!(
        "SELECT {SETTING_COLUMNS} FROM notification_settings WHERE user_id = $1 ORDER BY created_at"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(settings)
}

pub async fn list_settings_for_event(
    pool: &PgPool,
    event_id: Uuid,
    user_id: Uuid,
) -> Result<Vec<NotificationSetting>> {
    let settings = sqlx::query_as(&format!(
        "SELECT {SETTING_COLUMNS} FROM notification_settings \
         WHERE event_id = $1 AND user_id = $2 ORDER BY created_at"
    ))
    .bind(event_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(settings)
}

pub async fn update_setting(
    pool: &PgPool,
    setting_id: Uuid,
    user_id: Uuid,
    request: &UpdateNotificationSettingRequest,
) -> Result<NotificationSetting> {
    request.validate()?;

    let setting: Option<NotificationSetting> = sqlx::query_as(&format!(
        r#"
        UPDATE notification_settings
        SET event_id = COALESCE($3, event_id),
            channel = COALESCE($4, channel),
            advance_days = COALESCE($5, advance_days),
            time_of_day = COALESCE($6, time_of_day),
            is_enabled = COALESCE($7, is_enabled)
        WHERE id = $1 AND user_id = $2
        RETURNING {SETTING_COLUMNS}
        "#
    ))
    .bind(setting_id)
    .bind(user_id)
    .bind(request.event_id)
    .bind(&request.channel)
    .bind(request.advance_days)
    .bind(request.time_of_day)
    .bind(request.is_enabled)
    .fetch_optional(pool)
    .await?;

    setting.ok_or_else(|| Error::NotFound("Notification setting not found".to_string()))
}

/// Delete a setting, returning its id.
pub async fn delete_setting(pool: &PgPool, setting_id: Uuid, user_id: Uuid) -> Result<Uuid> {
    let deleted: Option<Uuid> = sqlx::query_scalar(
        "DELETE FROM notification_settings WHERE id = $1 AND user_id = $2 RETURNING id",
    )
    .bind(setting_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    deleted.ok_or_else(|| {
        Error::NotFound("Notification setting not found or user does not have permission.".to_string())
    })
}

/// Sent notifications, newest first.
pub async fn list_logs(pool: &PgPool, user_id: Uuid) -> Result<Vec<NotificationLog>> {
    let logs = sqlx::query_as(&format!(
        "SELECT {LOG_COLUMNS} FROM notification_logs WHERE user_id = $1 ORDER BY sent_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(logs)
}

pub async fn list_logs_for_event(pool: &PgPool, event_id: Uuid, user_id: Uuid) -> Result<Vec<NotificationLog>> {
    let logs = sqlx::query_as(&format!(
        "SELECT {LOG_COLUMNS} FROM notification_logs \
         WHERE event_id = $1 AND user_id = $2 ORDER BY sent_at DESC"
    ))
    .bind(event_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(logs)
}
