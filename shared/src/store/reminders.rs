//! `reminders` table.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::lunar::{self, LunarDate, SolarDate};
use crate::models::{CreateReminderRequest, Reminder, UpdateReminderRequest};
use crate::{Error, Result};

const COLUMNS: &str = "id, user_id, note, lunar_day, lunar_month, is_leap_month, created_at";

fn check_lunar_date(day: i32, month: i32) -> Result<()> {
    let valid = u32::try_from(day)
        .ok()
        .zip(u32::try_from(month).ok())
        .is_some_and(|(d, m)| lunar::is_valid_lunar_date(d, m));
    if valid {
        Ok(())
    } else {
        Err(Error::Validation("Invalid lunar date".to_string()))
    }
}

pub async fn create(pool: &PgPool, request: &CreateReminderRequest) -> Result<Reminder> {
    request.validate()?;
    check_lunar_date(request.lunar_day, request.lunar_month)?;

    let reminder: Reminder = sqlx::query_as(&format!(
        r#"
        INSERT INTO reminders (user_id, note, lunar_day, lunar_month, is_leap_month)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(request.user_id)
    .bind(&request.note)
    .bind(request.lunar_day)
    .bind(request.lunar_month)
    .bind(request.is_leap_month)
    .fetch_one(pool)
    .await?;

    info!(reminder_id = %reminder.id, user_id = %reminder.user_id, "Reminder created");
    Ok(reminder)
}

/// A user's reminders, newest first.
pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Reminder>> {
    let reminders = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM reminders WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(reminders)
}

pub async fn get(pool: &PgPool, reminder_id: Uuid) -> Result<Option<Reminder>> {
    let reminder = sqlx::query_as(&format!("SELECT {COLUMNS} FROM reminders WHERE id = $1"))
        .bind(reminder_id)
        .fetch_optional(pool)
        .await?;

    Ok(reminder)
}

pub async fn update(pool: &PgPool, reminder_id: Uuid, request: &UpdateReminderRequest) -> Result<Reminder> {
    request.validate()?;
    if request.lunar_day.is_some() || request.lunar_month.is_some() {
        check_lunar_date(request.lunar_day.unwrap_or(1), request.lunar_month.unwrap_or(1))?;
    }

    let reminder: Option<Reminder> = sqlx::query_as(&format!(
        r#"
        UPDATE reminders
        SET note = COALESCE($2, note),
            lunar_day = COALESCE($3, lunar_day),
            lunar_month = COALESCE($4, lunar_month),
            is_leap_month = COALESCE($5, is_leap_month)
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(reminder_id)
    .bind(&request.note)
    .bind(request.lunar_day)
    .bind(request.lunar_month)
    .bind(request.is_leap_month)
    .fetch_optional(pool)
    .await?;

    reminder.ok_or_else(|| Error::NotFound("Reminder not found".to_string()))
}

pub async fn delete(pool: &PgPool, reminder_id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM reminders WHERE id = $1")
        .bind(reminder_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Reminder not found".to_string()));
    }
    Ok(())
}

/// Reminders falling due on `today`, for one user or for everyone.
pub async fn due_on(
    pool: &PgPool,
    today: SolarDate,
    today_lunar: &LunarDate,
    user_id: Option<Uuid>,
) -> Result<Vec<Reminder>> {
    let candidates: Vec<Reminder> = sqlx::query_as(&format!(
        r#"
        SELECT {COLUMNS} FROM reminders
        WHERE lunar_day = $1 AND lunar_month = $2
          AND ($3::uuid IS NULL OR user_id = $3)
        ORDER BY created_at DESC
        "#
    ))
    .bind(today_lunar.day as i32)
    .bind(today_lunar.month as i32)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(super::retain_due(candidates, today, today_lunar, Reminder::rule, |r| r.id))
}
