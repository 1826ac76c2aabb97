//! `events` table.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::lunar::{LunarDate, SolarDate};
use crate::models::{CreateEventRequest, Event, UpdateEventRequest};
use crate::{Error, Result};

const COLUMNS: &str = "id, user_id, note, is_lunar, lunar_day, lunar_month, lunar_year, \
                       is_leap_month, solar_date, created_at";

pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Event>> {
    let events = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM events WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(events)
}

pub async fn get(pool: &PgPool, event_id: Uuid, user_id: Uuid) -> Result<Option<Event>> {
    let event = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM events WHERE id = $1 AND user_id = $2"
    ))
    .bind(event_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(event)
}

/// Insert an event after checking it is either a valid lunar date or carries a solar date.
pub async fn create(pool: &PgPool, user_id: Uuid, request: &CreateEventRequest) -> Result<Event> {
    let rule = request.rule()?;

    let event: Event = sqlx::query_as(&format!(
        r#"
        INSERT INTO events (
            user_id, note, is_lunar, lunar_day, lunar_month,
            lunar_year, is_leap_month, solar_date
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(&request.note)
    .bind(request.is_lunar)
    .bind(request.lunar_day)
    .bind(request.lunar_month)
    .bind(request.lunar_year)
    .bind(request.is_leap_month)
    .bind(request.solar_date)
    .fetch_one(pool)
    .await?;

    info!(event_id = %event.id, ?rule, "Event created");
    Ok(event)
}

pub async fn update(
    pool: &PgPool,
    event_id: Uuid,
    user_id: Uuid,
    request: &UpdateEventRequest,
) -> Result<Event> {
    if request.is_empty() {
        return Err(Error::Validation("No fields to update".to_string()));
    }
    request.validate()?;
    let current = get(pool, event_id, user_id)
        .await?
        .ok_or_else(|| Error::NotFound("Event not found.".to_string()))?;
    request.merged_rule(&current)?;

    let event: Option<Event> = sqlx::query_as(&format!(
        r#"
        UPDATE events
        SET note = COALESCE($3, note),
            is_lunar = COALESCE($4, is_lunar),
            lunar_day = COALESCE($5, lunar_day),
            lunar_month = COALESCE($6, lunar_month),
            lunar_year = COALESCE($7, lunar_year),
            is_leap_month = COALESCE($8, is_leap_month),
            solar_date = COALESCE($9, solar_date)
        WHERE id = $1 AND user_id = $2
        RETURNING {COLUMNS}
        "#
    ))
    .bind(event_id)
    .bind(user_id)
    .bind(&request.note)
    .bind(request.is_lunar)
    .bind(request.lunar_day)
    .bind(request.lunar_month)
    .bind(request.lunar_year)
    .bind(request.is_leap_month)
    .bind(request.solar_date)
    .fetch_optional(pool)
    .await?;

    event.ok_or_else(|| Error::NotFound("Event not found.".to_string()))
}

/// Delete an event, returning its id.
pub async fn delete(pool: &PgPool, event_id: Uuid, user_id: Uuid) -> Result<Uuid> {
    let deleted: Option<Uuid> =
        sqlx::query_scalar("DELETE FROM events WHERE id = $1 AND user_id = $2 RETURNING id")
            .bind(event_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    deleted.ok_or_else(|| Error::NotFound("Event not found or user does not have permission.".to_string()))
}

/// Events of every user that fall due on `today`.
///
/// The query narrows candidates by lunar day/month or exact solar date; leap
/// handling is left to the rule check.
pub async fn due_on(pool: &PgPool, today: SolarDate, today_lunar: &LunarDate) -> Result<Vec<Event>> {
    let candidates: Vec<Event> = sqlx::query_as(&format!(
        r#"
        SELECT {COLUMNS} FROM events
        WHERE (is_lunar AND lunar_day = $1 AND lunar_month = $2)
           OR (NOT is_lunar AND solar_date = $3)
        ORDER BY created_at DESC
        "#
    ))
    .bind(today_lunar.day as i32)
    .bind(today_lunar.month as i32)
    .bind(today.to_naive()?)
    .fetch_all(pool)
    .await?;

    Ok(super::retain_due(candidates, today, today_lunar, Event::rule, |e| e.id))
}
