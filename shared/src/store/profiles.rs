//! `profiles` table.

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Profile, UpdateProfileRequest};
use crate::{Error, Result};

/// Create the profile on first sight of a user; keep an existing one untouched.
pub async fn upsert(pool: &PgPool, user_id: Uuid, display_name: Option<&str>) -> Result<Profile> {
    let profile = sqlx::query_as(
        r#"
        INSERT INTO profiles (id, display_name)
        VALUES ($1, $2)
        ON CONFLICT (id) DO UPDATE
            SET display_name = COALESCE(EXCLUDED.display_name, profiles.display_name)
        RETURNING id, display_name, created_at
        "#,
    )
    .bind(user_id)
    .bind(display_name)
    .fetch_one(pool)
    .await?;

    Ok(profile)
}

pub async fn get(pool: &PgPool, user_id: Uuid) -> Result<Option<Profile>> {
    let profile = sqlx::query_as("SELECT id, display_name, created_at FROM profiles WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(profile)
}

pub async fn update(pool: &PgPool, user_id: Uuid, request: &UpdateProfileRequest) -> Result<Profile> {
    request.validate()?;

    let profile: Option<Profile> = sqlx::query_as(
        r#"
        UPDATE profiles
        SET display_name = $2
        WHERE id = $1
        RETURNING id, display_name, created_at
        "#,
    )
    .bind(user_id)
    .bind(&request.display_name)
    .fetch_optional(pool)
    .await?;

    profile.ok_or_else(|| Error::NotFound("Profile not found".to_string()))
}

/// Soft delete: the row stays, the display name is cleared.
pub async fn deactivate(pool: &PgPool, user_id: Uuid) -> Result<Profile> {
    let profile: Option<Profile> = sqlx::query_as(
        r#"
        UPDATE profiles
        SET display_name = NULL
        WHERE id = $1
        RETURNING id, display_name, created_at
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    profile.ok_or_else(|| Error::NotFound("Profile not found".to_string()))
}
