//! Main API Lambda - authenticated profile, event and notification routes.
//!
//! Endpoints (all require `Authorization: Bearer <jwt>`):
//! - GET /api - Welcome message
//! - GET|PUT|PATCH|DELETE /api/profile - Caller's profile
//! - GET|POST /api/notifications - Notification settings
//! - GET /api/notifications/logs - Sent notifications
//! - PUT|PATCH|DELETE /api/notifications/{id} - One notification setting
//! - GET|POST /api/events - List or create events
//! - GET|PUT|PATCH|DELETE /api/events/{id} - One event
//! - GET /api/events/{id}/notifications - Settings attached to an event
//! - GET /api/events/{id}/notification-logs - Notifications sent for an event
//! - GET /api/today-events - Events of every user due today
//! - GET /api/lunar-convert?date=YYYY-MM-DD - Solar to lunar

use std::sync::Arc;

use lambda_http::{run, service_fn, Body, Error, Request, RequestExt, Response};
use serde_json::json;
use shared::http::{self, path_segments, respond};
use shared::models::{
    CreateEventRequest, CreateNotificationSettingRequest, LunarConversion, UpdateEventRequest,
    UpdateNotificationSettingRequest, UpdateProfileRequest,
};
use shared::store::{events, notifications, profiles};
use shared::{parse_body, AppContext, AuthenticatedUser, SolarDate};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

fn method_not_allowed(method: &str) -> Result<Response<Body>, Error> {
    http::error_response(405, format!("Method {} not allowed for this route.", method))
}

fn parse_id(raw: &str) -> shared::Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| shared::Error::Validation(format!("Invalid ID: {}", raw)))
}

/// Resolve the caller from the bearer token.
fn authenticate(ctx: &AppContext, event: &Request) -> shared::Result<AuthenticatedUser> {
    let header = event
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| shared::Error::Auth("Missing authorization header".to_string()))?;

    shared::validate_token(header, ctx.config.jwt_secret.as_deref())
}

async fn handler(ctx: Arc<AppContext>, event: Request) -> Result<Response<Body>, Error> {
    let method = event.method().as_str();
    let raw_path = event.uri().path();
    // Strip /api stage prefix if present (API Gateway REST API includes stage in path)
    let path = raw_path.strip_prefix("/api").unwrap_or(raw_path);

    if method == "OPTIONS" {
        return http::preflight();
    }

    let user = match authenticate(&ctx, &event) {
        Ok(user) => user,
        Err(e) => {
            warn!(error = %e, "Rejected unauthenticated request");
            return http::error_response(401, e.to_string());
        }
    };

    info!(method, path, user_id = %user.user_id, "API request");

    // Make sure the caller has a profile row before touching anything keyed on it.
    if let Err(e) = profiles::upsert(&ctx.db_pool, user.user_id, None).await {
        return http::from_error(&e);
    }

    let segments = path_segments(path);
    route(&ctx, &event, method, &segments, user.user_id).await
}

async fn route(
    ctx: &AppContext,
    event: &Request,
    method: &str,
    segments: &[&str],
    user_id: Uuid,
) -> Result<Response<Body>, Error> {
    let pool = &ctx.db_pool;

    match segments {
        [] => match method {
            "GET" => http::ok(200, json!({ "message": "Welcome to Nhac Lich Am API!" })),
            _ => method_not_allowed(method),
        },

        ["profile"] => match method {
            "GET" => {
                let profile = profiles::get(pool, user_id).await.and_then(|p| {
                    p.ok_or_else(|| shared::Error::NotFound("Profile not found".to_string()))
                });
                respond(profile, 200, None)
            }
            "PUT" | "PATCH" => {
                let request: UpdateProfileRequest = parse_body!(event.body());
                respond(
                    profiles::update(pool, user_id, &request).await,
                    200,
                    Some("Profile updated successfully"),
                )
            }
            "DELETE" => respond(
                profiles::deactivate(pool, user_id).await,
                200,
                Some("Profile deactivated successfully"),
            ),
            _ => method_not_allowed(method),
        },

        ["notifications"] => match method {
            "GET" => respond(notifications::list_settings(pool, user_id).await, 200, None),
            "POST" => {
                let request: CreateNotificationSettingRequest = parse_body!(event.body());
                respond(
                    notifications::create_setting(pool, user_id, &request).await,
                    201,
                    Some("Notification setting created successfully"),
                )
            }
            _ => method_not_allowed(method),
        },

        ["notifications", "logs"] => match method {
            "GET" => respond(notifications::list_logs(pool, user_id).await, 200, None),
            _ => method_not_allowed(method),
        },

        ["notifications", id] => {
            let id = match parse_id(id) {
                Ok(id) => id,
                Err(e) => return http::from_error(&e),
            };
            match method {
                "PUT" | "PATCH" => {
                    let request: UpdateNotificationSettingRequest = parse_body!(event.body());
                    respond(
                        notifications::update_setting(pool, id, user_id, &request).await,
                        200,
                        Some("Notification setting updated successfully"),
                    )
                }
                "DELETE" => respond(
                    notifications::delete_setting(pool, id, user_id)
                        .await
                        .map(|id| json!({ "id": id })),
                    200,
                    Some("Notification setting deleted successfully"),
                ),
                _ => method_not_allowed(method),
            }
        }

        ["events"] => match method {
            "GET" => respond(events::list_by_user(pool, user_id).await, 200, None),
            "POST" => {
                let request: CreateEventRequest = parse_body!(event.body());
                respond(
                    events::create(pool, user_id, &request).await,
                    201,
                    Some("Event created successfully"),
                )
            }
            _ => method_not_allowed(method),
        },

        ["events", id] => {
            let id = match parse_id(id) {
                Ok(id) => id,
                Err(e) => return http::from_error(&e),
            };
            match method {
                "GET" => {
                    let found = events::get(pool, id, user_id).await.and_then(|e| {
                        e.ok_or_else(|| shared::Error::NotFound("Event not found.".to_string()))
                    });
                    respond(found, 200, None)
                }
                "PUT" | "PATCH" => {
                    let request: UpdateEventRequest = parse_body!(event.body());
                    respond(
                        events::update(pool, id, user_id, &request).await,
                        200,
                        Some("Event updated successfully"),
                    )
                }
                "DELETE" => respond(
                    events::delete(pool, id, user_id)
                        .await
                        .map(|id| json!({ "id": id })),
                    200,
                    Some("Event deleted successfully"),
                ),
                _ => method_not_allowed(method),
            }
        }

        ["events", id, "notifications"] | ["events", id, "notification-logs"] => {
            if method != "GET" {
                return method_not_allowed(method);
            }
            let id = match parse_id(id) {
                Ok(id) => id,
                Err(e) => return http::from_error(&e),
            };
            if segments[2] == "notifications" {
                respond(notifications::list_settings_for_event(pool, id, user_id).await, 200, None)
            } else {
                respond(notifications::list_logs_for_event(pool, id, user_id).await, 200, None)
            }
        }

        ["today-events"] => match method {
            "GET" => respond(today_events(ctx).await, 200, None),
            _ => method_not_allowed(method),
        },

        ["lunar-convert"] => match method {
            "GET" => {
                let params = event.query_string_parameters();
                let Some(date) = params.first("date") else {
                    return http::error_response(
                        400,
                        "Missing \"date\" query parameter. Please provide a date in YYYY-MM-DD format.",
                    );
                };
                let converted = date
                    .parse::<SolarDate>()
                    .map_err(shared::Error::from)
                    .and_then(|solar| Ok(LunarConversion::new(solar, ctx.to_lunar(solar)?)));
                respond(converted, 200, None)
            }
            _ => method_not_allowed(method),
        },

        _ => http::error_response(404, "Not Found"),
    }
}

async fn today_events(ctx: &AppContext) -> shared::Result<Vec<shared::models::Event>> {
    let today = ctx.today()?;
    let today_lunar = ctx.to_lunar(today)?;
    let due = events::due_on(&ctx.db_pool, today, &today_lunar).await?;

    info!(count = due.len(), %today, "Events due today");
    Ok(due)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let ctx = Arc::new(AppContext::from_env().await?);

    run(service_fn(move |event| {
        let ctx = ctx.clone();
        async move { handler(ctx, event).await }
    }))
    .await
}
