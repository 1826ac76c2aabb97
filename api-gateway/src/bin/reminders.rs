//! Reminders API Lambda - CRUD over lunar reminders.
//!
//! Endpoints:
//! - POST /reminders - Create a reminder
//! - GET /reminders?user_id= - List a user's reminders
//! - GET /reminders/today - Reminders due today, all users
//! - GET /reminders/today/{user_id} - Reminders due today for one user
//! - GET /reminders/user/{user_id} - List a user's reminders
//! - GET /reminders/{id} - Get a single reminder
//! - PUT /reminders/{id} - Update a reminder
//! - DELETE /reminders/{id} - Delete a reminder

use std::sync::Arc;

use lambda_http::{run, service_fn, Body, Error, Request, RequestExt, Response};
use serde_json::json;
use shared::http::{self, path_segments};
use shared::models::{CreateReminderRequest, UpdateReminderRequest};
use shared::store::reminders;
use shared::{parse_body, AppContext};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

async fn handler(ctx: Arc<AppContext>, event: Request) -> Result<Response<Body>, Error> {
    let method = event.method().as_str();
    let raw_path = event.uri().path();
    // Strip /api stage prefix if present (API Gateway REST API includes stage in path)
    let path = raw_path.strip_prefix("/api").unwrap_or(raw_path);

    info!(method, path, "Reminders request");

    if method == "OPTIONS" {
        return http::preflight();
    }

    let segments = path_segments(path);
    if segments.first() != Some(&"reminders") {
        return http::error_response(404, "Invalid endpoint");
    }

    let result = match (method, &segments[1..]) {
        ("POST", []) => {
            let request: CreateReminderRequest = parse_body!(event.body());
            reminders::create(&ctx.db_pool, &request)
                .await
                .map(|r| (201, json!(r), Some("Reminder created successfully")))
        }

        ("GET", ["today"]) => today(&ctx, None).await.map(|data| (200, data, None)),

        ("GET", ["today", user_id]) => match Uuid::parse_str(user_id) {
            Ok(user_id) => today(&ctx, Some(user_id)).await.map(|data| (200, data, None)),
            Err(_) => return http::error_response(400, "Invalid user ID"),
        },

        ("GET", ["user", user_id]) => match Uuid::parse_str(user_id) {
            Ok(user_id) => reminders::list_by_user(&ctx.db_pool, user_id)
                .await
                .map(|r| (200, json!(r), None)),
            Err(_) => return http::error_response(400, "Invalid user ID"),
        },

        ("GET", [id]) => {
            let Ok(id) = Uuid::parse_str(id) else {
                return http::error_response(400, "Invalid reminder ID");
            };
            match reminders::get(&ctx.db_pool, id).await {
                Ok(Some(reminder)) => Ok((200, json!(reminder), None)),
                Ok(None) => return http::error_response(404, "Reminder not found"),
                Err(e) => Err(e),
            }
        }

        ("GET", []) => {
            let params = event.query_string_parameters();
            let Some(user_id) = params.first("user_id") else {
                return http::error_response(400, "user_id parameter is required");
            };
            let Ok(user_id) = Uuid::parse_str(user_id) else {
                return http::error_response(400, "Invalid user ID");
            };
            reminders::list_by_user(&ctx.db_pool, user_id)
                .await
                .map(|r| (200, json!(r), None))
        }

        ("PUT", [id]) => {
            let Ok(id) = Uuid::parse_str(id) else {
                return http::error_response(400, "Invalid reminder ID");
            };
            let request: UpdateReminderRequest = parse_body!(event.body());
            reminders::update(&ctx.db_pool, id, &request)
                .await
                .map(|r| (200, json!(r), Some("Reminder updated successfully")))
        }

        ("DELETE", [id]) => {
            let Ok(id) = Uuid::parse_str(id) else {
                return http::error_response(400, "Invalid reminder ID");
            };
            reminders::delete(&ctx.db_pool, id)
                .await
                .map(|()| (200, serde_json::Value::Null, Some("Reminder deleted successfully")))
        }

        ("POST" | "GET" | "PUT" | "DELETE", _) => return http::error_response(404, "Invalid endpoint"),
        _ => return http::error_response(405, "Method not allowed"),
    };

    match result {
        Ok((status, data, Some(message))) => http::ok_with_message(status, data, message),
        Ok((status, data, None)) => http::ok(status, data),
        Err(e) => http::from_error(&e),
    }
}

/// Due reminders plus the lunar date they were matched against.
async fn today(ctx: &AppContext, user_id: Option<Uuid>) -> shared::Result<serde_json::Value> {
    let today = ctx.today()?;
    let today_lunar = ctx.to_lunar(today)?;
    let due = reminders::due_on(&ctx.db_pool, today, &today_lunar, user_id).await?;

    info!(count = due.len(), %today, ?user_id, "Reminders due today");

    let mut data = json!({
        "reminders": due,
        "today_lunar": {
            "day": today_lunar.day,
            "month": today_lunar.month,
            "year": today_lunar.year,
            "is_leap_month": today_lunar.is_leap_month,
        },
    });
    if user_id.is_none() {
        data["message"] = json!(format!("Found {} reminders for today", due.len()));
    }
    Ok(data)
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
