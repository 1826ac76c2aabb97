//! Health check Lambda.

use chrono::Utc;
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde::Serialize;
use shared::http;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    message: &'static str,
    timestamp: String,
    version: &'static str,
}

async fn handler(event: Request) -> Result<Response<Body>, Error> {
    debug!(method = %event.method(), path = event.uri().path(), "Health request");

    if event.method().as_str() == "OPTIONS" {
        return http::preflight();
    }

    http::ok(
        200,
        Health {
            status: "OK",
            message: "Nhắc Lịch Âm functions are running",
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    run(service_fn(handler)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_payload() {
        let request = lambda_http::http::Request::builder()
            .uri("/health")
            .body(Body::Empty)
            .unwrap();
        let response = handler(request).await.unwrap();
        assert_eq!(response.status(), 200);
        let json: serde_json::Value = serde_json::from_slice(response.body().as_ref()).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["status"], "OK");
    }
}
