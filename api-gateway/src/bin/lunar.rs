//! Lunar calendar API Lambda - solar/lunar date conversion.
//!
//! Endpoints:
//! - GET /lunar - Today's lunar date
//! - GET /lunar/info - Endpoint listing
//! - POST /lunar - Convert `{day, month, year}` to a lunar date
//! - GET /lunar/lunar-convert?date=YYYY-MM-DD - Solar to lunar
//! - GET /lunar/solar-convert?lunar_day=&lunar_month=&lunar_year=[&is_leap=true] - Lunar to solar

use lambda_http::{run, service_fn, Body, Error, Request, RequestExt, Response};
use serde::Deserialize;
use serde_json::json;
use shared::http::{self, parse_param, path_segments};
use shared::lunar::{self, vietnamese, LunarDate, SolarDate};
use shared::models::{LunarConversion, SolarConversion};
use shared::parse_body;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// POST /lunar body.
#[derive(Debug, Deserialize)]
struct ConvertRequest {
    day: Option<u32>,
    month: Option<u32>,
    year: Option<i32>,
}

async fn handler(tz_hours: f64, event: Request) -> Result<Response<Body>, Error> {
    let method = event.method().as_str();
    let raw_path = event.uri().path();
    // Strip /api stage prefix if present (API Gateway REST API includes stage in path)
    let path = raw_path.strip_prefix("/api").unwrap_or(raw_path);

    info!(method, path, "Lunar request");

    if method == "OPTIONS" {
        return http::preflight();
    }

    let segments = path_segments(path);
    match (method, segments.as_slice()) {
        ("GET", ["lunar"]) => {
            let converted = SolarDate::today(tz_hours)
                .and_then(|today| Ok((today, lunar::solar_to_lunar_with_offset(today, tz_hours)?)));
            match converted {
                Ok((today, lunar)) => http::ok(200, date_pair(today, lunar)),
                Err(e) => http::from_error(&e.into()),
            }
        }

        ("POST", ["lunar"]) => {
            let request: ConvertRequest = parse_body!(event.body());
            let (Some(day), Some(month), Some(year)) = (request.day, request.month, request.year) else {
                return http::error_response(400, "Missing required fields: day, month, year");
            };
            let converted = SolarDate::new(year, month, day)
                .and_then(|solar| Ok((solar, lunar::solar_to_lunar_with_offset(solar, tz_hours)?)));
            match converted {
                Ok((solar, lunar)) => http::ok(200, date_pair(solar, lunar)),
                Err(e) => http::from_error(&e.into()),
            }
        }

        ("GET", ["lunar", "lunar-convert"]) => {
            let params = event.query_string_parameters();
            let Some(date) = params.first("date") else {
                return http::error_response(400, "Missing 'date' parameter (format: YYYY-MM-DD)");
            };
            let converted = date
                .parse::<SolarDate>()
                .and_then(|solar| Ok((solar, lunar::solar_to_lunar_with_offset(solar, tz_hours)?)));
            match converted {
                Ok((solar, lunar)) => http::ok(200, LunarConversion::new(solar, lunar)),
                Err(e) => http::from_error(&e.into()),
            }
        }

        ("GET", ["lunar", "solar-convert"]) => {
            let params = event.query_string_parameters();
            let day = parse_param::<u32>(params.first("lunar_day"));
            let month = parse_param::<u32>(params.first("lunar_month"));
            let year = parse_param::<i32>(params.first("lunar_year"));
            let (Some(day), Some(month), Some(year)) = (day, month, year) else {
                return http::error_response(
                    400,
                    "Missing required parameters: lunar_day, lunar_month, lunar_year",
                );
            };
            let is_leap = params.first("is_leap") == Some("true");
            let lunar = LunarDate::new(year, month, day, is_leap);
            match lunar::lunar_to_solar_with_offset(lunar, tz_hours) {
                Ok(solar) => http::ok(200, SolarConversion::new(lunar, solar)),
                Err(e) => http::from_error(&e.into()),
            }
        }

        ("GET", ["lunar", "info"]) => http::json_response(
            200,
            &json!({
                "message": "Lunar Calendar API",
                "version": env!("CARGO_PKG_VERSION"),
                "endpoints": {
                    "GET /lunar": "Today's lunar date",
                    "POST /lunar": "Convert {day, month, year} to a lunar date",
                    "GET /lunar/lunar-convert?date=YYYY-MM-DD": "Convert solar date to lunar",
                    "GET /lunar/solar-convert?lunar_day=DD&lunar_month=MM&lunar_year=YYYY[&is_leap=true]":
                        "Convert lunar date to solar",
                },
                "example_requests": [
                    "/lunar/lunar-convert?date=2024-12-25",
                    "/lunar/solar-convert?lunar_day=15&lunar_month=8&lunar_year=2024",
                ],
            }),
        ),

        ("GET" | "POST", _) => http::error_response(404, "Invalid endpoint"),
        _ => http::error_response(405, "Method not allowed"),
    }
}

fn date_pair(solar: SolarDate, lunar: LunarDate) -> serde_json::Value {
    json!({
        "solar_date": {
            "day": solar.day,
            "month": solar.month,
            "year": solar.year,
        },
        "lunar_date": {
            "day": lunar.day,
            "month": lunar.month,
            "year": lunar.year,
            "is_leap_month": lunar.is_leap_month,
        },
        "can_chi": vietnamese::can_chi(lunar.year),
        "vietnamese_date": vietnamese::long_date(&lunar),
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let tz_hours = shared::config::tz_offset_from_env()?;

    run(service_fn(move |event| async move { handler(tz_hours, event).await })).await
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn get(path: &str, query: &[(&str, &str)]) -> Request {
        let query: HashMap<String, String> = query
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        lambda_http::http::Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::Empty)
            .unwrap()
            .with_query_string_parameters(query)
    }

    fn body_json(response: &Response<Body>) -> serde_json::Value {
        serde_json::from_slice(response.body().as_ref()).unwrap()
    }

    #[tokio::test]
    async fn test_lunar_convert() {
        let response = handler(7.0, get("/lunar/lunar-convert", &[("date", "2024-12-25")]))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let json = body_json(&response);
        assert_eq!(json["data"]["lunar_day"], 25);
        assert_eq!(json["data"]["lunar_month"], 11);
        assert_eq!(json["data"]["lunar_year"], 2024);
        assert_eq!(json["data"]["is_leap_month"], false);
    }

    #[tokio::test]
    async fn test_solar_convert_leap_month() {
        let query = [
            ("lunar_day", "1"),
            ("lunar_month", "2"),
            ("lunar_year", "2023"),
            ("is_leap", "true"),
        ];
        let response = handler(7.0, get("/api/lunar/solar-convert", &query)).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(body_json(&response)["data"]["solar_date"], "2023-03-22");
    }

    #[tokio::test]
    async fn test_endpoint_listing() {
        let response = handler(7.0, get("/lunar/info/", &[])).await.unwrap();
        assert_eq!(response.status(), 200);
        let json = body_json(&response);
        assert_eq!(json["message"], "Lunar Calendar API");
        assert!(json["endpoints"]["GET /lunar/lunar-convert?date=YYYY-MM-DD"].is_string());
    }

    #[tokio::test]
    async fn test_rejections() {
        let response = handler(7.0, get("/lunar/lunar-convert", &[])).await.unwrap();
        assert_eq!(response.status(), 400);

        let response = handler(7.0, get("/lunar/lunar-convert", &[("date", "2024-02-30")]))
            .await
            .unwrap();
        assert_eq!(response.status(), 400);

        let response = handler(7.0, get("/lunar/lunar-convert", &[("date", "1850-01-01")]))
            .await
            .unwrap();
        assert_eq!(response.status(), 422);

        let query = [
            ("lunar_day", "1"),
            ("lunar_month", "2"),
            ("lunar_year", "2024"),
            ("is_leap", "true"),
        ];
        let response = handler(7.0, get("/lunar/solar-convert", &query)).await.unwrap();
        assert_eq!(response.status(), 400);

        let response = handler(7.0, get("/lunar/unknown", &[])).await.unwrap();
        assert_eq!(response.status(), 404);
    }
}
