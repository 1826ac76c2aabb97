//! Shared library for the Nhắc Lịch Âm Lambda functions.
//!
//! Holds the Vietnamese lunar calendar converter, the due-date matcher and
//! the config, database, auth and HTTP plumbing every handler binary uses.

pub mod auth;
pub mod config;
pub mod context;
pub mod db;
pub mod due;
pub mod error;
pub mod http;
pub mod lunar;
pub mod models;
pub mod secrets;
pub mod store;

pub use auth::{validate_token, AuthenticatedUser, SupabaseClaims};
pub use config::Config;
pub use context::AppContext;
pub use due::{is_due, RecurrenceRule};
pub use error::{Error, Result};
pub use http::ApiResponse;
pub use lunar::{LunarDate, LunarError, SolarDate};
pub use secrets::{DatabaseCredentials, SecretStore};
