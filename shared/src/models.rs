//! Shared data models.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::due::RecurrenceRule;
use crate::lunar::{vietnamese, LunarDate, SolarDate};
use crate::{Error, Result};

/// User profile row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Profile update payload.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 100))]
    pub display_name: Option<String>,
}

/// Event row: a lunar anniversary or a one-off solar date.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Event {
    pub id: Uuid,
    pub user_id: Uuid,
    pub note: String,
    pub is_lunar: bool,
    pub lunar_day: Option<i32>,
    pub lunar_month: Option<i32>,
    pub lunar_year: Option<i32>,
    pub is_leap_month: Option<bool>,
    pub solar_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// The recurrence this event stands for.
    pub fn rule(&self) -> Result<RecurrenceRule> {
        rule_from_fields(
            self.is_lunar,
            self.lunar_day,
            self.lunar_month,
            self.is_leap_month,
            self.solar_date,
        )
    }
}

/// Event creation payload.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 500))]
    pub note: String,
    #[serde(default)]
    pub is_lunar: bool,
    #[validate(range(min = 1, max = 30))]
    pub lunar_day: Option<i32>,
    #[validate(range(min = 1, max = 12))]
    pub lunar_month: Option<i32>,
    pub lunar_year: Option<i32>,
    pub is_leap_month: Option<bool>,
    pub solar_date: Option<NaiveDate>,
}

impl CreateEventRequest {
    /// Check field shape and derive the recurrence the new event will carry.
    pub fn rule(&self) -> Result<RecurrenceRule> {
        self.validate()?;
        rule_from_fields(
            self.is_lunar,
            self.lunar_day,
            self.lunar_month,
            self.is_leap_month,
            self.solar_date,
        )
    }
}

/// Partial event update.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateEventRequest {
    #[validate(length(min = 1, max = 500))]
    pub note: Option<String>,
    pub is_lunar: Option<bool>,
    #[validate(range(min = 1, max = 30))]
    pub lunar_day: Option<i32>,
    #[validate(range(min = 1, max = 12))]
    pub lunar_month: Option<i32>,
    pub lunar_year: Option<i32>,
    pub is_leap_month: Option<bool>,
    pub solar_date: Option<NaiveDate>,
}

impl UpdateEventRequest {
    pub fn is_empty(&self) -> bool {
        self.note.is_none()
            && self.is_lunar.is_none()
            && self.lunar_day.is_none()
            && self.lunar_month.is_none()
            && self.lunar_year.is_none()
            && self.is_leap_month.is_none()
            && self.solar_date.is_none()
    }

    /// Check field shape, then apply on top of `current`, yielding the rule
    /// the updated row would hold.
    pub fn merged_rule(&self, current: &Event) -> Result<RecurrenceRule> {
        self.validate()?;
        rule_from_fields(
            self.is_lunar.unwrap_or(current.is_lunar),
            self.lunar_day.or(current.lunar_day),
            self.lunar_month.or(current.lunar_month),
            self.is_leap_month.or(current.is_leap_month),
            self.solar_date.or(current.solar_date),
        )
    }
}

/// Reminder row: always a lunar anniversary.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Reminder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub note: String,
    pub lunar_day: i32,
    pub lunar_month: i32,
    pub is_leap_month: bool,
    pub created_at: DateTime<Utc>,
}

impl Reminder {
    pub fn rule(&self) -> Result<RecurrenceRule> {
        rule_from_fields(
            true,
            Some(self.lunar_day),
            Some(self.lunar_month),
            Some(self.is_leap_month),
            None,
        )
    }
}

/// Reminder creation payload.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReminderRequest {
    pub user_id: Uuid,
    #[validate(length(min = 1, max = 500))]
    pub note: String,
    pub lunar_day: i32,
    pub lunar_month: i32,
    #[serde(default)]
    pub is_leap_month: bool,
}

/// Partial reminder update.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateReminderRequest {
    #[validate(length(min = 1, max = 500))]
    pub note: Option<String>,
    pub lunar_day: Option<i32>,
    pub lunar_month: Option<i32>,
    pub is_leap_month: Option<bool>,
}

/// Notification setting row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct NotificationSetting {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Option<Uuid>,
    pub channel: String,
    pub advance_days: i32,
    pub time_of_day: Option<NaiveTime>,
    pub is_enabled: Option<bool>,
    pub created_at: DateTime<Utc>,
}

/// Notification setting creation payload.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateNotificationSettingRequest {
    pub event_id: Option<Uuid>,
    #[validate(length(min = 1, max = 50))]
    pub channel: String,
    #[serde(default)]
    #[validate(range(min = 0, max = 365))]
    pub advance_days: i32,
    pub time_of_day: Option<NaiveTime>,
    pub is_enabled: Option<bool>,
}

/// Partial notification setting update.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateNotificationSettingRequest {
    pub event_id: Option<Uuid>,
    #[validate(length(min = 1, max = 50))]
    pub channel: Option<String>,
    #[validate(range(min = 0, max = 365))]
    pub advance_days: Option<i32>,
    pub time_of_day: Option<NaiveTime>,
    pub is_enabled: Option<bool>,
}

/// Notification log row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct NotificationLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Option<Uuid>,
    pub sent_at: DateTime<Utc>,
    pub channel: Option<String>,
    pub message: Option<String>,
    pub status: Option<String>,
    pub response: Option<String>,
}

/// Solar → lunar conversion payload.
#[derive(Debug, Serialize)]
pub struct LunarConversion {
    pub solar_date: String,
    pub lunar_day: u32,
    pub lunar_month: u32,
    pub lunar_year: i32,
    pub is_leap_month: bool,
    pub can_chi: String,
    pub formatted: String,
    pub vietnamese_date: String,
}

impl LunarConversion {
    pub fn new(solar: SolarDate, lunar: LunarDate) -> Self {
        Self {
            solar_date: solar.to_string(),
            lunar_day: lunar.day,
            lunar_month: lunar.month,
            lunar_year: lunar.year,
            is_leap_month: lunar.is_leap_month,
            can_chi: vietnamese::can_chi(lunar.year),
            formatted: vietnamese::short_date(&lunar),
            vietnamese_date: vietnamese::long_date(&lunar),
        }
    }
}

/// Lunar → solar conversion payload.
#[derive(Debug, Serialize)]
pub struct SolarConversion {
    pub lunar_day: u32,
    pub lunar_month: u32,
    pub lunar_year: i32,
    pub is_leap_month: bool,
    pub solar_date: String,
    pub solar_day: u32,
    pub solar_month: u32,
    pub solar_year: i32,
    pub formatted: String,
    pub day_of_week: Option<&'static str>,
}

impl SolarConversion {
    pub fn new(lunar: LunarDate, solar: SolarDate) -> Self {
        Self {
            lunar_day: lunar.day,
            lunar_month: lunar.month,
            lunar_year: lunar.year,
            is_leap_month: lunar.is_leap_month,
            solar_date: solar.to_string(),
            solar_day: solar.day,
            solar_month: solar.month,
            solar_year: solar.year,
            formatted: vietnamese::solar_date(&solar),
            day_of_week: vietnamese::weekday(&solar),
        }
    }
}

fn rule_from_fields(
    is_lunar: bool,
    lunar_day: Option<i32>,
    lunar_month: Option<i32>,
    is_leap_month: Option<bool>,
    solar_date: Option<NaiveDate>,
) -> Result<RecurrenceRule> {
    let rule = if is_lunar {
        let (day, month) = match (lunar_day, lunar_month) {
            (Some(d), Some(m)) if d > 0 && m > 0 => (d as u32, m as u32),
            _ => return Err(Error::Validation("Invalid lunar date provided.".to_string())),
        };
        RecurrenceRule::Lunar {
            day,
            month,
            leap_only: is_leap_month.unwrap_or(false),
        }
    } else {
        let date = solar_date.ok_or_else(|| {
            Error::Validation("Solar date is required for non-lunar events.".to_string())
        })?;
        RecurrenceRule::Solar { date: date.into() }
    };
    rule.validate()
        .map_err(|e| Error::Validation(e.to_string()))?;
    Ok(rule)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(is_lunar: bool) -> Event {
        Event {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            note: "Giỗ ông".to_string(),
            is_lunar,
            lunar_day: Some(10),
            lunar_month: Some(3),
            lunar_year: None,
            is_leap_month: None,
            solar_date: NaiveDate::from_ymd_opt(2024, 12, 25),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_event_rules() {
        assert_eq!(
            event(true).rule().unwrap(),
            RecurrenceRule::Lunar {
                day: 10,
                month: 3,
                leap_only: false
            }
        );
        assert_eq!(
            event(false).rule().unwrap(),
            RecurrenceRule::Solar {
                date: SolarDate::new(2024, 12, 25).unwrap()
            }
        );
    }

    #[test]
    fn test_create_event_validation() {
        let request: CreateEventRequest = serde_json::from_str(
            r#"{"note":"Rằm","is_lunar":true,"lunar_day":15,"lunar_month":8,"is_leap_month":true}"#,
        )
        .unwrap();
        assert_eq!(
            request.rule().unwrap(),
            RecurrenceRule::Lunar {
                day: 15,
                month: 8,
                leap_only: true
            }
        );

        let request: CreateEventRequest =
            serde_json::from_str(r#"{"note":"Rằm","is_lunar":true,"lunar_day":31,"lunar_month":8}"#).unwrap();
        assert!(matches!(request.rule(), Err(Error::Validation(_))));

        let request: CreateEventRequest =
            serde_json::from_str(r#"{"note":"Sinh nhật","is_lunar":false}"#).unwrap();
        assert!(matches!(request.rule(), Err(Error::Validation(_))));

        let request: CreateEventRequest =
            serde_json::from_str(r#"{"note":"Sinh nhật","solar_date":"2024-12-25"}"#).unwrap();
        assert!(request.rule().is_ok());
    }

    #[test]
    fn test_update_merges_with_current() {
        let current = event(true);
        let update = UpdateEventRequest {
            lunar_day: Some(30),
            ..Default::default()
        };
        assert!(!update.is_empty());
        assert_eq!(
            update.merged_rule(&current).unwrap(),
            RecurrenceRule::Lunar {
                day: 30,
                month: 3,
                leap_only: false
            }
        );
        assert!(UpdateEventRequest::default().is_empty());
    }

    #[test]
    fn test_update_rejects_bad_fields_on_solar_event() {
        let current = event(false);
        let update = UpdateEventRequest {
            note: Some(String::new()),
            lunar_day: Some(99),
            lunar_month: Some(42),
            ..Default::default()
        };
        assert!(matches!(update.merged_rule(&current), Err(Error::Validation(_))));

        let update = UpdateEventRequest {
            note: Some("Sinh nhật".to_string()),
            ..Default::default()
        };
        assert!(update.merged_rule(&current).is_ok());
    }

    #[test]
    fn test_reminder_rule_rejects_bad_month() {
        let reminder = Reminder {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            note: "Cúng rằm".to_string(),
            lunar_day: 15,
            lunar_month: 13,
            is_leap_month: false,
            created_at: Utc::now(),
        };
        assert!(matches!(reminder.rule(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_conversion_payloads() {
        let solar = SolarDate::new(2024, 9, 17).unwrap();
        let lunar = LunarDate::new(2024, 8, 15, false);
        let json = serde_json::to_value(LunarConversion::new(solar, lunar)).unwrap();
        assert_eq!(json["solar_date"], "2024-09-17");
        assert_eq!(json["lunar_day"], 15);
        assert_eq!(json["can_chi"], "Giáp Thìn");
        assert_eq!(json["vietnamese_date"], "Ngày 15 tháng Tám năm 2024");

        let json = serde_json::to_value(SolarConversion::new(lunar, solar)).unwrap();
        assert_eq!(json["solar_year"], 2024);
        assert_eq!(json["day_of_week"], "Thứ Ba");
    }
}
