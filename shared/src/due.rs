//! Deciding whether a stored event or reminder fires on a given day.

use serde::{Deserialize, Serialize};

use crate::lunar::{self, LunarDate, LunarError, SolarDate};

/// When a record fires.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecurrenceRule {
    /// Every year on lunar `day`/`month`. With `leap_only` it fires only in the
    /// leap occurrence of that month, otherwise in both the regular and leap one.
    Lunar { day: u32, month: u32, leap_only: bool },
    /// Once, on exactly this date.
    Solar { date: SolarDate },
}

impl RecurrenceRule {
    /// Check the rule is structurally sound before it is stored.
    pub fn validate(&self) -> Result<(), LunarError> {
        match *self {
            RecurrenceRule::Lunar { day, month, .. } if !lunar::is_valid_lunar_date(day, month) => {
                Err(LunarError::InvalidLunarDate(format!(
                    "day {day} of month {month} is not a lunar date"
                )))
            }
            RecurrenceRule::Lunar { .. } => Ok(()),
            RecurrenceRule::Solar { date } => date.to_naive().map(|_| ()),
        }
    }
}

/// Whether `rule` fires on `today`.
pub fn is_due(rule: &RecurrenceRule, today: SolarDate) -> Result<bool, LunarError> {
    let today_lunar = match rule {
        RecurrenceRule::Lunar { .. } => Some(lunar::solar_to_lunar(today)?),
        RecurrenceRule::Solar { .. } => None,
    };
    is_due_on(rule, today, today_lunar.as_ref())
}

/// Like [`is_due`] with today's lunar date already converted, for checking many
/// rules against the same day.
pub fn is_due_on(
    rule: &RecurrenceRule,
    today: SolarDate,
    today_lunar: Option<&LunarDate>,
) -> Result<bool, LunarError> {
    rule.validate()?;
    match *rule {
        RecurrenceRule::Lunar { day, month, leap_only } => {
            let converted;
            let today_lunar = match today_lunar {
                Some(l) => l,
                None => {
                    converted = lunar::solar_to_lunar(today)?;
                    &converted
                }
            };
            Ok(today_lunar.matches(day, month, leap_only.then_some(true)))
        }
        RecurrenceRule::Solar { date } => Ok(date == today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solar(y: i32, m: u32, d: u32) -> SolarDate {
        SolarDate::new(y, m, d).unwrap()
    }

    #[test]
    fn test_mid_autumn_rule() {
        let rule = RecurrenceRule::Lunar {
            day: 15,
            month: 8,
            leap_only: false,
        };
        assert_eq!(Ok(true), is_due(&rule, solar(2024, 9, 17)));
        assert_eq!(Ok(false), is_due(&rule, solar(2024, 9, 18)));
    }

    #[test]
    fn test_non_leap_rule_fires_in_both_occurrences() {
        let rule = RecurrenceRule::Lunar {
            day: 1,
            month: 2,
            leap_only: false,
        };
        assert_eq!(Ok(true), is_due(&rule, solar(2023, 2, 20)));
        assert_eq!(Ok(true), is_due(&rule, solar(2023, 3, 22)));
    }

    #[test]
    fn test_leap_only_rule() {
        let rule = RecurrenceRule::Lunar {
            day: 1,
            month: 2,
            leap_only: true,
        };
        assert_eq!(Ok(false), is_due(&rule, solar(2023, 2, 20)));
        assert_eq!(Ok(true), is_due(&rule, solar(2023, 3, 22)));
        // 2024 has no leap month
        assert_eq!(Ok(false), is_due(&rule, solar(2024, 3, 10)));
    }

    #[test]
    fn test_solar_rule_is_one_shot() {
        let rule = RecurrenceRule::Solar {
            date: solar(2024, 12, 25),
        };
        assert_eq!(Ok(true), is_due(&rule, solar(2024, 12, 25)));
        assert_eq!(Ok(false), is_due(&rule, solar(2025, 12, 25)));
    }

    #[test]
    fn test_reuses_converted_today() {
        let today = solar(2024, 9, 17);
        let today_lunar = lunar::solar_to_lunar(today).unwrap();
        let rules = [
            RecurrenceRule::Lunar {
                day: 15,
                month: 8,
                leap_only: false,
            },
            RecurrenceRule::Lunar {
                day: 16,
                month: 8,
                leap_only: false,
            },
            RecurrenceRule::Solar { date: today },
        ];
        let due: Vec<bool> = rules
            .iter()
            .map(|r| is_due_on(r, today, Some(&today_lunar)).unwrap())
            .collect();
        assert_eq!(vec![true, false, true], due);
    }

    #[test]
    fn test_rejects_malformed_rules() {
        let rule = RecurrenceRule::Lunar {
            day: 31,
            month: 5,
            leap_only: false,
        };
        assert!(matches!(
            is_due(&rule, solar(2024, 1, 1)),
            Err(LunarError::InvalidLunarDate(_))
        ));
    }

    #[test]
    fn test_rule_json_shape() {
        let rule: RecurrenceRule =
            serde_json::from_str(r#"{"kind":"lunar","day":15,"month":8,"leap_only":false}"#).unwrap();
        assert_eq!(
            RecurrenceRule::Lunar {
                day: 15,
                month: 8,
                leap_only: false
            },
            rule
        );
    }
}
