//! Data access for the Postgres tables behind the API.
//!
//! Every function takes the pool explicitly; none of them hold state.

pub mod events;
pub mod notifications;
pub mod profiles;
pub mod reminders;

use tracing::warn;
use uuid::Uuid;

use crate::due::{self, RecurrenceRule};
use crate::lunar::{LunarDate, SolarDate};
use crate::{Error, Result};

/// Keep the records whose rule fires today, skipping rows holding malformed rules.
pub(crate) fn retain_due<T>(
    records: Vec<T>,
    today: SolarDate,
    today_lunar: &LunarDate,
    rule: impl Fn(&T) -> Result<RecurrenceRule>,
    id: impl Fn(&T) -> Uuid,
) -> Vec<T> {
    records
        .into_iter()
        .filter(|record| {
            let checked = rule(record)
                .and_then(|r| due::is_due_on(&r, today, Some(today_lunar)).map_err(Error::from));
            match checked {
                Ok(is_due) => is_due,
                Err(e) => {
                    warn!(record_id = %id(record), error = %e, "Skipping record with malformed rule");
                    false
                }
            }
        })
        .collect()
}
