//! Two-phase edits to the log collection.
//!
//! A change is applied to the in-memory document first and returns a
//! [`Tentative`] holding what it replaced. The caller then either confirms it
//! once the write has been persisted, or rolls it back.

use crate::dates::{date_key, normalize_date_key};
use crate::models::{AppData, EntityId, LogEntry, LogValue};
use chrono::NaiveDate;

#[derive(Debug)]
#[must_use = "a tentative change must be confirmed or rolled back"]
pub struct Tentative {
    entity_id: EntityId,
    date: String,
    previous: Vec<LogEntry>,
}

impl Tentative {
    pub fn confirm(self) {}

    /// Restores the entries for the touched (entity, day) pair.
    pub fn rollback(self, data: &mut AppData) {
        remove_day(&mut data.logs, &self.entity_id, &self.date);
        data.logs.extend(self.previous);
    }
}

fn remove_day(logs: &mut Vec<LogEntry>, entity_id: &EntityId, date: &str) -> Vec<LogEntry> {
    let (removed, kept): (Vec<_>, Vec<_>) = logs.drain(..).partition(|entry| {
        &entry.entity_id == entity_id && normalize_date_key(&entry.date) == date
    });
    *logs = kept;
    removed
}

/// Checks or unchecks a habit day. `value` of `None` flips the current
/// state. Returns whether the day is logged afterwards.
pub fn toggle(
    data: &mut AppData,
    habit_id: &EntityId,
    day: NaiveDate,
    value: Option<bool>,
) -> (bool, Tentative) {
    let date = date_key(day);
    let previous = remove_day(&mut data.logs, habit_id, &date);
    let was_logged = previous.iter().any(|entry| entry.value.is_truthy());
    let logged = value.unwrap_or(!was_logged);
    if logged {
        data.logs.push(LogEntry::check(habit_id, date.clone()));
    }
    let tentative = Tentative {
        entity_id: habit_id.clone(),
        date,
        previous,
    };
    (logged, tentative)
}

/// Writes a metric value for a day, replacing any earlier value in place.
pub fn set_value(
    data: &mut AppData,
    metric_id: &EntityId,
    day: NaiveDate,
    value: LogValue,
    note: Option<String>,
) -> Tentative {
    let date = date_key(day);
    let slot = data.logs.iter().position(|entry| {
        &entry.entity_id == metric_id && normalize_date_key(&entry.date) == date
    });
    let previous = remove_day(&mut data.logs, metric_id, &date);
    let entry = LogEntry {
        entity_id: metric_id.clone(),
        date: date.clone(),
        value,
        note,
    };
    match slot {
        Some(index) => data.logs.insert(index.min(data.logs.len()), entry),
        None => data.logs.push(entry),
    }
    Tentative {
        entity_id: metric_id.clone(),
        date,
        previous,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{is_logged, value_of};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn toggle_flips_and_dedupes() {
        let mut data = AppData::default();
        let id = EntityId::from("h");
        data.logs.push(LogEntry::check("h", "2024-03-01"));
        data.logs.push(LogEntry::check("h", "2024-03-01T09:00:00Z"));

        let (logged, change) = toggle(&mut data, &id, day(), None);
        change.confirm();
        assert!(!logged);
        assert!(data.logs.is_empty());

        let (logged, change) = toggle(&mut data, &id, day(), None);
        change.confirm();
        assert!(logged);
        assert_eq!(data.logs.len(), 1);
        assert_eq!(data.logs[0].date, "2024-03-01");
    }

    #[test]
    fn toggle_checks_a_day_stored_as_zero() {
        let mut data = AppData::default();
        let id = EntityId::from("h");
        data.logs.push(LogEntry::new("h", "2024-03-01", LogValue::Number(0.0)));

        let (logged, change) = toggle(&mut data, &id, day(), None);
        change.confirm();
        assert!(logged);
        assert_eq!(data.logs, vec![LogEntry::check("h", "2024-03-01")]);
    }

    #[test]
    fn explicit_value_sets_state() {
        let mut data = AppData::default();
        let id = EntityId::from("h");
        let (logged, change) = toggle(&mut data, &id, day(), Some(true));
        change.confirm();
        let (again, change) = toggle(&mut data, &id, day(), Some(true));
        change.confirm();
        assert!(logged && again);
        assert_eq!(data.logs.len(), 1);
    }

    #[test]
    fn rollback_restores_previous_entries() {
        let mut data = AppData::default();
        let id = EntityId::from("h");
        data.logs.push(LogEntry::check("h", "2024-03-01T09:00:00Z"));
        data.logs.push(LogEntry::check("other", "2024-03-01"));

        let (logged, change) = toggle(&mut data, &id, day(), None);
        assert!(!logged);
        assert!(!is_logged(&data.logs, "h", "2024-03-01"));
        change.rollback(&mut data);
        assert!(is_logged(&data.logs, "h", "2024-03-01"));
        assert_eq!(data.logs.len(), 2);

        let (_, change) = toggle(&mut data, &EntityId::from("new"), day(), None);
        change.rollback(&mut data);
        assert!(!is_logged(&data.logs, "new", "2024-03-01"));
    }

    #[test]
    fn metric_values_overwrite_in_place() {
        let mut data = AppData::default();
        let id = EntityId::from("w");
        data.logs.push(LogEntry::new("w", "2024-03-01", LogValue::Number(70.0)));
        data.logs.push(LogEntry::check("h", "2024-03-01"));

        set_value(&mut data, &id, day(), LogValue::Number(71.0), Some("am".into())).confirm();
        assert_eq!(data.logs.len(), 2);
        assert_eq!(data.logs[0].value, LogValue::Number(71.0));
        assert_eq!(data.logs[0].note.as_deref(), Some("am"));

        let change = set_value(&mut data, &id, day(), LogValue::Number(72.0), None);
        change.rollback(&mut data);
        assert_eq!(value_of(&data.logs, "w", "2024-03-01"), Some(&LogValue::Number(71.0)));
    }
}
