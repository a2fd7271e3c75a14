//! Read-only queries over the flat log collection.

use crate::dates::{normalize_date_key, parse_date_key};
use crate::models::{EntityId, LogEntry, LogValue};
use chrono::NaiveDate;
use std::collections::BTreeSet;

fn matches(entry: &LogEntry, entity_id: &EntityId, date_key: &str) -> bool {
    &entry.entity_id == entity_id && normalize_date_key(&entry.date) == date_key
}

/// Normalized query key, or `None` when it can never match anything.
fn query_key<'k>(entity_id: &EntityId, date_key: &'k str) -> Option<&'k str> {
    if entity_id.is_empty() || parse_date_key(date_key).is_none() {
        return None;
    }
    Some(normalize_date_key(date_key))
}

/// Whether `entity_id` has a checked entry on `date_key`. Stored keys are
/// compared on their first ten characters; entries holding `false` or `0`
/// are unchecked days.
pub fn is_logged(logs: &[LogEntry], entity_id: impl Into<EntityId>, date_key: &str) -> bool {
    let entity_id = entity_id.into();
    let Some(key) = query_key(&entity_id, date_key) else {
        return false;
    };
    logs.iter()
        .any(|entry| matches(entry, &entity_id, key) && entry.value.is_truthy())
}

/// Raw value of the first entry for `entity_id` on `date_key`, zero or not.
pub fn value_of<'a>(
    logs: &'a [LogEntry],
    entity_id: impl Into<EntityId>,
    date_key: &str,
) -> Option<&'a LogValue> {
    let entity_id = entity_id.into();
    let key = query_key(&entity_id, date_key)?;
    logs.iter()
        .find(|entry| matches(entry, &entity_id, key))
        .map(|entry| &entry.value)
}

/// Distinct valid dates checked for `entity_id`. Malformed keys and falsy
/// values are dropped, matching what [`is_logged`] reports per day.
pub fn logged_dates(logs: &[LogEntry], entity_id: &EntityId) -> BTreeSet<NaiveDate> {
    if entity_id.is_empty() {
        return BTreeSet::new();
    }
    logs.iter()
        .filter(|entry| &entry.entity_id == entity_id && entry.value.is_truthy())
        .filter_map(|entry| parse_date_key(&entry.date))
        .collect()
}

pub fn earliest_logged(logs: &[LogEntry], entity_id: &EntityId) -> Option<NaiveDate> {
    logged_dates(logs, entity_id).into_iter().next()
}
