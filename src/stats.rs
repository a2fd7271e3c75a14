use crate::lookup::logged_dates;
use crate::models::{EntityId, HabitStats, LogEntry};
use chrono::{Duration, NaiveDate};

/// Longest backward walk when counting a streak.
pub const STREAK_WALK_LIMIT: u32 = 365;
pub const RATE_WINDOW_DAYS: i64 = 30;

/// Total, current streak and trailing 30-day rate for one entity.
///
/// An unlogged `today` does not break the streak: the walk then starts at
/// yesterday, and the first other unlogged day ends it.
pub fn compute_stats(
    logs: &[LogEntry],
    entity_id: impl Into<EntityId>,
    today: NaiveDate,
) -> HabitStats {
    let entity_id = entity_id.into();
    let dates = logged_dates(logs, &entity_id);
    if dates.is_empty() {
        return HabitStats::default();
    }

    let mut cursor = today;
    if !dates.contains(&today) {
        cursor = today - Duration::days(1);
    }
    let mut streak = 0u32;
    while streak < STREAK_WALK_LIMIT && dates.contains(&cursor) {
        streak += 1;
        cursor = cursor - Duration::days(1);
    }

    let window_start = today - Duration::days(RATE_WINDOW_DAYS - 1);
    let in_window = dates.range(window_start..=today).count();
    let rate30 = ((in_window as f64 / RATE_WINDOW_DAYS as f64) * 100.0).round() as u8;

    HabitStats {
        total: dates.len() as u32,
        streak,
        rate30: rate30.min(100),
    }
}
