//! Payloads for the grid, week, calendar and heatmap screens, assembled from
//! the date sequences and log lookups.

use crate::dates::{
    date_key, first_weekday_index_monday, heatmap_start, month_days, range_days, recent_days,
    week_days, week_start,
};
use crate::lookup::{earliest_logged, is_logged, value_of};
use crate::models::{
    AppData, CalendarResponse, DayCell, EntityId, GridResponse, Habit, HabitRow,
    HeatmapResponse, LogEntry, MetricPoint, MetricSeriesResponse, WeekResponse,
};
use crate::stats::compute_stats;
use chrono::{Duration, NaiveDate};

fn cells(logs: &[LogEntry], entity_id: &EntityId, days: &[NaiveDate]) -> Vec<DayCell> {
    days.iter()
        .map(|day| {
            let date = date_key(*day);
            DayCell {
                logged: is_logged(logs, entity_id, &date),
                date,
            }
        })
        .collect()
}

fn rows(data: &AppData, days: &[NaiveDate], today: NaiveDate) -> Vec<HabitRow> {
    data.active_habits()
        .map(|habit: &Habit| HabitRow {
            habit_id: habit.id.clone(),
            name: habit.name.clone(),
            cells: cells(&data.logs, &habit.id, days),
            stats: compute_stats(&data.logs, &habit.id, today),
        })
        .collect()
}

pub fn build_grid(data: &AppData, today: NaiveDate, days: usize) -> GridResponse {
    let days = recent_days(today, days);
    GridResponse {
        today: date_key(today),
        rows: rows(data, &days, today),
        days: days.into_iter().map(date_key).collect(),
    }
}

/// Monday-start week containing `anchor`, with links to its neighbours.
pub fn build_week(data: &AppData, anchor: NaiveDate, today: NaiveDate) -> WeekResponse {
    let start = week_start(anchor);
    let days = week_days(start);
    let end = start + Duration::days(6);
    WeekResponse {
        start: date_key(start),
        end: date_key(end),
        previous: date_key(start - Duration::days(7)),
        next: date_key(start + Duration::days(7)),
        rows: rows(data, &days, today),
        days: days.into_iter().map(date_key).collect(),
    }
}

pub fn build_calendar(
    logs: &[LogEntry],
    entity_id: &EntityId,
    year: i32,
    month: u32,
) -> Option<CalendarResponse> {
    let first_weekday = first_weekday_index_monday(year, month)?;
    let days = month_days(year, month);
    Some(CalendarResponse {
        habit_id: entity_id.clone(),
        year,
        month,
        first_weekday,
        cells: cells(logs, entity_id, &days),
    })
}

pub fn build_heatmap(
    logs: &[LogEntry],
    entity_id: &EntityId,
    today: NaiveDate,
    lookback_months: u32,
) -> HeatmapResponse {
    let start = heatmap_start(today, lookback_months, earliest_logged(logs, entity_id));
    let days = range_days(start, today);
    HeatmapResponse {
        habit_id: entity_id.clone(),
        start: date_key(start),
        end: date_key(today),
        cells: cells(logs, entity_id, &days),
    }
}

pub fn build_metric_series(
    logs: &[LogEntry],
    metric_id: &EntityId,
    today: NaiveDate,
    days: usize,
) -> MetricSeriesResponse {
    let points = recent_days(today, days)
        .into_iter()
        .map(|day| {
            let date = date_key(day);
            MetricPoint {
                value: value_of(logs, metric_id, &date).cloned(),
                date,
            }
        })
        .collect();
    MetricSeriesResponse {
        metric_id: metric_id.clone(),
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LogValue;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn habit(id: &str, archived: bool) -> Habit {
        Habit {
            id: EntityId::from(id),
            name: format!("habit {id}"),
            frequency: None,
            target: None,
            archived,
        }
    }

    fn sample() -> AppData {
        AppData {
            habits: vec![habit("1", false), habit("2", true)],
            metrics: Vec::new(),
            logs: vec![
                LogEntry::check("1", "2024-09-01"),
                LogEntry::check("1", "2024-09-02T07:00:00"),
                LogEntry::check("2", "2024-09-02"),
            ],
        }
    }

    #[test]
    fn grid_skips_archived_habits() {
        let grid = build_grid(&sample(), ymd(2024, 9, 2), 7);
        assert_eq!(grid.days.len(), 7);
        assert_eq!(grid.days.last().map(String::as_str), Some("2024-09-02"));
        assert_eq!(grid.rows.len(), 1);
        let row = &grid.rows[0];
        assert_eq!(row.cells.iter().filter(|cell| cell.logged).count(), 2);
        assert_eq!(row.stats.streak, 2);
    }

    #[test]
    fn week_is_monday_based_with_neighbours() {
        let week = build_week(&sample(), ymd(2024, 9, 1), ymd(2024, 9, 2));
        assert_eq!(week.start, "2024-08-26");
        assert_eq!(week.end, "2024-09-01");
        assert_eq!(week.previous, "2024-08-19");
        assert_eq!(week.next, "2024-09-02");
        assert_eq!(week.days.len(), 7);
        assert!(week.rows[0].cells[6].logged);
    }

    #[test]
    fn calendar_marks_logged_days() {
        let data = sample();
        let calendar = build_calendar(&data.logs, &EntityId::from("1"), 2024, 9).unwrap();
        assert_eq!(calendar.first_weekday, 6);
        assert_eq!(calendar.cells.len(), 30);
        assert!(calendar.cells[0].logged && calendar.cells[1].logged);
        assert!(!calendar.cells[2].logged);
        assert!(build_calendar(&data.logs, &EntityId::from("1"), 2024, 13).is_none());
    }

    #[test]
    fn heatmap_starts_at_first_log() {
        let data = sample();
        let heatmap = build_heatmap(&data.logs, &EntityId::from("1"), ymd(2024, 9, 10), 12);
        assert_eq!(heatmap.start, "2024-09-01");
        assert_eq!(heatmap.cells.len(), 10);

        let empty = build_heatmap(&data.logs, &EntityId::from("9"), ymd(2024, 9, 10), 1);
        assert_eq!(empty.start, "2024-08-10");
        assert_eq!(empty.cells.last().map(|cell| cell.date.as_str()), Some("2024-09-10"));
    }

    #[test]
    fn metric_series_has_gaps() {
        let logs = vec![LogEntry::new("w", "2024-09-02", LogValue::Number(70.2))];
        let series = build_metric_series(&logs, &EntityId::from("w"), ymd(2024, 9, 3), 3);
        let values: Vec<_> = series.points.iter().map(|point| point.value.clone()).collect();
        assert_eq!(values, vec![None, Some(LogValue::Number(70.2)), None]);
    }
}
