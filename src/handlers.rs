use crate::config::{MAX_HEATMAP_MONTHS, MAX_WINDOW_DAYS};
use crate::dates::{date_key, parse_date_key};
use crate::errors::AppError;
use crate::models::{
    AppData, CalendarResponse, EntityId, GridResponse, Habit, HabitStats, HabitUpdate,
    HeatmapResponse, Metric, MetricSeriesResponse, MetricValueRequest, NewHabit, NewMetric,
    ToggleRequest, ToggleResponse, WeekResponse,
};
use crate::state::AppState;
use crate::stats::compute_stats;
use crate::storage::persist_data;
use crate::sync::{self, Tentative};
use crate::views::{build_calendar, build_grid, build_heatmap, build_metric_series, build_week};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Datelike, Local, NaiveDate};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize, Default)]
pub struct TodayQuery {
    pub today: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct HabitListQuery {
    #[serde(default)]
    pub archived: bool,
}

#[derive(Debug, Deserialize, Default)]
pub struct WindowQuery {
    pub days: Option<usize>,
    pub today: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct WeekQuery {
    pub start: Option<String>,
    pub today: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub today: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct HeatmapQuery {
    pub months: Option<u32>,
    pub today: Option<String>,
}

pub async fn get_data(State(state): State<AppState>) -> Json<AppData> {
    let data = state.data.lock().await;
    Json(data.clone())
}

pub async fn list_habits(
    State(state): State<AppState>,
    Query(query): Query<HabitListQuery>,
) -> Json<Vec<Habit>> {
    let data = state.data.lock().await;
    let habits = data
        .habits
        .iter()
        .filter(|habit| query.archived || !habit.archived)
        .cloned()
        .collect();
    Json(habits)
}

pub async fn add_habit(
    State(state): State<AppState>,
    Json(payload): Json<NewHabit>,
) -> Result<(StatusCode, Json<Habit>), AppError> {
    let name = required_name(&payload.name)?;
    let mut data = state.data.lock().await;
    let snapshot = data.clone();
    let habit = Habit {
        id: data.next_id(Local::now().timestamp_millis()),
        name,
        frequency: payload.frequency,
        target: payload.target,
        archived: false,
    };
    data.habits.push(habit.clone());
    persist_or_restore(&state, &mut data, snapshot).await?;

    info!(habit_id = %habit.id, "added habit");
    Ok((StatusCode::CREATED, Json(habit)))
}

pub async fn update_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<HabitUpdate>,
) -> Result<Json<Habit>, AppError> {
    let id = EntityId::new(id);
    let name = payload.name.as_deref().map(required_name).transpose()?;
    let mut data = state.data.lock().await;
    let snapshot = data.clone();
    let habit = {
        let habit = data
            .habit_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("unknown habit {id}")))?;
        if let Some(name) = name {
            habit.name = name;
        }
        if payload.frequency.is_some() {
            habit.frequency = payload.frequency;
        }
        if payload.target.is_some() {
            habit.target = payload.target;
        }
        habit.clone()
    };
    persist_or_restore(&state, &mut data, snapshot).await?;
    Ok(Json(habit))
}

pub async fn archive_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Habit>, AppError> {
    let id = EntityId::new(id);
    let mut data = state.data.lock().await;
    let snapshot = data.clone();
    let habit = {
        let habit = data
            .habit_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("unknown habit {id}")))?;
        habit.archived = true;
        habit.clone()
    };
    persist_or_restore(&state, &mut data, snapshot).await?;

    info!(habit_id = %id, "archived habit");
    Ok(Json(habit))
}

pub async fn toggle(
    State(state): State<AppState>,
    Query(query): Query<TodayQuery>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, AppError> {
    let today = resolve_today(query.today.as_deref())?;
    let day = require_date(&payload.date)?;
    let mut data = state.data.lock().await;
    if data.habit(&payload.habit_id).is_none() {
        return Err(AppError::not_found(format!("unknown habit {}", payload.habit_id)));
    }

    let (logged, tentative) = sync::toggle(&mut data, &payload.habit_id, day, payload.value);
    confirm_or_rollback(&state, &mut data, tentative).await?;

    Ok(Json(ToggleResponse {
        stats: compute_stats(&data.logs, &payload.habit_id, today),
        habit_id: payload.habit_id,
        date: date_key(day),
        logged,
    }))
}

pub async fn habit_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<TodayQuery>,
) -> Result<Json<HabitStats>, AppError> {
    let today = resolve_today(query.today.as_deref())?;
    let id = EntityId::new(id);
    let data = state.data.lock().await;
    data.habit(&id)
        .ok_or_else(|| AppError::not_found(format!("unknown habit {id}")))?;
    Ok(Json(compute_stats(&data.logs, &id, today)))
}

pub async fn grid(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<GridResponse>, AppError> {
    let today = resolve_today(query.today.as_deref())?;
    let days = window_days(query.days, state.config.grid_days)?;
    let data = state.data.lock().await;
    Ok(Json(build_grid(&data, today, days)))
}

pub async fn week(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<WeekResponse>, AppError> {
    let today = resolve_today(query.today.as_deref())?;
    let anchor = match query.start.as_deref() {
        Some(start) => require_date(start)?,
        None => today,
    };
    let data = state.data.lock().await;
    Ok(Json(build_week(&data, anchor, today)))
}

pub async fn calendar(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarResponse>, AppError> {
    let today = resolve_today(query.today.as_deref())?;
    let year = query.year.unwrap_or_else(|| today.year());
    let month = query.month.unwrap_or_else(|| today.month());
    let id = EntityId::new(id);
    let data = state.data.lock().await;
    data.habit(&id)
        .ok_or_else(|| AppError::not_found(format!("unknown habit {id}")))?;
    build_calendar(&data.logs, &id, year, month)
        .map(Json)
        .ok_or_else(|| AppError::bad_request(format!("invalid month {year}-{month}")))
}

pub async fn heatmap(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<HeatmapQuery>,
) -> Result<Json<HeatmapResponse>, AppError> {
    let today = resolve_today(query.today.as_deref())?;
    let months = query.months.unwrap_or(state.config.heatmap_months);
    if months > MAX_HEATMAP_MONTHS {
        return Err(AppError::bad_request(format!(
            "months must be at most {MAX_HEATMAP_MONTHS}"
        )));
    }
    let id = EntityId::new(id);
    let data = state.data.lock().await;
    data.habit(&id)
        .ok_or_else(|| AppError::not_found(format!("unknown habit {id}")))?;
    Ok(Json(build_heatmap(&data.logs, &id, today, months)))
}

pub async fn list_metrics(State(state): State<AppState>) -> Json<Vec<Metric>> {
    let data = state.data.lock().await;
    Json(data.metrics.clone())
}

pub async fn add_metric(
    State(state): State<AppState>,
    Json(payload): Json<NewMetric>,
) -> Result<(StatusCode, Json<Metric>), AppError> {
    let name = required_name(&payload.name)?;
    let mut data = state.data.lock().await;
    let snapshot = data.clone();
    let metric = Metric {
        id: data.next_id(Local::now().timestamp_millis()),
        name,
        unit: payload.unit,
        goal: payload.goal,
    };
    data.metrics.push(metric.clone());
    persist_or_restore(&state, &mut data, snapshot).await?;

    info!(metric_id = %metric.id, "added metric");
    Ok((StatusCode::CREATED, Json(metric)))
}

pub async fn delete_metric(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = EntityId::new(id);
    let mut data = state.data.lock().await;
    if data.metric(&id).is_none() {
        return Err(AppError::not_found(format!("unknown metric {id}")));
    }
    let snapshot = data.clone();
    data.metrics.retain(|metric| metric.id != id);
    data.logs.retain(|entry| entry.entity_id != id);
    persist_or_restore(&state, &mut data, snapshot).await?;

    info!(metric_id = %id, "removed metric");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_metric_value(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<MetricValueRequest>,
) -> Result<StatusCode, AppError> {
    let id = EntityId::new(id);
    let day = require_date(&payload.date)?;
    let mut data = state.data.lock().await;
    if data.metric(&id).is_none() {
        return Err(AppError::not_found(format!("unknown metric {id}")));
    }
    let tentative = sync::set_value(&mut data, &id, day, payload.value, payload.note);
    confirm_or_rollback(&state, &mut data, tentative).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn metric_values(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<MetricSeriesResponse>, AppError> {
    let today = resolve_today(query.today.as_deref())?;
    let days = window_days(query.days, state.config.grid_days)?;
    let id = EntityId::new(id);
    let data = state.data.lock().await;
    if data.metric(&id).is_none() {
        return Err(AppError::not_found(format!("unknown metric {id}")));
    }
    Ok(Json(build_metric_series(&data.logs, &id, today, days)))
}

async fn confirm_or_rollback(
    state: &AppState,
    data: &mut AppData,
    tentative: Tentative,
) -> Result<(), AppError> {
    match persist_data(&state.config.data_path, data).await {
        Ok(()) => {
            tentative.confirm();
            Ok(())
        }
        Err(err) => {
            warn!("persist failed, rolling back: {}", err.message);
            tentative.rollback(data);
            Err(err)
        }
    }
}

async fn persist_or_restore(
    state: &AppState,
    data: &mut AppData,
    snapshot: AppData,
) -> Result<(), AppError> {
    if let Err(err) = persist_data(&state.config.data_path, data).await {
        warn!("persist failed, restoring previous data: {}", err.message);
        *data = snapshot;
        return Err(err);
    }
    Ok(())
}

fn required_name(raw: &str) -> Result<String, AppError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("name must not be empty"));
    }
    Ok(name.to_string())
}

fn require_date(raw: &str) -> Result<NaiveDate, AppError> {
    parse_date_key(raw).ok_or_else(|| AppError::bad_request(format!("invalid date '{raw}'")))
}

fn resolve_today(raw: Option<&str>) -> Result<NaiveDate, AppError> {
    match raw {
        Some(raw) => require_date(raw),
        None => Ok(Local::now().date_naive()),
    }
}

fn window_days(requested: Option<usize>, fallback: usize) -> Result<usize, AppError> {
    let days = requested.unwrap_or(fallback);
    if days == 0 || days > MAX_WINDOW_DAYS {
        return Err(AppError::bad_request(format!(
            "days must be between 1 and {MAX_WINDOW_DAYS}"
        )));
    }
    Ok(days)
}
