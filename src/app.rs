use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/data", get(handlers::get_data))
        .route("/api/habits", get(handlers::list_habits).post(handlers::add_habit))
        .route("/api/habits/:id", patch(handlers::update_habit))
        .route("/api/habits/:id/archive", post(handlers::archive_habit))
        .route("/api/habits/:id/stats", get(handlers::habit_stats))
        .route("/api/habits/:id/calendar", get(handlers::calendar))
        .route("/api/habits/:id/heatmap", get(handlers::heatmap))
        .route("/api/toggle", post(handlers::toggle))
        .route("/api/grid", get(handlers::grid))
        .route("/api/week", get(handlers::week))
        .route("/api/metrics", get(handlers::list_metrics).post(handlers::add_metric))
        .route("/api/metrics/:id", delete(handlers::delete_metric))
        .route(
            "/api/metrics/:id/values",
            put(handlers::set_metric_value).get(handlers::metric_values),
        )
        .with_state(state)
}
