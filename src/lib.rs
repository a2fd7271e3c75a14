pub mod app;
pub mod config;
pub mod dates;
pub mod errors;
pub mod handlers;
pub mod lookup;
pub mod models;
pub mod state;
pub mod stats;
pub mod storage;
pub mod sync;
pub mod views;

pub use app::router;
pub use config::Config;
pub use dates::{first_weekday_index_monday, month_days, range_days, recent_days};
pub use lookup::{is_logged, value_of};
pub use state::AppState;
pub use stats::compute_stats;
pub use storage::load_data;
