use std::{env, ops::RangeInclusive, path::PathBuf};
use tracing::warn;

/// Largest heatmap look-back accepted from the environment or a request.
pub const MAX_HEATMAP_MONTHS: u32 = 60;
/// Largest day window accepted for grids and metric series.
pub const MAX_WINDOW_DAYS: usize = 366 * 5;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/state.json";
const DEFAULT_HEATMAP_MONTHS: u32 = 12;
const DEFAULT_GRID_DAYS: usize = 7;

/// Settings read from the environment; unparsable values fall back to the
/// defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub heatmap_months: u32,
    pub grid_days: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            heatmap_months: DEFAULT_HEATMAP_MONTHS,
            grid_days: DEFAULT_GRID_DAYS,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: parse_or(lookup("PORT"), defaults.port),
            data_path: lookup("APP_DATA_PATH")
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            heatmap_months: bounded(
                "HEATMAP_MONTHS",
                parse_or(lookup("HEATMAP_MONTHS"), defaults.heatmap_months),
                0..=MAX_HEATMAP_MONTHS,
                defaults.heatmap_months,
            ),
            grid_days: bounded(
                "GRID_DAYS",
                parse_or(lookup("GRID_DAYS"), defaults.grid_days),
                1..=MAX_WINDOW_DAYS,
                defaults.grid_days,
            ),
        }
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, fallback: T) -> T {
    value
        .and_then(|value| value.trim().parse::<T>().ok())
        .unwrap_or(fallback)
}

fn bounded<T>(key: &str, value: T, range: RangeInclusive<T>, fallback: T) -> T
where
    T: PartialOrd + std::fmt::Display,
{
    if range.contains(&value) {
        return value;
    }
    warn!(
        "{key}={value} is outside {}..={}, using {fallback}",
        range.start(),
        range.end()
    );
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn missing_and_bad_values_use_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([("PORT", "not-a-port"), ("GRID_DAYS", "")]);
        let config = Config::from_lookup(|key| vars.get(key).map(|value| value.to_string()));
        assert_eq!(config.port, 8080);
        assert_eq!(config.grid_days, 7);
        assert_eq!(config.heatmap_months, 12);
        assert_eq!(config.data_path, PathBuf::from("data/state.json"));
    }

    #[test]
    fn out_of_range_limits_use_defaults() {
        let vars: HashMap<&str, &str> =
            HashMap::from([("HEATMAP_MONTHS", "100"), ("GRID_DAYS", "0")]);
        let config = Config::from_lookup(|key| vars.get(key).map(|value| value.to_string()));
        assert_eq!(config.heatmap_months, 12);
        assert_eq!(config.grid_days, 7);

        let vars: HashMap<&str, &str> =
            HashMap::from([("HEATMAP_MONTHS", "60"), ("GRID_DAYS", "1830")]);
        let config = Config::from_lookup(|key| vars.get(key).map(|value| value.to_string()));
        assert_eq!(config.heatmap_months, MAX_HEATMAP_MONTHS);
        assert_eq!(config.grid_days, MAX_WINDOW_DAYS);
    }

    #[test]
    fn values_are_read() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("PORT", "9000"),
            ("APP_DATA_PATH", "/tmp/habits.json"),
            ("HEATMAP_MONTHS", "6"),
            ("GRID_DAYS", "14"),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).map(|value| value.to_string()));
        assert_eq!(config.port, 9000);
        assert_eq!(config.data_path, PathBuf::from("/tmp/habits.json"));
        assert_eq!(config.heatmap_months, 6);
        assert_eq!(config.grid_days, 14);
    }
}
