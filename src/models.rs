use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identifier of a habit or metric.
///
/// Producers disagree on whether ids are JSON numbers or strings; both are
/// folded into one trimmed string when the value is deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for EntityId {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&String> for EntityId {
    fn from(raw: &String) -> Self {
        Self::new(raw)
    }
}

impl From<&EntityId> for EntityId {
    fn from(id: &EntityId) -> Self {
        id.clone()
    }
}

impl From<i64> for EntityId {
    fn from(raw: i64) -> Self {
        Self(raw.to_string())
    }
}

impl From<u64> for EntityId {
    fn from(raw: u64) -> Self {
        Self(raw.to_string())
    }
}

impl From<i32> for EntityId {
    fn from(raw: i32) -> Self {
        Self(raw.to_string())
    }
}

impl From<f64> for EntityId {
    fn from(raw: f64) -> Self {
        if raw.is_finite() && raw.fract() == 0.0 && raw.abs() < 9.0e15 {
            Self((raw as i64).to_string())
        } else {
            Self(raw.to_string())
        }
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
            Float(f64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => EntityId::new(text),
            RawId::Signed(value) => EntityId::from(value),
            RawId::Unsigned(value) => EntityId::from(value),
            RawId::Float(value) => EntityId::from(value),
        })
    }
}

/// Whatever was recorded for a day: a habit check, a measurement, or text
/// from a producer that did not coerce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl LogValue {
    /// Whether the value marks the day as done. `false`, `0` and empty or
    /// `"0"` text are the unchecked states older clients write.
    pub fn is_truthy(&self) -> bool {
        match self {
            LogValue::Flag(flag) => *flag,
            LogValue::Number(number) => *number != 0.0 && !number.is_nan(),
            LogValue::Text(text) => {
                let text = text.trim();
                !text.is_empty() && text != "0" && !text.eq_ignore_ascii_case("false")
            }
        }
    }
}

impl Default for LogValue {
    fn default() -> Self {
        LogValue::Flag(true)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub entity_id: EntityId,
    /// Stored as received; may carry a time suffix or be empty.
    #[serde(default, deserialize_with = "coerce_date_key")]
    pub date: String,
    #[serde(default)]
    pub value: LogValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl LogEntry {
    pub fn new(entity_id: impl Into<EntityId>, date: impl Into<String>, value: LogValue) -> Self {
        Self {
            entity_id: entity_id.into(),
            date: date.into(),
            value,
            note: None,
        }
    }

    pub fn check(entity_id: impl Into<EntityId>, date: impl Into<String>) -> Self {
        Self::new(entity_id, date, LogValue::Flag(true))
    }
}

fn coerce_date_key<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
    #[serde(default)]
    pub archived: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    #[serde(default)]
    pub habits: Vec<Habit>,
    #[serde(default)]
    pub metrics: Vec<Metric>,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
}

impl AppData {
    pub fn habit(&self, id: &EntityId) -> Option<&Habit> {
        self.habits.iter().find(|habit| &habit.id == id)
    }

    pub fn habit_mut(&mut self, id: &EntityId) -> Option<&mut Habit> {
        self.habits.iter_mut().find(|habit| &habit.id == id)
    }

    pub fn metric(&self, id: &EntityId) -> Option<&Metric> {
        self.metrics.iter().find(|metric| &metric.id == id)
    }

    pub fn active_habits(&self) -> impl Iterator<Item = &Habit> {
        self.habits.iter().filter(|habit| !habit.archived)
    }

    /// Next time-based id: `now_millis`, bumped until no entity uses it.
    pub fn next_id(&self, now_millis: i64) -> EntityId {
        let mut candidate = now_millis;
        loop {
            let id = EntityId::from(candidate);
            let taken = self.habits.iter().any(|habit| habit.id == id)
                || self.metrics.iter().any(|metric| metric.id == id);
            if !taken {
                return id;
            }
            candidate += 1;
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewHabit {
    pub name: String,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub target: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct HabitUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub target: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct NewMetric {
    pub name: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub goal: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub habit_id: EntityId,
    pub date: String,
    /// Explicit state; omitted means flip the current one.
    #[serde(default, deserialize_with = "coerce_flag")]
    pub value: Option<bool>,
}

/// Accepts `true`/`false` as well as the `1`/`0` older clients send.
fn coerce_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawFlag {
        Flag(bool),
        Number(f64),
    }

    Ok(Option::<RawFlag>::deserialize(deserializer)?.map(|raw| match raw {
        RawFlag::Flag(flag) => flag,
        RawFlag::Number(number) => number != 0.0,
    }))
}

#[derive(Debug, Deserialize)]
pub struct MetricValueRequest {
    pub date: String,
    pub value: LogValue,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HabitStats {
    pub total: u32,
    pub streak: u32,
    pub rate30: u8,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub habit_id: EntityId,
    pub date: String,
    pub logged: bool,
    pub stats: HabitStats,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DayCell {
    pub date: String,
    pub logged: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HabitRow {
    pub habit_id: EntityId,
    pub name: String,
    pub cells: Vec<DayCell>,
    pub stats: HabitStats,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GridResponse {
    pub today: String,
    pub days: Vec<String>,
    pub rows: Vec<HabitRow>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WeekResponse {
    pub start: String,
    pub end: String,
    pub previous: String,
    pub next: String,
    pub days: Vec<String>,
    pub rows: Vec<HabitRow>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CalendarResponse {
    pub habit_id: EntityId,
    pub year: i32,
    pub month: u32,
    pub first_weekday: u32,
    pub cells: Vec<DayCell>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HeatmapResponse {
    pub habit_id: EntityId,
    pub start: String,
    pub end: String,
    pub cells: Vec<DayCell>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MetricPoint {
    pub date: String,
    pub value: Option<LogValue>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MetricSeriesResponse {
    pub metric_id: EntityId,
    pub points: Vec<MetricPoint>,
}
