use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The two server-side collections the client works against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Exercise,
    Session,
}

impl EntityKind {
    pub const ALL: [Self; 2] = [Self::Exercise, Self::Session];

    /// Collection path segment under the API root.
    pub fn path(self) -> &'static str {
        match self {
            Self::Exercise => "exercises",
            Self::Session => "sessions",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exercise => "exercise",
            Self::Session => "session",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "exercise" | "exercises" | "ex" => Some(Self::Exercise),
            "session" | "sessions" | "s" => Some(Self::Session),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Strength,
    Mobility,
    Balance,
}

impl Category {
    /// Fixed slice order of the distribution chart.
    pub const ALL: [Self; 3] = [Self::Strength, Self::Mobility, Self::Balance];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strength => "strength",
            Self::Mobility => "mobility",
            Self::Balance => "balance",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Strength => "Strength",
            Self::Mobility => "Mobility",
            Self::Balance => "Balance",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.as_str() == raw)
    }
}

/// Exercise record as returned by the backend.
///
/// `side` and `category` stay raw strings so that records carrying values
/// outside the known sets still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub side: String,
    pub category: String,
    #[serde(default)]
    pub target_sets: Option<i64>,
    #[serde(default)]
    pub target_reps: Option<i64>,
    #[serde(default)]
    pub target_hold_sec: Option<i64>,
    #[serde(default)]
    pub schedule_dow: Vec<u8>,
}

impl Exercise {
    pub fn category_kind(&self) -> Option<Category> {
        Category::parse(&self.category)
    }

    /// Scheduled days of week (0 = Sunday), deduplicated and ascending.
    pub fn schedule_days(&self) -> BTreeSet<u8> {
        self.schedule_dow
            .iter()
            .copied()
            .filter(|day| *day <= 6)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub exercise_id: i64,
    pub date: String,
    #[serde(default)]
    pub sets: Option<i64>,
    #[serde(default)]
    pub reps: Option<i64>,
    #[serde(default)]
    pub hold_sec: Option<i64>,
    #[serde(default)]
    pub pain_0_10: Option<i64>,
    #[serde(default)]
    pub rom_deg: Option<i64>,
}

/// Body of `POST /exercises`. Every field is sent, absent optionals as null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewExercise {
    pub name: String,
    pub side: String,
    pub category: String,
    pub target_sets: Option<i64>,
    pub target_reps: Option<i64>,
    pub target_hold_sec: Option<i64>,
    pub schedule_dow: Vec<u8>,
}

/// Body of `PUT /exercises/{id}`. Unset fields are left out of the JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExercisePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_sets: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_reps: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_hold_sec: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_dow: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSession {
    pub exercise_id: i64,
    pub date: String,
    pub sets: Option<i64>,
    pub reps: Option<i64>,
    pub hold_sec: Option<i64>,
    pub pain_0_10: Option<i64>,
    pub rom_deg: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sets: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reps: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hold_sec: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pain_0_10: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rom_deg: Option<i64>,
}

/// Query string of `GET /sessions`. Bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise_id: Option<i64>,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub db: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exercise_with_unknown_category_still_parses() {
        let exercise: Exercise = serde_json::from_value(serde_json::json!({
            "id": 4,
            "name": "Wall slide",
            "side": "both",
            "category": "cardio",
            "schedule_dow": [5, 1, 1, 9]
        }))
        .expect("exercise should parse");

        assert_eq!(exercise.category_kind(), None);
        assert_eq!(exercise.target_sets, None);
        assert_eq!(exercise.schedule_days().into_iter().collect::<Vec<_>>(), vec![1, 5]);
    }

    #[test]
    fn patch_leaves_out_unset_fields() {
        let patch = SessionPatch {
            date: Some("2024-01-02".to_string()),
            pain_0_10: Some(0),
            ..SessionPatch::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, serde_json::json!({ "date": "2024-01-02", "pain_0_10": 0 }));
    }

    #[test]
    fn new_session_sends_absent_fields_as_null() {
        let body = NewSession {
            exercise_id: 1,
            date: "2024-01-01".to_string(),
            sets: None,
            reps: Some(10),
            hold_sec: None,
            pain_0_10: None,
            rom_deg: Some(95),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["sets"], serde_json::Value::Null);
        assert_eq!(value["reps"], 10);
        assert_eq!(value["rom_deg"], 95);
    }

    #[test]
    fn filter_encodes_only_given_bounds() {
        let filter = SessionFilter {
            from_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            exercise_id: Some(3),
            ..SessionFilter::default()
        };
        let value = serde_json::to_value(&filter).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "from_date": "2024-01-01", "exercise_id": 3 })
        );
    }

    #[test]
    fn entity_kind_parses_short_names() {
        assert_eq!(EntityKind::parse("Exercise"), Some(EntityKind::Exercise));
        assert_eq!(EntityKind::parse("sessions"), Some(EntityKind::Session));
        assert_eq!(EntityKind::parse("workout"), None);
    }
}
