use crate::error::SchedulerResult;
use crate::store::Document;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event document fields
pub mod fields {
    pub const ID: &str = "id";
    pub const CALENDAR: &str = "calendar";
    pub const START_DATE: &str = "start_date";
    pub const END_DATE: &str = "end_date";
    pub const ALL_DAY: &str = "all_day";
    pub const TEXT: &str = "text";
    pub const DETAILS: &str = "details";
    pub const COLOR: &str = "color";
    pub const RECURRING: &str = "recurring";
    pub const SERIES_END_DATE: &str = "series_end_date";
    pub const ORIGIN_ID: &str = "origin_id";
    pub const UNITS: &str = "units";
    pub const SECTION: &str = "section";
}

/// Wire-only keys selecting the cascade of an event update
pub const RECURRING_UPDATE_MODE: &str = "recurring_update_mode";
pub const RECURRING_UPDATE_DATE: &str = "recurring_update_date";

/// `origin_id` value a master or standalone event carries
pub const NO_ORIGIN: &str = "0";

/// Fields an event create or update may write
pub const ALLOWED_EVENT_FIELDS: [&str; 12] = [
    fields::START_DATE,
    fields::END_DATE,
    fields::ALL_DAY,
    fields::TEXT,
    fields::DETAILS,
    fields::COLOR,
    fields::RECURRING,
    fields::CALENDAR,
    fields::ORIGIN_ID,
    fields::SERIES_END_DATE,
    fields::UNITS,
    fields::SECTION,
];

/// A calendar event: a standalone event, a recurring master, or one
/// materialized occurrence of a master (linked through `origin_id`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub calendar: String,
    #[serde(deserialize_with = "lenient::string")]
    pub start_date: String,
    #[serde(deserialize_with = "lenient::string")]
    pub end_date: String,
    #[serde(deserialize_with = "lenient::flag")]
    pub all_day: bool,
    #[serde(deserialize_with = "lenient::string")]
    pub text: String,
    #[serde(deserialize_with = "lenient::string")]
    pub details: String,
    #[serde(deserialize_with = "lenient::string")]
    pub color: String,
    /// Pattern descriptor; empty unless this is a recurring master
    #[serde(deserialize_with = "lenient::string")]
    pub recurring: String,
    /// End of a bounded series; empty for open-ended or non-recurring events
    #[serde(deserialize_with = "lenient::string")]
    pub series_end_date: String,
    /// Master id on occurrences, `"0"` or empty otherwise
    #[serde(deserialize_with = "lenient::string")]
    pub origin_id: String,
    #[serde(deserialize_with = "lenient::string_list")]
    pub units: Vec<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub section: String,
}

impl Event {
    pub fn from_document(document: Document) -> SchedulerResult<Self> {
        Ok(serde_json::from_value(Value::Object(document))?)
    }

    pub fn is_master(&self) -> bool {
        !self.recurring.is_empty()
    }

    pub fn is_occurrence(&self) -> bool {
        !self.origin_id.is_empty() && self.origin_id != NO_ORIGIN
    }

    pub fn is_open_ended(&self) -> bool {
        self.is_master() && self.series_end_date.is_empty()
    }

    /// Id of the series master: the origin for an occurrence, else its own id
    pub fn master_id(&self) -> &str {
        if self.is_occurrence() {
            &self.origin_id
        } else {
            &self.id
        }
    }
}

/// Keep only allow-listed event fields. Returns the filtered document and
/// the names of the fields that were dropped.
pub fn filter_event_fields(input: Document) -> (Document, Vec<String>) {
    let mut kept = Document::new();
    let mut stripped = Vec::new();

    for (key, value) in input {
        if ALLOWED_EVENT_FIELDS.contains(&key.as_str()) {
            kept.insert(key, value);
        } else {
            stripped.push(key);
        }
    }

    (kept, stripped)
}

/// Deserializers tolerating the loosely typed documents scheduler clients and
/// seed files produce (numeric ids, `"true"` flags, comma-joined unit lists)
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn scalar(value: Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::String(s) => s,
            other => other.to_string(),
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Value::deserialize(deserializer).map(scalar)
    }

    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
            Value::String(s) => matches!(s.trim(), "true" | "1"),
            _ => false,
        })
    }

    pub fn string_list<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => Vec::new(),
            Value::Array(items) => items.into_iter().map(scalar).collect(),
            Value::String(joined) => joined
                .split(',')
                .map(str::trim)
                .filter(|unit| !unit.is_empty())
                .map(str::to_string)
                .collect(),
            other => vec![scalar(other)],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_event_from_loose_document() {
        let event = Event::from_document(doc(json!({
            "id": 12,
            "calendar": 1,
            "start_date": "2024-01-01 09:00",
            "end_date": "2024-01-01 10:00",
            "all_day": "true",
            "text": "Planning",
            "origin_id": 0,
            "units": "1, 3,",
            "unknown": { "nested": true }
        })))
        .unwrap();

        assert_eq!(event.id, "12");
        assert_eq!(event.calendar, "1");
        assert!(event.all_day);
        assert_eq!(event.origin_id, "0");
        assert_eq!(event.units, vec!["1".to_string(), "3".to_string()]);
        assert!(event.details.is_empty());
        assert!(!event.is_occurrence());
    }

    #[test]
    fn test_series_roles() {
        let master = Event {
            id: "m".to_string(),
            recurring: "week_1___1,3".to_string(),
            origin_id: NO_ORIGIN.to_string(),
            ..Default::default()
        };
        assert!(master.is_master());
        assert!(master.is_open_ended());
        assert_eq!(master.master_id(), "m");

        let occurrence = Event {
            id: "o1".to_string(),
            origin_id: "m".to_string(),
            ..Default::default()
        };
        assert!(occurrence.is_occurrence());
        assert!(!occurrence.is_master());
        assert_eq!(occurrence.master_id(), "m");

        let standalone = Event {
            id: "s".to_string(),
            ..Default::default()
        };
        assert!(!standalone.is_occurrence());
        assert_eq!(standalone.master_id(), "s");
    }

    #[test]
    fn test_filter_event_fields() {
        let (kept, mut stripped) = filter_event_fields(doc(json!({
            "id": "forged",
            "text": "Review",
            "start_date": "2024-01-01",
            "recurring_update_mode": "all",
            "!nativeeditor_status": "updated"
        })));

        stripped.sort();
        assert_eq!(kept.len(), 2);
        assert!(kept.contains_key("text"));
        assert!(kept.contains_key("start_date"));
        assert_eq!(
            stripped,
            vec!["!nativeeditor_status", "id", "recurring_update_mode"]
        );
    }
}
