use serde_json::{Map, Value};
use tracing::debug;

use crate::error::PollError;

/// Review status of a single homework, as reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    pub fn parse(raw: &str) -> Result<Self, PollError> {
        match raw {
            "approved" => Ok(Self::Approved),
            "reviewing" => Ok(Self::Reviewing),
            "rejected" => Ok(Self::Rejected),
            other => Err(PollError::UnknownStatus(other.to_string())),
        }
    }

    pub fn verdict(self) -> &'static str {
        match self {
            Self::Approved => "Work reviewed: reviewer liked everything. Hooray!",
            Self::Reviewing => "Work taken for review by the reviewer.",
            Self::Rejected => "Work reviewed: reviewer has remarks.",
        }
    }
}

impl std::fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HomeworkStatus::Approved => write!(f, "approved"),
            HomeworkStatus::Reviewing => write!(f, "reviewing"),
            HomeworkStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// A validated submission record
#[derive(Debug, Clone, PartialEq)]
pub struct Homework {
    pub name: String,
    pub status: HomeworkStatus,
}

impl Homework {
    pub fn from_record(record: &Value) -> Result<Self, PollError> {
        let fields = record
            .as_object()
            .ok_or_else(|| PollError::Type("homework record must be an object".to_string()))?;

        let name = required_str(fields, "homework_name")?;
        let status = HomeworkStatus::parse(required_str(fields, "status")?)?;

        Ok(Self {
            name: name.to_string(),
            status,
        })
    }

    /// Human-readable notification text for this status
    pub fn message(&self) -> String {
        format!(
            "Review status changed for work \"{}\". {}",
            self.name,
            self.status.verdict()
        )
    }
}

fn required_str<'a>(fields: &'a Map<String, Value>, key: &'static str) -> Result<&'a str, PollError> {
    match fields.get(key) {
        None => Err(PollError::MissingField(key)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(PollError::Type(format!("field \"{}\" must be a string", key))),
    }
}

/// Shape-checked API response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusBatch {
    /// Raw records, most recent first
    pub homeworks: Vec<Value>,
    /// Server time to use as the next cursor, when the API sent one
    pub current_date: Option<i64>,
}

impl StatusBatch {
    pub fn latest(&self) -> Option<&Value> {
        self.homeworks.first()
    }
}

/// Check that the API answered with `{"homeworks": [...], "current_date": n}`.
///
/// `current_date` may be absent; the caller keeps its previous cursor then.
pub fn check_response(response: Value) -> Result<StatusBatch, PollError> {
    let mut fields = match response {
        Value::Object(fields) => fields,
        _ => {
            return Err(PollError::Type(
                "API response must be an object".to_string(),
            ))
        }
    };

    let homeworks = match fields.remove("homeworks") {
        None => {
            return Err(PollError::ResponseShape(
                "API response has no \"homeworks\" key".to_string(),
            ))
        }
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(PollError::Type(
                "\"homeworks\" field must be a list".to_string(),
            ))
        }
    };

    let current_date = match fields.get("current_date") {
        None | Some(Value::Null) => None,
        Some(value) => Some(value.as_i64().ok_or_else(|| {
            PollError::Type("\"current_date\" field must be an integer".to_string())
        })?),
    };

    Ok(StatusBatch {
        homeworks,
        current_date,
    })
}

/// Turn one homework record into the notification text.
pub fn parse_status(record: &Value) -> Result<String, PollError> {
    let homework = Homework::from_record(record)?;
    debug!("Latest homework \"{}\" is {}", homework.name, homework.status);
    Ok(homework.message())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_approved_message() {
        let msg = parse_status(&json!({"homework_name": "lab1", "status": "approved"})).unwrap();
        assert_eq!(
            msg,
            "Review status changed for work \"lab1\". Work reviewed: reviewer liked everything. Hooray!"
        );
    }

    #[test]
    fn test_each_status_has_its_verdict() {
        for (raw, verdict) in [
            ("approved", "Work reviewed: reviewer liked everything. Hooray!"),
            ("reviewing", "Work taken for review by the reviewer."),
            ("rejected", "Work reviewed: reviewer has remarks."),
        ] {
            let status = HomeworkStatus::parse(raw).unwrap();
            assert_eq!(status.verdict(), verdict);
            assert_eq!(status.to_string(), raw);
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        let err = parse_status(&json!({"homework_name": "lab1", "status": "archived"})).unwrap_err();
        assert!(matches!(err, PollError::UnknownStatus(s) if s == "archived"));
    }

    #[test]
    fn test_missing_name_and_status() {
        let err = parse_status(&json!({"status": "approved"})).unwrap_err();
        assert!(matches!(err, PollError::MissingField("homework_name")));

        let err = parse_status(&json!({"homework_name": "lab1"})).unwrap_err();
        assert!(matches!(err, PollError::MissingField("status")));
    }

    #[test]
    fn test_non_object_record() {
        let err = parse_status(&json!("lab1")).unwrap_err();
        assert!(matches!(err, PollError::Type(_)));
    }

    #[test]
    fn test_check_response_keeps_order() {
        let batch = check_response(json!({
            "homeworks": [
                {"homework_name": "lab2", "status": "reviewing"},
                {"homework_name": "lab1", "status": "approved"}
            ],
            "current_date": 2000
        }))
        .unwrap();

        assert_eq!(batch.homeworks.len(), 2);
        assert_eq!(batch.latest().unwrap()["homework_name"], "lab2");
        assert_eq!(batch.current_date, Some(2000));
    }

    #[test]
    fn test_check_response_without_current_date() {
        let batch = check_response(json!({"homeworks": []})).unwrap();
        assert!(batch.homeworks.is_empty());
        assert!(batch.latest().is_none());
        assert_eq!(batch.current_date, None);
    }

    #[test]
    fn test_missing_homeworks_is_shape_error() {
        let err = check_response(json!({"current_date": 2000})).unwrap_err();
        assert!(matches!(err, PollError::ResponseShape(_)));
    }

    #[test]
    fn test_non_object_response_is_type_error() {
        let err = check_response(json!([{"homework_name": "lab1"}])).unwrap_err();
        assert!(matches!(err, PollError::Type(_)));
    }

    #[test]
    fn test_homeworks_not_a_list_is_type_error() {
        let err = check_response(json!({"homeworks": {"homework_name": "lab1"}})).unwrap_err();
        assert!(matches!(err, PollError::Type(_)));
    }

    #[test]
    fn test_non_integer_current_date_is_type_error() {
        let err = check_response(json!({"homeworks": [], "current_date": "yesterday"})).unwrap_err();
        assert!(matches!(err, PollError::Type(_)));
    }
}
