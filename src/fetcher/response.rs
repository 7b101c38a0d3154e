//! Explorer response decoding
//!
//! Explorer responses share one envelope: `{"status": "1"|"0", "message": ..., "result": ...}`.
//! `result` holds an array of records on success and usually a string on failure.
//! Decoding never fails on shape; an unexpected shape becomes
//! [`ResponseStatus::Unknown`] or [`ApiResult::Other`] and is judged by the policy.

use crate::Record;
use serde_json::Value;

/// Explorer `status` field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseStatus {
    /// `"1"`: result holds records
    Success,
    /// `"0"`: real error, rate limiting or a benign "no transactions found"
    Failure,
    /// Missing or unrecognized status value (raw text kept for diagnostics)
    Unknown(String),
}

/// Explorer `result` field
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResult {
    /// Array of record objects
    Records(Vec<Record>),
    /// Plain text, typically an error message
    Text(String),
    /// Anything else (null, number, array with non-object items, ...)
    Other(Value),
}

impl ApiResult {
    /// Result rendered as text for message matching and diagnostics
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Records(records) => serde_json::to_string(records).unwrap_or_default(),
            Self::Other(Value::Null) => String::new(),
            Self::Other(v) => v.to_string(),
        }
    }
}

/// Decoded explorer response
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// Status indicator
    pub status: ResponseStatus,
    /// Human-readable message ("OK", "NOTOK", "No transactions found", ...)
    pub message: String,
    /// Result payload
    pub result: ApiResult,
}

impl ApiResponse {
    /// Decode a response body that has already been parsed as JSON
    pub fn from_value(body: Value) -> Self {
        let Value::Object(mut obj) = body else {
            return Self {
                status: ResponseStatus::Unknown("<body is not an object>".to_string()),
                message: String::new(),
                result: ApiResult::Other(body),
            };
        };

        let status = Self::parse_status(obj.get("status"));
        let message = match obj.remove("message") {
            Some(Value::String(s)) => s,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        let result = Self::parse_result(obj.remove("result").unwrap_or(Value::Null));

        Self {
            status,
            message,
            result,
        }
    }

    /// Build a success response (mainly for tests and scripted sources)
    pub fn success(records: Vec<Record>) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: "OK".to_string(),
            result: ApiResult::Records(records),
        }
    }

    /// Build a failure response with a text result
    pub fn failure(message: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Failure,
            message: message.into(),
            result: ApiResult::Text(result.into()),
        }
    }

    /// Consume the response, returning its records (empty unless the result is an array)
    pub fn into_records(self) -> Vec<Record> {
        match self.result {
            ApiResult::Records(records) => records,
            _ => Vec::new(),
        }
    }

    fn parse_status(value: Option<&Value>) -> ResponseStatus {
        match value {
            Some(Value::String(s)) => match s.trim() {
                "1" => ResponseStatus::Success,
                "0" => ResponseStatus::Failure,
                other => ResponseStatus::Unknown(other.to_string()),
            },
            Some(Value::Number(n)) => match n.as_i64() {
                Some(1) => ResponseStatus::Success,
                Some(0) => ResponseStatus::Failure,
                _ => ResponseStatus::Unknown(n.to_string()),
            },
            Some(other) => ResponseStatus::Unknown(other.to_string()),
            None => ResponseStatus::Unknown("<missing>".to_string()),
        }
    }

    fn parse_result(value: Value) -> ApiResult {
        match value {
            Value::String(s) => ApiResult::Text(s),
            Value::Array(items) if items.iter().all(Value::is_object) => ApiResult::Records(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::Object(map) => Some(Record::from_map(map)),
                        _ => None,
                    })
                    .collect(),
            ),
            other => ApiResult::Other(other),
        }
    }
}
