use serde::Deserialize;
use serde_json::Value;

use crate::error::{EasemobError, Result};

/// Either a parsed JSON document or the body bytes exactly as received.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResult {
    Json(Value),
    Raw(Vec<u8>),
}

/// `{error, error_description}` pair the provider puts in failed responses.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub error_description: String,
}

impl ErrorBody {
    /// Present only when `error` is non-empty.
    pub fn from_value(value: &Value) -> Option<Self> {
        let error = match value.get("error")? {
            Value::Null => return None,
            Value::String(s) if s.is_empty() => return None,
            Value::String(s) => s.to_owned(),
            other => other.to_string(),
        };
        let error_description = value
            .get("error_description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        Some(Self { error, error_description })
    }

    /// Error body of a payload that may or may not be JSON.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        serde_json::from_slice::<Value>(bytes)
            .ok()
            .and_then(|value| Self::from_value(&value))
    }
}

impl ApiResult {
    /// JSON when the body parses to a non-empty value, raw bytes otherwise.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(value) if !is_empty_json(&value) => ApiResult::Json(value),
            _ => ApiResult::Raw(bytes),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ApiResult::Json(value) => Some(value),
            ApiResult::Raw(_) => None,
        }
    }

    pub fn into_json(self) -> Result<Value> {
        match self {
            ApiResult::Json(value) => Ok(value),
            ApiResult::Raw(bytes) => Err(EasemobError::UnexpectedResponse(format!(
                "expected JSON, got {} raw bytes",
                bytes.len()
            ))),
        }
    }

    /// Provider error carried by a JSON body with a non-empty `error` field.
    pub fn error_body(&self) -> Option<ErrorBody> {
        self.as_json().and_then(ErrorBody::from_value)
    }

    /// Turns a provider error body into [`EasemobError::Provider`].
    pub fn error_for_provider(self) -> Result<Self> {
        match self.error_body() {
            Some(ErrorBody { error, error_description }) => Err(EasemobError::Provider {
                error,
                error_description,
            }),
            None => Ok(self),
        }
    }
}

fn is_empty_json(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_json_kept_as_raw_bytes() {
        let png = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
        assert_eq!(ApiResult::from_bytes(png.clone()), ApiResult::Raw(png));
    }

    #[test]
    fn empty_json_kept_as_raw_bytes() {
        assert_eq!(ApiResult::from_bytes(b"{}".to_vec()), ApiResult::Raw(b"{}".to_vec()));
        assert_eq!(ApiResult::from_bytes(b"null".to_vec()), ApiResult::Raw(b"null".to_vec()));
        assert_eq!(ApiResult::from_bytes(Vec::new()), ApiResult::Raw(Vec::new()));
    }

    #[test]
    fn provider_error_detected() {
        let result = ApiResult::from_bytes(
            br#"{"error":"illegal_argument","error_description":"username is invalid"}"#.to_vec(),
        );
        let err = result.error_for_provider().unwrap_err();
        match err {
            EasemobError::Provider { error, error_description } => {
                assert_eq!(error, "illegal_argument");
                assert_eq!(error_description, "username is invalid");
            }
            other => panic!("unexpected {other:?}"),
        }

        let ok = ApiResult::Json(json!({"error": "", "entities": []}));
        assert!(ok.error_for_provider().is_ok());
    }

    #[test]
    fn error_body_from_arbitrary_bytes() {
        let body = ErrorBody::from_bytes(br#"{"error":"file_not_found","error_description":"gone"}"#);
        assert_eq!(body.map(|b| b.error), Some("file_not_found".to_owned()));

        assert_eq!(ErrorBody::from_bytes(b"{\n  \"price\": 1.50\n}\n"), None);
        assert_eq!(ErrorBody::from_bytes(&[0x89, b'P', b'N', b'G']), None);
    }
}
