//! Request and response shapes exchanged with the TurboNET HTTP API.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// HTTP methods used by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApiMethod {
    Get,
    Post,
}

impl fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiMethod::Get => write!(f, "GET"),
            ApiMethod::Post => write!(f, "POST"),
        }
    }
}

/// One outbound API call, built per invocation and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: ApiMethod,
    /// Path relative to the configured base URL, e.g. `/web/user`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    /// Start a request with no query, body or headers.
    pub fn new(method: ApiMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
        }
    }

    /// Append a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set the JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Append a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw status and body of an API response.
///
/// The adapter never interprets the status; callers treat anything other
/// than 200 as an API-level failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    /// Raw response text.
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the API reported success.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// Best-effort error message from a failed response.
    ///
    /// A JSON object yields its non-empty `message` string, or the whole
    /// object serialized when there is none. Anything else yields the raw text.
    pub fn error_message(&self) -> String {
        match self.json() {
            Ok(Value::Object(map)) => match map.get("message") {
                Some(Value::String(msg)) if !msg.is_empty() => msg.clone(),
                _ => Value::Object(map).to_string(),
            },
            _ => self.body.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_message_from_json_message() {
        let resp = ApiResponse::new(403, r#"{"message":"bad key","code":7}"#);
        assert_eq!(resp.error_message(), "bad key");
    }

    #[test]
    fn test_error_message_object_without_message() {
        let resp = ApiResponse::new(500, r#"{"code":7}"#);
        assert_eq!(resp.error_message(), r#"{"code":7}"#);
    }

    #[test]
    fn test_error_message_empty_message_falls_back_to_object() {
        let resp = ApiResponse::new(500, r#"{"message":""}"#);
        assert_eq!(resp.error_message(), r#"{"message":""}"#);
    }

    #[test]
    fn test_error_message_raw_text() {
        let resp = ApiResponse::new(502, "Bad Gateway");
        assert_eq!(resp.error_message(), "Bad Gateway");
    }

    #[test]
    fn test_error_message_non_object_json_uses_text() {
        let resp = ApiResponse::new(400, "[1,2]");
        assert_eq!(resp.error_message(), "[1,2]");
    }

    #[test]
    fn test_request_builder() {
        let req = ApiRequest::new(ApiMethod::Post, "/web/user")
            .with_query("requesterId", "42")
            .with_body(json!({"turboName": "AAA"}))
            .with_header("Authorization", "BotKey k");
        assert_eq!(req.query, vec![("requesterId".to_string(), "42".to_string())]);
        assert_eq!(req.header("authorization"), Some("BotKey k"));
        assert_eq!(req.body, Some(json!({"turboName": "AAA"})));
    }

    #[test]
    fn test_method_display() {
        assert_eq!(ApiMethod::Get.to_string(), "GET");
        assert_eq!(ApiMethod::Post.to_string(), "POST");
    }
}
