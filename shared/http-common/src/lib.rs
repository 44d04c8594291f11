//! Shared HTTP utilities for the qr-links workspace.
//!
//! Provides the JSON wire shapes, error bodies and query helpers used by
//! both the api-server and the url-cli, so the two print identical JSON.

use chrono::{DateTime, SecondsFormat, Utc};
use domain::qr::{QrLink, QrSticker};
use domain::service::UpdateOutcome;
use domain::{Action, ActionResult, CoreError};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

// ============================================================================
// JSON Response Helpers (framework-agnostic)
// ============================================================================

/// Create a structured error JSON with a default message based on the code.
///
/// Returns: `{"error": {"code": "<code>", "message": "<default message>"}}`
pub fn json_err(code: &str) -> serde_json::Value {
    let message = match code {
        "not_found" => "Resource not found",
        "bad_request" => "Bad request",
        "invalid_key" => "Key may only contain letters, digits and hyphens",
        "unauthorized" => "Missing or invalid API key",
        "bad_gateway" => "Shortener service unreachable",
        "error" | "internal" => "Internal server error",
        _ => code, // Fallback to code as message for unknown codes
    };
    serde_json::json!({"error": {"code": code, "message": message}})
}

/// Create a structured error JSON with a custom message.
///
/// Returns: `{"error": {"code": "<code>", "message": "<message>"}}`
pub fn json_error_with_message(code: &str, message: &str) -> serde_json::Value {
    serde_json::json!({"error": {"code": code, "message": message}})
}

/// HTTP status and error code for a core error.
pub fn error_status(err: &CoreError) -> (u16, &'static str) {
    match err {
        CoreError::Validation(_) => (400, "bad_request"),
        CoreError::NotFound => (404, "not_found"),
        CoreError::Transport(_) => (502, "bad_gateway"),
        CoreError::Repository(_) => (500, "internal"),
    }
}

/// Error body for a core error. Repository details stay out of the body.
pub fn core_error_json(err: &CoreError) -> serde_json::Value {
    match err {
        CoreError::Validation(msg) | CoreError::Transport(msg) => {
            json_error_with_message(error_status(err).1, msg)
        }
        CoreError::NotFound | CoreError::Repository(_) => json_err(error_status(err).1),
    }
}

// ============================================================================
// Wire Shapes
// ============================================================================

/// One logged action as it appears on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionOut {
    pub id: i64,
    pub action_type: String,
    pub url_key: String,
    pub long_url: Option<String>,
    pub response_code: u16,
    pub success: bool,
    pub response: serde_json::Value,
    pub timestamp: String,
}

impl From<&Action> for ActionOut {
    fn from(a: &Action) -> Self {
        Self {
            id: a.id,
            action_type: a.action_type.as_str().to_string(),
            url_key: a.url_key.to_string(),
            long_url: a.long_url.clone(),
            response_code: a.response_status,
            success: a.success(),
            response: a.response_payload.clone(),
            timestamp: system_time_to_rfc3339(a.timestamp),
        }
    }
}

pub fn actions_out(actions: &[Action]) -> Vec<ActionOut> {
    actions.iter().map(ActionOut::from).collect()
}

/// One leg of an update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepOut {
    pub action_type: String,
    pub response_code: u16,
    pub success: bool,
    pub response: serde_json::Value,
}

impl From<&ActionResult> for StepOut {
    fn from(r: &ActionResult) -> Self {
        Self {
            action_type: r.action_type.as_str().to_string(),
            response_code: r.response_status,
            success: r.success(),
            response: r.response_payload.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdateOut {
    pub action: ActionOut,
    pub delete_step: StepOut,
    pub create_step: StepOut,
    /// Exactly one leg was accepted by the remote.
    pub partial: bool,
}

impl From<&UpdateOutcome> for UpdateOut {
    fn from(o: &UpdateOutcome) -> Self {
        Self {
            action: ActionOut::from(&o.action),
            delete_step: StepOut::from(&o.delete_step),
            create_step: StepOut::from(&o.create_step),
            partial: o.is_partial(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QrOut {
    pub url_key: String,
    pub short_url: String,
    pub qr_url: String,
}

impl From<&QrLink> for QrOut {
    fn from(q: &QrLink) -> Self {
        Self {
            url_key: q.url_key.to_string(),
            short_url: q.short_url.clone(),
            qr_url: q.qr_url.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StickerOut {
    pub index: u64,
    pub text: String,
    pub qr_url: String,
}

impl From<&QrSticker> for StickerOut {
    fn from(s: &QrSticker) -> Self {
        Self {
            index: s.index,
            text: s.text.clone(),
            qr_url: s.qr_url.clone(),
        }
    }
}

/// Tracking payloads are passed through untouched, with a `hit_count` added
/// when the body is an object holding a `hits` array.
pub fn with_hit_count(mut payload: serde_json::Value) -> serde_json::Value {
    let count = payload.get("hits").and_then(|h| h.as_array()).map(Vec::len);
    if let (Some(n), Some(obj)) = (count, payload.as_object_mut()) {
        obj.insert("hit_count".to_string(), serde_json::json!(n));
    }
    payload
}

// ============================================================================
// Time Utilities
// ============================================================================

/// Convert SystemTime to RFC3339 string (millisecond precision, UTC).
pub fn system_time_to_rfc3339(t: SystemTime) -> String {
    let dt: DateTime<Utc> = t.into();
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ============================================================================
// Query Parsing
// ============================================================================

/// Parse a `limit` query parameter from a query string.
///
/// Returns `Some(n)` if `limit=n` is found and `n` is in range 1-500.
/// Returns `None` otherwise.
pub fn parse_limit_query(query: Option<&str>) -> Option<usize> {
    let q = query?;
    for pair in q.split('&') {
        let mut it = pair.splitn(2, '=');
        let key = it.next()?;
        if key == "limit" {
            if let Some(val) = it.next() {
                if let Ok(n) = val.parse::<usize>() {
                    if (1..=500).contains(&n) {
                        return Some(n);
                    }
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{ActionType, Owner, Slug};
    use serde_json::json;
    use std::time::{Duration, UNIX_EPOCH};

    fn action(t: ActionType, url: Option<&str>, status: u16) -> Action {
        Action {
            id: 3,
            action_type: t,
            url_key: Slug::new("promo").unwrap(),
            long_url: url.map(str::to_string),
            response_payload: json!({"status": status}),
            response_status: status,
            timestamp: UNIX_EPOCH + Duration::from_millis(1_700_000_000_123),
            owner: Owner::new("u").unwrap(),
        }
    }

    #[test]
    fn test_json_err() {
        let err = json_err("not_found");
        assert_eq!(err, json!({"error": {"code": "not_found", "message": "Resource not found"}}));

        // Unknown code falls back to code as message
        let err = json_err("custom_error");
        assert_eq!(err, json!({"error": {"code": "custom_error", "message": "custom_error"}}));
    }

    #[test]
    fn test_json_error_with_message() {
        let err = json_error_with_message("bad_request", "Invalid input");
        assert_eq!(err, json!({"error": {"code": "bad_request", "message": "Invalid input"}}));
    }

    #[test]
    fn test_core_error_mapping() {
        assert_eq!(error_status(&CoreError::Validation("x".into())).0, 400);
        assert_eq!(error_status(&CoreError::NotFound).0, 404);
        assert_eq!(error_status(&CoreError::Transport("x".into())).0, 502);
        assert_eq!(error_status(&CoreError::Repository("x".into())).0, 500);

        let body = core_error_json(&CoreError::Repository("sqlite error: disk full".into()));
        assert_eq!(body["error"]["message"], json!("Internal server error"));
        let body = core_error_json(&CoreError::Validation("long url required".into()));
        assert_eq!(body["error"]["message"], json!("long url required"));
    }

    #[test]
    fn test_action_out() {
        let out = ActionOut::from(&action(ActionType::Create, Some("https://e.com"), 200));
        assert_eq!(out.action_type, "create");
        assert_eq!(out.url_key, "promo");
        assert!(out.success);
        assert_eq!(out.timestamp, "2023-11-14T22:13:20.123Z");

        let v = serde_json::to_value(ActionOut::from(&action(ActionType::Delete, None, 404))).unwrap();
        assert_eq!(v["long_url"], serde_json::Value::Null);
        assert_eq!(v["response_code"], json!(404));
        assert_eq!(v["success"], json!(false));
    }

    #[test]
    fn test_update_out_partial() {
        let removed = ActionResult {
            action_type: ActionType::Delete,
            url_key: Some(Slug::new("promo").unwrap()),
            long_url: None,
            response_payload: json!({"error": "Key not found"}),
            response_status: 404,
        };
        let created = ActionResult {
            action_type: ActionType::Create,
            url_key: Some(Slug::new("promo").unwrap()),
            long_url: Some("https://e.com".into()),
            response_payload: json!({"shortUrl": "https://aws3.link/promo"}),
            response_status: 200,
        };
        let outcome = UpdateOutcome {
            action: action(ActionType::Update, Some("https://e.com"), 404),
            delete_step: removed,
            create_step: created,
        };
        let out = UpdateOut::from(&outcome);
        assert!(out.partial);
        assert!(!out.delete_step.success);
        assert!(out.create_step.success);
        assert_eq!(out.action.action_type, "update");
    }

    #[test]
    fn test_with_hit_count() {
        let v = with_hit_count(json!({"hits": [{"ip": "1"}, {"ip": "2"}]}));
        assert_eq!(v["hit_count"], json!(2));
        let v = with_hit_count(json!({"message": "no data"}));
        assert!(v.get("hit_count").is_none());
        assert_eq!(with_hit_count(json!("text")), json!("text"));
    }

    #[test]
    fn test_parse_limit_query() {
        assert_eq!(parse_limit_query(Some("limit=1")), Some(1));
        assert_eq!(parse_limit_query(Some("limit=500")), Some(500));
        assert_eq!(parse_limit_query(Some("limit=0")), None);
        assert_eq!(parse_limit_query(Some("limit=501")), None);
        assert_eq!(parse_limit_query(Some("page_token=x&limit=42")), Some(42));
        assert_eq!(parse_limit_query(None), None);
    }
}
