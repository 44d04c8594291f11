use std::sync::Mutex;

use serde_json::json;

use crate::tracking::tag_url;
use crate::{ActionResult, ActionType, CoreError, Shortener, Slug};

/// A remote call as seen by [`ScriptedShortener`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemoteCall {
    Shorten { long_url: String, key: Option<String> },
    Remove { key: String },
    Track { key: String },
}

/// Offline stand-in for the remote shortener with canned status codes.
///
/// Records every call so tests can assert on order and arguments.
pub struct ScriptedShortener {
    shorten_status: u16,
    remove_status: u16,
    shorten_unreachable: bool,
    remove_unreachable: bool,
    hits: serde_json::Value,
    calls: Mutex<Vec<RemoteCall>>,
}

impl ScriptedShortener {
    /// Every call succeeds with status 200.
    pub fn new() -> Self {
        Self {
            shorten_status: 200,
            remove_status: 200,
            shorten_unreachable: false,
            remove_unreachable: false,
            hits: json!([]),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_shorten_status(mut self, status: u16) -> Self {
        self.shorten_status = status;
        self
    }

    pub fn with_remove_status(mut self, status: u16) -> Self {
        self.remove_status = status;
        self
    }

    pub fn with_unreachable_shorten(mut self) -> Self {
        self.shorten_unreachable = true;
        self
    }

    pub fn with_unreachable_remove(mut self) -> Self {
        self.remove_unreachable = true;
        self
    }

    pub fn with_hits(mut self, hits: serde_json::Value) -> Self {
        self.hits = hits;
        self
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: RemoteCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl Default for ScriptedShortener {
    fn default() -> Self {
        Self::new()
    }
}

impl Shortener for ScriptedShortener {
    async fn shorten(&self, long_url: &str, key: Option<&Slug>) -> Result<ActionResult, CoreError> {
        let tagged = tag_url(long_url);
        self.record(RemoteCall::Shorten {
            long_url: tagged.clone(),
            key: key.map(|k| k.as_str().to_string()),
        });
        if self.shorten_unreachable {
            return Err(CoreError::Transport("connection refused".into()));
        }
        let payload = if self.shorten_status == 200 {
            json!({"shortUrl": format!("https://aws3.link/{}", key.map(Slug::as_str).unwrap_or("generated"))})
        } else {
            json!({"error": format!("remote status {}", self.shorten_status)})
        };
        Ok(ActionResult {
            action_type: ActionType::Create,
            url_key: key.cloned(),
            long_url: Some(tagged),
            response_payload: payload,
            response_status: self.shorten_status,
        })
    }

    async fn remove(&self, key: &Slug) -> Result<ActionResult, CoreError> {
        self.record(RemoteCall::Remove {
            key: key.as_str().to_string(),
        });
        if self.remove_unreachable {
            return Err(CoreError::Transport("connection refused".into()));
        }
        let payload = if self.remove_status == 200 {
            json!({"message": "Key deleted successfully"})
        } else {
            json!({"error": format!("remote status {}", self.remove_status)})
        };
        Ok(ActionResult {
            action_type: ActionType::Delete,
            url_key: Some(key.clone()),
            long_url: None,
            response_payload: payload,
            response_status: self.remove_status,
        })
    }

    async fn track(&self, key: &Slug) -> Result<serde_json::Value, CoreError> {
        self.record(RemoteCall::Track {
            key: key.as_str().to_string(),
        });
        Ok(json!({"hits": self.hits.clone()}))
    }
}
