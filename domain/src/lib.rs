//! Domain library for the QR link manager.
//!
//! Holds the action-log types, the ports (storage, remote shortener, clock),
//! the error taxonomy, and the pure projections that derive "current" and
//! "history" views from the append-only log. Keep adapters and IO concerns
//! out of this crate.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::sync::Arc;
use std::time::SystemTime;

/// Longest key accepted by the remote shortener and the log column.
pub const MAX_SLUG_LEN: usize = 100;

/// Page size used when a caller asks for recent actions without a limit.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// A short-URL key, restricted to `[A-Za-z0-9-]+`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slug(String);

impl Slug {
    pub fn new<S: Into<String>>(s: S) -> Result<Self, CoreError> {
        let val = s.into();
        if val.is_empty() {
            return Err(CoreError::Validation("key is empty".into()));
        }
        if val.len() > MAX_SLUG_LEN {
            return Err(CoreError::Validation(format!(
                "key longer than {MAX_SLUG_LEN} characters"
            )));
        }
        if !val.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(CoreError::Validation(
                "key can only contain letters, numbers, and hyphens".into(),
            ));
        }
        Ok(Self(val))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Slug {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The user an action is attributed to. All read views are scoped by owner.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Owner(String);

impl Owner {
    pub fn new<S: Into<String>>(s: S) -> Result<Self, CoreError> {
        let val = s.into();
        let trimmed = val.trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation("owner is empty".into()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionType {
    Create,
    Update,
    Delete,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Create => "create",
            ActionType::Update => "update",
            ActionType::Delete => "delete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "create" => Some(ActionType::Create),
            "update" => Some(ActionType::Update),
            "delete" => Some(ActionType::Delete),
            _ => None,
        }
    }
}

/// Normalized outcome of one remote call, not yet persisted.
///
/// Remote 4xx/5xx answers are carried in `response_status`; they are data,
/// not errors.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionResult {
    pub action_type: ActionType,
    pub url_key: Option<Slug>,
    /// Destination after tracking parameters were applied. `None` for deletes.
    pub long_url: Option<String>,
    pub response_payload: serde_json::Value,
    pub response_status: u16,
}

impl ActionResult {
    pub fn success(&self) -> bool {
        self.response_status == 200
    }

    /// Fold the two legs of an update into the single row that gets logged.
    ///
    /// The status is the larger of the two, so a failed leg is never masked
    /// by a successful one.
    pub fn composite_update(key: Slug, removed: &ActionResult, created: &ActionResult) -> Self {
        Self {
            action_type: ActionType::Update,
            url_key: Some(key),
            long_url: created.long_url.clone(),
            response_payload: serde_json::Value::Array(vec![
                removed.response_payload.clone(),
                created.response_payload.clone(),
            ]),
            response_status: removed.response_status.max(created.response_status),
        }
    }

    /// Required-field check run by every store before it writes anything.
    pub fn check_required(&self) -> Result<&Slug, CoreError> {
        let key = self
            .url_key
            .as_ref()
            .ok_or_else(|| CoreError::Validation("url_key is required".into()))?;
        match (self.action_type, &self.long_url) {
            (ActionType::Create | ActionType::Update, None) => Err(CoreError::Validation(
                format!("long_url is required for {}", self.action_type.as_str()),
            )),
            (ActionType::Create | ActionType::Update, Some(url)) if url.trim().is_empty() => {
                Err(CoreError::Validation(format!(
                    "long_url is required for {}",
                    self.action_type.as_str()
                )))
            }
            (ActionType::Delete, Some(_)) => Err(CoreError::Validation(
                "long_url must be absent for delete".into(),
            )),
            _ => Ok(key),
        }
    }
}

/// One immutable row of the action log.
#[derive(Clone, Debug, PartialEq)]
pub struct Action {
    pub id: i64,
    pub action_type: ActionType,
    pub url_key: Slug,
    pub long_url: Option<String>,
    pub response_payload: serde_json::Value,
    pub response_status: u16,
    pub timestamp: SystemTime,
    pub owner: Owner,
}

impl Action {
    pub fn success(&self) -> bool {
        self.response_status == 200
    }

    /// Sort key for "most recent": timestamp first, id breaks ties.
    pub fn recency(&self) -> (SystemTime, i64) {
        (self.timestamp, self.id)
    }
}

/// Time source abstraction to make code testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

/// Append-only storage port for the action log.
pub trait ActionStore: Send + Sync {
    /// Persist one row. Fails with `Validation` before writing if required
    /// fields are missing. The stored timestamp never goes backwards.
    fn append(
        &self,
        result: ActionResult,
        owner: &Owner,
        at: SystemTime,
    ) -> Result<Action, CoreError>;
    /// Most recent first.
    fn query_recent(&self, owner: &Owner, limit: usize) -> Result<Vec<Action>, CoreError>;
    /// Every action for one key, most recent first; empty when none exist.
    fn query_by_key(&self, owner: &Owner, key: &Slug) -> Result<Vec<Action>, CoreError>;
    /// Every action of the owner, most recent first. Input to the views.
    fn query_all(&self, owner: &Owner) -> Result<Vec<Action>, CoreError>;
}

impl<T: ActionStore + ?Sized> ActionStore for Arc<T> {
    fn append(
        &self,
        result: ActionResult,
        owner: &Owner,
        at: SystemTime,
    ) -> Result<Action, CoreError> {
        (**self).append(result, owner, at)
    }

    fn query_recent(&self, owner: &Owner, limit: usize) -> Result<Vec<Action>, CoreError> {
        (**self).query_recent(owner, limit)
    }

    fn query_by_key(&self, owner: &Owner, key: &Slug) -> Result<Vec<Action>, CoreError> {
        (**self).query_by_key(owner, key)
    }

    fn query_all(&self, owner: &Owner) -> Result<Vec<Action>, CoreError> {
        (**self).query_all(owner)
    }
}

/// Port for the remote key-value shortener.
///
/// Implementations append the tracking parameters in `shorten` (see
/// [`tracking::tag_url`]) and report remote rejections through the status
/// code. Only failures to reach the service are returned as
/// `CoreError::Transport`.
pub trait Shortener: Send + Sync {
    fn shorten(
        &self,
        long_url: &str,
        key: Option<&Slug>,
    ) -> impl Future<Output = Result<ActionResult, CoreError>> + Send;

    fn remove(&self, key: &Slug) -> impl Future<Output = Result<ActionResult, CoreError>> + Send;

    /// Raw decoded tracking response. Callers must check for `hits` themselves.
    fn track(
        &self,
        key: &Slug,
    ) -> impl Future<Output = Result<serde_json::Value, CoreError>> + Send;
}

impl<T: Shortener> Shortener for Arc<T> {
    fn shorten(
        &self,
        long_url: &str,
        key: Option<&Slug>,
    ) -> impl Future<Output = Result<ActionResult, CoreError>> + Send {
        (**self).shorten(long_url, key)
    }

    fn remove(&self, key: &Slug) -> impl Future<Output = Result<ActionResult, CoreError>> + Send {
        (**self).remove(key)
    }

    fn track(
        &self,
        key: &Slug,
    ) -> impl Future<Output = Result<serde_json::Value, CoreError>> + Send {
        (**self).track(key)
    }
}

/// Core domain errors (no external error crates to keep deps minimal).
#[derive(Debug)]
pub enum CoreError {
    /// Malformed key or missing URL; raised before any network call.
    Validation(String),
    /// The remote service could not be reached.
    Transport(String),
    NotFound,
    Repository(String),
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CoreError::Validation(msg) => write!(f, "validation error: {}", msg),
            CoreError::Transport(msg) => write!(f, "transport error: {}", msg),
            CoreError::NotFound => write!(f, "not found"),
            CoreError::Repository(msg) => write!(f, "repository error: {}", msg),
        }
    }
}

impl Error for CoreError {}

pub mod adapters;
pub mod qr;
pub mod service;
pub mod tracking;
pub mod validate;
pub mod views;
