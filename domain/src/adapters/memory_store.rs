use std::sync::Mutex;
use std::time::SystemTime;

use crate::views::latest_first;
use crate::{Action, ActionResult, ActionStore, CoreError, Owner, Slug};

/// In-memory action log for tests and the server's `memory` storage mode.
/// Rows are lost when the process exits.
pub struct InMemoryActionStore {
    rows: Mutex<Vec<Action>>,
}

impl InMemoryActionStore {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
        }
    }

    /// Number of rows written so far, across all owners.
    pub fn len(&self) -> usize {
        self.rows.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn owned_by(&self, owner: &Owner) -> Result<Vec<Action>, CoreError> {
        let rows = self
            .rows
            .lock()
            .map_err(|_| CoreError::Repository("mutex poisoned".into()))?;
        let mut out: Vec<Action> = rows.iter().filter(|a| &a.owner == owner).cloned().collect();
        out.sort_by(latest_first);
        Ok(out)
    }
}

impl Default for InMemoryActionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionStore for InMemoryActionStore {
    fn append(
        &self,
        result: ActionResult,
        owner: &Owner,
        at: SystemTime,
    ) -> Result<Action, CoreError> {
        let key = result.check_required()?.clone();
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| CoreError::Repository("mutex poisoned".into()))?;
        let timestamp = match rows.last() {
            Some(prev) if prev.timestamp > at => prev.timestamp,
            _ => at,
        };
        let action = Action {
            id: rows.len() as i64 + 1,
            action_type: result.action_type,
            url_key: key,
            long_url: result.long_url,
            response_payload: result.response_payload,
            response_status: result.response_status,
            timestamp,
            owner: owner.clone(),
        };
        rows.push(action.clone());
        Ok(action)
    }

    fn query_recent(&self, owner: &Owner, limit: usize) -> Result<Vec<Action>, CoreError> {
        let mut all = self.owned_by(owner)?;
        all.truncate(limit);
        Ok(all)
    }

    fn query_by_key(&self, owner: &Owner, key: &Slug) -> Result<Vec<Action>, CoreError> {
        Ok(self
            .owned_by(owner)?
            .into_iter()
            .filter(|a| &a.url_key == key)
            .collect())
    }

    fn query_all(&self, owner: &Owner) -> Result<Vec<Action>, CoreError> {
        self.owned_by(owner)
    }
}
