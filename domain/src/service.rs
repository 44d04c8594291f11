use crate::qr::{LinkSettings, QrLink};
use crate::validate::{validate_custom_slug, validate_original_url};
use crate::views;
use crate::{
    Action, ActionResult, ActionStore, Clock, CoreError, Owner, Shortener, DEFAULT_PAGE_SIZE,
};

/// Everything an update produced: the logged composite row plus both legs.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateOutcome {
    /// The single `update` row written to the log.
    pub action: Action,
    pub delete_step: ActionResult,
    pub create_step: ActionResult,
}

impl UpdateOutcome {
    pub fn success(&self) -> bool {
        self.action.success()
    }

    /// Exactly one of the two legs was accepted by the remote.
    pub fn is_partial(&self) -> bool {
        self.delete_step.success() != self.create_step.success()
    }
}

/// Application service orchestrating remote actions and the action log.
///
/// It remains generic over storage, remote client, and clock so each can be
/// substituted in tests. Every write goes through the store only after the
/// remote call has returned; a transport failure leaves the log untouched.
pub struct ActionService<S: ActionStore, C: Shortener, K: Clock> {
    store: S,
    client: C,
    clock: K,
    links: LinkSettings,
}

impl<S: ActionStore, C: Shortener, K: Clock> ActionService<S, C, K> {
    pub fn new(store: S, client: C, clock: K) -> Self {
        Self::with_links(store, client, clock, LinkSettings::default())
    }

    pub fn with_links(store: S, client: C, clock: K, links: LinkSettings) -> Self {
        Self {
            store,
            client,
            clock,
            links,
        }
    }

    pub fn links(&self) -> &LinkSettings {
        &self.links
    }

    /// Shorten `long_url` under `key` and log the outcome.
    pub async fn create_action(
        &self,
        owner: &Owner,
        long_url: &str,
        key: &str,
    ) -> Result<Action, CoreError> {
        let slug = validate_custom_slug(key)?;
        let long_url = validate_original_url(long_url)?;

        let result = self.client.shorten(long_url, Some(&slug)).await?;
        self.store.append(result, owner, self.clock.now())
    }

    /// Point `key` at `new_long_url`.
    ///
    /// The remote has no update verb, so this removes the key and then
    /// shortens again under the same key. The create leg runs whatever the
    /// delete leg answered. One composite `update` row is logged.
    ///
    /// If the delete leg cannot reach the remote nothing is logged. If the
    /// create leg cannot, the completed delete leg is logged on its own
    /// before the transport error is returned.
    pub async fn update_action(
        &self,
        owner: &Owner,
        key: &str,
        new_long_url: &str,
    ) -> Result<UpdateOutcome, CoreError> {
        let slug = validate_custom_slug(key)?;
        let long_url = validate_original_url(new_long_url)?;

        let removed = self.client.remove(&slug).await?;
        let created = match self.client.shorten(long_url, Some(&slug)).await {
            Ok(r) => r,
            Err(e) => {
                self.store.append(removed, owner, self.clock.now())?;
                return Err(e);
            }
        };

        let composite = ActionResult::composite_update(slug, &removed, &created);
        let action = self.store.append(composite, owner, self.clock.now())?;
        Ok(UpdateOutcome {
            action,
            delete_step: removed,
            create_step: created,
        })
    }

    /// Remove `key` remotely and log the outcome.
    pub async fn delete_action(&self, owner: &Owner, key: &str) -> Result<Action, CoreError> {
        let slug = validate_custom_slug(key)?;
        let result = self.client.remove(&slug).await?;
        self.store.append(result, owner, self.clock.now())
    }

    /// Raw hit data for `key`. Nothing is logged.
    pub async fn track_action(&self, key: &str) -> Result<serde_json::Value, CoreError> {
        let slug = validate_custom_slug(key)?;
        self.client.track(&slug).await
    }

    /// Short URL and QR request URL for `key`. Nothing is logged.
    pub fn qr_url(&self, key: &str) -> Result<QrLink, CoreError> {
        let slug = validate_custom_slug(key)?;
        let short_url = self.links.short_url(&slug);
        let qr_url = self.links.qr_url(&short_url);
        Ok(QrLink {
            url_key: slug,
            short_url,
            qr_url,
        })
    }

    /// Latest action per key that has not since been deleted, sorted by key.
    pub fn list_current(&self, owner: &Owner) -> Result<Vec<Action>, CoreError> {
        let all = self.store.query_all(owner)?;
        Ok(views::current_keys(&all))
    }

    /// Latest action per distinct `(key, long_url)`, most recent first.
    pub fn list_history(&self, owner: &Owner) -> Result<Vec<Action>, CoreError> {
        let all = self.store.query_all(owner)?;
        Ok(views::history(&all))
    }

    /// Every action for `key`, most recent first. `NotFound` if there are none.
    pub fn get_key_history(&self, owner: &Owner, key: &str) -> Result<Vec<Action>, CoreError> {
        let slug = validate_custom_slug(key)?;
        let rows = self.store.query_by_key(owner, &slug)?;
        if rows.is_empty() {
            return Err(CoreError::NotFound);
        }
        Ok(rows)
    }

    /// Most recent actions, `DEFAULT_PAGE_SIZE` when no limit is given.
    pub fn list_recent(&self, owner: &Owner, limit: Option<usize>) -> Result<Vec<Action>, CoreError> {
        self.store
            .query_recent(owner, limit.unwrap_or(DEFAULT_PAGE_SIZE))
    }
}
