//! Read-side projections over the action log.
//!
//! Both views are pure functions of the rows they are handed; callers scope
//! the rows to one owner before projecting.

use std::cmp::Ordering;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

use crate::{Action, ActionType};

/// Ordering that puts the most recent action first.
pub fn latest_first(a: &Action, b: &Action) -> Ordering {
    b.recency().cmp(&a.recency())
}

/// The latest action per key, leaving out keys whose latest action is a
/// delete. Sorted by key.
pub fn current_keys(actions: &[Action]) -> Vec<Action> {
    let mut latest: BTreeMap<&str, &Action> = BTreeMap::new();
    for action in actions {
        match latest.entry(action.url_key.as_str()) {
            Entry::Vacant(e) => {
                e.insert(action);
            }
            Entry::Occupied(mut e) => {
                if action.recency() > e.get().recency() {
                    e.insert(action);
                }
            }
        }
    }
    latest
        .into_values()
        .filter(|a| a.action_type != ActionType::Delete)
        .cloned()
        .collect()
}

/// The latest action per `(key, long_url)` pair, most recent first.
///
/// Deletes carry no URL and collapse into their key's `None` bucket.
pub fn history(actions: &[Action]) -> Vec<Action> {
    let mut latest: HashMap<(&str, Option<&str>), &Action> = HashMap::new();
    for action in actions {
        let group = (action.url_key.as_str(), action.long_url.as_deref());
        let keep = latest
            .get(&group)
            .map_or(true, |seen| action.recency() > seen.recency());
        if keep {
            latest.insert(group, action);
        }
    }
    let mut out: Vec<Action> = latest.into_values().cloned().collect();
    out.sort_by(latest_first);
    out
}
