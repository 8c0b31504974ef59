//! Navigation tab model and the stored-order resolution rules.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single selectable item in a tab bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavTab {
    /// Stable identifier, unique within a page's tab set
    pub id: String,
    /// Display label (already localized by the host)
    pub label: String,
    /// Badge value supplied by the host page
    pub count: u32,
}

impl NavTab {
    pub fn new(id: impl Into<String>, label: impl Into<String>, count: u32) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            count,
        }
    }
}

/// Key of a stored tab-order preference: `(user, page)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TabOrderKey {
    pub user_id: String,
    pub page: String,
}

impl TabOrderKey {
    pub fn new(user_id: impl Into<String>, page: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            page: page.into(),
        }
    }
}

impl fmt::Display for TabOrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user_id, self.page)
    }
}

/// Persisted tab order as exchanged with the preference service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabOrderDocument {
    pub user_id: String,
    pub page: String,
    pub order: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of a replace-order request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceOrderRequest {
    pub order: Vec<String>,
}

/// Ids of `tabs` in their current order.
pub fn tab_ids(tabs: &[NavTab]) -> Vec<String> {
    tabs.iter().map(|t| t.id.clone()).collect()
}

/// Sort `tabs` by the position of their id in `stored`.
///
/// Stored ids with no matching tab are ignored. Tabs whose id is not in
/// `stored` keep their relative order and go after every stored tab.
pub fn apply_order(tabs: &[NavTab], stored: &[String]) -> Vec<NavTab> {
    // first occurrence ranks a repeated id
    let mut rank: HashMap<&str, usize> = HashMap::with_capacity(stored.len());
    for (idx, id) in stored.iter().enumerate() {
        rank.entry(id.as_str()).or_insert(idx);
    }

    let mut ordered = tabs.to_vec();
    // sort_by_key is stable, so unseen tabs keep their default order
    ordered.sort_by_key(|tab| rank.get(tab.id.as_str()).copied().unwrap_or(usize::MAX));
    ordered
}
