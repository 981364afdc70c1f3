//! Organization metadata collaborator: shared suggestion lists for node fields.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::trace;

use crate::{Result, graph::ListField};

#[async_trait]
pub trait OrganizationMetadata: Send + Sync {
    /// Suggestion list of one field for an organization.
    async fn suggestions(
        &self,
        organization_id: &str,
        field: ListField,
    ) -> Result<Vec<String>>;

    /// Adds `value` to the shared list. Returns whether it was new.
    async fn promote(
        &self,
        organization_id: &str,
        field: ListField,
        value: &str,
    ) -> Result<bool>;
}

/// A request to share a new list entry with the organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    pub organization_id: String,
    pub field: ListField,
    pub value: String,
}

#[derive(Debug, Default)]
pub struct MemMetadata {
    lists: RwLock<HashMap<(String, ListField), Vec<String>>>,
}

impl MemMetadata {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrganizationMetadata for MemMetadata {
    async fn suggestions(
        &self,
        organization_id: &str,
        field: ListField,
    ) -> Result<Vec<String>> {
        let lists = self.lists.read().await;
        Ok(lists.get(&(organization_id.to_string(), field)).cloned().unwrap_or_default())
    }

    async fn promote(
        &self,
        organization_id: &str,
        field: ListField,
        value: &str,
    ) -> Result<bool> {
        trace!("metadata::promote({}, {}, {})", organization_id, field.as_ref(), value);
        let value = value.trim();
        if value.is_empty() {
            return Ok(false);
        }
        let mut lists = self.lists.write().await;
        let list = lists.entry((organization_id.to_string(), field)).or_default();
        if list.iter().any(|v| v.eq_ignore_ascii_case(value)) {
            return Ok(false);
        }
        list.push(value.to_string());
        Ok(true)
    }
}

/// Auto-complete over a suggestion list: case-insensitive prefix matches first,
/// then other substring matches, each group in list order.
pub fn suggest(
    prefix: &str,
    list: &[String],
) -> Vec<String> {
    let needle = prefix.trim().to_lowercase();
    if needle.is_empty() {
        return list.to_vec();
    }
    let (mut head, mut tail) = (Vec::new(), Vec::new());
    for value in list {
        let folded = value.to_lowercase();
        if folded.starts_with(&needle) {
            head.push(value.clone());
        } else if folded.contains(&needle) {
            tail.push(value.clone());
        }
    }
    head.extend(tail);
    head
}
