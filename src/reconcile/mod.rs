//! Per-entry reconciliation decision: validate, look up the remote record,
//! then create, update, or skip. Deterministic and idempotent — re-running
//! with unchanged upstream data and no force flag always yields a skip.

use tracing::{debug, info};

use crate::common::error::Result;
use crate::domain::ToolEntry;
use crate::store::{CatalogStore, ItemSummary};

/// Terminal state of one entry's reconciliation pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Created { id: i64, label: String },
    Updated { id: i64, label: String },
    Skipped { label: String, reason: String },
    Rejected { label: String, reason: String },
}

pub struct ReconcileDecider<'a> {
    store: &'a dyn CatalogStore,
    source_label: &'a str,
    force: bool,
}

impl<'a> ReconcileDecider<'a> {
    pub fn new(store: &'a dyn CatalogStore, source_label: &'a str, force: bool) -> Self {
        Self {
            store,
            source_label,
            force,
        }
    }

    pub async fn reconcile(
        &self,
        mut entry: ToolEntry,
        last_modified: Option<&str>,
    ) -> Result<Outcome> {
        if !entry.is_valid() {
            return Ok(Outcome::Rejected {
                label: entry.label.clone(),
                reason: "label and description must both be non-empty".to_string(),
            });
        }

        match self.find_existing(&entry.label).await? {
            None => {
                let created = self.store.create_tool(&entry).await?;
                info!(
                    label = entry.label.as_str(),
                    id = created.id,
                    persistent_id = created.persistent_id.as_deref().unwrap_or(""),
                    "created catalog entry"
                );
                Ok(Outcome::Created {
                    id: created.id,
                    label: entry.label,
                })
            }
            Some(existing) => {
                if self.force || is_strictly_newer(last_modified, existing.last_info_update.as_deref())
                {
                    entry.strip_placeholders();
                    let updated = self.store.update_tool(existing.id, &entry).await?;
                    info!(
                        label = entry.label.as_str(),
                        id = updated.id,
                        persistent_id = updated.persistent_id.as_deref().unwrap_or(""),
                        "updated catalog entry"
                    );
                    Ok(Outcome::Updated {
                        id: updated.id,
                        label: entry.label,
                    })
                } else {
                    debug!(label = entry.label.as_str(), "remote record is up to date");
                    Ok(Outcome::Skipped {
                        label: entry.label,
                        reason: "remote record is up to date".to_string(),
                    })
                }
            }
        }
    }

    /// Exact case-insensitive label match within the configured source;
    /// among multiple hits the first exact match wins.
    async fn find_existing(&self, label: &str) -> Result<Option<ItemSummary>> {
        let hits = self.store.search_items(label, self.source_label).await?;
        let needle = label.to_lowercase();
        Ok(hits
            .into_iter()
            .find(|item| item.label.to_lowercase() == needle))
    }
}

/// Lexicographic ISO-8601 comparison. A missing upstream timestamp is never
/// "newer"; a remote record without one always accepts the update.
fn is_strictly_newer(upstream: Option<&str>, remote: Option<&str>) -> bool {
    match (upstream, remote) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(u), Some(r)) => u > r,
    }
}
