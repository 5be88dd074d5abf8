//! The catalog port: read/write access to the remote store, one operation
//! per resource kind, with an HTTP backend for production and an in-memory
//! backend for tests and dry runs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::error::Result;
use crate::domain::{Actor, Concept, ToolEntry};

pub mod http;
pub mod in_memory;

/// A source catalog record as known to the remote store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRecord {
    pub id: i64,
    pub label: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_template: Option<String>,
}

/// Handle returned by the media import endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaHandle {
    pub media_id: Uuid,
}

/// A catalog item as returned by item-search.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    pub id: i64,
    #[serde(default)]
    pub persistent_id: Option<String>,
    pub label: String,
    #[serde(default)]
    pub last_info_update: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConceptKind {
    Keyword,
    License,
}

impl ConceptKind {
    pub fn as_query(&self) -> &'static str {
        match self {
            ConceptKind::Keyword => "keyword",
            ConceptKind::License => "license",
        }
    }
}

/// Read/write endpoints of the catalog, as used by the resolver and the
/// decider. Lookup misses are `Ok(None)` / empty vectors; anything else that
/// goes wrong is an error, never silently "not found".
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_source_by_url(&self, url: &str) -> Result<Option<SourceRecord>>;
    async fn create_source(
        &self,
        label: &str,
        url: &str,
        url_template: Option<&str>,
    ) -> Result<SourceRecord>;

    async fn search_actors(&self, name: &str) -> Result<Vec<Actor>>;
    async fn create_actor(&self, actor: &Actor) -> Result<Actor>;

    async fn search_concepts(&self, query: &str, kind: ConceptKind) -> Result<Vec<Concept>>;
    /// Mint a new keyword concept. Licenses are never minted.
    async fn create_keyword_concept(&self, concept: &Concept) -> Result<Concept>;

    async fn import_thumbnail(&self, source_url: &str) -> Result<MediaHandle>;

    /// Find candidate tool entries by label within a source. Exact-match
    /// disambiguation is the decider's job.
    async fn search_items(&self, label: &str, source_label: &str) -> Result<Vec<ItemSummary>>;
    async fn create_tool(&self, entry: &ToolEntry) -> Result<ItemSummary>;
    async fn update_tool(&self, id: i64, entry: &ToolEntry) -> Result<ItemSummary>;
}
