//! In-memory backend for the catalog port. Behaves like the remote store as
//! far as the resolver and decider can observe, and counts write calls so
//! tests can assert idempotence and deduplication. Also backs `--dry-run`.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{CatalogStore, ConceptKind, ItemSummary, MediaHandle, SourceRecord};
use crate::common::error::Result;
use crate::domain::{Actor, Concept, ToolEntry, VocabularyRef};
use crate::vocab::{KEYWORD_VOCABULARY, NS_SPDX};

#[derive(Debug, Default, Clone)]
pub struct CallCounters {
    pub source_creates: usize,
    pub actor_creates: usize,
    pub keyword_creates: usize,
    pub thumbnail_imports: usize,
    pub tool_creates: usize,
    pub tool_updates: usize,
}

#[derive(Debug, Clone)]
struct StoredItem {
    summary: ItemSummary,
    source_label: String,
    #[allow(dead_code)]
    entry: ToolEntry,
}

#[derive(Default)]
struct State {
    next_id: i64,
    sources: Vec<SourceRecord>,
    actors: Vec<Actor>,
    keywords: Vec<Concept>,
    licenses: Vec<Concept>,
    items: Vec<StoredItem>,
    counters: CallCounters,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

pub struct InMemoryCatalog {
    state: Mutex<State>,
    /// When set, license lookups that miss synthesize a concept instead of
    /// returning empty. Dry runs use this so an offline pass never trips the
    /// lookup-only license contract.
    permissive_licenses: bool,
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            permissive_licenses: false,
        }
    }

    pub fn permissive() -> Self {
        Self {
            state: Mutex::new(State::default()),
            permissive_licenses: true,
        }
    }

    /// Licenses are lookup-only; tests seed the vocabulary up front.
    pub fn seed_license(&self, concept: Concept) {
        self.state.lock().unwrap().licenses.push(concept);
    }

    /// Seed an existing tool entry, e.g. to simulate a previous run.
    pub fn seed_item(&self, label: &str, source_label: &str, last_info_update: Option<&str>) {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.items.push(StoredItem {
            summary: ItemSummary {
                id,
                persistent_id: Some(format!("seeded-{id}")),
                label: label.to_string(),
                last_info_update: last_info_update.map(str::to_string),
            },
            source_label: source_label.to_string(),
            entry: ToolEntry::default(),
        });
    }

    pub fn counters(&self) -> CallCounters {
        self.state.lock().unwrap().counters.clone()
    }

    pub fn item_count(&self) -> usize {
        self.state.lock().unwrap().items.len()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn find_source_by_url(&self, url: &str) -> Result<Option<SourceRecord>> {
        let state = self.state.lock().unwrap();
        Ok(state.sources.iter().find(|s| s.url == url).cloned())
    }

    async fn create_source(
        &self,
        label: &str,
        url: &str,
        url_template: Option<&str>,
    ) -> Result<SourceRecord> {
        let mut state = self.state.lock().unwrap();
        let record = SourceRecord {
            id: state.next_id(),
            label: label.to_string(),
            url: url.to_string(),
            url_template: url_template.map(str::to_string),
        };
        state.sources.push(record.clone());
        state.counters.source_creates += 1;
        Ok(record)
    }

    async fn search_actors(&self, name: &str) -> Result<Vec<Actor>> {
        let state = self.state.lock().unwrap();
        let needle = name.to_lowercase();
        Ok(state
            .actors
            .iter()
            .filter(|a| a.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn create_actor(&self, actor: &Actor) -> Result<Actor> {
        let mut state = self.state.lock().unwrap();
        let mut created = actor.clone();
        created.id = Some(state.next_id());
        state.actors.push(created.clone());
        state.counters.actor_creates += 1;
        Ok(created)
    }

    async fn search_concepts(&self, query: &str, kind: ConceptKind) -> Result<Vec<Concept>> {
        let mut state = self.state.lock().unwrap();
        let pool = match kind {
            ConceptKind::Keyword => &state.keywords,
            ConceptKind::License => &state.licenses,
        };
        let needle = query.to_lowercase();
        let hits: Vec<Concept> = pool
            .iter()
            .filter(|c| {
                c.code.to_lowercase().contains(&needle)
                    || c.uri
                        .as_deref()
                        .is_some_and(|u| u.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();

        if hits.is_empty() && kind == ConceptKind::License && self.permissive_licenses {
            let code = query.rsplit('/').next().unwrap_or(query).to_string();
            let synthesized = Concept {
                code: code.clone(),
                label: Some(code.clone()),
                vocabulary: Some(VocabularyRef {
                    code: "software-license".to_string(),
                }),
                uri: Some(format!("{NS_SPDX}{code}")),
            };
            state.licenses.push(synthesized.clone());
            return Ok(vec![synthesized]);
        }
        Ok(hits)
    }

    async fn create_keyword_concept(&self, concept: &Concept) -> Result<Concept> {
        let mut state = self.state.lock().unwrap();
        let mut created = concept.clone();
        if created.vocabulary.is_none() {
            created.vocabulary = Some(VocabularyRef {
                code: KEYWORD_VOCABULARY.to_string(),
            });
        }
        if created.uri.is_none() {
            created.uri = Some(format!(
                "https://vocabs.sshopencloud.eu/vocabularies/{KEYWORD_VOCABULARY}/{}",
                created.code
            ));
        }
        state.keywords.push(created.clone());
        state.counters.keyword_creates += 1;
        Ok(created)
    }

    async fn import_thumbnail(&self, _source_url: &str) -> Result<MediaHandle> {
        let mut state = self.state.lock().unwrap();
        state.counters.thumbnail_imports += 1;
        Ok(MediaHandle {
            media_id: Uuid::new_v4(),
        })
    }

    async fn search_items(&self, label: &str, source_label: &str) -> Result<Vec<ItemSummary>> {
        let state = self.state.lock().unwrap();
        let needle = label.to_lowercase();
        Ok(state
            .items
            .iter()
            .filter(|item| {
                item.source_label == source_label
                    && item.summary.label.to_lowercase().contains(&needle)
            })
            .map(|item| item.summary.clone())
            .collect())
    }

    async fn create_tool(&self, entry: &ToolEntry) -> Result<ItemSummary> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let summary = ItemSummary {
            id,
            persistent_id: Some(format!("item-{id}")),
            label: entry.label.clone(),
            last_info_update: Some(Utc::now().to_rfc3339()),
        };
        // scope by the label of the source the entry points at, if any
        let source_label = state
            .sources
            .iter()
            .find(|s| Some(s.id) == entry.source.map(|r| r.id))
            .map(|s| s.label.clone())
            .unwrap_or_default();
        state.items.push(StoredItem {
            summary: summary.clone(),
            source_label,
            entry: entry.clone(),
        });
        state.counters.tool_creates += 1;
        Ok(summary)
    }

    async fn update_tool(&self, id: i64, entry: &ToolEntry) -> Result<ItemSummary> {
        let mut state = self.state.lock().unwrap();
        state.counters.tool_updates += 1;
        for item in &mut state.items {
            if item.summary.id == id {
                item.summary.label = entry.label.clone();
                item.summary.last_info_update = Some(Utc::now().to_rfc3339());
                item.entry = entry.clone();
                return Ok(item.summary.clone());
            }
        }
        Err(crate::common::error::SyncError::Api {
            status: 404,
            message: format!("no tool entry with id {id}"),
            payload: None,
        })
    }
}
