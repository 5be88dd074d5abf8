//! Get-or-create resolution of shared sub-entities against the catalog.
//!
//! Every lookup is memoized for the run, so at most one remote record is
//! created per distinct logical identity. The process is single-writer; a
//! parallel future would need double-checked lookups after create failures.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::common::error::{Result, SyncError};
use crate::domain::{
    property_types, Actor, ActorRole, Concept, ContributorRole, MediaRef, PropertyRecord,
    SourceRef, ToolEntry, VocabularyRef,
};
use crate::extract::{DraftEntry, DraftProperty};
use crate::store::{CatalogStore, ConceptKind, MediaHandle, SourceRecord};
use crate::vocab::KEYWORD_VOCABULARY;

pub struct ReferenceResolver<'a> {
    store: &'a dyn CatalogStore,
    ignore_unmappable_licenses: bool,
    actors: HashMap<String, Actor>,
    keywords: HashMap<String, Concept>,
    /// `None` records an unmappable license already warned about.
    licenses: HashMap<String, Option<Concept>>,
    media: HashMap<String, MediaHandle>,
    source: Option<SourceRecord>,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(store: &'a dyn CatalogStore, ignore_unmappable_licenses: bool) -> Self {
        Self {
            store,
            ignore_unmappable_licenses,
            actors: HashMap::new(),
            keywords: HashMap::new(),
            licenses: HashMap::new(),
            media: HashMap::new(),
            source: None,
        }
    }

    /// Resolve the source catalog once; every entry of the run reuses it.
    pub async fn ensure_source(
        &mut self,
        label: &str,
        url: &str,
        url_template: Option<&str>,
    ) -> Result<SourceRecord> {
        if let Some(source) = &self.source {
            return Ok(source.clone());
        }
        let record = match self.store.find_source_by_url(url).await? {
            Some(existing) => {
                debug!(source = label, id = existing.id, "source already registered");
                existing
            }
            None => {
                let created = self.store.create_source(label, url, url_template).await?;
                info!(source = label, id = created.id, "registered source");
                created
            }
        };
        self.source = Some(record.clone());
        Ok(record)
    }

    /// Get-or-create an actor, deduplicated by exact name match.
    pub async fn resolve_actor(&mut self, draft: &Actor) -> Result<Actor> {
        if let Some(cached) = self.actors.get(&draft.name) {
            return Ok(cached.clone());
        }
        let hits = self.store.search_actors(&draft.name).await?;
        let resolved = match hits.into_iter().find(|a| a.name == draft.name) {
            Some(existing) => existing,
            None => {
                let created = self.store.create_actor(draft).await?;
                info!(actor = draft.name.as_str(), "created actor");
                created
            }
        };
        self.actors.insert(draft.name.clone(), resolved.clone());
        Ok(resolved)
    }

    /// Get-or-create a keyword concept by code.
    pub async fn resolve_keyword(&mut self, code: &str, label: &str) -> Result<Concept> {
        if let Some(cached) = self.keywords.get(code) {
            return Ok(cached.clone());
        }
        let hits = self.store.search_concepts(code, ConceptKind::Keyword).await?;
        let resolved = match hits.into_iter().find(|c| c.code == code) {
            Some(existing) => existing,
            None => {
                let draft = Concept {
                    code: code.to_string(),
                    label: Some(label.to_string()),
                    vocabulary: Some(VocabularyRef {
                        code: KEYWORD_VOCABULARY.to_string(),
                    }),
                    uri: None,
                };
                let created = self.store.create_keyword_concept(&draft).await?;
                info!(keyword = code, "minted keyword concept");
                created
            }
        };
        self.keywords.insert(code.to_string(), resolved.clone());
        Ok(resolved)
    }

    /// Lookup-only license resolution. An unknown license is a hard error
    /// unless the ignore-unmappable mode was requested, in which case the
    /// property is dropped and the entity continues.
    pub async fn resolve_license(&mut self, uri: &str) -> Result<Option<Concept>> {
        if let Some(cached) = self.licenses.get(uri) {
            return Ok(cached.clone());
        }
        let hits = self.store.search_concepts(uri, ConceptKind::License).await?;
        let found = hits.into_iter().find(|c| c.uri.as_deref() == Some(uri));
        let resolved = match found {
            Some(concept) => Some(concept),
            None if self.ignore_unmappable_licenses => {
                warn!(license = uri, "license not in vocabulary, property dropped");
                None
            }
            None => return Err(SyncError::UnmappableLicense(uri.to_string())),
        };
        self.licenses.insert(uri.to_string(), resolved.clone());
        Ok(resolved)
    }

    /// Register a thumbnail once per distinct URL.
    pub async fn resolve_thumbnail(&mut self, url: &str) -> Result<MediaHandle> {
        if let Some(cached) = self.media.get(url) {
            return Ok(cached.clone());
        }
        let handle = self.store.import_thumbnail(url).await?;
        self.media.insert(url.to_string(), handle.clone());
        Ok(handle)
    }

    /// Fill every remote-backed reference of a draft, producing an entry
    /// ready for reconciliation.
    pub async fn resolve_entry(&mut self, draft: DraftEntry) -> Result<ToolEntry> {
        let source = self
            .source
            .clone()
            .ok_or_else(|| SyncError::Config("source must be resolved before entries".into()))?;

        let mut contributors = Vec::with_capacity(draft.contributors.len());
        for contributor in &draft.contributors {
            let actor = self.resolve_actor(&contributor.actor).await?;
            contributors.push(ContributorRole {
                actor,
                role: ActorRole::new(contributor.role, contributor.ord),
            });
        }

        let mut properties = Vec::with_capacity(draft.properties.len());
        for property in draft.properties {
            match property {
                DraftProperty::Ready(record) => properties.push(record),
                DraftProperty::License { uri } => {
                    if let Some(concept) = self.resolve_license(&uri).await? {
                        properties.push(PropertyRecord::with_concept(
                            property_types::LICENSE,
                            concept,
                        ));
                    }
                }
                DraftProperty::Keyword { code, label } => {
                    let concept = self.resolve_keyword(&code, &label).await?;
                    properties
                        .push(PropertyRecord::with_concept(property_types::KEYWORD, concept));
                }
            }
        }

        let thumbnail = match &draft.thumbnail_url {
            Some(url) => {
                let handle = self.resolve_thumbnail(url).await?;
                Some(MediaRef::new(handle.media_id))
            }
            None => None,
        };

        Ok(ToolEntry {
            label: draft.label,
            description: draft.description,
            external_ids: draft.external_ids,
            accessible_at: draft.accessible_at,
            source: Some(SourceRef { id: source.id }),
            source_item_id: draft.source_item_id,
            thumbnail,
            contributors,
            properties,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::in_memory::InMemoryCatalog;
    use crate::store::ItemSummary;
    use async_trait::async_trait;

    /// Wraps the in-memory catalog with a media endpoint that always fails.
    struct BrokenMediaCatalog {
        inner: InMemoryCatalog,
    }

    #[async_trait]
    impl CatalogStore for BrokenMediaCatalog {
        async fn find_source_by_url(&self, url: &str) -> Result<Option<SourceRecord>> {
            self.inner.find_source_by_url(url).await
        }

        async fn create_source(
            &self,
            label: &str,
            url: &str,
            url_template: Option<&str>,
        ) -> Result<SourceRecord> {
            self.inner.create_source(label, url, url_template).await
        }

        async fn search_actors(&self, name: &str) -> Result<Vec<Actor>> {
            self.inner.search_actors(name).await
        }

        async fn create_actor(&self, actor: &Actor) -> Result<Actor> {
            self.inner.create_actor(actor).await
        }

        async fn search_concepts(&self, query: &str, kind: ConceptKind) -> Result<Vec<Concept>> {
            self.inner.search_concepts(query, kind).await
        }

        async fn create_keyword_concept(&self, concept: &Concept) -> Result<Concept> {
            self.inner.create_keyword_concept(concept).await
        }

        async fn import_thumbnail(&self, _source_url: &str) -> Result<MediaHandle> {
            Err(SyncError::Api {
                status: 500,
                message: "media import failed".to_string(),
                payload: None,
            })
        }

        async fn search_items(&self, label: &str, source_label: &str) -> Result<Vec<ItemSummary>> {
            self.inner.search_items(label, source_label).await
        }

        async fn create_tool(&self, entry: &ToolEntry) -> Result<ItemSummary> {
            self.inner.create_tool(entry).await
        }

        async fn update_tool(&self, id: i64, entry: &ToolEntry) -> Result<ItemSummary> {
            self.inner.update_tool(id, entry).await
        }
    }

    #[tokio::test]
    async fn test_actor_resolved_once_per_name() {
        let store = InMemoryCatalog::new();
        let mut resolver = ReferenceResolver::new(&store, false);

        let draft = Actor::named("Maarten van Gompel");
        let first = resolver.resolve_actor(&draft).await.unwrap();
        let second = resolver.resolve_actor(&draft).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.counters().actor_creates, 1);
    }

    #[tokio::test]
    async fn test_keyword_minted_then_reused() {
        let store = InMemoryCatalog::new();
        let mut resolver = ReferenceResolver::new(&store, false);

        let first = resolver.resolve_keyword("nlp", "NLP").await.unwrap();
        let second = resolver.resolve_keyword("nlp", "NLP").await.unwrap();

        assert_eq!(first.code, "nlp");
        assert_eq!(first, second);
        assert_eq!(store.counters().keyword_creates, 1);
    }

    #[tokio::test]
    async fn test_unknown_license_is_hard_error_unless_ignored() {
        let store = InMemoryCatalog::new();
        let mut resolver = ReferenceResolver::new(&store, false);
        let uri = "https://spdx.org/licenses/GPL-3.0-only";
        assert!(matches!(
            resolver.resolve_license(uri).await,
            Err(SyncError::UnmappableLicense(_))
        ));

        let mut ignoring = ReferenceResolver::new(&store, true);
        assert_eq!(ignoring.resolve_license(uri).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_known_license_resolves_by_uri() {
        let store = InMemoryCatalog::new();
        store.seed_license(Concept {
            code: "GPL-3.0-only".to_string(),
            label: Some("GNU General Public License v3.0 only".to_string()),
            vocabulary: Some(VocabularyRef {
                code: "software-license".to_string(),
            }),
            uri: Some("https://spdx.org/licenses/GPL-3.0-only".to_string()),
        });
        let mut resolver = ReferenceResolver::new(&store, false);
        let concept = resolver
            .resolve_license("https://spdx.org/licenses/GPL-3.0-only")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(concept.code, "GPL-3.0-only");
    }

    #[tokio::test]
    async fn test_thumbnail_import_failure_aborts_entry() {
        let store = BrokenMediaCatalog {
            inner: InMemoryCatalog::new(),
        };
        let mut resolver = ReferenceResolver::new(&store, false);
        resolver
            .ensure_source("Test Source", "https://tools.example.org", None)
            .await
            .unwrap();

        let draft = DraftEntry {
            resource: "https://tools.example.org/frog".to_string(),
            label: "Frog".to_string(),
            description: "An NLP suite".to_string(),
            external_ids: Vec::new(),
            accessible_at: Vec::new(),
            thumbnail_url: Some("https://tools.example.org/frog.png".to_string()),
            contributors: Vec::new(),
            properties: Vec::new(),
            source_item_id: None,
            last_modified: None,
        };
        assert!(matches!(
            resolver.resolve_entry(draft).await,
            Err(SyncError::Api { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_source_created_once() {
        let store = InMemoryCatalog::new();
        let mut resolver = ReferenceResolver::new(&store, false);
        let first = resolver
            .ensure_source("CLARIAH Tools", "https://tools.clariah.nl", None)
            .await
            .unwrap();
        let second = resolver
            .ensure_source("CLARIAH Tools", "https://tools.clariah.nl", None)
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.counters().source_creates, 1);
    }
}
