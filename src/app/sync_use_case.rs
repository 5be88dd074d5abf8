//! Orchestrates one reconciliation run: load each input document, then for
//! each software entity extract, resolve, and decide — strictly one entity
//! at a time.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::common::error::Result;
use crate::config::Config;
use crate::extract::{EntityExtractor, Extraction};
use crate::graph::jsonld;
use crate::graph::Term;
use crate::reconcile::{Outcome, ReconcileDecider};
use crate::resolve::ReferenceResolver;
use crate::store::CatalogStore;

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub rejected: usize,
    pub errors: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    fn start() -> Self {
        let now = Utc::now();
        Self {
            total: 0,
            created: 0,
            updated: 0,
            skipped: 0,
            rejected: 0,
            errors: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Created { label, id } => {
                info!(label = label.as_str(), id, "entry created");
                self.created += 1;
            }
            Outcome::Updated { label, id } => {
                info!(label = label.as_str(), id, "entry updated");
                self.updated += 1;
            }
            Outcome::Skipped { label, reason } => {
                info!(label = label.as_str(), reason = reason.as_str(), "entry skipped");
                self.skipped += 1;
            }
            Outcome::Rejected { label, reason } => {
                info!(label = label.as_str(), reason = reason.as_str(), "entry rejected");
                self.rejected += 1;
            }
        }
    }
}

pub struct SyncUseCase<'a> {
    store: &'a dyn CatalogStore,
    config: &'a Config,
}

impl<'a> SyncUseCase<'a> {
    pub fn new(store: &'a dyn CatalogStore, config: &'a Config) -> Self {
        Self { store, config }
    }

    /// Process every software entity of every input file, sequentially.
    /// Per-entity failures are reported and contained; fatal errors
    /// (transport, auth, broken license vocabulary) abort the run.
    pub async fn run(&self, files: &[PathBuf]) -> Result<RunSummary> {
        let mut summary = RunSummary::start();

        let mut resolver =
            ReferenceResolver::new(self.store, self.config.ignore_unmappable_licenses);
        resolver
            .ensure_source(
                &self.config.source.label,
                &self.config.source.url,
                self.config.source.url_template.as_deref(),
            )
            .await?;
        let decider = ReconcileDecider::new(
            self.store,
            &self.config.source.label,
            self.config.force_update,
        );

        for file in files {
            info!(file = %file.display(), "processing input document");
            let graph = self.load_graph(file)?;
            let extractor = EntityExtractor::new(&graph, self.config);

            for resource in extractor.software_entities() {
                summary.total += 1;
                match self
                    .process_entity(&extractor, &mut resolver, &decider, &resource)
                    .await
                {
                    Ok(outcome) => summary.record(&outcome),
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        error!(resource = %resource, error = %e, "entity failed, continuing with next");
                        summary.errors.push(format!("{resource}: {e}"));
                    }
                }
            }
        }

        summary.finished_at = Utc::now();
        info!(
            total = summary.total,
            created = summary.created,
            updated = summary.updated,
            skipped = summary.skipped,
            rejected = summary.rejected,
            errors = summary.errors.len(),
            "run finished"
        );
        Ok(summary)
    }

    fn load_graph(&self, file: &Path) -> Result<crate::graph::MetadataGraph> {
        jsonld::load_file(file)
    }

    async fn process_entity(
        &self,
        extractor: &EntityExtractor<'_>,
        resolver: &mut ReferenceResolver<'_>,
        decider: &ReconcileDecider<'_>,
        resource: &Term,
    ) -> Result<Outcome> {
        match extractor.extract(resource)? {
            Extraction::Filtered { resource, reason } => Ok(Outcome::Skipped {
                label: resource,
                reason,
            }),
            Extraction::Draft(draft) => {
                // validate before resolving, so rejected entities trigger no
                // remote calls at all
                if draft.label.trim().is_empty() || draft.description.trim().is_empty() {
                    return Ok(Outcome::Rejected {
                        label: if draft.label.trim().is_empty() {
                            draft.resource.clone()
                        } else {
                            draft.label.clone()
                        },
                        reason: "label and description must both be non-empty".to_string(),
                    });
                }
                let last_modified = draft.last_modified.clone();
                let entry = resolver.resolve_entry(*draft).await?;
                decider.reconcile(entry, last_modified.as_deref()).await
            }
        }
    }
}
