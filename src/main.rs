use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use codemeta_sync::app::SyncUseCase;
use codemeta_sync::config::Config;
use codemeta_sync::extract::EntityExtractor;
use codemeta_sync::graph::jsonld;
use codemeta_sync::observability::logging;
use codemeta_sync::store::http::HttpCatalog;
use codemeta_sync::store::in_memory::InMemoryCatalog;
use codemeta_sync::store::CatalogStore;

#[derive(Parser)]
#[command(name = "codemeta-sync")]
#[command(about = "Reconciles codemeta software descriptions into a marketplace catalog")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the configuration file (default: codemeta-sync.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract draft entries from input documents and print them as JSON,
    /// without touching the remote catalog
    Extract {
        /// Input files (JSON-LD codemeta)
        files: Vec<PathBuf>,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
    /// Reconcile input documents against the remote catalog
    Reconcile {
        /// Input files (JSON-LD codemeta)
        files: Vec<PathBuf>,
        /// Run against an in-memory catalog instead of the remote store
        #[arg(long)]
        dry_run: bool,
        /// Update remote records even when the upstream timestamp is not newer
        #[arg(long)]
        force: bool,
        /// Base URL of the catalog API
        #[arg(long)]
        base_url: Option<String>,
        /// Pre-issued bearer token (overrides credentials)
        #[arg(long)]
        token: Option<String>,
        /// Label of the source catalog this run writes on behalf of
        #[arg(long)]
        source_label: Option<String>,
        /// URL of the source catalog
        #[arg(long)]
        source_url: Option<String>,
        /// Skip entities without a review at or above this rating
        #[arg(long)]
        min_rating: Option<f32>,
        /// Drop unresolvable license properties instead of aborting
        #[arg(long)]
        ignore_unmappable_licenses: bool,
        /// Skip entities whose license fails SPDX normalization
        #[arg(long)]
        strict: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Extract { files, pretty } => {
            let config = Config::load(config_path)?;
            if files.is_empty() {
                bail!("no input files given");
            }
            for file in &files {
                let graph = jsonld::load_file(file)
                    .with_context(|| format!("failed to load {}", file.display()))?;
                let extractor = EntityExtractor::new(&graph, &config);
                for resource in extractor.software_entities() {
                    match extractor.extract(&resource)? {
                        codemeta_sync::extract::Extraction::Draft(draft) => {
                            let json = if pretty {
                                serde_json::to_string_pretty(&draft)?
                            } else {
                                serde_json::to_string(&draft)?
                            };
                            println!("{json}");
                        }
                        codemeta_sync::extract::Extraction::Filtered { resource, reason } => {
                            warn!(resource = resource.as_str(), reason = reason.as_str(), "entity filtered");
                        }
                    }
                }
            }
            Ok(())
        }
        Commands::Reconcile {
            files,
            dry_run,
            force,
            base_url,
            token,
            source_label,
            source_url,
            min_rating,
            ignore_unmappable_licenses,
            strict,
        } => {
            let mut config = Config::load(config_path)?;
            if let Some(v) = base_url {
                config.base_url = v;
            }
            if let Some(v) = token {
                config.token = Some(v);
            }
            if let Some(v) = source_label {
                config.source.label = v;
            }
            if let Some(v) = source_url {
                config.source.url = v;
            }
            if let Some(v) = min_rating {
                config.min_review_rating = Some(v);
            }
            config.force_update |= force;
            config.ignore_unmappable_licenses |= ignore_unmappable_licenses;
            config.strict |= strict;

            if files.is_empty() {
                bail!("no input files given");
            }
            config.require_source()?;

            let store: Box<dyn CatalogStore> = if dry_run {
                info!("dry run: using in-memory catalog");
                Box::new(InMemoryCatalog::permissive())
            } else if let Some(token) = &config.token {
                Box::new(HttpCatalog::with_token(&config.base_url, token))
            } else if let (Some(username), Some(password)) = (&config.username, &config.password) {
                Box::new(HttpCatalog::sign_in(&config.base_url, username, password).await?)
            } else {
                bail!("no credentials: set a token or username and password");
            };

            let use_case = SyncUseCase::new(store.as_ref(), &config);
            let summary = use_case.run(&files).await?;

            println!("\n📊 Reconciliation results:");
            println!("   Total entities: {}", summary.total);
            println!("   Created:  {}", summary.created);
            println!("   Updated:  {}", summary.updated);
            println!("   Skipped:  {}", summary.skipped);
            println!("   Rejected: {}", summary.rejected);
            println!("   Errors:   {}", summary.errors.len());
            println!(
                "   Duration: {}s",
                (summary.finished_at - summary.started_at).num_seconds()
            );

            if !summary.errors.is_empty() {
                warn!("{} entities failed during the run", summary.errors.len());
                println!("\n⚠️  Entities that failed:");
                for error in &summary.errors {
                    println!("   - {error}");
                }
            }
            Ok(())
        }
    }
}
