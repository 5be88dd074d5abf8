use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::error::{Result, SyncError};

fn default_base_url() -> String {
    "https://marketplace-api.sshopencloud.eu/api".to_string()
}

/// The upstream catalog this run writes on behalf of. Entries are scoped to
/// the source label, and the URL template derives source-local item ids.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceIdentity {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub url_template: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// A pre-issued bearer token; takes precedence over credentials.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub source: SourceIdentity,
    /// Entities without a review at or above this rating are skipped.
    #[serde(default)]
    pub min_review_rating: Option<f32>,
    /// Keywords attached to every extracted entry.
    #[serde(default)]
    pub default_keywords: Vec<String>,
    /// Actor name appended to every entry with the reviewer role.
    #[serde(default)]
    pub default_reviewer: Option<String>,
    /// Update remote records even when the upstream timestamp is not newer.
    #[serde(default)]
    pub force_update: bool,
    /// Drop unresolvable license properties instead of aborting the run.
    #[serde(default)]
    pub ignore_unmappable_licenses: bool,
    /// Skip the whole entity when a license URI fails SPDX normalization.
    #[serde(default)]
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: None,
            password: None,
            token: None,
            source: SourceIdentity::default(),
            min_review_rating: None,
            default_keywords: Vec::new(),
            default_reviewer: None,
            force_update: false,
            ignore_unmappable_licenses: false,
            strict: false,
        }
    }
}

const DEFAULT_CONFIG_PATH: &str = "codemeta-sync.toml";

impl Config {
    /// Load configuration: an explicit file must exist, the default file is
    /// optional, and environment variables override file values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let content = fs::read_to_string(p).map_err(|e| {
                    SyncError::Config(format!(
                        "failed to read config file '{}': {}",
                        p.display(),
                        e
                    ))
                })?;
                toml::from_str(&content)?
            }
            None => {
                if Path::new(DEFAULT_CONFIG_PATH).exists() {
                    let content = fs::read_to_string(DEFAULT_CONFIG_PATH)?;
                    toml::from_str(&content)?
                } else {
                    Config::default()
                }
            }
        };
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(v) = env::var("MP_BASE_URL") {
            self.base_url = v;
        }
        if let Ok(v) = env::var("MP_USERNAME") {
            self.username = Some(v);
        }
        if let Ok(v) = env::var("MP_PASSWORD") {
            self.password = Some(v);
        }
        if let Ok(v) = env::var("MP_TOKEN") {
            self.token = Some(v);
        }
        if let Ok(v) = env::var("MP_SOURCE_LABEL") {
            self.source.label = v;
        }
        if let Ok(v) = env::var("MP_SOURCE_URL") {
            self.source.url = v;
        }
        if let Ok(v) = env::var("MP_SOURCE_URL_TEMPLATE") {
            self.source.url_template = Some(v);
        }
    }

    /// A reconciliation run needs a source identity to scope lookups and
    /// writes; extraction alone does not.
    pub fn require_source(&self) -> Result<()> {
        if self.source.label.trim().is_empty() || self.source.url.trim().is_empty() {
            return Err(SyncError::Config(
                "source label and url must be configured for reconciliation".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            base_url = "https://marketplace-api.example.org/api"
            username = "ingest-bot"
            min_review_rating = 3.0
            default_keywords = ["nlp"]
            force_update = true

            [source]
            label = "CLARIAH Tools"
            url = "https://tools.clariah.nl"
            url_template = "https://tools.clariah.nl/{source-item-id}"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.base_url, "https://marketplace-api.example.org/api");
        assert_eq!(config.min_review_rating, Some(3.0));
        assert!(config.force_update);
        assert!(!config.strict);
        assert_eq!(config.source.label, "CLARIAH Tools");
        assert!(config.require_source().is_ok());
    }

    #[test]
    fn test_require_source_rejects_empty_identity() {
        let config = Config::default();
        assert!(config.require_source().is_err());
    }
}
