//! Walks the metadata graph for one software entity and produces a draft
//! entry. References to shared sub-entities (actors, licenses, keywords,
//! the thumbnail) stay unresolved; the resolver fills them in against the
//! remote store.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::common::error::{Result, SyncError};
use crate::config::Config;
use crate::domain::{
    property_types, Actor, ActorExternalId, Concept, ExternalId, IdentifierService,
    PropertyRecord, Role,
};
use crate::graph::{MetadataGraph, Term, CODEMETA, OWL_SAME_AS, RDF_TYPE, SDO};
use crate::vocab::{
    self, NS_INVOCATION_TYPE, NS_ISO639_3, NS_ISO639_3_SIL, NS_TADIRAH,
};

static DOI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^10\.\d{4,9}/\S+$").unwrap());

const DOI_PREFIXES: &[&str] = &[
    "https://doi.org/",
    "http://doi.org/",
    "https://dx.doi.org/",
    "http://dx.doi.org/",
];
const ORCID_PREFIXES: &[&str] = &["https://orcid.org/", "http://orcid.org/"];

/// A contributor with its resolved-to-be actor still inline.
#[derive(Debug, Clone, Serialize)]
pub struct DraftContributor {
    pub actor: Actor,
    pub role: Role,
    pub ord: u32,
}

/// A property that may still need remote resolution.
#[derive(Debug, Clone, Serialize)]
pub enum DraftProperty {
    /// Already carries its canonical concept or literal value.
    Ready(PropertyRecord),
    /// License URI to look up in the license vocabulary (never minted).
    License { uri: String },
    /// Keyword to get-or-create in the keyword vocabulary.
    Keyword { code: String, label: String },
}

/// A canonical, unvalidated draft of one catalog entry.
#[derive(Debug, Clone, Serialize)]
pub struct DraftEntry {
    /// Subject IRI in the input graph, for diagnostics.
    pub resource: String,
    pub label: String,
    pub description: String,
    pub external_ids: Vec<ExternalId>,
    pub accessible_at: Vec<String>,
    pub thumbnail_url: Option<String>,
    pub contributors: Vec<DraftContributor>,
    pub properties: Vec<DraftProperty>,
    pub source_item_id: Option<String>,
    /// Upstream-declared last-modified timestamp, compared lexicographically
    /// against the remote record during reconciliation.
    pub last_modified: Option<String>,
}

/// Outcome of extracting one entity.
#[derive(Debug)]
pub enum Extraction {
    Draft(Box<DraftEntry>),
    /// The entity is filtered out before any remote interaction.
    Filtered { resource: String, reason: String },
}

pub struct EntityExtractor<'a> {
    graph: &'a MetadataGraph,
    config: &'a Config,
}

impl<'a> EntityExtractor<'a> {
    pub fn new(graph: &'a MetadataGraph, config: &'a Config) -> Self {
        Self { graph, config }
    }

    /// All software entities described in the graph, in document order.
    pub fn software_entities(&self) -> Vec<Term> {
        self.graph
            .subjects_of_type(&format!("{SDO}SoftwareSourceCode"))
    }

    pub fn extract(&self, resource: &Term) -> Result<Extraction> {
        let iri = resource.as_str().to_string();

        if let Some(min) = self.config.min_review_rating {
            if !self.passes_review_gate(resource, min) {
                return Ok(Extraction::Filtered {
                    resource: iri,
                    reason: format!("no review with rating >= {min}"),
                });
            }
        }

        let mut properties = Vec::new();
        match self.licenses(resource) {
            Ok(license_props) => properties.extend(license_props),
            Err(reason) => {
                return Ok(Extraction::Filtered {
                    resource: iri,
                    reason,
                })
            }
        }

        self.activities(resource, &mut properties);
        let accessible_at = self.target_products(resource, &mut properties);
        self.development_status(resource, &mut properties);
        self.keywords(resource, &mut properties);
        self.literal_properties(resource, &mut properties);
        self.languages(&mut properties);

        let (external_ids, source_item_id) = self.external_ids(resource);
        let accessible_at = self.with_repository_fallback(resource, accessible_at);

        let draft = DraftEntry {
            label: self
                .graph
                .value_str(resource, &format!("{SDO}name"))
                .unwrap_or_default()
                .to_string(),
            description: self
                .graph
                .value_str(resource, &format!("{SDO}description"))
                .unwrap_or_default()
                .to_string(),
            external_ids,
            accessible_at,
            thumbnail_url: self
                .graph
                .value_str(resource, &format!("{SDO}thumbnailUrl"))
                .map(str::to_string),
            contributors: self.contributors(resource),
            properties,
            source_item_id,
            last_modified: self
                .graph
                .value_str(resource, &format!("{SDO}dateModified"))
                .map(str::to_string),
            resource: iri,
        };
        Ok(Extraction::Draft(Box::new(draft)))
    }

    /// With a configured minimum, at least one attached review must meet it.
    fn passes_review_gate(&self, resource: &Term, min: f32) -> bool {
        for review in self.graph.objects(resource, &format!("{SDO}review")) {
            let rating_term = match self.graph.value(review, &format!("{SDO}reviewRating")) {
                Some(t) => t,
                None => continue,
            };
            let value = if rating_term.is_literal() {
                rating_term.as_str().to_string()
            } else {
                match self
                    .graph
                    .value_str(rating_term, &format!("{SDO}ratingValue"))
                {
                    Some(v) => v.to_string(),
                    None => continue,
                }
            };
            if let Ok(rating) = value.parse::<f32>() {
                if rating >= min {
                    return true;
                }
            }
        }
        false
    }

    /// Maintainers are listed before authors, then plain contributors; within
    /// each role the graph's declared order is preserved. Ordinals stay
    /// contiguous even when a nameless contributor is dropped.
    fn contributors(&self, resource: &Term) -> Vec<DraftContributor> {
        let mut contributors: Vec<DraftContributor> = Vec::new();
        let roles = [
            (Role::Maintainer, format!("{SDO}maintainer")),
            (Role::Author, format!("{SDO}author")),
            (Role::Contributor, format!("{SDO}contributor")),
        ];
        for (role, predicate) in &roles {
            for term in self.graph.objects(resource, predicate) {
                match self.contributor_actor(term) {
                    Ok(actor) => {
                        let ord = contributors.len() as u32 + 1;
                        contributors.push(DraftContributor {
                            actor,
                            role: *role,
                            ord,
                        });
                    }
                    Err(e) => {
                        warn!(resource = %resource, error = %e, "skipping contributor");
                    }
                }
            }
        }
        if let Some(reviewer) = &self.config.default_reviewer {
            let ord = contributors.len() as u32 + 1;
            contributors.push(DraftContributor {
                actor: Actor::named(reviewer.clone()),
                role: Role::Reviewer,
                ord,
            });
        }
        contributors
    }

    /// Name resolution order: explicit name, then given+family name, then the
    /// contributor fails with a missing-name error (contained by the caller).
    fn contributor_actor(&self, term: &Term) -> Result<Actor> {
        if term.is_literal() {
            return Ok(Actor::named(term.as_str()));
        }

        let name = self
            .graph
            .value_str(term, &format!("{SDO}name"))
            .map(str::to_string)
            .or_else(|| {
                let given = self.graph.value_str(term, &format!("{SDO}givenName"))?;
                let family = self.graph.value_str(term, &format!("{SDO}familyName"))?;
                Some(format!("{given} {family}"))
            })
            .ok_or_else(|| SyncError::MissingName(term.as_str().to_string()))?;

        let mut external_ids = Vec::new();
        if let Some(orcid) = self.orcid_of(term) {
            external_ids.push(ActorExternalId {
                identifier_service: Actor::orcid_service(),
                identifier: orcid,
            });
        }

        Ok(Actor {
            id: None,
            name,
            website: self
                .graph
                .value_str(term, &format!("{SDO}url"))
                .map(str::to_string),
            email: self
                .graph
                .value_str(term, &format!("{SDO}email"))
                .map(str::to_string),
            external_ids,
        })
    }

    /// A directly-typed ORCID reference, or an equivalence link to one.
    fn orcid_of(&self, term: &Term) -> Option<String> {
        let strip = |value: &str| -> Option<String> {
            ORCID_PREFIXES
                .iter()
                .find_map(|p| value.strip_prefix(p))
                .map(str::to_string)
        };
        if term.is_iri() {
            if let Some(orcid) = strip(term.as_str()) {
                return Some(orcid);
            }
        }
        self.graph
            .objects(term, OWL_SAME_AS)
            .find_map(|o| strip(o.as_str()))
    }

    /// One license property per statement. Non-SPDX URIs go through SPDX
    /// normalization; an unmappable one is dropped with a warning, or skips
    /// the whole entity in strict mode (the Err carries the reason).
    fn licenses(&self, resource: &Term) -> std::result::Result<Vec<DraftProperty>, String> {
        let mut props = Vec::new();
        for license in self.graph.objects(resource, &format!("{SDO}license")) {
            let uri = license.as_str();
            if !uri.starts_with("http") {
                continue;
            }
            match vocab::normalize_license_uri(uri) {
                Some(spdx_uri) => props.push(DraftProperty::License { uri: spdx_uri }),
                None if self.config.strict => {
                    return Err(format!("license '{uri}' failed SPDX normalization"));
                }
                None => {
                    warn!(resource = %resource, license = uri, "dropping license that failed SPDX normalization");
                }
            }
        }
        Ok(props)
    }

    /// Activity concepts from application categories in the TaDiRAH
    /// vocabulary.
    fn activities(&self, resource: &Term, properties: &mut Vec<DraftProperty>) {
        for category in self
            .graph
            .objects(resource, &format!("{SDO}applicationCategory"))
        {
            let uri = category.as_str();
            if uri.starts_with(NS_TADIRAH) {
                properties.push(DraftProperty::Ready(PropertyRecord::with_concept(
                    property_types::ACTIVITY,
                    Concept {
                        code: vocab::code_from_uri(uri),
                        uri: Some(uri.to_string()),
                        ..Default::default()
                    },
                )));
            }
        }
    }

    /// Accessible-at URLs and mode-of-use concepts from target products.
    /// Unknown product types are reported but never block processing.
    fn target_products(&self, resource: &Term, properties: &mut Vec<DraftProperty>) -> Vec<String> {
        let mut accessible_at = Vec::new();
        let mut modes: Vec<String> = Vec::new();

        for product in self.graph.objects(resource, &format!("{SDO}targetProduct")) {
            if let Some(url) = self.graph.value_str(product, &format!("{SDO}url")) {
                accessible_at.push(url.to_string());
            }
            for interface_type in self.graph.objects(product, RDF_TYPE) {
                let iri = interface_type.as_str();
                let code = if let Some(rest) = iri.strip_prefix(NS_INVOCATION_TYPE) {
                    // already in the target vocabulary, no mapping needed
                    Some(rest.to_string())
                } else {
                    vocab::software_type_code(iri).map(str::to_string)
                };
                match code {
                    Some(code) => {
                        if !modes.contains(&code) {
                            modes.push(code);
                        }
                    }
                    None => {
                        warn!(resource = %resource, interface_type = iri, "unknown targetProduct type, cannot map");
                    }
                }
            }
        }

        for mode in modes {
            properties.push(DraftProperty::Ready(PropertyRecord::with_concept(
                property_types::MODE_OF_USE,
                Concept {
                    uri: Some(format!("{NS_INVOCATION_TYPE}{mode}")),
                    code: mode,
                    ..Default::default()
                },
            )));
        }
        accessible_at
    }

    fn development_status(&self, resource: &Term, properties: &mut Vec<DraftProperty>) {
        let terms: Vec<&str> = self
            .graph
            .objects(resource, &format!("{CODEMETA}developmentStatus"))
            .map(Term::as_str)
            .collect();
        if terms.is_empty() {
            return;
        }
        let mapping = vocab::map_development_status(&terms);
        for term in &mapping.unmapped {
            warn!(resource = %resource, term = term.as_str(), "development status has no mapping, property omitted");
        }
        if let Some(uri) = mapping.life_cycle_status {
            properties.push(DraftProperty::Ready(PropertyRecord::with_concept(
                property_types::LIFE_CYCLE_STATUS,
                Concept {
                    code: vocab::code_from_uri(&uri),
                    uri: Some(uri),
                    ..Default::default()
                },
            )));
        }
        if let Some(uri) = mapping.trl {
            properties.push(DraftProperty::Ready(PropertyRecord::with_concept(
                property_types::TECHNOLOGY_READINESS_LEVEL,
                Concept {
                    code: vocab::code_from_uri(&uri),
                    uri: Some(uri),
                    ..Default::default()
                },
            )));
        }
    }

    /// Keywords are lower-cased and whitespace-normalized into codes;
    /// duplicates collapse by code. Configured default keywords follow the
    /// same path.
    fn keywords(&self, resource: &Term, properties: &mut Vec<DraftProperty>) {
        let mut seen: Vec<String> = Vec::new();
        let declared: Vec<String> = self
            .graph
            .objects(resource, &format!("{SDO}keywords"))
            .filter(|t| t.is_literal())
            .map(|t| t.as_str().to_string())
            .collect();
        for keyword in declared.iter().chain(self.config.default_keywords.iter()) {
            let label = keyword.trim();
            if label.is_empty() {
                continue;
            }
            let code = label
                .to_lowercase()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join("+");
            if seen.contains(&code) {
                continue;
            }
            seen.push(code.clone());
            properties.push(DraftProperty::Keyword {
                code,
                label: label.to_string(),
            });
        }
    }

    fn literal_properties(&self, resource: &Term, properties: &mut Vec<DraftProperty>) {
        if let Some(version) = self.graph.value_str(resource, &format!("{SDO}version")) {
            properties.push(DraftProperty::Ready(PropertyRecord::with_value(
                property_types::VERSION,
                version,
            )));
        }

        for help in self.graph.objects(resource, &format!("{SDO}softwareHelp")) {
            let url = if help.as_str().starts_with("http") {
                Some(help.as_str().to_string())
            } else {
                self.graph
                    .value_str(help, &format!("{SDO}url"))
                    .map(str::to_string)
            };
            if let Some(url) = url {
                properties.push(DraftProperty::Ready(PropertyRecord::with_value(
                    property_types::USER_MANUAL_URL,
                    url,
                )));
            }
        }

        if let Some(tracker) = self
            .graph
            .value_str(resource, &format!("{CODEMETA}issueTracker"))
        {
            if tracker.starts_with("http") {
                properties.push(DraftProperty::Ready(PropertyRecord::with_value(
                    property_types::HELPDESK_URL,
                    tracker,
                )));
            }
        }

        if let Some(terms) = self
            .graph
            .value_str(resource, &format!("{SDO}termsOfService"))
        {
            properties.push(DraftProperty::Ready(PropertyRecord::with_value(
                property_types::TERMS_OF_USE,
                terms,
            )));
        }
    }

    /// A crude search for languages anywhere in the document; these usually
    /// occur in a consumesData/producesData context.
    fn languages(&self, properties: &mut Vec<DraftProperty>) {
        let mut seen: Vec<String> = Vec::new();
        for term in self.graph.objects_anywhere(&format!("{SDO}inLanguage")) {
            let uri = term.as_str();
            let code = uri
                .strip_prefix(NS_ISO639_3)
                .or_else(|| uri.strip_prefix(NS_ISO639_3_SIL));
            if let Some(code) = code {
                let code = code.trim_matches('/').to_string();
                if code.is_empty() || seen.contains(&code) {
                    continue;
                }
                seen.push(code.clone());
                properties.push(DraftProperty::Ready(PropertyRecord::with_concept(
                    property_types::LANGUAGE,
                    Concept {
                        uri: Some(format!("{NS_ISO639_3}{code}")),
                        code,
                        ..Default::default()
                    },
                )));
            }
        }
    }

    /// External identifiers: a source-local id derived from the configured
    /// URL template (bare IRI as fallback), at most one hosting identifier
    /// from the code repository, and a DOI when one is declared.
    fn external_ids(&self, resource: &Term) -> (Vec<ExternalId>, Option<String>) {
        let mut external_ids = Vec::new();
        let iri = resource.as_str();
        let mut source_item_id = None;

        let template_prefix = self
            .config
            .source
            .url_template
            .as_deref()
            .and_then(|t| t.split('{').next())
            .filter(|p| !p.is_empty());
        match template_prefix.and_then(|p| iri.strip_prefix(p)) {
            Some(rest) => {
                let identifier = rest.trim_matches('/').to_string();
                external_ids.push(ExternalId::service(
                    IdentifierService {
                        code: self.config.source.label.clone(),
                        label: self.config.source.label.clone(),
                        url_template: self.config.source.url_template.clone(),
                    },
                    identifier.clone(),
                ));
                source_item_id = Some(identifier);
            }
            None => {
                external_ids.push(ExternalId::Raw(iri.to_string()));
            }
        }

        if let Some(repo) = self
            .graph
            .value_str(resource, &format!("{SDO}codeRepository"))
        {
            if let Some((service, identifier)) = vocab::match_hosting_service(repo) {
                external_ids.push(ExternalId::service(
                    IdentifierService {
                        code: service.code.to_string(),
                        label: service.label.to_string(),
                        url_template: Some(service.url_template.to_string()),
                    },
                    identifier,
                ));
            } else {
                debug!(resource = %resource, repository = repo, "code repository matches no known hosting prefix");
            }
        }

        if let Some(doi) = self.doi_of(resource) {
            external_ids.push(ExternalId::service(
                IdentifierService {
                    code: "DOI".to_string(),
                    label: "DOI".to_string(),
                    url_template: Some("https://doi.org/{source-item-id}".to_string()),
                },
                doi,
            ));
        }

        (external_ids, source_item_id)
    }

    /// A DOI under any identifier-bearing property, bare or as a doi.org URL.
    fn doi_of(&self, resource: &Term) -> Option<String> {
        let identifier_predicate = format!("{SDO}identifier");
        let candidates = self
            .graph
            .objects(resource, &identifier_predicate)
            .chain(self.graph.objects(resource, OWL_SAME_AS));
        for term in candidates {
            let value = term.as_str();
            if let Some(doi) = DOI_PREFIXES.iter().find_map(|p| value.strip_prefix(p)) {
                return Some(doi.to_string());
            }
            if term.is_literal() && DOI_RE.is_match(value) {
                return Some(value.to_string());
            }
        }
        None
    }

    /// The code repository is the accessibility fallback when no target
    /// product carried a URL.
    fn with_repository_fallback(&self, resource: &Term, accessible_at: Vec<String>) -> Vec<String> {
        if !accessible_at.is_empty() {
            return accessible_at;
        }
        self.graph
            .value_str(resource, &format!("{SDO}codeRepository"))
            .map(|repo| vec![repo.to_string()])
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::jsonld;
    use serde_json::json;

    fn extract_one(doc: serde_json::Value, config: &Config) -> Extraction {
        let graph = jsonld::load_value(&doc).unwrap();
        let extractor = EntityExtractor::new(&graph, config);
        let entities = extractor.software_entities();
        assert_eq!(entities.len(), 1);
        extractor.extract(&entities[0]).unwrap()
    }

    fn draft_of(extraction: Extraction) -> DraftEntry {
        match extraction {
            Extraction::Draft(d) => *d,
            Extraction::Filtered { reason, .. } => panic!("entity was filtered: {reason}"),
        }
    }

    #[test]
    fn test_maintainers_precede_authors_with_contiguous_ordinals() {
        let doc = json!({
            "@id": "https://example.org/frog",
            "@type": "SoftwareSourceCode",
            "name": "Frog",
            "description": "An NLP suite",
            "author": [
                { "name": "First Author" },
                { "givenName": "Second", "familyName": "Author" }
            ],
            "maintainer": { "name": "The Maintainer" }
        });
        let draft = draft_of(extract_one(doc, &Config::default()));

        let roles: Vec<(&str, u32)> = draft
            .contributors
            .iter()
            .map(|c| (c.role.code(), c.ord))
            .collect();
        assert_eq!(
            roles,
            vec![("maintainer", 1), ("author", 2), ("author", 3)]
        );
        assert_eq!(draft.contributors[0].actor.name, "The Maintainer");
        assert_eq!(draft.contributors[2].actor.name, "Second Author");
    }

    #[test]
    fn test_nameless_contributor_is_dropped_without_holes() {
        let doc = json!({
            "@id": "https://example.org/frog",
            "@type": "SoftwareSourceCode",
            "name": "Frog",
            "description": "An NLP suite",
            "author": [
                { "email": "nobody@example.org" },
                { "name": "Named Author" }
            ]
        });
        let draft = draft_of(extract_one(doc, &Config::default()));
        assert_eq!(draft.contributors.len(), 1);
        assert_eq!(draft.contributors[0].actor.name, "Named Author");
        assert_eq!(draft.contributors[0].ord, 1);
    }

    #[test]
    fn test_orcid_detected_via_same_as() {
        let doc = json!({
            "@id": "https://example.org/frog",
            "@type": "SoftwareSourceCode",
            "name": "Frog",
            "description": "An NLP suite",
            "author": {
                "name": "Ada Lovelace",
                "sameAs": "https://orcid.org/0000-0001-2345-6789"
            }
        });
        let draft = draft_of(extract_one(doc, &Config::default()));
        let ids = &draft.contributors[0].actor.external_ids;
        assert_eq!(ids.len(), 1);
        assert_eq!(ids[0].identifier, "0000-0001-2345-6789");
        assert_eq!(ids[0].identifier_service.code, "ORCID");
    }

    #[test]
    fn test_github_repository_yields_one_hosting_identifier() {
        let doc = json!({
            "@id": "https://example.org/frog",
            "@type": "SoftwareSourceCode",
            "name": "Frog",
            "description": "An NLP suite",
            "codeRepository": "https://github.com/LanguageMachines/frog"
        });
        let draft = draft_of(extract_one(doc, &Config::default()));
        let hosting: Vec<_> = draft
            .external_ids
            .iter()
            .filter_map(|id| match id {
                ExternalId::Service {
                    identifier_service,
                    identifier,
                } if identifier_service.code == "GitHub" => Some(identifier.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(hosting, vec!["LanguageMachines/frog".to_string()]);
        // repository is the accessible-at fallback
        assert_eq!(
            draft.accessible_at,
            vec!["https://github.com/LanguageMachines/frog".to_string()]
        );
    }

    #[test]
    fn test_unknown_host_yields_no_hosting_identifier() {
        let doc = json!({
            "@id": "https://example.org/frog",
            "@type": "SoftwareSourceCode",
            "name": "Frog",
            "description": "An NLP suite",
            "codeRepository": "https://git.example.org/frog"
        });
        let draft = draft_of(extract_one(doc, &Config::default()));
        assert!(draft.external_ids.iter().all(|id| matches!(id, ExternalId::Raw(_))));
    }

    #[test]
    fn test_source_item_id_derived_from_url_template() {
        let mut config = Config::default();
        config.source.label = "CLARIAH Tools".to_string();
        config.source.url = "https://tools.clariah.nl".to_string();
        config.source.url_template =
            Some("https://tools.clariah.nl/{source-item-id}".to_string());

        let doc = json!({
            "@id": "https://tools.clariah.nl/frog",
            "@type": "SoftwareSourceCode",
            "name": "Frog",
            "description": "An NLP suite"
        });
        let draft = draft_of(extract_one(doc, &config));
        assert_eq!(draft.source_item_id.as_deref(), Some("frog"));
    }

    #[test]
    fn test_doi_added_as_external_identifier() {
        let doc = json!({
            "@id": "https://example.org/frog",
            "@type": "SoftwareSourceCode",
            "name": "Frog",
            "description": "An NLP suite",
            "identifier": "https://doi.org/10.5281/zenodo.1234567"
        });
        let draft = draft_of(extract_one(doc, &Config::default()));
        let doi = draft.external_ids.iter().find_map(|id| match id {
            ExternalId::Service {
                identifier_service,
                identifier,
            } if identifier_service.code == "DOI" => Some(identifier.clone()),
            _ => None,
        });
        assert_eq!(doi.as_deref(), Some("10.5281/zenodo.1234567"));
    }

    #[test]
    fn test_keywords_normalized_and_deduplicated() {
        let doc = json!({
            "@id": "https://example.org/frog",
            "@type": "SoftwareSourceCode",
            "name": "Frog",
            "description": "An NLP suite",
            "keywords": ["Natural  Language Processing", "natural language processing", "parsing"]
        });
        let draft = draft_of(extract_one(doc, &Config::default()));
        let keywords: Vec<(String, String)> = draft
            .properties
            .iter()
            .filter_map(|p| match p {
                DraftProperty::Keyword { code, label } => Some((code.clone(), label.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(keywords.len(), 2);
        assert_eq!(keywords[0].0, "natural+language+processing");
        assert_eq!(keywords[1].0, "parsing");
    }

    #[test]
    fn test_keyword_that_looks_like_a_url_is_kept() {
        let doc = json!({
            "@id": "https://example.org/frog",
            "@type": "SoftwareSourceCode",
            "name": "Frog",
            "description": "An NLP suite",
            "keywords": ["https://example.org/topics/nlp"]
        });
        let draft = draft_of(extract_one(doc, &Config::default()));
        let keywords: Vec<_> = draft
            .properties
            .iter()
            .filter_map(|p| match p {
                DraftProperty::Keyword { code, .. } => Some(code.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(keywords, vec!["https://example.org/topics/nlp".to_string()]);
    }

    #[test]
    fn test_unmappable_license_dropped_by_default() {
        let doc = json!({
            "@id": "https://example.org/frog",
            "@type": "SoftwareSourceCode",
            "name": "Frog",
            "description": "An NLP suite",
            "license": "https://example.org/my-strange-license"
        });
        let draft = draft_of(extract_one(doc, &Config::default()));
        assert!(draft
            .properties
            .iter()
            .all(|p| !matches!(p, DraftProperty::License { .. })));
    }

    #[test]
    fn test_unmappable_license_filters_entity_in_strict_mode() {
        let config = Config {
            strict: true,
            ..Default::default()
        };
        let doc = json!({
            "@id": "https://example.org/frog",
            "@type": "SoftwareSourceCode",
            "name": "Frog",
            "description": "An NLP suite",
            "license": "https://example.org/my-strange-license"
        });
        assert!(matches!(
            extract_one(doc, &config),
            Extraction::Filtered { .. }
        ));
    }

    #[test]
    fn test_normalized_license_becomes_property() {
        let doc = json!({
            "@id": "https://example.org/frog",
            "@type": "SoftwareSourceCode",
            "name": "Frog",
            "description": "An NLP suite",
            "license": "http://www.gnu.org/licenses/gpl-3.0.html"
        });
        let draft = draft_of(extract_one(doc, &Config::default()));
        let licenses: Vec<_> = draft
            .properties
            .iter()
            .filter_map(|p| match p {
                DraftProperty::License { uri } => Some(uri.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            licenses,
            vec!["https://spdx.org/licenses/GPL-3.0-only".to_string()]
        );
    }

    #[test]
    fn test_target_product_modes_and_urls() {
        let doc = json!({
            "@id": "https://example.org/frog",
            "@type": "SoftwareSourceCode",
            "name": "Frog",
            "description": "An NLP suite",
            "targetProduct": [
                {
                    "@type": "stype:CommandLineApplication",
                    "url": "https://webservices.cls.ru.nl/frog"
                },
                { "@type": "https://example.org/UnknownKind" }
            ]
        });
        let draft = draft_of(extract_one(doc, &Config::default()));
        assert_eq!(
            draft.accessible_at,
            vec!["https://webservices.cls.ru.nl/frog".to_string()]
        );
        let modes: Vec<_> = draft
            .properties
            .iter()
            .filter_map(|p| match p {
                DraftProperty::Ready(record)
                    if record.property_type.code == property_types::MODE_OF_USE =>
                {
                    record.concept.as_ref().map(|c| c.code.clone())
                }
                _ => None,
            })
            .collect();
        assert_eq!(modes, vec!["commandLine".to_string()]);
    }

    #[test]
    fn test_review_gate_filters_low_rated_entities() {
        let config = Config {
            min_review_rating: Some(3.0),
            ..Default::default()
        };
        let doc = json!({
            "@id": "https://example.org/frog",
            "@type": "SoftwareSourceCode",
            "name": "Frog",
            "description": "An NLP suite",
            "review": { "reviewRating": { "ratingValue": "2.5" } }
        });
        assert!(matches!(
            extract_one(doc, &config),
            Extraction::Filtered { .. }
        ));

        let doc = json!({
            "@id": "https://example.org/frog",
            "@type": "SoftwareSourceCode",
            "name": "Frog",
            "description": "An NLP suite",
            "review": { "reviewRating": { "ratingValue": "4.0" } }
        });
        assert!(matches!(
            extract_one(doc, &config),
            Extraction::Draft(_)
        ));
    }
}
