//! Flattening loader for JSON-LD-shaped codemeta documents.
//!
//! This is deliberately not a JSON-LD processor: compact keys are expanded
//! through a fixed context table (codemeta terms map to the codemeta
//! namespace, everything else defaults to schema.org, matching the codemeta
//! context) and nested nodes become anonymous subjects. `@list` arrays and
//! plain arrays are both flattened in declaration order, which is what gives
//! contributor ordinals their meaning downstream.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::common::error::{Result, SyncError};
use crate::graph::{MetadataGraph, Term, CODEMETA, OWL_SAME_AS, RDF_TYPE, SDO, SOFTWARE_TYPES, TRL};

/// Keys that live in the codemeta namespace rather than schema.org.
const CODEMETA_TERMS: &[&str] = &[
    "developmentStatus",
    "issueTracker",
    "readme",
    "continuousIntegration",
    "referencePublication",
    "buildInstructions",
];

/// Terms whose string values the codemeta/schema.org context types as `@id`.
/// Strings under any other predicate stay literals even when they look like
/// URLs (a keyword may legitimately be one).
const IRI_VALUED_TERMS: &[&str] = &[
    "url",
    "sameAs",
    "identifier",
    "license",
    "codeRepository",
    "developmentStatus",
    "issueTracker",
    "readme",
    "continuousIntegration",
    "buildInstructions",
    "referencePublication",
    "downloadUrl",
    "installUrl",
    "releaseNotes",
    "softwareHelp",
    "thumbnailUrl",
    "applicationCategory",
    "inLanguage",
    "termsOfService",
];

fn is_iri_valued(predicate: &str) -> bool {
    let term = predicate.rsplit(['/', '#']).next().unwrap_or(predicate);
    IRI_VALUED_TERMS.contains(&term)
}

/// Prefixes accepted in compact IRIs.
const PREFIXES: &[(&str, &str)] = &[
    ("schema:", SDO),
    ("sdo:", SDO),
    ("codemeta:", CODEMETA),
    ("stype:", SOFTWARE_TYPES),
    ("trl:", TRL),
];

pub fn load_file(path: &Path) -> Result<MetadataGraph> {
    let content = fs::read_to_string(path)?;
    let doc: Value = serde_json::from_str(&content)?;
    load_value(&doc)
}

pub fn load_value(doc: &Value) -> Result<MetadataGraph> {
    let mut flattener = Flattener::default();
    match doc {
        Value::Object(map) => {
            if let Some(Value::Array(nodes)) = map.get("@graph") {
                for node in nodes {
                    flattener.node(node)?;
                }
            } else {
                flattener.node(doc)?;
            }
        }
        Value::Array(nodes) => {
            for node in nodes {
                flattener.node(node)?;
            }
        }
        _ => {
            return Err(SyncError::MissingField(
                "document root must be an object or an array of objects".to_string(),
            ))
        }
    }
    Ok(flattener.graph)
}

/// Expand a document key to a full predicate IRI.
fn expand_key(key: &str) -> String {
    expand_compact(key, true)
}

/// Expand an `@type` value or `@id` to a full IRI.
fn expand_type(value: &str) -> String {
    expand_compact(value, false)
}

fn expand_compact(term: &str, is_predicate: bool) -> String {
    if term.contains("://") {
        return term.to_string();
    }
    for (prefix, ns) in PREFIXES {
        if let Some(rest) = term.strip_prefix(prefix) {
            return format!("{ns}{rest}");
        }
    }
    if is_predicate && term == "sameAs" {
        return OWL_SAME_AS.to_string();
    }
    if CODEMETA_TERMS.contains(&term) {
        return format!("{CODEMETA}{term}");
    }
    format!("{SDO}{term}")
}

#[derive(Default)]
struct Flattener {
    graph: MetadataGraph,
    blank_counter: usize,
}

impl Flattener {
    /// Flatten one node object, returning the term that identifies it.
    fn node(&mut self, value: &Value) -> Result<Term> {
        let map = value.as_object().ok_or_else(|| {
            SyncError::MissingField("graph node must be a JSON object".to_string())
        })?;

        let subject = match map.get("@id").and_then(Value::as_str) {
            Some(id) => Term::iri(expand_type(id)),
            None => self.fresh_blank(),
        };

        for (key, val) in map {
            match key.as_str() {
                "@id" | "@context" => {}
                "@type" => {
                    for ty in as_values(val) {
                        if let Some(name) = ty.as_str() {
                            self.graph.insert(
                                subject.clone(),
                                RDF_TYPE,
                                Term::iri(expand_type(name)),
                            );
                        }
                    }
                }
                _ => {
                    let predicate = expand_key(key);
                    self.objects(&subject, &predicate, val)?;
                }
            }
        }
        Ok(subject)
    }

    /// Emit statements for one key's value(s), preserving declaration order.
    fn objects(&mut self, subject: &Term, predicate: &str, value: &Value) -> Result<()> {
        match value {
            Value::Array(items) => {
                for item in items {
                    self.objects(subject, predicate, item)?;
                }
            }
            Value::Object(map) => {
                if let Some(list) = map.get("@list") {
                    self.objects(subject, predicate, list)?;
                } else if let Some(v) = map.get("@value") {
                    self.graph.insert(
                        subject.clone(),
                        predicate,
                        Term::literal(scalar_to_string(v)),
                    );
                } else if map.len() == 1 && map.contains_key("@id") {
                    let id = map.get("@id").and_then(Value::as_str).unwrap_or_default();
                    self.graph
                        .insert(subject.clone(), predicate, Term::iri(expand_type(id)));
                } else {
                    let object = self.node(value)?;
                    self.graph.insert(subject.clone(), predicate, object);
                }
            }
            Value::String(s) => {
                let is_url = s.starts_with("http://") || s.starts_with("https://");
                let object = if is_url && is_iri_valued(predicate) {
                    Term::iri(s.clone())
                } else {
                    Term::literal(s.clone())
                };
                self.graph.insert(subject.clone(), predicate, object);
            }
            Value::Number(_) | Value::Bool(_) => {
                self.graph.insert(
                    subject.clone(),
                    predicate,
                    Term::literal(scalar_to_string(value)),
                );
            }
            Value::Null => {}
        }
        Ok(())
    }

    fn fresh_blank(&mut self) -> Term {
        self.blank_counter += 1;
        Term::Blank(format!("_:b{}", self.blank_counter))
    }
}

fn as_values(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_simple_document() {
        let doc = json!({
            "@context": "https://w3id.org/codemeta/3.0",
            "@id": "https://example.org/frog",
            "@type": "SoftwareSourceCode",
            "name": "Frog",
            "codeRepository": "https://github.com/LanguageMachines/frog",
            "developmentStatus": "https://www.repostatus.org/#active"
        });

        let g = load_value(&doc).unwrap();
        let subjects = g.subjects_of_type(&format!("{SDO}SoftwareSourceCode"));
        assert_eq!(subjects.len(), 1);
        let s = &subjects[0];
        assert_eq!(g.value_str(s, &format!("{SDO}name")), Some("Frog"));
        assert!(g
            .value(s, &format!("{CODEMETA}developmentStatus"))
            .unwrap()
            .is_iri());
    }

    #[test]
    fn test_url_strings_are_iris_only_under_id_typed_predicates() {
        let doc = json!({
            "@id": "https://example.org/tool",
            "@type": "SoftwareSourceCode",
            "license": "https://spdx.org/licenses/MIT",
            "keywords": "https://example.org/topics/nlp"
        });

        let g = load_value(&doc).unwrap();
        let s = Term::iri("https://example.org/tool");
        assert!(g.value(&s, &format!("{SDO}license")).unwrap().is_iri());
        assert!(g.value(&s, &format!("{SDO}keywords")).unwrap().is_literal());
    }

    #[test]
    fn test_list_order_is_preserved() {
        let doc = json!({
            "@id": "https://example.org/tool",
            "@type": "SoftwareSourceCode",
            "author": { "@list": [
                { "name": "First Author" },
                { "name": "Second Author" }
            ]}
        });

        let g = load_value(&doc).unwrap();
        let s = Term::iri("https://example.org/tool");
        let authors: Vec<_> = g.objects(&s, &format!("{SDO}author")).collect();
        assert_eq!(authors.len(), 2);
        assert_eq!(
            g.value_str(authors[0], &format!("{SDO}name")),
            Some("First Author")
        );
        assert_eq!(
            g.value_str(authors[1], &format!("{SDO}name")),
            Some("Second Author")
        );
    }

    #[test]
    fn test_nested_node_and_same_as() {
        let doc = json!({
            "@id": "https://example.org/tool",
            "@type": "SoftwareSourceCode",
            "author": {
                "givenName": "Ada",
                "familyName": "Lovelace",
                "sameAs": "https://orcid.org/0000-0001-2345-6789"
            }
        });

        let g = load_value(&doc).unwrap();
        let s = Term::iri("https://example.org/tool");
        let author = g.value(&s, &format!("{SDO}author")).unwrap().clone();
        assert_eq!(g.value_str(&author, &format!("{SDO}givenName")), Some("Ada"));
        assert_eq!(
            g.value_str(&author, OWL_SAME_AS),
            Some("https://orcid.org/0000-0001-2345-6789")
        );
    }
}
