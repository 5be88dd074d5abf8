//! Canonical entry shapes exchanged with the marketplace catalog. All wire
//! structs use camelCase field names and never serialize empty fields, so a
//! round-tripped entry stays minimal.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Property type codes used on [`PropertyRecord`].
pub mod property_types {
    pub const LICENSE: &str = "license";
    pub const ACTIVITY: &str = "activity";
    pub const MODE_OF_USE: &str = "mode-of-use";
    pub const LIFE_CYCLE_STATUS: &str = "life-cycle-status";
    pub const TECHNOLOGY_READINESS_LEVEL: &str = "technology-readiness-level";
    pub const KEYWORD: &str = "keyword";
    pub const VERSION: &str = "version";
    pub const USER_MANUAL_URL: &str = "user-manual-url";
    pub const HELPDESK_URL: &str = "helpdesk-url";
    pub const TERMS_OF_USE: &str = "terms-of-use";
    pub const LANGUAGE: &str = "language";
}

/// Contributor roles, in the order they are emitted on an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Maintainer,
    Author,
    Contributor,
    Reviewer,
}

impl Role {
    pub fn code(&self) -> &'static str {
        match self {
            Role::Maintainer => "maintainer",
            Role::Author => "author",
            Role::Contributor => "contributor",
            Role::Reviewer => "reviewer",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Maintainer => "Maintainer",
            Role::Author => "Author",
            Role::Contributor => "Contributor",
            Role::Reviewer => "Reviewer",
        }
    }
}

/// A third-party naming authority (DOI, ORCID, a code-hosting platform, a
/// source catalog).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifierService {
    pub code: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_template: Option<String>,
}

/// An identifier for the entry in an external system: either a structured
/// service/identifier pair, or a bare opaque string as fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExternalId {
    Service {
        #[serde(rename = "identifierService")]
        identifier_service: IdentifierService,
        identifier: String,
    },
    Raw(String),
}

impl ExternalId {
    pub fn service(service: IdentifierService, identifier: impl Into<String>) -> Self {
        ExternalId::Service {
            identifier_service: service,
            identifier: identifier.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyRef {
    pub code: String,
}

/// A coded term drawn from a controlled vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocabulary: Option<VocabularyRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyTypeRef {
    pub code: String,
}

/// A typed key paired with a concept, a literal value, or both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    #[serde(rename = "type")]
    pub property_type: PropertyTypeRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept: Option<Concept>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl PropertyRecord {
    pub fn with_concept(type_code: &str, concept: Concept) -> Self {
        Self {
            property_type: PropertyTypeRef {
                code: type_code.to_string(),
            },
            concept: Some(concept),
            value: None,
        }
    }

    pub fn with_value(type_code: &str, value: impl Into<String>) -> Self {
        Self {
            property_type: PropertyTypeRef {
                code: type_code.to_string(),
            },
            concept: None,
            value: Some(value.into()),
        }
    }

    /// Placeholder markers must not reach the wire on updates: a property
    /// carrying neither content, or an empty concept shell, says nothing.
    pub fn is_placeholder(&self) -> bool {
        let empty_concept = match &self.concept {
            Some(c) => c.code.trim().is_empty() && c.uri.as_deref().unwrap_or("").trim().is_empty(),
            None => true,
        };
        let empty_value = self.value.as_deref().unwrap_or("").trim().is_empty();
        empty_concept && empty_value
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorExternalId {
    pub identifier_service: IdentifierService,
    pub identifier: String,
}

/// A person or organisation contributing to an entry. Deduplicated remotely
/// by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_ids: Vec<ActorExternalId>,
}

impl Actor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn orcid_service() -> IdentifierService {
        IdentifierService {
            code: "ORCID".to_string(),
            label: "ORCID".to_string(),
            url_template: Some("https://orcid.org/{source-item-id}".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorRole {
    pub code: String,
    pub label: String,
    pub ord: u32,
}

impl ActorRole {
    pub fn new(role: Role, ord: u32) -> Self {
        Self {
            code: role.code().to_string(),
            label: role.label().to_string(),
            ord,
        }
    }
}

/// An actor attached to an entry with a role and an ordinal position.
/// Ordinals are contiguous from 1, maintainers before authors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributorRole {
    pub actor: Actor,
    pub role: ActorRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaInfo {
    pub media_id: Uuid,
}

/// A reference to a registered media object (thumbnail).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub info: MediaInfo,
}

impl MediaRef {
    pub fn new(media_id: Uuid) -> Self {
        Self {
            info: MediaInfo { media_id },
        }
    }
}

/// A fully resolved catalog entry, ready to be created or updated remotely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolEntry {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_ids: Vec<ExternalId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accessible_at: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<MediaRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contributors: Vec<ContributorRole>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyRecord>,
}

impl ToolEntry {
    /// Label and description must both be non-empty before any write.
    pub fn is_valid(&self) -> bool {
        !self.label.trim().is_empty() && !self.description.trim().is_empty()
    }

    /// Drop placeholder property markers before transmission.
    pub fn strip_placeholders(&mut self) {
        self.properties.retain(|p| !p.is_placeholder());
        self.accessible_at.retain(|url| !url.trim().is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_validation_requires_label_and_description() {
        let mut entry = ToolEntry {
            label: "Frog".to_string(),
            description: "An NLP suite".to_string(),
            ..Default::default()
        };
        assert!(entry.is_valid());

        entry.description = "   ".to_string();
        assert!(!entry.is_valid());
    }

    #[test]
    fn test_strip_placeholders_removes_empty_concepts() {
        let mut entry = ToolEntry {
            label: "Frog".to_string(),
            description: "An NLP suite".to_string(),
            properties: vec![
                PropertyRecord::with_value(property_types::VERSION, "0.3.1"),
                PropertyRecord {
                    property_type: PropertyTypeRef {
                        code: property_types::KEYWORD.to_string(),
                    },
                    concept: Some(Concept::default()),
                    value: None,
                },
            ],
            ..Default::default()
        };
        entry.strip_placeholders();
        assert_eq!(entry.properties.len(), 1);
        assert_eq!(entry.properties[0].value.as_deref(), Some("0.3.1"));
    }

    #[test]
    fn test_external_id_serialization_shapes() {
        let raw = ExternalId::Raw("https://example.org/tool".to_string());
        assert_eq!(
            serde_json::to_value(&raw).unwrap(),
            serde_json::json!("https://example.org/tool")
        );

        let structured = ExternalId::service(
            IdentifierService {
                code: "GitHub".to_string(),
                label: "GitHub".to_string(),
                url_template: Some("https://github.com/{source-item-id}".to_string()),
            },
            "org/repo",
        );
        let value = serde_json::to_value(&structured).unwrap();
        assert_eq!(value["identifier"], "org/repo");
        assert_eq!(value["identifierService"]["code"], "GitHub");
    }

    #[test]
    fn test_empty_fields_not_serialized() {
        let entry = ToolEntry {
            label: "Frog".to_string(),
            description: "An NLP suite".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert!(value.get("externalIds").is_none());
        assert!(value.get("thumbnail").is_none());
        assert!(value.get("contributors").is_none());
    }
}
