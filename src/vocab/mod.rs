//! Static vocabulary tables and the precedence logic that sits on top of
//! them. Everything here is pure data and pure functions; no remote state.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::graph::{REPOSTATUS, SDO, SOFTWARE_TYPES, TRL};

pub const NS_EOSC_LIFE_CYCLE_STATUS: &str =
    "https://vocabs.sshopencloud.eu/vocabularies/eosc-life-cycle-status/";
pub const NS_EOSC_TRL: &str =
    "https://vocabs.sshopencloud.eu/vocabularies/eosc-technology-readiness-level/";
pub const NS_INVOCATION_TYPE: &str =
    "https://vocabs.sshopencloud.eu/vocabularies/invocation-type/";
pub const NS_TADIRAH: &str = "https://vocabs.dariah.eu/tadirah/";
pub const NS_SPDX: &str = "https://spdx.org/licenses/";
pub const NS_ISO639_3: &str = "https://vocabs.acdh.oeaw.ac.at/iso6393/";
pub const NS_ISO639_3_SIL: &str = "https://iso639-3.sil.org/code/";

/// The marketplace vocabulary that accepts newly minted keyword concepts.
pub const KEYWORD_VOCABULARY: &str = "sshoc-keyword";

fn lcs(code: &str) -> String {
    format!("{NS_EOSC_LIFE_CYCLE_STATUS}life_cycle_status-{code}")
}

/// Software/interface type terms mapped to invocation-type codes. Some of
/// these are approximate fallbacks with no exact counterpart in the target
/// vocabulary.
static SOFTWARE_TYPE_MAP: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (format!("{SDO}WebApplication"), "webApplication"),
        (format!("{SDO}WebAPI"), "restfulWebservice"),
        (format!("{SDO}MobileApplication"), "localApplication"),
        (format!("{SDO}NotebookApplication"), "script"),
        (format!("{SDO}VideoGame"), "localApplication"),
        (format!("{SOFTWARE_TYPES}DesktopApplication"), "localApplication"),
        (format!("{SOFTWARE_TYPES}SoftwareLibrary"), "library"),
        (format!("{SOFTWARE_TYPES}CommandLineApplication"), "commandLine"),
        (format!("{SOFTWARE_TYPES}SoftwareImage"), "localApplication"),
        (format!("{SOFTWARE_TYPES}SoftwarePackage"), "localApplication"),
        (format!("{SOFTWARE_TYPES}TerminalApplication"), "commandLine"),
        (format!("{SOFTWARE_TYPES}ServerApplication"), "webApplication"),
    ])
});

/// TRL stages and levels mapped to EOSC life-cycle-status URIs.
static LIFECYCLE_MAP: Lazy<HashMap<String, String>> = Lazy::new(|| {
    HashMap::from([
        // stages (coarse)
        (format!("{TRL}Stage1Planning"), lcs("preparation")),
        (format!("{TRL}Stage2ProofOfConcept"), lcs("concept")),
        (format!("{TRL}Stage3Experimental"), lcs("beta")),
        (format!("{TRL}Stage4Complete"), lcs("production")),
        // levels (fine grained)
        (format!("{TRL}Level0Idea"), lcs("preparation")),
        (format!("{TRL}Level1InitialResearch"), lcs("preparation")),
        (format!("{TRL}Level2ConceptFormulated"), lcs("planned")),
        (format!("{TRL}Level3ProofOfConcept"), lcs("concept")),
        (format!("{TRL}Level4ValidatedProofOfConcept"), lcs("design")),
        (format!("{TRL}Level5EarlyPrototype"), lcs("alpha")),
        (format!("{TRL}Level6LatePrototype"), lcs("beta")),
        (format!("{TRL}Level7ReleaseCandidate"), lcs("beta")),
        (format!("{TRL}Level8Complete"), lcs("production")),
        (format!("{TRL}Level9Proven"), lcs("production")),
    ])
});

/// TRL levels mapped to EOSC TRL URIs. There is no level 0; it is grouped
/// with level 1.
static TRL_MAP: Lazy<HashMap<String, String>> = Lazy::new(|| {
    HashMap::from([
        (format!("{TRL}Level0Idea"), format!("{NS_EOSC_TRL}trl-1")),
        (format!("{TRL}Level1InitialResearch"), format!("{NS_EOSC_TRL}trl-1")),
        (format!("{TRL}Level2ConceptFormulated"), format!("{NS_EOSC_TRL}trl-2")),
        (format!("{TRL}Level3ProofOfConcept"), format!("{NS_EOSC_TRL}trl-3")),
        (format!("{TRL}Level4ValidatedProofOfConcept"), format!("{NS_EOSC_TRL}trl-4")),
        (format!("{TRL}Level5EarlyPrototype"), format!("{NS_EOSC_TRL}trl-5")),
        (format!("{TRL}Level6LatePrototype"), format!("{NS_EOSC_TRL}trl-6")),
        (format!("{TRL}Level7ReleaseCandidate"), format!("{NS_EOSC_TRL}trl-7")),
        (format!("{TRL}Level8Complete"), format!("{NS_EOSC_TRL}trl-8")),
        (format!("{TRL}Level9Proven"), format!("{NS_EOSC_TRL}trl-9")),
    ])
});

/// Repository statuses that override every mapped status.
static REPOSTATUS_PRIORITY_MAP: Lazy<HashMap<String, String>> = Lazy::new(|| {
    HashMap::from([(format!("{REPOSTATUS}abandoned"), lcs("termination"))])
});

/// Generic repository-status lookups, applied after the TRL/stage maps.
static REPOSTATUS_MAP: Lazy<HashMap<String, String>> = Lazy::new(|| {
    HashMap::from([
        (format!("{REPOSTATUS}active"), lcs("production")),
        (format!("{REPOSTATUS}concept"), lcs("concept")),
        (format!("{REPOSTATUS}inactive"), lcs("retirement")),
        (format!("{REPOSTATUS}unsupported"), lcs("retirement")),
        (format!("{REPOSTATUS}suspended"), lcs("retirement")),
        (format!("{REPOSTATUS}moved"), lcs("termination")),
    ])
});

/// Fallback only if nothing else matched.
static REPOSTATUS_FALLBACK_MAP: Lazy<HashMap<String, String>> = Lazy::new(|| {
    HashMap::from([(format!("{REPOSTATUS}wip"), lcs("concept"))])
});

/// Map a software/interface type IRI to an invocation-type code.
pub fn software_type_code(type_iri: &str) -> Option<&'static str> {
    SOFTWARE_TYPE_MAP.get(type_iri).copied()
}

/// Result of mapping one entity's development-status terms.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StatusMapping {
    /// EOSC life-cycle-status URI, if any signal mapped.
    pub life_cycle_status: Option<String>,
    /// EOSC technology-readiness-level URI, if any signal mapped.
    pub trl: Option<String>,
    /// Terms that contributed to neither; surfaced as warnings, never errors.
    pub unmapped: Vec<String>,
}

/// Apply the life-cycle precedence rules over all status terms of an entity:
///
/// 1. a term already in the target vocabulary namespace is used verbatim;
/// 2. an explicit "abandoned" status overrides the mapped alternatives;
/// 3. mapped TRL/stage terms;
/// 4. the generic repository-status map;
/// 5. the narrow fallback map (currently only "wip").
///
/// TRL terms follow the simpler rule: verbatim target-namespace terms win
/// over mapped levels.
pub fn map_development_status(terms: &[&str]) -> StatusMapping {
    let mut verbatim_lcs = None;
    let mut abandoned = None;
    let mut staged = None;
    let mut generic = None;
    let mut fallback = None;
    let mut verbatim_trl = None;
    let mut mapped_trl = None;
    let mut unmapped = Vec::new();

    for term in terms {
        let mut matched = false;
        if term.starts_with(NS_EOSC_LIFE_CYCLE_STATUS) {
            verbatim_lcs.get_or_insert_with(|| term.to_string());
            matched = true;
        }
        if term.starts_with(NS_EOSC_TRL) {
            verbatim_trl.get_or_insert_with(|| term.to_string());
            matched = true;
        }
        if let Some(uri) = REPOSTATUS_PRIORITY_MAP.get(*term) {
            abandoned.get_or_insert_with(|| uri.clone());
            matched = true;
        }
        if let Some(uri) = LIFECYCLE_MAP.get(*term) {
            staged.get_or_insert_with(|| uri.clone());
            matched = true;
        }
        if let Some(uri) = TRL_MAP.get(*term) {
            mapped_trl.get_or_insert_with(|| uri.clone());
            matched = true;
        }
        if let Some(uri) = REPOSTATUS_MAP.get(*term) {
            generic.get_or_insert_with(|| uri.clone());
            matched = true;
        }
        if let Some(uri) = REPOSTATUS_FALLBACK_MAP.get(*term) {
            fallback.get_or_insert_with(|| uri.clone());
            matched = true;
        }
        if !matched {
            unmapped.push(term.to_string());
        }
    }

    StatusMapping {
        life_cycle_status: verbatim_lcs
            .or(abandoned)
            .or(staged)
            .or(generic)
            .or(fallback),
        trl: verbatim_trl.or(mapped_trl),
        unmapped,
    }
}

/// Known non-SPDX license URI forms, keyed by their canonicalized form
/// (https scheme, no trailing slash, no .html suffix).
static SPDX_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("https://opensource.org/licenses/MIT", "MIT"),
        ("https://opensource.org/licenses/ISC", "ISC"),
        ("https://opensource.org/licenses/Apache-2.0", "Apache-2.0"),
        ("https://opensource.org/licenses/BSD-2-Clause", "BSD-2-Clause"),
        ("https://opensource.org/licenses/BSD-3-Clause", "BSD-3-Clause"),
        ("https://opensource.org/licenses/MPL-2.0", "MPL-2.0"),
        ("https://opensource.org/licenses/EPL-2.0", "EPL-2.0"),
        ("https://opensource.org/licenses/GPL-2.0", "GPL-2.0-only"),
        ("https://opensource.org/licenses/GPL-3.0", "GPL-3.0-only"),
        ("https://opensource.org/licenses/LGPL-3.0", "LGPL-3.0-only"),
        ("https://opensource.org/licenses/AGPL-3.0", "AGPL-3.0-only"),
        ("https://www.gnu.org/licenses/gpl-2.0", "GPL-2.0-only"),
        ("https://www.gnu.org/licenses/gpl-3.0", "GPL-3.0-only"),
        ("https://www.gnu.org/licenses/lgpl-3.0", "LGPL-3.0-only"),
        ("https://www.gnu.org/licenses/agpl-3.0", "AGPL-3.0-only"),
        ("https://www.apache.org/licenses/LICENSE-2.0", "Apache-2.0"),
        ("https://creativecommons.org/licenses/by/4.0", "CC-BY-4.0"),
        ("https://creativecommons.org/licenses/by-sa/4.0", "CC-BY-SA-4.0"),
        ("https://creativecommons.org/licenses/by-nc/4.0", "CC-BY-NC-4.0"),
        ("https://creativecommons.org/licenses/by-nc-sa/4.0", "CC-BY-NC-SA-4.0"),
        ("https://creativecommons.org/publicdomain/zero/1.0", "CC0-1.0"),
    ])
});

/// Normalize a license URI to its canonical SPDX URI. SPDX URIs pass through
/// (with presentation suffixes trimmed); known aliases are rewritten; anything
/// else yields `None`.
pub fn normalize_license_uri(uri: &str) -> Option<String> {
    let canonical = canonicalize_uri(uri);
    if let Some(id) = canonical.strip_prefix(NS_SPDX) {
        if id.is_empty() {
            return None;
        }
        return Some(format!("{NS_SPDX}{id}"));
    }
    SPDX_ALIASES
        .get(canonical.as_str())
        .map(|id| format!("{NS_SPDX}{id}"))
}

fn canonicalize_uri(uri: &str) -> String {
    let mut s = uri.trim().to_string();
    if let Some(rest) = s.strip_prefix("http://") {
        s = format!("https://{rest}");
    }
    for suffix in ["/", ".html", ".json", ".txt"] {
        if let Some(trimmed) = s.strip_suffix(suffix) {
            s = trimmed.to_string();
        }
    }
    s
}

/// The last path segment of a concept URI, used as the concept code.
pub fn code_from_uri(uri: &str) -> String {
    uri.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(uri)
        .to_string()
}

/// A known code-hosting platform, identified by URL prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostingService {
    pub prefix: &'static str,
    pub code: &'static str,
    pub label: &'static str,
    pub url_template: &'static str,
}

/// Checked in order; the first matching prefix wins and at most one hosting
/// identifier is derived per entry.
pub const HOSTING_SERVICES: &[HostingService] = &[
    HostingService {
        prefix: "https://github.com/",
        code: "GitHub",
        label: "GitHub",
        url_template: "https://github.com/{source-item-id}",
    },
    HostingService {
        prefix: "https://gitlab.com/",
        code: "GitLab",
        label: "GitLab",
        url_template: "https://gitlab.com/{source-item-id}",
    },
    HostingService {
        prefix: "https://bitbucket.org/",
        code: "Bitbucket",
        label: "Bitbucket",
        url_template: "https://bitbucket.org/{source-item-id}",
    },
    HostingService {
        prefix: "https://codeberg.org/",
        code: "Codeberg",
        label: "Codeberg",
        url_template: "https://codeberg.org/{source-item-id}",
    },
    HostingService {
        prefix: "https://git.sr.ht/",
        code: "sourcehut",
        label: "sourcehut",
        url_template: "https://git.sr.ht/{source-item-id}",
    },
];

/// Match a code-repository URL against the known hosting prefixes, returning
/// the service and the repository identifier within it.
pub fn match_hosting_service(url: &str) -> Option<(&'static HostingService, String)> {
    for service in HOSTING_SERVICES {
        if let Some(rest) = url.strip_prefix(service.prefix) {
            let identifier = rest.trim_end_matches('/').to_string();
            if identifier.is_empty() {
                return None;
            }
            return Some((service, identifier));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbatim_status_wins_over_mapped() {
        let verbatim = format!("{NS_EOSC_LIFE_CYCLE_STATUS}life_cycle_status-beta");
        let abandoned = format!("{REPOSTATUS}abandoned");
        let mapping = map_development_status(&[&abandoned, &verbatim]);
        assert_eq!(mapping.life_cycle_status.as_deref(), Some(verbatim.as_str()));
    }

    #[test]
    fn test_abandoned_overrides_mapped_statuses() {
        let abandoned = format!("{REPOSTATUS}abandoned");
        let active = format!("{REPOSTATUS}active");
        let level8 = format!("{TRL}Level8Complete");
        let mapping = map_development_status(&[&active, &level8, &abandoned]);
        assert_eq!(
            mapping.life_cycle_status.as_deref(),
            Some(lcs("termination").as_str())
        );
        // the TRL signal still maps independently
        assert_eq!(
            mapping.trl.as_deref(),
            Some(format!("{NS_EOSC_TRL}trl-8").as_str())
        );
    }

    #[test]
    fn test_wip_applies_only_as_fallback() {
        let wip = format!("{REPOSTATUS}wip");
        let mapping = map_development_status(&[&wip]);
        assert_eq!(mapping.life_cycle_status.as_deref(), Some(lcs("concept").as_str()));

        let active = format!("{REPOSTATUS}active");
        let mapping = map_development_status(&[&wip, &active]);
        assert_eq!(
            mapping.life_cycle_status.as_deref(),
            Some(lcs("production").as_str())
        );
    }

    #[test]
    fn test_unmapped_terms_are_reported() {
        let mapping = map_development_status(&["https://example.org/status/odd"]);
        assert!(mapping.life_cycle_status.is_none());
        assert_eq!(mapping.unmapped.len(), 1);
    }

    #[test]
    fn test_spdx_uri_passes_through() {
        assert_eq!(
            normalize_license_uri("https://spdx.org/licenses/GPL-3.0-only"),
            Some("https://spdx.org/licenses/GPL-3.0-only".to_string())
        );
        assert_eq!(
            normalize_license_uri("https://spdx.org/licenses/MIT.html"),
            Some("https://spdx.org/licenses/MIT".to_string())
        );
    }

    #[test]
    fn test_known_alias_maps_to_spdx() {
        assert_eq!(
            normalize_license_uri("http://www.gnu.org/licenses/gpl-3.0.html"),
            Some("https://spdx.org/licenses/GPL-3.0-only".to_string())
        );
        assert_eq!(
            normalize_license_uri("https://opensource.org/licenses/MIT/"),
            Some("https://spdx.org/licenses/MIT".to_string())
        );
    }

    #[test]
    fn test_unknown_license_fails_to_normalize() {
        assert_eq!(normalize_license_uri("https://example.org/my-license"), None);
    }

    #[test]
    fn test_hosting_first_match_wins() {
        let (service, id) = match_hosting_service("https://github.com/org/repo").unwrap();
        assert_eq!(service.code, "GitHub");
        assert_eq!(id, "org/repo");

        assert!(match_hosting_service("https://example.org/org/repo").is_none());
    }

    #[test]
    fn test_software_type_map() {
        assert_eq!(
            software_type_code(&format!("{SOFTWARE_TYPES}CommandLineApplication")),
            Some("commandLine")
        );
        assert_eq!(software_type_code("https://example.org/UnknownType"), None);
    }
}
