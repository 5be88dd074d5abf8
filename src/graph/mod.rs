use std::fmt;

pub mod jsonld;

// Namespaces used by codemeta documents.
pub const SDO: &str = "https://schema.org/";
pub const CODEMETA: &str = "https://codemeta.github.io/terms/";
pub const SOFTWARE_TYPES: &str = "https://w3id.org/software-types#";
pub const TRL: &str = "https://w3id.org/research-technology-readiness-levels#";
pub const REPOSTATUS: &str = "https://www.repostatus.org/#";
pub const OWL_SAME_AS: &str = "http://www.w3.org/2002/07/owl#sameAs";
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// A node in the metadata graph: a named resource, an anonymous node, or a
/// literal value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Iri(String),
    Blank(String),
    Literal(String),
}

impl Term {
    pub fn iri(value: impl Into<String>) -> Self {
        Term::Iri(value.into())
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal(value.into())
    }

    /// The textual content of the term, regardless of kind.
    pub fn as_str(&self) -> &str {
        match self {
            Term::Iri(s) | Term::Blank(s) | Term::Literal(s) => s,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal(_))
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Statement {
    pub subject: Term,
    pub predicate: String,
    pub object: Term,
}

/// A queryable, insertion-ordered view of one metadata document.
///
/// Statement order is significant: ordered-list structures in the source are
/// flattened in declaration order, so `objects` yields the first declared
/// element first.
#[derive(Debug, Default)]
pub struct MetadataGraph {
    statements: Vec<Statement>,
}

impl MetadataGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, subject: Term, predicate: impl Into<String>, object: Term) {
        self.statements.push(Statement {
            subject,
            predicate: predicate.into(),
            object,
        });
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// All objects of (subject, predicate), in statement order. The yielded
    /// terms borrow from the graph only, never from the query arguments.
    pub fn objects<'g>(
        &'g self,
        subject: &Term,
        predicate: &str,
    ) -> impl Iterator<Item = &'g Term> {
        let subject = subject.clone();
        let predicate = predicate.to_string();
        self.statements
            .iter()
            .filter(move |st| st.subject == subject && st.predicate == predicate)
            .map(|st| &st.object)
    }

    /// The first object of (subject, predicate), if any.
    pub fn value(&self, subject: &Term, predicate: &str) -> Option<&Term> {
        self.objects(subject, predicate).next()
    }

    /// The textual content of the first object of (subject, predicate).
    pub fn value_str(&self, subject: &Term, predicate: &str) -> Option<&str> {
        self.value(subject, predicate).map(Term::as_str)
    }

    /// All objects of `predicate` anywhere in the document, in statement order.
    pub fn objects_anywhere<'g>(&'g self, predicate: &str) -> impl Iterator<Item = &'g Term> {
        let predicate = predicate.to_string();
        self.statements
            .iter()
            .filter(move |st| st.predicate == predicate)
            .map(|st| &st.object)
    }

    /// Subjects typed as `type_iri`, deduplicated, in first-seen order.
    pub fn subjects_of_type(&self, type_iri: &str) -> Vec<Term> {
        let mut seen = Vec::new();
        for st in &self.statements {
            if st.predicate == RDF_TYPE
                && st.object.as_str() == type_iri
                && !seen.contains(&st.subject)
            {
                seen.push(st.subject.clone());
            }
        }
        seen
    }
}
