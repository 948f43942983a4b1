//! UniProt annotation data models

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cross-reference bucket holding Gene Ontology annotations
pub const GO_TERM_TYPE: &str = "go";

/// Cross-reference bucket holding experimental PDB structures
pub const PDB_TERM_TYPE: &str = "pdb";

/// Cross-reference bucket holding AlphaFold predicted models
pub const ALPHAFOLD_TERM_TYPE: &str = "alphafolddb";

/// Buckets whose references point at 3D structures
pub const STRUCTURE_TERM_TYPES: [&str; 2] = [PDB_TERM_TYPE, ALPHAFOLD_TERM_TYPE];

/// Annotations extracted from one UniProt `<entry>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    /// Amino-acid sequence, `None` when the entry has no `<sequence>` element
    pub sequence: Option<String>,

    /// Cross-references keyed by lower-cased `type` attribute, in document order
    pub terms: BTreeMap<String, Vec<CrossReference>>,
}

impl AnnotationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// References of one type, case-insensitive; empty when the bucket is absent
    pub fn terms_of(&self, term_type: &str) -> &[CrossReference] {
        self.terms
            .get(&term_type.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All reference types present in this record
    pub fn term_types(&self) -> Vec<&str> {
        self.terms.keys().map(String::as_str).collect()
    }

    pub fn go_terms(&self) -> &[CrossReference] {
        self.terms_of(GO_TERM_TYPE)
    }

    /// GO identifiers in document order, usable as resolver seeds
    pub fn go_term_ids(&self) -> Vec<&str> {
        self.go_terms().iter().map(|r| r.id.as_str()).collect()
    }

    /// PDB and AlphaFoldDB references
    pub fn structure_references(&self) -> impl Iterator<Item = &CrossReference> {
        STRUCTURE_TERM_TYPES
            .iter()
            .flat_map(move |term_type| self.terms_of(term_type).iter())
    }

    /// Append a reference to its bucket and return its position there
    pub(crate) fn push_reference(&mut self, reference: CrossReference) -> usize {
        let bucket = self.terms.entry(reference.db_type.clone()).or_default();
        bucket.push(reference);
        bucket.len() - 1
    }
}

/// A typed `<dbReference>` attached to an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossReference {
    /// Lower-cased database type (e.g., "go", "pdb", "alphafolddb")
    #[serde(rename = "type")]
    pub db_type: String,

    /// Identifier within that database (e.g., "GO:0005515")
    pub id: String,

    /// `<property type=… value=…>` children, keyed by lower-cased type
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl CrossReference {
    pub fn new(db_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            db_type: db_type.into().to_lowercase(),
            id: id.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into().to_lowercase(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(&key.to_lowercase()).map(String::as_str)
    }

    pub fn is_go(&self) -> bool {
        self.db_type == GO_TERM_TYPE
    }
}
