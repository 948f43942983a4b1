// Ontology data models

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::OntologyError;

// ============================================================================
// Term
// ============================================================================

/// One `[Term]` stanza of an OBO file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OboTerm {
    /// Term identifier (e.g., "GO:0008150")
    pub id: String,

    /// Term name (e.g., "biological_process")
    pub name: Option<String>,

    /// GO namespace, absent for non-GO ontologies
    pub namespace: Option<Namespace>,

    /// Whether the term is obsolete
    pub is_obsolete: bool,
}

// ============================================================================
// Namespace
// ============================================================================

/// GO namespace (sub-ontology)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    BiologicalProcess,
    MolecularFunction,
    CellularComponent,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::BiologicalProcess => "biological_process",
            Namespace::MolecularFunction => "molecular_function",
            Namespace::CellularComponent => "cellular_component",
        }
    }
}

impl FromStr for Namespace {
    type Err = OntologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "biological_process" => Ok(Namespace::BiologicalProcess),
            "molecular_function" => Ok(Namespace::MolecularFunction),
            "cellular_component" => Ok(Namespace::CellularComponent),
            _ => Err(OntologyError::Parse(format!("Unknown namespace: {}", s))),
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Relationship
// ============================================================================

/// Edge between two terms, child (`subject`) to parent (`object`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OboRelationship {
    pub subject: String,
    pub object: String,
    pub relationship_type: RelationshipType,
}

impl OboRelationship {
    pub fn new(
        subject: impl Into<String>,
        object: impl Into<String>,
        relationship_type: RelationshipType,
    ) -> Self {
        Self {
            subject: subject.into(),
            object: object.into(),
            relationship_type,
        }
    }
}

/// Relationship types found in GO releases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    IsA,
    PartOf,
    Regulates,
    PositivelyRegulates,
    NegativelyRegulates,
    HasPart,
    OccursIn,
    EndsDuring,
}

impl RelationshipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::IsA => "is_a",
            RelationshipType::PartOf => "part_of",
            RelationshipType::Regulates => "regulates",
            RelationshipType::PositivelyRegulates => "positively_regulates",
            RelationshipType::NegativelyRegulates => "negatively_regulates",
            RelationshipType::HasPart => "has_part",
            RelationshipType::OccursIn => "occurs_in",
            RelationshipType::EndsDuring => "ends_during",
        }
    }
}

impl FromStr for RelationshipType {
    type Err = OntologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "is_a" => Ok(RelationshipType::IsA),
            "part_of" => Ok(RelationshipType::PartOf),
            "regulates" => Ok(RelationshipType::Regulates),
            "positively_regulates" => Ok(RelationshipType::PositivelyRegulates),
            "negatively_regulates" => Ok(RelationshipType::NegativelyRegulates),
            "has_part" => Ok(RelationshipType::HasPart),
            "occurs_in" => Ok(RelationshipType::OccursIn),
            "ends_during" => Ok(RelationshipType::EndsDuring),
            _ => Err(OntologyError::Parse(format!("Unknown relationship type: {}", s))),
        }
    }
}

impl std::fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_round_trip() {
        for ns in [
            Namespace::BiologicalProcess,
            Namespace::MolecularFunction,
            Namespace::CellularComponent,
        ] {
            assert_eq!(ns.as_str().parse::<Namespace>().unwrap(), ns);
        }
        assert!("external".parse::<Namespace>().is_err());
    }

    #[test]
    fn test_relationship_type_from_str() {
        assert_eq!("is_a".parse::<RelationshipType>().unwrap(), RelationshipType::IsA);
        assert_eq!("part_of".parse::<RelationshipType>().unwrap(), RelationshipType::PartOf);
        assert!("adjacent_to".parse::<RelationshipType>().is_err());
    }
}
