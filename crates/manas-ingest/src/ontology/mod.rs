//! Gene Ontology graph loading and neighborhood resolution
//!
//! - [`obo`]: OBO flat-file parser
//! - [`graph`]: immutable child -> parent term graph
//! - [`neighborhood`]: bounded ancestor / descendant closures of seed terms
//!
//! # Example
//! ```no_run
//! use manas_ingest::ontology::{descendants_within_distance, OboConfig, OntologyGraph};
//!
//! # fn example() -> manas_ingest::ontology::Result<()> {
//! let graph = OntologyGraph::from_obo_file("go-basic.obo", &OboConfig::default())?;
//! let nearby = descendants_within_distance(&graph, ["GO:0005515"], 2);
//! println!("{} terms within two hops", nearby.len());
//! # Ok(())
//! # }
//! ```

pub mod graph;
pub mod models;
pub mod neighborhood;
pub mod obo;

// Re-export commonly used types
pub use graph::{OntologyGraph, OntologyGraphBuilder, TermNode};
pub use models::{Namespace, OboRelationship, OboTerm, RelationshipType};
pub use neighborhood::{
    ancestors_within_distance, ancestors_within_distance_bounded, descendants_within_distance,
};
pub use obo::{OboConfig, OboParser, ParsedObo};

use manas_common::ManasError;

/// Result type for ontology operations
pub type Result<T> = std::result::Result<T, OntologyError>;

/// Error type for ontology operations
#[derive(Debug, thiserror::Error)]
pub enum OntologyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OBO parse error: {0}")]
    Parse(String),
}

impl From<OntologyError> for ManasError {
    fn from(err: OntologyError) -> Self {
        match err {
            OntologyError::Io(e) => ManasError::Io(e),
            OntologyError::Parse(msg) => ManasError::Parse(msg),
        }
    }
}
