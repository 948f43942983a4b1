//! Manas Ingest Library
//!
//! Prepares protein annotation data for GO-term classifiers.
//!
//! # Modules
//!
//! - [`uniprot`]: streaming UniProt XML parser, entry client and on-disk cache
//! - [`ontology`]: OBO loading, term graph and bounded neighborhoods
//! - [`labels`]: weak-supervision labels from a record's GO annotations
//! - [`encoding`]: one-hot sequence and multi-hot label tensors
//! - [`structure`]: PDB / AlphaFold structure references and downloads
//!
//! # Example
//!
//! ```no_run
//! use manas_ingest::labels::{is_positive, Direction};
//! use manas_ingest::ontology::{OboConfig, OntologyGraph};
//! use manas_ingest::uniprot::parse_entry;
//!
//! fn main() -> anyhow::Result<()> {
//!     let graph = OntologyGraph::from_obo_file("go-basic.obo", &OboConfig::default())?;
//!     let record = parse_entry(&std::fs::read_to_string("P12345.xml")?)?;
//!
//!     let positive = is_positive(&record, "GO:0005515", &graph, Direction::Descendants, 2);
//!     println!("positive: {}", positive);
//!     Ok(())
//! }
//! ```

pub mod encoding;
pub mod labels;
pub mod ontology;
pub mod structure;
pub mod uniprot;
