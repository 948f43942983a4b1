//! Weak-supervision labels from a record's GO annotations
//!
//! A protein counts as a positive example for a target term when the term is
//! one of its direct GO annotations or lies in the bounded neighborhood of
//! those annotations.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::ontology::{
    ancestors_within_distance, ancestors_within_distance_bounded, descendants_within_distance,
    OntologyGraph,
};
use crate::uniprot::models::{CrossReference, GO_TERM_TYPE};
use crate::uniprot::AnnotationRecord;

/// Which way to extend a record's annotations through the ontology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Child terms, up to `max_distance` hops away
    Descendants,
    /// Full ancestor closure, independent of `max_distance` once it is >= 1
    Ancestors,
    /// Parent terms, up to `max_distance` hops away
    AncestorsBounded,
}

impl Direction {
    /// Resolve the neighborhood of `seeds` in this direction
    pub fn resolve<I>(self, graph: &OntologyGraph, seeds: I, max_distance: usize) -> HashSet<String>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        match self {
            Direction::Descendants => descendants_within_distance(graph, seeds, max_distance),
            Direction::Ancestors => ancestors_within_distance(graph, seeds, max_distance),
            Direction::AncestorsBounded => {
                ancestors_within_distance_bounded(graph, seeds, max_distance)
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Descendants => "descendants",
            Direction::Ancestors => "ancestors",
            Direction::AncestorsBounded => "ancestors-bounded",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A record's direct GO terms plus their resolved neighborhood
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborhoodLabels {
    direction: Direction,
    max_distance: usize,
    direct: HashSet<String>,
    extended: HashSet<String>,
}

impl NeighborhoodLabels {
    pub fn compute(
        record: &AnnotationRecord,
        graph: &OntologyGraph,
        direction: Direction,
        max_distance: usize,
    ) -> Self {
        let direct: HashSet<String> =
            record.go_term_ids().into_iter().map(str::to_string).collect();
        let extended = direction.resolve(graph, &direct, max_distance);

        Self {
            direction,
            max_distance,
            direct,
            extended,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn max_distance(&self) -> usize {
        self.max_distance
    }

    /// GO ids annotated on the record itself
    pub fn direct(&self) -> &HashSet<String> {
        &self.direct
    }

    /// GO ids reached through the ontology
    pub fn extended(&self) -> &HashSet<String> {
        &self.extended
    }

    /// Extended ids in sorted order
    pub fn extended_sorted(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.extended.iter().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Whether `term` is a direct or extended label
    pub fn contains(&self, term: &str) -> bool {
        self.direct.contains(term) || self.extended.contains(term)
    }

    /// Extended ids as GO cross-references with no properties, sorted by id
    pub fn extended_references(&self) -> Vec<CrossReference> {
        self.extended_sorted()
            .into_iter()
            .map(|id| CrossReference::new(GO_TERM_TYPE, id))
            .collect()
    }
}

/// Whether `target` is among the record's direct or extended GO labels
pub fn is_positive(
    record: &AnnotationRecord,
    target: &str,
    graph: &OntologyGraph,
    direction: Direction,
    max_distance: usize,
) -> bool {
    if record.go_term_ids().contains(&target) {
        return true;
    }
    NeighborhoodLabels::compute(record, graph, direction, max_distance).contains(target)
}
