//! Bounded-distance neighborhoods of a seed term set
//!
//! All functions tolerate seeds missing from the graph (they contribute
//! nothing) and return unordered sets. A `max_distance` of 0 means no hops
//! and always yields an empty set.

use std::collections::HashSet;
use tracing::trace;

use super::graph::OntologyGraph;

/// Terms reachable from any seed by following child edges 1..=`max_distance` hops
///
/// The union, over every seed and every `d` in range, of the terms whose
/// shortest descendant path from the seed is exactly `d`.
pub fn descendants_within_distance<I>(
    graph: &OntologyGraph,
    seeds: I,
    max_distance: usize,
) -> HashSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut result = HashSet::new();

    for seed in seeds {
        let seed = seed.as_ref();
        if !graph.contains(seed) {
            trace!(seed = %seed, "Seed not in ontology");
            continue;
        }
        for distance in 1..=max_distance {
            let layer = graph.descendants_at_distance(seed, distance);
            if layer.is_empty() {
                break;
            }
            result.extend(layer.into_iter().map(str::to_string));
        }
    }

    result
}

/// Ancestor closure of the seeds, expanded `max_distance` times
///
/// Every step replaces the frontier with the full ancestor closure of each
/// frontier term, so the first step already reaches the roots and larger
/// distances add nothing. Seeds are removed from the result. Use
/// [`ancestors_within_distance_bounded`] for a hop-limited walk.
pub fn ancestors_within_distance<I>(
    graph: &OntologyGraph,
    seeds: I,
    max_distance: usize,
) -> HashSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let seeds: HashSet<String> = seeds.into_iter().map(|s| s.as_ref().to_string()).collect();

    let mut frontier: HashSet<String> = seeds.clone();
    let mut visited: HashSet<String> = HashSet::new();

    for _ in 0..max_distance {
        let mut next: HashSet<String> = HashSet::new();
        for term in &frontier {
            if !graph.contains(term) {
                trace!(term = %term, "Term not in ontology");
                continue;
            }
            next.extend(graph.ancestors(term).into_iter().map(str::to_string));
        }
        if next.is_empty() {
            break;
        }
        visited.extend(next.iter().cloned());
        frontier = next;
    }

    &visited - &seeds
}

/// Terms reachable from any seed by following parent edges 1..=`max_distance` hops
///
/// Each step takes immediate parents only. Seeds are removed from the result.
pub fn ancestors_within_distance_bounded<I>(
    graph: &OntologyGraph,
    seeds: I,
    max_distance: usize,
) -> HashSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let seeds: HashSet<String> = seeds.into_iter().map(|s| s.as_ref().to_string()).collect();

    let mut visited: HashSet<&str> = seeds.iter().map(String::as_str).collect();
    let mut frontier: Vec<&str> = visited.iter().copied().collect();
    let mut result: HashSet<String> = HashSet::new();

    for _ in 0..max_distance {
        let mut next = Vec::new();
        for &term in &frontier {
            for parent in graph.parents(term) {
                if visited.insert(parent) {
                    next.push(parent);
                    result.insert(parent.to_string());
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    result
}
