//! Ontology graph backed by `petgraph`
//!
//! Edges point from child to parent (`is_a`, `part_of`, ...), so a term's
//! ancestors are reached by following outgoing edges and its descendants by
//! following incoming ones.

use flate2::read::GzDecoder;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashMap, HashSet, VecDeque};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use super::models::{Namespace, OboTerm, RelationshipType};
use super::obo::{OboConfig, OboParser, ParsedObo};
use super::Result;

/// Node payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermNode {
    pub id: String,
    pub name: Option<String>,
    pub namespace: Option<Namespace>,
}

/// Immutable term graph; share it behind an `Arc` across threads
#[derive(Debug, Clone, Default)]
pub struct OntologyGraph {
    graph: DiGraph<TermNode, RelationshipType>,
    node_index_map: HashMap<String, NodeIndex>,
}

impl OntologyGraph {
    pub fn builder() -> OntologyGraphBuilder {
        OntologyGraphBuilder::default()
    }

    /// Parse OBO content and build the graph
    pub fn from_obo(content: &str, config: &OboConfig) -> Result<Self> {
        let parsed = OboParser::parse(content, config)?;
        Ok(Self::from_parsed(parsed))
    }

    /// Read an `.obo` or `.obo.gz` file and build the graph
    pub fn from_obo_file(path: impl AsRef<Path>, config: &OboConfig) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;

        let mut content = String::new();
        if path.extension().is_some_and(|ext| ext == "gz") {
            GzDecoder::new(file).read_to_string(&mut content)?;
        } else {
            std::io::BufReader::new(file).read_to_string(&mut content)?;
        }

        info!(path = %path.display(), bytes = content.len(), "Loading ontology");
        Self::from_obo(&content, config)
    }

    pub fn from_parsed(parsed: ParsedObo) -> Self {
        let mut builder = Self::builder();
        for term in parsed.terms {
            builder.add_term(term);
        }
        for rel in parsed.relationships {
            builder.add_edge(&rel.subject, &rel.object, rel.relationship_type);
        }
        builder.build()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node_index_map.contains_key(id)
    }

    /// Number of terms
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn term(&self, id: &str) -> Option<&TermNode> {
        self.node_index_map.get(id).map(|&idx| &self.graph[idx])
    }

    pub fn term_name(&self, id: &str) -> Option<&str> {
        self.term(id).and_then(|node| node.name.as_deref())
    }

    pub fn namespace(&self, id: &str) -> Option<Namespace> {
        self.term(id).and_then(|node| node.namespace)
    }

    /// All term ids, in insertion order
    pub fn term_ids(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(|node| node.id.as_str())
    }

    /// Immediate parents, each listed once
    pub fn parents(&self, id: &str) -> Vec<&str> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Immediate children, each listed once
    pub fn children(&self, id: &str) -> Vec<&str> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Relationship types of the edges from `child` to `parent`
    pub fn relationships(&self, child: &str, parent: &str) -> Vec<RelationshipType> {
        let endpoints = (self.node_index_map.get(child), self.node_index_map.get(parent));
        let (Some(&from), Some(&to)) = endpoints else {
            return Vec::new();
        };
        self.graph
            .edges_connecting(from, to)
            .map(|edge| *edge.weight())
            .collect()
    }

    /// Terms whose shortest descendant path from `id` is exactly `distance` hops
    ///
    /// Unknown ids yield an empty set; distance 0 yields the term itself.
    pub fn descendants_at_distance(&self, id: &str, distance: usize) -> HashSet<&str> {
        let Some(&start) = self.node_index_map.get(id) else {
            return HashSet::new();
        };

        let mut visited = HashSet::from([start]);
        let mut layer = vec![start];

        for _ in 0..distance {
            let mut next = Vec::new();
            for &node in &layer {
                for child in self.graph.neighbors_directed(node, Direction::Incoming) {
                    if visited.insert(child) {
                        next.push(child);
                    }
                }
            }
            if next.is_empty() {
                return HashSet::new();
            }
            layer = next;
        }

        layer.into_iter().map(|idx| self.graph[idx].id.as_str()).collect()
    }

    /// Every term reachable over parent edges, excluding `id` itself
    pub fn ancestors(&self, id: &str) -> HashSet<&str> {
        let Some(&start) = self.node_index_map.get(id) else {
            return HashSet::new();
        };

        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(node) = queue.pop_front() {
            for parent in self.graph.neighbors_directed(node, Direction::Outgoing) {
                if visited.insert(parent) {
                    queue.push_back(parent);
                }
            }
        }

        visited.remove(&start);
        visited.into_iter().map(|idx| self.graph[idx].id.as_str()).collect()
    }

    fn neighbors(&self, id: &str, direction: Direction) -> Vec<&str> {
        let Some(&idx) = self.node_index_map.get(id) else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for edge in self.graph.edges_directed(idx, direction) {
            let other = match direction {
                Direction::Outgoing => edge.target(),
                Direction::Incoming => edge.source(),
            };
            if seen.insert(other) {
                result.push(self.graph[other].id.as_str());
            }
        }
        result
    }
}

/// Mutable construction phase of an [`OntologyGraph`]
#[derive(Debug, Default)]
pub struct OntologyGraphBuilder {
    graph: DiGraph<TermNode, RelationshipType>,
    node_index_map: HashMap<String, NodeIndex>,
}

impl OntologyGraphBuilder {
    /// Add a term, filling in name and namespace if the node already exists
    pub fn add_term(&mut self, term: OboTerm) -> NodeIndex {
        let idx = self.node(&term.id);
        let node = &mut self.graph[idx];
        if term.name.is_some() {
            node.name = term.name;
        }
        if term.namespace.is_some() {
            node.namespace = term.namespace;
        }
        idx
    }

    /// Add a child -> parent edge; unknown endpoints become bare nodes
    pub fn add_edge(&mut self, child: &str, parent: &str, relationship_type: RelationshipType) {
        let from = self.node(child);
        let to = self.node(parent);
        self.graph.add_edge(from, to, relationship_type);
    }

    /// Convenience for tests and small hand-built graphs
    pub fn edge(mut self, child: &str, parent: &str) -> Self {
        self.add_edge(child, parent, RelationshipType::IsA);
        self
    }

    pub fn build(self) -> OntologyGraph {
        debug!(
            terms = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "Built ontology graph"
        );
        OntologyGraph {
            graph: self.graph,
            node_index_map: self.node_index_map,
        }
    }

    fn node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.node_index_map.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(TermNode {
            id: id.to_string(),
            name: None,
            namespace: None,
        });
        self.node_index_map.insert(id.to_string(), idx);
        idx
    }
}
