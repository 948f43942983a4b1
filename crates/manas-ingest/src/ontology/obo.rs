// OBO flat-file parser (GO releases)

use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::models::{Namespace, OboRelationship, OboTerm, RelationshipType};
use super::{OntologyError, Result};

// ============================================================================
// Configuration
// ============================================================================

/// Controls which parts of an OBO file make it into the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OboConfig {
    /// Relationship types that become edges
    pub edge_types: HashSet<RelationshipType>,

    /// Keep `is_obsolete: true` terms (and their edges)
    pub keep_obsolete: bool,
}

impl Default for OboConfig {
    fn default() -> Self {
        Self {
            edge_types: [RelationshipType::IsA, RelationshipType::PartOf]
                .into_iter()
                .collect(),
            keep_obsolete: false,
        }
    }
}

impl OboConfig {
    /// Only `is_a` edges
    pub fn is_a_only() -> Self {
        Self {
            edge_types: [RelationshipType::IsA].into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_edge_type(mut self, relationship_type: RelationshipType) -> Self {
        self.edge_types.insert(relationship_type);
        self
    }

    pub fn keep_obsolete(mut self, keep: bool) -> Self {
        self.keep_obsolete = keep;
        self
    }

    pub fn includes(&self, relationship_type: RelationshipType) -> bool {
        self.edge_types.contains(&relationship_type)
    }
}

// ============================================================================
// Parser
// ============================================================================

#[derive(Debug, Default)]
pub struct ParsedObo {
    /// `data-version` header value, if present
    pub data_version: Option<String>,
    pub terms: Vec<OboTerm>,
    pub relationships: Vec<OboRelationship>,
}

pub struct OboParser;

impl OboParser {
    /// Parse OBO format content
    ///
    /// Only `[Term]` stanzas are read; `[Typedef]` and `[Instance]` stanzas
    /// are skipped. A term stanza without an `id:` line is skipped with a
    /// warning. A malformed stanza header is an error.
    pub fn parse(content: &str, config: &OboConfig) -> Result<ParsedObo> {
        let mut parsed = ParsedObo::default();

        let lines: Vec<&str> = content.lines().collect();
        let mut i = 0;

        // Header until first stanza
        while i < lines.len() {
            let line = lines[i].trim();
            if line.starts_with('[') {
                break;
            }
            if let Some(version) = line.strip_prefix("data-version:") {
                parsed.data_version = Some(version.trim().to_string());
            }
            i += 1;
        }

        let mut skipped_obsolete = 0usize;

        while i < lines.len() {
            let line = lines[i].trim();

            if !line.starts_with('[') {
                i += 1;
                continue;
            }

            if !line.ends_with(']') {
                return Err(OntologyError::Parse(format!(
                    "Malformed stanza header at line {}: {}",
                    i + 1,
                    line
                )));
            }

            if line != "[Term]" {
                debug!(stanza = %line, line = i + 1, "Skipping stanza");
                i += 1;
                continue;
            }

            match Self::parse_term_stanza(&lines, &mut i, config) {
                Ok((term, relationships)) => {
                    if term.is_obsolete && !config.keep_obsolete {
                        skipped_obsolete += 1;
                        continue;
                    }
                    parsed.terms.push(term);
                    parsed.relationships.extend(relationships);
                },
                Err(e) => {
                    warn!("Failed to parse term stanza: {}", e);
                },
            }
        }

        info!(
            terms = parsed.terms.len(),
            relationships = parsed.relationships.len(),
            skipped_obsolete,
            "Parsed OBO content"
        );

        Ok(parsed)
    }

    /// Parse a single [Term] stanza, leaving `i` on the line that ends it
    fn parse_term_stanza(
        lines: &[&str],
        i: &mut usize,
        config: &OboConfig,
    ) -> Result<(OboTerm, Vec<OboRelationship>)> {
        let start = *i + 1;
        *i += 1; // Skip [Term] line

        let mut id: Option<String> = None;
        let mut name: Option<String> = None;
        let mut namespace: Option<Namespace> = None;
        let mut is_obsolete = false;
        // Edge targets, resolved once the subject id is known
        let mut targets: Vec<(RelationshipType, String)> = Vec::new();

        while *i < lines.len() {
            let line = lines[*i].trim();

            // End of stanza
            if line.is_empty() || line.starts_with('[') {
                break;
            }
            *i += 1;

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = strip_comment(value.trim());

            match key.trim() {
                "id" => id = Some(value.to_string()),
                "name" => name = Some(value.to_string()),
                "namespace" => namespace = value.parse().ok(),
                "is_obsolete" => is_obsolete = value == "true",
                "is_a" => {
                    // "GO:0008150 {source=...}" keeps only the id
                    if let Some(parent) = value.split_whitespace().next() {
                        targets.push((RelationshipType::IsA, parent.to_string()));
                    }
                },
                "relationship" => {
                    // "part_of GO:0008150"
                    let mut parts = value.split_whitespace();
                    let (Some(kind), Some(parent)) = (parts.next(), parts.next()) else {
                        continue;
                    };
                    match kind.parse::<RelationshipType>() {
                        Ok(rel_type) => targets.push((rel_type, parent.to_string())),
                        Err(_) => debug!(kind = %kind, "Ignoring unknown relationship type"),
                    }
                },
                _ => {}, // Ignore other fields
            }
        }

        let id = id.ok_or_else(|| {
            OntologyError::Parse(format!("Term stanza at line {} has no id", start))
        })?;

        let relationships = targets
            .into_iter()
            .filter(|(rel_type, _)| config.includes(*rel_type))
            .map(|(rel_type, parent)| OboRelationship::new(id.clone(), parent, rel_type))
            .collect();

        let term = OboTerm {
            id,
            name,
            namespace,
            is_obsolete,
        };

        Ok((term, relationships))
    }
}

/// Drop a trailing `! comment`
fn strip_comment(value: &str) -> &str {
    match value.find(" !") {
        Some(pos) => value[..pos].trim_end(),
        None if value.starts_with('!') => "",
        None => value,
    }
}

// ============================================================================
// Tests
// ============================================================================
