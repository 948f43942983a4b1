//! Manas Ingest - annotation parsing and label preparation tool

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use manas_common::logging::{init_logging, LogConfig, LogLevel};
use manas_ingest::labels::{Direction, NeighborhoodLabels};
use manas_ingest::ontology::{OboConfig, OntologyGraph};
use manas_ingest::structure::StructureRef;
use manas_ingest::uniprot::{AnnotationParser, EntryCache, ParserConfig, UniProtConfig};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "manas-ingest")]
#[command(author, version, about = "UniProt annotation parsing and GO label preparation")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a UniProt XML file (.xml or .xml.gz) into JSON records
    Parse {
        /// Input file
        file: PathBuf,

        /// One record per <entry> element
        #[arg(long)]
        entry_set: bool,

        /// Keep only GO cross-references
        #[arg(long)]
        go_only: bool,

        /// Skip sequence text
        #[arg(long)]
        no_sequence: bool,
    },

    /// Fetch entries from UniProt, through the on-disk cache
    Fetch {
        /// UniProt accessions
        #[arg(required = true)]
        accessions: Vec<String>,

        /// Entry cache directory
        #[arg(long, env = "MANAS_CACHE_DIR")]
        cache_dir: Option<PathBuf>,

        /// Maximum concurrent downloads
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Resolve the bounded neighborhood of GO terms
    Neighborhood {
        /// OBO ontology file (.obo or .obo.gz)
        #[arg(long)]
        obo: PathBuf,

        /// Seed term ids
        #[arg(long = "term", required = true)]
        terms: Vec<String>,

        #[arg(long, value_enum, default_value_t = Direction::Descendants)]
        direction: Direction,

        /// Maximum number of hops
        #[arg(long, default_value_t = 1)]
        distance: usize,
    },

    /// Label every entry of a UniProt XML file against a target term
    Labels {
        /// Input file
        file: PathBuf,

        /// OBO ontology file (.obo or .obo.gz)
        #[arg(long)]
        obo: PathBuf,

        /// Target GO term
        #[arg(long)]
        target: String,

        #[arg(long, value_enum, default_value_t = Direction::Descendants)]
        direction: Direction,

        /// Maximum number of hops
        #[arg(long, default_value_t = 1)]
        distance: usize,
    },

    /// List structure references of a UniProt XML file with download URLs
    Structures {
        /// Input file
        file: PathBuf,
    },
}

#[derive(Debug, Serialize)]
struct EntryLabels {
    index: usize,
    positive: bool,
    direct: Vec<String>,
    extended: Vec<String>,
}

#[derive(Debug, Serialize)]
struct StructureLocation {
    #[serde(flatten)]
    structure: StructureRef,
    url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };

    // Environment variables take precedence over the flag
    let log_config = LogConfig::builder().level(log_level).build().merge_env()?;
    init_logging(&log_config)?;

    match cli.command {
        Command::Parse {
            file,
            entry_set,
            go_only,
            no_sequence,
        } => {
            let mut config = ParserConfig::default();
            if entry_set {
                config = config.entry_set();
            }
            if go_only {
                config = config.go_only();
            }
            if no_sequence {
                config = config.without_sequence();
            }

            let document = AnnotationParser::new(config)
                .parse_file(&file)
                .with_context(|| format!("Failed to parse {}", file.display()))?;
            print_json(&document)?;
        },
        Command::Fetch {
            accessions,
            cache_dir,
            concurrency,
        } => {
            let mut config = UniProtConfig::from_env()?;
            if cache_dir.is_some() {
                config.cache_dir = cache_dir;
            }
            if let Some(n) = concurrency {
                config.concurrency = n;
            }

            let cache = EntryCache::new(config)?;
            let results = cache.load_many(&accessions).await;

            let mut records = serde_json::Map::new();
            let mut failed = 0usize;
            for (accession, result) in results {
                match result {
                    Ok(record) => {
                        records.insert(accession, serde_json::to_value(record)?);
                    },
                    Err(e) => {
                        warn!(accession = %accession, error = %e, "Skipping entry");
                        failed += 1;
                    },
                }
            }
            print_json(&records)?;

            if failed > 0 {
                bail!("{} of {} entries could not be loaded", failed, accessions.len());
            }
        },
        Command::Neighborhood {
            obo,
            terms,
            direction,
            distance,
        } => {
            let graph = load_graph(&obo)?;
            let mut resolved: Vec<String> =
                direction.resolve(&graph, &terms, distance).into_iter().collect();
            resolved.sort_unstable();

            info!(
                seeds = terms.len(),
                resolved = resolved.len(),
                %direction,
                "Resolved neighborhood"
            );
            print_json(&resolved)?;
        },
        Command::Labels {
            file,
            obo,
            target,
            direction,
            distance,
        } => {
            let graph = load_graph(&obo)?;
            let records = AnnotationParser::new(ParserConfig::default().entry_set())
                .parse_file(&file)
                .with_context(|| format!("Failed to parse {}", file.display()))?
                .into_records();

            let labels: Vec<EntryLabels> = records
                .iter()
                .enumerate()
                .map(|(index, record)| {
                    let labels = NeighborhoodLabels::compute(record, &graph, direction, distance);
                    let mut direct: Vec<String> = labels.direct().iter().cloned().collect();
                    direct.sort_unstable();
                    EntryLabels {
                        index,
                        positive: labels.contains(&target),
                        direct,
                        extended: labels
                            .extended_sorted()
                            .into_iter()
                            .map(str::to_string)
                            .collect(),
                    }
                })
                .collect();

            info!(
                entries = labels.len(),
                positives = labels.iter().filter(|l| l.positive).count(),
                "Labelled entries"
            );
            print_json(&labels)?;
        },
        Command::Structures { file } => {
            let config = UniProtConfig::from_env()?;
            let parser =
                AnnotationParser::new(ParserConfig::default().entry_set().without_sequence());
            let records = parser
                .parse_file(&file)
                .with_context(|| format!("Failed to parse {}", file.display()))?
                .into_records();

            let locations: Vec<Vec<StructureLocation>> = records
                .iter()
                .map(|record| {
                    StructureRef::from_record(record)
                        .into_iter()
                        .map(|structure| StructureLocation {
                            url: structure.download_url(&config),
                            structure,
                        })
                        .collect()
                })
                .collect();
            print_json(&locations)?;
        },
    }

    Ok(())
}

fn load_graph(path: &Path) -> Result<OntologyGraph> {
    let graph = OntologyGraph::from_obo_file(path, &OboConfig::default())
        .with_context(|| format!("Failed to load ontology {}", path.display()))?;
    info!(terms = graph.len(), edges = graph.edge_count(), "Loaded ontology");
    Ok(graph)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
