use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

/// Keep NetJSON network topologies up to date
#[derive(Parser, Debug)]
#[command(name = "topodiff", version)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Directory of the topology store, overrides the configuration
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,
    /// Fetch timeout in seconds, overrides the configuration
    #[arg(short, long, global = true)]
    pub timeout: Option<u64>,
    /// Render topologies like the legacy serializer
    #[arg(long, global = true)]
    pub faithful: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the available parsers
    Parsers,
    /// Create a new, empty topology
    Add {
        /// Human readable name
        #[arg(short, long)]
        label: String,
        /// Format identifier of the parser
        #[arg(short, long)]
        parser: String,
        /// Where the topology data is fetched from
        #[arg(short, long)]
        url: String,
    },
    /// List the stored topologies
    List,
    /// Print a stored topology as NetJSON NetworkGraph
    Json {
        /// Topology id
        id: Uuid,
        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,
    },
    /// Compare a stored topology with its latest snapshot
    Diff {
        /// Topology id
        id: Uuid,
        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,
    },
    /// Apply the differences to the latest snapshot to a stored topology
    Update {
        /// Topology id
        id: Uuid,
    },
}
