//! CLI argument parsing definitions

use clap::{Parser, Subcommand};
use graphcheck_config::LoadKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Base URL of the service under test (example: http://localhost:4567/)
    #[arg(long, value_name = "URL", global = true)]
    pub endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the conformance scenario catalog in randomized order
    Scenarios {
        /// Seed for the scenario order (a fresh one is drawn when omitted)
        #[arg(long, value_name = "NUMBER")]
        seed: Option<u64>,

        /// Only run scenarios whose name contains this substring
        #[arg(long, value_name = "STRING")]
        filter: Option<String>,

        /// Also write the report as JSON
        #[arg(long, value_name = "PATH")]
        report_json: Option<PathBuf>,

        /// Fail on discrepancy companions too
        #[arg(long)]
        strict: bool,

        /// Ask the service to shut down once the run is over
        #[arg(long)]
        shutdown: bool,
    },

    /// Drive create, update and delete phases and record a timing dataset
    Load {
        /// Collection to drive: todos, categories, projects
        #[arg(long, value_name = "KIND")]
        kind: Option<LoadKind>,

        /// Number of objects per phase
        #[arg(long, value_name = "NUMBER")]
        objects: Option<usize>,

        /// Record a sample every this many operations
        #[arg(long, value_name = "NUMBER")]
        interval: Option<usize>,

        /// Seed for payloads and permutations
        #[arg(long, value_name = "NUMBER")]
        seed: Option<u64>,

        /// CSV output path
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// List the scenario catalog
    List {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        config_cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        #[arg(long, value_name = "PATH")]
        config_file: PathBuf,
    },

    /// Generate a sample configuration file
    Generate {
        /// Output file path
        #[arg(long, value_name = "PATH")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration after file, env and flag layering
    Show,
}
